//! Escaping and redaction helpers.
//!
//! Every caller-supplied value placed into a SOAP envelope MUST go through
//! [`xml::escape`]. Filter expressions in particular routinely contain `<`,
//! `>` and `&`.

/// XML escaping utilities.
pub mod xml {
    /// Escape a string for safe inclusion in XML content.
    ///
    /// This escapes the five predefined XML entities.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nsql_client::security::xml;
    ///
    /// let safe = xml::escape("cost > 100 & name = 'x'");
    /// assert_eq!(safe, "cost &gt; 100 &amp; name = &apos;x&apos;");
    /// ```
    #[must_use]
    pub fn escape(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 16);
        for ch in value.chars() {
            match ch {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&apos;"),
                _ => escaped.push(ch),
            }
        }
        escaped
    }

    /// Replace the text content of every `<tag>…</tag>` (optionally prefixed)
    /// with `***`, for logging envelopes that carry credentials.
    #[must_use]
    pub fn redact_element(xml: &str, tag: &str) -> String {
        let mut out = String::with_capacity(xml.len());
        let mut rest = xml;

        while let Some(open_end) = find_open_tag(rest, tag) {
            let (head, tail) = rest.split_at(open_end);
            out.push_str(head);
            match tail.find("</") {
                Some(close) => {
                    out.push_str("***");
                    rest = &tail[close..];
                }
                None => {
                    rest = tail;
                    break;
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Byte offset just past the next opening `<tag>` or `<prefix:tag>`.
    fn find_open_tag(xml: &str, tag: &str) -> Option<usize> {
        let mut offset = 0;
        while let Some(lt) = xml[offset..].find('<') {
            let start = offset + lt + 1;
            let gt = start + xml[start..].find('>')?;
            let name = xml[start..gt]
                .split(|c: char| c.is_whitespace())
                .next()
                .unwrap_or_default();
            let local = name.rsplit(':').next().unwrap_or(name);
            if !name.starts_with(['/', '?', '!']) && local == tag {
                return Some(gt + 1);
            }
            offset = gt + 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::xml::*;

    #[test]
    fn test_xml_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("<tag>"), "&lt;tag&gt;");
        assert_eq!(escape("a & b"), "a &amp; b");
        assert_eq!(escape("\"quoted\" 'single'"), "&quot;quoted&quot; &apos;single&apos;");
    }

    #[test]
    fn test_redact_prefixed_and_plain() {
        let xml = "<q:Auth><q:Username>bob</q:Username><q:Password>s3cret</q:Password></q:Auth>";
        let redacted = redact_element(xml, "Password");
        assert!(!redacted.contains("s3cret"));
        assert!(redacted.contains("<q:Password>***</q:Password>"));
        assert!(redacted.contains("<q:Username>bob</q:Username>"));

        let plain = redact_element("<Password>x</Password><Password>y</Password>", "Password");
        assert_eq!(plain, "<Password>***</Password><Password>***</Password>");
    }

    #[test]
    fn test_redact_missing_tag_is_identity() {
        let xml = "<Auth><Username>bob</Username></Auth>";
        assert_eq!(redact_element(xml, "Password"), xml);
    }
}
