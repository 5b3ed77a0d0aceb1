//! Single-sheet Office Open XML workbook writer.

use std::io::{Seek, Write};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use nsql_wsdl::FieldValue;

use crate::config::ExportConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::grid::ExportGrid;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

// cellXfs indices in STYLES_XML
const STYLE_HEADER: &str = "1";
const STYLE_DATE: &str = "2";
const STYLE_DATETIME: &str = "3";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="2"><numFmt numFmtId="164" formatCode="yyyy\-mm\-dd"/><numFmt numFmtId="165" formatCode="yyyy\-mm\-dd\ hh:mm:ss"/></numFmts><fonts count="2"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font><font><b/><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="4"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/><xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="165" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// Write `grid` to `path` as a workbook with one sheet.
///
/// The package is assembled in a temporary file beside `path` and renamed
/// over it once complete, so `path` holds either the previous content or
/// the full new workbook.
pub fn write_workbook(grid: &ExportGrid, config: &ExportConfig, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    write_package(temp.as_file_mut(), grid, config)?;
    temp.as_file().sync_all()?;
    temp.persist(path)?;

    Ok(())
}

/// Write the workbook package to any seekable sink.
pub fn write_package<W: Write + Seek>(
    sink: W,
    grid: &ExportGrid,
    config: &ExportConfig,
) -> Result<W> {
    let mut zip = ZipWriter::new(sink);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(PACKAGE_RELS_XML.as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(&workbook_xml(&config.sheet_name)?)?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(WORKBOOK_RELS_XML.as_bytes())?;

    zip.start_file("xl/styles.xml", options)?;
    zip.write_all(STYLES_XML.as_bytes())?;

    zip.start_file("xl/worksheets/sheet1.xml", options)?;
    zip.write_all(&sheet_xml(grid, config)?)?;

    Ok(zip.finish()?)
}

fn workbook_xml(sheet_name: &str) -> Result<Vec<u8>> {
    validate_sheet_name(sheet_name)?;

    let mut w = Writer::new(Vec::new());
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    w.write_event(Event::Start(
        BytesStart::new("workbook").with_attributes([("xmlns", MAIN_NS), ("xmlns:r", REL_NS)]),
    ))?;
    w.write_event(Event::Start(BytesStart::new("sheets")))?;
    w.write_event(Event::Empty(BytesStart::new("sheet").with_attributes([
        ("name", sheet_name),
        ("sheetId", "1"),
        ("r:id", "rId1"),
    ])))?;
    w.write_event(Event::End(BytesEnd::new("sheets")))?;
    w.write_event(Event::End(BytesEnd::new("workbook")))?;
    Ok(w.into_inner())
}

fn validate_sheet_name(name: &str) -> Result<()> {
    let len = name.chars().count();
    if len == 0 || len > 31 || name.contains(['\\', '/', '?', '*', '[', ']', ':']) {
        return Err(Error::new(ErrorKind::Schema(format!(
            "'{name}' is not a valid sheet name"
        ))));
    }
    Ok(())
}

fn sheet_xml(grid: &ExportGrid, config: &ExportConfig) -> Result<Vec<u8>> {
    let mut w = Writer::new(Vec::new());
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    w.write_event(Event::Start(
        BytesStart::new("worksheet").with_attributes([("xmlns", MAIN_NS)]),
    ))?;

    let last = format!(
        "{}{}",
        column_name(grid.column_count().saturating_sub(1)),
        grid.row_count()
    );
    let dimension = format!("A1:{last}");
    w.write_event(Event::Empty(
        BytesStart::new("dimension").with_attributes([("ref", dimension.as_str())]),
    ))?;

    let widths = grid.column_widths(config);
    if !widths.is_empty() {
        w.write_event(Event::Start(BytesStart::new("cols")))?;
        for (index, width) in widths.iter().enumerate() {
            let col = (index + 1).to_string();
            let width = format!("{width:.2}");
            w.write_event(Event::Empty(BytesStart::new("col").with_attributes([
                ("min", col.as_str()),
                ("max", col.as_str()),
                ("width", width.as_str()),
                ("customWidth", "1"),
            ])))?;
        }
        w.write_event(Event::End(BytesEnd::new("cols")))?;
    }

    w.write_event(Event::Start(BytesStart::new("sheetData")))?;

    start_row(&mut w, 1)?;
    for (col, name) in grid.header().iter().enumerate() {
        let cell_ref = cell_name(col, 1);
        inline_string(&mut w, &cell_ref, name, Some(STYLE_HEADER))?;
    }
    w.write_event(Event::End(BytesEnd::new("row")))?;

    for (index, row) in grid.rows().iter().enumerate() {
        let row_number = index + 2;
        start_row(&mut w, row_number)?;
        for (col, value) in row.iter().enumerate() {
            write_cell(&mut w, &cell_name(col, row_number), value)?;
        }
        w.write_event(Event::End(BytesEnd::new("row")))?;
    }

    w.write_event(Event::End(BytesEnd::new("sheetData")))?;
    w.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(w.into_inner())
}

fn start_row(w: &mut Writer<Vec<u8>>, number: usize) -> Result<()> {
    let r = number.to_string();
    w.write_event(Event::Start(BytesStart::new("row").with_attributes([("r", r.as_str())])))?;
    Ok(())
}

fn write_cell(w: &mut Writer<Vec<u8>>, cell_ref: &str, value: &FieldValue) -> Result<()> {
    match value {
        FieldValue::Null => Ok(()),
        FieldValue::Number(n) if n.is_finite() => {
            numeric(w, cell_ref, &value.to_string(), None, None)
        }
        FieldValue::Date(d) => {
            let style = if d.num_seconds_from_midnight() == 0 && d.nanosecond() == 0 {
                STYLE_DATE
            } else {
                STYLE_DATETIME
            };
            numeric(w, cell_ref, &excel_serial(d).to_string(), Some(style), None)
        }
        FieldValue::Boolean(b) => numeric(w, cell_ref, if *b { "1" } else { "0" }, None, Some("b")),
        other => inline_string(w, cell_ref, &other.to_string(), None),
    }
}

fn numeric(
    w: &mut Writer<Vec<u8>>,
    cell_ref: &str,
    raw: &str,
    style: Option<&str>,
    cell_type: Option<&str>,
) -> Result<()> {
    let mut cell = BytesStart::new("c").with_attributes([("r", cell_ref)]);
    if let Some(style) = style {
        cell.push_attribute(("s", style));
    }
    if let Some(cell_type) = cell_type {
        cell.push_attribute(("t", cell_type));
    }
    w.write_event(Event::Start(cell))?;
    w.write_event(Event::Start(BytesStart::new("v")))?;
    w.write_event(Event::Text(BytesText::new(raw)))?;
    w.write_event(Event::End(BytesEnd::new("v")))?;
    w.write_event(Event::End(BytesEnd::new("c")))?;
    Ok(())
}

fn inline_string(
    w: &mut Writer<Vec<u8>>,
    cell_ref: &str,
    text: &str,
    style: Option<&str>,
) -> Result<()> {
    let mut cell = BytesStart::new("c").with_attributes([("r", cell_ref), ("t", "inlineStr")]);
    if let Some(style) = style {
        cell.push_attribute(("s", style));
    }
    w.write_event(Event::Start(cell))?;
    w.write_event(Event::Start(BytesStart::new("is")))?;

    let mut t = BytesStart::new("t");
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        t.push_attribute(("xml:space", "preserve"));
    }
    w.write_event(Event::Start(t))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new("t")))?;

    w.write_event(Event::End(BytesEnd::new("is")))?;
    w.write_event(Event::End(BytesEnd::new("c")))?;
    Ok(())
}

/// Spreadsheet column letters for a zero-based index (`0` → `A`, `26` → `AA`).
pub fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn cell_name(col: usize, row: usize) -> String {
    format!("{}{row}", column_name(col))
}

/// Days since 1899-12-30, with the time of day as the fraction.
pub fn excel_serial(value: &NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let elapsed = *value - epoch;
    elapsed.num_milliseconds() as f64 / 86_400_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsql_query::{Record, ResultSet};
    use std::io::{Cursor, Read};

    fn grid() -> ExportGrid {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        ExportGrid::from_result_set(&ResultSet::new(vec![
            Record::new(vec![
                ("Name".into(), FieldValue::text("Acme & Sons")),
                ("Cost".into(), FieldValue::Number(100.0)),
                ("Start".into(), FieldValue::Date(date)),
                ("Active".into(), FieldValue::Boolean(true)),
            ]),
            Record::new(vec![
                ("Name".into(), FieldValue::text("Beta")),
                ("Cost".into(), FieldValue::Number(250.5)),
                ("Start".into(), FieldValue::Null),
                ("Active".into(), FieldValue::Boolean(false)),
            ]),
        ]))
        .unwrap()
    }

    fn read_part(package: Vec<u8>, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(package)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut text = String::new();
        part.read_to_string(&mut text).unwrap();
        text
    }

    fn package() -> Vec<u8> {
        write_package(Cursor::new(Vec::new()), &grid(), &ExportConfig::default())
            .unwrap()
            .into_inner()
    }

    #[test]
    fn test_column_names() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn test_excel_serial() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(excel_serial(&date.and_hms_opt(0, 0, 0).unwrap()), 45352.0);
        assert_eq!(excel_serial(&date.and_hms_opt(12, 0, 0).unwrap()), 45352.5);
    }

    #[test]
    fn test_package_parts() {
        let mut archive = zip::ZipArchive::new(Cursor::new(package())).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            [
                "[Content_Types].xml",
                "_rels/.rels",
                "xl/_rels/workbook.xml.rels",
                "xl/styles.xml",
                "xl/workbook.xml",
                "xl/worksheets/sheet1.xml"
            ]
        );
        let workbook = {
            let mut part = archive.by_name("xl/workbook.xml").unwrap();
            let mut text = String::new();
            part.read_to_string(&mut text).unwrap();
            text
        };
        assert!(workbook.contains(r#"<sheet name="Sheet1" sheetId="1" r:id="rId1"/>"#));
    }

    #[test]
    fn test_sheet_cells() {
        let sheet = read_part(package(), "xl/worksheets/sheet1.xml");

        assert!(sheet.contains(r#"<dimension ref="A1:D3"/>"#));
        assert!(sheet.contains(r#"<c r="A1" t="inlineStr" s="1"><is><t>Name</t></is></c>"#));
        assert!(sheet.contains(r#"<c r="A2" t="inlineStr"><is><t>Acme &amp; Sons</t></is></c>"#));
        assert!(sheet.contains(r#"<c r="B2"><v>100</v></c>"#));
        assert!(sheet.contains(r#"<c r="B3"><v>250.5</v></c>"#));
        assert!(sheet.contains(r#"<c r="C2" s="2"><v>45352</v></c>"#));
        assert!(sheet.contains(r#"<c r="D2" t="b"><v>1</v></c>"#));
        assert!(sheet.contains(r#"<c r="D3" t="b"><v>0</v></c>"#));
        // null cells are left out
        assert!(!sheet.contains(r#"r="C3""#));
    }

    #[test]
    fn test_column_widths_written() {
        let sheet = read_part(package(), "xl/worksheets/sheet1.xml");
        assert!(sheet.contains(r#"<col min="1" max="1" width="13.00" customWidth="1"/>"#));
        assert!(sheet.contains(r#"<col min="2" max="2" width="8.43" customWidth="1"/>"#));
    }

    #[test]
    fn test_invalid_sheet_name() {
        let config = ExportConfig::builder().with_sheet_name("a/b").build();
        let err = write_package(Cursor::new(Vec::new()), &grid(), &config).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Schema(_)));
    }

    #[test]
    fn test_write_workbook_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PRJ001.xlsx");
        std::fs::write(&path, b"stale content").unwrap();

        write_workbook(&grid(), &ExportConfig::default(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
        let sheet = read_part(bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("Acme &amp; Sons"));
        // no temporary files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
