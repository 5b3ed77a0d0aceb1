//! Header-plus-rows grid built from a result set.

use nsql_query::ResultSet;
use nsql_wsdl::FieldValue;

use crate::config::ExportConfig;
use crate::error::{Error, ErrorKind, Result};

/// A rectangular grid: a header row of field names, then one row of values
/// per record in header order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportGrid {
    header: Vec<String>,
    rows: Vec<Vec<FieldValue>>,
}

impl ExportGrid {
    /// Flatten records into a grid.
    ///
    /// The first record fixes the columns. A later record with different
    /// field names or order is a schema error, as is an empty set.
    pub fn from_result_set(result_set: &ResultSet) -> Result<Self> {
        let first = result_set
            .first()
            .ok_or_else(|| Error::new(ErrorKind::Schema("no records to export".to_string())))?;
        let header: Vec<String> = first.field_names().map(str::to_string).collect();

        let mut rows = Vec::with_capacity(result_set.len());
        for (index, record) in result_set.iter().enumerate() {
            if !record.field_names().eq(header.iter().map(String::as_str)) {
                return Err(Error::new(ErrorKind::Schema(format!(
                    "record {} has fields [{}], expected [{}]",
                    index + 1,
                    record.field_names().collect::<Vec<_>>().join(", "),
                    header.join(", ")
                ))));
            }
            rows.push(record.values().cloned().collect());
        }

        Ok(Self { header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data rows, without the header.
    pub fn rows(&self) -> &[Vec<FieldValue>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Rows including the header.
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    /// Fitted width of each column.
    ///
    /// The longest rendered cell (header included, in characters) plus
    /// padding, at least the minimum and at most the maximum width.
    pub fn column_widths(&self, config: &ExportConfig) -> Vec<f64> {
        (0..self.column_count())
            .map(|col| {
                let header_len = self.header[col].chars().count();
                let longest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|value| value.to_string().chars().count())
                    .fold(header_len, usize::max);

                (longest as f64 + config.padding)
                    .max(config.min_column_width)
                    .min(config.max_column_width)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsql_query::Record;

    fn record(fields: &[(&str, FieldValue)]) -> Record {
        Record::new(
            fields
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        )
    }

    fn prj001() -> ResultSet {
        ResultSet::new(vec![
            record(&[("Name", FieldValue::text("Acme")), ("Cost", FieldValue::Number(100.0))]),
            record(&[("Name", FieldValue::text("Beta")), ("Cost", FieldValue::Number(250.0))]),
        ])
    }

    #[test]
    fn test_grid_shape() {
        let grid = ExportGrid::from_result_set(&prj001()).unwrap();

        assert_eq!(grid.header(), ["Name", "Cost"]);
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.column_count(), 2);
        assert_eq!(grid.rows()[0], [FieldValue::text("Acme"), FieldValue::Number(100.0)]);
        assert_eq!(grid.rows()[1], [FieldValue::text("Beta"), FieldValue::Number(250.0)]);
    }

    #[test]
    fn test_mismatched_record_is_rejected() {
        let set = ResultSet::new(vec![
            record(&[("Name", FieldValue::text("Acme")), ("Cost", FieldValue::Number(1.0))]),
            record(&[("Cost", FieldValue::Number(2.0)), ("Name", FieldValue::text("Beta"))]),
        ]);
        let err = ExportGrid::from_result_set(&set).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Schema(_)));
        assert!(err.to_string().contains("record 2"));

        let set = ResultSet::new(vec![
            record(&[("Name", FieldValue::text("Acme"))]),
            record(&[("Name", FieldValue::text("Beta")), ("Extra", FieldValue::Null)]),
        ]);
        assert!(ExportGrid::from_result_set(&set).is_err());
    }

    #[test]
    fn test_empty_set_is_rejected() {
        let err = ExportGrid::from_result_set(&ResultSet::default()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Schema(_)));
    }

    #[test]
    fn test_column_widths() {
        let set = ResultSet::new(vec![record(&[
            ("Name", FieldValue::text("A fairly long project name")),
            ("Id", FieldValue::Number(7.0)),
            ("Notes", FieldValue::text("x".repeat(500))),
        ])]);
        let grid = ExportGrid::from_result_set(&set).unwrap();
        let widths = grid.column_widths(&ExportConfig::default());

        assert_eq!(widths[0], 28.0);
        assert_eq!(widths[1], 8.43);
        assert_eq!(widths[2], 75.0);
    }

    #[test]
    fn test_widths_never_exceed_cap() {
        let set = ResultSet::new(
            (1..50)
                .map(|n| record(&[("Text", FieldValue::text("é".repeat(n * 10)))]))
                .collect(),
        );
        let grid = ExportGrid::from_result_set(&set).unwrap();
        let config = ExportConfig::default();
        assert!(grid.column_widths(&config).iter().all(|w| *w <= config.max_column_width));
    }
}
