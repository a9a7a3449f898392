//! # Records
//!
//! The table of records a batch renders from. Records are JSON objects;
//! loading spreadsheets is left to whoever builds the table.
//!
//! ## Example
//!
//! ```
//! use certmerge::table::Table;
//!
//! let table = Table::from_json_str(
//!     r#"[{"Name": "Alice", "Score": 97}, {"Name": "Bob", "Score": 88.5}]"#,
//!     "Name",
//! ).unwrap();
//!
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.records()[1].display("Score").as_deref(), Some("88.5"));
//!
//! // Selection keeps table order, not selection order
//! let picked = table.select(&["Bob".to_string(), "Alice".to_string()]);
//! assert_eq!(picked[0].id, "Alice");
//! ```

use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::CertmergeError;

/// One row of the table: field name → scalar value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// The field's value as display text, or `None` when the field is absent.
    pub fn display(&self, field: &str) -> Option<String> {
        self.fields.get(field).map(display_value)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Render a JSON value the way it should appear on an artifact.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// A record paired with the identifier used to name its output.
#[derive(Debug, Clone, Copy)]
pub struct Selected<'a> {
    pub id: &'a str,
    pub row: usize,
    pub record: &'a Record,
}

/// An ordered table of records with a designated identifier field.
#[derive(Debug, Clone, Default)]
pub struct Table {
    records: Vec<Record>,
    ids: Vec<String>,
    id_field: String,
}

impl Table {
    pub fn new(records: Vec<Record>, id_field: impl Into<String>) -> Self {
        let id_field = id_field.into();
        // Rows without an identifier are named by their 1-based row number
        let ids = records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                record
                    .display(&id_field)
                    .unwrap_or_else(|| (row + 1).to_string())
            })
            .collect();
        Self {
            records,
            ids,
            id_field,
        }
    }

    /// Load a JSON array of objects.
    pub fn from_json_str(json: &str, id_field: impl Into<String>) -> Result<Self, CertmergeError> {
        let rows: Vec<Map<String, Value>> = serde_json::from_str(json)?;
        Ok(Self::new(rows.into_iter().map(Record::new).collect(), id_field))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identifier of every row, in table order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Records whose identifier is in `ids`, in table row order.
    ///
    /// An empty selection selects every record.
    pub fn select(&self, ids: &[String]) -> Vec<Selected<'_>> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.records
            .iter()
            .zip(&self.ids)
            .enumerate()
            .filter(|(_, (_, id))| wanted.is_empty() || wanted.contains(id.as_str()))
            .map(|(row, (record, id))| Selected {
                id: id.as_str(),
                row,
                record,
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> Table {
        Table::from_json_str(
            r#"[
                {"Name": "Alice", "Dept": "R&D"},
                {"Name": "Bob", "Dept": null},
                {"Dept": "Ops"},
                {"Name": "Dana", "Dept": "Ops"}
            ]"#,
            "Name",
        )
        .unwrap()
    }

    #[test]
    fn test_display_values() {
        assert_eq!(display_value(&json!("text")), "text");
        assert_eq!(display_value(&json!(42)), "42");
        assert_eq!(display_value(&json!(2.5)), "2.5");
        assert_eq!(display_value(&json!(true)), "true");
        assert_eq!(display_value(&json!(null)), "");
        assert_eq!(display_value(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_missing_field_is_none() {
        let t = table();
        assert_eq!(t.records()[2].display("Name"), None);
        assert_eq!(t.records()[1].display("Dept").as_deref(), Some(""));
    }

    #[test]
    fn test_ids_fall_back_to_row_number() {
        assert_eq!(table().ids(), &["Alice", "Bob", "3", "Dana"]);
    }

    #[test]
    fn test_empty_selection_selects_all() {
        let t = table();
        assert_eq!(t.select(&[]).len(), 4);
    }

    #[test]
    fn test_selection_uses_table_order() {
        let t = table();
        let picked = t.select(&["Dana".to_string(), "Alice".to_string(), "Zed".to_string()]);
        let ids: Vec<&str> = picked.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["Alice", "Dana"]);
        assert_eq!(picked[1].row, 3);
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(Table::from_json_str(r#"{"Name": "x"}"#, "Name").is_err());
    }
}
