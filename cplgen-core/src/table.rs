//! The coupling table: one row per field exchange.
//!
//! The on-disk form is a comma-separated file with a header row naming at
//! least the columns `src_comp`, `src_var`, `dst_comp` and `dst_var`:
//!
//! ```text
//! src_comp,src_var,dst_comp,dst_var
//! ocean,sst,atmos,sst_in
//! atmos,taux,ocean,taux_in
//! ```
//!
//! Columns may appear in any order and unknown columns are ignored. Fields
//! may be double-quoted to contain commas. Values are whitespace-trimmed;
//! blank lines and lines starting with `#` are skipped. Bytes that are not
//! valid UTF-8 are read as Latin-1.

use crate::errors::{CplError, CplResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SRC_COMP: &str = "src_comp";
pub const SRC_VAR: &str = "src_var";
pub const DST_COMP: &str = "dst_comp";
pub const DST_VAR: &str = "dst_var";

/// A single exchange of `src_var` from `src_comp` into `dst_var` of `dst_comp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub src_comp: String,
    pub src_var: String,
    pub dst_comp: String,
    pub dst_var: String,
}

impl TableRow {
    pub fn new(src_comp: &str, src_var: &str, dst_comp: &str, dst_var: &str) -> Self {
        Self {
            src_comp: src_comp.trim().to_string(),
            src_var: src_var.trim().to_string(),
            dst_comp: dst_comp.trim().to_string(),
            dst_var: dst_var.trim().to_string(),
        }
    }
}

/// Variables a component sends and receives, as reported by
/// [`CouplingTable::summary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSummary {
    pub name: String,
    pub sends: Vec<String>,
    pub receives: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouplingTable {
    rows: Vec<TableRow>,
}

impl CouplingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<TableRow>) -> Self {
        Self { rows }
    }

    pub fn push(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parse a table from comma-separated text.
    pub fn from_csv_str(content: &str) -> CplResult<Self> {
        Self::from_csv_bytes(content.as_bytes())
    }

    /// Parse a table from raw bytes. Fields that are not valid UTF-8 are
    /// decoded as Latin-1.
    pub fn from_csv_bytes(content: &[u8]) -> CplResult<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(content);

        let mut records = reader
            .into_byte_records()
            .filter_map(|record| match record {
                Ok(record) => {
                    let line = record.position().map_or(0, |p| p.line() as usize);
                    let values: Vec<String> = record.iter().map(decode_field).collect();
                    if values.iter().all(String::is_empty) {
                        None
                    } else {
                        Some(Ok((line, values)))
                    }
                }
                Err(e) => Some(Err(table_error(e))),
            });

        let (header_line, mut header) =
            records.next().transpose()?.ok_or_else(|| CplError::Table {
                line: 1,
                details: "missing header row".to_string(),
            })?;
        if let Some(first) = header.first_mut() {
            *first = first.trim_start_matches('\u{feff}').to_string();
        }
        let column = |name: &str| {
            header
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CplError::Table {
                    line: header_line,
                    details: format!("missing column '{name}'"),
                })
        };
        let indexes = [
            column(SRC_COMP)?,
            column(SRC_VAR)?,
            column(DST_COMP)?,
            column(DST_VAR)?,
        ];

        let mut table = Self::new();
        for record in records {
            let (line, values) = record?;
            if values.len() != header.len() {
                return Err(CplError::Table {
                    line,
                    details: format!(
                        "expected {} columns, found {}",
                        header.len(),
                        values.len()
                    ),
                });
            }
            let [src_comp, src_var, dst_comp, dst_var] = indexes.map(|i| values[i].as_str());
            table.push(TableRow::new(src_comp, src_var, dst_comp, dst_var));
        }
        Ok(table)
    }

    /// Read and parse a table file.
    pub fn from_path(path: impl AsRef<Path>) -> CplResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|source| CplError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv_bytes(&content)
    }

    /// Distinct component names in first-seen order.
    ///
    /// Within a row the sender is seen before the receiver. Empty names are
    /// skipped; the compiler reports them against their row.
    pub fn components(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for row in &self.rows {
            for name in [&row.src_comp, &row.dst_comp] {
                if !name.is_empty() && !seen.contains(name) {
                    seen.push(name.clone());
                }
            }
        }
        seen
    }

    /// Distinct variables sent and received by each component.
    pub fn summary(&self) -> Vec<ComponentSummary> {
        let mut summaries: IndexMap<String, ComponentSummary> = self
            .components()
            .into_iter()
            .map(|name| {
                let summary = ComponentSummary {
                    name: name.clone(),
                    sends: vec![],
                    receives: vec![],
                };
                (name, summary)
            })
            .collect();

        for row in &self.rows {
            if let Some(summary) = summaries.get_mut(&row.src_comp) {
                push_unique(&mut summary.sends, &row.src_var);
            }
            if let Some(summary) = summaries.get_mut(&row.dst_comp) {
                push_unique(&mut summary.receives, &row.dst_var);
            }
        }
        summaries.into_values().collect()
    }
}

impl FromIterator<TableRow> for CouplingTable {
    fn from_iter<I: IntoIterator<Item = TableRow>>(iter: I) -> Self {
        Self::from_rows(iter.into_iter().collect())
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

/// Decode a field as UTF-8, falling back to Latin-1 byte for byte.
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(value) => value.trim().to_string(),
        Err(_) => bytes
            .iter()
            .map(|&b| char::from(b))
            .collect::<String>()
            .trim()
            .to_string(),
    }
}

fn table_error(err: csv::Error) -> CplError {
    CplError::Table {
        line: err.position().map_or(0, |p| p.line() as usize),
        details: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows() {
        let table = CouplingTable::from_csv_str(
            "src_comp,src_var,dst_comp,dst_var\n\
             ocean , sst, atmos ,sst_in\n\
             \n\
             # wind stress\n\
             atmos,taux,ocean,taux_in\n",
        )
        .unwrap();

        assert_eq!(
            table.rows(),
            &[
                TableRow::new("ocean", "sst", "atmos", "sst_in"),
                TableRow::new("atmos", "taux", "ocean", "taux_in"),
            ]
        );
    }

    #[test]
    fn columns_in_any_order() {
        let table = CouplingTable::from_csv_str(
            "dst_var,comment,dst_comp,src_var,src_comp\n\
             v,\"first\",B,u,A\n",
        )
        .unwrap();

        assert_eq!(table.rows(), &[TableRow::new("A", "u", "B", "v")]);
    }

    #[test]
    fn quoted_fields_may_contain_commas() {
        let table = CouplingTable::from_csv_str(
            "src_comp,src_var,dst_comp,dst_var,comment\n\
             A,u,B,v,\"sea surface, temperature\"\n\
             \"C\",\"x\",\"A\",\"y\",\n",
        )
        .unwrap();

        assert_eq!(
            table.rows(),
            &[
                TableRow::new("A", "u", "B", "v"),
                TableRow::new("C", "x", "A", "y"),
            ]
        );
    }

    #[test]
    fn latin1_bytes_are_decoded() {
        let content = b"src_comp,src_var,dst_comp,dst_var,units\n\
                        oc\xe9an,sst,atmos,sst_in,\xb0C\n";
        let table = CouplingTable::from_csv_bytes(content).unwrap();

        assert_eq!(table.rows(), &[TableRow::new("oc\u{e9}an", "sst", "atmos", "sst_in")]);
    }

    #[test]
    fn reads_latin1_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coupling.csv");
        std::fs::write(&path, b"src_comp,src_var,dst_comp,dst_var,units\nA,u,B,v,\xb0C\n").unwrap();

        let table = CouplingTable::from_path(&path).unwrap();
        assert_eq!(table.rows(), &[TableRow::new("A", "u", "B", "v")]);
    }

    #[test]
    fn missing_column() {
        let err = CouplingTable::from_csv_str("src_comp,src_var,dst_comp\nA,u,B\n").unwrap_err();
        match err {
            CplError::Table { line, details } => {
                assert_eq!(line, 1);
                assert!(details.contains("dst_var"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn wrong_column_count() {
        let err = CouplingTable::from_csv_str("src_comp,src_var,dst_comp,dst_var\nA,u,B\n")
            .unwrap_err();
        assert!(matches!(err, CplError::Table { line: 2, .. }));
    }

    #[test]
    fn empty_input() {
        let err = CouplingTable::from_csv_str("\n\n").unwrap_err();
        assert!(matches!(err, CplError::Table { .. }));
    }

    #[test]
    fn header_only_is_an_empty_table() {
        let table = CouplingTable::from_csv_str("src_comp,src_var,dst_comp,dst_var\n").unwrap();
        assert!(table.is_empty());
        assert!(table.components().is_empty());
    }

    #[test]
    fn components_in_first_seen_order() {
        let table: CouplingTable = [
            TableRow::new("A", "u", "B", "v"),
            TableRow::new("C", "x", "A", "y"),
            TableRow::new("B", "z", "D", "w"),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.components(), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn summary_lists_distinct_variables() {
        let table: CouplingTable = [
            TableRow::new("A", "u", "B", "v"),
            TableRow::new("A", "u", "C", "w"),
            TableRow::new("B", "s", "A", "t"),
        ]
        .into_iter()
        .collect();

        let summary = table.summary();
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0].name, "A");
        assert_eq!(summary[0].sends, vec!["u"]);
        assert_eq!(summary[0].receives, vec!["t"]);
        assert_eq!(summary[1].name, "B");
        assert_eq!(summary[1].sends, vec!["s"]);
        assert_eq!(summary[1].receives, vec!["v"]);
        assert_eq!(summary[2].receives, vec!["w"]);
    }
}
