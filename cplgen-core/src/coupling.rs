//! Coupling records: table rows enriched with the identifiers they generate.

use crate::config::RestartConfig;
use crate::errors::{CplError, CplResult};
use crate::table::{TableRow, DST_COMP, DST_VAR, SRC_COMP, SRC_VAR};
use crate::temporal::TemporalParams;
use std::sync::Arc;

/// One sender-field to receiver-field exchange, with every derived id.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingRecord {
    /// 1-based position of the row in the table
    pub row: usize,
    pub sender: String,
    pub sender_field: String,
    pub receiver: String,
    pub receiver_field: String,
    /// `<sender_field>_to_<receiver_field>`
    pub interface_id: String,
    /// `<receiver_field>_restart`
    pub restart_field: String,
    pub restart_file: String,
    /// Name the restart field is stored under inside the restart file
    pub restart_field_in_file: Option<String>,
    /// `<interface_id>_next`
    pub output_file: String,
    pub temporal: Arc<TemporalParams>,
}

impl CouplingRecord {
    /// Derive a record from a table row.
    ///
    /// Fails with [`CplError::EmptyIdentifier`] if any of the four names is
    /// empty.
    pub fn from_row(
        row_number: usize,
        row: &TableRow,
        restart: &RestartConfig,
        temporal: Arc<TemporalParams>,
    ) -> CplResult<Self> {
        for (column, value) in [
            (SRC_COMP, &row.src_comp),
            (SRC_VAR, &row.src_var),
            (DST_COMP, &row.dst_comp),
            (DST_VAR, &row.dst_var),
        ] {
            if value.trim().is_empty() {
                return Err(CplError::EmptyIdentifier {
                    row: row_number,
                    column: column.to_string(),
                });
            }
        }

        let sender_field = row.src_var.trim().to_string();
        let receiver_field = row.dst_var.trim().to_string();
        let interface_id = format!("{sender_field}_to_{receiver_field}");

        Ok(Self {
            row: row_number,
            sender: row.src_comp.trim().to_string(),
            receiver: row.dst_comp.trim().to_string(),
            restart_field: format!("{receiver_field}_restart"),
            restart_file: restart.file_id.clone(),
            restart_field_in_file: restart.field_name_in_file.clone(),
            output_file: format!("{interface_id}_next"),
            interface_id,
            sender_field,
            receiver_field,
            temporal,
        })
    }

    /// Id of the restart field inside the restart file.
    pub fn restart_file_field(&self) -> String {
        format!("{}_read", self.restart_field)
    }

    /// Display name of the restart field inside the restart file.
    pub fn restart_display_name(&self) -> &str {
        self.restart_field_in_file
            .as_deref()
            .unwrap_or(&self.restart_field)
    }
}
