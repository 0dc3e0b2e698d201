//! Wires coupling records into the component sections.

use crate::config::TransportConfig;
use crate::coupling::CouplingRecord;
use crate::document::{
    grid_id, Document, FieldDefinition, FileDefinition, FileMode, FileType, InboundField,
    OutboundField, OutputField, OutputFile, RestartField, RestartFile, TransportSection,
    PASS_THROUGH_EXPR,
};
use crate::errors::{CplError, CplResult};
use crate::registry::{DuplicateId, Registry};
use crate::section::{conflict, ComponentSection, SectionSet, FILES, INBOUND, OUTBOUND};
use tracing::debug;

use super::topology::CouplingTopology;

/// Accumulates coupling records into a set of pre-built sections.
///
/// Each call to [`add`](Self::add) touches exactly two sections (the sender
/// and the receiver, which may be the same). All lookups go through the
/// id-keyed registries, so repeated ids are either verified identical or
/// rejected, never duplicated.
pub struct CouplingGraphBuilder {
    sections: SectionSet,
    topology: CouplingTopology,
}

impl CouplingGraphBuilder {
    pub fn new(sections: SectionSet) -> Self {
        let mut topology = CouplingTopology::new();
        for name in sections.keys() {
            topology.add_component(name);
        }
        Self { sections, topology }
    }

    pub fn sections(&self) -> &SectionSet {
        &self.sections
    }

    /// Add one coupling.
    ///
    /// On error the builder may hold a partially wired row and must be
    /// discarded.
    pub fn add(&mut self, record: &CouplingRecord) -> CplResult<()> {
        let sender = self.index_of(&record.sender, record.row)?;
        let receiver = self.index_of(&record.receiver, record.row)?;

        wire_sender(&mut self.sections[sender], record)?;
        wire_receiver(&mut self.sections[receiver], record)?;

        self.topology
            .add_coupling(&record.sender, &record.receiver, &record.interface_id);
        debug!(
            row = record.row,
            interface = %record.interface_id,
            sender = %record.sender,
            receiver = %record.receiver,
            "Wired coupling"
        );
        Ok(())
    }

    /// Complete the document with the transport section.
    pub fn finish(self, transport: &TransportConfig) -> (Document, CouplingTopology) {
        let document = Document {
            sections: self.sections.into_values().collect(),
            transport: TransportSection::from_config(transport),
        };
        (document, self.topology)
    }

    fn index_of(&self, component: &str, row: usize) -> CplResult<usize> {
        self.sections
            .get_index_of(component)
            .ok_or_else(|| CplError::UnknownComponent {
                row,
                component: component.to_string(),
            })
    }
}

/// Sampled field, outbound endpoint, restart record and output file.
fn wire_sender(section: &mut ComponentSection, record: &CouplingRecord) -> CplResult<()> {
    let temporal = &record.temporal;
    let component = section.name.clone();
    let grid = grid_id(&record.sender);

    section.define_field(FieldDefinition::Sampled {
        id: record.sender_field.clone(),
        grid_ref: grid,
        operation: temporal.operation.clone(),
        freq_op: temporal.sampling_freq,
        freq_offset: temporal.sampling_offset,
    })?;

    let endpoint = section.outbound_to(&record.receiver);
    for field in [
        OutboundField {
            id: record.interface_id.clone(),
            field_ref: record.sender_field.clone(),
            freq_op: temporal.send_freq,
            expr: Some(PASS_THROUGH_EXPR.to_string()),
        },
        OutboundField {
            id: record.restart_field.clone(),
            field_ref: record.restart_file_field(),
            freq_op: temporal.restart_send_freq,
            expr: None,
        },
    ] {
        endpoint
            .fields
            .insert_or_verify(field)
            .map_err(|e| conflict(&component, OUTBOUND, e))?;
    }

    add_restart_field(section, record)?;

    section
        .files
        .insert_or_verify(FileDefinition::Output(OutputFile {
            id: record.output_file.clone(),
            name: record.output_file.clone(),
            output_freq: temporal.file_output_freq,
            file_type: FileType::OneFile,
            enabled: true,
            append: false,
            field: OutputField {
                field_ref: record.interface_id.clone(),
                name: record.interface_id.clone(),
            },
        }))
        .map_err(|e| conflict(&component, FILES, e))?;
    Ok(())
}

/// Append the record's restart field to the shared restart file, creating
/// the file on first use.
fn add_restart_field(section: &mut ComponentSection, record: &CouplingRecord) -> CplResult<()> {
    let temporal = &record.temporal;
    let component = section.name.clone();

    if section.files.contains(&record.restart_file) {
        debug!(
            file = %record.restart_file,
            component = %component,
            "Reusing restart file"
        );
    }
    let file = section.files.get_or_insert_with(&record.restart_file, || {
        FileDefinition::Restart(RestartFile {
            id: record.restart_file.clone(),
            name: record.restart_file.clone(),
            enabled: true,
            file_type: FileType::OneFile,
            output_freq: temporal.file_restart_output_freq,
            record_offset: temporal.file_restart_record_offset.clone(),
            mode: FileMode::Read,
            fields: Registry::new(),
        })
    });
    let FileDefinition::Restart(file) = file else {
        return Err(conflict(
            &component,
            FILES,
            DuplicateId(record.restart_file.clone()),
        ));
    };

    file.fields
        .insert_or_verify(RestartField {
            id: record.restart_file_field(),
            name: record.restart_display_name().to_string(),
            grid_ref: grid_id(&record.sender),
            operation: "instant".to_string(),
            read_access: true,
        })
        .map_err(|e| conflict(&component, FILES, e))?;
    Ok(())
}

/// Forwarded field and inbound endpoint.
fn wire_receiver(section: &mut ComponentSection, record: &CouplingRecord) -> CplResult<()> {
    let temporal = &record.temporal;
    let component = section.name.clone();
    let sender_grid = grid_id(&record.sender);

    section.define_field(FieldDefinition::Forwarded {
        id: record.receiver_field.clone(),
        field_ref: record.interface_id.clone(),
    })?;

    let endpoint = section.inbound_from(&record.sender);
    for field in [
        InboundField {
            id: record.interface_id.clone(),
            grid_ref: sender_grid.clone(),
            freq_op: temporal.recv_freq,
            freq_offset: temporal.recv_offset,
            read_access: true,
        },
        InboundField {
            id: record.restart_field.clone(),
            grid_ref: sender_grid,
            freq_op: temporal.restart_recv_freq,
            freq_offset: temporal.restart_recv_offset,
            read_access: true,
        },
    ] {
        endpoint
            .fields
            .insert_or_verify(field)
            .map_err(|e| conflict(&component, INBOUND, e))?;
    }
    Ok(())
}
