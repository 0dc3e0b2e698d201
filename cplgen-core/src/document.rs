//! The compiled configuration document.
//!
//! A [`Document`] holds one [`ComponentSection`] per component, in the order
//! the components were first seen in the coupling table, followed by a fixed
//! [`TransportSection`]. The entry types below are the leaves of that tree;
//! their attribute sets are what the emitters render.

use crate::duration::Duration;
use crate::registry::{Identified, Registry};
use crate::section::ComponentSection;
use serde::Serialize;

/// Grid identifier owned by a component.
pub fn grid_id(component: &str) -> String {
    format!("grid_2D_{component}")
}

/// Domain identifier owned by a component.
pub fn domain_id(component: &str) -> String {
    format!("domain_{component}")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub sections: Vec<ComponentSection>,
    pub transport: TransportSection,
}

impl Document {
    pub fn section(&self, name: &str) -> Option<&ComponentSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Calendar {
    pub calendar_type: String,
    pub time_origin: String,
    pub start_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridDefinition {
    pub id: String,
    pub domain_id: String,
}

impl GridDefinition {
    pub fn for_component(component: &str) -> Self {
        Self {
            id: grid_id(component),
            domain_id: domain_id(component),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub id: String,
    pub value: String,
}

impl Variable {
    pub fn new(id: impl Into<String>, value: impl ToString) -> Self {
        Self {
            id: id.into(),
            value: value.to_string(),
        }
    }
}

/// A field declared in a component's field registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDefinition {
    /// A field sampled from the component's own grid.
    Sampled {
        id: String,
        grid_ref: String,
        operation: String,
        freq_op: Duration,
        freq_offset: Duration,
    },
    /// A field whose values arrive through the coupler.
    Forwarded { id: String, field_ref: String },
}

impl Identified for FieldDefinition {
    fn id(&self) -> &str {
        match self {
            FieldDefinition::Sampled { id, .. } | FieldDefinition::Forwarded { id, .. } => id,
        }
    }
}

/// Expression that sends the sender's value unchanged.
pub const PASS_THROUGH_EXPR: &str = "@this_ref";

/// Outbound endpoint: everything a component sends to one partner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouplerOut {
    /// Receiving component
    pub partner: String,
    pub fields: Registry<OutboundField>,
}

impl Identified for CouplerOut {
    fn id(&self) -> &str {
        &self.partner
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundField {
    pub id: String,
    pub field_ref: String,
    pub freq_op: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
}

impl Identified for OutboundField {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Inbound endpoint: everything a component receives from one partner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouplerIn {
    /// Sending component
    pub partner: String,
    pub fields: Registry<InboundField>,
}

impl Identified for CouplerIn {
    fn id(&self) -> &str {
        &self.partner
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundField {
    pub id: String,
    pub grid_ref: String,
    pub freq_op: Duration,
    pub freq_offset: Duration,
    pub read_access: bool,
}

impl Identified for InboundField {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    OneFile,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::OneFile => "one_file",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileMode {
    Read,
}

impl FileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileMode::Read => "read",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileDefinition {
    Restart(RestartFile),
    Output(OutputFile),
}

impl Identified for FileDefinition {
    fn id(&self) -> &str {
        match self {
            FileDefinition::Restart(file) => &file.id,
            FileDefinition::Output(file) => &file.id,
        }
    }
}

/// A restart file, shared by every coupling of a sender that restarts
/// from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestartFile {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub file_type: FileType,
    pub output_freq: Duration,
    pub record_offset: String,
    pub mode: FileMode,
    pub fields: Registry<RestartField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestartField {
    pub id: String,
    pub name: String,
    pub grid_ref: String,
    pub operation: String,
    pub read_access: bool,
}

impl Identified for RestartField {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Output file recording the exchanged values of one coupling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    pub id: String,
    pub name: String,
    pub output_freq: Duration,
    pub file_type: FileType,
    pub enabled: bool,
    pub append: bool,
    pub field: OutputField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputField {
    pub field_ref: String,
    pub name: String,
}

/// A typed variable of the transport section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedVariable {
    pub id: String,
    pub var_type: String,
    pub value: String,
}

/// Context id of the transport section. No component may use it.
pub const TRANSPORT_CONTEXT_ID: &str = "xios";

/// Fixed runtime settings for the coupling library itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportSection {
    pub id: String,
    pub group_id: String,
    pub variables: Vec<TypedVariable>,
}

impl TransportSection {
    pub fn from_config(config: &crate::config::TransportConfig) -> Self {
        Self {
            id: TRANSPORT_CONTEXT_ID.to_string(),
            group_id: "parameters".to_string(),
            variables: vec![
                TypedVariable {
                    id: "print_file".to_string(),
                    var_type: "bool".to_string(),
                    value: config.print_file.to_string(),
                },
                TypedVariable {
                    id: "transport_protocol".to_string(),
                    var_type: "string".to_string(),
                    value: config.transport_protocol.clone(),
                },
            ],
        }
    }
}
