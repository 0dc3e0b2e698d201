//! Per-component configuration sections and the context builder.

use crate::config::RunConfig;
use crate::document::{
    Calendar, CouplerIn, CouplerOut, FieldDefinition, FileDefinition, GridDefinition, Variable,
};
use crate::errors::{CplError, CplResult};
use crate::registry::{DuplicateId, Registry};
use indexmap::IndexMap;
use serde::Serialize;

/// Names of the four registries of a section, used in error reports.
pub const FIELDS: &str = "fields";
pub const OUTBOUND: &str = "outbound";
pub const INBOUND: &str = "inbound";
pub const FILES: &str = "files";

/// Configuration owned by a single component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSection {
    pub name: String,
    pub calendar: Calendar,
    /// The component's own grid first, then any mirrored remote grids
    pub grids: Vec<GridDefinition>,
    pub variables: Vec<Variable>,
    pub fields: Registry<FieldDefinition>,
    pub outbound: Registry<CouplerOut>,
    pub inbound: Registry<CouplerIn>,
    pub files: Registry<FileDefinition>,
}

impl ComponentSection {
    /// An empty section with the standard substructure.
    pub fn new(name: &str, config: &RunConfig) -> Self {
        Self {
            name: name.to_string(),
            calendar: Calendar {
                calendar_type: config.calendar.calendar_type.clone(),
                time_origin: config.calendar.time_origin.clone(),
                start_date: config.calendar.start_date.clone(),
            },
            grids: vec![GridDefinition::for_component(name)],
            variables: vec![
                Variable::new("toymodel_timestep_duration", config.timestep),
                Variable::new("toymodel_duration", config.total_duration),
                Variable::new("toymodel_ni_glo", config.grid.ni_glo),
                Variable::new("toymodel_nj_glo", config.grid.nj_glo),
                Variable::new("toymodel_type", &config.grid.domain_type),
            ],
            fields: Registry::new(),
            outbound: Registry::new(),
            inbound: Registry::new(),
            files: Registry::new(),
        }
    }

    pub fn own_grid(&self) -> &GridDefinition {
        &self.grids[0]
    }

    /// Register a field, failing if a different definition already uses its id.
    pub fn define_field(&mut self, field: FieldDefinition) -> CplResult<()> {
        let component = &self.name;
        self.fields
            .insert_or_verify(field)
            .map_err(|e| conflict(component, FIELDS, e))?;
        Ok(())
    }

    /// The outbound endpoint towards `receiver`, created empty if absent.
    pub fn outbound_to(&mut self, receiver: &str) -> &mut CouplerOut {
        self.outbound.get_or_insert_with(receiver, || CouplerOut {
            partner: receiver.to_string(),
            fields: Registry::new(),
        })
    }

    /// The inbound endpoint from `sender`, created empty if absent.
    pub fn inbound_from(&mut self, sender: &str) -> &mut CouplerIn {
        self.inbound.get_or_insert_with(sender, || CouplerIn {
            partner: sender.to_string(),
            fields: Registry::new(),
        })
    }
}

pub(crate) fn conflict(component: &str, registry: &str, duplicate: DuplicateId) -> CplError {
    CplError::FieldConflict {
        component: component.to_string(),
        registry: registry.to_string(),
        id: duplicate.0,
    }
}

/// Sections indexed by component name, in first-seen order.
pub type SectionSet = IndexMap<String, ComponentSection>;

/// Creates the empty per-component sections of a run.
pub struct ContextBuilder<'a> {
    config: &'a RunConfig,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    /// One section per distinct name, in the order given.
    ///
    /// Duplicate names are collapsed onto their first occurrence. An empty
    /// component list yields an empty set.
    pub fn build<S: AsRef<str>>(&self, components: &[S]) -> SectionSet {
        let mut sections = SectionSet::new();
        for name in components {
            let name = name.as_ref();
            if !sections.contains_key(name) {
                sections.insert(name.to_string(), ComponentSection::new(name, self.config));
            }
        }

        if self.config.grid.mirror_remote_grids {
            let names: Vec<String> = sections.keys().cloned().collect();
            for section in sections.values_mut() {
                let own = section.name.clone();
                for other in names.iter().filter(|n| **n != own) {
                    section.grids.push(GridDefinition::for_component(other));
                }
            }
        }

        sections
    }
}
