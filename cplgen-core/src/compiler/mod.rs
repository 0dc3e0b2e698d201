//! The coupling-configuration compiler.
//!
//! Compilation is a single in-memory pass over the coupling table:
//!
//! 1. The temporal parameters of the run are resolved once and shared by
//!    every coupling.
//! 2. One empty [`ComponentSection`](crate::section::ComponentSection) is
//!    created per distinct component.
//! 3. Each row is turned into a [`CouplingRecord`] and wired into its sender
//!    and receiver sections by the [`CouplingGraphBuilder`].
//!
//! Any error aborts the whole compilation. The caller only ever receives a
//! complete [`Compilation`], so nothing partial can reach the emitters.

mod builder;
mod topology;

#[cfg(test)]
mod tests;

pub use builder::CouplingGraphBuilder;
pub use topology::CouplingTopology;

use crate::config::RunConfig;
use crate::coupling::CouplingRecord;
use crate::document::{Document, TRANSPORT_CONTEXT_ID};
use crate::errors::{CplError, CplResult};
use crate::section::ContextBuilder;
use crate::table::CouplingTable;
use crate::temporal::TemporalParams;
use std::sync::Arc;
use tracing::info;

/// Result of a successful compilation.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub document: Document,
    pub topology: CouplingTopology,
    pub temporal: Arc<TemporalParams>,
}

#[derive(Debug, Clone, Default)]
pub struct CouplingCompiler {
    config: RunConfig,
}

impl CouplingCompiler {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Compile a table, deriving the component set from its rows.
    pub fn compile(&self, table: &CouplingTable) -> CplResult<Compilation> {
        self.compile_with_components(&table.components(), table)
    }

    /// Compile a table against an explicitly declared component set.
    ///
    /// Every component named by a row must be declared, otherwise the
    /// compilation fails with [`CplError::UnknownComponent`]. A component
    /// may not take the transport section's context id.
    pub fn compile_with_components<S: AsRef<str>>(
        &self,
        components: &[S],
        table: &CouplingTable,
    ) -> CplResult<Compilation> {
        if let Some(reserved) = components
            .iter()
            .map(AsRef::as_ref)
            .find(|&name| name == TRANSPORT_CONTEXT_ID)
        {
            return Err(CplError::ReservedComponent {
                component: reserved.to_string(),
            });
        }

        let temporal = Arc::new(TemporalParams::from_config(&self.config)?);
        let sections = ContextBuilder::new(&self.config).build(components);
        let mut builder = CouplingGraphBuilder::new(sections);

        for (i, row) in table.rows().iter().enumerate() {
            let record =
                CouplingRecord::from_row(i + 1, row, &self.config.restart, temporal.clone())?;
            builder.add(&record)?;
        }

        let (document, topology) = builder.finish(&self.config.transport);
        info!(
            components = document.sections.len(),
            couplings = table.len(),
            "Compiled coupling configuration"
        );
        Ok(Compilation {
            document,
            topology,
            temporal,
        })
    }
}
