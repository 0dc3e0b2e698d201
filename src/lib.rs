//! Coupled-run configuration generator.
//!
//! Re-exports the compiler from `cplgen-core` and provides the pipeline
//! behind the `cplgen` binary: load a coupling table, compile it and write
//! the resulting document.

pub mod cli;

pub use cplgen_core::{
    compiler, config, coupling, document, duration, emit, errors, registry, section, table,
    temporal,
};
