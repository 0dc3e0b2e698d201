//! Compiler for coupled-run configuration documents.
//!
//! Takes a flat table of field exchanges between simulation components and
//! produces one configuration section per component, holding its field
//! definitions, coupler endpoints and restart/output files.
//!
//! ```
//! use cplgen_core::compiler::CouplingCompiler;
//! use cplgen_core::config::RunConfig;
//! use cplgen_core::emit::render_xml;
//! use cplgen_core::table::CouplingTable;
//!
//! let table = CouplingTable::from_csv_str(
//!     "src_comp,src_var,dst_comp,dst_var\nocean,sst,atmos,sst_in\n",
//! )
//! .unwrap();
//! let compilation = CouplingCompiler::new(RunConfig::default())
//!     .compile(&table)
//!     .unwrap();
//!
//! assert_eq!(
//!     compilation.document.component_names().collect::<Vec<_>>(),
//!     vec!["ocean", "atmos"]
//! );
//! assert!(render_xml(&compilation.document).contains("sst_to_sst_in"));
//! ```

pub mod compiler;
pub mod config;
pub mod coupling;
pub mod document;
pub mod duration;
pub mod emit;
pub mod registry;
pub mod section;
pub mod table;
pub mod temporal;

pub mod errors;
