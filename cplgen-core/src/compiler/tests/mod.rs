//! Compiler tests covering whole tables rather than single rows.

use crate::compiler::{Compilation, CouplingCompiler};
use crate::config::RunConfig;
use crate::table::{CouplingTable, TableRow};

#[cfg(test)]
mod failures;

pub(crate) fn table(rows: &[(&str, &str, &str, &str)]) -> CouplingTable {
    rows.iter()
        .map(|(sc, sv, dc, dv)| TableRow::new(sc, sv, dc, dv))
        .collect()
}

pub(crate) fn compile(rows: &[(&str, &str, &str, &str)]) -> Compilation {
    CouplingCompiler::new(RunConfig::default())
        .compile(&table(rows))
        .unwrap()
}
