//! Command-line pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use cplgen_core::compiler::{Compilation, CouplingCompiler};
use cplgen_core::config::RunConfig;
use cplgen_core::duration::Duration;
use cplgen_core::emit::{render, write_atomically, OutputFormat};
use cplgen_core::table::CouplingTable;
use std::path::PathBuf;
use tracing::info;

/// Generate a coupled-run configuration from a coupling table
#[derive(Parser, Debug)]
#[command(name = "cplgen")]
#[command(about = "Compile a table of field exchanges into a coupling configuration document")]
pub struct Cli {
    /// CSV table with src_comp, src_var, dst_comp and dst_var columns
    pub table: PathBuf,

    /// Output document
    #[arg(short, long, default_value = "coupling_config.xml")]
    pub output: PathBuf,

    /// TOML run configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format (xml or json)
    #[arg(short, long, default_value = "xml")]
    pub format: OutputFormat,

    /// Also write the component graph in Graphviz format
    #[arg(long)]
    pub dot: Option<PathBuf>,

    /// Log the variables each component sends and receives
    #[arg(long)]
    pub summary: bool,

    /// Base model timestep, e.g. 3600s
    #[arg(long)]
    pub timestep: Option<Duration>,

    /// Total run duration, e.g. 1d
    #[arg(long)]
    pub duration: Option<Duration>,

    /// Send frequency of every exchange, e.g. 1ts
    #[arg(long)]
    pub send_freq: Option<Duration>,

    /// Receive frequency of every exchange, e.g. 1ts
    #[arg(long)]
    pub recv_freq: Option<Duration>,
}

impl Cli {
    /// The file configuration (or defaults) with command-line overrides applied.
    pub fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_path(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
            None => RunConfig::default(),
        };
        if let Some(timestep) = self.timestep {
            config.timestep = timestep;
        }
        if let Some(duration) = self.duration {
            config.total_duration = duration;
        }
        if let Some(send_freq) = self.send_freq {
            config.exchange.send_freq = send_freq;
        }
        if let Some(recv_freq) = self.recv_freq {
            config.exchange.recv_freq = recv_freq;
        }
        Ok(config)
    }
}

/// Load, compile and write. Nothing is written unless compilation succeeds.
pub fn execute(cli: &Cli) -> Result<Compilation> {
    let config = cli.run_config()?;
    let table = CouplingTable::from_path(&cli.table)
        .with_context(|| format!("Failed to load coupling table {}", cli.table.display()))?;
    info!(
        rows = table.len(),
        components = table.components().len(),
        "Loaded coupling table"
    );

    if cli.summary {
        for component in table.summary() {
            info!(
                component = %component.name,
                sends = ?component.sends,
                receives = ?component.receives,
                "Component summary"
            );
        }
    }

    let compilation = CouplingCompiler::new(config)
        .compile(&table)
        .context("Compilation failed")?;

    let rendered = render(&compilation.document, cli.format)?;
    write_atomically(&cli.output, &rendered)?;
    if let Some(dot) = &cli.dot {
        write_atomically(dot, &compilation.topology.as_dot())?;
    }
    Ok(compilation)
}
