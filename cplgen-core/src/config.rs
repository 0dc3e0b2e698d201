//! Run-level configuration.
//!
//! Every constant the compiler consumes lives here rather than in the
//! builders, so that a run can be reconfigured from a TOML file without
//! touching code. Each field documents its default, which reproduces the
//! reference coupled run (hourly timestep, one simulated day, 10x10
//! rectilinear grids, exchanges every timestep).
//!
//! # Example
//!
//! ```
//! use cplgen_core::config::RunConfig;
//!
//! let config = RunConfig::from_toml_str(
//!     r#"
//!     total_duration = "2d"
//!
//!     [exchange]
//!     recv_freq = "3ts"
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.total_duration.to_string(), "2d");
//! assert_eq!(config.exchange.recv_freq.to_string(), "3ts");
//! // Everything else keeps its default
//! assert_eq!(config.timestep.to_string(), "3600s");
//! ```

use crate::duration::{Duration, DurationUnit};
use crate::errors::{CplError, CplResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for one compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Base model timestep
    /// default: 3600s
    pub timestep: Duration,

    /// Total simulated duration of the run
    /// default: 1d
    pub total_duration: Duration,

    pub grid: GridConfig,
    pub calendar: CalendarConfig,
    pub exchange: ExchangeConfig,
    pub restart: RestartConfig,
    pub transport: TransportConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timestep: Duration::new(3600, DurationUnit::Second),
            total_duration: Duration::new(1, DurationUnit::Day),
            grid: GridConfig::default(),
            calendar: CalendarConfig::default(),
            exchange: ExchangeConfig::default(),
            restart: RestartConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl RunConfig {
    /// Parse a configuration from a TOML document.
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_toml_str(content: &str) -> CplResult<Self> {
        toml::from_str(content).map_err(|e| CplError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> CplResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CplError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Default grid dimensions shared by every component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Global number of points along the first axis
    /// default: 10
    pub ni_glo: u32,

    /// Global number of points along the second axis
    /// default: 10
    pub nj_glo: u32,

    /// Domain type written to the variable table
    /// default: rectilinear
    pub domain_type: String,

    /// Also declare the grids of every other component in each section
    /// default: false
    pub mirror_remote_grids: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            ni_glo: 10,
            nj_glo: 10,
            domain_type: "rectilinear".to_string(),
            mirror_remote_grids: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// default: Gregorian
    pub calendar_type: String,
    /// default: 2025-01-01
    pub time_origin: String,
    /// default: 2025-01-01
    pub start_date: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_type: "Gregorian".to_string(),
            time_origin: "2025-01-01".to_string(),
            start_date: "2025-01-01".to_string(),
        }
    }
}

/// Cadence of the regular field exchanges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Frequency at which senders push a field to the coupler
    /// default: 1ts
    pub send_freq: Duration,

    /// Frequency at which receivers pull a field from the coupler.
    /// The receive offset is derived from it, so it must be counted in
    /// timesteps unless `recv_offset` is given.
    /// default: 1ts
    pub recv_freq: Duration,

    /// Explicit receive offset, required when `recv_freq` is a calendar unit
    /// default: derived (recv_freq + 1ts)
    pub recv_offset: Option<Duration>,

    /// Temporal operation applied when sampling a sender field
    /// default: instant
    pub operation: String,

    /// default: 1ts
    pub sampling_freq: Duration,

    /// default: 0ts
    pub sampling_offset: Duration,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            send_freq: Duration::timesteps(1),
            recv_freq: Duration::timesteps(1),
            recv_offset: None,
            operation: "instant".to_string(),
            sampling_freq: Duration::timesteps(1),
            sampling_offset: Duration::timesteps(0),
        }
    }
}

/// Restart-cycle constants.
///
/// The large frequencies encode "never re-trigger a restart mid-run": the
/// restart state is read once at start-up and never again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartConfig {
    /// Frequency of the restart channel on the outbound endpoint
    /// default: 1y
    pub send_freq: Duration,

    /// Frequency of the restart channel on the inbound endpoint
    /// default: 1y
    pub recv_freq: Duration,

    /// Offset of the restart channel on the inbound endpoint
    /// default: 1ts
    pub recv_offset: Duration,

    /// Output frequency of the shared restart file
    /// default: 100000y
    pub file_output_freq: Duration,

    /// Record offset of the shared restart file
    /// default: 0
    pub record_offset: String,

    /// Identifier of the restart file shared by all couplings of a sender
    /// default: zero_restart_file
    pub file_id: String,

    /// Name under which restart fields are stored inside the file.
    /// When unset, each field is stored under its own restart field id.
    /// default: zero_restart
    pub field_name_in_file: Option<String>,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            send_freq: Duration::new(1, DurationUnit::Year),
            recv_freq: Duration::new(1, DurationUnit::Year),
            recv_offset: Duration::timesteps(1),
            file_output_freq: Duration::new(100000, DurationUnit::Year),
            record_offset: "0".to_string(),
            file_id: "zero_restart_file".to_string(),
            field_name_in_file: Some("zero_restart".to_string()),
        }
    }
}

/// Settings of the auxiliary transport section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// default: true
    pub print_file: bool,
    /// default: p2p
    pub transport_protocol: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            print_file: true,
            transport_protocol: "p2p".to_string(),
        }
    }
}
