//! Temporal parameters shared by every coupling of a run.

use crate::config::{ExchangeConfig, RestartConfig, RunConfig};
use crate::duration::Duration;
use crate::errors::CplResult;
use serde::{Deserialize, Serialize};

/// Frequencies and offsets governing sampling, exchange and file I/O.
///
/// Resolved once per compilation and shared (via `Arc`) by every endpoint
/// and file built from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalParams {
    /// Temporal operation applied when sampling a sender field
    pub operation: String,
    pub sampling_freq: Duration,
    pub sampling_offset: Duration,
    pub send_freq: Duration,
    pub recv_freq: Duration,
    pub recv_offset: Duration,
    /// Restart channel cadence on the outbound endpoint
    pub restart_send_freq: Duration,
    /// Restart channel cadence on the inbound endpoint
    pub restart_recv_freq: Duration,
    pub restart_recv_offset: Duration,
    pub file_output_freq: Duration,
    pub file_restart_output_freq: Duration,
    pub file_restart_record_offset: String,
}

impl TemporalParams {
    /// Resolve the parameters for a run.
    ///
    /// The receive offset is `recv_freq + 1ts` unless the exchange
    /// configuration supplies one explicitly. Deriving it from a calendar
    /// frequency (e.g. `1d`) is an error.
    pub fn resolve(
        total_duration: Duration,
        exchange: &ExchangeConfig,
        restart: &RestartConfig,
    ) -> CplResult<Self> {
        let recv_offset = match exchange.recv_offset {
            Some(offset) => offset,
            None => exchange.recv_freq.offset_by_timesteps(1)?,
        };

        Ok(Self {
            operation: exchange.operation.clone(),
            sampling_freq: exchange.sampling_freq,
            sampling_offset: exchange.sampling_offset,
            send_freq: exchange.send_freq,
            recv_freq: exchange.recv_freq,
            recv_offset,
            restart_send_freq: restart.send_freq,
            restart_recv_freq: restart.recv_freq,
            restart_recv_offset: restart.recv_offset,
            file_output_freq: total_duration,
            file_restart_output_freq: restart.file_output_freq,
            file_restart_record_offset: restart.record_offset.clone(),
        })
    }

    /// Resolve with the standard sampling defaults: instantaneous sampling
    /// every timestep with no offset.
    pub fn standard(
        total_duration: Duration,
        send_freq: Duration,
        recv_freq: Duration,
    ) -> CplResult<Self> {
        let exchange = ExchangeConfig {
            send_freq,
            recv_freq,
            ..ExchangeConfig::default()
        };
        Self::resolve(total_duration, &exchange, &RestartConfig::default())
    }

    pub fn from_config(config: &RunConfig) -> CplResult<Self> {
        Self::resolve(config.total_duration, &config.exchange, &config.restart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::DurationUnit;
    use crate::errors::CplError;

    fn ts(n: i64) -> Duration {
        Duration::timesteps(n)
    }

    #[test]
    fn derives_receive_offset() {
        let day = Duration::new(1, DurationUnit::Day);

        let params = TemporalParams::standard(day, ts(1), ts(3)).unwrap();
        assert_eq!(params.recv_offset.to_string(), "4ts");

        let params = TemporalParams::standard(day, ts(1), ts(1)).unwrap();
        assert_eq!(params.recv_offset.to_string(), "2ts");
    }

    #[test]
    fn standard_defaults() {
        let day = Duration::new(1, DurationUnit::Day);
        let params = TemporalParams::standard(day, ts(1), ts(1)).unwrap();

        assert_eq!(params.operation, "instant");
        assert_eq!(params.sampling_freq, ts(1));
        assert_eq!(params.sampling_offset, ts(0));
        assert_eq!(params.file_output_freq, day);
        assert_eq!(params.restart_send_freq.to_string(), "1y");
        assert_eq!(params.restart_recv_freq.to_string(), "1y");
        assert_eq!(params.restart_recv_offset.to_string(), "1ts");
        assert_eq!(params.file_restart_output_freq.to_string(), "100000y");
        assert_eq!(params.file_restart_record_offset, "0");
    }

    #[test]
    fn calendar_receive_frequency_needs_explicit_offset() {
        let day = Duration::new(1, DurationUnit::Day);
        let hourly = Duration::new(1, DurationUnit::Hour);

        let err = TemporalParams::standard(day, ts(1), hourly).unwrap_err();
        assert!(matches!(err, CplError::UnsupportedOffsetUnit { .. }));

        let exchange = ExchangeConfig {
            recv_freq: hourly,
            recv_offset: Some(ts(2)),
            ..ExchangeConfig::default()
        };
        let params = TemporalParams::resolve(day, &exchange, &RestartConfig::default()).unwrap();
        assert_eq!(params.recv_offset, ts(2));
    }

    #[test]
    fn restart_constants_follow_configuration() {
        let config = RunConfig::from_toml_str(
            r#"
            [restart]
            send_freq = "2y"
            recv_freq = "500y"
            recv_offset = "3ts"
            record_offset = "-1"
            "#,
        )
        .unwrap();
        let params = TemporalParams::from_config(&config).unwrap();
        assert_eq!(params.restart_send_freq.to_string(), "2y");
        assert_eq!(params.restart_recv_freq.to_string(), "500y");
        assert_eq!(params.restart_recv_offset.to_string(), "3ts");
        assert_eq!(params.file_restart_record_offset, "-1");
    }
}
