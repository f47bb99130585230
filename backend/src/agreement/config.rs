//! Agreement configuration
//!
//! [`AgreementConfig`] carries every tunable parameter of an agreement with
//! its default. [`ConfigOverrides`] is the partial form used at deployment:
//! only the fields that are set replace the defaults.
//!
//! All money values are i64 (cents).

use crate::admission::AdmissionPolicyConfig;
use crate::agreement::error::AgreementError;
use serde::{Deserialize, Serialize};

/// Complete agreement configuration
///
/// # Example
/// ```
/// use proposal_inverter_core_rs::AgreementConfig;
///
/// let config = AgreementConfig::default();
/// assert_eq!(config.allocation_per_epoch, 10_00);
/// assert_eq!(config.min_epochs, 28);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgreementConfig {
    /// Minimum funds a broker must stake to join (cents)
    pub min_stake: i64,

    /// Epoch the agreement starts at
    pub current_epoch: usize,

    /// Last epoch at which the sustainability conditions held
    pub cancel_epoch: usize,

    /// Length of one epoch, in seconds
    pub epoch_length: u64,

    /// Epochs a broker must stay to get the stake back on exit
    pub min_epochs: usize,

    /// Funds allocated to all brokers per epoch (cents)
    pub allocation_per_epoch: i64,

    /// Minimum number of future epochs the agreement must be able to fund
    pub min_horizon: f64,

    /// Minimum number of brokers required to continue
    pub min_brokers: usize,

    /// Maximum number of brokers that can join
    pub max_brokers: usize,

    /// Epochs the agreement may stay unsustainable before a forced cancel
    pub buffer_period: usize,

    /// Broker admission policy
    pub admission: AdmissionPolicyConfig,
}

impl Default for AgreementConfig {
    fn default() -> Self {
        Self {
            min_stake: 5_00,
            current_epoch: 0,
            cancel_epoch: 0,
            epoch_length: 60 * 60 * 24,
            min_epochs: 28,
            allocation_per_epoch: 10_00,
            min_horizon: 7.0,
            min_brokers: 1,
            max_brokers: 5,
            buffer_period: 5,
            admission: AdmissionPolicyConfig::default(),
        }
    }
}

impl AgreementConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), AgreementError> {
        if self.allocation_per_epoch <= 0 {
            return Err(AgreementError::InvalidConfig(
                "allocation_per_epoch must be > 0".to_string(),
            ));
        }

        if self.epoch_length == 0 {
            return Err(AgreementError::InvalidConfig(
                "epoch_length must be > 0".to_string(),
            ));
        }

        if self.min_stake < 0 {
            return Err(AgreementError::InvalidConfig(
                "min_stake must be >= 0".to_string(),
            ));
        }

        if self.max_brokers == 0 {
            return Err(AgreementError::InvalidConfig(
                "max_brokers must be > 0".to_string(),
            ));
        }

        if !self.min_horizon.is_finite() || self.min_horizon < 0.0 {
            return Err(AgreementError::InvalidConfig(format!(
                "min_horizon must be a finite non-negative number, got {}",
                self.min_horizon
            )));
        }

        if self.cancel_epoch > self.current_epoch {
            return Err(AgreementError::InvalidConfig(format!(
                "cancel_epoch ({}) must not be after current_epoch ({})",
                self.cancel_epoch, self.current_epoch
            )));
        }

        self.admission
            .validate()
            .map_err(AgreementError::InvalidConfig)
    }

    /// Horizon `funds` would buy at this configuration's allocation rate
    pub fn horizon_for(&self, funds: i64) -> f64 {
        funds as f64 / self.allocation_per_epoch as f64
    }
}

/// Partial configuration merged onto the defaults at deployment
///
/// # Example
/// ```
/// use proposal_inverter_core_rs::{AgreementConfig, ConfigOverrides};
///
/// let overrides = ConfigOverrides {
///     min_brokers: Some(2),
///     ..Default::default()
/// };
/// let config = overrides.apply(AgreementConfig::default());
/// assert_eq!(config.min_brokers, 2);
/// assert_eq!(config.max_brokers, 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    pub min_stake: Option<i64>,
    pub current_epoch: Option<usize>,
    pub cancel_epoch: Option<usize>,
    pub epoch_length: Option<u64>,
    pub min_epochs: Option<usize>,
    pub allocation_per_epoch: Option<i64>,
    pub min_horizon: Option<f64>,
    pub min_brokers: Option<usize>,
    pub max_brokers: Option<usize>,
    pub buffer_period: Option<usize>,
    pub admission: Option<AdmissionPolicyConfig>,
}

impl ConfigOverrides {
    /// Replace every field of `base` that is set in `self`
    pub fn apply(self, base: AgreementConfig) -> AgreementConfig {
        AgreementConfig {
            min_stake: self.min_stake.unwrap_or(base.min_stake),
            current_epoch: self.current_epoch.unwrap_or(base.current_epoch),
            cancel_epoch: self.cancel_epoch.unwrap_or(base.cancel_epoch),
            epoch_length: self.epoch_length.unwrap_or(base.epoch_length),
            min_epochs: self.min_epochs.unwrap_or(base.min_epochs),
            allocation_per_epoch: self
                .allocation_per_epoch
                .unwrap_or(base.allocation_per_epoch),
            min_horizon: self.min_horizon.unwrap_or(base.min_horizon),
            min_brokers: self.min_brokers.unwrap_or(base.min_brokers),
            max_brokers: self.max_brokers.unwrap_or(base.max_brokers),
            buffer_period: self.buffer_period.unwrap_or(base.buffer_period),
            admission: self.admission.unwrap_or(base.admission),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_parameters() {
        let config = AgreementConfig::default();
        assert_eq!(config.min_stake, 5_00);
        assert_eq!(config.epoch_length, 86_400);
        assert_eq!(config.min_horizon, 7.0);
        assert_eq!(config.min_brokers, 1);
        assert_eq!(config.max_brokers, 5);
        assert_eq!(config.buffer_period, 5);
        assert_eq!(config.admission, AdmissionPolicyConfig::Open);
    }

    #[test]
    fn test_zero_allocation_rejected() {
        let config = AgreementConfig {
            allocation_per_epoch: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AgreementError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_cancel_epoch_after_current_rejected() {
        let config = AgreementConfig {
            current_epoch: 2,
            cancel_epoch: 3,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_deserialize_from_partial_json() {
        let overrides: ConfigOverrides =
            serde_json::from_str(r#"{"min_brokers": 2, "buffer_period": 3}"#).unwrap();
        let config = overrides.apply(AgreementConfig::default());

        assert_eq!(config.min_brokers, 2);
        assert_eq!(config.buffer_period, 3);
        assert_eq!(config.min_stake, 5_00);
    }

    #[test]
    fn test_full_config_deserializes_with_defaults() {
        let config: AgreementConfig =
            serde_json::from_str(r#"{"allocation_per_epoch": 2000}"#).unwrap();
        assert_eq!(config.allocation_per_epoch, 2_000);
        assert_eq!(config.min_epochs, 28);
    }

    #[test]
    fn test_horizon_for() {
        let config = AgreementConfig::default();
        assert_eq!(config.horizon_for(500_00), 50.0);
    }
}
