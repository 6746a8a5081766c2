//! # Carrier Policy
//!
//! Operator-specific overrides selected by identity:
//!
//! - an alternate RSRP threshold table replacing the default LTE bar
//!   boundaries while registered on an allow-listed network (MCC+MNC);
//! - a forced "extended" display style for devices provisioned for a
//!   specific carrier.
//!
//! Pure lookups against fixed lists; no side effects.

use crate::config::{CarrierConfig, DisplayStyle};
use crate::rat::SignalLevel;

/// Provisioned carrier identity that always renders the extended style.
pub const EXTENDED_STYLE_CARRIER: &str = "405854";

/// Lower RSRP bounds (dBm) for the POOR, MODERATE, GOOD and GREAT buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsrpThresholds {
    pub poor: i32,
    pub moderate: i32,
    pub good: i32,
    pub great: i32,
}

impl RsrpThresholds {
    /// Builds a table from exactly four strictly ascending values.
    pub fn from_slice(values: &[i32]) -> Option<Self> {
        let [poor, moderate, good, great] = values else {
            return None;
        };
        if !(poor < moderate && moderate < good && good < great) {
            return None;
        }
        Some(RsrpThresholds {
            poor: *poor,
            moderate: *moderate,
            good: *good,
            great: *great,
        })
    }

    /// Buckets an RSRP reading. Readings above -44 dBm are invalid.
    pub fn level(&self, rsrp_dbm: i32) -> SignalLevel {
        if rsrp_dbm > -44 {
            SignalLevel::NoneOrUnknown
        } else if rsrp_dbm >= self.great {
            SignalLevel::Great
        } else if rsrp_dbm >= self.good {
            SignalLevel::Good
        } else if rsrp_dbm >= self.moderate {
            SignalLevel::Moderate
        } else if rsrp_dbm >= self.poor {
            SignalLevel::Poor
        } else {
            SignalLevel::NoneOrUnknown
        }
    }
}

/// Result of matching the registered operator against the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CarrierMatch {
    pub allow_listed: bool,
    pub thresholds: Option<RsrpThresholds>,
}

#[derive(Debug, Clone, Default)]
pub struct CarrierPolicy {
    networks: Vec<String>,
    thresholds: Option<RsrpThresholds>,
    provisioned: Option<String>,
}

impl CarrierPolicy {
    pub fn new(
        networks: Vec<String>,
        thresholds: Option<RsrpThresholds>,
        provisioned: Option<String>,
    ) -> Self {
        CarrierPolicy {
            networks,
            thresholds,
            provisioned,
        }
    }

    pub fn from_config(config: &CarrierConfig) -> Self {
        Self::new(
            config.networks.clone(),
            config.thresholds,
            config.provisioned.clone(),
        )
    }

    /// Matches an operator numeric (MCC+MNC) against the allow-list.
    pub fn evaluate(&self, operator_numeric: Option<&str>) -> CarrierMatch {
        let allow_listed = operator_numeric
            .filter(|numeric| !numeric.is_empty())
            .is_some_and(|numeric| self.networks.iter().any(|n| n == numeric));
        CarrierMatch {
            allow_listed,
            thresholds: if allow_listed { self.thresholds } else { None },
        }
    }

    /// Picks the display style, honouring the provisioned-carrier override.
    pub fn display_style(&self, configured: DisplayStyle) -> DisplayStyle {
        if self.provisioned.as_deref() == Some(EXTENDED_STYLE_CARRIER) {
            DisplayStyle::Extended
        } else {
            configured
        }
    }
}
