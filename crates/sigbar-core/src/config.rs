use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::policy::RsrpThresholds;

pub const CONFIG_VERSION: u32 = 1;

pub const DEFAULT_NETWORK_NAME: &str = "No service";
pub const DEFAULT_NAME_SEPARATOR: &str = " | ";
pub const DEFAULT_NOTIFIER_QUEUE_DEPTH: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid config TOML: {0}")]
    InvalidToml(String),
    #[error("unsupported config version {0}")]
    UnsupportedVersion(u32),
    #[error("display style {0} out of range (expected 0..=4)")]
    InvalidDisplayStyle(u32),
    #[error("carrier threshold table must hold 4 ascending dBm values, got {0:?}")]
    InvalidThresholds(Vec<i32>),
    #[error("phone_count must be at least 1")]
    NoSlots,
}

// ─── Display Style ──────────────────────────────────────────────────────────

/// Status-bar layout mode. Fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayStyle {
    #[default]
    Default,
    Cdma1xCombined,
    DefaultData,
    DataVoice,
    Extended,
}

impl DisplayStyle {
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(DisplayStyle::Default),
            1 => Some(DisplayStyle::Cdma1xCombined),
            2 => Some(DisplayStyle::DefaultData),
            3 => Some(DisplayStyle::DataVoice),
            4 => Some(DisplayStyle::Extended),
            _ => None,
        }
    }

    /// Whether the activity arrows live in the status bar rather than the
    /// secondary panel.
    pub fn shows_mobile_activity(self) -> bool {
        matches!(
            self,
            DisplayStyle::Default | DisplayStyle::DefaultData | DisplayStyle::Extended
        )
    }

    /// Whether the data-type badge is drawn at all.
    pub fn shows_data_type(self) -> bool {
        matches!(self, DisplayStyle::Default | DisplayStyle::Extended)
    }
}

impl fmt::Display for DisplayStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayStyle::Default => write!(f, "default"),
            DisplayStyle::Cdma1xCombined => write!(f, "cdma-1x-combined"),
            DisplayStyle::DefaultData => write!(f, "default-data"),
            DisplayStyle::DataVoice => write!(f, "data-voice"),
            DisplayStyle::Extended => write!(f, "extended"),
        }
    }
}

// ─── Raw Input ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignalConfigInput {
    pub version: u32,
    pub show_at_least_3g: bool,
    pub hspa_data_distinguishable: bool,
    pub show_4g_for_lte: bool,
    pub hide_lte_plus: bool,
    pub always_show_cdma_rssi: bool,
    pub show_rsrp_signal_level_for_lte: bool,
    pub show_rat: bool,
    pub show_locale: bool,
    pub read_icons_from_xml: bool,
    pub display_style: u32,
    pub show_network_indicators: bool,
    pub show_4g_for_hspap: bool,
    pub show_4glte_for_lte: bool,
    pub show_signal_for_iwlan: bool,
    pub show_4g_for_iwlan: bool,
    pub data_signal_control: bool,
    pub show_long_operator_name: bool,
    pub show_long_operator_name_when_roaming: bool,
    pub network_name_separator: Option<String>,
    pub network_name_default: Option<String>,
    pub phone_count: Option<u32>,
    pub notifier_queue_depth: Option<usize>,
    pub carrier: CarrierConfigInput,
    pub locale_names: Vec<LocaleNameInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CarrierConfigInput {
    pub networks: Vec<String>,
    pub thresholds: Vec<i32>,
    pub provisioned: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocaleNameInput {
    pub origin: String,
    pub localized: String,
}

// ─── Resolved Config ────────────────────────────────────────────────────────

/// Carrier allow-list settings feeding [`CarrierPolicy`](crate::policy::CarrierPolicy).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarrierConfig {
    pub networks: Vec<String>,
    pub thresholds: Option<RsrpThresholds>,
    pub provisioned: Option<String>,
}

/// Immutable indicator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalConfig {
    pub version: u32,
    pub show_at_least_3g: bool,
    pub hspa_data_distinguishable: bool,
    pub show_4g_for_lte: bool,
    pub hide_lte_plus: bool,
    pub always_show_cdma_rssi: bool,
    pub show_rsrp_signal_level_for_lte: bool,
    pub show_rat: bool,
    pub show_locale: bool,
    pub read_icons_from_xml: bool,
    pub display_style: DisplayStyle,
    /// Distinct E/3G+/H+/LTE+ badges and cell-identity handover tracking.
    pub show_network_indicators: bool,
    pub show_4g_for_hspap: bool,
    pub show_4glte_for_lte: bool,
    /// VoWiFi registration counts as service for the signal bars.
    pub show_signal_for_iwlan: bool,
    pub show_4g_for_iwlan: bool,
    pub data_signal_control: bool,
    pub show_long_operator_name: bool,
    pub show_long_operator_name_when_roaming: bool,
    pub network_name_separator: String,
    pub network_name_default: String,
    /// Number of modem slots; valid slot indices are `0..phone_count`.
    pub phone_count: u32,
    pub notifier_queue_depth: usize,
    pub carrier: CarrierConfig,
    pub locale_names: HashMap<String, String>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            show_at_least_3g: false,
            hspa_data_distinguishable: false,
            show_4g_for_lte: false,
            hide_lte_plus: false,
            always_show_cdma_rssi: false,
            show_rsrp_signal_level_for_lte: false,
            show_rat: false,
            show_locale: false,
            read_icons_from_xml: false,
            display_style: DisplayStyle::Default,
            show_network_indicators: false,
            show_4g_for_hspap: false,
            show_4glte_for_lte: false,
            show_signal_for_iwlan: false,
            show_4g_for_iwlan: false,
            data_signal_control: false,
            show_long_operator_name: false,
            show_long_operator_name_when_roaming: false,
            network_name_separator: DEFAULT_NAME_SEPARATOR.to_string(),
            network_name_default: DEFAULT_NETWORK_NAME.to_string(),
            phone_count: 1,
            notifier_queue_depth: DEFAULT_NOTIFIER_QUEUE_DEPTH,
            carrier: CarrierConfig::default(),
            locale_names: HashMap::new(),
        }
    }
}

impl SignalConfigInput {
    pub fn resolve(self) -> Result<SignalConfig, ConfigError> {
        let version = if self.version == 0 {
            CONFIG_VERSION
        } else {
            self.version
        };
        if version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(version));
        }

        let display_style = DisplayStyle::from_index(self.display_style)
            .ok_or(ConfigError::InvalidDisplayStyle(self.display_style))?;

        let phone_count = self.phone_count.unwrap_or(1);
        if phone_count == 0 {
            return Err(ConfigError::NoSlots);
        }

        let thresholds = if self.carrier.thresholds.is_empty() {
            None
        } else {
            Some(
                RsrpThresholds::from_slice(&self.carrier.thresholds).ok_or_else(|| {
                    ConfigError::InvalidThresholds(self.carrier.thresholds.clone())
                })?,
            )
        };

        let networks = self
            .carrier
            .networks
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        let provisioned = self
            .carrier
            .provisioned
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let locale_names = self
            .locale_names
            .into_iter()
            .filter(|entry| !entry.origin.is_empty())
            .map(|entry| (entry.origin, entry.localized))
            .collect();

        let defaults = SignalConfig::default();
        Ok(SignalConfig {
            version,
            show_at_least_3g: self.show_at_least_3g,
            hspa_data_distinguishable: self.hspa_data_distinguishable,
            show_4g_for_lte: self.show_4g_for_lte,
            hide_lte_plus: self.hide_lte_plus,
            always_show_cdma_rssi: self.always_show_cdma_rssi,
            show_rsrp_signal_level_for_lte: self.show_rsrp_signal_level_for_lte,
            show_rat: self.show_rat,
            show_locale: self.show_locale,
            read_icons_from_xml: self.read_icons_from_xml,
            display_style,
            show_network_indicators: self.show_network_indicators,
            show_4g_for_hspap: self.show_4g_for_hspap,
            show_4glte_for_lte: self.show_4glte_for_lte,
            show_signal_for_iwlan: self.show_signal_for_iwlan,
            show_4g_for_iwlan: self.show_4g_for_iwlan,
            data_signal_control: self.data_signal_control,
            show_long_operator_name: self.show_long_operator_name,
            show_long_operator_name_when_roaming: self.show_long_operator_name_when_roaming,
            network_name_separator: self
                .network_name_separator
                .unwrap_or(defaults.network_name_separator),
            network_name_default: self
                .network_name_default
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.network_name_default),
            phone_count,
            notifier_queue_depth: self
                .notifier_queue_depth
                .unwrap_or(defaults.notifier_queue_depth)
                .max(1),
            carrier: CarrierConfig {
                networks,
                thresholds,
                provisioned,
            },
            locale_names,
        })
    }
}

impl SignalConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        if input.trim().is_empty() {
            return Ok(SignalConfig::default());
        }
        let parsed: SignalConfigInput =
            toml::from_str(input).map_err(|e| ConfigError::InvalidToml(e.to_string()))?;
        parsed.resolve()
    }
}
