//! # Radio Model
//!
//! Finite enumerations for everything the modem reports as a raw integer:
//! radio access technology, registration state, data connection state and
//! data activity direction. Unrecognised codes never escape as integers;
//! they collapse into the `Unknown` (or equivalent) variant.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Radio Access Technology ────────────────────────────────────────────────

/// Radio access technology reported for the voice or data bearer.
///
/// Discriminants follow the telephony network-type codes, so ordering by
/// code (used by the handover ratchet) is the derived `Ord`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum RadioAccessType {
    Gprs = 1,
    Edge = 2,
    Umts = 3,
    Cdma = 4,
    #[serde(rename = "evdo_0")]
    Evdo0 = 5,
    #[serde(rename = "evdo_a")]
    EvdoA = 6,
    #[serde(rename = "1xrtt")]
    OneXRtt = 7,
    Hsdpa = 8,
    Hsupa = 9,
    Hspa = 10,
    Iden = 11,
    #[serde(rename = "evdo_b")]
    EvdoB = 12,
    Lte = 13,
    Ehrpd = 14,
    Hspap = 15,
    Gsm = 16,
    TdScdma = 17,
    Iwlan = 18,
    /// LTE with carrier aggregation. Never reported by the radio layer
    /// directly; synthesised from `Lte` + the carrier-aggregation flag.
    LteCa = 19,
    /// Declared last for the serde fallback; the code still orders first.
    #[default]
    #[serde(other)]
    Unknown = 0,
}

impl RadioAccessType {
    /// Every variant, in code order.
    pub const ALL: [RadioAccessType; 20] = [
        Self::Unknown,
        Self::Gprs,
        Self::Edge,
        Self::Umts,
        Self::Cdma,
        Self::Evdo0,
        Self::EvdoA,
        Self::OneXRtt,
        Self::Hsdpa,
        Self::Hsupa,
        Self::Hspa,
        Self::Iden,
        Self::EvdoB,
        Self::Lte,
        Self::Ehrpd,
        Self::Hspap,
        Self::Gsm,
        Self::TdScdma,
        Self::Iwlan,
        Self::LteCa,
    ];

    /// Maps a raw telephony network-type code. Out-of-range codes resolve
    /// to [`RadioAccessType::Unknown`].
    pub fn from_code(code: i32) -> Self {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .unwrap_or(Self::Unknown)
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_lte_family(self) -> bool {
        matches!(self, Self::Lte | Self::LteCa)
    }

    /// Applies the carrier-aggregation upgrade: `Lte` becomes `LteCa`.
    pub fn with_carrier_aggregation(self, aggregated: bool) -> Self {
        if aggregated && self == Self::Lte {
            Self::LteCa
        } else {
            self
        }
    }

    /// Generation bucket used for the name suffix ("2G"/"3G"/"4G").
    pub fn network_class(self) -> NetworkClass {
        match self {
            Self::Gprs | Self::Edge | Self::Cdma | Self::OneXRtt | Self::Iden | Self::Gsm => {
                NetworkClass::TwoG
            }
            Self::Umts
            | Self::Evdo0
            | Self::EvdoA
            | Self::Hsdpa
            | Self::Hsupa
            | Self::Hspa
            | Self::EvdoB
            | Self::Ehrpd
            | Self::Hspap
            | Self::TdScdma => NetworkClass::ThreeG,
            Self::Lte | Self::LteCa | Self::Iwlan => NetworkClass::FourG,
            Self::Unknown => NetworkClass::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Gprs => "GPRS",
            Self::Edge => "EDGE",
            Self::Umts => "UMTS",
            Self::Cdma => "CDMA",
            Self::Evdo0 => "CDMA - EvDo rev. 0",
            Self::EvdoA => "CDMA - EvDo rev. A",
            Self::OneXRtt => "CDMA - 1xRTT",
            Self::Hsdpa => "HSDPA",
            Self::Hsupa => "HSUPA",
            Self::Hspa => "HSPA",
            Self::Iden => "iDEN",
            Self::EvdoB => "CDMA - EvDo rev. B",
            Self::Lte => "LTE",
            Self::Ehrpd => "CDMA - eHRPD",
            Self::Hspap => "HSPA+",
            Self::Gsm => "GSM",
            Self::TdScdma => "TD_SCDMA",
            Self::Iwlan => "IWLAN",
            Self::LteCa => "LTE_CA",
        }
    }
}

impl fmt::Display for RadioAccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Coarse generation of a RAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkClass {
    Unknown,
    TwoG,
    ThreeG,
    FourG,
}

impl NetworkClass {
    /// Abbreviation appended to operator names. Empty for `Unknown`.
    pub fn abbreviation(self) -> &'static str {
        match self {
            NetworkClass::Unknown => "",
            NetworkClass::TwoG => "2G",
            NetworkClass::ThreeG => "3G",
            NetworkClass::FourG => "4G",
        }
    }
}

// ─── Registration / Data State ──────────────────────────────────────────────

/// Voice or data registration state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegState {
    InService,
    EmergencyOnly,
    PowerOff,
    #[default]
    #[serde(other)]
    OutOfService,
}

impl RegState {
    /// Maps a raw service-state code (0 in service, 1 out of service,
    /// 2 emergency only, 3 power off).
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => RegState::InService,
            2 => RegState::EmergencyOnly,
            3 => RegState::PowerOff,
            _ => RegState::OutOfService,
        }
    }

    pub fn in_service(self) -> bool {
        self == RegState::InService
    }
}

/// Packet data connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataState {
    Connecting,
    Connected,
    Suspended,
    #[default]
    #[serde(other)]
    Disconnected,
}

impl DataState {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => DataState::Connecting,
            2 => DataState::Connected,
            3 => DataState::Suspended,
            _ => DataState::Disconnected,
        }
    }
}

/// Direction of current data traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataActivity {
    In,
    Out,
    InOut,
    Dormant,
    #[default]
    #[serde(other)]
    None,
}

impl DataActivity {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => DataActivity::In,
            2 => DataActivity::Out,
            3 => DataActivity::InOut,
            4 => DataActivity::Dormant,
            _ => DataActivity::None,
        }
    }

    pub fn is_in(self) -> bool {
        matches!(self, DataActivity::In | DataActivity::InOut)
    }

    pub fn is_out(self) -> bool {
        matches!(self, DataActivity::Out | DataActivity::InOut)
    }
}

// ─── Signal Level ───────────────────────────────────────────────────────────

/// Five-step signal bucket shown as bars.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SignalLevel {
    #[default]
    NoneOrUnknown = 0,
    Poor = 1,
    Moderate = 2,
    Good = 3,
    Great = 4,
}

impl SignalLevel {
    /// Clamps an arbitrary raw level into `0..=4`.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            i32::MIN..=0 => SignalLevel::NoneOrUnknown,
            1 => SignalLevel::Poor,
            2 => SignalLevel::Moderate,
            3 => SignalLevel::Good,
            _ => SignalLevel::Great,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Fixed RSRP buckets used when LTE bars are derived from raw RSRP.
///
/// Readings above -44 dBm are physically impossible and treated as the
/// "not applicable" sentinel.
pub fn alternate_lte_level(lte_dbm: i32) -> SignalLevel {
    if lte_dbm > -44 {
        SignalLevel::NoneOrUnknown
    } else if lte_dbm >= -97 {
        SignalLevel::Great
    } else if lte_dbm >= -105 {
        SignalLevel::Good
    } else if lte_dbm >= -113 {
        SignalLevel::Moderate
    } else if lte_dbm >= -120 {
        SignalLevel::Poor
    } else {
        SignalLevel::NoneOrUnknown
    }
}
