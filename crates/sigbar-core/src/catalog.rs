//! # Icon Catalog
//!
//! Static icon identifiers plus the RAT → icon-group lookup.
//!
//! The lookup is a fixed array indexed by RAT code and is built once per
//! [`SignalConfig`]; reconfiguration builds a fresh catalog rather than
//! patching the old one.
//!
//! | Group                  | Data badge  | Typical RAT                 |
//! |------------------------|-------------|-----------------------------|
//! | `G` / `E` / `OneX`     | G / E / 1X  | GPRS, EDGE, CDMA, 1xRTT     |
//! | `ThreeG` / `H`         | 3G / H      | UMTS, EVDO, HSPA family     |
//! | `ThreeGPlus` / `HPlus` | 3G+ / H+    | HSPA family (indicators on) |
//! | `FourG` / `Lte`        | 4G / LTE    | LTE                         |
//! | `FourGPlus`/`LtePlus`  | 4G+ / LTE+  | LTE with carrier aggregation|
//! | `Wfc`                  | none        | IWLAN (Wi-Fi calling)       |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SignalConfig;
use crate::rat::{DataActivity, RadioAccessType, SignalLevel};

/// Opaque drawable identifier handed to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IconId(&'static str);

impl IconId {
    pub const fn new(name: &'static str) -> Self {
        IconId(name)
    }

    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for IconId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

// ─── Icon Groups ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconGroupKind {
    CarrierNetworkChange,
    DataDisabled,
    Unknown,
    G,
    E,
    OneX,
    ThreeG,
    ThreeGPlus,
    H,
    HPlus,
    FourG,
    FourGPlus,
    FourGLte,
    Lte,
    LtePlus,
    Wfc,
}

/// Data-type badge and accessibility text for one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconGroup {
    pub name: &'static str,
    pub data_type: Option<IconId>,
    pub qs_data_type: Option<IconId>,
    pub data_content_description: Option<&'static str>,
}

const fn group(
    name: &'static str,
    data_type: &'static str,
    qs_data_type: &'static str,
    description: &'static str,
) -> IconGroup {
    IconGroup {
        name,
        data_type: Some(IconId::new(data_type)),
        qs_data_type: Some(IconId::new(qs_data_type)),
        data_content_description: Some(description),
    }
}

const CARRIER_NETWORK_CHANGE: IconGroup = IconGroup {
    name: "CARRIER_NETWORK_CHANGE",
    data_type: None,
    qs_data_type: None,
    data_content_description: Some("accessibility_carrier_network_change_mode"),
};
const DATA_DISABLED: IconGroup = group(
    "DataDisabled",
    "stat_sys_data_disabled",
    "ic_qs_data_disabled",
    "accessibility_cell_data_off",
);
const UNKNOWN: IconGroup = IconGroup {
    name: "Unknown",
    data_type: None,
    qs_data_type: None,
    data_content_description: None,
};
const G: IconGroup = group(
    "G",
    "stat_sys_data_fully_connected_g",
    "ic_qs_signal_g",
    "accessibility_data_connection_gprs",
);
const E: IconGroup = group(
    "E",
    "stat_sys_data_fully_connected_e",
    "ic_qs_signal_e",
    "accessibility_data_connection_edge",
);
const ONE_X: IconGroup = group(
    "1X",
    "stat_sys_data_fully_connected_1x",
    "ic_qs_signal_1x",
    "accessibility_data_connection_cdma",
);
const THREE_G: IconGroup = group(
    "3G",
    "stat_sys_data_fully_connected_3g",
    "ic_qs_signal_3g",
    "accessibility_data_connection_3g",
);
const THREE_G_PLUS: IconGroup = group(
    "3G+",
    "stat_sys_data_fully_connected_3g_plus",
    "ic_qs_signal_3g_plus",
    "accessibility_data_connection_3_5g",
);
const H: IconGroup = group(
    "H",
    "stat_sys_data_fully_connected_h",
    "ic_qs_signal_h",
    "accessibility_data_connection_3_5g",
);
const H_PLUS: IconGroup = group(
    "H+",
    "stat_sys_data_fully_connected_h_plus",
    "ic_qs_signal_h_plus",
    "accessibility_data_connection_hspap",
);
const FOUR_G: IconGroup = group(
    "4G",
    "stat_sys_data_fully_connected_4g",
    "ic_qs_signal_4g",
    "accessibility_data_connection_4g",
);
const FOUR_G_PLUS: IconGroup = group(
    "4G+",
    "stat_sys_data_fully_connected_4g_plus",
    "ic_qs_signal_4g_plus",
    "accessibility_data_connection_4g_plus",
);
const FOUR_G_LTE: IconGroup = group(
    "4G LTE",
    "stat_sys_data_fully_connected_4g_lte",
    "ic_qs_signal_4g_lte",
    "accessibility_data_connection_4g_lte",
);
const LTE: IconGroup = group(
    "LTE",
    "stat_sys_data_fully_connected_lte",
    "ic_qs_signal_lte",
    "accessibility_data_connection_lte",
);
const LTE_PLUS: IconGroup = group(
    "LTE+",
    "stat_sys_data_fully_connected_lte_plus",
    "ic_qs_signal_lte_plus",
    "accessibility_data_connection_lte_plus",
);
const WFC: IconGroup = IconGroup {
    name: "WFC",
    data_type: None,
    qs_data_type: None,
    data_content_description: Some("accessibility_data_connection_wfc"),
};

impl IconGroupKind {
    pub fn group(self) -> &'static IconGroup {
        match self {
            IconGroupKind::CarrierNetworkChange => &CARRIER_NETWORK_CHANGE,
            IconGroupKind::DataDisabled => &DATA_DISABLED,
            IconGroupKind::Unknown => &UNKNOWN,
            IconGroupKind::G => &G,
            IconGroupKind::E => &E,
            IconGroupKind::OneX => &ONE_X,
            IconGroupKind::ThreeG => &THREE_G,
            IconGroupKind::ThreeGPlus => &THREE_G_PLUS,
            IconGroupKind::H => &H,
            IconGroupKind::HPlus => &H_PLUS,
            IconGroupKind::FourG => &FOUR_G,
            IconGroupKind::FourGPlus => &FOUR_G_PLUS,
            IconGroupKind::FourGLte => &FOUR_G_LTE,
            IconGroupKind::Lte => &LTE,
            IconGroupKind::LtePlus => &LTE_PLUS,
            IconGroupKind::Wfc => &WFC,
        }
    }
}

impl fmt::Display for IconGroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.group().name)
    }
}

// ─── Signal Strength Tables ─────────────────────────────────────────────────

const fn icon(name: &'static str) -> IconId {
    IconId::new(name)
}

/// Status-bar bars, `[level][roaming as usize]`, validated connection.
///
/// The roaming column holds combined glyphs (bars + roaming triangle)
/// which [`unstack`] splits back into base icon and badge.
pub const SIGNAL_STRENGTH: [[IconId; 2]; 5] = [
    [icon("stat_sys_signal_0_fully"), icon("stat_sys_signal_0_fully_roam")],
    [icon("stat_sys_signal_1_fully"), icon("stat_sys_signal_1_fully_roam")],
    [icon("stat_sys_signal_2_fully"), icon("stat_sys_signal_2_fully_roam")],
    [icon("stat_sys_signal_3_fully"), icon("stat_sys_signal_3_fully_roam")],
    [icon("stat_sys_signal_4_fully"), icon("stat_sys_signal_4_fully_roam")],
];

/// Same layout as [`SIGNAL_STRENGTH`] for a connection that failed validation.
pub const SIGNAL_STRENGTH_NO_INTERNET: [[IconId; 2]; 5] = [
    [icon("stat_sys_signal_0"), icon("stat_sys_signal_0_roam")],
    [icon("stat_sys_signal_1"), icon("stat_sys_signal_1_roam")],
    [icon("stat_sys_signal_2"), icon("stat_sys_signal_2_roam")],
    [icon("stat_sys_signal_3"), icon("stat_sys_signal_3_roam")],
    [icon("stat_sys_signal_4"), icon("stat_sys_signal_4_roam")],
];

pub const QS_SIGNAL_STRENGTH: [[IconId; 5]; 2] = [
    [
        icon("ic_qs_signal_0"),
        icon("ic_qs_signal_1"),
        icon("ic_qs_signal_2"),
        icon("ic_qs_signal_3"),
        icon("ic_qs_signal_4"),
    ],
    [
        icon("ic_qs_signal_full_0"),
        icon("ic_qs_signal_full_1"),
        icon("ic_qs_signal_full_2"),
        icon("ic_qs_signal_full_3"),
        icon("ic_qs_signal_full_4"),
    ],
];

/// Roaming glyph without the combined triangle, used when the activity
/// icon already carries the data-type indicator.
pub const ROAMING_SIGNAL: [IconId; 5] = [
    icon("stat_sys_signal_0_roaming"),
    icon("stat_sys_signal_1_roaming"),
    icon("stat_sys_signal_2_roaming"),
    icon("stat_sys_signal_3_roaming"),
    icon("stat_sys_signal_4_roaming"),
];

pub const STACKED_VOICE: [IconId; 5] = [
    icon("stat_sys_signal_0_voice"),
    icon("stat_sys_signal_1_voice"),
    icon("stat_sys_signal_2_voice"),
    icon("stat_sys_signal_3_voice"),
    icon("stat_sys_signal_4_voice"),
];

pub const SIGNAL_CONTENT_DESCRIPTION: [&str; 5] = [
    "accessibility_no_phone",
    "accessibility_phone_one_bar",
    "accessibility_phone_two_bars",
    "accessibility_phone_three_bars",
    "accessibility_phone_signal_full",
];

pub const SIGNAL_NULL: IconId = icon("stat_sys_signal_null");
pub const SIGNAL_DISCONNECTED: IconId = icon("stat_sys_signal_disconnected");
pub const QS_SIGNAL_NULL: IconId = icon("ic_qs_signal_no_signal");
pub const CARRIER_NETWORK_CHANGE_SIGNAL: IconId =
    icon("stat_sys_signal_carrier_network_change_animation");
pub const QS_CARRIER_NETWORK_CHANGE_SIGNAL: IconId =
    icon("ic_qs_signal_carrier_network_change_animation");
pub const ROAMING_BADGE: IconId = icon("stat_sys_roaming_badge");
pub const EMBMS: IconId = icon("lte_embms_services_all_brackets");
pub const DATA_FORBIDDEN: IconId = icon("stat_sys_data_forbidden");
pub const DATA_DISCONNECTED: IconId = icon("stat_sys_data_disconnected");

/// Bars icon for a connected subscription.
pub fn signal_icon(level: SignalLevel, roaming: bool, validated: bool) -> IconId {
    let table = if validated {
        &SIGNAL_STRENGTH
    } else {
        &SIGNAL_STRENGTH_NO_INTERNET
    };
    table[level.index()][usize::from(roaming)]
}

pub fn qs_signal_icon(level: SignalLevel, validated: bool) -> IconId {
    QS_SIGNAL_STRENGTH[usize::from(validated)][level.index()]
}

/// Splits a combined bars+roaming glyph into its base icon and the
/// roaming badge. Plain glyphs come back unchanged with no badge.
pub fn unstack(combined: IconId) -> (IconId, Option<IconId>) {
    for table in [&SIGNAL_STRENGTH, &SIGNAL_STRENGTH_NO_INTERNET] {
        if let Some(row) = table.iter().find(|row| row[1] == combined) {
            return (row[0], Some(ROAMING_BADGE));
        }
    }
    (combined, None)
}

/// Arrow icon for the current activity direction.
pub fn activity_icon(activity: DataActivity) -> IconId {
    match activity {
        DataActivity::In => icon("stat_sys_data_in"),
        DataActivity::Out => icon("stat_sys_data_out"),
        DataActivity::InOut => icon("stat_sys_data_inout"),
        DataActivity::Dormant => icon("stat_sys_data_dormant"),
        DataActivity::None => icon("stat_sys_data_idle"),
    }
}

// ─── Lookup ─────────────────────────────────────────────────────────────────

/// RAT → icon-group lookup for one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconCatalog {
    by_rat: [Option<IconGroupKind>; RadioAccessType::ALL.len()],
    default_group: IconGroupKind,
}

impl IconCatalog {
    pub fn build(config: &SignalConfig) -> Self {
        use IconGroupKind as K;
        use RadioAccessType as R;

        let mut catalog = IconCatalog {
            by_rat: [None; RadioAccessType::ALL.len()],
            default_group: K::G,
        };

        for rat in [R::Evdo0, R::EvdoA, R::EvdoB, R::Ehrpd, R::Umts, R::TdScdma] {
            catalog.put(rat, K::ThreeG);
        }

        if config.show_at_least_3g {
            for rat in [R::Unknown, R::Edge, R::Cdma, R::OneXRtt] {
                catalog.put(rat, K::ThreeG);
            }
            catalog.default_group = K::ThreeG;
        } else {
            catalog.put(R::Unknown, K::Unknown);
            catalog.put(R::Edge, K::E);
            catalog.put(R::Cdma, K::OneX);
            catalog.put(R::OneXRtt, K::OneX);
            catalog.default_group = K::G;
        }
        if config.show_network_indicators {
            catalog.put(R::Edge, K::E);
        }

        let h_group = if config.hspa_data_distinguishable {
            K::H
        } else {
            K::ThreeG
        };
        for rat in [R::Hsdpa, R::Hsupa, R::Hspa] {
            catalog.put(rat, h_group);
        }
        catalog.put(
            R::Hspap,
            if config.show_4g_for_hspap {
                K::FourG
            } else {
                h_group
            },
        );
        if config.show_network_indicators {
            for rat in [R::Hsdpa, R::Hsupa, R::Hspa] {
                catalog.put(rat, K::ThreeGPlus);
            }
            catalog.put(R::Hspap, K::HPlus);
        }

        if config.show_4g_for_lte {
            let lte = if config.show_4glte_for_lte {
                K::FourGLte
            } else if config.show_network_indicators {
                K::Lte
            } else {
                K::FourG
            };
            catalog.put(R::Lte, lte);
            catalog.put(
                R::LteCa,
                if config.hide_lte_plus {
                    K::FourG
                } else {
                    K::FourGPlus
                },
            );
        } else {
            catalog.put(R::Lte, K::Lte);
            catalog.put(
                R::LteCa,
                if config.hide_lte_plus && !config.show_network_indicators {
                    K::Lte
                } else {
                    K::LtePlus
                },
            );
        }
        catalog.put(R::Iwlan, K::Wfc);

        catalog
    }

    fn put(&mut self, rat: RadioAccessType, kind: IconGroupKind) {
        self.by_rat[usize::from(rat.code())] = Some(kind);
    }

    /// Group for a RAT; RATs without an entry use the default group.
    pub fn lookup(&self, rat: RadioAccessType) -> IconGroupKind {
        self.by_rat[usize::from(rat.code())].unwrap_or(self.default_group)
    }

    pub fn default_group(&self) -> IconGroupKind {
        self.default_group
    }
}
