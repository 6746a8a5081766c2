//! # Network Name Resolution
//!
//! Builds the operator labels shown next to the signal bars from the
//! SPN/PLMN broadcast, optional carrier-name localization and the current
//! network class.
//!
//! The voice label is `PLMN [class]`, then separator, then `SPN [class]`;
//! the data label is the same with the data SPN. An empty result falls
//! back to the configured default name.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::rat::{NetworkClass, RadioAccessType, RegState};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocalizeError {
    #[error("carrier name table unavailable")]
    Unavailable,
    #[error("failed to localize {name:?}: {reason}")]
    Lookup { name: String, reason: String },
}

/// Transliterates carrier names into the current locale.
///
/// `Ok(None)` means "no entry"; the caller keeps the original string.
pub trait CarrierNameLocalizer: Send {
    fn localize(&self, name: &str) -> Result<Option<String>, LocalizeError>;
}

/// Fixed origin → localized table, typically loaded from config.
#[derive(Debug, Clone, Default)]
pub struct TableLocalizer {
    table: HashMap<String, String>,
}

impl TableLocalizer {
    pub fn new(table: HashMap<String, String>) -> Self {
        TableLocalizer { table }
    }
}

impl CarrierNameLocalizer for TableLocalizer {
    fn localize(&self, name: &str) -> Result<Option<String>, LocalizeError> {
        Ok(self.table.get(name).cloned())
    }
}

/// Localizer that never has an entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocalization;

impl CarrierNameLocalizer for NoLocalization {
    fn localize(&self, _name: &str) -> Result<Option<String>, LocalizeError> {
        Ok(None)
    }
}

/// One SPN/PLMN broadcast. Also retained as the last-seen name inputs so
/// service-state and locale changes can replay it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NameUpdate {
    pub show_spn: bool,
    pub spn: Option<String>,
    pub show_plmn: bool,
    pub plmn: Option<String>,
    pub data_spn: Option<String>,
}

/// Everything besides the broadcast itself that shapes the labels.
#[derive(Debug, Clone, Copy)]
pub struct NameContext<'a> {
    pub separator: &'a str,
    pub default_name: &'a str,
    pub show_rat: bool,
    pub show_locale: bool,
    pub network_class: NetworkClass,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNames {
    pub network_name: String,
    pub network_name_data: String,
}

/// Class shown after operator names: data RAT when known, else voice RAT,
/// and only while either registration is in service.
pub fn displayed_network_class(
    voice_reg: RegState,
    data_reg: RegState,
    voice_rat: RadioAccessType,
    data_rat: RadioAccessType,
) -> NetworkClass {
    if !(data_reg.in_service() || voice_reg.in_service()) {
        return NetworkClass::Unknown;
    }
    let chosen = if data_rat == RadioAccessType::Unknown {
        voice_rat
    } else {
        data_rat
    };
    chosen.network_class()
}

fn localized(
    name: Option<&str>,
    enabled: bool,
    localizer: &dyn CarrierNameLocalizer,
) -> Option<String> {
    let name = name.filter(|n| !n.is_empty())?;
    if !enabled {
        return Some(name.to_string());
    }
    match localizer.localize(name) {
        Ok(Some(local)) => Some(local),
        Ok(None) => Some(name.to_string()),
        Err(e) => {
            warn!(name, error = %e, "carrier name localization failed");
            Some(name.to_string())
        }
    }
}

fn push_part(label: &mut String, part: &str, separator: &str, suffix: &str) {
    if !label.is_empty() {
        label.push_str(separator);
    }
    label.push_str(part);
    if !suffix.is_empty() {
        label.push(' ');
        label.push_str(suffix);
    }
}

pub fn resolve_network_name(
    update: &NameUpdate,
    ctx: &NameContext<'_>,
    localizer: &dyn CarrierNameLocalizer,
) -> ResolvedNames {
    let spn = localized(update.spn.as_deref(), ctx.show_locale && update.show_spn, localizer);
    let data_spn = localized(
        update.data_spn.as_deref(),
        ctx.show_locale && update.show_spn,
        localizer,
    );
    let plmn = localized(update.plmn.as_deref(), ctx.show_locale && update.show_plmn, localizer);

    let show_plmn = update.show_plmn;
    let mut show_spn = update.show_spn;
    if show_plmn && show_spn && spn.is_some() && spn == plmn {
        show_spn = false;
    }

    let suffix = if ctx.show_rat {
        ctx.network_class.abbreviation()
    } else {
        ""
    };

    let mut voice = String::new();
    let mut data = String::new();
    if let (true, Some(plmn)) = (show_plmn, plmn.as_deref()) {
        push_part(&mut voice, plmn, ctx.separator, suffix);
        push_part(&mut data, plmn, ctx.separator, suffix);
    }
    if let (true, Some(spn)) = (show_spn, spn.as_deref()) {
        push_part(&mut voice, spn, ctx.separator, suffix);
    }
    if let (true, Some(data_spn)) = (show_spn, data_spn.as_deref()) {
        push_part(&mut data, data_spn, ctx.separator, suffix);
    }

    let or_default = |label: String| {
        if label.is_empty() {
            ctx.default_name.to_string()
        } else {
            label
        }
    };
    ResolvedNames {
        network_name: or_default(voice),
        network_name_data: or_default(data),
    }
}
