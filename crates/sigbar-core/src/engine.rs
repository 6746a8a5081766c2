//! # Signal Engine
//!
//! Deterministic reducer that folds asynchronously arriving modem
//! telemetry into one [`StateSnapshot`] and maps it to an [`IconSelection`].
//!
//! Every `apply_*` / `set_*` operation mutates raw inputs, then calls
//! [`SignalEngine::refresh`] which recomputes the composite snapshot
//! fields (service, levels, icon group, names). The caller then checks
//! [`SignalEngine::has_changed`] and, if true, derives and publishes the
//! selection and calls [`SignalEngine::commit`].
//!
//! The engine is `&mut self` only: exactly one writer per subscription.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{self, IconCatalog, IconGroupKind, IconId};
use crate::config::{DisplayStyle, SignalConfig};
use crate::error::SignalError;
use crate::name::{
    displayed_network_class, resolve_network_name, CarrierNameLocalizer, NameContext, NameUpdate,
    TableLocalizer,
};
use crate::policy::{CarrierMatch, CarrierPolicy};
use crate::rat::{
    alternate_lte_level, DataActivity, DataState, NetworkClass, RadioAccessType, RegState,
    SignalLevel,
};
use crate::snapshot::StateSnapshot;

// ─── Inputs ─────────────────────────────────────────────────────────────────

/// Service-state report from the telephony layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceState {
    pub voice_reg_state: RegState,
    pub data_reg_state: RegState,
    pub voice_rat: RadioAccessType,
    pub data_rat: RadioAccessType,
    pub roaming: bool,
    /// MCC+MNC of the registered network.
    pub operator_numeric: Option<String>,
    pub operator_alpha_short: Option<String>,
    pub is_emergency_only: bool,
    pub using_carrier_aggregation: bool,
    pub ims_radio_technology: RadioAccessType,
}

/// Signal-strength report. Levels are raw and clamped on use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SignalStrength {
    pub level: i32,
    pub cdma_level: i32,
    pub gsm_level: i32,
    /// LTE RSRP in dBm; anything above -44 means "not available".
    pub lte_dbm: i32,
    pub is_gsm: bool,
}

impl Default for SignalStrength {
    fn default() -> Self {
        SignalStrength {
            level: 0,
            cdma_level: 0,
            gsm_level: 0,
            lte_dbm: i32::MAX,
            is_gsm: true,
        }
    }
}

/// Identity of the subscription an engine renders.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubscriptionInfo {
    pub subscription_id: i32,
    pub slot_index: i32,
    pub carrier_name: Option<String>,
    pub has_mobile_data: bool,
}

impl Default for SubscriptionInfo {
    fn default() -> Self {
        SubscriptionInfo {
            subscription_id: 1,
            slot_index: 0,
            carrier_name: None,
            has_mobile_data: true,
        }
    }
}

// ─── Output ─────────────────────────────────────────────────────────────────

/// Everything the rendering layer needs for one subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IconSelection {
    pub subscription_id: i32,
    pub icon_group: IconGroupKind,
    pub status_bar_icon: IconId,
    pub status_bar_visible: bool,
    /// Badge split off a combined signal glyph.
    pub signal_overlay: Option<IconId>,
    pub quick_settings_icon: Option<IconId>,
    pub quick_settings_type_icon: Option<IconId>,
    pub data_type_overlay: Option<IconId>,
    /// Extended style draws the data type next to the bars instead.
    pub data_network_type_icon: Option<IconId>,
    pub content_description: &'static str,
    pub data_content_description: Option<&'static str>,
    /// Quick-settings label.
    pub description: Option<String>,
    pub network_name: String,
    pub network_name_data: String,
    pub activity_in: bool,
    pub activity_out: bool,
    pub activity_icon: Option<IconId>,
    pub panel_activity_icon: Option<IconId>,
    pub stacked_data_icon: Option<IconId>,
    pub stacked_voice_icon: Option<IconId>,
    pub is_wide_icon: bool,
    pub embms_icon: Option<IconId>,
    pub roaming: bool,
    pub mobile_ims: bool,
    pub ims_registered_over_wifi: bool,
}

// ─── Engine ─────────────────────────────────────────────────────────────────

pub struct SignalEngine {
    config: SignalConfig,
    catalog: IconCatalog,
    catalog_generation: u64,
    policy: CarrierPolicy,
    carrier_match: CarrierMatch,
    localizer: Box<dyn CarrierNameLocalizer>,
    table_localizer: bool,
    service: Option<ServiceState>,
    signal: Option<SignalStrength>,
    data_state: DataState,
    data_rat: RadioAccessType,
    cell_identity: Option<u32>,
    current: StateSnapshot,
    last_notified: StateSnapshot,
}

impl SignalEngine {
    /// Creates an engine whose localizer is the config's `locale_names` table.
    pub fn new(config: SignalConfig, info: SubscriptionInfo) -> Self {
        let localizer = TableLocalizer::new(config.locale_names.clone());
        let mut engine = Self::with_localizer(config, info, Box::new(localizer));
        engine.table_localizer = true;
        engine
    }

    pub fn with_localizer(
        config: SignalConfig,
        info: SubscriptionInfo,
        localizer: Box<dyn CarrierNameLocalizer>,
    ) -> Self {
        let catalog = IconCatalog::build(&config);
        let policy = CarrierPolicy::from_config(&config.carrier);
        let display_style = policy.display_style(config.display_style);
        let network_name = info
            .carrier_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| config.network_name_default.clone());

        let mut current = StateSnapshot::new(
            info.subscription_id,
            info.slot_index,
            display_style,
            catalog.default_group(),
            network_name,
        );
        current.enabled = info.has_mobile_data;

        debug!(
            sub_id = info.subscription_id,
            slot = info.slot_index,
            style = %display_style,
            "signal engine created"
        );

        SignalEngine {
            config,
            catalog,
            catalog_generation: 1,
            policy,
            carrier_match: CarrierMatch::default(),
            localizer,
            table_localizer: false,
            service: None,
            signal: None,
            data_state: DataState::Disconnected,
            data_rat: RadioAccessType::Unknown,
            cell_identity: None,
            last_notified: current.clone(),
            current,
        }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &StateSnapshot {
        &self.current
    }

    pub fn last_notified(&self) -> &StateSnapshot {
        &self.last_notified
    }

    pub fn subscription_id(&self) -> i32 {
        self.current.subscription_id
    }

    pub fn display_style(&self) -> DisplayStyle {
        self.current.display_style
    }

    /// Number of times the icon catalog has been built.
    pub fn catalog_generation(&self) -> u64 {
        self.catalog_generation
    }

    pub fn carrier_match(&self) -> CarrierMatch {
        self.carrier_match
    }

    // ─── Telephony Inputs ───────────────────────────────────────────────

    pub fn apply_service_state(&mut self, state: ServiceState) {
        debug!(
            sub_id = self.current.subscription_id,
            voice = ?state.voice_reg_state,
            data = ?state.data_reg_state,
            voice_rat = %state.voice_rat,
            data_rat = %state.data_rat,
            ca = state.using_carrier_aggregation,
            "service state"
        );
        self.carrier_match = self.policy.evaluate(state.operator_numeric.as_deref());
        self.data_rat = state
            .data_rat
            .with_carrier_aggregation(state.using_carrier_aggregation);
        self.service = Some(state);
        self.update_network_names();
        self.refresh();
    }

    pub fn apply_signal_strength(&mut self, strength: SignalStrength) {
        debug!(
            sub_id = self.current.subscription_id,
            level = strength.level,
            lte_dbm = strength.lte_dbm,
            gsm = strength.is_gsm,
            "signal strength"
        );
        self.signal = Some(strength);
        self.refresh();
    }

    /// Records the data bearer state and RAT.
    ///
    /// With network indicators enabled, the RAT only ratchets upward until a
    /// cell identity has been observed; after that every report is taken
    /// as-is.
    pub fn apply_data_connection_state(
        &mut self,
        state: DataState,
        rat: RadioAccessType,
        cell_identity: Option<u32>,
    ) {
        let aggregated = self
            .service
            .as_ref()
            .is_some_and(|s| s.using_carrier_aggregation);

        if self.config.show_network_indicators {
            if cell_identity.is_some() {
                self.cell_identity = cell_identity;
            }
            if self.cell_identity.is_some() || rat > self.data_rat {
                self.data_rat = rat;
            }
        } else {
            self.data_rat = rat;
        }
        self.data_rat = self.data_rat.with_carrier_aggregation(aggregated);
        self.data_state = state;

        debug!(
            sub_id = self.current.subscription_id,
            ?state,
            reported = %rat,
            effective = %self.data_rat,
            cell = ?self.cell_identity,
            "data connection state"
        );
        self.refresh();
    }

    pub fn apply_data_activity(&mut self, activity: DataActivity) {
        self.current.activity = activity;
    }

    pub fn apply_carrier_network_change(&mut self, active: bool) {
        debug!(sub_id = self.current.subscription_id, active, "carrier network change");
        self.current.carrier_network_change_active = active;
        self.refresh();
    }

    pub fn apply_network_name(&mut self, update: NameUpdate) {
        self.current.show_spn = update.show_spn;
        self.current.show_plmn = update.show_plmn;
        self.current.name_inputs = update;
        self.update_network_names();
        self.refresh();
    }

    /// Replays the last SPN/PLMN broadcast through the localizer.
    pub fn apply_locale_changed(&mut self) {
        if !self.config.show_locale {
            return;
        }
        self.update_network_names();
        self.refresh();
    }

    // ─── Settings and Connectivity ──────────────────────────────────────

    pub fn set_forbidden(&mut self, forbidden: bool) {
        self.current.is_forbidden = forbidden;
    }

    pub fn set_airplane_mode(&mut self, airplane_mode: bool) {
        self.current.airplane_mode = airplane_mode;
    }

    pub fn set_user_setup_complete(&mut self, complete: bool) {
        self.current.user_setup_complete = complete;
    }

    /// Cellular's bit in the connected/validated transport sets.
    ///
    /// A connection is only shown as lacking internet while it is default.
    pub fn set_default_transport(&mut self, connected: bool, validated: bool) {
        self.current.is_default_transport = connected;
        self.current.inet_validated = validated || !connected;
    }

    pub fn set_mobile_data_enabled(&mut self, enabled: bool) {
        self.current.mobile_data_enabled = enabled;
        if self.config.data_signal_control {
            self.current.is_forbidden = !enabled;
        }
        self.refresh();
    }

    /// `None` or a negative id means no data subscription is selected, in
    /// which case every subscription acts as the data one.
    pub fn set_default_data_subscription(&mut self, subscription_id: Option<i32>) {
        self.current.is_data_primary = match subscription_id {
            Some(id) if id >= 0 => id == self.current.subscription_id,
            _ => true,
        };
    }

    pub fn set_ims_registration(&mut self, registered: bool, over_wifi: bool) {
        self.current.ims_registered = registered;
        self.current.ims_over_wifi = over_wifi;
    }

    pub fn set_embms_active(&mut self, active: bool) {
        self.current.embms_active = active;
    }

    /// Swaps the configuration and rebuilds the icon catalog once.
    ///
    /// The display style chosen at construction is kept.
    pub fn set_configuration(&mut self, config: SignalConfig) {
        self.catalog = IconCatalog::build(&config);
        self.catalog_generation += 1;
        self.policy = CarrierPolicy::from_config(&config.carrier);
        self.carrier_match = self.policy.evaluate(
            self.service
                .as_ref()
                .and_then(|s| s.operator_numeric.as_deref()),
        );
        if self.table_localizer {
            self.localizer = Box::new(TableLocalizer::new(config.locale_names.clone()));
        }
        self.config = config;
        debug!(
            sub_id = self.current.subscription_id,
            generation = self.catalog_generation,
            "configuration applied"
        );
        self.refresh();
    }

    // ─── Composite State ────────────────────────────────────────────────

    /// Whether the bars should show service at all.
    pub fn has_service(&self) -> bool {
        let Some(service) = self.service.as_ref() else {
            return false;
        };
        let iwlan = RadioAccessType::Iwlan;
        match service.voice_reg_state {
            RegState::PowerOff => false,
            RegState::InService => {
                let wifi_only = service.voice_rat == iwlan
                    && (service.data_rat == iwlan || !service.data_reg_state.in_service());
                !wifi_only || self.config.show_signal_for_iwlan
            }
            RegState::OutOfService | RegState::EmergencyOnly => {
                service.data_reg_state.in_service()
                    && (self.config.show_signal_for_iwlan || service.data_rat != iwlan)
            }
        }
    }

    fn network_class(&self) -> NetworkClass {
        self.service.as_ref().map_or(NetworkClass::Unknown, |s| {
            displayed_network_class(s.voice_reg_state, s.data_reg_state, s.voice_rat, s.data_rat)
        })
    }

    fn show_long_operator_name(&self, roaming: bool) -> bool {
        self.config.show_long_operator_name
            || (self.config.show_long_operator_name_when_roaming && roaming)
    }

    fn update_network_names(&mut self) {
        let ctx = NameContext {
            separator: &self.config.network_name_separator,
            default_name: &self.config.network_name_default,
            show_rat: self.config.show_rat,
            show_locale: self.config.show_locale,
            network_class: self.network_class(),
        };
        let names = resolve_network_name(&self.current.name_inputs, &ctx, self.localizer.as_ref());
        self.current.network_name = names.network_name;
        self.current.network_name_data = names.network_name_data;
    }

    fn resolve_level(&self, strength: &SignalStrength) -> SignalLevel {
        if !strength.is_gsm && self.config.always_show_cdma_rssi {
            return SignalLevel::from_raw(strength.cdma_level);
        }
        let mut level = SignalLevel::from_raw(strength.level);
        if self.data_rat.is_lte_family() {
            if let Some(thresholds) = self.carrier_match.thresholds {
                level = thresholds.level(strength.lte_dbm);
            }
            if self.config.show_rsrp_signal_level_for_lte {
                level = alternate_lte_level(strength.lte_dbm);
            }
        }
        level
    }

    /// Recomputes every composite snapshot field from the raw inputs.
    pub fn refresh(&mut self) {
        let has_service = self.has_service();
        let network_class = self.network_class();
        let service = self.service.clone().unwrap_or_default();
        let long_names = self.show_long_operator_name(service.roaming);
        let s = &mut self.current;

        s.voice_reg_state = service.voice_reg_state;
        s.data_reg_state = service.data_reg_state;
        s.voice_rat = service.voice_rat;
        s.data_rat = self.data_rat;
        s.has_voice_service = service.voice_reg_state.in_service();
        s.has_data_service = service.data_reg_state.in_service();
        s.roaming = service.roaming;
        s.is_emergency_only = service.is_emergency_only;

        s.connected = has_service && self.signal.is_some();
        s.is_cdma = self.signal.is_some_and(|sig| !sig.is_gsm);
        s.data_connected = s.connected && self.data_state == DataState::Connected;

        s.icon_group = if s.carrier_network_change_active {
            IconGroupKind::CarrierNetworkChange
        } else if !s.mobile_data_enabled && !s.data_connected {
            IconGroupKind::DataDisabled
        } else {
            let rat = if self.config.read_icons_from_xml
                && self.data_rat == RadioAccessType::Unknown
            {
                service.voice_rat
            } else {
                self.data_rat
            };
            self.catalog.lookup(rat)
        };

        if let Some(alpha) = service
            .operator_alpha_short
            .as_deref()
            .filter(|alpha| !alpha.is_empty())
        {
            if s.network_name == self.config.network_name_default {
                s.network_name = alpha.to_string();
            }
            if !long_names {
                s.network_name_data = match network_class.abbreviation() {
                    "" => alpha.to_string(),
                    class => format!("{alpha} {class}"),
                };
            }
        }

        s.ims_radio_technology = if s.display_style == DisplayStyle::Extended
            && service.voice_reg_state.in_service()
        {
            service.ims_radio_technology
        } else {
            RadioAccessType::Unknown
        };

        if self.current.connected {
            if let Some(strength) = self.signal {
                let level = self.resolve_level(&strength);
                let voice_level = if strength.is_gsm {
                    SignalLevel::from_raw(strength.gsm_level)
                } else {
                    SignalLevel::from_raw(strength.cdma_level)
                };
                self.current.signal_level = level;
                self.current.voice_level = voice_level;
            }
        }
    }

    // ─── Change Detection ───────────────────────────────────────────────

    /// Whether the projected state differs from what was last published.
    pub fn has_changed(&self) -> bool {
        self.current != self.last_notified
    }

    pub fn commit(&mut self) {
        self.last_notified = self.current.clone();
    }

    // ─── Icon Selection ─────────────────────────────────────────────────

    fn shows_data_and_voice(&self) -> bool {
        use RadioAccessType as R;
        let Some(service) = self.service.as_ref() else {
            return false;
        };
        matches!(
            service.data_rat,
            R::Evdo0 | R::EvdoA | R::EvdoB | R::Ehrpd | R::Lte | R::LteCa
        ) && matches!(service.voice_rat, R::Gsm | R::OneXRtt | R::Cdma)
    }

    /// Maps the current snapshot to a full icon selection.
    ///
    /// Pure; fails only when the slot index is outside `0..phone_count`.
    pub fn derive(&self) -> Result<IconSelection, SignalError> {
        let s = &self.current;
        let phone_count = self.config.phone_count;
        if s.slot_index < 0 || i64::from(s.slot_index) >= i64::from(phone_count) {
            return Err(SignalError::InvalidSlot {
                slot: s.slot_index,
                phone_count,
            });
        }

        let style = s.display_style;
        let level = s.signal_level;
        let validated = s.inet_validated;
        let changing = s.carrier_network_change_active;
        let group_kind = s.icon_group;
        let group = group_kind.group();

        // Activity slot, blank while the carrier network changes.
        let data_activity = if changing {
            None
        } else if s.data_connected {
            Some(catalog::activity_icon(s.activity))
        } else if self.config.data_signal_control {
            Some(if s.is_forbidden {
                catalog::DATA_FORBIDDEN
            } else {
                catalog::DATA_DISCONNECTED
            })
        } else {
            None
        };
        let (activity_icon, panel_activity_icon) = if style.shows_mobile_activity() {
            (data_activity, None)
        } else {
            (None, data_activity)
        };

        // Signal bars.
        let mut signal_overlay = None;
        let mut stacked_data_icon = None;
        let mut stacked_voice_icon = None;
        let status_bar_icon = if changing {
            catalog::CARRIER_NETWORK_CHANGE_SIGNAL
        } else if s.connected {
            let mut icon = catalog::signal_icon(level, s.roaming, validated);
            if self.config.read_icons_from_xml {
                let (base, badge) = catalog::unstack(icon);
                icon = base;
                signal_overlay = badge;
            }
            if style == DisplayStyle::Cdma1xCombined {
                if !s.roaming && self.shows_data_and_voice() {
                    stacked_voice_icon = Some(catalog::STACKED_VOICE[s.voice_level.index()]);
                    stacked_data_icon = Some(icon);
                } else if s.roaming && data_activity.is_some() {
                    icon = catalog::ROAMING_SIGNAL[level.index()];
                    signal_overlay = None;
                }
            }
            icon
        } else if s.enabled {
            catalog::SIGNAL_DISCONNECTED
        } else {
            catalog::SIGNAL_NULL
        };

        let content_description = if changing {
            group
                .data_content_description
                .unwrap_or(catalog::SIGNAL_CONTENT_DESCRIPTION[0])
        } else if s.connected {
            catalog::SIGNAL_CONTENT_DESCRIPTION[level.index()]
        } else {
            catalog::SIGNAL_CONTENT_DESCRIPTION[0]
        };

        // Data type badge.
        let catalog_group = !matches!(
            group_kind,
            IconGroupKind::CarrierNetworkChange | IconGroupKind::DataDisabled
        );
        let badge_group = if catalog_group
            && s.data_rat == RadioAccessType::Iwlan
            && self.config.show_4g_for_iwlan
        {
            IconGroupKind::FourG.group()
        } else {
            group
        };
        let data_disabled_visible =
            group_kind == IconGroupKind::DataDisabled && s.user_setup_complete;
        let show_data = s.data_connected || data_disabled_visible;
        let show_overlay = show_data
            && (s.is_default_transport || data_disabled_visible)
            && style.shows_data_type();
        let overlay = if show_overlay {
            badge_group.data_type
        } else {
            None
        };
        let (data_type_overlay, data_network_type_icon) = if style == DisplayStyle::Extended {
            (None, overlay)
        } else {
            (overlay, None)
        };

        // Quick settings only follow the data subscription.
        let (quick_settings_icon, quick_settings_type_icon, description) = if s.is_data_primary {
            let icon = if !s.enabled || s.is_emergency_only {
                None
            } else if changing {
                Some(catalog::QS_CARRIER_NETWORK_CHANGE_SIGNAL)
            } else if s.connected {
                Some(catalog::qs_signal_icon(level, validated))
            } else {
                Some(catalog::QS_SIGNAL_NULL)
            };
            let type_icon = if show_data {
                badge_group.qs_data_type
            } else {
                None
            };
            let description = (!s.is_emergency_only).then(|| s.network_name.clone());
            (icon, type_icon, description)
        } else {
            (None, None, None)
        };

        let extended = style == DisplayStyle::Extended;
        let ims_registered_over_wifi = extended && s.ims_over_wifi;

        Ok(IconSelection {
            subscription_id: s.subscription_id,
            icon_group: group_kind,
            status_bar_icon,
            status_bar_visible: s.enabled && !s.airplane_mode,
            signal_overlay,
            quick_settings_icon,
            quick_settings_type_icon,
            data_type_overlay,
            data_network_type_icon,
            content_description,
            data_content_description: badge_group.data_content_description,
            description,
            network_name: s.network_name.clone(),
            network_name_data: s.network_name_data.clone(),
            activity_in: s.data_connected && !changing && s.activity.is_in(),
            activity_out: s.data_connected && !changing && s.activity.is_out(),
            activity_icon,
            panel_activity_icon,
            stacked_data_icon,
            stacked_voice_icon,
            is_wide_icon: s.roaming && extended,
            embms_icon: (extended && s.embms_active && s.is_data_primary).then_some(catalog::EMBMS),
            roaming: s.roaming,
            mobile_ims: s.ims_registered && !ims_registered_over_wifi,
            ims_registered_over_wifi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SignalConfig;
    use crate::name::{LocalizeError, NoLocalization};
    use crate::policy::EXTENDED_STYLE_CARRIER;

    fn engine_with(f: impl FnOnce(&mut SignalConfig)) -> SignalEngine {
        let mut config = SignalConfig::default();
        f(&mut config);
        SignalEngine::new(config, SubscriptionInfo::default())
    }

    fn engine() -> SignalEngine {
        engine_with(|_| {})
    }

    fn in_service(rat: RadioAccessType) -> ServiceState {
        ServiceState {
            voice_reg_state: RegState::InService,
            data_reg_state: RegState::InService,
            voice_rat: rat,
            data_rat: rat,
            ..ServiceState::default()
        }
    }

    fn strength(level: i32) -> SignalStrength {
        SignalStrength {
            level,
            gsm_level: level,
            ..SignalStrength::default()
        }
    }

    fn connect(engine: &mut SignalEngine, rat: RadioAccessType, level: i32) {
        engine.apply_service_state(in_service(rat));
        engine.apply_signal_strength(strength(level));
        engine.apply_data_connection_state(DataState::Connected, rat, None);
        engine.set_default_transport(true, true);
    }

    // ─── Construction ───────────────────────────────────────────────────

    #[test]
    fn starts_unchanged_and_disconnected() {
        let e = engine();
        assert!(!e.has_changed());
        assert!(!e.snapshot().connected);
        assert_eq!(e.snapshot().icon_group, IconGroupKind::G);
        let sel = e.derive().unwrap();
        assert_eq!(sel.status_bar_icon, catalog::SIGNAL_DISCONNECTED);
        assert_eq!(sel.network_name, "No service");
    }

    #[test]
    fn carrier_name_seeds_labels() {
        let info = SubscriptionInfo {
            carrier_name: Some("Acme".into()),
            ..SubscriptionInfo::default()
        };
        let e = SignalEngine::new(SignalConfig::default(), info);
        assert_eq!(e.snapshot().network_name, "Acme");
        assert_eq!(e.snapshot().network_name_data, "Acme");
    }

    #[test]
    fn provisioned_carrier_forces_extended_style() {
        let e = engine_with(|c| c.carrier.provisioned = Some(EXTENDED_STYLE_CARRIER.into()));
        assert_eq!(e.display_style(), DisplayStyle::Extended);
    }

    #[test]
    fn disabled_hardware_shows_null_icon() {
        let info = SubscriptionInfo {
            has_mobile_data: false,
            ..SubscriptionInfo::default()
        };
        let e = SignalEngine::new(SignalConfig::default(), info);
        let sel = e.derive().unwrap();
        assert_eq!(sel.status_bar_icon, catalog::SIGNAL_NULL);
        assert!(!sel.status_bar_visible);
    }

    // ─── Service ────────────────────────────────────────────────────────

    #[test]
    fn connected_needs_signal_strength() {
        let mut e = engine();
        e.apply_service_state(in_service(RadioAccessType::Lte));
        assert!(e.has_service());
        assert!(!e.snapshot().connected);
        e.apply_signal_strength(strength(3));
        assert!(e.snapshot().connected);
        assert_eq!(e.snapshot().signal_level, SignalLevel::Good);
    }

    #[test]
    fn power_off_has_no_service() {
        let mut e = engine();
        let mut state = in_service(RadioAccessType::Lte);
        state.voice_reg_state = RegState::PowerOff;
        e.apply_service_state(state);
        assert!(!e.has_service());
    }

    #[test]
    fn vowifi_without_data_counts_as_no_service() {
        let mut e = engine();
        e.apply_service_state(in_service(RadioAccessType::Iwlan));
        assert!(!e.has_service());

        let mut e = engine_with(|c| c.show_signal_for_iwlan = true);
        e.apply_service_state(in_service(RadioAccessType::Iwlan));
        assert!(e.has_service());
    }

    #[test]
    fn data_only_service_counts() {
        let mut e = engine();
        let mut state = in_service(RadioAccessType::Lte);
        state.voice_reg_state = RegState::OutOfService;
        e.apply_service_state(state.clone());
        assert!(e.has_service());

        state.data_rat = RadioAccessType::Iwlan;
        e.apply_service_state(state.clone());
        assert!(!e.has_service());

        let mut e = engine_with(|c| c.show_signal_for_iwlan = true);
        e.apply_service_state(state);
        assert!(e.has_service());
    }

    #[test]
    fn levels_frozen_while_disconnected() {
        let mut e = engine();
        connect(&mut e, RadioAccessType::Umts, 4);
        let mut state = in_service(RadioAccessType::Umts);
        state.voice_reg_state = RegState::PowerOff;
        e.apply_service_state(state);
        e.apply_signal_strength(strength(1));
        assert!(!e.snapshot().connected);
        assert_eq!(e.snapshot().signal_level, SignalLevel::Great);
    }

    // ─── Signal Levels ──────────────────────────────────────────────────

    #[test]
    fn cdma_rssi_when_configured() {
        let mut e = engine_with(|c| c.always_show_cdma_rssi = true);
        e.apply_service_state(in_service(RadioAccessType::OneXRtt));
        e.apply_signal_strength(SignalStrength {
            level: 4,
            cdma_level: 1,
            is_gsm: false,
            ..SignalStrength::default()
        });
        assert_eq!(e.snapshot().signal_level, SignalLevel::Poor);
        assert_eq!(e.snapshot().voice_level, SignalLevel::Poor);
        assert!(e.snapshot().is_cdma);
    }

    #[test]
    fn alternate_lte_level_from_rsrp() {
        let mut e = engine_with(|c| c.show_rsrp_signal_level_for_lte = true);
        e.apply_service_state(in_service(RadioAccessType::Lte));
        e.apply_signal_strength(SignalStrength {
            level: 4,
            lte_dbm: -100,
            ..SignalStrength::default()
        });
        assert_eq!(e.snapshot().signal_level, SignalLevel::Good);
    }

    #[test]
    fn alternate_lte_level_ignored_off_lte() {
        let mut e = engine_with(|c| c.show_rsrp_signal_level_for_lte = true);
        e.apply_service_state(in_service(RadioAccessType::Umts));
        e.apply_signal_strength(SignalStrength {
            level: 4,
            lte_dbm: -130,
            ..SignalStrength::default()
        });
        assert_eq!(e.snapshot().signal_level, SignalLevel::Great);
    }

    #[test]
    fn carrier_thresholds_for_allow_listed_network() {
        let mut e = engine_with(|c| {
            c.carrier.networks = vec!["405854".into()];
            c.carrier.thresholds =
                crate::policy::RsrpThresholds::from_slice(&[-128, -118, -108, -98]);
        });
        let mut state = in_service(RadioAccessType::Lte);
        state.operator_numeric = Some("405854".into());
        e.apply_service_state(state);
        assert!(e.carrier_match().allow_listed);
        e.apply_signal_strength(SignalStrength {
            level: 1,
            lte_dbm: -100,
            ..SignalStrength::default()
        });
        assert_eq!(e.snapshot().signal_level, SignalLevel::Good);
    }

    // ─── Carrier Aggregation ────────────────────────────────────────────

    #[test]
    fn carrier_aggregation_upgrade_either_order() {
        let mut ca = in_service(RadioAccessType::Lte);
        ca.using_carrier_aggregation = true;

        let mut a = engine();
        a.apply_service_state(ca.clone());
        a.apply_data_connection_state(DataState::Connected, RadioAccessType::Lte, None);
        assert_eq!(a.snapshot().data_rat, RadioAccessType::LteCa);

        let mut b = engine();
        b.apply_data_connection_state(DataState::Connected, RadioAccessType::Lte, None);
        b.apply_service_state(ca);
        assert_eq!(b.snapshot().data_rat, RadioAccessType::LteCa);
    }

    #[test]
    fn carrier_aggregation_upgrade_with_network_indicators() {
        let mut e = engine_with(|c| c.show_network_indicators = true);
        let mut ca = in_service(RadioAccessType::Umts);
        ca.using_carrier_aggregation = true;
        e.apply_service_state(ca);
        e.apply_data_connection_state(DataState::Connected, RadioAccessType::Lte, None);
        assert_eq!(e.snapshot().data_rat, RadioAccessType::LteCa);
    }

    // ─── Handover Ratchet ───────────────────────────────────────────────

    #[test]
    fn rat_ratchets_up_without_cell_identity() {
        let mut e = engine_with(|c| c.show_network_indicators = true);
        e.apply_data_connection_state(DataState::Connected, RadioAccessType::Lte, None);
        e.apply_data_connection_state(DataState::Connected, RadioAccessType::Umts, None);
        assert_eq!(e.snapshot().data_rat, RadioAccessType::Lte);
    }

    #[test]
    fn known_cell_identity_accepts_downgrade() {
        let mut e = engine_with(|c| c.show_network_indicators = true);
        e.apply_data_connection_state(DataState::Connected, RadioAccessType::Lte, None);
        e.apply_data_connection_state(DataState::Connected, RadioAccessType::Umts, Some(4242));
        assert_eq!(e.snapshot().data_rat, RadioAccessType::Umts);
        // Identity stays known for later reports.
        e.apply_data_connection_state(DataState::Connected, RadioAccessType::Edge, None);
        assert_eq!(e.snapshot().data_rat, RadioAccessType::Edge);
    }

    #[test]
    fn without_indicators_rat_taken_as_is() {
        let mut e = engine();
        e.apply_data_connection_state(DataState::Connected, RadioAccessType::Lte, None);
        e.apply_data_connection_state(DataState::Connected, RadioAccessType::Umts, None);
        assert_eq!(e.snapshot().data_rat, RadioAccessType::Umts);
    }

    // ─── Icon Group ─────────────────────────────────────────────────────

    #[test]
    fn umts_at_least_3g_scenario() {
        let mut e = engine_with(|c| c.show_at_least_3g = true);
        connect(&mut e, RadioAccessType::Umts, 3);
        let sel = e.derive().unwrap();
        assert_eq!(sel.icon_group, IconGroupKind::ThreeG);
        assert!(!sel.is_wide_icon);
        assert_eq!(sel.status_bar_icon, catalog::signal_icon(SignalLevel::Good, false, true));
    }

    #[test]
    fn carrier_network_change_wins() {
        let mut e = engine();
        connect(&mut e, RadioAccessType::Lte, 4);
        e.apply_carrier_network_change(true);
        let sel = e.derive().unwrap();
        assert_eq!(sel.icon_group, IconGroupKind::CarrierNetworkChange);
        assert_eq!(sel.status_bar_icon, catalog::CARRIER_NETWORK_CHANGE_SIGNAL);
        assert!(sel.data_type_overlay.is_none());
        assert!(!sel.activity_in && !sel.activity_out);
    }

    #[test]
    fn data_disabled_overlay_needs_user_setup() {
        let mut e = engine();
        e.apply_service_state(in_service(RadioAccessType::Lte));
        e.apply_signal_strength(strength(3));
        e.set_mobile_data_enabled(false);
        e.set_user_setup_complete(true);
        let sel = e.derive().unwrap();
        assert_eq!(sel.icon_group, IconGroupKind::DataDisabled);
        assert_eq!(
            sel.data_type_overlay,
            IconGroupKind::DataDisabled.group().data_type
        );

        e.set_user_setup_complete(false);
        let sel = e.derive().unwrap();
        assert_eq!(sel.icon_group, IconGroupKind::DataDisabled);
        assert!(sel.data_type_overlay.is_none());
    }

    #[test]
    fn xml_mode_falls_back_to_voice_rat() {
        let mut e = engine_with(|c| c.read_icons_from_xml = true);
        let mut state = in_service(RadioAccessType::Umts);
        state.data_rat = RadioAccessType::Unknown;
        e.apply_service_state(state);
        assert_eq!(e.snapshot().icon_group, IconGroupKind::ThreeG);
    }

    #[test]
    fn reconfiguration_rebuilds_catalog_once() {
        let mut e = engine();
        connect(&mut e, RadioAccessType::Edge, 2);
        assert_eq!(e.snapshot().icon_group, IconGroupKind::E);
        assert_eq!(e.catalog_generation(), 1);
        e.set_configuration(SignalConfig {
            show_at_least_3g: true,
            ..SignalConfig::default()
        });
        assert_eq!(e.catalog_generation(), 2);
        assert_eq!(e.snapshot().icon_group, IconGroupKind::ThreeG);
    }

    // ─── Overlays and Activity ──────────────────────────────────────────

    #[test]
    fn overlay_requires_default_transport() {
        let mut e = engine();
        connect(&mut e, RadioAccessType::Lte, 3);
        assert!(e.derive().unwrap().data_type_overlay.is_some());
        e.set_default_transport(false, false);
        assert!(e.derive().unwrap().data_type_overlay.is_none());
    }

    #[test]
    fn unvalidated_default_uses_no_internet_bars() {
        let mut e = engine();
        connect(&mut e, RadioAccessType::Lte, 3);
        e.set_default_transport(true, false);
        assert!(!e.snapshot().inet_validated);
        assert_eq!(
            e.derive().unwrap().status_bar_icon,
            catalog::signal_icon(SignalLevel::Good, false, false)
        );
    }

    #[test]
    fn extended_style_moves_badge_and_widens_roaming() {
        let mut e = engine_with(|c| c.display_style = DisplayStyle::Extended);
        let mut state = in_service(RadioAccessType::Lte);
        state.roaming = true;
        e.apply_service_state(state);
        e.apply_signal_strength(strength(2));
        e.apply_data_connection_state(DataState::Connected, RadioAccessType::Lte, None);
        e.set_default_transport(true, true);
        let sel = e.derive().unwrap();
        assert!(sel.data_type_overlay.is_none());
        assert_eq!(sel.data_network_type_icon, IconGroupKind::Lte.group().data_type);
        assert!(sel.is_wide_icon);
    }

    #[test]
    fn iwlan_shows_4g_badge_when_configured() {
        let mut e = engine_with(|c| {
            c.show_4g_for_iwlan = true;
            c.show_signal_for_iwlan = true;
        });
        connect(&mut e, RadioAccessType::Iwlan, 3);
        let sel = e.derive().unwrap();
        assert_eq!(sel.icon_group, IconGroupKind::Wfc);
        assert_eq!(sel.data_type_overlay, IconGroupKind::FourG.group().data_type);
    }

    #[test]
    fn activity_placement_follows_style() {
        let mut e = engine();
        connect(&mut e, RadioAccessType::Lte, 3);
        e.apply_data_activity(DataActivity::InOut);
        let sel = e.derive().unwrap();
        assert!(sel.activity_in && sel.activity_out);
        assert_eq!(sel.activity_icon, Some(catalog::activity_icon(DataActivity::InOut)));
        assert!(sel.panel_activity_icon.is_none());

        let mut e = engine_with(|c| c.display_style = DisplayStyle::DataVoice);
        connect(&mut e, RadioAccessType::Lte, 3);
        e.apply_data_activity(DataActivity::In);
        let sel = e.derive().unwrap();
        assert!(sel.activity_icon.is_none());
        assert_eq!(sel.panel_activity_icon, Some(catalog::activity_icon(DataActivity::In)));
        assert!(sel.data_type_overlay.is_none());
    }

    #[test]
    fn carrier_network_change_blanks_activity_slot() {
        let mut e = engine();
        connect(&mut e, RadioAccessType::Lte, 3);
        e.apply_data_activity(DataActivity::InOut);
        e.apply_carrier_network_change(true);
        let sel = e.derive().unwrap();
        assert!(!sel.activity_in && !sel.activity_out);
        assert!(sel.activity_icon.is_none());
        assert!(sel.panel_activity_icon.is_none());

        let mut e = engine_with(|c| {
            c.display_style = DisplayStyle::DataVoice;
            c.data_signal_control = true;
        });
        connect(&mut e, RadioAccessType::Lte, 3);
        e.apply_data_activity(DataActivity::In);
        e.apply_carrier_network_change(true);
        let sel = e.derive().unwrap();
        assert!(sel.activity_icon.is_none());
        assert!(sel.panel_activity_icon.is_none());

        e.apply_carrier_network_change(false);
        assert_eq!(
            e.derive().unwrap().panel_activity_icon,
            Some(catalog::activity_icon(DataActivity::In))
        );
    }

    #[test]
    fn data_signal_control_shows_forbidden() {
        let mut e = engine_with(|c| c.data_signal_control = true);
        e.apply_service_state(in_service(RadioAccessType::Lte));
        e.apply_signal_strength(strength(3));
        e.set_mobile_data_enabled(false);
        assert!(e.snapshot().is_forbidden);
        assert_eq!(e.derive().unwrap().activity_icon, Some(catalog::DATA_FORBIDDEN));

        e.set_mobile_data_enabled(true);
        assert_eq!(e.derive().unwrap().activity_icon, Some(catalog::DATA_DISCONNECTED));
    }

    #[test]
    fn xml_mode_unstacks_roaming_glyph() {
        let mut e = engine_with(|c| c.read_icons_from_xml = true);
        let mut state = in_service(RadioAccessType::Umts);
        state.roaming = true;
        e.apply_service_state(state);
        e.apply_signal_strength(strength(2));
        let sel = e.derive().unwrap();
        assert_eq!(sel.status_bar_icon, catalog::signal_icon(SignalLevel::Moderate, false, true));
        assert_eq!(sel.signal_overlay, Some(catalog::ROAMING_BADGE));
    }

    #[test]
    fn cdma_combined_stacks_data_and_voice() {
        let mut e = engine_with(|c| c.display_style = DisplayStyle::Cdma1xCombined);
        let mut state = in_service(RadioAccessType::Ehrpd);
        state.voice_rat = RadioAccessType::OneXRtt;
        e.apply_service_state(state);
        e.apply_signal_strength(SignalStrength {
            level: 3,
            cdma_level: 2,
            is_gsm: false,
            ..SignalStrength::default()
        });
        let sel = e.derive().unwrap();
        assert_eq!(sel.stacked_voice_icon, Some(catalog::STACKED_VOICE[2]));
        assert_eq!(sel.stacked_data_icon, Some(sel.status_bar_icon));
    }

    #[test]
    fn cdma_combined_roaming_with_activity_uses_roaming_glyph() {
        let mut e = engine_with(|c| c.display_style = DisplayStyle::Cdma1xCombined);
        let mut state = in_service(RadioAccessType::Ehrpd);
        state.voice_rat = RadioAccessType::OneXRtt;
        state.roaming = true;
        e.apply_service_state(state);
        e.apply_signal_strength(strength(4));
        e.apply_data_connection_state(DataState::Connected, RadioAccessType::Ehrpd, None);
        let sel = e.derive().unwrap();
        assert_eq!(sel.status_bar_icon, catalog::ROAMING_SIGNAL[4]);
        assert!(sel.stacked_data_icon.is_none());
        assert!(sel.stacked_voice_icon.is_none());
    }

    // ─── Quick Settings and Extras ──────────────────────────────────────

    #[test]
    fn quick_settings_only_for_data_subscription() {
        let mut e = engine();
        connect(&mut e, RadioAccessType::Lte, 3);
        assert!(e.derive().unwrap().quick_settings_icon.is_some());
        e.set_default_data_subscription(Some(7));
        let sel = e.derive().unwrap();
        assert!(sel.quick_settings_icon.is_none());
        assert!(sel.description.is_none());
        e.set_default_data_subscription(None);
        assert!(e.snapshot().is_data_primary);
    }

    #[test]
    fn emergency_hides_description() {
        let mut e = engine();
        let mut state = in_service(RadioAccessType::Lte);
        state.is_emergency_only = true;
        e.apply_service_state(state);
        assert!(e.derive().unwrap().description.is_none());
    }

    #[test]
    fn extended_only_extras() {
        let mut e = engine();
        e.set_embms_active(true);
        e.set_ims_registration(true, true);
        let sel = e.derive().unwrap();
        assert!(sel.embms_icon.is_none());
        assert!(!sel.ims_registered_over_wifi);
        assert!(sel.mobile_ims);

        let mut e = engine_with(|c| c.display_style = DisplayStyle::Extended);
        e.set_embms_active(true);
        e.set_ims_registration(true, true);
        let sel = e.derive().unwrap();
        assert_eq!(sel.embms_icon, Some(catalog::EMBMS));
        assert!(sel.ims_registered_over_wifi);
        assert!(!sel.mobile_ims);
    }

    // ─── Names ──────────────────────────────────────────────────────────

    #[test]
    fn operator_short_name_replaces_default() {
        let mut e = engine_with(|c| c.show_rat = true);
        let mut state = in_service(RadioAccessType::Lte);
        state.operator_alpha_short = Some("Acme".into());
        e.apply_service_state(state);
        assert_eq!(e.snapshot().network_name, "Acme");
        assert_eq!(e.snapshot().network_name_data, "Acme 4G");
    }

    #[test]
    fn long_operator_name_keeps_data_label() {
        let mut e = engine_with(|c| c.show_long_operator_name = true);
        e.apply_network_name(NameUpdate {
            show_plmn: true,
            plmn: Some("Acme Wireless".into()),
            ..NameUpdate::default()
        });
        let mut state = in_service(RadioAccessType::Lte);
        state.operator_alpha_short = Some("Acme".into());
        e.apply_service_state(state);
        assert_eq!(e.snapshot().network_name, "Acme Wireless");
        assert_eq!(e.snapshot().network_name_data, "Acme Wireless");
    }

    #[test]
    fn service_change_replays_name_with_new_class() {
        let mut e = engine_with(|c| c.show_rat = true);
        e.apply_network_name(NameUpdate {
            show_plmn: true,
            plmn: Some("Acme".into()),
            ..NameUpdate::default()
        });
        e.apply_service_state(in_service(RadioAccessType::Umts));
        assert_eq!(e.snapshot().network_name, "Acme 3G");
        e.apply_service_state(in_service(RadioAccessType::Lte));
        assert_eq!(e.snapshot().network_name, "Acme 4G");
    }

    #[test]
    fn locale_change_replays_through_localizer() {
        struct Upper;
        impl CarrierNameLocalizer for Upper {
            fn localize(&self, name: &str) -> Result<Option<String>, LocalizeError> {
                Ok(Some(name.to_uppercase()))
            }
        }
        let config = SignalConfig {
            show_locale: true,
            ..SignalConfig::default()
        };
        let mut e =
            SignalEngine::with_localizer(config, SubscriptionInfo::default(), Box::new(Upper));
        e.apply_network_name(NameUpdate {
            show_plmn: true,
            plmn: Some("acme".into()),
            ..NameUpdate::default()
        });
        assert_eq!(e.snapshot().network_name, "ACME");
        e.apply_locale_changed();
        assert_eq!(e.snapshot().network_name, "ACME");

        let mut plain = SignalEngine::with_localizer(
            SignalConfig::default(),
            SubscriptionInfo::default(),
            Box::new(NoLocalization),
        );
        plain.apply_network_name(NameUpdate {
            show_plmn: true,
            plmn: Some("acme".into()),
            ..NameUpdate::default()
        });
        assert_eq!(plain.snapshot().network_name, "acme");
    }

    // ─── Change Detection ───────────────────────────────────────────────

    #[test]
    fn repeated_input_is_idempotent() {
        let mut e = engine();
        connect(&mut e, RadioAccessType::Lte, 3);
        assert!(e.has_changed());
        e.commit();
        connect(&mut e, RadioAccessType::Lte, 3);
        assert!(!e.has_changed());
    }

    #[test]
    fn name_inputs_alone_do_not_notify() {
        let mut e = engine();
        // The first refresh moves off the default group; settle it first.
        e.apply_service_state(in_service(RadioAccessType::Lte));
        e.commit();
        e.apply_network_name(NameUpdate {
            show_spn: false,
            spn: Some("hidden".into()),
            ..NameUpdate::default()
        });
        assert!(!e.has_changed());
    }

    // ─── Slot Validation ────────────────────────────────────────────────

    #[test]
    fn invalid_slot_fails_derive() {
        let info = SubscriptionInfo {
            slot_index: 2,
            ..SubscriptionInfo::default()
        };
        let e = SignalEngine::new(
            SignalConfig {
                phone_count: 2,
                ..SignalConfig::default()
            },
            info,
        );
        assert_eq!(
            e.derive().unwrap_err(),
            SignalError::InvalidSlot {
                slot: 2,
                phone_count: 2
            }
        );
    }

    // ─── Serialization ──────────────────────────────────────────────────

    #[test]
    fn selection_serializes_with_plain_icon_ids() {
        let mut e = engine();
        connect(&mut e, RadioAccessType::Lte, 4);
        let json = serde_json::to_value(e.derive().unwrap()).unwrap();
        assert_eq!(json["icon_group"], "lte");
        assert_eq!(json["status_bar_icon"], "stat_sys_signal_4_fully");
        assert_eq!(json["data_type_overlay"], "stat_sys_data_fully_connected_lte");
        assert_eq!(json["stacked_voice_icon"], serde_json::Value::Null);
        assert_eq!(json["network_name"], "No service");
    }
}
