//! # State Snapshot
//!
//! The accumulated per-subscription record every telemetry update is
//! folded into. Equality is *projection* equality: the last-seen name
//! inputs, kept only to replay SPN/PLMN on service-state and locale
//! changes, never make two snapshots differ.

use crate::catalog::IconGroupKind;
use crate::config::DisplayStyle;
use crate::name::NameUpdate;
use crate::rat::{DataActivity, RadioAccessType, RegState, SignalLevel};

#[derive(Debug, Clone)]
pub struct StateSnapshot {
    // connection
    pub has_voice_service: bool,
    pub has_data_service: bool,
    pub connected: bool,
    pub data_connected: bool,
    pub roaming: bool,
    pub is_emergency_only: bool,
    pub is_default_transport: bool,
    pub is_forbidden: bool,
    /// False only while cellular is the default transport and failed
    /// validation.
    pub inet_validated: bool,
    /// Subscription has mobile data hardware.
    pub enabled: bool,
    pub mobile_data_enabled: bool,

    // signal
    pub signal_level: SignalLevel,
    pub voice_level: SignalLevel,
    pub is_cdma: bool,

    // network type
    pub data_rat: RadioAccessType,
    pub voice_rat: RadioAccessType,
    pub data_reg_state: RegState,
    pub voice_reg_state: RegState,
    pub ims_radio_technology: RadioAccessType,

    // naming
    pub network_name: String,
    pub network_name_data: String,
    pub show_spn: bool,
    pub show_plmn: bool,
    pub name_inputs: NameUpdate,

    // mode
    pub carrier_network_change_active: bool,
    pub airplane_mode: bool,
    pub user_setup_complete: bool,
    pub activity: DataActivity,

    // identity
    pub subscription_id: i32,
    pub slot_index: i32,
    pub is_data_primary: bool,
    pub display_style: DisplayStyle,

    // derived
    pub icon_group: IconGroupKind,
    pub ims_registered: bool,
    pub ims_over_wifi: bool,
    pub embms_active: bool,
}

impl StateSnapshot {
    pub fn new(
        subscription_id: i32,
        slot_index: i32,
        display_style: DisplayStyle,
        icon_group: IconGroupKind,
        network_name: String,
    ) -> Self {
        StateSnapshot {
            has_voice_service: false,
            has_data_service: false,
            connected: false,
            data_connected: false,
            roaming: false,
            is_emergency_only: false,
            is_default_transport: false,
            is_forbidden: false,
            inet_validated: true,
            enabled: true,
            mobile_data_enabled: true,
            signal_level: SignalLevel::NoneOrUnknown,
            voice_level: SignalLevel::NoneOrUnknown,
            is_cdma: false,
            data_rat: RadioAccessType::Unknown,
            voice_rat: RadioAccessType::Unknown,
            data_reg_state: RegState::OutOfService,
            voice_reg_state: RegState::OutOfService,
            ims_radio_technology: RadioAccessType::Unknown,
            network_name_data: network_name.clone(),
            network_name,
            show_spn: false,
            show_plmn: false,
            name_inputs: NameUpdate::default(),
            carrier_network_change_active: false,
            airplane_mode: false,
            user_setup_complete: false,
            activity: DataActivity::None,
            subscription_id,
            slot_index,
            is_data_primary: true,
            display_style,
            icon_group,
            ims_registered: false,
            ims_over_wifi: false,
            embms_active: false,
        }
    }
}

impl PartialEq for StateSnapshot {
    fn eq(&self, other: &Self) -> bool {
        // Destructured so a new field cannot be silently left out.
        let StateSnapshot {
            has_voice_service,
            has_data_service,
            connected,
            data_connected,
            roaming,
            is_emergency_only,
            is_default_transport,
            is_forbidden,
            inet_validated,
            enabled,
            mobile_data_enabled,
            signal_level,
            voice_level,
            is_cdma,
            data_rat,
            voice_rat,
            data_reg_state,
            voice_reg_state,
            ims_radio_technology,
            network_name,
            network_name_data,
            show_spn,
            show_plmn,
            name_inputs: _,
            carrier_network_change_active,
            airplane_mode,
            user_setup_complete,
            activity,
            subscription_id,
            slot_index,
            is_data_primary,
            display_style,
            icon_group,
            ims_registered,
            ims_over_wifi,
            embms_active,
        } = self;

        *has_voice_service == other.has_voice_service
            && *has_data_service == other.has_data_service
            && *connected == other.connected
            && *data_connected == other.data_connected
            && *roaming == other.roaming
            && *is_emergency_only == other.is_emergency_only
            && *is_default_transport == other.is_default_transport
            && *is_forbidden == other.is_forbidden
            && *inet_validated == other.inet_validated
            && *enabled == other.enabled
            && *mobile_data_enabled == other.mobile_data_enabled
            && *signal_level == other.signal_level
            && *voice_level == other.voice_level
            && *is_cdma == other.is_cdma
            && *data_rat == other.data_rat
            && *voice_rat == other.voice_rat
            && *data_reg_state == other.data_reg_state
            && *voice_reg_state == other.voice_reg_state
            && *ims_radio_technology == other.ims_radio_technology
            && *network_name == other.network_name
            && *network_name_data == other.network_name_data
            && *show_spn == other.show_spn
            && *show_plmn == other.show_plmn
            && *carrier_network_change_active == other.carrier_network_change_active
            && *airplane_mode == other.airplane_mode
            && *user_setup_complete == other.user_setup_complete
            && *activity == other.activity
            && *subscription_id == other.subscription_id
            && *slot_index == other.slot_index
            && *is_data_primary == other.is_data_primary
            && *display_style == other.display_style
            && *icon_group == other.icon_group
            && *ims_registered == other.ims_registered
            && *ims_over_wifi == other.ims_over_wifi
            && *embms_active == other.embms_active
    }
}

impl Eq for StateSnapshot {}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> StateSnapshot {
        StateSnapshot::new(1, 0, DisplayStyle::Default, IconGroupKind::G, "No service".into())
    }

    #[test]
    fn name_inputs_ignored_by_equality() {
        let a = snapshot();
        let mut b = a.clone();
        b.name_inputs.spn = Some("Carrier".into());
        b.name_inputs.show_spn = true;
        assert_eq!(a, b);
    }

    #[test]
    fn projected_fields_compared() {
        let a = snapshot();
        let mut b = a.clone();
        b.signal_level = SignalLevel::Good;
        assert_ne!(a, b);

        let mut c = a.clone();
        c.icon_group = IconGroupKind::ThreeG;
        assert_ne!(a, c);

        let mut d = a.clone();
        d.network_name_data = "Carrier".into();
        assert_ne!(a, d);
    }

    #[test]
    fn initial_names_match() {
        let s = snapshot();
        assert_eq!(s.network_name, s.network_name_data);
        assert!(s.inet_validated);
    }
}
