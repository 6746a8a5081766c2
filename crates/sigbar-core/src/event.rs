use serde::Deserialize;

use crate::engine::{ServiceState, SignalStrength};
use crate::name::NameUpdate;
use crate::rat::{DataActivity, DataState, RadioAccessType};

/// One input from the telephony layer, settings observers or connectivity.
///
/// Deserializable so scripted scenarios can be written as tagged tables:
///
/// ```toml
/// [[steps]]
/// event = "data_connection"
/// state = "connected"
/// rat = "lte"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelephonyEvent {
    ServiceState(ServiceState),
    SignalStrength(SignalStrength),
    DataConnection {
        state: DataState,
        rat: RadioAccessType,
        #[serde(default)]
        cell_identity: Option<u32>,
    },
    DataActivity {
        activity: DataActivity,
    },
    CarrierNetworkChange {
        active: bool,
    },
    NetworkName(NameUpdate),
    LocaleChanged,
    MobileDataEnabled {
        enabled: bool,
    },
    DefaultDataSubscription {
        #[serde(default)]
        subscription_id: Option<i32>,
    },
    Forbidden {
        forbidden: bool,
    },
    AirplaneMode {
        enabled: bool,
    },
    UserSetupComplete {
        complete: bool,
    },
    DefaultTransport {
        connected: bool,
        validated: bool,
    },
    ImsRegistration {
        registered: bool,
        #[serde(default)]
        over_wifi: bool,
    },
    EmbmsActive {
        active: bool,
    },
}

impl TelephonyEvent {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TelephonyEvent::ServiceState(_) => "service_state",
            TelephonyEvent::SignalStrength(_) => "signal_strength",
            TelephonyEvent::DataConnection { .. } => "data_connection",
            TelephonyEvent::DataActivity { .. } => "data_activity",
            TelephonyEvent::CarrierNetworkChange { .. } => "carrier_network_change",
            TelephonyEvent::NetworkName(_) => "network_name",
            TelephonyEvent::LocaleChanged => "locale_changed",
            TelephonyEvent::MobileDataEnabled { .. } => "mobile_data_enabled",
            TelephonyEvent::DefaultDataSubscription { .. } => "default_data_subscription",
            TelephonyEvent::Forbidden { .. } => "forbidden",
            TelephonyEvent::AirplaneMode { .. } => "airplane_mode",
            TelephonyEvent::UserSetupComplete { .. } => "user_setup_complete",
            TelephonyEvent::DefaultTransport { .. } => "default_transport",
            TelephonyEvent::ImsRegistration { .. } => "ims_registration",
            TelephonyEvent::EmbmsActive { .. } => "embms_active",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rat::RegState;

    #[derive(Deserialize)]
    struct Steps {
        steps: Vec<TelephonyEvent>,
    }

    #[test]
    fn parses_tagged_steps() {
        let toml = r#"
            [[steps]]
            event = "service_state"
            voice_reg_state = "in_service"
            data_rat = "lte"
            using_carrier_aggregation = true

            [[steps]]
            event = "data_connection"
            state = "connected"
            rat = "lte"

            [[steps]]
            event = "locale_changed"

            [[steps]]
            event = "network_name"
            show_plmn = true
            plmn = "Acme"
        "#;
        let parsed: Steps = toml::from_str(toml).unwrap();
        assert_eq!(parsed.steps.len(), 4);
        match &parsed.steps[0] {
            TelephonyEvent::ServiceState(s) => {
                assert_eq!(s.voice_reg_state, RegState::InService);
                assert_eq!(s.data_reg_state, RegState::OutOfService);
                assert!(s.using_carrier_aggregation);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            parsed.steps[1],
            TelephonyEvent::DataConnection {
                state: DataState::Connected,
                rat: RadioAccessType::Lte,
                cell_identity: None,
            }
        );
        assert_eq!(parsed.steps[2].kind(), "locale_changed");
    }

    #[test]
    fn signal_strength_defaults_to_invalid_rsrp() {
        let toml = r#"
            [[steps]]
            event = "signal_strength"
            level = 3
        "#;
        let parsed: Steps = toml::from_str(toml).unwrap();
        match &parsed.steps[0] {
            TelephonyEvent::SignalStrength(s) => {
                assert_eq!(s.level, 3);
                assert!(s.lte_dbm > -44);
                assert!(s.is_gsm);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
