//! # Mobile Signal Controller
//!
//! Pairs one [`SignalEngine`] with a [`ChangeNotifier`]. Every input runs
//! the same cycle: apply, refresh, compare against the last published
//! projection, derive and publish on change, commit.

use std::io;

use tracing::{debug, warn};

use crate::config::SignalConfig;
use crate::engine::{SignalEngine, SubscriptionInfo};
use crate::error::SignalError;
use crate::event::TelephonyEvent;
use crate::notifier::ChangeNotifier;

pub struct MobileSignalController {
    engine: SignalEngine,
    notifier: ChangeNotifier,
    published: u64,
    skipped: u64,
}

impl MobileSignalController {
    pub fn new(engine: SignalEngine, notifier: ChangeNotifier) -> Self {
        MobileSignalController {
            engine,
            notifier,
            published: 0,
            skipped: 0,
        }
    }

    /// Builds an engine and a notifier sized from the config.
    pub fn spawn(config: SignalConfig, info: SubscriptionInfo) -> io::Result<Self> {
        let notifier = ChangeNotifier::spawn(config.notifier_queue_depth)?;
        Ok(Self::new(SignalEngine::new(config, info), notifier))
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Selections handed to the notifier so far.
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Cycles skipped because the selection could not be derived.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Applies one event and publishes if the projection changed.
    ///
    /// Returns whether a selection was published.
    pub fn handle(&mut self, event: TelephonyEvent) -> Result<bool, SignalError> {
        debug!(sub_id = self.engine.subscription_id(), kind = event.kind(), "event");
        let engine = &mut self.engine;
        match event {
            TelephonyEvent::ServiceState(state) => engine.apply_service_state(state),
            TelephonyEvent::SignalStrength(strength) => engine.apply_signal_strength(strength),
            TelephonyEvent::DataConnection {
                state,
                rat,
                cell_identity,
            } => engine.apply_data_connection_state(state, rat, cell_identity),
            TelephonyEvent::DataActivity { activity } => engine.apply_data_activity(activity),
            TelephonyEvent::CarrierNetworkChange { active } => {
                engine.apply_carrier_network_change(active)
            }
            TelephonyEvent::NetworkName(update) => engine.apply_network_name(update),
            TelephonyEvent::LocaleChanged => engine.apply_locale_changed(),
            TelephonyEvent::MobileDataEnabled { enabled } => {
                engine.set_mobile_data_enabled(enabled)
            }
            TelephonyEvent::DefaultDataSubscription { subscription_id } => {
                engine.set_default_data_subscription(subscription_id)
            }
            TelephonyEvent::Forbidden { forbidden } => engine.set_forbidden(forbidden),
            TelephonyEvent::AirplaneMode { enabled } => engine.set_airplane_mode(enabled),
            TelephonyEvent::UserSetupComplete { complete } => {
                engine.set_user_setup_complete(complete)
            }
            TelephonyEvent::DefaultTransport {
                connected,
                validated,
            } => engine.set_default_transport(connected, validated),
            TelephonyEvent::ImsRegistration {
                registered,
                over_wifi,
            } => engine.set_ims_registration(registered, over_wifi),
            TelephonyEvent::EmbmsActive { active } => engine.set_embms_active(active),
        }
        self.notify_if_changed()
    }

    pub fn set_configuration(&mut self, config: SignalConfig) -> Result<bool, SignalError> {
        self.engine.set_configuration(config);
        self.notify_if_changed()
    }

    /// Publishes the derived selection when the projection changed.
    ///
    /// An invalid slot skips the cycle and keeps the last published
    /// projection, so the next change is compared against it.
    pub fn notify_if_changed(&mut self) -> Result<bool, SignalError> {
        if !self.engine.has_changed() {
            return Ok(false);
        }
        let selection = match self.engine.derive() {
            Ok(selection) => selection,
            Err(e @ SignalError::InvalidSlot { .. }) => {
                self.skipped += 1;
                warn!(sub_id = self.engine.subscription_id(), error = %e, "skipping icon update");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        self.notifier.publish(selection)?;
        self.engine.commit();
        self.published += 1;
        Ok(true)
    }
}
