//! Seeded random-walk modem telemetry.
//!
//! Produces a reproducible stream of `TelephonyEvent`s (signal drift,
//! RAT handovers, data and settings changes) for soak runs of the
//! subscription runtime.

use rand::RngExt as _;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sigbar_core::engine::{ServiceState, SignalStrength};
use sigbar_core::rat::{DataActivity, DataState, RadioAccessType, RegState};
use sigbar_core::TelephonyEvent;

/// Bounds and event mix for a telemetry walk.
#[derive(Debug, Clone)]
pub struct WalkConfig {
    pub seed: u64,
    pub steps: usize,
    /// Maximum RSRP change per signal report, in dB.
    pub rsrp_step_db: i32,
    /// Probability that a step is a RAT handover.
    pub handover_probability: f64,
    /// Probability that a step loses or regains service.
    pub outage_probability: f64,
    /// Probability that a step toggles a carrier network change.
    pub network_change_probability: f64,
    pub carrier_aggregation: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        WalkConfig {
            seed: 42,
            steps: 200,
            rsrp_step_db: 6,
            handover_probability: 0.05,
            outage_probability: 0.01,
            network_change_probability: 0.005,
            carrier_aggregation: true,
        }
    }
}

const HANDOVER_RATS: [RadioAccessType; 7] = [
    RadioAccessType::Edge,
    RadioAccessType::Umts,
    RadioAccessType::Hspa,
    RadioAccessType::Hspap,
    RadioAccessType::Lte,
    RadioAccessType::Lte,
    RadioAccessType::Iwlan,
];

const RSRP_MIN: i32 = -140;
const RSRP_MAX: i32 = -44;

/// Deterministic modem telemetry generator.
///
/// Each step emits one [`TelephonyEvent`]. RSRP drifts as a clamped random
/// walk, and the serving RAT, service and carrier-network-change state flip
/// with the configured probabilities. Two walks with the same config yield
/// identical event sequences.
#[derive(Debug)]
pub struct TelemetryWalk {
    cfg: WalkConfig,
    rng: StdRng,
    emitted: usize,
    rat: RadioAccessType,
    rsrp: i32,
    in_service: bool,
    network_change: bool,
    activity: DataActivity,
}

impl TelemetryWalk {
    pub fn new(cfg: WalkConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let rsrp = rng.random_range(-110..=-70);
        Self {
            cfg,
            rng,
            emitted: 0,
            rat: RadioAccessType::Lte,
            rsrp,
            in_service: true,
            network_change: false,
            activity: DataActivity::None,
        }
    }

    /// The opening reports a modem sends after attach.
    pub fn attach_events(&self) -> Vec<TelephonyEvent> {
        vec![
            TelephonyEvent::ServiceState(self.service_state()),
            TelephonyEvent::SignalStrength(self.signal_strength()),
            self.data_connection(),
            TelephonyEvent::DefaultTransport {
                connected: true,
                validated: true,
            },
        ]
    }

    pub fn next_event(&mut self) -> TelephonyEvent {
        self.emitted += 1;
        let roll = self.rng.random::<f64>();
        let mut threshold = self.cfg.network_change_probability;
        if roll < threshold {
            self.network_change = !self.network_change;
            return TelephonyEvent::CarrierNetworkChange {
                active: self.network_change,
            };
        }
        threshold += self.cfg.outage_probability;
        if roll < threshold {
            self.in_service = !self.in_service;
            return TelephonyEvent::ServiceState(self.service_state());
        }
        threshold += self.cfg.handover_probability;
        if roll < threshold {
            self.rat = HANDOVER_RATS[self.rng.random_range(0..HANDOVER_RATS.len())];
            return if self.rng.random::<bool>() {
                TelephonyEvent::ServiceState(self.service_state())
            } else {
                self.data_connection()
            };
        }
        if roll < 0.8 {
            let step = self.cfg.rsrp_step_db.max(0);
            let delta = self.rng.random_range(-step..=step);
            self.rsrp = (self.rsrp + delta).clamp(RSRP_MIN, RSRP_MAX);
            return TelephonyEvent::SignalStrength(self.signal_strength());
        }
        self.activity = match self.rng.random_range(0..4) {
            0 => DataActivity::None,
            1 => DataActivity::In,
            2 => DataActivity::Out,
            _ => DataActivity::InOut,
        };
        TelephonyEvent::DataActivity {
            activity: self.activity,
        }
    }

    /// Attach reports followed by `steps` walk events.
    pub fn events(&mut self) -> Vec<TelephonyEvent> {
        let mut events = self.attach_events();
        events.reserve(self.cfg.steps);
        for _ in 0..self.cfg.steps {
            events.push(self.next_event());
        }
        events
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn service_state(&self) -> ServiceState {
        let reg = if self.in_service {
            RegState::InService
        } else {
            RegState::OutOfService
        };
        ServiceState {
            voice_reg_state: reg,
            data_reg_state: reg,
            voice_rat: self.rat,
            data_rat: self.rat,
            operator_numeric: Some("310260".into()),
            operator_alpha_short: Some("Sim".into()),
            using_carrier_aggregation: self.cfg.carrier_aggregation
                && self.rat == RadioAccessType::Lte,
            ..ServiceState::default()
        }
    }

    fn signal_strength(&self) -> SignalStrength {
        let level = match self.rsrp {
            r if r >= -85 => 4,
            r if r >= -95 => 3,
            r if r >= -105 => 2,
            r if r >= -115 => 1,
            _ => 0,
        };
        SignalStrength {
            level,
            gsm_level: level,
            lte_dbm: self.rsrp,
            ..SignalStrength::default()
        }
    }

    fn data_connection(&self) -> TelephonyEvent {
        TelephonyEvent::DataConnection {
            state: if self.in_service {
                DataState::Connected
            } else {
                DataState::Disconnected
            },
            rat: self.rat,
            cell_identity: None,
        }
    }
}
