//! # sigbar-core
//!
//! Cellular signal-indicator engine.
//!
//! Folds partial, asynchronously arriving modem telemetry (service state,
//! signal strength, data registration, carrier network change, SPN/PLMN)
//! into one per-subscription snapshot and maps it to the icons and labels
//! a status bar renders. Listeners are notified only when the externally
//! visible projection actually changes.
//!
//! ## Crate structure
//!
//! - [`rat`] — Radio access types, registration/data state, signal levels
//! - [`config`] — Two-stage TOML configuration and display styles
//! - [`catalog`] — Icon identifiers and the RAT → icon-group lookup
//! - [`policy`] — Carrier allow-list overrides (RSRP thresholds, forced style)
//! - [`name`] — SPN/PLMN operator label resolution and localization seam
//! - [`snapshot`] — Accumulated state with projection equality
//! - [`engine`] — The reducer: apply inputs, derive icon selection
//! - [`notifier`] — Non-blocking change delivery on a worker thread
//! - [`controller`] — Engine + notifier update cycle
//! - [`runtime`] — Single-writer actor fed by many producers
//! - [`event`] — Tagged telephony input events
//! - [`error`] — Engine error type

pub mod catalog;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod event;
pub mod name;
pub mod notifier;
pub mod policy;
pub mod rat;
pub mod runtime;
pub mod snapshot;

pub use config::{ConfigError, DisplayStyle, SignalConfig};
pub use controller::MobileSignalController;
pub use engine::{IconSelection, ServiceState, SignalEngine, SignalStrength, SubscriptionInfo};
pub use error::SignalError;
pub use event::TelephonyEvent;
pub use runtime::{EventSender, SubscriptionRuntime};
