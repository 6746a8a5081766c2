//! Drivers for exercising the signal engine outside a phone.
//!
//! Replays scripted TOML scenarios through a [`MobileSignalController`]
//! and generates deterministic random-walk telemetry for soak runs against
//! a [`SubscriptionRuntime`].
//!
//! [`MobileSignalController`]: sigbar_core::MobileSignalController
//! [`SubscriptionRuntime`]: sigbar_core::SubscriptionRuntime

pub mod random_walk;
pub mod scenario;
