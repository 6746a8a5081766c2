use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{debug, warn};

use crate::config::SignalConfig;
use crate::controller::MobileSignalController;
use crate::engine::{IconSelection, SubscriptionInfo};
use crate::error::SignalError;
use crate::event::TelephonyEvent;
use crate::notifier::SignalListener;

/// Default inbox capacity for telephony events.
pub const DEFAULT_INBOX_CAPACITY: usize = 256;

enum RuntimeMessage {
    Event(TelephonyEvent),
    Configure(Box<SignalConfig>),
    Subscribe(Sender<IconSelection>),
    AddListener(Box<dyn SignalListener>),
    Barrier(Sender<()>),
    Shutdown,
}

/// Cloneable producer handle. Any number of telephony threads may hold
/// one; events are applied in arrival order by the single worker.
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<RuntimeMessage>,
    shutdown: Arc<AtomicBool>,
}

impl EventSender {
    /// Blocks while the inbox is full.
    pub fn send(&self, event: TelephonyEvent) -> Result<(), SignalError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(SignalError::RuntimeClosed);
        }
        self.tx
            .send(RuntimeMessage::Event(event))
            .map_err(|_| SignalError::RuntimeClosed)
    }

    /// Returns the event back when the inbox is full.
    pub fn try_send(&self, event: TelephonyEvent) -> Result<(), TrySendError<TelephonyEvent>> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(TrySendError::Disconnected(event));
        }
        self.tx
            .try_send(RuntimeMessage::Event(event))
            .map_err(|e| match e {
                TrySendError::Full(RuntimeMessage::Event(ev)) => TrySendError::Full(ev),
                TrySendError::Disconnected(RuntimeMessage::Event(ev)) => {
                    TrySendError::Disconnected(ev)
                }
                _ => unreachable!("only events are sent through EventSender"),
            })
    }
}

/// Single-writer actor owning one subscription's controller.
///
/// The worker thread is the only place the engine is touched, so producers
/// never need a lock. Dropping the runtime shuts the worker down without
/// draining pending events.
pub struct SubscriptionRuntime {
    tx: Sender<RuntimeMessage>,
    shutdown: Arc<AtomicBool>,
    queue_depth: usize,
    handle: Option<thread::JoinHandle<()>>,
}

impl SubscriptionRuntime {
    pub fn spawn(config: SignalConfig, info: SubscriptionInfo) -> io::Result<Self> {
        Self::with_capacity(config, info, DEFAULT_INBOX_CAPACITY)
    }

    pub fn with_capacity(
        config: SignalConfig,
        info: SubscriptionInfo,
        inbox_capacity: usize,
    ) -> io::Result<Self> {
        let queue_depth = config.notifier_queue_depth;
        let sub_id = info.subscription_id;
        let controller = MobileSignalController::spawn(config, info)?;
        let (tx, rx) = bounded(inbox_capacity.max(1));
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name(format!("sigbar-sub-{sub_id}"))
            .spawn(move || runtime_worker(controller, rx, shutdown_clone))?;

        Ok(SubscriptionRuntime {
            tx,
            shutdown,
            queue_depth,
            handle: Some(handle),
        })
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
            shutdown: self.shutdown.clone(),
        }
    }

    pub fn send(&self, event: TelephonyEvent) -> Result<(), SignalError> {
        self.sender().send(event)
    }

    pub fn configure(&self, config: SignalConfig) -> Result<(), SignalError> {
        self.control(RuntimeMessage::Configure(Box::new(config)))
    }

    /// Channel receiving every selection this subscription publishes.
    pub fn subscribe(&self) -> Result<Receiver<IconSelection>, SignalError> {
        let (tx, rx) = bounded(self.queue_depth);
        self.control(RuntimeMessage::Subscribe(tx))?;
        Ok(rx)
    }

    pub fn add_listener(&self, listener: Box<dyn SignalListener>) -> Result<(), SignalError> {
        self.control(RuntimeMessage::AddListener(listener))
    }

    /// Blocks until every message sent before this call has been applied.
    pub fn barrier(&self) -> Result<(), SignalError> {
        let (tx, rx) = bounded(1);
        self.control(RuntimeMessage::Barrier(tx))?;
        rx.recv().map_err(|_| SignalError::RuntimeClosed)
    }

    fn control(&self, msg: RuntimeMessage) -> Result<(), SignalError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(SignalError::RuntimeClosed);
        }
        self.tx.send(msg).map_err(|_| SignalError::RuntimeClosed)
    }

    /// Stops the worker thread. Idempotent.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        let _ = self.tx.send(RuntimeMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SubscriptionRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn runtime_worker(
    mut controller: MobileSignalController,
    rx: Receiver<RuntimeMessage>,
    shutdown: Arc<AtomicBool>,
) {
    let sub_id = controller.engine().subscription_id();
    for msg in rx.iter() {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        match msg {
            RuntimeMessage::Event(event) => {
                let kind = event.kind();
                if let Err(e) = controller.handle(event) {
                    warn!(sub_id, kind, error = %e, "event cycle failed");
                }
            }
            RuntimeMessage::Configure(config) => {
                if let Err(e) = controller.set_configuration(*config) {
                    warn!(sub_id, error = %e, "reconfiguration cycle failed");
                }
            }
            RuntimeMessage::Subscribe(tx) => {
                if let Err(e) = controller.notifier().attach(tx) {
                    warn!(sub_id, error = %e, "failed to attach subscriber");
                }
            }
            RuntimeMessage::AddListener(listener) => {
                if let Err(e) = controller.notifier().add_listener(listener) {
                    warn!(sub_id, error = %e, "failed to register listener");
                }
            }
            RuntimeMessage::Barrier(done) => {
                let _ = done.send(());
            }
            RuntimeMessage::Shutdown => break,
        }
    }
    debug!(
        sub_id,
        published = controller.published(),
        skipped = controller.skipped(),
        "subscription worker exiting"
    );
}
