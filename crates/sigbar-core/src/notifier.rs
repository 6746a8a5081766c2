//! # Change Notifier
//!
//! Fire-and-forget delivery of [`IconSelection`] updates.
//!
//! A dedicated worker thread owns every listener. Publishing stores the
//! selection in a latest-value slot and nudges the worker with a
//! `try_send`, so a slow consumer can never stall telephony processing.
//! Under pressure intermediate selections are coalesced; the newest one
//! always reaches every listener. Subscriber channels that are full keep
//! their newest pending selection and are retried until it lands.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use tracing::debug;

use crate::engine::IconSelection;
use crate::error::SignalError;

/// How often a full subscriber channel is retried.
const SUBSCRIBER_RETRY: Duration = Duration::from_millis(20);

/// Receives every published selection on the notifier thread.
pub trait SignalListener: Send {
    fn on_selection(&mut self, selection: &IconSelection);
}

impl<F> SignalListener for F
where
    F: FnMut(&IconSelection) + Send,
{
    fn on_selection(&mut self, selection: &IconSelection) {
        self(selection)
    }
}

enum NotifierMessage {
    /// A new selection is waiting in the latest-value slot.
    Wake,
    AddListener(Box<dyn SignalListener>),
    Subscribe(Sender<IconSelection>),
}

type LatestSlot = Arc<Mutex<Option<IconSelection>>>;

pub struct ChangeNotifier {
    tx: Option<Sender<NotifierMessage>>,
    latest: LatestSlot,
    queue_depth: usize,
    shutdown: Arc<AtomicBool>,
    superseded: Arc<AtomicU64>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ChangeNotifier {
    /// Spawns the notifier thread with a queue of `queue_depth` messages.
    pub fn spawn(queue_depth: usize) -> io::Result<Self> {
        let queue_depth = queue_depth.max(1);
        let (tx, rx) = bounded(queue_depth);
        let latest: LatestSlot = Arc::new(Mutex::new(None));
        let shutdown = Arc::new(AtomicBool::new(false));
        let worker_latest = latest.clone();
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("sigbar-notifier".into())
            .spawn(move || notifier_worker(rx, worker_latest, shutdown_clone))?;

        Ok(ChangeNotifier {
            tx: Some(tx),
            latest,
            queue_depth,
            shutdown,
            superseded: Arc::new(AtomicU64::new(0)),
            handle: Some(handle),
        })
    }

    /// Hands a selection to the worker without blocking.
    ///
    /// A selection the worker has not picked up yet is replaced, never
    /// queued behind. Only a dead worker is an error.
    pub fn publish(&self, selection: IconSelection) -> Result<(), SignalError> {
        let tx = self.tx.as_ref().ok_or(SignalError::NotifierClosed)?;
        let replaced = self
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(selection)
            .is_some();
        if replaced {
            let superseded = self.superseded.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(superseded, "coalesced pending selection");
        }
        // A full queue already holds a wake-up that will read the slot.
        match tx.try_send(NotifierMessage::Wake) {
            Ok(()) | Err(TrySendError::Full(_)) => Ok(()),
            Err(TrySendError::Disconnected(_)) => Err(SignalError::NotifierClosed),
        }
    }

    pub fn add_listener(&self, listener: Box<dyn SignalListener>) -> Result<(), SignalError> {
        self.control(NotifierMessage::AddListener(listener))
    }

    /// Channel receiving published selections. A subscriber that falls
    /// `queue_depth` selections behind skips intermediate ones but always
    /// receives the newest.
    pub fn subscribe(&self) -> Result<Receiver<IconSelection>, SignalError> {
        let (tx, rx) = bounded(self.queue_depth);
        self.attach(tx)?;
        Ok(rx)
    }

    /// Registers a caller-created channel as a subscriber.
    pub fn attach(&self, tx: Sender<IconSelection>) -> Result<(), SignalError> {
        self.control(NotifierMessage::Subscribe(tx))
    }

    /// Selections replaced by a newer one before the worker picked them up.
    pub fn superseded(&self) -> u64 {
        self.superseded.load(Ordering::Relaxed)
    }

    fn control(&self, msg: NotifierMessage) -> Result<(), SignalError> {
        self.tx
            .as_ref()
            .ok_or(SignalError::NotifierClosed)?
            .send(msg)
            .map_err(|_| SignalError::NotifierClosed)
    }

    /// Stops the worker without delivering a pending selection. Idempotent.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ChangeNotifier {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Subscriber {
    tx: Sender<IconSelection>,
    pending: Option<IconSelection>,
}

impl Subscriber {
    /// Returns `false` once the receiving side is gone.
    fn offer(&mut self, selection: IconSelection) -> bool {
        match self.tx.try_send(selection) {
            Ok(()) => {
                self.pending = None;
                true
            }
            Err(TrySendError::Full(selection)) => {
                self.pending = Some(selection);
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    fn retry(&mut self) -> bool {
        match self.pending.take() {
            Some(selection) => self.offer(selection),
            None => true,
        }
    }
}

fn notifier_worker(rx: Receiver<NotifierMessage>, latest: LatestSlot, shutdown: Arc<AtomicBool>) {
    let mut listeners: Vec<Box<dyn SignalListener>> = Vec::new();
    let mut subscribers: Vec<Subscriber> = Vec::new();

    loop {
        let msg = if subscribers.iter().any(|sub| sub.pending.is_some()) {
            match rx.recv_timeout(SUBSCRIBER_RETRY) {
                Ok(msg) => Some(msg),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match rx.recv() {
                Ok(msg) => Some(msg),
                Err(_) => break,
            }
        };
        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        match msg {
            Some(NotifierMessage::Wake) => {
                let next = latest.lock().unwrap_or_else(PoisonError::into_inner).take();
                if let Some(selection) = next {
                    for listener in listeners.iter_mut() {
                        listener.on_selection(&selection);
                    }
                    subscribers.retain_mut(|sub| sub.offer(selection.clone()));
                }
            }
            Some(NotifierMessage::AddListener(listener)) => listeners.push(listener),
            Some(NotifierMessage::Subscribe(tx)) => {
                subscribers.push(Subscriber { tx, pending: None })
            }
            None => subscribers.retain_mut(Subscriber::retry),
        }
    }
    debug!(
        listeners = listeners.len(),
        subscribers = subscribers.len(),
        "notifier worker exiting"
    );
}
