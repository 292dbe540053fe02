//! Allow-listed event bus
//!
//! Provides a synchronous publish/subscribe dispatcher constrained to a fixed
//! catalog of event names, with an append-only history of everything emitted.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};

use crate::error::{BusError, Result};
use crate::record::HistoryRecord;

/// Subscriber callback invoked with the emitted payload
pub type Handler<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// Unique identifier for one subscriber registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

struct Subscription<P> {
    id: SubscriptionId,
    handler: Handler<P>,
}

impl<P> Clone for Subscription<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: Arc::clone(&self.handler),
        }
    }
}

struct BusInner<P> {
    /// Every event name the bus accepts
    catalog: BTreeSet<String>,

    /// Event name -> registrations, in invocation order
    subscribers: RwLock<HashMap<String, Vec<Subscription<P>>>>,

    /// Every accepted emission, oldest first
    history: Mutex<Vec<HistoryRecord<P>>>,

    /// Counter for subscription IDs
    next_id: AtomicU64,

    created_at: Instant,
}

/// Synchronous event bus with a fixed event catalog
///
/// Subscribing or emitting under a name outside the catalog is a logged
/// no-op. Emission records history first, then invokes a snapshot of the
/// subscriber list; a panicking subscriber is logged and skipped without
/// affecting the others or the caller.
///
/// Clones share the same subscribers and history.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use video_event_bus::EventBus;
///
/// let bus: EventBus<u32> = EventBus::new(["adClick", "adError"]);
/// let clicks = Arc::new(AtomicUsize::new(0));
///
/// let counter = Arc::clone(&clicks);
/// bus.on("adClick", move |_payload| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// })
/// .unwrap();
///
/// bus.emit("adClick", 7);
/// bus.emit("adError", 0);
///
/// assert_eq!(clicks.load(Ordering::SeqCst), 1);
/// assert_eq!(bus.history().len(), 2);
/// assert!(bus.on("bogusEvent", |_| {}).is_err());
/// ```
pub struct EventBus<P> {
    inner: Arc<BusInner<P>>,
}

impl<P: Clone> EventBus<P> {
    /// Create a bus accepting exactly the given event names
    pub fn new<I, S>(catalog: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: Arc::new(BusInner {
                catalog: catalog.into_iter().map(Into::into).collect(),
                subscribers: RwLock::new(HashMap::new()),
                history: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                created_at: Instant::now(),
            }),
        }
    }

    /// Register `handler` for `event_name`
    ///
    /// Registering the same handler twice creates two independent
    /// registrations. Unknown names register nothing.
    pub fn subscribe(&self, event_name: &str, handler: Handler<P>) -> Result<SubscriptionId> {
        if !self.is_known(event_name) {
            let error = self.unknown_event(event_name);
            tracing::warn!("{}", error);
            return Err(error);
        }

        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner
            .subscribers
            .write()
            .entry(event_name.to_string())
            .or_default()
            .push(Subscription { id, handler });

        tracing::debug!(event = event_name, subscription = %id, "subscribed");
        Ok(id)
    }

    /// Register a closure for `event_name`
    pub fn on<F>(&self, event_name: &str, handler: F) -> Result<SubscriptionId>
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.subscribe(event_name, Arc::new(handler))
    }

    /// Remove the first registration of `handler` under `event_name`
    ///
    /// Handlers are matched by pointer identity. Returns whether a
    /// registration was removed.
    pub fn unsubscribe(&self, event_name: &str, handler: &Handler<P>) -> bool {
        let target = Arc::as_ptr(handler) as *const ();
        self.remove_first(event_name, |sub| Arc::as_ptr(&sub.handler) as *const () == target)
    }

    /// Remove a registration by its ID
    pub fn unsubscribe_id(&self, event_name: &str, id: SubscriptionId) -> bool {
        self.remove_first(event_name, |sub| sub.id == id)
    }

    /// Dispatch `payload` to every subscriber of `event_name`
    ///
    /// The event is appended to history even when nobody is subscribed.
    pub fn emit(&self, event_name: &str, payload: P) {
        if !self.is_known(event_name) {
            tracing::warn!("{}", self.unknown_event(event_name));
            return;
        }

        tracing::debug!(event = event_name, "Emitting event");

        self.inner
            .history
            .lock()
            .push(HistoryRecord::new(event_name, payload.clone()));

        // Snapshot so handlers may (un)subscribe without disturbing this fan-out
        let callbacks: Vec<Subscription<P>> = self
            .inner
            .subscribers
            .read()
            .get(event_name)
            .cloned()
            .unwrap_or_default();

        for subscription in &callbacks {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (subscription.handler)(&payload)));
            if let Err(cause) = outcome {
                tracing::error!(
                    event = event_name,
                    subscription = %subscription.id,
                    "Error executing handler: {}",
                    panic_message(&*cause)
                );
            }
        }
    }

    /// Copy of every recorded emission, oldest first
    pub fn history(&self) -> Vec<HistoryRecord<P>> {
        self.inner.history.lock().clone()
    }

    /// Number of recorded emissions
    pub fn history_len(&self) -> usize {
        self.inner.history.lock().len()
    }

    /// Current registrations per event name
    ///
    /// This is a read-only view; changing it has no effect on the bus.
    pub fn list_subscriptions(&self) -> BTreeMap<String, Vec<SubscriptionId>> {
        self.inner
            .subscribers
            .read()
            .iter()
            .filter(|(_, subs)| !subs.is_empty())
            .map(|(name, subs)| (name.clone(), subs.iter().map(|s| s.id).collect()))
            .collect()
    }

    /// Number of registrations for `event_name`
    pub fn subscriber_count(&self, event_name: &str) -> usize {
        self.inner
            .subscribers
            .read()
            .get(event_name)
            .map_or(0, Vec::len)
    }

    /// Whether `event_name` is in the catalog
    pub fn is_known(&self, event_name: &str) -> bool {
        self.inner.catalog.contains(event_name)
    }

    /// The catalog, sorted
    pub fn catalog(&self) -> impl Iterator<Item = &str> {
        self.inner.catalog.iter().map(String::as_str)
    }

    /// When the bus was created; history timestamps are relative to this
    pub fn created_at(&self) -> Instant {
        self.inner.created_at
    }

    fn remove_first(&self, event_name: &str, matches: impl Fn(&Subscription<P>) -> bool) -> bool {
        let mut subscribers = self.inner.subscribers.write();
        let Some(queue) = subscribers.get_mut(event_name) else {
            return false;
        };

        match queue.iter().position(matches) {
            Some(index) => {
                let removed = queue.remove(index);
                tracing::debug!(event = event_name, subscription = %removed.id, "unsubscribed");
                true
            }
            None => false,
        }
    }

    fn unknown_event(&self, event_name: &str) -> BusError {
        BusError::UnknownEvent {
            name: event_name.to_string(),
            valid: self
                .inner
                .catalog
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl<P> Clone for EventBus<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> std::fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("catalog_size", &self.inner.catalog.len())
            .field("history_len", &self.inner.history.lock().len())
            .finish()
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> String {
    if let Some(message) = cause.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = cause.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::AtomicUsize;

    fn catalog() -> EventBus<String> {
        EventBus::new(["adClick", "adError", "time"])
    }

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Handler<String> {
        let log = Arc::clone(log);
        Arc::new(move |payload: &String| log.lock().push(format!("{tag}:{payload}")))
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let bus = catalog();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let result = bus.on("bogusEvent", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(matches!(result, Err(BusError::UnknownEvent { ref name, .. }) if name == "bogusEvent"));
        assert!(bus.list_subscriptions().is_empty());

        // Emitting an unknown name neither calls anything nor records history
        bus.emit("bogusEvent", "x".to_string());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(bus.history_len(), 0);
    }

    #[test]
    fn test_invocation_follows_registration_order() {
        let bus = catalog();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe("adClick", recorder(&log, "first")).unwrap();
        bus.subscribe("adClick", recorder(&log, "second")).unwrap();
        bus.emit("adClick", "p".to_string());

        assert_eq!(*log.lock(), vec!["first:p", "second:p"]);
    }

    #[test]
    fn test_duplicate_registration_invokes_twice() {
        let bus = catalog();
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = recorder(&log, "dup");

        let first = bus.subscribe("time", Arc::clone(&handler)).unwrap();
        let second = bus.subscribe("time", Arc::clone(&handler)).unwrap();
        assert_ne!(first, second);

        bus.emit("time", "1".to_string());
        assert_eq!(log.lock().len(), 2);

        // Unsubscribe removes only the first matching registration
        assert!(bus.unsubscribe("time", &handler));
        assert_eq!(bus.list_subscriptions()["time"], vec![second]);

        bus.emit("time", "2".to_string());
        assert_eq!(log.lock().len(), 3);
    }

    #[test]
    fn test_unsubscribe_missing_is_noop() {
        let bus = catalog();
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = recorder(&log, "x");

        assert!(!bus.unsubscribe("adClick", &handler));
        assert!(!bus.unsubscribe("bogusEvent", &handler));
        assert!(!bus.unsubscribe_id("adClick", SubscriptionId(99)));
    }

    #[test]
    fn test_panicking_subscriber_is_isolated() {
        let bus = catalog();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on("adError", |_| panic!("broken consumer")).unwrap();
        bus.subscribe("adError", recorder(&log, "second")).unwrap();

        bus.emit("adError", "e".to_string());
        bus.emit("adError", "f".to_string());

        assert_eq!(*log.lock(), vec!["second:e", "second:f"]);
        assert_eq!(bus.history_len(), 2);
    }

    #[test]
    fn test_history_recorded_without_subscribers() {
        let bus = catalog();
        bus.emit("time", "t0".to_string());

        let history = bus.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].event_name, "time");
        assert_eq!(history[0].payload, "t0");
        assert!(history[0].timestamp >= bus.created_at());
    }

    #[test]
    fn test_history_is_defensive_copy() {
        let bus = catalog();
        bus.emit("time", "t0".to_string());

        let mut copy = bus.history();
        copy[0].payload = "mutated".to_string();
        copy.clear();

        assert_eq!(bus.history()[0].payload, "t0");
    }

    #[test]
    fn test_handler_may_subscribe_during_emit() {
        let bus = catalog();
        let calls = Arc::new(AtomicUsize::new(0));

        let inner_bus = bus.clone();
        let counter = Arc::clone(&calls);
        bus.on("adClick", move |_| {
            let counter = Arc::clone(&counter);
            inner_bus
                .on("adClick", move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        })
        .unwrap();

        // The registration made during the first emit is not part of its snapshot
        bus.emit("adClick", "1".to_string());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(bus.subscriber_count("adClick"), 2);

        bus.emit("adClick", "2".to_string());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[case("adClick", true)]
    #[case("adError", true)]
    #[case("adclick", false)]
    #[case("", false)]
    fn test_catalog_membership(#[case] name: &str, #[case] known: bool) {
        assert_eq!(catalog().is_known(name), known);
    }
}
