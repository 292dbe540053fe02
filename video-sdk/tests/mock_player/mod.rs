//! In-memory `Player` used by the integration tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use video_sdk::{ListenerId, Player, RawEvent, RawHandler};

pub struct MockPlayer {
    version: String,
    setup_done: AtomicBool,
    setup_config: Mutex<Option<Map<String, Value>>>,
    listeners: Mutex<HashMap<String, Vec<(ListenerId, RawHandler)>>>,
    next_id: AtomicU64,
    ads: Mutex<Vec<String>>,
}

impl MockPlayer {
    pub fn new(version: &str) -> Arc<Self> {
        Arc::new(Self {
            version: version.to_string(),
            setup_done: AtomicBool::new(false),
            setup_config: Mutex::new(None),
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            ads: Mutex::new(Vec::new()),
        })
    }

    /// A player the host page already set up
    pub fn already_setup(version: &str) -> Arc<Self> {
        let player = Self::new(version);
        player.setup_done.store(true, Ordering::SeqCst);
        player
    }

    /// Deliver a raw event to every listener registered for it
    pub fn fire(&self, raw_name: &str, data: Value) {
        let handlers: Vec<RawHandler> = self
            .listeners
            .lock()
            .get(raw_name)
            .map(|entries| entries.iter().map(|(_, handler)| Arc::clone(handler)).collect())
            .unwrap_or_default();

        let event = RawEvent::from(data);
        for handler in handlers {
            handler(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().values().map(Vec::len).sum()
    }

    pub fn setup_config(&self) -> Option<Map<String, Value>> {
        self.setup_config.lock().clone()
    }

    pub fn played_ads(&self) -> Vec<String> {
        self.ads.lock().clone()
    }
}

impl Player for MockPlayer {
    fn version(&self) -> String {
        self.version.clone()
    }

    fn is_setup(&self) -> bool {
        self.setup_done.load(Ordering::SeqCst)
    }

    fn setup(&self, config: &Map<String, Value>) {
        *self.setup_config.lock() = Some(config.clone());
        self.setup_done.store(true, Ordering::SeqCst);
    }

    fn on(&self, raw_event: &str, handler: RawHandler) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners
            .lock()
            .entry(raw_event.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    fn off(&self, raw_event: &str, id: ListenerId) {
        if let Some(entries) = self.listeners.lock().get_mut(raw_event) {
            entries.retain(|(existing, _)| *existing != id);
        }
    }

    fn play_ad(&self, tag: &str) {
        self.ads.lock().push(tag.to_string());
    }
}
