//! VideoSession - one player attached to one event bus
//!
//! A session validates its configuration, checks the player version, sets the
//! player up if the host has not, and registers one listener per raw event
//! the binding table knows. Every raw event then flows through the session's
//! `NormalizationAdapter` and out through its sink.
//!
//! Events are processed one at a time. A raw event raised while another is
//! being delivered (a subscriber calling back into the player, say) is queued
//! and runs after the outer event's post-delivery resets and clears.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};
use video_event_bus::{EventBus, HistoryRecord, SubscriptionId};
use video_state::{
    raw_event_names, AdapterContext, AdapterError, CallbackSink, Category, EventSink,
    NormalizationAdapter, Payload, RawEvent, VideoEvent,
};

use crate::config::{is_supported_version, SessionConfig, MIN_PLAYER_VERSION};
use crate::error::{Result, SdkError};
use crate::player::{ListenerId, Player, RawHandler};

type SharedSink = Arc<dyn EventSink + Send + Sync>;

/// A normalized event stream for one player
///
/// # Example
///
/// ```rust,ignore
/// use video_sdk::{SessionConfig, VideoEvent, VideoSession};
///
/// let session = VideoSession::new(SessionConfig::new("player"), player)?;
///
/// session.subscribe(VideoEvent::AdImpression, |payload| {
///     println!("impression: {:?}", payload);
/// })?;
/// ```
pub struct VideoSession {
    config: SessionConfig,
    player: Arc<dyn Player>,
    bus: EventBus<Payload>,
    pipeline: Arc<Pipeline>,
    listeners: Mutex<Vec<(&'static str, ListenerId)>>,
}

impl VideoSession {
    /// Attach to a player and publish every canonical event on the session bus
    pub fn new(config: SessionConfig, player: Arc<dyn Player>) -> Result<Self> {
        let bus = EventBus::new(VideoEvent::names());
        let sink: SharedSink = Arc::new(bus.clone());

        Self::attach(config, player, bus, sink, None)
    }

    /// Attach to a player and hand the listed events to a callback
    ///
    /// Events not in `events` are not delivered, but their state effects are
    /// still applied.
    pub fn with_callback<F>(
        config: SessionConfig,
        player: Arc<dyn Player>,
        events: impl IntoIterator<Item = VideoEvent>,
        callback: F,
    ) -> Result<Self>
    where
        F: Fn(VideoEvent, &Payload) + Send + Sync + 'static,
    {
        let bus = EventBus::new(VideoEvent::names());
        let sink: SharedSink = Arc::new(CallbackSink::new(callback));

        Self::attach(config, player, bus, sink, Some(events.into_iter().collect()))
    }

    fn attach(
        config: SessionConfig,
        player: Arc<dyn Player>,
        bus: EventBus<Payload>,
        sink: SharedSink,
        events: Option<Vec<VideoEvent>>,
    ) -> Result<Self> {
        config.validate()?;

        let version = player.version();
        if !is_supported_version(&version) {
            warn!(div_id = %config.div_id, version = %version, "Unsupported player version");
            return Err(SdkError::UnsupportedPlayerVersion {
                found: version,
                minimum: MIN_PLAYER_VERSION.to_string(),
            });
        }

        let context = AdapterContext {
            div_id: config.div_id.clone(),
            player_version: version,
            autostart: config.autostart,
            ad_base: config.ad_base_state(),
        };
        let adapter = match events {
            Some(events) => NormalizationAdapter::with_events(context, events),
            None => NormalizationAdapter::new(context),
        };

        let session = Self {
            config,
            player,
            bus,
            pipeline: Arc::new(Pipeline::new(adapter, sink)),
            listeners: Mutex::new(Vec::new()),
        };

        let already_setup = session.player.is_setup();
        session.register_listeners();

        if already_setup {
            // The player will not report ready again
            debug!(div_id = %session.config.div_id, "Player already set up; starting session");
            session.pipeline.submit("ready", &RawEvent::empty());
        } else {
            session.player.setup(&session.config.player_setup());
        }

        info!(div_id = %session.config.div_id, "Video session attached");
        Ok(session)
    }

    fn register_listeners(&self) {
        let mut listeners = self.listeners.lock();
        for raw_name in raw_event_names() {
            let pipeline = Arc::clone(&self.pipeline);
            let handler: RawHandler = Arc::new(move |data: &RawEvent| {
                pipeline.submit(raw_name, data);
            });

            let id = self.player.on(raw_name, handler);
            trace!(raw = raw_name, listener = %id, "Registered player listener");
            listeners.push((raw_name, id));
        }
    }

    /// Subscribe to a canonical event on the session bus
    pub fn subscribe<F>(&self, event: VideoEvent, handler: F) -> Result<SubscriptionId>
    where
        F: Fn(&Payload) + Send + Sync + 'static,
    {
        Ok(self.bus.on(event.as_str(), handler)?)
    }

    /// Subscribe by canonical event name
    ///
    /// Unknown names are rejected with `BusError::UnknownEvent`.
    pub fn subscribe_name<F>(&self, event_name: &str, handler: F) -> Result<SubscriptionId>
    where
        F: Fn(&Payload) + Send + Sync + 'static,
    {
        Ok(self.bus.on(event_name, handler)?)
    }

    pub fn unsubscribe(&self, event: VideoEvent, id: SubscriptionId) -> bool {
        self.bus.unsubscribe_id(event.as_str(), id)
    }

    /// The session's event bus
    pub fn bus(&self) -> &EventBus<Payload> {
        &self.bus
    }

    /// Every event published on the session bus so far
    pub fn history(&self) -> Vec<HistoryRecord<Payload>> {
        self.bus.history()
    }

    /// Copy of one category's accumulated state
    pub fn state(&self, category: Category) -> Result<Payload> {
        Ok(self.pipeline.adapter.lock().snapshot(category)?)
    }

    /// Ask the player to play an ad
    pub fn render_ad(&self, tag: &str) {
        debug!(div_id = %self.config.div_id, "Rendering ad");
        self.player.play_ad(tag);
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn div_id(&self) -> &str {
        &self.config.div_id
    }

    pub fn player_version(&self) -> String {
        self.pipeline.adapter.lock().context().player_version.clone()
    }

    /// Detach from the player and emit `destroyed`
    ///
    /// Calling this more than once has no further effect. Called from inside a
    /// subscriber, teardown runs once the current event has been delivered.
    pub fn destroy(&self) {
        let listeners = std::mem::take(&mut *self.listeners.lock());
        for (raw_name, id) in listeners {
            self.player.off(raw_name, id);
        }

        if self.is_destroyed() {
            return;
        }

        self.pipeline.submit("remove", &RawEvent::empty());
        info!(div_id = %self.config.div_id, "Video session destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.pipeline.adapter.lock().is_destroyed()
    }
}

impl std::fmt::Debug for VideoSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoSession")
            .field("div_id", &self.config.div_id)
            .field("listeners", &self.listeners.lock().len())
            .field("bus", &self.bus)
            .finish()
    }
}

#[derive(Default)]
struct Queue {
    pending: VecDeque<(&'static str, RawEvent)>,
    draining: bool,
}

/// Adapter and sink shared by every player listener of a session
struct Pipeline {
    adapter: Mutex<NormalizationAdapter>,
    sink: SharedSink,
    queue: Mutex<Queue>,
}

impl Pipeline {
    fn new(adapter: NormalizationAdapter, sink: SharedSink) -> Self {
        Self {
            adapter: Mutex::new(adapter),
            sink,
            queue: Mutex::new(Queue::default()),
        }
    }

    /// Queue a raw event and drain the queue unless a caller up the stack
    /// already is
    fn submit(&self, raw_name: &'static str, data: &RawEvent) {
        {
            let mut queue = self.queue.lock();
            queue.pending.push_back((raw_name, data.clone()));
            if queue.draining {
                trace!(raw = raw_name, pending = queue.pending.len(), "Deferring nested player event");
                return;
            }
            queue.draining = true;
        }

        loop {
            let next = {
                let mut queue = self.queue.lock();
                match queue.pending.pop_front() {
                    Some(next) => next,
                    None => {
                        queue.draining = false;
                        return;
                    }
                }
            };
            self.process(next.0, &next.1);
        }
    }

    /// Run one raw event through the adapter and deliver the result
    ///
    /// The adapter lock is released while the sink runs so subscribers can
    /// call back into the session. Failures are logged and end processing of
    /// this event only.
    fn process(&self, raw_name: &str, data: &RawEvent) {
        let prepared = self.adapter.lock().prepare(raw_name, data);
        let mut dispatch = match prepared {
            Ok(dispatch) => dispatch,
            Err(AdapterError::Destroyed) => {
                trace!(raw = raw_name, "Ignoring player event after destroy");
                return;
            }
            Err(e) => {
                error!(raw = raw_name, error = %e, "Failed to normalize player event");
                return;
            }
        };

        if let Some(payload) = dispatch.take_payload() {
            let event = dispatch.event();
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| self.sink.deliver(event, payload)));
            if delivered.is_err() {
                error!(event = %event, "Event sink panicked");
            }
        }

        if let Err(e) = self.adapter.lock().finish(dispatch) {
            error!(raw = raw_name, error = %e, "Failed to apply post-delivery state changes");
        }
    }
}
