//! Delivery targets for canonical events

use video_event_bus::EventBus;

use crate::event::VideoEvent;
use crate::Payload;

/// Receives canonical events from the adapter
///
/// The adapter calls `deliver` with no locks held, so implementations may
/// re-enter the session that produced the event.
pub trait EventSink {
    fn deliver(&self, event: VideoEvent, payload: Payload);
}

impl EventSink for EventBus<Payload> {
    fn deliver(&self, event: VideoEvent, payload: Payload) {
        self.emit(event.as_str(), payload);
    }
}

/// Forwards every canonical event to a closure
pub struct CallbackSink<F>
where
    F: Fn(VideoEvent, &Payload),
{
    callback: F,
}

impl<F> CallbackSink<F>
where
    F: Fn(VideoEvent, &Payload),
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> EventSink for CallbackSink<F>
where
    F: Fn(VideoEvent, &Payload),
{
    fn deliver(&self, event: VideoEvent, payload: Payload) {
        (self.callback)(event, &payload);
    }
}
