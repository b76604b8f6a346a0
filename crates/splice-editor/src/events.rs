//! Editor notifications and the bus that delivers them.
//!
//! Events carry identifiers, never timeline state. Listeners that need the
//! state ask the session for a snapshot.

use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use splice_core::{RationalTime, TrackKind};
use splice_media::ExportSummary;
use splice_timeline::TransitionKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// A typed event payload that can be subscribed to on its own.
pub trait EventPayload: Clone + Send + Sync + 'static {
    /// Kebab-case event name, e.g. `clip-split`.
    const NAME: &'static str;

    fn from_event(event: &EditorEvent) -> Option<&Self>;
}

macro_rules! editor_events {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Every notification an [`crate::EditorSession`] publishes.
        #[derive(Debug, Clone, PartialEq)]
        pub enum EditorEvent {
            $($variant($variant)),+
        }

        impl EditorEvent {
            /// Kebab-case event name.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => $name),+
                }
            }
        }

        $(
            impl EventPayload for $variant {
                const NAME: &'static str = $name;

                fn from_event(event: &EditorEvent) -> Option<&Self> {
                    match event {
                        EditorEvent::$variant(payload) => Some(payload),
                        _ => None,
                    }
                }
            }

            impl From<$variant> for EditorEvent {
                fn from(payload: $variant) -> Self {
                    Self::$variant(payload)
                }
            }
        )+
    };
}

editor_events! {
    TrackAdded => "track-added",
    TrackRemoved => "track-removed",
    ClipAdded => "clip-added",
    ClipRemoved => "clip-removed",
    ClipTrimmed => "clip-trimmed",
    ClipSplit => "clip-split",
    ClipMoved => "clip-moved",
    ClipMovedToTrack => "clip-moved-to-track",
    TransitionApplied => "transition-applied",
    TimelineLoaded => "timeline-loaded",
    TimelineCleared => "timeline-cleared",
    ExportStarted => "export-start",
    ExportProgress => "export-progress",
    ExportCompleted => "export-complete",
    ExportFailed => "export-error",
    PreviewStarted => "preview-start",
    PreviewCompleted => "preview-complete",
    PreviewFailed => "preview-error",
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackAdded {
    pub track_id: Uuid,
    pub kind: TrackKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackRemoved {
    pub track_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipAdded {
    pub track_id: Uuid,
    pub clip_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipRemoved {
    pub track_id: Uuid,
    pub clip_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipTrimmed {
    pub track_id: Uuid,
    pub clip_id: Uuid,
    pub old_duration: RationalTime,
    pub new_duration: RationalTime,
}

/// The original clip no longer exists; two new clips replace it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSplit {
    pub track_id: Uuid,
    pub original_clip_id: Uuid,
    pub first_clip_id: Uuid,
    pub second_clip_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipMoved {
    pub track_id: Uuid,
    pub clip_id: Uuid,
    pub old_start: RationalTime,
    pub new_start: RationalTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipMovedToTrack {
    pub from_track_id: Uuid,
    pub to_track_id: Uuid,
    pub clip_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionApplied {
    pub track_id: Uuid,
    pub clip_id: Uuid,
    pub kind: TransitionKind,
    pub duration: RationalTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLoaded {
    pub track_count: usize,
    pub clip_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineCleared;

#[derive(Debug, Clone, PartialEq)]
pub struct ExportStarted {
    pub job_id: Uuid,
    pub track_count: usize,
    pub clip_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportProgress {
    pub job_id: Uuid,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportCompleted {
    pub summary: ExportSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportFailed {
    pub job_id: Uuid,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewStarted {
    pub at: RationalTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewCompleted {
    pub at: RationalTime,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewFailed {
    pub at: RationalTime,
    pub message: String,
}

// ── Bus ─────────────────────────────────────────────────────────

/// Handle returned by the subscribe methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&EditorEvent) + Send + Sync>;

#[derive(Clone)]
enum Sink {
    Handler(Handler),
    Channel(Sender<EditorEvent>),
}

#[derive(Clone)]
struct Subscriber {
    id: SubscriptionId,
    sink: Sink,
}

/// Synchronous, ordered publish/subscribe.
///
/// Handlers run on the publishing thread in subscription order. The
/// subscriber list is copied before dispatch, so a handler may subscribe or
/// unsubscribe without deadlocking; such changes apply from the next event.
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&self, sink: Sink) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push(Subscriber { id, sink });
        id
    }

    /// Receive only events carrying payload `T`.
    pub fn subscribe<T, F>(&self, handler: F) -> SubscriptionId
    where
        T: EventPayload,
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.add(Sink::Handler(Arc::new(move |event: &EditorEvent| {
            if let Some(payload) = T::from_event(event) {
                handler(payload);
            }
        })))
    }

    /// Receive every event.
    pub fn subscribe_all<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&EditorEvent) + Send + Sync + 'static,
    {
        self.add(Sink::Handler(Arc::new(handler)))
    }

    /// Receive every event through an unbounded channel. The subscription
    /// ends on its own once the receiver is dropped.
    pub fn channel(&self) -> Receiver<EditorEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.add(Sink::Channel(tx));
        rx
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Deliver `event` to every current subscriber.
    pub fn publish(&self, event: impl Into<EditorEvent>) {
        let event = event.into();
        let subscribers = self.subscribers.read().clone();
        tracing::trace!(event = event.name(), subscribers = subscribers.len(), "Publishing event");

        let mut disconnected = Vec::new();
        for subscriber in &subscribers {
            match &subscriber.sink {
                Sink::Handler(handler) => handler(&event),
                Sink::Channel(tx) => {
                    if tx.send(event.clone()).is_err() {
                        disconnected.push(subscriber.id);
                    }
                }
            }
        }
        if !disconnected.is_empty() {
            self.subscribers
                .write()
                .retain(|s| !disconnected.contains(&s.id));
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
