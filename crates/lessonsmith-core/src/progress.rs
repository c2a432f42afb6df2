//! Progress reporting for pipeline runs.
//!
//! A run reports through an injected [`ProgressSink`]. Every event carries
//! the session id of the run that emitted it, so a single sink can observe
//! several concurrent runs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use crate::types::ProgressStatus;

// ---------------------------------------------------------------------------
// Session id
// ---------------------------------------------------------------------------

/// Identifier correlating the progress events of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// A fresh random session id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SessionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A progress notification emitted by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub session_id: SessionId,
    /// Completion percentage, 0 to 100.
    pub progress: u8,
    pub current_stage: String,
    pub status: ProgressStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>3}%] {} ({})", self.progress, self.current_stage, self.status)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Receiver of progress events.
///
/// Called synchronously from the run, in stage order. Implementations
/// must not block for long; forward to a channel if the consumer is slow.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

// Compile-time check that ProgressSink is object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn ProgressSink) {}
};

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(F);

impl<F> FnSink<F>
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> ProgressSink for FnSink<F>
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        (self.0)(event)
    }
}

/// Forwards events into an unbounded tokio channel.
///
/// Sending never blocks the run. Events sent after the receiver is dropped
/// are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiving half of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Create a sink whose events are consumed as a stream.
    pub fn with_stream() -> (Self, UnboundedReceiverStream<ProgressEvent>) {
        let (sink, rx) = Self::new();
        (sink, UnboundedReceiverStream::new(rx))
    }
}

impl ProgressSink for ChannelSink {
    fn on_progress(&self, event: &ProgressEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!(
                session_id = %event.session_id,
                "progress receiver dropped, discarding event"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio_stream::StreamExt;

    fn event(progress: u8) -> ProgressEvent {
        ProgressEvent {
            session_id: SessionId::new(),
            progress,
            current_stage: "ContentCreator".to_string(),
            status: ProgressStatus::InProgress,
            message: Some("Generating lesson content...".to_string()),
            error: None,
        }
    }

    #[test]
    fn session_id_parses_its_display_form() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<SessionId>().is_err());
    }

    #[test]
    fn session_id_serializes_as_plain_uuid() {
        let uuid = Uuid::new_v4();
        let json = serde_json::to_string(&SessionId::from(uuid)).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }

    #[test]
    fn event_display_includes_stage_and_message() {
        let rendered = event(30).to_string();
        assert_eq!(
            rendered,
            "[ 30%] ContentCreator (in_progress): Generating lesson content..."
        );
    }

    #[test]
    fn event_json_omits_absent_error() {
        let json = serde_json::to_value(event(30)).unwrap();
        assert_eq!(json["status"], "in_progress");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn fn_sink_invokes_closure() {
        let seen = Mutex::new(Vec::new());
        let sink = FnSink::new(|e: &ProgressEvent| seen.lock().unwrap().push(e.progress));
        sink.on_progress(&event(5));
        sink.on_progress(&event(25));
        assert_eq!(*seen.lock().unwrap(), vec![5, 25]);
    }

    #[tokio::test]
    async fn channel_sink_streams_events_in_order() {
        let (sink, mut stream) = ChannelSink::with_stream();
        sink.on_progress(&event(5));
        sink.on_progress(&event(25));
        drop(sink);

        let mut progress = Vec::new();
        while let Some(e) = stream.next().await {
            progress.push(e.progress);
        }
        assert_eq!(progress, vec![5, 25]);
    }

    #[test]
    fn channel_sink_tolerates_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.on_progress(&event(5));
    }
}
