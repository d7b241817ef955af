//! Server-Sent Events decoding.
//!
//! Turns a streamed response body into `event`/`data` pairs. Payloads are not
//! interpreted.

use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::{Stream, StreamExt};

use crate::transport::{StreamEvent, TransportError};

/// Event label used when a frame carries data but no `event:` field.
pub const DEFAULT_EVENT: &str = "message";

/// Decode a body stream into events, in arrival order.
///
/// `\n`, `\r\n` and bare `\r` line endings are accepted. Comment lines,
/// `id:` and `retry:` are consumed. A frame left unterminated when the body
/// ends is dropped.
pub fn decode<S, B, E>(body: S) -> impl Stream<Item = Result<StreamEvent, TransportError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<TransportError>,
{
    body.eventsource().map(|item| match item {
        Ok(event) => Ok(StreamEvent::from(event)),
        Err(EventStreamError::Transport(err)) => Err(err.into()),
        Err(EventStreamError::Utf8(err)) => Err(TransportError::Other(format!(
            "invalid UTF-8 in event stream: {err}"
        ))),
        Err(EventStreamError::Parser(err)) => Err(TransportError::Other(format!(
            "malformed event stream: {err:?}"
        ))),
    })
}

impl From<Event> for StreamEvent {
    fn from(event: Event) -> Self {
        let name = if event.event.is_empty() {
            DEFAULT_EVENT.to_string()
        } else {
            event.event
        };

        Self {
            event: name,
            data: event.data,
        }
    }
}
