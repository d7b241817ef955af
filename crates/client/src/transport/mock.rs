//! In-memory transport for tests.
//!
//! Records every request and replays queued responses, stream events and
//! failures in order.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use super::{RawResponse, StreamEvent, Transport, TransportError};

/// HTTP method seen by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockMethod {
    Get,
    Post,
    Stream,
}

/// A request captured by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: MockMethod,
    pub path: String,
    pub body: Option<Value>,
}

/// Scripted [`Transport`] double.
///
/// REST calls pop the next queued result; with nothing queued they answer
/// `200 {}`. Streams deliver the configured events, then fail with the
/// configured stream error, if any.
#[derive(Debug, Default)]
pub struct MockTransport {
    requests: Mutex<Vec<RecordedRequest>>,
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    events: Vec<StreamEvent>,
    stream_error: Option<TransportError>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next REST call.
    #[must_use]
    pub fn with_response(self, status: u16, body: impl Into<String>) -> Self {
        self.push(Ok(RawResponse::new(status, body)));
        self
    }

    /// Queue a failure for the next REST call.
    #[must_use]
    pub fn with_error(self, error: TransportError) -> Self {
        self.push(Err(error));
        self
    }

    /// Events every stream delivers before ending.
    #[must_use]
    pub fn with_events<I>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = StreamEvent>,
    {
        self.events.extend(events);
        self
    }

    /// Failure every stream reports after delivering its events.
    #[must_use]
    pub fn with_stream_error(mut self, error: TransportError) -> Self {
        self.stream_error = Some(error);
        self
    }

    /// Every request seen so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests().pop()
    }

    fn push(&self, result: Result<RawResponse, TransportError>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(result);
    }

    fn record(&self, method: MockMethod, path: &str, body: Option<&Value>) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                method,
                path: path.to_string(),
                body: body.cloned(),
            });
    }

    fn next_response(&self) -> Result<RawResponse, TransportError> {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Ok(RawResponse::new(200, "{}")))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<RawResponse, TransportError> {
        self.record(MockMethod::Get, path, None);
        self.next_response()
    }

    async fn post(&self, path: &str, body: Option<&Value>) -> Result<RawResponse, TransportError> {
        self.record(MockMethod::Post, path, body);
        self.next_response()
    }

    async fn stream(
        &self,
        path: &str,
        on_event: &mut (dyn FnMut(StreamEvent) + Send),
    ) -> Result<(), TransportError> {
        self.record(MockMethod::Stream, path, None);

        for event in &self.events {
            on_event(event.clone());
        }

        match &self.stream_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
