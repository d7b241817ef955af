//! Client for Mastodon-compatible REST and streaming APIs.
//!
//! This crate provides:
//!
//! - **Client**: The [`Client`] facade for streams, timelines and status actions
//! - **Streaming**: Six feeds selected by [`StreamEndpoint`], delivered as [`StreamEvent`]s
//! - **Query parameters**: Allow-listed timeline filters via [`QueryParams`]
//! - **Transport**: The [`Transport`] seam and its `reqwest` implementation
//! - **SSE**: Event-stream decoding via [`sse::decode`]
//!
//! # Example
//!
//! ```no_run
//! use kisa::{Client, QueryParams};
//! use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
//!
//! async fn example() -> kisa::KisaResult<()> {
//!     let mut headers = HeaderMap::new();
//!     headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer token"));
//!     let client = Client::new("https://mastodon.example", headers)?;
//!
//!     let params = QueryParams::new().with("any", vec!["rust", "rustlang"]).with("limit", 5);
//!     let statuses = client.hashtag_timeline("#programming", &params).await?;
//!     println!("{statuses}");
//!
//!     client
//!         .public_local_stream(|event| println!("{}: {}", event.event, event.data))
//!         .await
//! }
//! ```

pub mod client;
pub mod endpoint;
pub mod query;
pub mod sse;
pub mod transport;
pub mod visibility;

pub use client::{Client, ClientBuilder};
pub use endpoint::StreamEndpoint;
pub use kisa_common::{Config, HttpConfig, KisaError, KisaResult};
pub use query::{ParamValue, QueryParams};
pub use transport::{RawResponse, ReqwestTransport, StreamEvent, Transport, TransportError};
pub use visibility::Visibility;
