//! Common utilities and shared types for kisa.
//!
//! This crate provides foundational components used across the kisa crates:
//!
//! - **Configuration**: Client settings via [`Config`]
//! - **Error handling**: Unified error types via [`KisaError`] and [`KisaResult`]
//!
//! # Example
//!
//! ```no_run
//! use kisa_common::Config;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     let headers = config.default_headers()?;
//!     println!("{} ({} default headers)", config.server.url, headers.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;

pub use config::{Config, HttpConfig, Overrides, ServerConfig};
pub use error::{KisaError, KisaResult};
