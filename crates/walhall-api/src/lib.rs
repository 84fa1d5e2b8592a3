//! Client layer for the Walhall Core API.
//!
//! Walhall Core owns organizations, applications, environments, logic
//! modules, and configurations, and addresses all of them by UUID. Callers,
//! however, speak in names. This crate bridges the two: it decodes the
//! caller's identity from an inbound bearer token (without verifying the
//! signature — Core performs the authoritative authorization) and walks the
//! dependent lookup chain
//!
//! ```text
//! org name → org UUID → app UUID → environment → module version → configuration
//! ```
//!
//! one upstream call at a time, memoizing the intermediate listings for the
//! lifetime of the client (one inbound request).
//!
//! # Example
//!
//! ```rust,no_run
//! use walhall_api::{HttpTransport, WalhallClient};
//!
//! # async fn example(bearer_token: &str) -> walhall_api::ApiResult<()> {
//! let transport = HttpTransport::new("https://api.walhall.io")?;
//! let mut client = WalhallClient::new(bearer_token, transport)?;
//!
//! for (name, uuid) in client.list_orgs().await? {
//!     println!("{name}: {uuid}");
//! }
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/walhall-api/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod claims;
pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use cache::{CachedLookup, ResolutionCache};
pub use claims::Claims;
pub use client::WalhallClient;
pub use error::{ApiError, ApiResult, TransportError};
pub use transport::{HttpTransport, Transport, UpstreamRequest, UpstreamResponse};
pub use types::{Configuration, Environment, EnvironmentModuleVersion, Module, ModuleVersion};
