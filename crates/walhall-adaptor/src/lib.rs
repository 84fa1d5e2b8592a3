//! Walhall API adaptor - gateway over the Walhall Core API.
//!
//! The adaptor exposes a simplified REST surface (orgs, modules, refresh
//! status) to tooling that speaks in names rather than UUIDs. Every inbound
//! request is authenticated by decoding its bearer token, a fresh
//! [`walhall_api::WalhallClient`] is constructed for that identity, exactly
//! one client operation runs, and the result is reshaped to the public JSON
//! format. All heavy lifting — claims extraction, the dependent resolution
//! chain, per-request memoization, error mapping — lives in `walhall-api`;
//! this crate is routing, shaping, configuration, and process wiring.
//!
//! # Public surface
//!
//! ```text
//! GET  /orgs                              names of the caller's orgs
//! GET  /orgs/{org}/modules                modules with registry-qualified builds
//! POST /orgs/{org}/modules/refresh        trigger a module refresh
//! GET  /orgs/{org}/modules/refresh        poll the refresh status
//! GET  /healthz                           liveness
//! GET  /readyz                            readiness
//! ```

#![doc(html_root_url = "https://docs.rs/walhall-adaptor/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod routes;
pub mod server;

pub use api::{Gateway, ModuleBuild, ModuleResponse};
pub use config::{AdaptorConfig, AdaptorConfigBuilder};
pub use error::{AdaptorError, AdaptorResult, ErrorResponse};
pub use health::HealthChecker;
pub use routes::Route;
pub use server::AdaptorServer;

/// Adaptor version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
