//! rbxweb - A client library for the Roblox web API.
//!
//! The crate wraps the Roblox REST endpoints behind typed service accessors
//! sharing a single authenticated session.
//!
//! # Overview
//!
//! Every request goes through a [`Client`], which:
//!
//! - resolves the service subdomain (`games.roblox.com`, `users.roblox.com`, ...)
//! - attaches the `.ROBLOSECURITY` session cookie and the `x-csrf-token` header
//! - keeps both up to date from the responses it receives
//! - retries once a request rejected because of an expired CSRF token
//! - turns failed responses into a typed [`Error`]
//!
//! The [`services`] module exposes one accessor per API on top of it,
//! grouped in [`Services`].
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use rbxweb::{Client, Services};
//!
//! # async fn example() -> rbxweb::Result<()> {
//! let client = Arc::new(Client::new()?);
//! client.set_security("_|WARNING:-DO-NOT-SHARE-THIS...");
//!
//! let services = Services::new(client);
//! let user = services.users.get_authenticated().await?;
//! println!("logged in as {}", user.name);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`client`] - HTTP transport, request descriptors and session handling
//! - [`config`] - Client settings and YAML configuration loading
//! - [`error`] - Error type and classification of failed responses
//! - [`path`] - Request path templates and query strings
//! - [`services`] - Endpoint accessors
//!
//! # Logging
//!
//! The crate logs through the [`log`] facade: one `info` record per
//! operation, `warn` when a request is retried with a new CSRF token and
//! `debug` for session changes. Values of the security cookie are never
//! logged.

pub mod client;
pub mod config;
pub mod error;
pub mod path;
pub mod services;
mod session;

#[cfg(test)]
mod testing;

pub use client::{Body, Client, Request};
pub use config::ClientConfig;
pub use error::{ApiError, Error, ErrorsResponse, Result, StatusError, classify};
pub use path::Query;
pub use services::Services;
pub use session::{COOKIE_SECURITY, HEADER_TOKEN};
