//! # callable
//!
//! Serve one function over the callable JSON-over-HTTP convention.
//!
//! ## The contract
//!
//! A client `POST`s `{"data": …}` with `Content-Type: application/json`.
//! The handler gets the decoded `data` plus a [`CallContext`]; whatever it
//! returns goes back as `{"data": …}`, and whatever it fails with goes back as
//! `{"error": {"status": "NOT_FOUND", "message": "…"}}` under the HTTP code of
//! that [`StatusKind`]. Browsers get CORS preflight answers for free.
//!
//! What this crate leaves to others:
//!
//! - **Token cryptography**: plug an [`IdentityVerifier`] into the config
//! - **Routing**: one `Callable` is one endpoint
//! - **TLS and listening**: mount [`Callable::handle`] in your server, or use
//!   the small [`Server`] harness
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use callable::{call_error, CallContext, Callable, HandlerError, Server};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct Who { who: String }
//!
//! #[derive(Serialize)]
//! struct Greeting { greeting: String }
//!
//! async fn greet(input: Who, call: CallContext) -> Result<Greeting, HandlerError> {
//!     if input.who.is_empty() {
//!         return Err(call_error!(NotFound, "nobody to greet").into());
//!     }
//!     let from = call.uid.as_deref().unwrap_or("anonymous");
//!     Ok(Greeting { greeting: format!("Hello {}, from {from}!", input.who) })
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     Server::bind("0.0.0.0:8080").serve(Callable::new(greet)).await.unwrap();
//! }
//! ```

mod auth;
mod callable;
mod content;
mod error;
mod handler;
mod request;
mod response;
mod server;
mod status;

pub mod cors;
pub mod envelope;

pub use auth::{AuthConfig, IdentityVerifier};
pub use callable::{CallContext, Callable, CallableConfig, INSTANCE_ID_HEADER};
pub use content::validate as validate_content_type;
pub use error::{CallError, Error, HandlerError, classify};
pub use handler::Handler;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use server::Server;
pub use status::{StatusKind, status_of};
