//! Minimal callable example: one greeting function behind the callable
//! protocol, with optional identity tokens.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example greeter
//!
//! Try:
//!   curl -i -X OPTIONS http://localhost:8080 -H 'origin: http://localhost'
//!   curl -i -X POST http://localhost:8080 \
//!        -H 'content-type: application/json' \
//!        -d '{"data":{"who":"World"}}'
//!   curl -i -X POST http://localhost:8080 \
//!        -H 'content-type: application/json' \
//!        -H 'authorization: Bearer demo-alice' \
//!        -d '{"data":{"who":"World"}}'
//!   curl -i -X POST http://localhost:8080 \
//!        -H 'content-type: application/json' \
//!        -d '{"data":{}}'

use std::time::Duration;

use async_trait::async_trait;
use callable::{CallContext, Callable, CallableConfig, HandlerError, IdentityVerifier, Server, call_error};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct Who {
    #[serde(default)]
    who: String,
}

#[derive(Serialize)]
struct Greeting {
    greeting: String,
}

async fn greet(input: Who, call: CallContext) -> Result<Greeting, HandlerError> {
    if input.who.is_empty() {
        return Err(call_error!(NotFound, "nobody to greet").into());
    }
    let greeting = match call.uid {
        Some(uid) => format!("Hello {}, signed in as {uid}!", input.who),
        None => format!("Hello {}!", input.who),
    };
    Ok(Greeting { greeting })
}

/// Accepts `demo-<name>` tokens. Stands in for a real ID-token verifier.
struct DemoTokens;

#[async_trait]
impl IdentityVerifier for DemoTokens {
    async fn verify(&self, token: &str) -> anyhow::Result<String> {
        match token.strip_prefix("demo-") {
            Some(uid) if !uid.is_empty() => Ok(uid.to_owned()),
            _ => anyhow::bail!("not a demo token"),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = CallableConfig::new()
        .auth(DemoTokens, false)
        .timeout(Duration::from_secs(10));

    Server::bind("0.0.0.0:8080")
        .serve(Callable::with_config(greet, config))
        .await
        .expect("server error");
}
