//! Handler trait and type erasure.
//!
//! A call handler is any async function of the shape
//!
//! ```text
//! async fn name(input: I, call: CallContext) -> Result<O, HandlerError>
//! ```
//!
//! where `I: DeserializeOwned` and `O: Serialize`. [`Callable`](crate::Callable)
//! is not generic over `I` and `O`, so the handler is stored behind a trait
//! object that knows how to decode its own input and encode its own output:
//!
//! ```text
//! async fn greet(input: Who, call: CallContext) -> …   ← user writes this
//!        ↓ Callable::new(greet)
//! greet.into_boxed_handler()                          ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(greet, PhantomData))             ← shared across requests
//!        ↓ handler.call(body, call) at request time
//! decode `data` into a fresh `Who`, then Box::pin(greet(who, call))
//! ```
//!
//! Each request deserializes into its own `I`; nothing mutable is shared
//! between concurrent calls.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::callable::CallContext;
use crate::envelope;
use crate::error::{CallError, HandlerError};

// ── Internal types ────────────────────────────────────────────────────────────

#[doc(hidden)]
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// What running the handler produced.
#[doc(hidden)]
pub enum Outcome {
    /// Encoded `{"data": …}` envelope.
    Success(Vec<u8>),
    /// The handler succeeded but its result would not serialize.
    EncodeFailed(serde_json::Error),
    Failed(HandlerError),
}

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    /// Decodes `body` synchronously; on success returns the pending invocation.
    fn call(&self, body: &[u8], call: CallContext) -> Result<BoxFuture<Outcome>, CallError>;
}

#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid call handler.
///
/// Sealed: satisfied automatically by any `Fn(I, CallContext) -> impl Future`
/// with the right output, never implemented by hand.
pub trait Handler<I, O>: private::Sealed<I, O> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed<I, O> {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, I, O> private::Sealed<I, O> for F
where
    F: Fn(I, CallContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
}

impl<F, Fut, I, O> Handler<I, O> for F
where
    F: Fn(I, CallContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self, PhantomData))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Holds a concrete handler `F` and remembers its input/output types.
///
/// `fn() -> (I, O)` keeps the wrapper `Send + Sync` whatever `I` and `O` are.
struct FnHandler<F, I, O>(F, PhantomData<fn() -> (I, O)>);

impl<F, Fut, I, O> ErasedHandler for FnHandler<F, I, O>
where
    F: Fn(I, CallContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    fn call(&self, body: &[u8], call: CallContext) -> Result<BoxFuture<Outcome>, CallError> {
        let input: I = envelope::decode_request(body)?;
        let fut = (self.0)(input, call);
        Ok(Box::pin(async move {
            match fut.await {
                Ok(result) => match envelope::encode_success(&result) {
                    Ok(bytes) => Outcome::Success(bytes),
                    Err(e) => Outcome::EncodeFailed(e),
                },
                Err(e) => Outcome::Failed(e),
            }
        }))
    }
}
