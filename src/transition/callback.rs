//! Update callbacks and the `start` argument.

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures_util::FutureExt;
use futures_util::future::{self, LocalBoxFuture};

use crate::error::TransitionError;

/// Future produced by invoking an [`UpdateCallback`].
pub type CallbackFuture = LocalBoxFuture<'static, Result<(), TransitionError>>;

/// The caller's state mutation, invoked at most once.
///
/// Synchronous closures run to completion when invoked. Asynchronous
/// closures run up to their first suspension point when invoked and are
/// then driven by the event loop. Any `Err` becomes a
/// [`TransitionError::Callback`] carrying the error's display text, and so
/// does a panic, whether raised on invocation or while the future is polled.
pub struct UpdateCallback {
    invoke: Box<dyn FnOnce() -> CallbackFuture>,
}

impl std::fmt::Debug for UpdateCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateCallback").finish_non_exhaustive()
    }
}

impl UpdateCallback {
    /// Wraps a synchronous, fallible closure.
    pub fn new<F, E>(f: F) -> Self
    where
        F: FnOnce() -> Result<(), E> + 'static,
        E: Display,
    {
        Self {
            invoke: Box::new(move || {
                let result = f().map_err(|e| TransitionError::callback(e.to_string()));
                future::ready(result).boxed_local()
            }),
        }
    }

    /// Wraps an infallible synchronous closure.
    pub fn infallible<F>(f: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            invoke: Box::new(move || {
                f();
                future::ready(Ok(())).boxed_local()
            }),
        }
    }

    /// Wraps a closure returning a future.
    pub fn from_async<F, Fut, E>(f: F) -> Self
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = Result<(), E>> + 'static,
        E: Display,
    {
        Self {
            invoke: Box::new(move || {
                let pending = f();
                async move {
                    pending
                        .await
                        .map_err(|e| TransitionError::callback(e.to_string()))
                }
                .boxed_local()
            }),
        }
    }

    /// A callback that does nothing and succeeds.
    #[must_use]
    pub fn noop() -> Self {
        Self::infallible(|| {})
    }

    pub(crate) fn invoke(self) -> CallbackFuture {
        let invoke = self.invoke;
        match panic::catch_unwind(AssertUnwindSafe(invoke)) {
            Ok(pending) => AssertUnwindSafe(pending)
                .catch_unwind()
                .map(|result| {
                    result.unwrap_or_else(|payload| Err(panic_reason(payload.as_ref())))
                })
                .boxed_local(),
            Err(payload) => future::ready(Err(panic_reason(payload.as_ref()))).boxed_local(),
        }
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> TransitionError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_owned());
    TransitionError::callback(format!("panicked: {message}"))
}

/// Options form of the `start` argument.
#[derive(Debug, Default)]
pub struct StartOptions {
    /// The update callback, if any.
    pub update: Option<UpdateCallback>,
    /// Initial type tags, in order.
    pub types: Vec<String>,
}

impl StartOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the update callback.
    #[must_use]
    pub fn update(mut self, callback: UpdateCallback) -> Self {
        self.update = Some(callback);
        self
    }

    /// Sets the initial type tags.
    #[must_use]
    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }
}

/// Argument accepted by [`Coordinator::start`](crate::Coordinator::start).
///
/// Normalized once at entry by [`UpdateRequest::normalize`].
#[derive(Debug, Default)]
pub enum UpdateRequest {
    /// No callback and no types.
    #[default]
    None,
    /// A bare callback.
    Update(UpdateCallback),
    /// A callback (possibly absent) with type tags.
    UpdateWithTypes(Option<UpdateCallback>, Vec<String>),
}

impl UpdateRequest {
    /// Splits the request into a callback and its type tags.
    ///
    /// A missing callback becomes [`UpdateCallback::noop`].
    #[must_use]
    pub fn normalize(self) -> (UpdateCallback, Vec<String>) {
        match self {
            Self::None => (UpdateCallback::noop(), Vec::new()),
            Self::Update(callback) => (callback, Vec::new()),
            Self::UpdateWithTypes(callback, types) => {
                (callback.unwrap_or_else(UpdateCallback::noop), types)
            }
        }
    }
}

impl From<UpdateCallback> for UpdateRequest {
    fn from(callback: UpdateCallback) -> Self {
        Self::Update(callback)
    }
}

impl From<Option<UpdateCallback>> for UpdateRequest {
    fn from(callback: Option<UpdateCallback>) -> Self {
        callback.map_or(Self::None, Self::Update)
    }
}

impl From<StartOptions> for UpdateRequest {
    fn from(options: StartOptions) -> Self {
        Self::UpdateWithTypes(options.update, options.types)
    }
}

impl From<()> for UpdateRequest {
    fn from((): ()) -> Self {
        Self::None
    }
}
