//! Deferred values produced by the provisioning engine
//!
//! An [`Output`] is a cloneable handle to a value that is only known once the
//! engine has created (or previewed) a resource. Specs hold outputs rather than
//! resolved values so that assembling them never blocks. Every clone observes
//! the same result, including the same error.

use std::fmt;
use std::future::Future;

use futures::future::{self, BoxFuture, FutureExt, Shared};
use ummati_common::{Error, Result};

/// A shared, lazily resolved value
pub struct Output<T> {
    inner: Shared<BoxFuture<'static, Result<T>>>,
}

impl<T> Output<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wrap a future; it runs at most once no matter how many clones await it
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            inner: future.boxed().shared(),
        }
    }

    /// An output that is already resolved
    pub fn known(value: T) -> Self {
        Self::new(future::ready(Ok(value)))
    }

    /// An output that resolves to `error`
    pub fn failed(error: Error) -> Self {
        Self::new(future::ready(Err(error)))
    }

    /// Transform the resolved value with a fallible continuation
    ///
    /// Errors from this output skip `f` and pass through unchanged.
    pub fn apply<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        let source = self.inner.clone();
        Output::new(async move { f(source.await?) })
    }

    /// Transform the resolved value with an infallible function
    pub fn map<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.apply(move |value| Ok(f(value)))
    }

    /// Combine two outputs; the first error wins
    pub fn zip<U>(&self, other: &Output<U>) -> Output<(T, U)>
    where
        U: Clone + Send + Sync + 'static,
    {
        let (left, right) = (self.inner.clone(), other.inner.clone());
        Output::new(future::try_join(left, right))
    }

    /// Combine many outputs, preserving order
    pub fn all<I>(outputs: I) -> Output<Vec<T>>
    where
        I: IntoIterator<Item = Output<T>>,
    {
        let pending: Vec<_> = outputs.into_iter().map(|output| output.inner).collect();
        Output::new(future::try_join_all(pending))
    }

    /// Wait for the value
    pub async fn get(&self) -> Result<T> {
        self.inner.clone().await
    }

    /// The result if it has already been computed
    pub fn peek(&self) -> Option<Result<T>> {
        self.inner.peek().cloned()
    }
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output").finish_non_exhaustive()
    }
}

impl<T> From<T> for Output<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn from(value: T) -> Self {
        Self::known(value)
    }
}
