//! Validator capability.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::value::FieldValue;

type CheckFn = Arc<dyn Fn(FieldValue) -> BoxFuture<'static, bool> + Send + Sync>;

/// A named check run against a field value.
///
/// Validators signal failure only by returning `false`. A validator that
/// panics is not caught and aborts the validation that ran it.
///
/// # Example
///
/// ```ignore
/// let even = Validator::new("even", |v| v.as_number().is_some_and(|n| n % 2.0 == 0.0));
/// let unique = Validator::from_async("unique", |v| async move { lookup(v).await.is_none() });
/// ```
#[derive(Clone)]
pub struct Validator {
    name: Option<String>,
    check: CheckFn,
}

impl Validator {
    /// Synchronous validator.
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&FieldValue) -> bool + Send + Sync + 'static,
    {
        Self {
            name: Some(name.into()),
            check: sync_check(f),
        }
    }

    /// Asynchronous validator.
    pub fn from_async<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(FieldValue) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self {
            name: Some(name.into()),
            check: Arc::new(move |value| Box::pin(f(value))),
        }
    }

    /// Synchronous validator without an identifier. Its failures are
    /// reported under the configured `validator_name`.
    pub fn unnamed<F>(f: F) -> Self
    where
        F: Fn(&FieldValue) -> bool + Send + Sync + 'static,
    {
        Self {
            name: None,
            check: sync_check(f),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Run the check.
    pub fn check(&self, value: FieldValue) -> BoxFuture<'static, bool> {
        (self.check)(value)
    }
}

fn sync_check<F>(f: F) -> CheckFn
where
    F: Fn(&FieldValue) -> bool + Send + Sync + 'static,
{
    Arc::new(move |value| {
        let ok = f(&value);
        Box::pin(async move { ok })
    })
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
