//! Fail-open utilities for graceful degradation
//!
//! Use these for steps whose failure should not abort an audit: optional
//! configuration, settle waits after navigation, best-effort report output.
//!
//! DO NOT use fail-open for:
//! - Style evaluation (it cannot fail)
//! - Navigation to the page under audit
//! - The final pass/fail verdict

use std::future::Future;
use tracing::warn;

use crate::Result;

/// Execute an async operation that should fail open
///
/// Logs the error via `tracing::warn!` on failure and returns `None`.
///
/// # Usage
///
/// ```no_run
/// use stylegate_core::fail_open::fail_open;
/// use stylegate_core::Result;
///
/// async fn wait_for_network_idle() -> Result<()> {
///     Ok(())
/// }
///
/// async fn example() {
///     let settled = fail_open("network_idle", || wait_for_network_idle()).await;
///     // settled is None if the wait failed, otherwise Some(())
/// }
/// ```
pub async fn fail_open<F, Fut, T>(operation_name: &str, f: F) -> Option<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match f().await {
        Ok(val) => Some(val),
        Err(e) => {
            warn!("{} failed (fail-open): {}", operation_name, e);
            None
        }
    }
}

/// Blocking counterpart of [`fail_open`]
pub fn fail_open_sync<F, T>(operation_name: &str, f: F) -> Option<T>
where
    F: FnOnce() -> Result<T>,
{
    match f() {
        Ok(val) => Some(val),
        Err(e) => {
            warn!("{} failed (fail-open): {}", operation_name, e);
            None
        }
    }
}
