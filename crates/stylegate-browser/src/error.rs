//! Browser error types - re-exports the unified StyleGateError from stylegate-core
//!
//! Browser failures map onto these variants:
//! - Browser(String) - launch, CDP and script evaluation failures
//! - CollaboratorUnavailable(String) - the browser or tab is gone; stop reading the page
//! - Navigation { url, reason } - the page under audit could not be loaded
//!
//! Error messages should name the operation that failed.

pub use stylegate_core::{Result, StyleGateError};

pub type BrowserError = StyleGateError;
