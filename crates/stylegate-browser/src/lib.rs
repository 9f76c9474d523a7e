//! Headless Chrome collaborator for stylegate style audits
//!
//! This crate drives a Chrome/Chromium browser over the Chrome DevTools
//! Protocol (CDP) and feeds what it reads into the `stylegate-core` evaluator.
//!
//! # Features
//!
//! - **Browser Management**: Launch and control Chrome/Chromium browsers
//! - **Password Gates**: Log in through a storefront's shared-password page
//! - **Element Snapshots**: Computed styles of visible text elements, read one by one
//! - **Text Checks**: Wait for an exact text block to become visible
//! - **Audits**: Per-URL style audits with structured mismatch reports
//!
//! # Example
//!
//! ```no_run
//! use stylegate_browser::audit::run_style_audit;
//! use stylegate_core::{AuditConfig, RuleTableSource};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AuditConfig::default();
//!     let (table, origin) = RuleTableSource::from_env().load();
//!
//!     let summary = run_style_audit(&config, &table, origin).await;
//!     for page in &summary.pages {
//!         println!("{}", page.summary());
//!     }
//! }
//! ```
//!
//! # Requirements
//!
//! - Chrome or Chromium browser installed
//!
//! # Architecture
//!
//! - [`browser`]: Browser lifecycle and session management
//! - [`login`]: Password-gate login flow
//! - [`snapshot`]: The [`ElementSource`] seam and its Chrome implementation
//! - [`text`]: Exact-text visibility checks
//! - [`audit`]: Page and multi-URL style audits
//! - [`error`]: Error types for browser operations

pub mod audit;
pub mod browser;
pub mod error;
pub mod login;
pub mod snapshot;
pub mod text;

// Re-export commonly used types
pub use audit::{audit_page, audit_url, run_style_audit, AuditSummary, PageAudit};
pub use browser::{BrowserConfig, BrowserSession};
pub use error::{BrowserError, Result};
pub use login::login_if_gated;
pub use snapshot::{ChromeElementSource, ElementSource, SnapshotBatch};
pub use text::{verify_text_visible, TextCheck};
