//! # stylegate-core
//!
//! Style-guide conformance checks for rendered web pages.
//!
//! A [`StyleRuleTable`] says which computed values each tag may render with
//! (font family, size, weight, line height, color, style, transform, letter
//! spacing). The browser layer hands over one [`ElementStyleSnapshot`] per
//! visible text element, and the evaluator turns them into a
//! [`MismatchReport`]. An empty report is a pass.
//!
//! ## Example
//!
//! ```
//! use stylegate_core::{evaluate_page, ElementStyleSnapshot, StyleProperty, StyleRule, StyleRuleTable};
//!
//! let table = StyleRuleTable::new()
//!     .with_rule("h1", StyleRule::unconstrained().with(StyleProperty::FontSize, ["72px", "50px"]));
//!
//! let snapshots = vec![
//!     ElementStyleSnapshot::new("h1", "Built to win").with(StyleProperty::FontSize, "48px"),
//! ];
//!
//! let report = evaluate_page(&snapshots, &table);
//! assert_eq!(report.len(), 1);
//! assert_eq!(report.elements()[0].mismatches[0].found, "48px");
//! ```

pub mod config;
mod error;
pub mod evaluator;
pub mod fail_open;
pub mod rules;
mod types;

pub use config::{
    load_rule_table, AuditConfig, BrowserSettings, LoginConfig, RuleTableOrigin, RuleTableSource,
};
pub use error::{Result, StyleGateError};
pub use evaluator::{
    check_font_family, check_style_value, evaluate_element, evaluate_page, resolve_rule,
};
pub use rules::{StyleRule, StyleRuleTable, DEFAULT_RULE_KEY};
pub use types::*;
