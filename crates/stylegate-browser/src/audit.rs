//! Style audits over one or more pages

use crate::browser::{BrowserConfig, BrowserSession};
use crate::error::Result;
use crate::login::login_if_gated;
use crate::snapshot::{ChromeElementSource, ElementSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stylegate_core::{evaluate_page, AuditConfig, MismatchReport, RuleTableOrigin, StyleRuleTable};
use tracing::{error, info, warn};

/// Result of auditing one page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageAudit {
    pub url: String,
    /// Elements handed to the evaluator
    pub checked: usize,
    /// Elements matched by the selector before filtering
    pub matched: usize,
    /// Reading stopped early because the browser went away
    pub interrupted: bool,
    /// A password gate was passed before auditing
    pub logged_in: bool,
    /// Set when the page could not be audited at all
    pub error: Option<String>,
    pub report: MismatchReport,
    pub audited_at: DateTime<Utc>,
}

impl PageAudit {
    /// A page that could not be loaded or read
    pub fn errored(url: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            url: url.into(),
            checked: 0,
            matched: 0,
            interrupted: false,
            logged_in: false,
            error: Some(error.to_string()),
            report: MismatchReport::new(),
            audited_at: Utc::now(),
        }
    }

    pub fn passed(&self) -> bool {
        self.error.is_none() && self.report.passed()
    }

    /// One-line verdict for logs and terminals
    pub fn summary(&self) -> String {
        if let Some(error) = &self.error {
            return format!("[{}] Audit failed: {}", self.url, error);
        }
        if self.report.passed() {
            format!(
                "[{}] Style validation passed ({} elements checked)",
                self.url, self.checked
            )
        } else {
            format!(
                "[{}] Style validation failed: {} of {} elements with mismatched styles",
                self.url,
                self.report.len(),
                self.checked
            )
        }
    }
}

/// Results for every page of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSummary {
    pub rules: RuleTableOrigin,
    pub pages: Vec<PageAudit>,
}

impl AuditSummary {
    pub fn passed(&self) -> bool {
        self.pages.iter().all(PageAudit::passed)
    }

    pub fn failed_pages(&self) -> impl Iterator<Item = &PageAudit> {
        self.pages.iter().filter(|p| !p.passed())
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Collect snapshots from `source` and evaluate them against `table`
pub async fn audit_page<S>(
    source: &S,
    url: &str,
    selector: &str,
    table: &StyleRuleTable,
) -> Result<PageAudit>
where
    S: ElementSource + ?Sized,
{
    let batch = source.collect_snapshots(selector).await?;
    if batch.interrupted {
        warn!(
            "[{}] Browser went away; evaluating the {} elements read so far",
            url,
            batch.checked()
        );
    }

    let report = evaluate_page(&batch.snapshots, table);
    info!(
        "[{}] Analyzed {} visible elements with text content",
        url,
        batch.checked()
    );

    Ok(PageAudit {
        url: url.to_string(),
        checked: batch.checked(),
        matched: batch.matched,
        interrupted: batch.interrupted,
        logged_in: false,
        error: None,
        report,
        audited_at: Utc::now(),
    })
}

/// Open `url` in a fresh browser, pass the password gate if configured, and audit it
pub async fn audit_url(
    config: &AuditConfig,
    table: &StyleRuleTable,
    url: &str,
) -> Result<PageAudit> {
    let browser_config = BrowserConfig::from_settings(
        &config.browser,
        Duration::from_millis(config.navigation_timeout_ms()),
    );
    let session = BrowserSession::launch_with_config(browser_config).await?;

    info!("[{}] Attempting to navigate...", url);
    session.navigate(url).await?;
    session.settle(config.settle_ms).await;

    let logged_in = match &config.login {
        Some(login) => login_if_gated(&session, login).await?,
        None => false,
    };
    session.ensure_alive().await?;

    let source = ChromeElementSource::new(&session);
    let mut audit = audit_page(&source, url, &config.element_selector, table).await?;
    audit.logged_in = logged_in;

    session.close().await?;
    Ok(audit)
}

/// Audit every configured URL in order
///
/// A page that fails to load is recorded as a failed page; the run continues
/// with the next URL.
pub async fn run_style_audit(
    config: &AuditConfig,
    table: &StyleRuleTable,
    rules: RuleTableOrigin,
) -> AuditSummary {
    let mut pages = Vec::with_capacity(config.target_urls.len());

    for url in &config.target_urls {
        let page = match audit_url(config, table, url).await {
            Ok(page) => page,
            Err(e) => {
                error!("[{}] {}", url, e);
                PageAudit::errored(url, e)
            }
        };
        info!("{}", page.summary());
        pages.push(page);
    }

    AuditSummary { rules, pages }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errored_page_fails() {
        let page = PageAudit::errored("https://example.com", "connection refused");
        assert!(!page.passed());
        assert_eq!(
            page.summary(),
            "[https://example.com] Audit failed: connection refused"
        );
    }

    #[test]
    fn test_summary_pass_and_fail() {
        let summary = AuditSummary {
            rules: RuleTableOrigin::Builtin,
            pages: vec![PageAudit::errored("https://a.example", "boom")],
        };
        assert!(!summary.passed());
        assert_eq!(summary.failed_pages().count(), 1);

        let empty = AuditSummary {
            rules: RuleTableOrigin::Builtin,
            pages: Vec::new(),
        };
        assert!(empty.passed());
    }
}
