//! Text visibility checks

use crate::browser::BrowserSession;
use crate::error::{Result, StyleGateError};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Interval between visibility probes
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Outcome of a text visibility check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCheck {
    /// Whitespace-normalized text that was searched for
    pub text: String,
    pub visible: bool,
    /// Number of probes made before giving up or succeeding
    pub attempts: u32,
}

impl TextCheck {
    pub fn passed(&self) -> bool {
        self.visible
    }
}

/// Collapse runs of whitespace to single spaces and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Script returning `true` when some visible element's whole text equals `needle`
fn exact_text_script(needle: &str) -> Result<String> {
    let literal = serde_json::to_string(needle)?;
    Ok(format!(
        r#"(() => {{
    const needle = {};
    const normalize = s => (s || '').replace(/\s+/g, ' ').trim();
    const visible = el => typeof el.checkVisibility === 'function'
        ? el.checkVisibility()
        : el.getClientRects().length > 0;
    if (!document.body) {{ return false; }}
    for (const el of document.body.querySelectorAll('*')) {{
        if (normalize(el.textContent) === needle && visible(el)) {{
            return true;
        }}
    }}
    return false;
}})()"#,
        literal
    ))
}

/// Probe until `probe` reports success or `timeout` runs out
///
/// Always probes at least once. Returns whether it succeeded and how many
/// probes were made.
pub async fn poll_until<F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<(bool, u32)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = Instant::now() + timeout;
    let mut attempts = 0;

    loop {
        attempts += 1;
        if probe().await? {
            return Ok((true, attempts));
        }
        if Instant::now() + interval > deadline {
            return Ok((false, attempts));
        }
        tokio::time::sleep(interval).await;
    }
}

/// Check that `text` is visible on the current page as an element's exact text
///
/// Matching is case-sensitive on whitespace-normalized text, and retried
/// until `timeout` so late-rendered content is found.
pub async fn verify_text_visible(
    session: &BrowserSession,
    text: &str,
    timeout: Duration,
) -> Result<TextCheck> {
    let needle = normalize_whitespace(text);
    debug!("Verifying visible text: '{}'", needle);

    let script = exact_text_script(&needle)?;
    let script = script.as_str();
    let (visible, attempts) = poll_until(timeout, POLL_INTERVAL, move || async move {
        let found = session.evaluate_script(script).await?;
        Ok::<bool, StyleGateError>(found.as_bool().unwrap_or(false))
    })
    .await?;

    if visible {
        info!("Text verification passed after {} probe(s)", attempts);
    } else {
        info!(
            "Text verification failed: '{}' not visible within {:?}",
            needle, timeout
        );
    }

    Ok(TextCheck {
        text: needle,
        visible,
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(
            normalize_whitespace("  deep,\n immersive   bass\t"),
            "deep, immersive bass"
        );
    }

    #[test]
    fn test_script_escapes_text() {
        let script = exact_text_script(r#"If you're seeking "tight" bass"#).unwrap();
        assert!(script.contains(r#"const needle = "If you're seeking \"tight\" bass";"#));
    }

    #[tokio::test]
    async fn test_poll_until_immediate_success() {
        let (ok, attempts) = poll_until(
            Duration::from_millis(100),
            Duration::from_millis(10),
            || async { Ok::<_, StyleGateError>(true) },
        )
        .await
        .unwrap();
        assert!(ok);
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn test_poll_until_eventual_success() {
        let mut calls = 0;
        let (ok, attempts) = poll_until(Duration::from_secs(5), Duration::from_millis(1), || {
            calls += 1;
            let ready = calls >= 3;
            async move { Ok::<_, StyleGateError>(ready) }
        })
        .await
        .unwrap();
        assert!(ok);
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn test_poll_until_timeout() {
        let (ok, attempts) = poll_until(
            Duration::from_millis(30),
            Duration::from_millis(10),
            || async { Ok::<_, StyleGateError>(false) },
        )
        .await
        .unwrap();
        assert!(!ok);
        assert!(attempts >= 1);
    }

    #[tokio::test]
    async fn test_poll_until_propagates_errors() {
        let result = poll_until(Duration::from_millis(30), Duration::from_millis(10), || async {
            Err::<bool, _>(StyleGateError::CollaboratorUnavailable("gone".to_string()))
        })
        .await;
        assert!(matches!(result, Err(StyleGateError::CollaboratorUnavailable(_))));
    }
}
