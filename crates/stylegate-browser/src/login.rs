//! Password-gate login for storefronts that hide behind a shared password

use crate::browser::BrowserSession;
use crate::error::{Result, StyleGateError};
use crate::text::{poll_until, POLL_INTERVAL};
use std::future::Future;
use std::time::Duration;
use stylegate_core::fail_open::fail_open;
use stylegate_core::LoginConfig;
use tracing::info;

/// How long the gate's login button gets to show up
const LOGIN_BUTTON_TIMEOUT: Duration = Duration::from_secs(5);
/// How long the password form gets to open after the click
const PASSWORD_INPUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Quote `text` as an XPath 1.0 string literal
///
/// XPath has no escape sequences, so text holding both quote kinds is
/// assembled with `concat()`.
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{}'", text);
    }
    if !text.contains('"') {
        return format!("\"{}\"", text);
    }

    let parts: Vec<String> = text
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";

/// XPath for the innermost elements whose text contains `text`, ignoring ASCII case
///
/// The whole descendant text is matched, so labels split by icons or nested
/// spans still count.
pub fn text_xpath(text: &str) -> String {
    let needle = xpath_literal(&text.trim().to_ascii_lowercase());
    let contains = format!(
        "contains(translate(normalize-space(.), '{}', '{}'), {})",
        UPPER, LOWER, needle
    );
    format!("//*[{} and not(*[{}])]", contains, contains)
}

/// CSS selector for the password input
pub fn password_input_selector(input_name: &str) -> String {
    format!(
        "input[name=\"{}\"]",
        input_name.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

/// Poll `probe` until it reports the element visible, failing after `timeout`
pub async fn wait_until_visible<F, Fut>(what: &str, timeout: Duration, probe: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let (visible, _) = poll_until(timeout, POLL_INTERVAL, probe).await?;
    if visible {
        Ok(())
    } else {
        Err(StyleGateError::Browser(format!(
            "{} did not become visible within {:?}",
            what, timeout
        )))
    }
}

/// Get past the password gate if the current page shows one
///
/// Returns `true` when a login was performed, `false` when no gate was shown.
pub async fn login_if_gated(session: &BrowserSession, login: &LoginConfig) -> Result<bool> {
    info!("Checking for password gate");

    let button = text_xpath(&login.button_text);
    if !session
        .click_visible_xpath(&button, LOGIN_BUTTON_TIMEOUT)
        .await?
    {
        info!("No password gate detected");
        return Ok(false);
    }

    info!("Password gate found, logging in");

    let input = password_input_selector(&login.password_input_name);
    let selector = input.as_str();
    wait_until_visible(selector, PASSWORD_INPUT_TIMEOUT, move || {
        session.is_element_visible(selector)
    })
    .await?;
    session.type_into(&input, &login.password).await?;

    // Submitting with Enter avoids overlays that intercept clicks on the submit button.
    session.press_key("Enter").await?;

    fail_open("post_login_navigation", || session.wait_until_navigated()).await;
    session.settle(login.post_login_settle_ms).await;

    info!("Login submitted");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xpath_literal_plain() {
        assert_eq!(xpath_literal("Login using password"), "'Login using password'");
    }

    #[test]
    fn test_xpath_literal_apostrophe() {
        assert_eq!(xpath_literal("Don't wait"), "\"Don't wait\"");
    }

    #[test]
    fn test_xpath_literal_both_quotes() {
        assert_eq!(
            xpath_literal(r#"It's "locked""#),
            r#"concat('It', "'", 's "locked"')"#
        );
    }

    #[test]
    fn test_text_xpath() {
        let contains = "contains(translate(normalize-space(.), \
            'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz'), \
            'login using password')";
        assert_eq!(
            text_xpath(" Login using password "),
            format!("//*[{} and not(*[{}])]", contains, contains)
        );
    }

    #[test]
    fn test_text_xpath_reads_whole_element_text() {
        // A leading icon leaves the first text node blank.
        let xpath = text_xpath("LOGIN Using Password");
        assert!(xpath.contains("normalize-space(.)"));
        assert!(!xpath.contains("text()"));
        assert!(xpath.contains("'login using password'"));
    }

    #[tokio::test]
    async fn test_wait_until_visible_waits_for_hidden_input() {
        let mut checks = 0;
        let result = wait_until_visible("input", Duration::from_secs(5), || {
            checks += 1;
            let visible = checks >= 2;
            async move { Ok::<_, StyleGateError>(visible) }
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(checks, 2);
    }

    #[tokio::test]
    async fn test_wait_until_visible_fails_when_never_shown() {
        let result = wait_until_visible(
            "input[name=\"password\"]",
            Duration::from_millis(20),
            || async { Ok::<_, StyleGateError>(false) },
        )
        .await;
        assert!(matches!(result, Err(StyleGateError::Browser(_))));
    }

    #[test]
    fn test_password_input_selector() {
        assert_eq!(password_input_selector("password"), "input[name=\"password\"]");
        assert_eq!(password_input_selector("pa\"ss"), "input[name=\"pa\\\"ss\"]");
    }
}
