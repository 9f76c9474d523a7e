//! stylegate CLI - style guide and text checks for live pages
//!
//! Usage:
//!   stylegate styles [--url <url>]...     Audit computed styles against the rule table
//!   stylegate text --url <url> --text <t> Check that a text block is visible
//!   stylegate rules                       Print the rule table in use
//!   stylegate init                        Write a default stylegate.toml

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use stylegate_browser::{
    run_style_audit, verify_text_visible, AuditSummary, BrowserConfig, BrowserSession,
};
use stylegate_core::config::CONFIG_FILE_NAME;
use stylegate_core::fail_open::fail_open_sync;
use stylegate_core::{AuditConfig, LoginConfig, RuleTableSource};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "stylegate")]
#[command(author, version, about = "Style guide conformance checks for live pages")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Audit config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit computed styles of visible text elements
    Styles {
        /// Page to audit (repeatable; replaces configured URLs)
        #[arg(short, long = "url", value_name = "URL")]
        urls: Vec<String>,

        /// Rule table JSON file (takes precedence over STYLE_EXPECTATIONS_*)
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// CSS selector for the elements to check
        #[arg(long)]
        selector: Option<String>,

        /// Password for a storefront password gate
        #[arg(long)]
        password: Option<String>,

        /// Write the full JSON report here
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Show the browser window
        #[arg(long)]
        headful: bool,
    },

    /// Check that an exact text block is visible on a page
    Text {
        /// Page to check
        #[arg(short, long)]
        url: String,

        /// Exact text to look for (whitespace is normalized)
        #[arg(short, long)]
        text: String,

        /// How long to keep looking
        #[arg(long, default_value = "60000")]
        timeout_ms: u64,
    },

    /// Print the resolved rule table as JSON
    Rules {
        /// Rule table JSON file (takes precedence over STYLE_EXPECTATIONS_*)
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Styles {
            urls,
            rules,
            selector,
            password,
            report,
            headful,
        } => {
            let overrides = StyleOverrides {
                urls,
                rules,
                selector,
                password,
                headful,
            };
            cmd_styles(&cli.config, overrides, report).await
        }
        Commands::Text {
            url,
            text,
            timeout_ms,
        } => cmd_text(url, text, timeout_ms).await,
        Commands::Rules { rules } => cmd_rules(&cli.config, rules),
        Commands::Init { force } => cmd_init(&cli.config, force),
    }
}

/// Command-line settings that take precedence over file and environment
struct StyleOverrides {
    urls: Vec<String>,
    rules: Option<PathBuf>,
    selector: Option<String>,
    password: Option<String>,
    headful: bool,
}

impl StyleOverrides {
    fn apply(self, config: &mut AuditConfig) {
        if !self.urls.is_empty() {
            config.target_urls = self.urls;
        }
        if let Some(path) = self.rules {
            config.rules_override = Some(RuleTableSource::File(path));
        }
        if let Some(selector) = self.selector {
            config.element_selector = selector;
        }
        if let Some(password) = self.password {
            match config.login.as_mut() {
                Some(login) => login.password = password,
                None => config.login = Some(LoginConfig::new(password)),
            }
        }
        if self.headful {
            config.browser.headless = false;
        }
    }
}

fn load_config(path: &Path) -> Result<AuditConfig> {
    let mut config = AuditConfig::load_or_default(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    config.apply_env();
    Ok(config)
}

async fn cmd_styles(
    config_path: &Path,
    overrides: StyleOverrides,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    overrides.apply(&mut config);
    config.validate()?;

    let (table, origin) = config.rule_source().load();
    info!(
        "Auditing {} page(s) with rules from {}",
        config.target_urls.len(),
        origin
    );

    let summary = run_style_audit(&config, &table, origin).await;
    print_summary(&summary)?;

    if let Some(path) = report_path {
        let json = summary.to_pretty_json()?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    if !summary.passed() {
        bail!(
            "Style validation failed on {} of {} page(s)",
            summary.failed_pages().count(),
            summary.pages.len()
        );
    }
    Ok(())
}

fn print_summary(summary: &AuditSummary) -> Result<()> {
    println!("Style Audit");
    println!("===========");
    println!("Rules: {}", summary.rules);

    for page in &summary.pages {
        println!();
        println!("{}", page.summary());
        if page.interrupted {
            println!(
                "  (browser closed early; {} of {} elements read)",
                page.checked, page.matched
            );
        }
        if !page.report.passed() {
            println!("{}", page.report.to_pretty_json()?);
        }
    }
    Ok(())
}

async fn cmd_text(url: String, text: String, timeout_ms: u64) -> Result<()> {
    let timeout = Duration::from_millis(timeout_ms);
    let config = BrowserConfig {
        timeout,
        ..Default::default()
    };
    let session = BrowserSession::launch_with_config(config).await?;

    info!("Navigating to {}...", url);
    session.navigate(&url).await?;

    let check = verify_text_visible(&session, &text, timeout).await?;
    session.close().await?;

    if !check.passed() {
        bail!("Expected text \"{}\" to be visible on {}", check.text, url);
    }
    println!("Text block is visible on {}", url);
    Ok(())
}

fn cmd_rules(config_path: &Path, rules: Option<PathBuf>) -> Result<()> {
    // A broken config file should not stop us from showing the rules.
    let mut config = fail_open_sync("load_config", || AuditConfig::load_or_default(config_path))
        .unwrap_or_default();
    if let Some(path) = rules {
        config.rules_override = Some(RuleTableSource::File(path));
    }

    let (table, origin) = config.rule_source().load();
    eprintln!("Rules from {}", origin);
    println!("{}", table.to_pretty_json()?);
    Ok(())
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    AuditConfig::write_default(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
