//! cookiescope - audit sites for cookies leaking onto the root domain.
//!
//! ```text
//! args + config file -> ResolvedConfig -> site list -> run_audit -> CSV report
//! ```
//!
//! Per-site failures end up as error rows in the report. The process exits
//! non-zero only when the run itself cannot be trusted: bad configuration, an
//! unreadable site list, or a report that could not be written.

mod args;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cookiescope_browser::{ChromiumLauncher, LaunchOptions};
use cookiescope_config::{CookiescopeConfig, ResolvedConfig, VerificationPolicy};
use cookiescope_core::{Classifier, SuspectTable, read_site_list};
use cookiescope_engine::{AuditContext, AuditSettings, VerificationCheck, run_audit};

use crate::args::Cli;

fn init_tracing(color: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(color))
        .with(env_filter)
        .init();
}

fn build_classifier(config: &ResolvedConfig) -> Classifier {
    let table = SuspectTable::builtin().with_extras(&config.extra_literals, &config.extra_prefixes);
    Classifier::new(&config.root_domain, table)
}

fn verification_check(policy: &VerificationPolicy) -> Option<VerificationCheck> {
    match policy {
        VerificationPolicy::Disabled => None,
        VerificationPolicy::Enabled(target) => Some(VerificationCheck {
            url: target.url.to_string(),
            marker: target.marker.clone(),
        }),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let file = CookiescopeConfig::load(cli.config.as_deref()).context("failed to load config")?;
    let config =
        ResolvedConfig::resolve(file.as_ref(), &cli.overrides()).context("invalid configuration")?;

    init_tracing(config.color);

    let tasks = read_site_list(&config.sites)?;
    let output = File::create(&config.output)
        .with_context(|| format!("failed to create report {}", config.output.display()))?;

    let classifier = build_classifier(&config);
    tracing::debug!(
        root_domain = classifier.root_domain(),
        browser = %config.browser_executable.display(),
        workers = config.workers,
        "Configuration resolved"
    );

    let launcher = ChromiumLauncher::new(LaunchOptions {
        executable: config.browser_executable.clone(),
        headless: config.headless,
        navigation_timeout: config.navigation_timeout,
    });
    let ctx = AuditContext::new(
        classifier,
        config.settle_delay,
        verification_check(&config.verification),
    );
    let settings = AuditSettings {
        workers: config.workers,
        separator: config.separator,
    };

    let (mut writer, summary) = run_audit(
        tasks,
        Arc::new(launcher),
        ctx,
        settings,
        BufWriter::new(output),
    )
    .await
    .context("audit aborted; the report is incomplete")?;
    writer.flush().context("failed to flush report")?;

    tracing::info!(
        "Scan complete: {summary}. Results written to {}",
        config.output.display()
    );
    Ok(())
}
