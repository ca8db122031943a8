//! Command-line surface.

use std::path::PathBuf;

use clap::Parser;
use cookiescope_config::Overrides;
use cookiescope_types::Separator;

#[derive(Debug, Parser)]
#[command(
    name = "cookiescope",
    version,
    about = "Audit sites for tracking cookies scoped to the institution-wide domain"
)]
pub struct Cli {
    /// Site list: one host or URL per line; blank lines and `#` comments are skipped.
    #[arg(short = 'i', long, value_name = "FILE")]
    pub sites: Option<PathBuf>,

    /// CSV report path.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Seconds to wait after each page load before reading cookies.
    #[arg(long, value_name = "SECONDS")]
    pub delay: Option<u64>,

    /// Navigation timeout in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Show the browser window.
    #[arg(long)]
    pub headful: bool,

    /// Skip the cookie-cleanup verification page.
    #[arg(long)]
    pub no_verify: bool,

    /// Separator for multi-value cells: newline, comma or pipe.
    #[arg(long, value_name = "SEP")]
    pub separator: Option<Separator>,

    /// Force colored console output.
    #[arg(long, overrides_with = "no_color")]
    pub color: bool,

    /// Disable colored console output.
    #[arg(long, overrides_with = "color")]
    pub no_color: bool,

    /// Number of concurrent browser workers (minimum 1).
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Config file (default: ~/.cookiescope/config.toml when present).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Flags that were actually given, for layering over the config file.
    pub fn overrides(&self) -> Overrides {
        let color = if self.no_color {
            Some(false)
        } else if self.color {
            Some(true)
        } else {
            None
        };
        Overrides {
            sites: self.sites.clone(),
            output: self.output.clone(),
            delay_seconds: self.delay,
            timeout_seconds: self.timeout,
            headless: self.headful.then_some(false),
            verify: self.no_verify.then_some(false),
            separator: self.separator,
            color,
            workers: self.workers,
        }
    }
}
