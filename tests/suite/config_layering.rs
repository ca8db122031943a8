//! Config file + flags feeding a real run.

use std::sync::Arc;
use std::time::Duration;

use cookiescope_config::{CookiescopeConfig, Overrides, ResolvedConfig, VerificationPolicy};
use cookiescope_core::{Classifier, SuspectTable, read_site_list};
use cookiescope_engine::{AuditContext, AuditSettings, run_audit};
use cookiescope_types::{CookieRecord, Separator};
use tempfile::tempdir;

use crate::common::{FakeBrowser, parse_report, row_for, write_file};

const CONFIG: &str = r#"
[audit]
delay_seconds = 0
verify = false
separator = "pipe"
workers = 2

[scope]
root_domain = "example.edu"

[classifier]
literals = { piwik_session = "Matomo" }
prefixes = [{ prefix = "_pk_", label = "Matomo" }]
"#;

#[tokio::test]
async fn configured_scope_and_signatures_drive_the_report() {
    let dir = tempdir().unwrap();
    let config_path = write_file(dir.path(), "config.toml", CONFIG);
    let sites = write_file(dir.path(), "sites.txt", "www.example.edu\n");

    let file = CookiescopeConfig::load(Some(&config_path)).unwrap();
    let overrides = Overrides {
        sites: Some(sites),
        workers: Some(1),
        ..Overrides::default()
    };
    let config = ResolvedConfig::resolve_with_env(file.as_ref(), &overrides, None).unwrap();

    assert_eq!(config.workers, 1);
    assert_eq!(config.separator, Separator::Pipe);
    assert_eq!(config.settle_delay, Duration::ZERO);
    assert!(matches!(config.verification, VerificationPolicy::Disabled));

    let table = SuspectTable::builtin().with_extras(&config.extra_literals, &config.extra_prefixes);
    let ctx = AuditContext::new(
        Classifier::new(&config.root_domain, table),
        config.settle_delay,
        None,
    );

    let browser = Arc::new(FakeBrowser::new().with_site(
        "https://www.example.edu",
        vec![
            CookieRecord::new("_pk_id.1.a1b2", ".example.edu").with_size(27),
            CookieRecord::new("piwik_session", "example.edu").with_size(13),
            CookieRecord::new("_ga", ".umn.edu").with_size(20),
            CookieRecord::new("_pk_ses.1.a1b2", "www.example.edu").with_size(16),
        ],
    ));

    let (bytes, summary) = run_audit(
        read_site_list(&config.sites).unwrap(),
        browser,
        ctx,
        AuditSettings {
            workers: config.workers,
            separator: config.separator,
        },
        Vec::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.offending, 1);
    let rows = parse_report(&bytes);
    let row = row_for(&rows, "https://www.example.edu");
    assert_eq!(&row[2], "2");
    assert_eq!(&row[3], "_pk_id.1.a1b2|piwik_session");
    assert_eq!(&row[5], "40");
    assert_eq!(&row[6], "");
    assert!(row[8].contains("avoid setting cookies on .example.edu"));
}

#[test]
fn unknown_config_keys_are_rejected() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "config.toml", "[audit]\nthreads = 4\n");
    let err = CookiescopeConfig::load(Some(&path)).unwrap_err();
    assert_eq!(err.path(), Some(path.as_path()));
}

#[test]
fn explicit_config_path_must_exist() {
    let dir = tempdir().unwrap();
    assert!(CookiescopeConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
}
