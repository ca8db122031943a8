//! End-to-end runs over site-list files with an in-memory browser.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use cookiescope_browser::SessionFactory;
use cookiescope_core::{Classifier, read_site_list};
use cookiescope_engine::{AuditContext, AuditSettings, VerificationCheck, run_audit};
use cookiescope_types::{CookieRecord, Separator};
use tempfile::tempdir;

use crate::common::{
    FakeBrowser, VERIFICATION_MARKER, VERIFICATION_URL, parse_report, row_for, write_file,
};

fn verifying_context() -> AuditContext {
    AuditContext::new(
        Classifier::default(),
        Duration::ZERO,
        Some(VerificationCheck {
            url: VERIFICATION_URL.to_string(),
            marker: VERIFICATION_MARKER.to_string(),
        }),
    )
}

#[tokio::test]
async fn comment_and_blank_lines_are_skipped() {
    let dir = tempdir().unwrap();
    let sites = write_file(
        dir.path(),
        "sites.txt",
        "lib.umn.edu\n# comment\n\nother.umn.edu\n",
    );
    let tasks = read_site_list(&sites).unwrap();
    assert_eq!(tasks.len(), 2);

    let browser = Arc::new(
        FakeBrowser::new()
            .with_site(
                "https://lib.umn.edu",
                vec![
                    CookieRecord::new("_ga", ".umn.edu").with_size(20),
                    CookieRecord::new("sessionid", "lib.umn.edu").with_size(10),
                ],
            )
            .with_site("https://other.umn.edu", vec![]),
    );
    let (bytes, summary) = run_audit(
        tasks,
        browser,
        verifying_context(),
        AuditSettings::default(),
        Vec::new(),
    )
    .await
    .unwrap();

    let rows = parse_report(&bytes);
    assert_eq!(rows.len(), 2);
    assert_eq!(summary.offending, 1);
    assert_eq!(summary.ok, 1);

    let lib = row_for(&rows, "https://lib.umn.edu");
    assert_eq!(&lib[1], "yes");
    assert_eq!(&lib[2], "1");
    assert_eq!(&lib[3], "_ga");
    assert_eq!(&lib[4], "_ga:20");
    assert_eq!(&lib[5], "20");
    assert!(lib[8].contains("set cookie_domain to lib.umn.edu"));
    let blob: serde_json::Value = serde_json::from_str(&lib[9]).unwrap();
    assert_eq!(blob.as_array().unwrap().len(), 2);
    assert!(blob[0].get("expires").is_none());

    let other = row_for(&rows, "https://other.umn.edu");
    assert_eq!(&other[1], "no");
    assert_eq!(&other[8], "No action needed");
    assert_eq!(&other[6], "true");
    assert_eq!(&other[7], VERIFICATION_MARKER);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_workers_keep_rows_intact() {
    let k = 40;
    let mut browser = FakeBrowser::new().with_latency(Duration::from_millis(2));
    let mut lines = String::new();
    for i in 0..k {
        let host = format!("dept{i}.umn.edu");
        lines.push_str(&format!("{host}\n"));
        if i % 2 == 0 {
            lines.push_str("# spacer\n\n");
        }
        let cookies = if i % 4 == 0 {
            vec![
                CookieRecord::new("_clck", "umn.edu").with_size(30),
                CookieRecord::new("_uetvid", ".umn.edu").with_size(40),
                CookieRecord::new("pref", host.as_str()).with_value("a,b\n\"c\""),
            ]
        } else {
            vec![CookieRecord::new("pref", host.as_str()).with_value("x")]
        };
        browser = browser.with_site(&format!("https://{host}"), cookies);
    }
    let dir = tempdir().unwrap();
    let tasks = read_site_list(&write_file(dir.path(), "sites.txt", &lines)).unwrap();
    assert_eq!(tasks.len(), k);

    let browser = Arc::new(browser);
    let settings = AuditSettings {
        workers: 4,
        separator: Separator::Newline,
    };
    let (bytes, summary) = run_audit(
        tasks,
        Arc::clone(&browser) as Arc<dyn SessionFactory>,
        verifying_context(),
        settings,
        Vec::new(),
    )
    .await
    .unwrap();

    let rows = parse_report(&bytes);
    assert_eq!(rows.len(), k);
    let sites: HashSet<&str> = rows.iter().map(|row| row.get(0).unwrap()).collect();
    assert_eq!(sites.len(), k);
    assert_eq!(summary.offending, k / 4);

    let leaky = row_for(&rows, "https://dept0.umn.edu");
    assert_eq!(&leaky[3], "_clck\n_uetvid");
    assert_eq!(&leaky[4], "_clck:30\n_uetvid:40");
    assert!(leaky[8].starts_with("Scope cookies to subdomain dept0.umn.edu"));

    let workers: HashSet<_> = browser.visits().into_iter().map(|(w, _)| w).collect();
    assert!(workers.len() > 1, "expected work spread over several workers");
    assert!(browser.sessions_opened() <= 4);
    assert_eq!(browser.sessions_closed(), browser.sessions_opened());
}

#[tokio::test]
async fn one_unreachable_site_only_affects_its_own_row() {
    let browser = Arc::new(
        FakeBrowser::new()
            .with_site("https://a.umn.edu", vec![])
            .with_unreachable("https://down.umn.edu")
            .with_site("http://c.umn.edu", vec![]),
    );
    let dir = tempdir().unwrap();
    let sites = write_file(
        dir.path(),
        "sites.txt",
        "a.umn.edu\ndown.umn.edu\nhttp://c.umn.edu\n",
    );
    let (bytes, summary) = run_audit(
        read_site_list(&sites).unwrap(),
        browser,
        verifying_context(),
        AuditSettings {
            workers: 1,
            separator: Separator::Comma,
        },
        Vec::new(),
    )
    .await
    .unwrap();

    let rows = parse_report(&bytes);
    assert_eq!(rows.len(), 3);
    assert_eq!(summary.errors, 1);

    let down = row_for(&rows, "https://down.umn.edu");
    assert_eq!(&down[1], "error");
    assert_eq!(&down[5], "0");
    assert_eq!(&down[8], "");
    let blob: serde_json::Value = serde_json::from_str(&down[9]).unwrap();
    assert_eq!(blob["error"], "navigation");
    assert!(blob["message"].as_str().unwrap().contains("ERR_CONNECTION_REFUSED"));

    assert_eq!(&row_for(&rows, "https://a.umn.edu")[1], "no");
    assert_eq!(&row_for(&rows, "http://c.umn.edu")[1], "no");
}

#[tokio::test]
async fn verification_failure_keeps_page_excerpt() {
    let browser = Arc::new(
        FakeBrowser::new()
            .with_html(VERIFICATION_URL, "<p>2 cookies can be deleted</p>")
            .with_site("https://a.umn.edu", vec![CookieRecord::new("_gid", ".umn.edu")]),
    );
    let dir = tempdir().unwrap();
    let sites = write_file(dir.path(), "sites.txt", "a.umn.edu\n");
    let (bytes, _) = run_audit(
        read_site_list(&sites).unwrap(),
        browser,
        verifying_context(),
        AuditSettings::default(),
        Vec::new(),
    )
    .await
    .unwrap();

    let rows = parse_report(&bytes);
    assert_eq!(&rows[0][6], "false");
    assert_eq!(&rows[0][7], "<p>2 cookies can be deleted</p>");
    assert!(rows[0][8].starts_with("Update GA/gtag cookie scope"));
}
