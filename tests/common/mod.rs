//! Test utilities and helper functions for the crawl-actor test suite

use crawl_actor::ActorConfig;
use std::path::Path;
use tempfile::TempDir;

/// Creates a temporary storage directory for test runs
#[allow(dead_code)]
pub fn create_storage_dir() -> TempDir {
    TempDir::new().expect("failed to create temp storage dir")
}

/// Builds a config with test-friendly timings (short grace delay, one retry)
#[allow(dead_code)]
pub fn test_config(storage_dir: &Path, start_url: &str) -> ActorConfig {
    ActorConfig::builder()
        .storage_dir(storage_dir)
        .start_url(start_url)
        .persist_delay_ms(100)
        .max_request_retries(1)
        .build()
        .expect("valid test config")
}

/// Creates a test HTML document linking to the given hrefs
#[allow(dead_code)]
pub fn page_html(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<li><a href="{href}">{href}</a></li>"#))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
</head>
<body>
    <h1>{title}</h1>
    <ul>{anchors}</ul>
</body>
</html>"#
    )
}
