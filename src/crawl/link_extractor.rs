//! Link extraction and enqueue filtering
//!
//! Extraction parses the page once and resolves every `<a href>` against
//! the loaded URL. Filtering keeps the crawl on the host the page was
//! served from, http(s) only, with fragments stripped so the seen-set
//! doesn't treat `#section` anchors as distinct pages.

use scraper::{Html, Selector};
use url::Url;

/// Extract all resolvable `<a href>` targets from an HTML body
#[must_use]
pub fn extract_links(body: &str, base: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let document = Html::parse_document(body);
    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(mut resolved) = base.join(href) else {
            log::debug!("Skipping unresolvable href '{href}'");
            continue;
        };
        resolved.set_fragment(None);
        links.push(resolved);
    }
    links
}

/// Whether a discovered link should enter the pending-work list
///
/// Keeps the crawl on the same host as the page that produced the link,
/// matching the default scoping of the crawling stack this actor wraps.
#[must_use]
pub fn should_enqueue_url(url: &Url, base: &Url) -> bool {
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }

    let url_host = url.host_str().unwrap_or_default();
    let base_host = base.host_str().unwrap_or_default();
    if url_host.is_empty() || url_host != base_host {
        return false;
    }

    // Same port too: a dev server and its API on another port are
    // different crawl targets
    url.port_or_known_default() == base.port_or_known_default()
}
