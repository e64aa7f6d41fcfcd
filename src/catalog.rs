// src/catalog.rs
//
// Catalog lookups: fetch the item page for a lookup code and pull a set name
// out of it. Extraction is an ordered list of fallback rules; the first rule
// that yields a non-empty name wins.

use std::cell::Cell;
use std::thread;
use std::time::Duration;

use crate::config::consts::{
    CATALOG_HOST, CATALOG_PATH_TMPL, IMAGE_URL_TMPL, JITTER_MS,
};
use crate::core::html::{slice_between_ci, strip_tags, to_lower};
use crate::core::net;
use crate::core::sanitize::{decode_entities, normalize_ws};

/* ---------- URL builders ---------- */

pub fn catalog_path(code: &str) -> String {
    CATALOG_PATH_TMPL.replace("{code}", code)
}

pub fn catalog_url(code: &str) -> String {
    join!("https://", CATALOG_HOST, &catalog_path(code))
}

pub fn image_url(code: &str) -> String {
    IMAGE_URL_TMPL.replace("{code}", code)
}

/* ---------- name extraction ---------- */

/// Ordered fallback rules for pulling a set name out of the item page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameRule {
    /// Breadcrumb anchor whose href carries `catalogitem.page?S=<digits>-1`.
    BreadcrumbAnchor,
    /// `<title>` content up to the site-name suffix.
    PageTitle,
    /// First `<h1>` on the page.
    FirstHeading,
}

pub const NAME_RULES: [NameRule; 3] =
    [NameRule::BreadcrumbAnchor, NameRule::PageTitle, NameRule::FirstHeading];

const TITLE_SUFFIX: &str = " | BrickLink";

/// First rule that yields a non-empty name, entity-decoded and
/// whitespace-normalized. None when the page matches no rule.
pub fn extract_name(doc: &str) -> Option<String> {
    NAME_RULES.iter().find_map(|rule| apply_rule(*rule, doc))
}

fn apply_rule(rule: NameRule, doc: &str) -> Option<String> {
    let raw = match rule {
        NameRule::BreadcrumbAnchor => breadcrumb_name(doc)?,
        NameRule::PageTitle => title_name(doc)?,
        NameRule::FirstHeading => s!(slice_between_ci(doc, "<h1", "</h1>")?),
    };
    let name = normalize_ws(&decode_entities(&strip_tags(raw)));
    if name.is_empty() { None } else { Some(name) }
}

/// `<a ... href="...catalogitem.page?S=<digits>-1" ...>Name</a>`
fn breadcrumb_name(doc: &str) -> Option<String> {
    let lc = to_lower(doc);
    let needle = "catalogitem.page?s=";
    let mut from = 0usize;

    while let Some(p) = lc[from..].find(needle) {
        let digits_start = from + p + needle.len();
        let b = doc.as_bytes();
        let mut j = digits_start;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        if j > digits_start && doc[j..].starts_with("-1\"") {
            // end of the opening tag, then anchor text up to </a>
            if let Some(gt) = doc[j..].find('>') {
                let text_start = j + gt + 1;
                if let Some(end) = lc[text_start..].find("</a>") {
                    let inner = &doc[text_start..text_start + end];
                    if !inner.contains('<') && !inner.trim().is_empty() {
                        return Some(s!(inner));
                    }
                }
            }
        }
        from = digits_start;
    }
    None
}

fn title_name(doc: &str) -> Option<String> {
    let title = slice_between_ci(doc, "<title", "</title>")?;
    let cut = title.find(TITLE_SUFFIX)?;
    Some(s!(&title[..cut]))
}

/* ---------- lookup seam ---------- */

/// Where set names come from. The live source talks to the catalog site;
/// tests substitute a canned map.
pub trait NameSource {
    /// Resolve a lookup code to a set name. None means "no result",
    /// and the node stays as it was.
    fn set_name(&self, code: &str) -> Option<String>;
}

/// Live catalog lookups over HTTPS, with a politeness pause between
/// consecutive fetches. Errors are logged and swallowed: a failed lookup
/// is a missing name, never a failed enrichment pass.
pub struct CatalogSource {
    pause_ms: u64,
    fetched_once: Cell<bool>,
}

impl CatalogSource {
    pub fn new(pause_ms: u64) -> Self {
        Self { pause_ms, fetched_once: Cell::new(false) }
    }

    fn pace(&self, code: &str) {
        if self.fetched_once.replace(true) && self.pause_ms > 0 {
            let jitter = code.parse::<u64>().unwrap_or(0) % JITTER_MS;
            thread::sleep(Duration::from_millis(self.pause_ms + jitter)); // be polite
        }
    }
}

impl NameSource for CatalogSource {
    fn set_name(&self, code: &str) -> Option<String> {
        self.pace(code);
        match net::https_get(CATALOG_HOST, &catalog_path(code)) {
            Ok(body) => {
                let name = extract_name(&body);
                if name.is_none() {
                    loge!("no name rule matched for code {code}");
                }
                name
            }
            Err(e) => {
                loge!("catalog fetch failed for code {code}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BREADCRUMB_PAGE: &str = r#"
        <html><head><title>Catalog | BrickLink Reference</title></head>
        <body>
          <div id="breadcrumbs">
            <a href="/v2/catalog/catalogitem.page?S=10276-1" class="crumb">Colosseum</a>
          </div>
          <h1>Something else entirely</h1>
        </body></html>
    "#;

    #[test]
    fn breadcrumb_rule_wins_over_later_rules() {
        assert_eq!(extract_name(BREADCRUMB_PAGE).as_deref(), Some("Colosseum"));
    }

    #[test]
    fn title_rule_requires_site_suffix() {
        let page = "<title>Fire Temple | BrickLink</title>";
        assert_eq!(extract_name(page).as_deref(), Some("Fire Temple"));

        // no suffix, no other rule: nothing extracted
        let bare = "<title>Fire Temple</title>";
        assert_eq!(extract_name(bare), None);
    }

    #[test]
    fn heading_is_the_last_resort() {
        let page = "<html><body><h1 class=\"hd\">NASA Apollo Saturn V</h1></body></html>";
        assert_eq!(extract_name(page).as_deref(), Some("NASA Apollo Saturn V"));
    }

    #[test]
    fn names_are_entity_decoded_and_normalized() {
        let page = "<h1>Fish &amp; Chips\n  Stand</h1>";
        assert_eq!(extract_name(page).as_deref(), Some("Fish & Chips Stand"));
    }

    #[test]
    fn breadcrumb_requires_dash_one_suffix() {
        let page = r#"<a href="catalogitem.page?S=10276" class="x">Nope</a>
                      <title>Real Name | BrickLink</title>"#;
        assert_eq!(extract_name(page).as_deref(), Some("Real Name"));
    }

    #[test]
    fn nothing_matches_empty_or_alien_pages() {
        assert_eq!(extract_name(""), None);
        assert_eq!(extract_name("<html><body><p>404</p></body></html>"), None);
    }

    #[test]
    fn url_builders_substitute_the_code() {
        assert_eq!(catalog_path("54321"), "/v2/catalog/catalogitem.page?S=54321");
        assert_eq!(
            catalog_url("54321"),
            "https://www.bricklink.com/v2/catalog/catalogitem.page?S=54321"
        );
        assert_eq!(
            image_url("54321"),
            "https://img.bricklink.com/ItemImage/SN/0/54321-1.png"
        );
    }
}
