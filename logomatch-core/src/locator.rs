//! Logo candidate selection.
//!
//! Given a rendered page, pick the single best reference to the site's logo.
//! Heuristics are tried in priority order and each one scans the whole
//! document before the next is consulted:
//!
//! 1. `<img>` whose `alt`, `class` or `src` mentions "logo"
//! 2. inline `<svg>` whose `class` or `id` mentions "logo"
//! 3. `<meta property="og:image">`
//! 4. `<link rel="...icon...">`
//!
//! Within a tier the first element in document order wins.

use std::fmt;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

const LOGO_TOKEN: &str = "logo";

/// The reference chosen for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogoCandidate {
    /// An absolute URL to an image resource (may be a `data:` URL).
    Remote { url: Url },
    /// The logo is inline vector markup on `page`; there is no raster asset.
    InlineSvg { page: Url },
}

impl LogoCandidate {
    /// Whether the asset store can retrieve bytes for this candidate.
    pub fn is_fetchable(&self) -> bool {
        match self {
            Self::Remote { url } => matches!(url.scheme(), "http" | "https"),
            Self::InlineSvg { .. } => false,
        }
    }
}

impl fmt::Display for LogoCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote { url } => f.write_str(url.as_str()),
            Self::InlineSvg { page } => write!(f, "[inline SVG logo] {page}"),
        }
    }
}

/// Locate the logo candidate in `html`, resolving relative references
/// against `base_url` (or the document's own `<base href>` when present).
///
/// Never fails: an empty or malformed document simply yields `None`.
pub fn locate_logo(html: &str, base_url: &Url) -> Option<LogoCandidate> {
    if html.trim().is_empty() {
        return None;
    }

    let document = Html::parse_document(html);
    let base = document_base(&document, base_url);

    let candidate = find_logo_img(&document, &base)
        .or_else(|| find_logo_svg(&document, base_url))
        .or_else(|| find_og_image(&document, &base))
        .or_else(|| find_icon_link(&document, &base));

    match &candidate {
        Some(c) => debug!(page = %base_url, candidate = %c, "Located logo candidate"),
        None => debug!(page = %base_url, "No logo candidate"),
    }

    candidate
}

fn select<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn mentions_logo(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.to_lowercase().contains(LOGO_TOKEN))
}

fn resolve(base: &Url, reference: Option<&str>) -> Option<Url> {
    let reference = reference.map(str::trim).filter(|r| !r.is_empty())?;
    base.join(reference).ok()
}

fn document_base(document: &Html, base_url: &Url) -> Url {
    select(document, "base[href]")
        .first()
        .and_then(|el| resolve(base_url, el.value().attr("href")))
        .unwrap_or_else(|| base_url.clone())
}

fn find_logo_img(document: &Html, base: &Url) -> Option<LogoCandidate> {
    select(document, "img")
        .into_iter()
        .filter(|img| {
            let el = img.value();
            mentions_logo(el.attr("alt"))
                || mentions_logo(el.attr("class"))
                || mentions_logo(el.attr("src"))
        })
        .find_map(|img| resolve(base, img.value().attr("src")))
        .map(|url| LogoCandidate::Remote { url })
}

fn find_logo_svg(document: &Html, page: &Url) -> Option<LogoCandidate> {
    select(document, "svg")
        .into_iter()
        .any(|svg| {
            mentions_logo(svg.value().attr("class")) || mentions_logo(svg.value().attr("id"))
        })
        .then(|| LogoCandidate::InlineSvg { page: page.clone() })
}

fn find_og_image(document: &Html, base: &Url) -> Option<LogoCandidate> {
    select(document, r#"meta[property="og:image"]"#)
        .into_iter()
        .find_map(|meta| resolve(base, meta.value().attr("content")))
        .map(|url| LogoCandidate::Remote { url })
}

fn find_icon_link(document: &Html, base: &Url) -> Option<LogoCandidate> {
    select(document, "link[rel]")
        .into_iter()
        .filter(|link| {
            link.value()
                .attr("rel")
                .is_some_and(|rel| rel.to_lowercase().contains("icon"))
        })
        .find_map(|link| resolve(base, link.value().attr("href")))
        .map(|url| LogoCandidate::Remote { url })
}
