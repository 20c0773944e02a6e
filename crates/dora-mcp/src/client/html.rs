//! Extraction of abstracts and PDF links from DORA object pages.
//!
//! Object pages carry the abstract in the page description meta tag and
//! link the full text through an anchor labelled [`PDF_LINK_LABEL`].

use scraper::{Html, Selector};
use url::Url;

/// Visible text of the full-text download link.
pub const PDF_LINK_LABEL: &str = "Download PDF";

const ABSTRACT_SELECTORS: [&str; 2] =
    [r#"meta[name="description"]"#, r#"meta[property="og:description"]"#];

/// Read the abstract from the description meta tags.
#[must_use]
pub fn extract_abstract(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    ABSTRACT_SELECTORS.iter().find_map(|selector| {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .filter_map(|meta| meta.value().attr("content"))
            .map(normalize_whitespace)
            .find(|content| !content.is_empty())
    })
}

/// Find the PDF link by its visible label and resolve it against the page URL.
#[must_use]
pub fn find_pdf_link(html: &str, page_url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").ok()?;

    let href = document.select(&selector).find_map(|anchor| {
        let text = normalize_whitespace(&anchor.text().collect::<String>());
        if text.eq_ignore_ascii_case(PDF_LINK_LABEL) {
            anchor.value().attr("href").map(str::trim).filter(|h| !h.is_empty())
        } else {
            None
        }
    })?;

    let base = Url::parse(page_url).ok()?;
    base.join(href).ok().map(String::from)
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
