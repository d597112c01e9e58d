use glide_cache::document::{PageDocument, Region};
use scraper::{Html, Selector};
use std::time::Instant;

/// Which regions of a fetched document get lifted into a [`PageDocument`].
#[derive(Debug, Clone)]
pub struct ExtractRules {
    pub main_selector: String,
    pub secondary_selectors: Vec<String>,
}

impl Default for ExtractRules {
    fn default() -> Self {
        Self {
            main_selector: "#MainContent".to_string(),
            secondary_selectors: vec![".breadcrumbs".to_string()],
        }
    }
}

/// Extract the swap-relevant regions from a full HTML response.
///
/// A region missing from the response — or an unparsable selector — yields
/// an empty string for that region, never an error: a page without
/// breadcrumbs is still a perfectly good page.
pub fn extract_document(rules: &ExtractRules, url: &str, html: &str) -> PageDocument {
    let document = Html::parse_document(html);

    let title = select_first_text(&document, "title");
    let head = select_first_html(&document, "head");
    let main = select_first_html(&document, &rules.main_selector);

    let secondary = rules
        .secondary_selectors
        .iter()
        .map(|selector| Region {
            selector: selector.clone(),
            html: select_first_html(&document, selector),
        })
        .collect();

    PageDocument {
        url: url.to_string(),
        title,
        head,
        main,
        secondary,
        fetched_at: Instant::now(),
    }
}

fn select_first_html(document: &Html, selector: &str) -> String {
    Selector::parse(selector)
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.inner_html())
        .unwrap_or_default()
}

fn select_first_text(document: &Html, selector: &str) -> String {
    Selector::parse(selector)
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}
