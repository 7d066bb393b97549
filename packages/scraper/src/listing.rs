//! Listing pages: tiles that link to detail pages.

use fieldscrape_record::diagnostics::Diagnostics;
use reqwest::Url;
use scraper::Html;

use crate::FetchError;
use crate::layout::CompiledListing;

/// One tile on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// Absolute address of the detail page.
    pub url: String,
    /// Human-readable label; the sentinel if the tile has none.
    pub label: String,
}

/// Resolves `href` against `base`. Absolute links are returned unchanged.
///
/// # Errors
///
/// Returns [`FetchError::InvalidLink`] if `base` is not an absolute
/// address or the join fails.
pub fn absolute_link(base: &str, href: &str) -> Result<String, FetchError> {
    let invalid = || FetchError::InvalidLink {
        base: base.to_owned(),
        href: href.to_owned(),
    };

    Url::parse(base)
        .and_then(|base| base.join(href))
        .map(String::from)
        .map_err(|_| invalid())
}

/// Enumerates the tiles of a listing `document` fetched from `address`, in
/// document order.
///
/// Tiles without a link, or whose link cannot be resolved, are reported
/// and skipped. At most `limit` tiles are returned.
pub fn tiles(
    document: &Html,
    address: &str,
    listing: &CompiledListing,
    limit: Option<usize>,
    diagnostics: &dyn Diagnostics,
) -> Vec<Tile> {
    let base = listing.base_url.as_deref().unwrap_or(address);
    let mut found = Vec::new();

    for (position, tile) in document.select(&listing.tile).enumerate() {
        if limit.is_some_and(|limit| found.len() >= limit) {
            break;
        }

        let href = listing.link.extract(tile);
        if href.is_fallback() {
            diagnostics.warn(&format!("{address}: tile {} has no link", position + 1));
            continue;
        }

        match absolute_link(base, href.as_str()) {
            Ok(url) => {
                let label = listing
                    .label
                    .as_ref()
                    .map_or_else(|| url.clone(), |label| label.extract(tile).into_value());
                found.push(Tile { url, label });
            }
            Err(e) => diagnostics.warn(&format!("{address}: {e}")),
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use fieldscrape_record::diagnostics::MemoryDiagnostics;

    use super::*;
    use crate::layout::ListingLayout;

    const LISTING: &str = r#"
        <html><body>
          <div class="js-tile-link">
            <a href="/m/dune_part_two"><rt-img alt="Dune: Part Two"></rt-img></a>
          </div>
          <div class="js-tile-link">
            <a href="https://www.rottentomatoes.com/m/civil_war"><rt-img alt="Civil War"></rt-img></a>
          </div>
          <div class="js-tile-link"><span>Coming soon</span></div>
          <div class="js-tile-link">
            <a href="/m/kung_fu_panda_4"><rt-img alt="Kung Fu Panda 4"></rt-img></a>
          </div>
        </body></html>
    "#;

    fn listing() -> CompiledListing {
        let layout: ListingLayout = toml::from_str(
            r#"
            tile_selector = "div.js-tile-link"
            base_url = "https://www.rottentomatoes.com"
            link = { selector = "a", source = { attribute = "href" } }
            label = { selector = "rt-img", source = { attribute = "alt" } }
            "#,
        )
        .unwrap();
        layout.compile().unwrap()
    }

    #[test]
    fn resolves_relative_links_and_labels() {
        let diagnostics = MemoryDiagnostics::new();
        let found = tiles(
            &Html::parse_document(LISTING),
            "https://www.rottentomatoes.com/browse/movies_in_theaters",
            &listing(),
            None,
            &diagnostics,
        );

        assert_eq!(found.len(), 3);
        assert_eq!(found[0].url, "https://www.rottentomatoes.com/m/dune_part_two");
        assert_eq!(found[0].label, "Dune: Part Two");
        assert_eq!(found[1].url, "https://www.rottentomatoes.com/m/civil_war");
        assert_eq!(diagnostics.count(log::Level::Warn), 1);
    }

    #[test]
    fn limit_caps_the_number_of_tiles() {
        let found = tiles(
            &Html::parse_document(LISTING),
            "https://www.rottentomatoes.com/browse/movies_in_theaters",
            &listing(),
            Some(2),
            &MemoryDiagnostics::new(),
        );
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].label, "Civil War");
    }

    #[test]
    fn relative_base_is_rejected() {
        assert!(matches!(
            absolute_link("movies", "/m/x"),
            Err(FetchError::InvalidLink { .. })
        ));
    }
}
