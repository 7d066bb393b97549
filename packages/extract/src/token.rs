//! Field extraction from already-split delimited text.

use fieldscrape_record_models::SENTINEL;

use crate::Extracted;

/// The value at `index` in `tokens`, trimmed.
///
/// An absent or blank token yields the sentinel.
#[must_use]
pub fn token_at<'a, I>(tokens: I, index: usize) -> Extracted
where
    I: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .nth(index)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map_or_else(
            || Extracted::Fallback(SENTINEL.to_string()),
            |token| Extracted::Found(token.to_string()),
        )
}

/// Every token, trimmed, with blanks replaced by the sentinel.
///
/// The token count is preserved so arity checks still see short and long
/// rows for what they are.
#[must_use]
pub fn all_tokens<'a, I>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .map(|token| token_at([token], 0).into_value())
        .collect()
}
