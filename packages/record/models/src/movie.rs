use serde::Serialize;

use crate::{FieldValue, Record, RecordKind};

/// Movie columns in canonical order.
pub const MOVIE_COLUMNS: &[&str] = &[
    "title",
    "director",
    "screenwriter",
    "distributor",
    "production_co",
    "rating",
    "genre",
    "original_language",
    "release_date",
    "box_office",
    "sound_mix",
    "aspect_ratio",
    "tomatometer",
    "audience_score",
];

/// A movie scraped from its detail page.
///
/// Apart from the two scores, detail fields are kept as the page prints
/// them (e.g. `"Mar 1, 2024, Wide"`, `"$82.5M"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movie {
    /// Title as published.
    pub title: String,
    /// Director(s).
    pub director: FieldValue<String>,
    /// Screenwriter(s).
    pub screenwriter: FieldValue<String>,
    /// Distributor.
    pub distributor: FieldValue<String>,
    /// Production company.
    pub production_co: FieldValue<String>,
    /// Age rating (e.g. `"PG-13 (Violence)"`).
    pub rating: FieldValue<String>,
    /// Genre list.
    pub genre: FieldValue<String>,
    /// Original language.
    pub original_language: FieldValue<String>,
    /// Theatrical release date text.
    pub release_date: FieldValue<String>,
    /// Gross USA box office text.
    pub box_office: FieldValue<String>,
    /// Sound mix.
    pub sound_mix: FieldValue<String>,
    /// Aspect ratio.
    pub aspect_ratio: FieldValue<String>,
    /// Critics score, 0–100.
    pub tomatometer: FieldValue<u8>,
    /// Audience score, 0–100.
    pub audience_score: FieldValue<u8>,
}

impl Record for Movie {
    const COLUMNS: &'static [&'static str] = MOVIE_COLUMNS;
    const KIND: RecordKind = RecordKind::Movie;

    fn identity(&self) -> &str {
        &self.title
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.director.to_string(),
            self.screenwriter.to_string(),
            self.distributor.to_string(),
            self.production_co.to_string(),
            self.rating.to_string(),
            self.genre.to_string(),
            self.original_language.to_string(),
            self.release_date.to_string(),
            self.box_office.to_string(),
            self.sound_mix.to_string(),
            self.aspect_ratio.to_string(),
            self.tomatometer.to_string(),
            self.audience_score.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_matches_column_table() {
        let movie = Movie {
            title: "Dune: Part Two".to_string(),
            director: FieldValue::Present("Denis Villeneuve".to_string()),
            screenwriter: FieldValue::Missing,
            distributor: FieldValue::Missing,
            production_co: FieldValue::Missing,
            rating: FieldValue::Present("PG-13".to_string()),
            genre: FieldValue::Missing,
            original_language: FieldValue::Missing,
            release_date: FieldValue::Missing,
            box_office: FieldValue::Present("$282.1M".to_string()),
            sound_mix: FieldValue::Missing,
            aspect_ratio: FieldValue::Missing,
            tomatometer: FieldValue::Present(92),
            audience_score: FieldValue::Missing,
        };

        let row = movie.to_row();
        assert_eq!(row.len(), MOVIE_COLUMNS.len());
        assert_eq!(row[0], "Dune: Part Two");
        assert_eq!(row[2], "N/A");
        assert_eq!(row[12], "92");
        assert_eq!(movie.identity(), "Dune: Part Two");
    }
}
