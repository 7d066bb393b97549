use std::collections::BTreeSet;

use crate::Record;

/// An insertion-ordered, duplicate-tolerant set of records for one run.
///
/// Records can be appended and read but never modified in place. The sink
/// takes the collection by value.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<R> {
    records: Vec<R>,
}

impl<R> Collection<R> {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Appends a record.
    pub fn push(&mut self, record: R) {
        self.records.push(record);
    }

    /// Number of records held.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection holds no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    /// Records as a slice, in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[R] {
        &self.records
    }
}

impl<R: Record> Collection<R> {
    /// Distinct identities (locations or titles) present in the collection.
    #[must_use]
    pub fn identities(&self) -> BTreeSet<&str> {
        self.records.iter().map(Record::identity).collect()
    }
}

impl<R> Default for Collection<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> FromIterator<R> for Collection<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<R> Extend<R> for Collection<R> {
    fn extend<I: IntoIterator<Item = R>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl<R> IntoIterator for Collection<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a Collection<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldValue, Movie};

    fn movie(title: &str) -> Movie {
        Movie {
            title: title.to_string(),
            director: FieldValue::Missing,
            screenwriter: FieldValue::Missing,
            distributor: FieldValue::Missing,
            production_co: FieldValue::Missing,
            rating: FieldValue::Missing,
            genre: FieldValue::Missing,
            original_language: FieldValue::Missing,
            release_date: FieldValue::Missing,
            box_office: FieldValue::Missing,
            sound_mix: FieldValue::Missing,
            aspect_ratio: FieldValue::Missing,
            tomatometer: FieldValue::Missing,
            audience_score: FieldValue::Missing,
        }
    }

    #[test]
    fn keeps_insertion_order_and_duplicates() {
        let mut collection = Collection::new();
        collection.push(movie("Civil War"));
        collection.push(movie("Abigail"));
        collection.push(movie("Civil War"));

        let titles: Vec<&str> = collection.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Civil War", "Abigail", "Civil War"]);
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn identities_are_distinct_and_sorted() {
        let collection: Collection<Movie> =
            ["Civil War", "Abigail", "Civil War"].into_iter().map(movie).collect();
        let identities: Vec<&str> = collection.identities().into_iter().collect();
        assert_eq!(identities, vec!["Abigail", "Civil War"]);
    }
}
