// src/listing/search.rs

//! Accent- and case-insensitive free-text search.

use std::borrow::Cow;

use crate::models::{Hadatai, Maker};
use crate::utils::fold_text;

/// A record that exposes text fields for search.
pub trait Searchable {
    fn search_fields(&self) -> Vec<Cow<'_, str>>;
}

impl Searchable for Maker {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields: Vec<Cow<'_, str>> = vec![Cow::Borrowed(self.name.as_str())];
        let optional = [
            &self.alias,
            &self.notes,
            &self.price_range,
            &self.price_tier,
            &self.kind,
            &self.region,
            &self.size,
            &self.material,
        ];
        fields.extend(optional.into_iter().flatten().map(|s| Cow::Borrowed(s.as_str())));

        if let Some(details) = self.english_ordering.as_ref().and_then(|e| e.details()) {
            fields.push(Cow::Borrowed(details));
        }
        fields.extend(self.enabled_features().map(Cow::Borrowed));
        fields
    }
}

impl Searchable for Hadatai {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields: Vec<Cow<'_, str>> = vec![Cow::Borrowed(self.name.as_str())];
        fields.extend(
            [&self.region, &self.notes]
                .into_iter()
                .flatten()
                .map(|s| Cow::Borrowed(s.as_str())),
        );
        for example in &self.price_examples {
            fields.push(Cow::Borrowed(example.label.as_str()));
            fields.push(Cow::Owned(example.price.to_string()));
        }
        fields
    }
}

/// Records whose searchable fields contain the query, in input order.
///
/// A blank query matches everything.
pub fn search<'a, T: Searchable>(records: &'a [T], query: &str) -> Vec<&'a T> {
    let query = fold_text(query.trim());
    if query.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|record| {
            record
                .search_fields()
                .iter()
                .any(|field| fold_text(field).contains(&query))
        })
        .collect()
}
