// src/listing/sort.rs

//! Stable sorting by a named record field.
//!
//! Records without a value for the field are treated as greater than any
//! present value, and the direction reverses the whole ordering: missing
//! values come last when ascending and first when descending.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{EnglishOrdering, Hadatai, Maker};
use crate::utils::{extract_amount, fold_text};

/// A comparable field value.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl SortValue {
    fn text(value: &str) -> Self {
        Self::Text(value.to_string())
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
        }
    }

    /// Numbers compare numerically, text accent- and case-insensitively
    /// with the raw text as tie-break.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => fold_text(a)
                .cmp(&fold_text(b))
                .then_with(|| a.cmp(b)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// A record with named sortable fields. Field names follow the record's
/// serialized (camelCase) attribute names.
pub trait Sortable {
    fn sort_value(&self, field: &str) -> Option<SortValue>;
}

impl<T: Sortable + ?Sized> Sortable for &T {
    fn sort_value(&self, field: &str) -> Option<SortValue> {
        (**self).sort_value(field)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Field and direction for a sorted view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

fn compare_present_first(a: Option<&SortValue>, b: Option<&SortValue>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.compare(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A sorted view of the records. The input is left untouched.
pub fn sort_records<'a, T: Sortable>(records: &'a [T], config: &SortConfig) -> Vec<&'a T> {
    let mut keyed: Vec<(Option<SortValue>, &T)> = records
        .iter()
        .map(|record| (record.sort_value(&config.field), record))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = compare_present_first(a.as_ref(), b.as_ref());
        match config.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    keyed.into_iter().map(|(_, record)| record).collect()
}

fn text_field(value: &Option<String>) -> Option<SortValue> {
    value.as_deref().map(SortValue::text)
}

impl Sortable for Maker {
    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "name" => Some(SortValue::text(&self.name)),
            "alias" => text_field(&self.alias),
            "region" => text_field(&self.region),
            "status" => self.status.map(|s| SortValue::text(s.as_str())),
            "priceRange" => self
                .price_range
                .as_deref()
                .and_then(extract_amount)
                .map(SortValue::Number),
            "startingPrice" => self
                .starting_price
                .as_ref()
                .and_then(|p| p.amount())
                .map(SortValue::Number),
            "startingPriceUsd" => self.starting_price_usd.map(|v| SortValue::Number(v as f64)),
            "currency" => text_field(&self.currency),
            "priceTier" => text_field(&self.price_tier),
            "type" => text_field(&self.kind),
            "size" => text_field(&self.size),
            "material" => text_field(&self.material),
            "englishOrdering" => self.english_ordering.as_ref().map(|e| match e {
                EnglishOrdering::Supported(flag) => SortValue::Bool(*flag),
                EnglishOrdering::Details(text) => SortValue::text(text),
            }),
            "notes" => text_field(&self.notes),
            _ => None,
        }
    }
}

impl Sortable for Hadatai {
    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "name" => Some(SortValue::text(&self.name)),
            "region" => text_field(&self.region),
            "currency" => text_field(&self.currency),
            "notes" => text_field(&self.notes),
            "englishOrdering" => Some(SortValue::Bool(self.english_ordering)),
            _ => None,
        }
    }
}
