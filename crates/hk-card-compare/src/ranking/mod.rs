//! Result-set ranking for comparison listings.
//!
//! Listings sort either by the default recommendation heuristic or by an
//! explicit numeric attribute, with a fixed tie-break chain behind both. The
//! comparator is a total order over sanitized values, so it composes with the
//! standard library's stable sort.

mod comparator;

use serde::Deserialize;

use crate::rewards::CardSnapshot;

/// Sort direction for explicit sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

/// Listing sort selection: an explicit numeric attribute, or the
/// recommendation heuristic when no field is named.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RankRequest {
    pub sort_field: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
}

impl RankRequest {
    /// The default recommendation ordering.
    pub fn recommended() -> Self {
        Self::default()
    }

    pub fn by_field(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            sort_field: Some(field.into()),
            order,
        }
    }
}

/// Rank cards for display. The sort is stable: cards that compare equal keep
/// their input order, and a card lacking the requested attribute entirely
/// still appears, sorted as if its value were 0.
pub fn rank(mut cards: Vec<CardSnapshot>, request: &RankRequest) -> Vec<CardSnapshot> {
    cards.sort_by(|a, b| comparator::compare(a, b, request));
    cards
}
