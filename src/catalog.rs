//! Facet filtering and sorting for the storefront club listing.
//!
//! The same [`ClubQuery`] type is parsed by the server from the query string
//! and produced by the client filter state, so both sides agree on the format:
//! `experience_type=tasting,workshop&sortBy=price-lowtohigh`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::db::catalog::Club;

/// Facets the club listing can be filtered on.
pub const CLUB_FACETS: &[&str] = &["experience_type", "location"];

pub const SORT_PARAM: &str = "sortBy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOption {
    #[default]
    #[serde(rename = "price-lowtohigh")]
    PriceLowToHigh,
    #[serde(rename = "price-hightolow")]
    PriceHighToLow,
    #[serde(rename = "title-atoz")]
    TitleAToZ,
    #[serde(rename = "title-ztoa")]
    TitleZToA,
}

impl SortOption {
    pub const ALL: [SortOption; 4] = [
        SortOption::PriceLowToHigh,
        SortOption::PriceHighToLow,
        SortOption::TitleAToZ,
        SortOption::TitleZToA,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::PriceLowToHigh => "price-lowtohigh",
            SortOption::PriceHighToLow => "price-hightolow",
            SortOption::TitleAToZ => "title-atoz",
            SortOption::TitleZToA => "title-ztoa",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_str() == s)
    }

    fn compare(&self, a: &Club, b: &Club) -> Ordering {
        match self {
            SortOption::PriceLowToHigh => a.price.total_cmp(&b.price),
            SortOption::PriceHighToLow => b.price.total_cmp(&a.price),
            SortOption::TitleAToZ => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortOption::TitleZToA => b.title.to_lowercase().cmp(&a.title.to_lowercase()),
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facet name → accepted values.
pub type FacetFilters = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClubQuery {
    pub filters: FacetFilters,
    pub sort: SortOption,
}

impl ClubQuery {
    /// Build from decoded query parameters. Unknown facets and sort keys are ignored.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let mut filters = FacetFilters::new();
        for facet in CLUB_FACETS {
            if let Some(raw) = params.get(*facet) {
                let values: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(String::from)
                    .collect();
                if !values.is_empty() {
                    filters.insert(facet.to_string(), values);
                }
            }
        }

        let sort = params
            .get(SORT_PARAM)
            .and_then(|s| SortOption::parse(s))
            .unwrap_or_default();

        Self { filters, sort }
    }

    /// Encode as a query string (no leading `?`). Facets in name order, sort last.
    pub fn to_query_string(&self) -> String {
        let mut parts: Vec<String> = self
            .filters
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(facet, values)| {
                format!(
                    "{}={}",
                    urlencoding::encode(facet),
                    urlencoding::encode(&values.join(","))
                )
            })
            .collect();
        parts.push(format!("{SORT_PARAM}={}", self.sort));
        parts.join("&")
    }

    pub fn matches(&self, club: &Club) -> bool {
        self.filters.iter().all(|(facet, values)| {
            values.is_empty()
                || club
                    .facet_value(facet)
                    .is_some_and(|v| values.iter().any(|wanted| wanted == v))
        })
    }

    /// Filter then sort a full listing.
    pub fn apply(&self, clubs: Vec<Club>) -> Vec<Club> {
        let mut selected: Vec<Club> = clubs.into_iter().filter(|c| self.matches(c)).collect();
        selected.sort_by(|a, b| self.sort.compare(a, b));
        selected
    }
}
