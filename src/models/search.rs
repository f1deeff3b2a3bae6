//! Search query, filter and result models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a query is interpreted by the backends
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Keyword,
    #[default]
    Semantic,
    Conversational,
    Hybrid,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Keyword => "keyword",
            SearchMode::Semantic => "semantic",
            SearchMode::Conversational => "conversational",
            SearchMode::Hybrid => "hybrid",
        }
    }
}

impl std::str::FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keyword" => Ok(SearchMode::Keyword),
            "semantic" => Ok(SearchMode::Semantic),
            "conversational" => Ok(SearchMode::Conversational),
            "hybrid" => Ok(SearchMode::Hybrid),
            other => Err(format!("unknown search mode: {}", other)),
        }
    }
}

/// How a result matched the query
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Partial,
    Semantic,
    Fuzzy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DateRangeFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpatialFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub within_region: Option<String>,
}

impl SpatialFilter {
    pub fn is_empty(&self) -> bool {
        self.bounding_box.is_none()
            && self.within_region.as_deref().map_or(true, |r| r.trim().is_empty())
    }
}

/// Facet filters applied on top of the query text
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRangeFilter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topic_categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spatial_extent: Option<SpatialFilter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub organizations: Vec<String>,
}

impl SearchFilters {
    /// True if any facet narrows the result set.
    pub fn is_active(&self) -> bool {
        let date_active = self
            .date_range
            .as_ref()
            .map_or(false, |r| r.start_date.is_some() || r.end_date.is_some());
        let spatial_active = self.spatial_extent.as_ref().map_or(false, |s| !s.is_empty());

        date_active
            || spatial_active
            || !self.topic_categories.is_empty()
            || !self.keywords.is_empty()
            || !self.resource_types.is_empty()
            || !self.organizations.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Relevance,
    Title,
    Date,
    Popularity,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SortOptions {
    pub field: SortField,
    pub order: SortOrder,
}

/// 1-indexed page request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Zero-based offset of the first item on this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }
}

/// A fully composed search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    pub mode: SearchMode,
    pub filters: Option<SearchFilters>,
    pub pagination: Pagination,
    pub sort: Option<SortOptions>,
}

/// A single hit in the current result page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResultItem {
    pub identifier: String,
    pub title: String,
    pub description: String,
    /// Advisory relevance in `[0, 1]`
    pub relevance_score: f64,
    pub match_type: MatchType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetItem {
    pub value: String,
    pub count: u64,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchFacets {
    #[serde(default)]
    pub topic_categories: Vec<FacetItem>,
    #[serde(default)]
    pub resource_types: Vec<FacetItem>,
    #[serde(default)]
    pub organizations: Vec<FacetItem>,
    #[serde(default)]
    pub years: Vec<FacetItem>,
}

impl SearchFacets {
    pub fn is_empty(&self) -> bool {
        self.topic_categories.is_empty()
            && self.resource_types.is_empty()
            && self.organizations.is_empty()
            && self.years.is_empty()
    }
}

/// One page of normalized results as returned by a search backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub results: Vec<SearchResultItem>,
    pub total_count: u64,
    pub facets: Option<SearchFacets>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Keyword,
    Dataset,
    Topic,
    Organization,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchSuggestion {
    pub text: String,
    pub kind: SuggestionKind,
}
