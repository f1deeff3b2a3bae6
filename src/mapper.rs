//! Result mapper
//!
//! Translates backend wire shapes into the client's canonical models. The AI
//! service answers in snake_case, the Data API in camelCase; nothing outside
//! this module sees either raw shape.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DiscoveryResult;
use crate::models::{
    AgentReply, DatasetDetail, DatasetMetadata, MatchType, SearchFacets, SearchFilters,
    SearchMode, SearchPage, SearchQuery, SearchResultItem, SortOptions,
};

/// Body of `POST /search/semantic`
#[derive(Debug, Serialize)]
pub struct SemanticSearchRequest<'a> {
    pub query: &'a str,
    pub limit: u32,
    pub offset: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<&'a SearchFilters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOptions>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireSearchResponse {
    #[serde(default)]
    pub results: Vec<WireSearchHit>,
    pub total_count: Option<u64>,
    pub facets: Option<SearchFacets>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireSearchHit {
    pub identifier: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireAgentResponse {
    #[serde(default)]
    pub answer: String,
    pub suggested_query: Option<String>,
    #[serde(default)]
    pub related_identifiers: Vec<String>,
}

/// Compose the semantic search body. Semantic mode is the endpoint's
/// default and is not sent; inactive filters are omitted.
pub fn semantic_search_request(query: &SearchQuery) -> SemanticSearchRequest<'_> {
    SemanticSearchRequest {
        query: &query.text,
        limit: query.pagination.limit(),
        offset: query.pagination.offset(),
        search_type: match query.mode {
            SearchMode::Semantic => None,
            other => Some(other.as_str()),
        },
        filters: query.filters.as_ref().filter(|f| f.is_active()),
        sort: query.sort,
    }
}

pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

fn match_type_for(mode: SearchMode, query: &str, title: &str) -> MatchType {
    let exact = !query.trim().is_empty() && title.trim().eq_ignore_ascii_case(query.trim());
    match (mode, exact) {
        (_, true) => MatchType::Exact,
        (SearchMode::Keyword, false) => MatchType::Partial,
        (_, false) => MatchType::Semantic,
    }
}

/// Normalize a semantic search response into one result page.
///
/// Hits without an identifier are dropped, repeated identifiers keep their
/// first occurrence, and the page never exceeds the requested limit.
pub fn map_semantic_results(response: WireSearchResponse, query: &SearchQuery) -> SearchPage {
    let returned = response.results.len() as u64;
    let mut seen = HashSet::new();

    let results: Vec<SearchResultItem> = response
        .results
        .into_iter()
        .filter_map(|hit| {
            let identifier = hit.identifier.map(|id| id.trim().to_string())?;
            if identifier.is_empty() || !seen.insert(identifier.clone()) {
                return None;
            }
            let title = hit.title.unwrap_or_default();
            Some(SearchResultItem {
                match_type: match_type_for(query.mode, &query.text, &title),
                identifier,
                title,
                description: hit.description.unwrap_or_default(),
                relevance_score: clamp_score(hit.score.unwrap_or(0.0)),
            })
        })
        .take(query.pagination.page_size as usize)
        .collect();

    SearchPage {
        results,
        total_count: response.total_count.unwrap_or(returned),
        facets: response.facets.filter(|f| !f.is_empty()),
    }
}

/// Normalize a keyword search response. The Data API returns every match at
/// once, so the requested page is cut locally.
pub fn map_keyword_results(records: Vec<DatasetMetadata>, query: &SearchQuery) -> SearchPage {
    let mut seen = HashSet::new();
    let matches: Vec<SearchResultItem> = records
        .into_iter()
        .filter(|record| {
            let id = record.file_identifier.trim();
            !id.is_empty() && seen.insert(id.to_string())
        })
        .map(|record| {
            let title = record.title.unwrap_or_default();
            let match_type = match_type_for(SearchMode::Keyword, &query.text, &title);
            SearchResultItem {
                identifier: record.file_identifier.trim().to_string(),
                relevance_score: if match_type == MatchType::Exact { 1.0 } else { 0.5 },
                match_type,
                title,
                description: record.description.unwrap_or_default(),
            }
        })
        .collect();

    let total_count = matches.len() as u64;
    let offset = usize::try_from(query.pagination.offset()).unwrap_or(usize::MAX);
    let results = matches
        .into_iter()
        .skip(offset)
        .take(query.pagination.page_size as usize)
        .collect();

    SearchPage {
        results,
        total_count,
        facets: None,
    }
}

pub fn map_agent_response(response: WireAgentResponse) -> AgentReply {
    AgentReply {
        answer: response.answer,
        suggested_query: response
            .suggested_query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty()),
        related_identifiers: response
            .related_identifiers
            .into_iter()
            .filter(|id| !id.trim().is_empty())
            .collect(),
    }
}

/// `null` or an empty object means the dataset does not exist.
pub fn map_dataset_details(value: Value) -> DiscoveryResult<Option<DatasetDetail>> {
    match &value {
        Value::Null => Ok(None),
        Value::Object(map) if map.is_empty() => Ok(None),
        _ => Ok(Some(serde_json::from_value(value)?)),
    }
}

/// Pull a human-readable message out of an error body.
///
/// Accepts a bare JSON string, an object carrying `message`, `error`,
/// `detail` or `title`, or plain text.
pub fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(s)) => Some(s).filter(|s| !s.trim().is_empty()),
        Ok(Value::Object(map)) => ["message", "error", "detail", "title"]
            .iter()
            .find_map(|key| match map.get(*key) {
                Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
                _ => None,
            })
            .or_else(|| Some(trimmed.to_string())),
        _ => Some(trimmed.to_string()),
    }
}
