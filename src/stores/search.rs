//! Search session store
//!
//! Owns the current query, mode, filters, sort, pagination cursor, the current
//! result page, facets, recent searches and the selected result pointer.
//! Overlapping searches are not serialized: whichever completes last wins.

use std::sync::{Arc, Mutex};

use crate::clients::SearchBackend;
use crate::models::{
    Pagination, SearchFacets, SearchFilters, SearchMode, SearchQuery, SearchResultItem,
    SearchSuggestion, SortOptions, SuggestionKind,
};

use super::lock;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const RECENT_SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSessionState {
    pub query: String,
    pub mode: SearchMode,
    pub results: Vec<SearchResultItem>,
    pub total_count: u64,
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub is_loading: bool,
    pub error: Option<String>,
    pub suggestions: Vec<SearchSuggestion>,
    /// Distinct, most recent first
    pub recent_searches: Vec<String>,
    pub filters: Option<SearchFilters>,
    pub sort: Option<SortOptions>,
    pub facets: Option<SearchFacets>,
    pub selected_result_identifier: Option<String>,
}

impl SearchSessionState {
    pub fn new(page_size: u32) -> Self {
        Self {
            query: String::new(),
            mode: SearchMode::default(),
            results: Vec::new(),
            total_count: 0,
            current_page: 1,
            page_size: page_size.max(1),
            total_pages: 0,
            is_loading: false,
            error: None,
            suggestions: Vec::new(),
            recent_searches: Vec::new(),
            filters: None,
            sort: None,
            facets: None,
            selected_result_identifier: None,
        }
    }

    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    pub fn has_more_results(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn is_searching(&self) -> bool {
        self.is_loading
    }

    /// Selected result, if it is part of the current page
    pub fn resolved_selection(&self) -> Option<&SearchResultItem> {
        let id = self.selected_result_identifier.as_deref()?;
        self.results.iter().find(|r| r.identifier == id)
    }

    pub fn has_active_filters(&self) -> bool {
        self.filters.as_ref().map_or(false, SearchFilters::is_active)
    }

    pub fn result_count_label(&self) -> String {
        result_count_label(self.total_count)
    }
}

impl Default for SearchSessionState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// State transitions of the search session
#[derive(Debug, Clone, PartialEq)]
pub enum SearchMutation {
    SetQuery(String),
    SetMode(SearchMode),
    SetResults {
        results: Vec<SearchResultItem>,
        total_count: u64,
        total_pages: u32,
        current_page: u32,
    },
    SetFacets(Option<SearchFacets>),
    SetLoading(bool),
    SetError(Option<String>),
    SetSuggestions(Vec<SearchSuggestion>),
    AddRecentSearch(String),
    SetFilters(Option<SearchFilters>),
    SetSort(Option<SortOptions>),
    SetPage(u32),
    SetSelectedResult(Option<String>),
    ClearResults,
}

impl SearchMutation {
    fn apply(self, state: &mut SearchSessionState) {
        match self {
            SearchMutation::SetQuery(query) => state.query = query,
            SearchMutation::SetMode(mode) => state.mode = mode,
            SearchMutation::SetResults {
                results,
                total_count,
                total_pages,
                current_page,
            } => {
                state.results = results;
                state.total_count = total_count;
                state.total_pages = total_pages;
                state.current_page = current_page;
            }
            SearchMutation::SetFacets(facets) => state.facets = facets,
            SearchMutation::SetLoading(is_loading) => state.is_loading = is_loading,
            SearchMutation::SetError(error) => state.error = error,
            SearchMutation::SetSuggestions(suggestions) => state.suggestions = suggestions,
            SearchMutation::AddRecentSearch(query) => {
                if !state.recent_searches.contains(&query) {
                    state.recent_searches.insert(0, query);
                    state.recent_searches.truncate(RECENT_SEARCH_LIMIT);
                }
            }
            SearchMutation::SetFilters(filters) => state.filters = filters,
            SearchMutation::SetSort(sort) => state.sort = sort,
            SearchMutation::SetPage(page) => state.current_page = page.max(1),
            SearchMutation::SetSelectedResult(id) => state.selected_result_identifier = id,
            SearchMutation::ClearResults => {
                state.results.clear();
                state.total_count = 0;
                state.total_pages = 0;
                state.facets = None;
                state.error = None;
            }
        }
    }
}

pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    u32::try_from(total_count.div_ceil(page_size)).unwrap_or(u32::MAX)
}

/// "No results", "1 result", or a comma-grouped count such as "2,450 results".
pub fn result_count_label(total_count: u64) -> String {
    match total_count {
        0 => "No results".to_string(),
        1 => "1 result".to_string(),
        n => format!("{} results", group_thousands(n)),
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub struct SearchStore {
    state: Mutex<SearchSessionState>,
    backend: Arc<dyn SearchBackend>,
}

impl SearchStore {
    pub fn new(backend: Arc<dyn SearchBackend>, page_size: u32) -> Self {
        Self {
            state: Mutex::new(SearchSessionState::new(page_size)),
            backend,
        }
    }

    pub fn commit(&self, mutation: SearchMutation) {
        mutation.apply(&mut lock(&self.state));
    }

    pub fn snapshot(&self) -> SearchSessionState {
        lock(&self.state).clone()
    }

    /// Run a search for `query` at `page`, falling back to the session's
    /// current query and page. Failures land in `error`; prior results stay.
    pub async fn perform_search(&self, query: Option<&str>, page: Option<u32>) {
        self.commit(SearchMutation::SetLoading(true));
        self.commit(SearchMutation::SetError(None));

        let request = {
            let state = lock(&self.state);
            SearchQuery {
                text: query.map(str::to_string).unwrap_or_else(|| state.query.clone()),
                mode: state.mode,
                filters: state.filters.clone(),
                pagination: Pagination::new(page.unwrap_or(state.current_page), state.page_size),
                sort: state.sort,
            }
        };

        tracing::debug!(
            "search '{}' ({}) page {}",
            request.text,
            request.mode.as_str(),
            request.pagination.page
        );

        match self.backend.search(&request).await {
            Ok(page) => {
                let mut state = lock(&self.state);
                let total_pages = total_pages(page.total_count, state.page_size);
                SearchMutation::SetResults {
                    results: page.results,
                    total_count: page.total_count,
                    total_pages,
                    current_page: request.pagination.page,
                }
                .apply(&mut state);
                SearchMutation::SetFacets(page.facets).apply(&mut state);
                SearchMutation::SetQuery(request.text.clone()).apply(&mut state);
                if !request.text.is_empty() {
                    SearchMutation::AddRecentSearch(request.text).apply(&mut state);
                }
            }
            Err(e) => {
                tracing::warn!("Search failed: {}", e);
                self.commit(SearchMutation::SetError(Some(e.user_message())));
            }
        }

        self.commit(SearchMutation::SetLoading(false));
    }

    pub async fn go_to_page(&self, page: u32) {
        self.perform_search(None, Some(page)).await;
    }

    /// Advance to the next page when one exists.
    pub async fn load_more_results(&self) {
        let next = {
            let state = lock(&self.state);
            state.has_more_results().then(|| state.current_page + 1)
        };
        if let Some(page) = next {
            self.perform_search(None, Some(page)).await;
        }
    }

    pub async fn apply_filters(&self, filters: SearchFilters) {
        self.commit(SearchMutation::SetFilters(Some(filters)));
        self.perform_search(None, Some(1)).await;
    }

    pub async fn clear_filters(&self) {
        self.commit(SearchMutation::SetFilters(None));
        self.perform_search(None, Some(1)).await;
    }

    /// Suggestions drawn from recent searches sharing `prefix`.
    pub fn fetch_suggestions(&self, prefix: &str) -> Vec<SearchSuggestion> {
        let needle = prefix.trim().to_lowercase();
        let suggestions: Vec<SearchSuggestion> = {
            let state = lock(&self.state);
            state
                .recent_searches
                .iter()
                .filter(|q| !needle.is_empty() && q.to_lowercase().starts_with(&needle))
                .map(|q| SearchSuggestion {
                    text: q.clone(),
                    kind: SuggestionKind::Keyword,
                })
                .collect()
        };
        self.commit(SearchMutation::SetSuggestions(suggestions.clone()));
        suggestions
    }

    pub fn select_result(&self, identifier: &str) {
        self.commit(SearchMutation::SetSelectedResult(Some(identifier.to_string())));
    }

    pub fn set_query(&self, query: &str) {
        self.commit(SearchMutation::SetQuery(query.to_string()));
    }

    pub fn set_mode(&self, mode: SearchMode) {
        self.commit(SearchMutation::SetMode(mode));
    }

    pub fn set_sort(&self, sort: Option<SortOptions>) {
        self.commit(SearchMutation::SetSort(sort));
    }

    pub fn clear_results(&self) {
        self.commit(SearchMutation::ClearResults);
    }

    pub fn has_results(&self) -> bool {
        lock(&self.state).has_results()
    }

    pub fn has_more_results(&self) -> bool {
        lock(&self.state).has_more_results()
    }

    pub fn is_searching(&self) -> bool {
        lock(&self.state).is_searching()
    }

    pub fn resolved_selection(&self) -> Option<SearchResultItem> {
        lock(&self.state).resolved_selection().cloned()
    }

    pub fn has_active_filters(&self) -> bool {
        lock(&self.state).has_active_filters()
    }

    pub fn result_count_label(&self) -> String {
        lock(&self.state).result_count_label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchType, SearchPage};
    use crate::stores::test_support::FakeSearchBackend;

    fn item(id: &str) -> SearchResultItem {
        SearchResultItem {
            identifier: id.to_string(),
            title: format!("Dataset {}", id),
            description: String::new(),
            relevance_score: 0.8,
            match_type: MatchType::Semantic,
        }
    }

    fn page_of(ids: &[&str], total_count: u64) -> SearchPage {
        SearchPage {
            results: ids.iter().map(|id| item(id)).collect(),
            total_count,
            facets: None,
        }
    }

    #[test]
    fn test_result_count_label() {
        assert_eq!(result_count_label(0), "No results");
        assert_eq!(result_count_label(1), "1 result");
        assert_eq!(result_count_label(2), "2 results");
        assert_eq!(result_count_label(2450), "2,450 results");
        assert_eq!(result_count_label(1_234_567), "1,234,567 results");
        assert_eq!(result_count_label(999), "999 results");
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(95, 20), 5);
        assert_eq!(total_pages(100, 20), 5);
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 10), 1);
    }

    #[tokio::test]
    async fn test_perform_search_updates_pagination() {
        let backend = Arc::new(FakeSearchBackend::default());
        backend.push_search(Ok(page_of(&["a", "b"], 95)));
        let store = SearchStore::new(backend.clone(), 20);

        store.perform_search(Some("rainfall"), Some(2)).await;

        let state = store.snapshot();
        assert_eq!(state.total_count, 95);
        assert_eq!(state.total_pages, 5);
        assert_eq!(state.current_page, 2);
        assert_eq!(state.query, "rainfall");
        assert!(!state.is_loading);
        assert!(state.error.is_none());
        assert!(store.has_more_results());

        let sent = backend.search_requests();
        assert_eq!(sent[0].pagination.offset(), 20);
        assert_eq!(sent[0].pagination.limit(), 20);
    }

    #[tokio::test]
    async fn test_out_of_range_page_is_not_clamped() {
        let backend = Arc::new(FakeSearchBackend::default());
        backend.push_search(Ok(page_of(&[], 95)));
        let store = SearchStore::new(backend.clone(), 20);

        store.perform_search(Some("rainfall"), Some(6)).await;

        let state = store.snapshot();
        assert_eq!(state.current_page, 6);
        assert_eq!(state.total_pages, 5);
        assert!(!state.has_results());
        assert!(!state.has_more_results());
        assert_eq!(backend.search_requests()[0].pagination.offset(), 100);
    }

    #[tokio::test]
    async fn test_recent_searches_dedup_and_cap() {
        let backend = Arc::new(FakeSearchBackend::default());
        let store = SearchStore::new(backend.clone(), 10);

        for i in 1..=12 {
            backend.push_search(Ok(page_of(&["x"], 1)));
            store.perform_search(Some(format!("q{}", i).as_str()), Some(1)).await;
        }
        backend.push_search(Ok(page_of(&["x"], 1)));
        store.perform_search(Some("q12"), Some(1)).await;

        let expected: Vec<String> = (3..=12).rev().map(|i| format!("q{}", i)).collect();
        assert_eq!(store.snapshot().recent_searches, expected);
    }

    #[tokio::test]
    async fn test_empty_query_dispatched_but_not_recorded() {
        let backend = Arc::new(FakeSearchBackend::default());
        backend.push_search(Ok(page_of(&["a"], 1)));
        let store = SearchStore::new(backend.clone(), 10);

        store.perform_search(Some(""), None).await;

        assert_eq!(backend.search_requests().len(), 1);
        assert_eq!(backend.search_requests()[0].text, "");
        assert!(store.snapshot().recent_searches.is_empty());
        assert!(store.has_results());
    }

    #[tokio::test]
    async fn test_failure_preserves_stale_results() {
        let backend = Arc::new(FakeSearchBackend::default());
        backend.push_search(Ok(page_of(&["a", "b"], 2)));
        backend.push_search(Err(FakeSearchBackend::transport_error("search index offline")));
        let store = SearchStore::new(backend.clone(), 10);

        store.perform_search(Some("lakes"), Some(1)).await;
        store.perform_search(Some("rivers"), Some(1)).await;

        let state = store.snapshot();
        let ids: Vec<&str> = state.results.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(state.error.as_deref(), Some("search index offline"));
        assert!(!state.is_loading);
        assert_eq!(state.recent_searches, vec!["lakes".to_string()]);
    }

    #[tokio::test]
    async fn test_fallback_to_current_query_and_page() {
        let backend = Arc::new(FakeSearchBackend::default());
        let store = SearchStore::new(backend.clone(), 10);
        store.set_query("ozone");
        store.commit(SearchMutation::SetPage(3));
        backend.push_search(Ok(page_of(&["o"], 30)));

        store.perform_search(None, None).await;

        let sent = backend.search_requests();
        assert_eq!(sent[0].text, "ozone");
        assert_eq!(sent[0].pagination.page, 3);
    }

    #[tokio::test]
    async fn test_load_more_advances_page() {
        let backend = Arc::new(FakeSearchBackend::default());
        backend.push_search(Ok(page_of(&["a"], 25)));
        backend.push_search(Ok(page_of(&["b"], 25)));
        let store = SearchStore::new(backend.clone(), 10);

        store.perform_search(Some("snow"), Some(1)).await;
        store.load_more_results().await;

        let sent = backend.search_requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].text, "snow");
        assert_eq!(sent[1].pagination.page, 2);
        assert_eq!(store.snapshot().current_page, 2);

        store.commit(SearchMutation::SetPage(3));
        store.load_more_results().await;
        assert_eq!(backend.search_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_apply_filters_resets_to_first_page() {
        let backend = Arc::new(FakeSearchBackend::default());
        let store = SearchStore::new(backend.clone(), 10);
        store.set_query("soil");
        store.commit(SearchMutation::SetPage(4));
        backend.push_search(Ok(page_of(&["s"], 1)));

        store
            .apply_filters(SearchFilters {
                resource_types: vec!["dataset".to_string()],
                ..Default::default()
            })
            .await;

        assert!(store.has_active_filters());
        let sent = backend.search_requests();
        assert_eq!(sent[0].pagination.page, 1);
        assert!(sent[0].filters.as_ref().unwrap().is_active());

        backend.push_search(Ok(page_of(&["s"], 1)));
        store.clear_filters().await;
        assert!(!store.has_active_filters());
        assert!(backend.search_requests()[1].filters.is_none());
    }

    #[tokio::test]
    async fn test_selection_resolves_against_current_page() {
        let backend = Arc::new(FakeSearchBackend::default());
        backend.push_search(Ok(page_of(&["a", "b"], 2)));
        backend.push_search(Ok(page_of(&["c"], 1)));
        let store = SearchStore::new(backend.clone(), 10);

        store.perform_search(Some("x"), Some(1)).await;
        store.select_result("b");
        assert_eq!(store.resolved_selection().map(|r| r.identifier), Some("b".to_string()));

        store.perform_search(Some("y"), Some(1)).await;
        assert!(store.resolved_selection().is_none());
        assert_eq!(
            store.snapshot().selected_result_identifier.as_deref(),
            Some("b")
        );
    }

    #[tokio::test]
    async fn test_mode_and_sort_flow_into_request() {
        let backend = Arc::new(FakeSearchBackend::default());
        backend.push_search(Ok(page_of(&[], 0)));
        let store = SearchStore::new(backend.clone(), 10);
        store.set_mode(SearchMode::Keyword);
        store.set_sort(Some(SortOptions::default()));

        store.perform_search(Some("coral"), None).await;

        let sent = backend.search_requests();
        assert_eq!(sent[0].mode, SearchMode::Keyword);
        assert_eq!(sent[0].sort, Some(SortOptions::default()));
        assert_eq!(store.result_count_label(), "No results");
    }

    #[tokio::test]
    async fn test_fetch_suggestions_from_recent() {
        let backend = Arc::new(FakeSearchBackend::default());
        let store = SearchStore::new(backend.clone(), 10);
        for q in ["Rainfall UK", "river flow", "air quality"] {
            backend.push_search(Ok(page_of(&[], 0)));
            store.perform_search(Some(q), Some(1)).await;
        }

        let suggestions = store.fetch_suggestions("r");
        let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["river flow", "Rainfall UK"]);
        assert_eq!(store.snapshot().suggestions.len(), 2);
        assert!(store.fetch_suggestions("").is_empty());
    }

    #[test]
    fn test_clear_results() {
        let mut state = SearchSessionState::new(10);
        state.results = vec![item("a")];
        state.total_count = 1;
        state.total_pages = 1;
        state.error = Some("old".to_string());
        SearchMutation::ClearResults.apply(&mut state);
        assert!(state.results.is_empty());
        assert_eq!(state.total_pages, 0);
        assert!(state.error.is_none());
    }
}
