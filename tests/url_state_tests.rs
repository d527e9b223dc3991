//! Tests for URL-mirrored view-state
//!
//! These tests verify that:
//! - Every slice survives an encode/decode round-trip
//! - Reloading a URL reproduces the view (including the search term)
//! - Back/forward navigation restores earlier views
//! - Parameters owned by the host application are left alone

#[macro_use]
mod collection_harness;

use collection_harness::*;
use folio::prelude::*;

fn article_codec() -> UrlCodec {
    UrlCodec::new(UrlConfig::default(), article_filters(), 10)
}

fn every_slice_populated() -> ViewState {
    let mut state = ViewState {
        pagination: PaginationState {
            page_index: 3,
            page_size: 25,
        },
        sorting: vec![ColumnSort::desc("publishedAt")],
        column_filters: vec![ColumnFilter::new("status", json!(["active", "draft"]))],
        global_filter: "release notes & fixes".to_string(),
        ..ViewState::default()
    };
    state.column_visibility.insert("views".to_string(), false);
    state.row_selection.insert("row/7?x=1".to_string(), true);
    state
}

// =============================================================================
// Codec round-trip
// =============================================================================

mod round_trip_tests {
    use super::*;

    #[test]
    fn test_every_slice_round_trips() {
        let codec = article_codec();
        let state = every_slice_populated();

        let query = codec.to_query(&state);
        assert_eq!(codec.from_query(&query), state);
    }

    #[test]
    fn test_round_trip_through_leading_question_mark() {
        let codec = article_codec();
        let state = every_slice_populated();
        let query = format!("?{}", codec.to_query(&state));
        assert_eq!(codec.from_query(&query), state);
    }

    #[test]
    fn test_pristine_state_is_empty_query() {
        assert_eq!(article_codec().to_query(&ViewState::with_page_size(10)), "");
    }

    #[test]
    fn test_non_persisted_slices_are_left_out() {
        // Visibility and selection may be kept out of shared links
        let codec = UrlCodec::new(
            UrlConfig {
                persist_visibility: false,
                persist_selection: false,
                ..UrlConfig::default()
            },
            article_filters(),
            10,
        );
        let state = every_slice_populated();
        let decoded = codec.from_query(&codec.to_query(&state));

        assert!(decoded.column_visibility.is_empty());
        assert!(decoded.row_selection.is_empty());
        assert_eq!(
            ViewState {
                column_visibility: state.column_visibility.clone(),
                row_selection: state.row_selection.clone(),
                ..decoded
            },
            state
        );
    }

    #[test]
    fn test_custom_param_names() {
        let codec = UrlCodec::new(
            UrlConfig {
                page_param: "p".to_string(),
                sort_param: "orderBy".to_string(),
                order_param: "dir".to_string(),
                ..UrlConfig::default()
            },
            article_filters(),
            10,
        );
        let mut state = ViewState::with_page_size(10);
        state.pagination.page_index = 1;
        state.sorting = vec![ColumnSort::asc("title")];

        assert_eq!(codec.to_query(&state), "p=2&orderBy=title&dir=asc");
        assert_eq!(codec.from_query("p=2&orderBy=title&dir=asc"), state);
    }

    #[test]
    fn test_scalar_facet_value_round_trips() {
        let codec = article_codec();
        let state = ViewState {
            column_filters: vec![ColumnFilter::new("status", json!("active"))],
            ..every_slice_populated()
        };

        assert_eq!(codec.from_query(&codec.to_query(&state)), state);
    }

    #[test]
    fn test_facet_request_unchanged_after_reload() {
        let adapter = QueryAdapter::new(article_filters());
        let codec = article_codec();
        for value in [json!("active"), json!(["active"]), json!([3, 4])] {
            let state = ViewState {
                column_filters: vec![ColumnFilter::new("status", value.clone())],
                ..ViewState::with_page_size(10)
            };
            let reloaded = codec.from_query(&codec.to_query(&state));
            let request = adapter.request_for(&reloaded, "");
            assert_eq!(request.filter("status"), Some(&value));
            assert_eq!(request.fingerprint(), adapter.request_for(&state, "").fingerprint());
        }
    }
}

// =============================================================================
// Store and controller in URL-mirrored mode
// =============================================================================

mod navigation_tests {
    use super::*;

    #[tokio::test]
    async fn test_shared_link_reproduces_view() {
        let fetcher = Arc::new(RecordingFetcher::new(article_source(articles(60))));
        let history = InMemoryHistory::with_query("?page=2&search=article&status=draft");
        let mut view: CollectionController<Article, _> = CollectionController::with_navigator(
            Arc::clone(&fetcher),
            article_config(10),
            EngineConfig::default(),
            history,
        )
        .unwrap()
        .with_binding(article_binding());

        assert_eq!(view.state().pagination.page_index, 1);
        assert_eq!(view.debounced_global_filter(), "article");

        view.sync().await.unwrap();
        let sent = fetcher.last().unwrap();
        assert_eq!(sent.offset, 10);
        assert_eq!(sent.filter("search"), Some(&json!("article")));
        assert_eq!(sent.filter("status"), Some(&json!(["draft"])));
        assert_eq!(view.total_count().unwrap(), 20);
    }

    #[tokio::test]
    async fn test_back_and_forward_restore_views() {
        let history = InMemoryHistory::new();
        let mut view: CollectionController<Article, _> = CollectionController::with_navigator(
            Arc::new(article_source(articles(60))),
            article_config(10),
            EngineConfig::default(),
            history.clone(),
        )
        .unwrap()
        .with_binding(article_binding());

        view.set_pagination(PaginationState {
            page_index: 2,
            page_size: 10,
        })
        .unwrap();
        assert_eq!(history.query(), "page=3");

        view.toolbar().unwrap().toggle_facet("status", "active").unwrap();
        assert_eq!(history.query(), "status=active");
        assert_eq!(view.state().pagination.page_index, 0);

        assert!(history.back());
        assert!(view.sync_from_navigator());
        assert_eq!(view.state().pagination.page_index, 2);
        assert!(view.state().column_filters.is_empty());

        assert!(history.forward());
        assert!(view.sync_from_navigator());
        assert_eq!(
            view.state().column_filters,
            vec![ColumnFilter::new("status", json!(["active"]))]
        );

        view.sync().await.unwrap();
        assert_eq!(view.total_count().unwrap(), 20);
    }

    #[tokio::test]
    async fn test_history_search_applies_without_debounce() {
        let history = InMemoryHistory::with_query("search=cat");
        let mut view: CollectionController<Article, _> = CollectionController::with_navigator(
            Arc::new(article_source(articles(3))),
            article_config(10),
            EngineConfig::default(),
            history.clone(),
        )
        .unwrap();

        view.set_pagination(PaginationState {
            page_index: 1,
            page_size: 10,
        })
        .unwrap();
        let mut other = history.clone();
        other.navigate("search=dog", HistoryMode::Push).unwrap();

        assert!(view.sync_from_navigator());
        assert_eq!(view.debounced_global_filter(), "dog");
        assert!(!view.is_debouncing());
    }

    #[test]
    fn test_typing_replaces_history_entry() {
        let history = InMemoryHistory::new();
        let mut store = ViewStateStore::url_mirrored(history.clone(), article_codec());

        store.set_pagination(PaginationState {
            page_index: 1,
            page_size: 10,
        })
        .unwrap();
        let entries = history.len();
        for text in ["r", "re", "rel"] {
            store.set_global_filter(text.to_string()).unwrap();
        }

        assert_eq!(history.len(), entries);
        assert_eq!(history.query(), "page=2&search=rel");
    }

    #[test]
    fn test_host_params_survive_state_changes() {
        let history = InMemoryHistory::with_query("tab=drafts");
        let mut store = ViewStateStore::url_mirrored(history.clone(), article_codec());

        store.set_sorting(vec![ColumnSort::asc("title")]).unwrap();
        assert_eq!(history.query(), "tab=drafts&sort=title&order=asc");
    }

    #[test]
    fn test_visibility_and_selection_are_mirrored() {
        let history = InMemoryHistory::new();
        let mut store = ViewStateStore::url_mirrored(history.clone(), article_codec());

        store
            .set_column_visibility(Updater::apply(|v: &VisibilityState| {
                let mut v = v.clone();
                v.insert("views".to_string(), false);
                v
            }))
            .unwrap();
        store
            .set_row_selection(Updater::apply(|s: &RowSelectionState| {
                let mut s = s.clone();
                s.insert("a1".to_string(), true);
                s
            }))
            .unwrap();

        assert_eq!(history.query(), "hidden=views&selected=a1");
        let reloaded = ViewStateStore::url_mirrored(InMemoryHistory::with_query(&history.query()), article_codec());
        assert_eq!(reloaded.state(), store.state());
    }

    #[tokio::test]
    async fn test_oversized_page_in_link_loads_first_page() {
        let fetcher = Arc::new(RecordingFetcher::new(article_source(articles(30))));
        let history = InMemoryHistory::with_query("page=18446744073709551615");
        let mut view: CollectionController<Article, _> = CollectionController::with_navigator(
            Arc::clone(&fetcher),
            article_config(10),
            EngineConfig::default(),
            history,
        )
        .unwrap()
        .with_binding(article_binding());

        assert_eq!(view.state().pagination.page_index, 0);
        assert_eq!(view.request().offset, 0);

        view.sync().await.unwrap();
        assert_eq!(fetcher.last().unwrap().offset, 0);
        assert_eq!(view.pagination().unwrap().page_label(), "Page 1 of 3");
    }

    #[tokio::test]
    async fn test_restored_filter_without_column_stays_inert() {
        let filters = article_filters()
            .with_faceted_filter(FacetedFilterConfig::new("category", "category", "Category"));
        let fetcher = Arc::new(RecordingFetcher::new(article_source(articles(20))));
        let history = InMemoryHistory::with_query("category=news&status=draft");
        let mut view: CollectionController<Article, _> = CollectionController::with_navigator(
            Arc::clone(&fetcher),
            CollectionConfig::new(filters).with_page_size(10),
            EngineConfig::default(),
            history.clone(),
        )
        .unwrap()
        .with_binding(article_binding());

        assert_eq!(view.state().column_filters.len(), 2);
        view.sync().await.unwrap();

        let sent = fetcher.last().unwrap();
        assert!(sent.filter("category").is_none());
        assert_eq!(sent.filter("status"), Some(&json!(["draft"])));
        // The link itself is left as the user shared it
        assert_eq!(history.query(), "category=news&status=draft");
    }
}
