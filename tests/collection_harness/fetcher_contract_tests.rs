//! Macro-generated test suite for `CollectionFetcher<Article>` contract validation.
//!
//! The `fetcher_contract_tests!` macro generates a test module that checks
//! any article fetcher against the request contract: offset/limit as
//! zero-based skip/take, exact-match filters, absent keys imposing nothing,
//! single-key sort and the reported total count.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod collection_harness;
//!
//! use collection_harness::*;
//!
//! fetcher_contract_tests!(|rows| article_source(rows));
//! ```

/// Generate a `CollectionFetcher<Article>` conformance test suite.
///
/// `$factory` must be a closure taking `Vec<Article>` and returning a
/// fetcher serving exactly those rows, with `search` as a case-insensitive
/// title search. It is called once per test.
#[macro_export]
macro_rules! fetcher_contract_tests {
    ($factory:expr) => {
        mod fetcher_contract {
            use super::*;
            use folio::core::query::{RemoteQueryRequest, RemoteQueryResponse, SortDirection, SortSpec};
            use folio::core::service::{CollectionFetcher, FetchOptions};
            use serde_json::json;

            async fn fetch(rows: Vec<Article>, request: RemoteQueryRequest) -> RemoteQueryResponse<Article> {
                let fetcher = ($factory)(rows);
                CollectionFetcher::<Article>::fetch(&fetcher, &request, FetchOptions::default())
                    .await
                    .unwrap()
            }

            #[tokio::test]
            async fn test_first_page() {
                let response = fetch(articles(25), RemoteQueryRequest::first_page(10)).await;
                assert_eq!(response.count(), 25);
                let items = response.into_items();
                assert_eq!(items.len(), 10);
                assert_eq!(items[0].title, "Article 00");
            }

            #[tokio::test]
            async fn test_offset_is_zero_based_skip() {
                let mut request = RemoteQueryRequest::first_page(10);
                request.offset = 20;
                let response = fetch(articles(25), request).await;
                assert_eq!(response.count(), 25);
                assert_eq!(
                    titles(&response.into_items()),
                    vec!["Article 20", "Article 21", "Article 22", "Article 23", "Article 24"]
                );
            }

            #[tokio::test]
            async fn test_offset_past_end_is_empty() {
                let mut request = RemoteQueryRequest::first_page(10);
                request.offset = 100;
                let response = fetch(articles(25), request).await;
                assert_eq!(response.count(), 25);
                assert!(response.into_items().is_empty());
            }

            #[tokio::test]
            async fn test_exact_match_filter() {
                let mut request = RemoteQueryRequest::first_page(50);
                request.filters.insert("status".into(), json!("draft"));
                let response = fetch(articles(9), request).await;
                assert_eq!(response.count(), 3);
                assert!(response.into_items().iter().all(|a| a.status == "draft"));
            }

            #[tokio::test]
            async fn test_array_filter_any_of() {
                let mut request = RemoteQueryRequest::first_page(50);
                request.filters.insert("status".into(), json!(["draft", "archived"]));
                let response = fetch(articles(9), request).await;
                assert_eq!(response.count(), 6);
            }

            #[tokio::test]
            async fn test_no_matching_rows() {
                let mut request = RemoteQueryRequest::first_page(10);
                request.filters.insert("status".into(), json!("deleted"));
                let response = fetch(articles(9), request).await;
                assert_eq!(response.count(), 0);
                assert!(response.into_items().is_empty());
            }

            #[tokio::test]
            async fn test_search_param() {
                let mut request = RemoteQueryRequest::first_page(10);
                request.filters.insert("search".into(), json!("article 1"));
                let response = fetch(articles(25), request).await;
                assert_eq!(response.count(), 10);
            }

            #[tokio::test]
            async fn test_sort_descending() {
                let mut request = RemoteQueryRequest::first_page(3);
                request.sort = Some(SortSpec::new("publishedAt", SortDirection::Desc));
                let response = fetch(articles(12), request).await;
                assert_eq!(
                    titles(&response.into_items()),
                    vec!["Article 11", "Article 10", "Article 09"]
                );
            }

            #[tokio::test]
            async fn test_sort_ascending_numeric() {
                let mut request = RemoteQueryRequest::first_page(50);
                request.sort = Some(SortSpec::new("views", SortDirection::Asc));
                let response = fetch(articles(20), request).await;
                let views: Vec<i64> = response.into_items().iter().map(|a| a.views).collect();
                let mut sorted = views.clone();
                sorted.sort();
                assert_eq!(views, sorted);
            }

            #[tokio::test]
            async fn test_empty_collection() {
                let response = fetch(Vec::new(), RemoteQueryRequest::first_page(10)).await;
                assert_eq!(response.count(), 0);
                assert!(response.into_items().is_empty());
            }
        }
    };
}
