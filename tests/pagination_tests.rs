//! Tests for the pagination widget against real fetch results

#[macro_use]
mod collection_harness;

use collection_harness::*;
use folio::prelude::*;

#[tokio::test]
async fn test_ninety_five_rows_make_five_pages() {
    let mut view = controller(Arc::new(article_source(articles(95))), 20);
    view.refresh().await.unwrap();

    let pagination = view.pagination().unwrap();
    assert_eq!(pagination.total_pages(), 5);
    assert_eq!(pagination.page_label(), "Page 1 of 5");
    assert!(!pagination.can_previous_page());
    assert!(pagination.can_next_page());
    assert_eq!(view.pagination_meta().unwrap().total_pages, 5);
}

#[tokio::test]
async fn test_empty_collection_renders() {
    let mut view = controller(Arc::new(article_source(Vec::new())), 20);
    view.refresh().await.unwrap();

    let mut pagination = view.pagination().unwrap();
    assert_eq!(pagination.total_pages(), 0);
    assert_eq!(pagination.page_label(), "Page 0 of 0");
    assert_eq!(pagination.selection_label(), "0 of 0 row(s) selected.");
    assert!(pagination.page_window(5).is_empty());
    assert!(!pagination.can_next_page());
    assert!(!pagination.can_previous_page());

    assert!(!pagination.apply(PageChange::Next).unwrap());
    assert!(!pagination.apply(PageChange::Last).unwrap());
    assert_eq!(pagination.page_index(), 0);
}

#[tokio::test]
async fn test_navigate_to_last_page_and_back() {
    let mut view = controller(Arc::new(article_source(articles(95))), 20);
    view.refresh().await.unwrap();

    view.pagination().unwrap().apply(PageChange::Last).unwrap();
    assert_eq!(view.state().pagination.page_index, 4);
    view.sync().await.unwrap();
    assert_eq!(view.items().unwrap().len(), 15);

    {
        let mut pagination = view.pagination().unwrap();
        assert_eq!(pagination.page_label(), "Page 5 of 5");
        assert!(!pagination.can_next_page());
        assert_eq!(pagination.page_window(3), vec![2, 3, 4]);
        pagination.apply(PageChange::Previous).unwrap();
    }
    assert_eq!(view.state().pagination.page_index, 3);
}

#[tokio::test]
async fn test_jump_past_end_is_clamped() {
    let mut view = controller(Arc::new(article_source(articles(95))), 20);
    view.refresh().await.unwrap();

    view.pagination().unwrap().apply(PageChange::Index(40)).unwrap();
    assert_eq!(view.state().pagination.page_index, 4);
}

#[tokio::test]
async fn test_page_size_change_goes_to_first_page() {
    let mut view = controller(Arc::new(article_source(articles(95))), 20);
    view.refresh().await.unwrap();
    view.pagination().unwrap().apply(PageChange::Index(2)).unwrap();

    {
        let mut pagination = view.pagination().unwrap();
        assert_eq!(pagination.page_size_options(), &[10, 20, 30, 40, 50]);
        pagination.apply(PageChange::Size(50)).unwrap();
    }
    assert_eq!(view.state().pagination, PaginationState::new(50));

    view.sync().await.unwrap();
    assert_eq!(view.pagination().unwrap().total_pages(), 2);
}

#[tokio::test]
async fn test_selection_label_counts_page_rows() {
    let mut view = controller(Arc::new(article_source(articles(30))), 10);
    view.refresh().await.unwrap();

    {
        let mut table = view.table().unwrap();
        let ids = table.row_ids();
        table.set_row_selected(&ids[0], true).unwrap();
        table.set_row_selected(&ids[3], true).unwrap();
    }
    assert_eq!(
        view.pagination().unwrap().selection_label(),
        "2 of 10 row(s) selected."
    );
}

#[test]
fn test_page_change_wire_format() {
    assert_eq!(
        serde_json::to_value(PageChange::Index(3)).unwrap(),
        json!({ "type": "index", "value": 3 })
    );
    let change: PageChange = serde_json::from_value(json!({ "type": "next" })).unwrap();
    assert_eq!(change, PageChange::Next);
}
