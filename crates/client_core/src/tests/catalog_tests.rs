use super::*;
use crate::test_support::{network_down, sample_books, ApiCall, FakeCatalogApi};
use shared::domain::BookId;

fn ids(books: &[&Book]) -> Vec<i64> {
    books.iter().map(|book| book.id.0).collect()
}

fn loaded(books: Vec<Book>) -> CatalogView {
    let mut view = CatalogView::new();
    view.apply_load(Ok(books));
    view
}

#[tokio::test]
async fn load_initializes_visible_list_to_full_catalog() {
    let api = FakeCatalogApi::with_books(sample_books(5));
    let mut view = CatalogView::new();

    view.load(&api).await;

    assert!(!view.is_loading());
    assert!(view.error().is_none());
    assert_eq!(ids(&view.visible_books()), vec![1, 2, 3, 4, 5]);
    assert_eq!(view.current_page(), 1);
    assert_eq!(api.calls().await, vec![ApiCall::List]);
}

#[tokio::test]
async fn failed_load_keeps_error_and_empty_view_without_retry() {
    let api = FakeCatalogApi {
        fail_reads: Some(network_down()),
        ..FakeCatalogApi::default()
    };
    let mut view = CatalogView::new();

    view.load(&api).await;

    assert!(view.error().is_some_and(CatalogError::is_network));
    assert_eq!(view.visible_len(), 0);
    assert_eq!(view.total_pages(), 0);
    assert_eq!(api.calls().await, vec![ApiCall::List]);
}

#[test]
fn successful_reload_clears_previous_error() {
    let mut view = CatalogView::new();
    view.apply_load(Err(network_down()));
    view.apply_load(Ok(sample_books(2)));
    assert!(view.error().is_none());
    assert_eq!(view.visible_len(), 2);
}

#[test]
fn pages_partition_the_visible_list() {
    for count in [0, 1, 11, 12, 13, 24, 25, 37] {
        let view = loaded(sample_books(count));
        let expected_pages = (count as usize).div_ceil(PAGE_SIZE);
        assert_eq!(view.total_pages(), expected_pages, "count {count}");

        let mut rebuilt = Vec::new();
        for n in view.page_numbers() {
            let page = view.page(n);
            assert!(!page.is_empty() && page.len() <= PAGE_SIZE);
            rebuilt.extend(ids(&page));
        }
        assert_eq!(rebuilt, ids(&view.visible_books()), "count {count}");
    }
}

#[test]
fn out_of_range_pages_are_empty() {
    let view = loaded(sample_books(13));
    assert!(view.page(0).is_empty());
    assert!(view.page(3).is_empty());
    assert_eq!(view.page(2).len(), 1);
}

#[test]
fn search_matches_title_or_author_ignoring_case_and_resets_page() {
    let mut books = sample_books(30);
    books[4].title = "The RUST Programming Language".into();
    books[9].author = "Rusty Jones".into();
    let mut view = loaded(books);
    view.go_to_page(3);

    view.search("rust");

    assert_eq!(ids(&view.visible_books()), vec![5, 10]);
    assert_eq!(view.current_page(), 1);
    assert_eq!(view.search_term(), "rust");
}

#[test]
fn category_filter_is_case_insensitive_and_skips_uncategorized() {
    let mut books = sample_books(6);
    books[0].category = None;
    let mut view = loaded(books);
    view.go_to_page(1);

    view.filter_by_category("HISTORY");
    assert_eq!(ids(&view.visible_books()), vec![2, 5]);

    view.filter_by_category("science");
    // book 1 lost its category
    assert_eq!(ids(&view.visible_books()), vec![4]);
    assert_eq!(view.current_page(), 1);
}

#[test]
fn search_and_category_compose() {
    let mut books = sample_books(9);
    books[2].title = "Space Opera".into(); // id 3, fiction
    books[3].title = "Space Science".into(); // id 4, science
    let mut view = loaded(books);

    view.filter_by_category("fiction");
    view.search("space");
    assert_eq!(ids(&view.visible_books()), vec![3]);

    view.search("");
    assert_eq!(ids(&view.visible_books()), vec![3, 6, 9]);
}

#[test]
fn all_category_restores_full_catalog_regardless_of_prior_state() {
    let books = sample_books(20);
    let full: Vec<i64> = books.iter().map(|book| book.id.0).collect();
    let mut view = loaded(books);

    view.filter_by_category("fiction");
    view.search("title 1");
    view.sort(SortKey::PriceHigh);
    view.go_to_page(2);

    view.filter_by_category("all");

    assert_eq!(ids(&view.visible_books()), full);
    assert_eq!(view.search_term(), "");
    assert_eq!(view.active_sort(), None);
    assert_eq!(view.category(), &CategoryFilter::All);
    assert_eq!(view.current_page(), 1);
}

#[test]
fn price_sorts_are_exact_reverses_for_distinct_prices() {
    let mut view = loaded(sample_books(25));

    view.sort(SortKey::PriceLow);
    let ascending = ids(&view.visible_books());
    let prices: Vec<f64> = view.visible_books().iter().map(|b| b.price).collect();
    assert!(prices.windows(2).all(|w| w[0] < w[1]));

    view.sort(SortKey::PriceHigh);
    let mut descending = ids(&view.visible_books());
    descending.reverse();
    assert_eq!(ascending, descending);
}

#[test]
fn popular_treats_missing_reviews_as_zero_and_keeps_ties_stable() {
    let reviews = [Some(5), None, Some(5), Some(0), Some(9)];
    let books = reviews
        .iter()
        .enumerate()
        .map(|(i, reviews)| {
            let mut book = Book::new(BookId(i as i64 + 1), "Title", "Author", "1", 2000, 1.0);
            book.reviews = *reviews;
            book
        })
        .collect();
    let mut view = loaded(books);

    view.sort(SortKey::Popular);

    assert_eq!(ids(&view.visible_books()), vec![5, 1, 3, 2, 4]);
}

#[test]
fn newest_orders_by_descending_id_and_keeps_current_page() {
    let mut view = loaded(sample_books(30));
    view.go_to_page(3);

    view.sort(SortKey::Newest);

    assert_eq!(view.current_page(), 3);
    assert_eq!(ids(&view.page(1))[..3], [30, 29, 28]);
}

#[test]
fn active_sort_is_reapplied_after_search() {
    let mut view = loaded(sample_books(15));
    view.sort(SortKey::Newest);

    view.search("title 1");

    assert_eq!(
        ids(&view.visible_books()),
        vec![15, 14, 13, 12, 11, 10, 1]
    );
}

#[test]
fn unknown_sort_key_means_newest() {
    assert_eq!(SortKey::parse("price-low"), SortKey::PriceLow);
    assert_eq!(SortKey::parse("PRICE-HIGH"), SortKey::PriceHigh);
    assert_eq!(SortKey::parse("popular"), SortKey::Popular);
    assert_eq!(SortKey::parse("bogus"), SortKey::Newest);
    assert_eq!(SortKey::default(), SortKey::Newest);
}

#[test]
fn page_navigation_stops_at_boundaries() {
    let mut view = loaded(sample_books(25));
    assert!(!view.has_previous_page());
    assert!(view.has_next_page());

    view.next_page();
    view.next_page();
    view.next_page();
    assert_eq!(view.current_page(), 3);
    assert!(!view.has_next_page());

    view.go_to_page(99);
    assert_eq!(view.current_page(), 3);
    view.go_to_page(0);
    assert_eq!(view.current_page(), 1);
    view.previous_page();
    assert_eq!(view.current_page(), 1);

    let mut empty = loaded(Vec::new());
    empty.go_to_page(4);
    assert_eq!(empty.current_page(), 1);
    assert!(empty.current_slice().is_empty());
}
