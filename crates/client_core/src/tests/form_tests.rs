use std::time::{Duration, Instant};

use super::*;
use crate::test_support::{network_down, sample_books, ApiCall, FakeCatalogApi};
use crate::validation::FormField;

const YEAR: i32 = 2024;

fn fill_valid(form: &mut BookFormController) {
    form.update_field(FormField::Title, "  Clean Code ");
    form.update_field(FormField::Author, " Robert C. Martin ");
    form.update_field(FormField::Isbn, " 978-0132350884 ");
    form.update_field(FormField::Year, "2008");
    form.update_field(FormField::Price, "37.99");
}

#[test]
fn add_mode_starts_ready_and_empty() {
    let form = BookFormController::new(FormMode::Add);
    assert_eq!(form.phase(), &FormPhase::Ready);
    assert_eq!(form.values(), &FormValues::default());
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn edit_mode_populates_text_fields_from_fetched_book() {
    let api = FakeCatalogApi::with_books(sample_books(3));
    let expected = api.stored().await[1].clone();

    let form = BookFormController::initialize(FormMode::Edit(BookId(2)), &api).await;

    assert_eq!(form.phase(), &FormPhase::Ready);
    assert_eq!(form.values().title, expected.title);
    assert_eq!(form.values().year, expected.year.to_string());
    assert_eq!(form.values().price, expected.price.to_string());
    assert_eq!(api.calls().await, vec![ApiCall::Get(BookId(2))]);
}

#[tokio::test]
async fn edit_mode_fetch_failure_is_terminal() {
    let api = FakeCatalogApi::with_books(Vec::new());

    let mut form = BookFormController::initialize(FormMode::Edit(BookId(9)), &api).await;

    assert_eq!(form.load_error(), Some("404 Not Found"));
    form.update_field(FormField::Title, "ignored");
    assert_eq!(form.values().title, "");
    assert_eq!(form.begin_submit(), Err(SubmitRejected::NotReady));
}

#[test]
fn updating_a_field_clears_only_its_error() {
    let mut form = BookFormController::new(FormMode::Add).with_current_year(YEAR);
    assert!(matches!(form.begin_submit(), Err(SubmitRejected::Invalid(5))));

    form.update_field(FormField::Title, "x");

    assert_eq!(form.field_error(FormField::Title), None);
    assert!(form.field_error(FormField::Author).is_some());
    assert_eq!(form.values().title, "x");
}

#[tokio::test]
async fn invalid_form_makes_no_network_call() {
    let api = FakeCatalogApi::default();
    let mut form = BookFormController::new(FormMode::Add).with_current_year(YEAR);
    fill_valid(&mut form);
    form.update_field(FormField::Isbn, "ISBN-abc");

    let outcome = form.submit(&api).await;

    assert_eq!(outcome, Err(SubmitRejected::Invalid(1)));
    assert!(form.field_error(FormField::Isbn).is_some());
    assert_eq!(form.phase(), &FormPhase::Ready);
    assert!(api.calls().await.is_empty());
}

#[tokio::test]
async fn valid_add_sends_one_create_and_schedules_redirect() {
    let api = FakeCatalogApi::default();
    let mut form = BookFormController::new(FormMode::Add)
        .with_current_year(YEAR)
        .with_redirect_delay(Duration::from_millis(1500));
    fill_valid(&mut form);

    form.submit(&api).await.expect("submit");

    assert_eq!(
        api.calls().await,
        vec![ApiCall::Create(BookPayload {
            title: "Clean Code".into(),
            author: "Robert C. Martin".into(),
            isbn: "978-0132350884".into(),
            year: 2008,
            price: 37.99,
        })]
    );
    assert_eq!(form.phase(), &FormPhase::Succeeded);
    let message = form.message().expect("success message");
    assert!(message.contains("Clean Code"), "{message}");
    assert!(message.contains("added"), "{message}");

    let nav = form.pending_navigation().expect("scheduled");
    let due = nav.due_at();
    assert_eq!(form.poll_navigation(due - Duration::from_millis(1)), None);
    assert_eq!(form.poll_navigation(due), Some(Route::ManagerList));
}

#[tokio::test]
async fn edit_submits_update_for_the_same_id() {
    let api = FakeCatalogApi::with_books(sample_books(2));
    let mut form = BookFormController::initialize(FormMode::Edit(BookId(1)), &api)
        .await
        .with_current_year(YEAR);
    form.update_field(FormField::Price, "19.5");

    form.submit(&api).await.expect("submit");

    let calls = api.calls().await;
    assert_eq!(calls.len(), 2);
    let ApiCall::Update(id, payload) = &calls[1] else {
        panic!("expected update, got {:?}", calls[1]);
    };
    assert_eq!(*id, BookId(1));
    assert_eq!(payload.price, 19.5);
    assert!(form.message().is_some_and(|m| m.contains("edited")));
    assert_eq!(api.stored().await[0].price, 19.5);
}

#[tokio::test]
async fn failed_submit_returns_to_ready_with_combined_message() {
    let api = FakeCatalogApi {
        fail_writes: Some(CatalogError::Rejected {
            status: 409,
            message: "isbn already exists".into(),
        }),
        ..FakeCatalogApi::default()
    };
    let mut form = BookFormController::new(FormMode::Add).with_current_year(YEAR);
    fill_valid(&mut form);

    form.submit(&api).await.expect("submit attempted");

    assert_eq!(form.phase(), &FormPhase::Ready);
    assert!(!form.is_submitting());
    assert_eq!(
        form.submit_error(),
        Some("Failed to add book: isbn already exists")
    );
    assert!(!form.failed_on_network());
    assert!(form.pending_navigation().is_none());
    assert!(form.state().errors.is_empty());
}

#[tokio::test]
async fn network_failure_is_distinguishable_from_rejection() {
    let api = FakeCatalogApi {
        fail_writes: Some(network_down()),
        ..FakeCatalogApi::default()
    };
    let mut form = BookFormController::new(FormMode::Add).with_current_year(YEAR);
    fill_valid(&mut form);

    form.submit(&api).await.expect("submit attempted");

    assert!(form.failed_on_network());
    assert!(form
        .submit_error()
        .is_some_and(|m| m.starts_with("Failed to add book: network error")));
}

#[test]
fn second_submit_while_in_flight_is_rejected() {
    let mut form = BookFormController::new(FormMode::Add).with_current_year(YEAR);
    fill_valid(&mut form);

    let request = form.begin_submit().expect("first submit");
    assert_eq!(request.mode, FormMode::Add);
    assert!(form.is_submitting());
    assert_eq!(form.begin_submit(), Err(SubmitRejected::InProgress));

    form.update_field(FormField::Title, "changed mid-flight");
    assert_eq!(form.values().title, "  Clean Code ");

    let now = Instant::now();
    form.finish_submit(
        request.ticket,
        Ok(Book::new(BookId(1), "Clean Code", "Robert C. Martin", "978", 2008, 37.99)),
        now,
    );
    assert_eq!(form.phase(), &FormPhase::Succeeded);
    assert!(form.poll_navigation(now).is_none());
}

#[test]
fn cancelled_redirect_never_fires() {
    let mut form = BookFormController::new(FormMode::Add)
        .with_current_year(YEAR)
        .with_redirect_delay(Duration::ZERO);
    fill_valid(&mut form);
    let request = form.begin_submit().expect("submit");
    let now = Instant::now();
    form.finish_submit(
        request.ticket,
        Ok(Book::new(BookId(1), "Clean Code", "Robert C. Martin", "978", 2008, 37.99)),
        now,
    );

    form.cancel_navigation();

    assert_eq!(form.poll_navigation(now + Duration::from_secs(60)), None);
}

#[test]
fn stray_results_are_ignored() {
    let mut form = BookFormController::new(FormMode::Add);
    form.finish_submit(SubmitTicket::issue(), Err(network_down()), Instant::now());
    assert_eq!(form.phase(), &FormPhase::Ready);
    assert!(form.submit_error().is_none());

    form.apply_loaded(Err(network_down()));
    assert_eq!(form.phase(), &FormPhase::Ready);
}

#[test]
fn edit_form_ignores_a_book_fetched_for_another_id() {
    let mut form = BookFormController::new(FormMode::Edit(BookId(8)));

    form.apply_loaded(Ok(Book::new(BookId(7), "Wrong Book", "Someone", "978", 1999, 5.0)));
    assert_eq!(form.phase(), &FormPhase::Loading);
    assert_eq!(form.values(), &FormValues::default());

    form.apply_loaded(Ok(Book::new(BookId(8), "Right Book", "Someone", "979", 2001, 6.0)));
    assert_eq!(form.phase(), &FormPhase::Ready);
    assert_eq!(form.values().title, "Right Book");
}

#[test]
fn result_for_an_older_submission_is_dropped() {
    let mut form = BookFormController::new(FormMode::Add)
        .with_current_year(YEAR)
        .with_redirect_delay(Duration::ZERO);
    fill_valid(&mut form);
    let request = form.begin_submit().expect("submit");
    let now = Instant::now();

    form.finish_submit(
        SubmitTicket::issue(),
        Ok(Book::new(BookId(3), "Other", "Other", "978", 2000, 1.0)),
        now,
    );
    assert_eq!(form.phase(), &FormPhase::Submitting);
    assert!(form.message().is_none());
    assert!(form.poll_navigation(now).is_none());

    form.finish_submit(request.ticket, Err(network_down()), now);
    assert_eq!(form.phase(), &FormPhase::Ready);
    assert_eq!(
        form.submit_error(),
        Some(format!("Failed to add book: {}", network_down()).as_str())
    );
}

#[test]
fn tickets_are_unique_across_forms() {
    let mut first = BookFormController::new(FormMode::Add).with_current_year(YEAR);
    let mut second = BookFormController::new(FormMode::Add).with_current_year(YEAR);
    fill_valid(&mut first);
    fill_valid(&mut second);

    let a = first.begin_submit().expect("first");
    let b = second.begin_submit().expect("second");
    assert_ne!(a.ticket, b.ticket);
}
