use super::*;

const YEAR: i32 = 2024;

fn values(title: &str, author: &str, isbn: &str, year: &str, price: &str) -> FormValues {
    FormValues {
        title: title.into(),
        author: author.into(),
        isbn: isbn.into(),
        year: year.into(),
        price: price.into(),
    }
}

fn fields(errors: &FieldErrors) -> Vec<FormField> {
    errors.keys().copied().collect()
}

#[test]
fn valid_record_has_no_errors() {
    let errors = validate(&values("Dune", "Frank Herbert", "978-0441", "1965", "12.50"), YEAR);
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn one_letter_title_is_the_only_error() {
    let errors = validate(&values("A", "Valid Name", "123-456", "2024", "10"), YEAR);
    assert_eq!(fields(&errors), vec![FormField::Title]);
    assert_eq!(errors[&FormField::Title], "Title must be at least 2 characters");
}

#[test]
fn letters_in_isbn_are_the_only_error() {
    let errors = validate(&values("Valid Title", "Valid Author", "abc", "2024", "10"), YEAR);
    assert_eq!(fields(&errors), vec![FormField::Isbn]);
}

#[test]
fn blank_form_reports_every_field_as_required() {
    let errors = validate(&FormValues::default(), YEAR);
    assert_eq!(fields(&errors), FormField::ALL.to_vec());
    assert_eq!(errors[&FormField::Price], "Please enter the price");
}

#[test]
fn text_length_is_measured_after_trimming() {
    let errors = validate(&values("  A  ", "   ", "1", "2000", "1"), YEAR);
    assert_eq!(errors[&FormField::Title], "Title must be at least 2 characters");
    assert_eq!(errors[&FormField::Author], "Please enter the author");
}

#[test]
fn year_must_be_an_integer_within_bounds() {
    let base = |year: &str| validate(&values("Ab", "Cd", "1", year, "1"), YEAR);

    assert_eq!(base("abc")[&FormField::Year], "Year must be a whole number");
    assert_eq!(base("1999.5")[&FormField::Year], "Year must be a whole number");
    assert_eq!(base("999")[&FormField::Year], "Year must be between 1000 and 2025");
    assert_eq!(base("2026")[&FormField::Year], "Year must be between 1000 and 2025");
    assert!(base("1000").is_empty());
    assert!(base("2025").is_empty());
}

#[test]
fn price_must_be_positive_and_capped() {
    let base = |price: &str| validate(&values("Ab", "Cd", "1", "2000", price), YEAR);

    assert_eq!(base("ten")[&FormField::Price], "Price must be a number");
    assert_eq!(base("NaN")[&FormField::Price], "Price must be a number");
    assert_eq!(base("0")[&FormField::Price], "Price must be greater than 0");
    assert_eq!(base("-3")[&FormField::Price], "Price must be greater than 0");
    assert_eq!(base("1000000")[&FormField::Price], "Price must not exceed 999,999");
    assert!(base("999999").is_empty());
    assert!(base("0.01").is_empty());
}

#[test]
fn payload_trims_text_and_parses_numbers() {
    let payload = values("  Dune ", " Frank Herbert", " 978-0441 ", " 1965 ", "12.5")
        .to_payload()
        .expect("payload");
    assert_eq!(payload.title, "Dune");
    assert_eq!(payload.author, "Frank Herbert");
    assert_eq!(payload.isbn, "978-0441");
    assert_eq!(payload.year, 1965);
    assert_eq!(payload.price, 12.5);
}

#[test]
fn field_names_round_trip() {
    for field in FormField::ALL {
        assert_eq!(FormField::parse(field.name()), Some(field));
    }
    assert_eq!(FormField::parse("submit"), None);
}
