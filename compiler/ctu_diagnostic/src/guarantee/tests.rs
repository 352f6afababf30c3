use super::*;

#[test]
fn test_guarantee_needs_an_error() {
    assert_eq!(ErrorGuaranteed::from_error_count(0), None);
    assert_eq!(
        ErrorGuaranteed::from_error_count(3),
        Some(ErrorGuaranteed::new())
    );
}

#[test]
fn test_guarantee_converts_to_boxed_error() {
    let err: Box<dyn std::error::Error> = Box::new(ErrorGuaranteed::new());
    assert_eq!(err.to_string(), "error(s) emitted");
}
