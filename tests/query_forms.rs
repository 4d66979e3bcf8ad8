use nlu::{QueryFactory, Span, TextForm};

fn factory() -> QueryFactory {
    nlu::build_query_factory(&nlu::AppConfig::default()).expect("default factory")
}

fn span(start: usize, end: usize) -> Span {
    Span::new(start, end).expect("valid span")
}

#[test]
fn plain_punctuation_is_normalized_away() {
    let query = factory().create_query("Test: 1. 2. 3.", None, None).unwrap();
    assert_eq!(query.text(), "Test: 1. 2. 3.");
    assert_eq!(query.processed_text(), "Test: 1. 2. 3.");
    assert_eq!(query.normalized_text(), "test 1 2 3");
}

#[test]
fn leading_special_characters() {
    for text in [" Test: 1. 2. 3.", "\"Test\": 1. 2. 3.", "(Test\": 1. 2. 3.)"] {
        let query = factory().create_query(text, None, None).unwrap();
        assert_eq!(query.text(), text);
        assert_eq!(query.processed_text(), text);
        assert_eq!(query.normalized_text(), "test 1 2 3", "input {text:?}");
    }

    let query = factory().create_query("((()))", None, None).unwrap();
    assert_eq!(query.text(), "((()))");
    assert_eq!(query.processed_text(), "((()))");
    assert_eq!(query.normalized_text(), "");
}

#[test]
fn index_transforms_in_both_directions() {
    let query = factory().create_query("Test: One. 2. 3.", None, None).unwrap();

    assert_eq!(query.transform_index(6, TextForm::Raw, TextForm::Processed), Ok(6));
    assert_eq!(query.transform_index(6, TextForm::Raw, TextForm::Normalized), Ok(5));
    assert_eq!(query.transform_index(5, TextForm::Normalized, TextForm::Processed), Ok(6));
    assert_eq!(query.transform_index(5, TextForm::Normalized, TextForm::Raw), Ok(6));
    assert_eq!(query.transform_index(7, TextForm::Normalized, TextForm::Raw), Ok(8));
    assert_eq!(query.transform_index(8, TextForm::Normalized, TextForm::Raw), Ok(10));
}

#[test]
fn span_transforms_in_both_directions() {
    let query = factory().create_query("Test: One. 2. 3.", None, None).unwrap();

    let normalized = query
        .transform_span(span(0, 9), TextForm::Raw, TextForm::Normalized)
        .unwrap();
    assert_eq!(normalized, span(0, 7));
    assert_eq!(query.span_text(normalized, TextForm::Normalized), Ok("test one"));

    let raw = query
        .transform_span(span(0, 7), TextForm::Normalized, TextForm::Raw)
        .unwrap();
    assert_eq!(raw, span(0, 8));
    assert_eq!(query.span_text(raw, TextForm::Raw), Ok("Test: One"));
}

#[test]
fn same_form_transform_is_identity() {
    let query = factory()
        .create_query("  Hello, (big) World!! ", None, None)
        .unwrap();
    for form in TextForm::ALL {
        let len = query.len_for(form);
        for index in 0..len {
            assert_eq!(query.transform_index(index, form, form), Ok(index));
        }
        if len > 0 {
            let whole = span(0, len - 1);
            assert_eq!(query.transform_span(whole, form, form), Ok(whole));
        }
    }
}

#[test]
fn round_trips_are_stable_for_every_pair() {
    let query = factory()
        .create_query("\u{201c}Caf\u{e9}s\u{201d} near  10:30, AT&T\u{2122} store?", None, None)
        .unwrap();
    assert_eq!(query.normalized_text(), "cafes near 10:30 at&t store");

    for from in TextForm::ALL {
        for to in TextForm::ALL {
            for index in 0..query.len_for(from) {
                let there = query.transform_index(index, from, to).unwrap();
                let back = query.transform_index(there, to, from).unwrap();
                let again = query.transform_index(back, from, to).unwrap();
                assert_eq!(again, there, "{from} -> {to} at {index}");
            }
        }
    }
}

#[test]
fn decomposed_input_composes_in_processed_form() {
    let query = factory().create_query("Cafe\u{301} au lait", None, None).unwrap();
    assert_eq!(query.processed_text(), "Caf\u{e9} au lait");
    assert_eq!(query.normalized_text(), "cafe au lait");
    // the combining accent collapses onto the composed character
    assert_eq!(query.transform_index(4, TextForm::Raw, TextForm::Processed), Ok(3));
    assert_eq!(query.transform_index(5, TextForm::Raw, TextForm::Processed), Ok(4));
    assert_eq!(query.transform_index(4, TextForm::Normalized, TextForm::Raw), Ok(5));
}

#[test]
fn query_equality_depends_on_text_and_context() {
    let f = factory();
    let a = f.create_query("Hello. There.", None, None).unwrap();
    let b = f.create_query("Hello. There.", None, None).unwrap();
    assert_eq!(a, b);

    let la = f
        .create_query("Hello. There.", Some("America/Los_Angeles"), None)
        .unwrap();
    let bahia = f
        .create_query("Hello. There.", Some("America/Bahia"), None)
        .unwrap();
    assert_ne!(la, bahia);

    let earlier = f.create_query("Hello. There.", None, Some(1)).unwrap();
    let later = f.create_query("Hello. There.", None, Some(2)).unwrap();
    assert_ne!(earlier, later);
}
