//! Property-based tests for the shared text helpers and the lowering
//! backends.

use markdown_richdoc_engine::lowering::google_docs::Request;
use markdown_richdoc_engine::lowering::slack;
use markdown_richdoc_engine::text::{chunk_text, decode_entities, doc_len};
use markdown_richdoc_engine::{
    ConversionOptions, markdown_to_google_docs, markdown_to_notion, markdown_to_slack,
};
use proptest::prelude::*;

/// Text made of allow-listed entities and characters that can never
/// complete a new entity once decoded.
fn entity_text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("&amp;".to_string()),
            Just("&lt;".to_string()),
            Just("&gt;".to_string()),
            Just("&quot;".to_string()),
            Just("&#39;".to_string()),
            Just("&#x2F;".to_string()),
            Just("&#x5C;".to_string()),
            Just("&#x60;".to_string()),
            Just("&#x3D;".to_string()),
            "[a-z0-9#x ]{1,6}",
        ],
        0..20,
    )
    .prop_map(|parts| parts.concat())
}

/// Markdown lines without tables, so every insert advances the cursor by
/// exactly its own length.
fn markdown_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("# Heading".to_string()),
            Just("plain words".to_string()),
            Just("**bold** and _italic_".to_string()),
            Just("~~gone~~ `code`".to_string()),
            Just("- item".to_string()),
            Just("  - nested **item**".to_string()),
            Just("1. first".to_string()),
            Just("a ![img](https://x.test/i.png) b".to_string()),
            Just("[link](https://x.test)".to_string()),
            Just("> quoted".to_string()),
            Just("***".to_string()),
            Just(String::new()),
            "[a-zA-Z ]{1,30}",
        ],
        1..15,
    )
    .prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn chunks_concatenate_to_the_input(text in "(?s).{0,300}", max in 1usize..50) {
        let segments = chunk_text(&text, max);
        let joined: String = segments.iter().map(|s| s.as_str()).collect();
        prop_assert_eq!(joined, text);
        for segment in &segments {
            prop_assert!(segment.as_str().chars().count() <= max);
        }
    }

    #[test]
    fn decoding_is_idempotent(text in entity_text_strategy()) {
        let once = decode_entities(&text).into_owned();
        let twice = decode_entities(&once).into_owned();
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn google_docs_inserts_are_gapless(markdown in markdown_strategy()) {
        let payload = markdown_to_google_docs(&markdown, &ConversionOptions::default());
        let mut expected = 1;
        for request in payload.requests.iter().filter(|r| r.is_insert()) {
            match request {
                Request::InsertText { text, location } => {
                    prop_assert_eq!(location.index, expected);
                    expected += doc_len(text);
                }
                Request::InsertInlineImage { location, .. } => {
                    prop_assert_eq!(location.index, expected);
                    expected += 1;
                }
                other => prop_assert!(false, "unexpected insert {:?}", other),
            }
        }
    }

    #[test]
    fn google_docs_ranges_are_well_formed(markdown in markdown_strategy()) {
        let payload = markdown_to_google_docs(&markdown, &ConversionOptions::default());
        for range in payload.requests.iter().filter_map(Request::range) {
            prop_assert!(range.start_index >= 1);
            prop_assert!(range.start_index < range.end_index);
        }
    }

    #[test]
    fn backends_agree_on_plain_text(words in prop::collection::vec("[a-z]{1,8}", 1..10)) {
        let text = words.join(" ");
        let options = ConversionOptions::default();
        prop_assert_eq!(&markdown_to_google_docs(&text, &options).plain_text(), &text);
        prop_assert_eq!(&markdown_to_notion(&text, &options).plain_text(), &text);
        prop_assert_eq!(&slack::plain_text(&markdown_to_slack(&text, &options)), &text);
    }
}
