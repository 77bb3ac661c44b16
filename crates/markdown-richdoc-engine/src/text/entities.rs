use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::options::EntityDecoding;

/// The entities a Markdown lexer produces when HTML-escaping text.
const ENTITIES: [(&str, &str); 9] = [
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&#x2F;", "/"),
    ("&#x5C;", "\\"),
    ("&#x60;", "`"),
    ("&#x3D;", "="),
];

fn entity_regex() -> &'static Regex {
    static ENTITY_REGEX: OnceLock<Regex> = OnceLock::new();
    ENTITY_REGEX.get_or_init(|| {
        let alternation = ENTITIES
            .iter()
            .map(|(entity, _)| regex::escape(entity))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&alternation).expect("Invalid entity regex")
    })
}

/// Replace the allow-listed HTML entities with their literal characters.
///
/// Anything outside the list, including other numeric references such as
/// `&#123;`, is left untouched. Borrows when nothing matches.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    entity_regex().replace_all(s, |caps: &Captures| {
        let matched = &caps[0];
        ENTITIES
            .iter()
            .find(|(entity, _)| *entity == matched)
            .map_or(matched, |(_, literal)| *literal)
            .to_string()
    })
}

/// Decode entities according to the configured mode.
pub fn decode(s: &str, mode: EntityDecoding) -> Cow<'_, str> {
    match mode {
        EntityDecoding::AllowList => decode_entities(s),
        EntityDecoding::Full => html_escape::decode_html_entities(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("&amp;", "&")]
    #[case("&lt;b&gt;", "<b>")]
    #[case("say &quot;hi&quot;", "say \"hi\"")]
    #[case("it&#39;s", "it's")]
    #[case("a&#x2F;b&#x5C;c", "a/b\\c")]
    #[case("&#x60;x&#x3D;1&#x60;", "`x=1`")]
    fn decodes_allow_listed_entities(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(decode_entities(input), expected);
    }

    #[rstest]
    #[case("&copy; 2024")]
    #[case("&#123;")]
    #[case("&nbsp;")]
    #[case("AT&T")]
    fn leaves_other_entities_alone(#[case] input: &str) {
        assert_eq!(decode_entities(input), input);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(decode_entities(""), "");
    }

    #[test]
    fn borrows_when_nothing_to_decode() {
        assert!(matches!(decode_entities("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn does_not_double_decode() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn full_mode_decodes_everything() {
        assert_eq!(decode("&copy; &#123; &amp;", EntityDecoding::Full), "© { &");
        assert_eq!(
            decode("&copy; &amp;", EntityDecoding::AllowList),
            "&copy; &"
        );
    }
}
