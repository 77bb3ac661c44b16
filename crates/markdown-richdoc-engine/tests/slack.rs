use markdown_richdoc_engine::lowering::slack::plain_text;
use markdown_richdoc_engine::{
    ConversionOptions, SlackBlock, Target, lower_tokens, markdown_to_slack, tokens_from_json,
};
use pretty_assertions::assert_eq;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.md",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

fn convert(markdown: &str) -> Vec<SlackBlock> {
    markdown_to_slack(markdown, &ConversionOptions::default())
}

#[test]
fn fixture_blocks() {
    let blocks = convert(&fixture("meeting_notes"));
    assert_eq!(
        blocks,
        vec![
            SlackBlock::header("Meeting notes"),
            SlackBlock::section(
                "Paragraph with _italic_ and *bold* text and ~strikethrough~. And a <https://example.com|link>."
            ),
            SlackBlock::section("Some text with an _inline image_  and other _content_ after it."),
            SlackBlock::Image {
                image_url: "https://example.com/diagram.png".into(),
                alt_text: "diagram".into(),
            },
            SlackBlock::section("> Quote with **bold** and _italic_ text."),
            SlackBlock::Divider,
            SlackBlock::section(
                "• List <https://example.com|item 1>\n• List *item* 2\n    • Nested _item_"
            ),
            SlackBlock::section("Some text before the checklist"),
            SlackBlock::section("• *Checkbox* 1\n• _Checkbox_ 2"),
            SlackBlock::section("1. Ordered item 1\n2. Ordered item 2"),
            SlackBlock::section("`code span here`"),
            SlackBlock::section("```rust\nfn main() {\n    println!(\"hi\");\n}\n```"),
        ]
    );
}

#[test]
fn top_level_output_is_a_bare_array() {
    let value = serde_json::to_value(convert("# Hi\n\n---")).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            {"type": "header", "text": {"type": "plain_text", "text": "Hi", "emoji": true}},
            {"type": "divider"}
        ])
    );
}

#[test]
fn plain_text_joins_block_text() {
    assert_eq!(
        plain_text(&convert("# Title\n\nbody **text**")),
        "Title\nbody *text*"
    );
}

#[test]
fn marked_token_tree_with_bullet_list() {
    let json = r#"[
        {"type": "list", "raw": "- one\n- two", "ordered": false, "start": "", "loose": false,
         "items": [
            {"type": "list_item", "raw": "- one\n", "task": false, "loose": false, "text": "one",
             "tokens": [{"type": "text", "raw": "one", "text": "one",
                         "tokens": [{"type": "text", "raw": "one", "text": "one"}]}]},
            {"type": "list_item", "raw": "- two", "task": false, "loose": false, "text": "two",
             "tokens": [{"type": "text", "raw": "two", "text": "two",
                         "tokens": [{"type": "text", "raw": "two", "text": "two"}]}]}
         ]}
    ]"#;
    let tokens = tokens_from_json(json).unwrap();
    let value = lower_tokens(&tokens, Target::Slack, &ConversionOptions::default()).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{"type": "section", "text": {"type": "mrkdwn", "text": "• one\n• two"}}])
    );
}
