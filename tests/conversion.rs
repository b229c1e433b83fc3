use adf_convert::adf::types;
use adf_convert::mentions::{MentionFormatter, MentionInfo, MentionResolver};
use adf_convert::smart_links::{LinkKind, SmartLinkPolicy, classify};
use adf_convert::{
    AdfToMarkdownOptions, MarkdownToAdfOptions, adf_to_markdown, markdown_to_adf, render_document,
};
use rstest::rstest;
use serde_json::json;

fn round_trip(markdown: &str) -> String {
    let doc = markdown_to_adf(markdown, &MarkdownToAdfOptions::default());
    render_document(&doc, &AdfToMarkdownOptions::default()).unwrap()
}

#[rstest]
#[case::plain("Just some text")]
#[case::h1("# Heading 1")]
#[case::h2("## Heading 2")]
#[case::h3("### Heading 3")]
#[case::h4("#### Heading 4")]
#[case::h5("##### Heading 5")]
#[case::h6("###### Heading 6")]
#[case::bold("**bold**")]
#[case::italic("*italic*")]
#[case::inline_code("`let x = 1;`")]
#[case::strike("~~removed~~")]
#[case::rule("---")]
#[case::fence("```python\nprint('hi')\n```")]
#[case::bullets("- alpha\n- beta\n- gamma")]
#[case::ordered("1. first\n2. second")]
#[case::tasks("- [ ] Todo\n- [x] Done")]
#[case::quote("> wise words")]
#[case::link("[docs](https://example.com/docs)")]
#[case::image("![Logo](https://x.io/logo.png)")]
fn round_trip_is_identity(#[case] markdown: &str) {
    assert_eq!(round_trip(markdown), markdown);
}

#[test]
fn heading_converts_to_level_one_node() {
    let doc = markdown_to_adf("# Heading 1", &MarkdownToAdfOptions::default());
    assert_eq!(doc.content.len(), 1);

    let heading = &doc.content[0];
    assert!(heading.is(types::HEADING));
    assert_eq!(heading.attr_u64("level"), Some(1));
    assert_eq!(heading.children().len(), 1);
    assert_eq!(heading.children()[0].text_str(), "Heading 1");
}

#[test]
fn checkbox_bullets_become_task_list() {
    let doc = markdown_to_adf("- [ ] Todo\n- [x] Done", &MarkdownToAdfOptions::default());
    let list = &doc.content[0];
    assert!(list.is(types::TASK_LIST));

    let items = list.children();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].attr_str("state"), Some("TODO"));
    assert_eq!(items[1].attr_str("state"), Some("DONE"));

    let texts: Vec<&str> = items
        .iter()
        .map(|item| item.children()[0].children()[0].text_str())
        .collect();
    assert_eq!(texts, vec!["Todo", "Done"]);
}

#[rstest]
#[case("https://acme.atlassian.net/browse/PROJ-123", LinkKind::Inline)]
#[case("https://acme.atlassian.net/wiki/spaces/DOC/pages/123", LinkKind::Block)]
#[case("https://example.com", LinkKind::Link)]
fn builtin_classification(#[case] url: &str, #[case] expected: LinkKind) {
    assert_eq!(classify(url), expected);
    assert_eq!(SmartLinkPolicy::default().classify(url), expected);
}

#[test]
fn table_serializes_to_three_lines() {
    let markdown = "| A | B |\n| --- | --- |\n| 1 | 2 |";
    let doc = markdown_to_adf(markdown, &MarkdownToAdfOptions::default());
    let markdown = render_document(&doc, &AdfToMarkdownOptions::default()).unwrap();
    let lines: Vec<&str> = markdown.lines().collect();
    assert_eq!(lines, vec!["| A | B |", "| --- | --- |", "| 1 | 2 |"]);
}

#[test]
fn custom_policies_flow_through_both_directions() {
    let options = MarkdownToAdfOptions {
        mentions: MentionResolver::custom(|name| {
            (name == "ann").then(|| MentionInfo {
                id: "acc-ann".into(),
                text: "Ann Lee".into(),
            })
        }),
        ..Default::default()
    };
    let doc = markdown_to_adf("ping @ann and @bob", &options);

    let value = serde_json::to_value(&doc.content[0]).unwrap();
    assert_eq!(
        value,
        json!({
            "type": "paragraph",
            "content": [
                {"type": "text", "text": "ping "},
                {"type": "mention", "attrs": {"id": "acc-ann", "text": "Ann Lee"}},
                {"type": "text", "text": " and "},
                {"type": "text", "text": "@bob"}
            ]
        })
    );

    let back = AdfToMarkdownOptions {
        mentions: MentionFormatter::Linked,
    };
    assert_eq!(
        render_document(&doc, &back).unwrap(),
        "ping @[Ann Lee](acc-ann) and @bob"
    );
}

#[test]
fn image_becomes_media_single() {
    let doc = markdown_to_adf("![Logo](https://x.io/logo.png)", &MarkdownToAdfOptions::default());
    let value = serde_json::to_value(&doc.content[0]).unwrap();
    let media_single = &value["content"][0];
    assert_eq!(media_single["type"], "mediaSingle");
    assert_eq!(media_single["attrs"]["layout"], "center");
    assert_eq!(media_single["content"][0]["attrs"]["url"], "https://x.io/logo.png");
    assert_eq!(media_single["content"][0]["attrs"]["alt"], "Logo");
}

#[test]
fn image_beside_text_survives_round_trip() {
    assert_eq!(
        round_trip("Our ![Logo](https://x.io/logo.png) here"),
        "Our ![Logo](https://x.io/logo.png) here"
    );
}

#[test]
fn ordered_list_starting_at_u64_max_renders() {
    let adf = json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "orderedList",
            "attrs": {"order": u64::MAX},
            "content": [
                {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "a"}]}]},
                {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "b"}]}]}
            ]
        }]
    });
    let markdown = adf_to_markdown(&adf, &AdfToMarkdownOptions::default()).unwrap();
    let lines: Vec<&str> = markdown.lines().collect();
    assert_eq!(lines, vec!["18446744073709551615. a", "18446744073709551615. b"]);
}

#[test]
fn huge_colspan_renders_a_bounded_row() {
    let adf = json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "table",
            "content": [
                {"type": "tableRow", "content": [
                    {"type": "tableCell", "attrs": {"colspan": 4611686018427387904u64}, "content": [{"type": "paragraph", "content": [{"type": "text", "text": "x"}]}]}
                ]}
            ]
        }]
    });
    let markdown = adf_to_markdown(&adf, &AdfToMarkdownOptions::default()).unwrap();
    let first = markdown.lines().next().unwrap();
    assert!(first.starts_with("| x |"));
    assert!(first.len() < 1024);
}

#[test]
fn emoji_shortnames_convert_and_render_as_glyphs() {
    let doc = markdown_to_adf("ship it :rocket: :notanemoji:", &MarkdownToAdfOptions::default());
    let children = doc.content[0].children();
    assert!(
        children
            .iter()
            .any(|n| n.is(types::EMOJI) && n.attr_str("shortName") == Some(":rocket:"))
    );

    let markdown = render_document(&doc, &AdfToMarkdownOptions::default()).unwrap();
    assert_eq!(markdown, "ship it \u{1F680} :notanemoji:");
}
