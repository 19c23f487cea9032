use super::*;

#[test]
fn test_document() {
    let i = r#"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8"/>
        <title>The minimal, valid HTML5 document</title>
    </head>
    <body>
        <!-- User-visible content goes in the body -->
        <p>Some paragraph</p>
        Some untagged text
    </body>
</html>"#;
    let doc = document(i).unwrap();
    let top = doc.top_level();
    assert_eq!(top.len(), 2);
    assert_eq!(top.get(0).unwrap().tag_name(), Some("!DOCTYPE"));

    let html = top.get(1).unwrap();
    assert_eq!(html.tag_name(), Some("html"));
    assert_eq!(html.attributes(), Some(&attributes!("lang" => "en")));

    let parts: Vec<_> = html.children().collect();
    assert_eq!(parts.len(), 2);
    let (head, body) = (parts[0], parts[1]);

    let head_children: Vec<_> = head.children().collect();
    assert_eq!(head_children[0].tag_name(), Some("meta"));
    assert_eq!(head_children[0].attributes(), Some(&attributes!("charset" => "utf-8")));
    assert!(head_children[0].child_list().is_none());
    assert_eq!(head_children[1].text_content(), "The minimal, valid HTML5 document");

    let body_children: Vec<_> = body.children().collect();
    assert_eq!(body_children.len(), 3);
    assert_eq!(
        body_children[0].as_text(),
        Some("<!-- User-visible content goes in the body -->")
    );
    assert_eq!(body_children[1].outer_html(), "<p>Some paragraph</p>");
    assert_eq!(body_children[2].as_text(), Some("Some untagged text"));
}

#[test]
fn test_single_node_or_list() {
    let doc = document("<p>one</p>").unwrap();
    assert!(doc.content().as_node().is_some());

    let doc = document("<p>one</p><p>two</p>").unwrap();
    assert_eq!(doc.content().as_list().map(|l| l.len()), Some(2));

    let doc = document("just text").unwrap();
    assert_eq!(doc.content().as_node().and_then(|n| n.as_text()), Some("just text"));

    // Whitespace only trims down to nothing
    let doc = document("   ").unwrap();
    assert_eq!(doc.content().as_list().map(|l| l.len()), Some(0));
    assert!(doc.is_empty());
}

#[test]
fn test_derived_views() {
    let doc = document(
        r#"<div class="card  wide" data-user-id="7" data-flag id="main"><span>a</span>b<i>c</i></div>"#,
    )
    .unwrap();
    let div = doc.content().as_node().unwrap();

    let classes = div.classes();
    assert!(classes.contains("card"));
    assert!(classes.contains("wide"));
    assert!(classes.contains(""));
    assert_eq!(classes.len(), 3);

    let dataset = div.dataset();
    assert_eq!(dataset.get("userId").map(String::as_str), Some("7"));
    assert_eq!(dataset.get("flag").map(String::as_str), Some(""));
    assert_eq!(dataset.len(), 2);

    assert_eq!(div.text_content(), "abc");
    assert_eq!(div.child().and_then(|c| c.tag_name()), Some("span"));
    assert_eq!(div.attr("id").map(ToString::to_string), Some("main".to_string()));
    assert_eq!(div.attr("data-flag").map(ToString::to_string), Some("true".to_string()));
}

#[test]
fn test_malformed_markup_never_fails() {
    for data in [
        "<",
        "<div",
        "</p>",
        "<a href=\"unterminated",
        "<<>>",
        "text & more &#",
        "<p>&amp</p>",
        "<!-- never closed",
        "<script>never closed",
        "<div/ class=x>",
    ] {
        assert!(document(data).is_ok(), "{}", data);
    }
}

#[test]
fn test_unicode_text() {
    let doc = document("<p>Grüße &eacute; · 日本語</p>").unwrap();
    assert_eq!(doc.content().text_content(), "Grüße é · 日本語");
}
