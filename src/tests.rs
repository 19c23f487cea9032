use std::ops::ControlFlow;

use super::*;
use crate::select::FindMatches;

fn ids<'a>(nodes: &[NodeRef<'a>]) -> Vec<String> {
    nodes
        .iter()
        .map(|node| node.attr("id").map(ToString::to_string).unwrap_or_default())
        .collect()
}

fn select_ids(data: &str, selector: &str) -> Vec<String> {
    let doc = parse(data).unwrap();
    ids(&select(&doc, selector).unwrap())
}

#[test]
fn test_outer_level_before_subtrees() {
    let doc = parse("<div><div>A</div><div>B</div></div>").unwrap();
    let divs = select(&doc, "div").unwrap();
    let texts: Vec<_> = divs.iter().map(|div| div.text_content()).collect();
    assert_eq!(texts, ["AB", "A", "B"]);

    let data = r#"<div id="a"><p id="a1"><span id="a11"></span></p><span id="a2"></span></div>
        <span id="b"><span id="b1"></span></span>"#;
    assert_eq!(select_ids(data, "span"), ["b", "a2", "a11", "b1"]);
}

#[test]
fn test_nth_child() {
    let data = r#"<ul><li id="1"></li><li id="2"></li><li id="3"></li><li id="4"></li><li id="5"></li></ul>"#;
    assert_eq!(select_ids(data, "li:nth-child(2n+1)"), ["1", "3", "5"]);
    assert_eq!(select_ids(data, "li:nth-child(odd)"), ["1", "3", "5"]);
    assert_eq!(select_ids(data, "li:nth-child(even)"), ["2", "4"]);
    assert_eq!(select_ids(data, "li:nth-child(-n + 2)"), ["1", "2"]);
    assert_eq!(select_ids(data, "li:nth-last-child(2)"), ["4"]);
    assert_eq!(select_ids(data, "li:nth-child(7)"), Vec::<String>::new());
    assert_eq!(select_ids(data, "li:first-child, li:last-child"), ["1", "5"]);
}

#[test]
fn test_text_nodes_do_not_count_as_children() {
    let data = r#"<p>lead <b id="x">one</b> tail <i id="y">two</i></p>"#;
    assert_eq!(select_ids(data, "p :first-child"), ["x"]);
    assert_eq!(select_ids(data, "i:last-child"), ["y"]);
    assert_eq!(select_ids(data, "b:only-child"), Vec::<String>::new());
}

#[test]
fn test_attribute_operators() {
    let data = r#"
        <a id="1" href="http://example.com/index.html">x</a>
        <a id="2" href="/local.html">x</a>
        <a id="3" href="https://example.com/">x</a>
        <a id="4">x</a>"#;
    assert_eq!(select_ids(data, r#"a[href^="http"]"#), ["1", "3"]);
    assert_eq!(select_ids(data, r#"a[href$=".html"]"#), ["1", "2"]);
    assert_eq!(select_ids(data, "a[href*=example]"), ["1", "3"]);
    assert_eq!(select_ids(data, "a[href]"), ["1", "2", "3"]);
    assert_eq!(select_ids(data, "a[href=/local.html]"), ["2"]);
}

#[test]
fn test_word_attribute_operators() {
    let data = r#"
        <p id="1" lang="en-US" class="note wide"></p>
        <p id="2" lang="english" class="widescreen"></p>
        <p id="3" lang="en" class="x-wide"></p>"#;
    assert_eq!(select_ids(data, "[lang|=en]"), ["1", "3"]);
    assert_eq!(select_ids(data, "[class~=wide]"), ["1", "3"]);
    assert_eq!(select_ids(data, "p.wide"), ["1"]);
    assert_eq!(select_ids(data, "p.note.wide#1"), ["1"]);
}

#[test]
fn test_boolean_attributes() {
    let data = r#"<input id="a" disabled><input id="b" disabled="disabled"><input id="c">"#;
    assert_eq!(select_ids(data, "[disabled]"), ["a", "b"]);
    assert_eq!(select_ids(data, "[disabled=disabled]"), ["b"]);
    assert_eq!(select_ids(data, "input:disabled"), ["a", "b"]);

    let doc = parse(data).unwrap();
    assert_eq!(select_attribute_value(&doc, "#a", "disabled").unwrap(), "true");
    assert_eq!(select_attribute_value(&doc, "#b", "disabled").unwrap(), "disabled");
    assert_eq!(select_attribute_value(&doc, "#c", "disabled").unwrap(), "");
    assert_eq!(select_attribute_value(&doc, "#z", "id").unwrap(), "");
}

#[test]
fn test_child_and_descendant() {
    let data = r#"<div><section><p id="deep">x</p></section><p id="direct">y</p></div>"#;
    assert_eq!(select_ids(data, "div > p"), ["direct"]);
    assert_eq!(select_ids(data, "div p"), ["direct", "deep"]);
    assert_eq!(select_ids(data, "div>section>p"), ["deep"]);
    assert_eq!(select_ids(data, "section p"), ["deep"]);
}

#[test]
fn test_sibling_combinators() {
    let data = r#"<h1>t</h1><p id="1"></p><p id="2"></p><div><h1>u</h1>text<p id="3"></p></div>"#;
    assert_eq!(select_ids(data, "h1 + p"), ["1"]);
    assert_eq!(select_ids(data, "h1 ~ p"), ["1", "2", "3"]);
    // Only the node right after counts, even when it is text
    assert_eq!(select_ids(data, "div h1 + p"), Vec::<String>::new());
}

#[test]
fn test_union_keeps_alternative_order() {
    let data = r#"<b id="1"></b><i id="2"></i><b id="3"></b>"#;
    assert_eq!(select_ids(data, "i, b"), ["2", "1", "3"]);
    // No deduplication between alternatives
    assert_eq!(select_ids(data, "b, #1"), ["1", "3", "1"]);
}

#[test]
fn test_of_type_counts_compound_matches() {
    let data = r#"<div><p id="1" class="x"></p><span id="2" class="x"></span><p id="3"></p><p id="4" class="x"></p></div>"#;
    assert_eq!(select_ids(data, "p:first-of-type"), ["1"]);
    assert_eq!(select_ids(data, "p:last-of-type"), ["4"]);
    assert_eq!(select_ids(data, ".x:nth-of-type(2)"), ["2"]);
    assert_eq!(select_ids(data, "p.x:nth-last-of-type(1)"), ["4"]);
    assert_eq!(select_ids(data, "span:only-of-type"), ["2"]);
}

#[test]
fn test_state_pseudo_classes() {
    let data = r#"<form>
        <input id="c1" type="checkbox" checked>
        <input id="c2" type="checkbox" indeterminate>
        <input id="t" type="text" required>
        <input id="r1" type="radio" name="g"><input id="r2" type="radio" name="g">
        <input id="s1" type="radio" name="h"><input id="s2" type="radio" name="h" checked>
        <progress id="p1"></progress><progress id="p2" value="3" max="10"></progress>
    </form>"#;
    assert_eq!(select_ids(data, ":checked"), ["c1", "s2"]);
    assert_eq!(select_ids(data, "input:required"), ["t"]);
    assert_eq!(select_ids(data, "input:optional").len(), 6);
    assert_eq!(select_ids(data, ":indeterminate"), ["c2", "r1", "r2", "p1"]);
}

#[test]
fn test_empty_and_root() {
    let data = r#"<div id="a"><p id="b"> <!-- note --> </p><p id="c">x</p><p id="d"></p><br id="e"></div>"#;
    let options = ParseOptions {
        trim_text: false,
        ..ParseOptions::default()
    };
    let doc = parse_with_options(data, &options).unwrap();
    assert_eq!(ids(&select(&doc, ":empty").unwrap()), ["b", "d", "e"]);
    assert_eq!(ids(&select(&doc, ":root").unwrap()), ["a"]);
}

#[test]
fn test_select_first_and_text() {
    let doc = parse(r#"<ul><li>one</li><li>two &amp; three</li></ul>"#).unwrap();
    let first = select_first(&doc, "li").unwrap().unwrap();
    assert_eq!(first.text_content(), "one");
    assert!(select_first(&doc, "ol").unwrap().is_none());
    assert_eq!(select_text_content(&doc, "li + li").unwrap(), "two & three");
    assert_eq!(select_text_content(&doc, "table").unwrap(), "");
    assert_eq!(text_content(&doc), "onetwo & three");
}

#[test]
fn test_break_stops_the_search() {
    let doc = parse("<p></p><div><p></p><p></p></div><p></p>").unwrap();
    let selector = compile("p").unwrap();
    let mut calls = 0;
    let flow = selector.find_matches(&doc, doc.top_level().ids(), true, &mut |_: NodeId| {
        calls += 1;
        ControlFlow::Break(())
    });
    assert_eq!(flow, ControlFlow::Break(()));
    assert_eq!(calls, 1);

    let mut calls = 0;
    let flow = selector.find_matches(&doc, doc.top_level().ids(), true, &mut |_: NodeId| {
        calls += 1;
        ControlFlow::Continue(())
    });
    assert_eq!(flow, ControlFlow::Continue(()));
    assert_eq!(calls, 4);
}

#[test]
fn test_subtree_scope() {
    let doc = parse(r#"<div id="a"><p id="1"></p></div><div id="b"><p id="2"></p></div>"#).unwrap();
    let b = select_first(&doc, "#b").unwrap().unwrap();
    assert_eq!(ids(&select(b, "p").unwrap()), ["2"]);
    // The scope itself is a candidate
    assert_eq!(ids(&select(b, "div").unwrap()), ["b"]);
    let children = b.child_list().unwrap();
    assert_eq!(ids(&select(children, "p").unwrap()), ["2"]);
}

#[test]
fn test_compiled_selector_is_reusable() {
    let selector = compile("a[href]").unwrap();
    let first = parse(r#"<a href="x"></a>"#).unwrap();
    let second = parse(r#"<p><a href="y"></a><a></a></p>"#).unwrap();
    assert_eq!(selector.select(&first).len(), 1);
    assert_eq!(selector.select(&second).len(), 1);
    assert_eq!(selector.select_attribute_value(&second, "href"), "y");
}

#[test]
fn test_html_round_trip() {
    let data = r#"<div class="card"><h2>Title</h2><p>Body <a href="/x">link</a></p></div>"#;
    let options = ParseOptions {
        trim_text: false,
        ..ParseOptions::default()
    };
    let doc = parse_with_options(data, &options).unwrap();
    assert_eq!(outer_html(&doc), data);
    let p = select_first(&doc, "p").unwrap().unwrap();
    assert_eq!(inner_html(p), r#"Body <a href="/x">link</a>"#);
    assert_eq!(p.inner_html_without_attributes(), "Body <a>link</a>");
}

#[test]
fn test_comments_and_scripts_hold_no_tags() {
    let data = "<div><!-- <div id=\"ghost\"> --></div><script>document.write('<div>')</script>";
    let doc = parse(data).unwrap();
    assert_eq!(select(&doc, "div").unwrap().len(), 1);
    let script = select_first(&doc, "script").unwrap().unwrap();
    assert_eq!(script.text_content(), "document.write('<div>')");
}

#[test]
fn test_errors() {
    assert_eq!(parse("").unwrap_err(), Error::Html(html::Error::EmptyInput));
    let doc = parse("<p></p>").unwrap();
    assert_eq!(
        select(&doc, "p:hover").unwrap_err(),
        Error::Selector(SelectorError::Unsupported("hover".to_string()))
    );
    assert_eq!(
        select(&doc, "p:nth-child(n+)").unwrap_err().to_string(),
        "selector compilation failed: invalid nth formula: \"n+\""
    );
}
