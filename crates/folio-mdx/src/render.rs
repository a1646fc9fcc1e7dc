//! HTML serialization of document trees.

use crate::tree::{Document, Element, Node, PropertyValue};

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link", "source", "wbr"];

/// Render a document tree to an HTML string.
pub fn render_html(doc: &Document) -> String {
    let mut out = String::new();
    for node in &doc.children {
        write_node(&mut out, node);
    }
    out
}

/// Render a single node to an HTML string.
pub fn render_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text { value } => escape_into(out, value, false),
        Node::Raw { value } => out.push_str(value),
        Node::Element(el) => write_element(out, el),
    }
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.tag);

    for (name, value) in &el.properties {
        match value {
            PropertyValue::Bool(false) => continue,
            PropertyValue::Bool(true) => {
                out.push(' ');
                out.push_str(name);
            }
            PropertyValue::Text(text) => {
                push_attr(out, name, text);
            }
            PropertyValue::List(list) => {
                push_attr(out, name, &list.join(" "));
            }
        }
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&el.tag.as_str()) {
        return;
    }

    for child in &el.children {
        write_node(out, child);
    }

    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape_into(out, value, true);
    out.push('"');
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_elements() {
        let doc = Document::new(vec![Element::new("p")
            .with_child(Node::text("a < b & "))
            .with_child(Element::new("em").with_child(Node::text("c")))
            .into()]);

        assert_eq!(render_html(&doc), "<p>a &lt; b &amp; <em>c</em></p>");
    }

    #[test]
    fn renders_attributes_in_key_order() {
        let el = Element::new("div")
            .with_classes(["code-block", "wide"])
            .with_attr("data-filename", "say \"hi\".ts")
            .with_flag("hidden");

        assert_eq!(
            render_node(&el.into()),
            r#"<div class="code-block wide" data-filename="say &quot;hi&quot;.ts" hidden></div>"#
        );
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let el = Element::new("img").with_attr("src", "/a.png");
        assert_eq!(render_node(&el.into()), r#"<img src="/a.png">"#);
    }

    #[test]
    fn raw_nodes_pass_through() {
        let doc = Document::new(vec![Node::raw("<aside>kept</aside>")]);
        assert_eq!(render_html(&doc), "<aside>kept</aside>");
    }
}
