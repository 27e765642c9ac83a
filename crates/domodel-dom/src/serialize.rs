//! HTML serialization (`innerHTML` / `outerHTML`)

use crate::{DomTree, NodeData, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Markup of the node's children
pub(crate) fn inner_html(tree: &DomTree, node: NodeId) -> String {
    let mut out = String::new();
    for (child, _) in tree.children(node) {
        write_node(tree, child, &mut out);
    }
    out
}

/// Markup of the node itself
pub(crate) fn outer_html(tree: &DomTree, node: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, node, &mut out);
    out
}

fn write_node(tree: &DomTree, node: NodeId, out: &mut String) {
    let Some(current) = tree.get(node) else { return };
    match &current.data {
        NodeData::Document | NodeData::Fragment => {
            for (child, _) in tree.children(node) {
                write_node(tree, child, out);
            }
        }
        NodeData::Text(text) => escape_into(text, false, out),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Element(elem) => {
            out.push('<');
            out.push_str(&elem.tag_name);
            for attr in &elem.attrs {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape_into(&attr.value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&elem.tag_name.as_str()) {
                return;
            }
            for (child, _) in tree.children(node) {
                write_node(tree, child, out);
            }
            out.push_str("</");
            out.push_str(&elem.tag_name);
            out.push('>');
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}
