//! Property reflection
//!
//! Maps IDL-style property names (`className`, `textContent`, `hidden`, ...)
//! onto the attribute or child list they reflect. Unknown names fall back to
//! plain attributes.

use serde_json::Value;

use crate::{DomResult, DomTree, NodeId};

/// Properties reflected under a different attribute name
const RENAMED: &[(&str, &str)] = &[
    ("className", "class"),
    ("htmlFor", "for"),
    ("tabIndex", "tabindex"),
    ("accessKey", "accesskey"),
    ("contentEditable", "contenteditable"),
];

/// Properties reflected as presence-only attributes
const BOOLEAN: &[(&str, &str)] = &[
    ("hidden", "hidden"),
    ("disabled", "disabled"),
    ("checked", "checked"),
    ("selected", "selected"),
    ("required", "required"),
    ("multiple", "multiple"),
    ("autofocus", "autofocus"),
    ("readOnly", "readonly"),
    ("open", "open"),
];

/// Whether the name is a property the host knows natively
pub(crate) fn is_native(name: &str) -> bool {
    matches!(name, "textContent" | "innerText" | "dataset" | "style")
        || RENAMED.iter().any(|(prop, _)| *prop == name)
        || BOOLEAN.iter().any(|(prop, _)| *prop == name)
        || matches!(
            name,
            "id" | "title" | "lang" | "dir" | "href" | "src" | "alt" | "name" | "value"
                | "placeholder" | "type" | "rel" | "target" | "action" | "method" | "role"
        )
}

/// String form used when a value lands in an attribute. `null` has none.
pub fn attribute_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Assign one property to a node
pub(crate) fn assign(tree: &mut DomTree, node: NodeId, name: &str, value: &Value) -> DomResult<()> {
    if value.is_null() {
        return Ok(());
    }
    match name {
        "textContent" | "innerText" => {
            let text = attribute_value(value).unwrap_or_default();
            return tree.set_text_content(node, &text);
        }
        "dataset" => {
            if let Value::Object(entries) = value {
                for (key, entry) in entries {
                    if let Some(text) = attribute_value(entry) {
                        tree.set_attribute(node, &format!("data-{}", kebab_case(key)), &text)?;
                    }
                }
            }
            return Ok(());
        }
        _ => {}
    }

    if let Some((_, attr)) = BOOLEAN.iter().find(|(prop, _)| *prop == name) {
        let on = match value {
            Value::Bool(b) => *b,
            Value::String(s) => !s.is_empty(),
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            _ => true,
        };
        return if on {
            tree.set_attribute(node, attr, "")
        } else {
            tree.remove_attribute(node, attr)
        };
    }

    let attr = RENAMED
        .iter()
        .find(|(prop, _)| *prop == name)
        .map_or(name, |(_, attr)| *attr);
    if !is_native(name) {
        tracing::trace!(%node, name, "no native property, assigning attribute");
    }
    match attribute_value(value) {
        Some(text) => tree.set_attribute(node, attr, &text),
        None => Ok(()),
    }
}

fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
