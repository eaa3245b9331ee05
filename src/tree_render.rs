//! ASCII tree rendering for entity collections.

use serde_yaml::Value;

use crate::models::{Collection, LeafRecord};

/// What to draw below each record.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Draw each record's fields as a third level of `key: value` leaves.
    pub fields: bool,
}

struct Branch {
    label: String,
    children: Vec<Branch>,
}

/// Render a collection as ASCII art, one root per group.
///
/// Example output:
/// ```text
/// Rebel Alliance
/// ├── X-Wing (T-65B)
/// │   ├── ship_class: Starfighter
/// │   └── length_meters: 12.5
/// └── YT-1300 Light Freighter
/// ```
pub fn render_tree(collection: &Collection, options: RenderOptions) -> String {
    let mut output = String::new();
    let roots: Vec<Branch> = collection
        .groups
        .iter()
        .map(|(name, group)| Branch {
            label: name.clone(),
            children: group
                .records
                .iter()
                .map(|(name, record)| record_branch(name, record, options))
                .collect(),
        })
        .collect();

    for (i, root) in roots.iter().enumerate() {
        let is_last = i == roots.len() - 1;
        render_node(&mut output, root, "", is_last, true);
    }
    output
}

fn record_branch(name: &str, record: &LeafRecord, options: RenderOptions) -> Branch {
    let children = if options.fields {
        record
            .fields
            .iter()
            .map(|(key, value)| Branch {
                label: format!("{}: {}", key, format_value(value)),
                children: Vec::new(),
            })
            .collect()
    } else {
        Vec::new()
    };
    Branch {
        label: name.to_string(),
        children,
    }
}

/// Inline form of a field value: scalars as-is, collections bracketed.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "~".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", format_value(k), format_value(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, format_value(&tagged.value)),
    }
}

/// Recursively render a node and its children.
fn render_node(output: &mut String, node: &Branch, prefix: &str, is_last: bool, is_root: bool) {
    if is_root {
        // Root nodes: just the label (no branch characters)
        output.push_str(&node.label);
        output.push('\n');
    } else {
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);
        output.push_str(&node.label);
        output.push('\n');
    }

    let child_prefix = if is_root {
        String::new()
    } else {
        let continuation = if is_last { "    " } else { "│   " };
        format!("{}{}", prefix, continuation)
    };

    for (i, child) in node.children.iter().enumerate() {
        let child_is_last = i == node.children.len() - 1;
        render_node(output, child, &child_prefix, child_is_last, false);
    }
}
