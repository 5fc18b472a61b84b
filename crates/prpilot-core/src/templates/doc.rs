//! A small typed YAML document builder.
//!
//! Templates assemble a tree of [`Node`]s and [`render`] turns it into text.
//! Keys are static, so only values need escaping: free-text values are
//! emitted plain when they cannot be misread as anything but a string, and
//! double-quoted otherwise. Literal lists use flow style (`["GET", "POST"]`).

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Plain if unambiguous, quoted otherwise.
    Str(String),
    /// Always double-quoted.
    Quoted(String),
    Int(u64),
    Bool(bool),
    /// Flow sequence of quoted strings.
    Flow(Vec<String>),
    /// Block sequence.
    Seq(Vec<Node>),
    Map(Vec<(&'static str, Node)>),
}

pub fn map(entries: Vec<(&'static str, Node)>) -> Node {
    Node::Map(entries)
}

pub fn string(value: impl Into<String>) -> Node {
    Node::Str(value.into())
}

pub fn quoted(value: impl Into<String>) -> Node {
    Node::Quoted(value.into())
}

pub fn flow<I, S>(items: I) -> Node
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Node::Flow(items.into_iter().map(Into::into).collect())
}

/// Render a document. The root is expected to be a mapping; any other node
/// renders as a single scalar line.
pub fn render(root: &Node) -> String {
    let mut out = String::new();
    match root {
        Node::Map(entries) if !entries.is_empty() => write_entries(&mut out, entries, 0),
        other => {
            out.push_str(&inline(other));
            out.push('\n');
        }
    }
    out
}

fn write_entries(out: &mut String, entries: &[(&'static str, Node)], indent: usize) {
    for (key, value) in entries {
        write_entry(out, key, value, indent);
    }
}

fn write_entry(out: &mut String, key: &str, value: &Node, indent: usize) {
    let pad = " ".repeat(indent);
    match value {
        Node::Map(children) if !children.is_empty() => {
            out.push_str(&format!("{}{}:\n", pad, key));
            write_entries(out, children, indent + 2);
        }
        Node::Seq(items) if !items.is_empty() => {
            out.push_str(&format!("{}{}:\n", pad, key));
            for item in items {
                write_item(out, item, indent + 2);
            }
        }
        scalar => out.push_str(&format!("{}{}: {}\n", pad, key, inline(scalar))),
    }
}

fn write_item(out: &mut String, item: &Node, indent: usize) {
    let pad = " ".repeat(indent);
    match item {
        Node::Map(children) if !children.is_empty() => {
            // Render the mapping one level deeper, then put the "- " marker
            // in the first line's leading whitespace.
            let mut nested = String::new();
            write_entries(&mut nested, children, indent + 2);
            out.push_str(&pad);
            out.push_str("- ");
            out.push_str(&nested[indent + 2..]);
        }
        Node::Seq(items) if !items.is_empty() => {
            out.push_str(&format!("{}-\n", pad));
            for nested in items {
                write_item(out, nested, indent + 2);
            }
        }
        scalar => out.push_str(&format!("{}- {}\n", pad, inline(scalar))),
    }
}

fn inline(node: &Node) -> String {
    match node {
        Node::Str(s) => scalar(s),
        Node::Quoted(s) => quote(s),
        Node::Int(n) => n.to_string(),
        Node::Bool(b) => b.to_string(),
        Node::Flow(items) => {
            let items: Vec<String> = items.iter().map(|s| quote(s)).collect();
            format!("[{}]", items.join(", "))
        }
        Node::Seq(_) => "[]".to_string(),
        Node::Map(_) => "{}".to_string(),
    }
}

/// JSON string escaping is a subset of YAML double-quoted escaping. JSON
/// leaves some characters raw that a YAML reader rejects or folds as line
/// breaks, so those get a `\uXXXX` escape on top.
fn quote(s: &str) -> String {
    let json = serde_json::Value::String(s.to_string()).to_string();
    if !json.chars().any(needs_yaml_escape) {
        return json;
    }
    let mut out = String::with_capacity(json.len() + 8);
    for c in json.chars() {
        if needs_yaml_escape(c) {
            out.push_str(&format!("\\u{:04X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

/// Outside the YAML `c-printable` set, or one of the non-ASCII line breaks.
fn needs_yaml_escape(c: char) -> bool {
    let printable = matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{7E}'
        | '\u{A0}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}');
    !printable || matches!(c, '\u{2028}' | '\u{2029}')
}

fn scalar(s: &str) -> String {
    if is_plain_safe(s) {
        s.to_string()
    } else {
        quote(s)
    }
}

/// Words a YAML 1.1 or 1.2 reader may resolve to a bool or null.
const RESERVED: [&str; 12] = [
    "true", "false", "yes", "no", "on", "off", "y", "n", "null", "nan", "inf", "infinity",
];

fn is_plain_safe(s: &str) -> bool {
    let starts_with_letter = matches!(s.chars().next(), Some(c) if c.is_ascii_alphabetic());
    starts_with_letter
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/'))
        && !RESERVED.contains(&s.to_ascii_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_maps_and_scalars() {
        let doc = map(vec![
            ("kind", string("KafkaTopic")),
            ("spec", map(vec![("partitions", Node::Int(3)), ("enabled", Node::Bool(true))])),
        ]);
        assert_eq!(render(&doc), "kind: KafkaTopic\nspec:\n  partitions: 3\n  enabled: true\n");
    }

    #[test]
    fn test_flow_sequences() {
        let doc = map(vec![
            ("methods", flow(["GET", "POST"])),
            ("hosts", flow(Vec::<String>::new())),
        ]);
        assert_eq!(render(&doc), "methods: [\"GET\", \"POST\"]\nhosts: []\n");
    }

    #[test]
    fn test_block_sequence_of_maps() {
        let doc = map(vec![(
            "plugins",
            Node::Seq(vec![
                map(vec![("name", string("cors"))]),
                map(vec![
                    ("name", string("rate-limiting")),
                    ("config", map(vec![("minute", Node::Int(60))])),
                ]),
            ]),
        )]);
        let expected = "plugins:\n  - name: cors\n  - name: rate-limiting\n    config:\n      minute: 60\n";
        assert_eq!(render(&doc), expected);
        let parsed: serde_yaml::Value = serde_yaml::from_str(expected).unwrap();
        assert_eq!(parsed["plugins"][1]["config"]["minute"].as_u64(), Some(60));
    }

    #[test]
    fn test_ambiguous_strings_are_quoted() {
        assert_eq!(scalar("orders.created"), "orders.created");
        assert_eq!(scalar("/api/v1"), "\"/api/v1\"");
        assert_eq!(scalar("yes"), "\"yes\"");
        assert_eq!(scalar("123"), "\"123\"");
        assert_eq!(scalar("a: b"), "\"a: b\"");
        assert_eq!(scalar(""), "\"\"");
    }

    #[test]
    fn test_hostile_text_round_trips() {
        let nasty = "say \"hi\": #not-a-comment\nnext line\\ [x], {y}";
        let doc = map(vec![("text", string(nasty)), ("list", flow([nasty]))]);
        let parsed: serde_yaml::Value = serde_yaml::from_str(&render(&doc)).unwrap();
        assert_eq!(parsed["text"].as_str(), Some(nasty));
        assert_eq!(parsed["list"][0].as_str(), Some(nasty));
    }

    #[test]
    fn test_noncharacters_and_unicode_breaks_are_escaped() {
        let nasty = "a\u{FFFE}b\u{FFFF}c\u{85}d\u{9F}e\u{2028}f";
        assert_eq!(
            quote(nasty),
            "\"a\\uFFFEb\\uFFFFc\\u0085d\\u009Fe\\u2028f\""
        );

        let doc = map(vec![("text", string(nasty)), ("list", flow([nasty, "ok"]))]);
        let parsed: serde_yaml::Value = serde_yaml::from_str(&render(&doc)).unwrap();
        assert_eq!(parsed["text"].as_str(), Some(nasty));
        assert_eq!(parsed["list"][0].as_str(), Some(nasty));
        assert_eq!(parsed["list"][1].as_str(), Some("ok"));
    }

    #[test]
    fn test_plain_unicode_is_left_alone() {
        assert_eq!(quote("café ☕"), "\"café ☕\"");
    }
}
