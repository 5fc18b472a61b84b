//! Editable input forms, one per target system.
//!
//! A form is an ordered list of fields. It only collects text; turning it
//! into a validated input is the core library's job, so `to_raw` never
//! rejects anything.

use prpilot_core::model::{
    Environment, HttpMethod, RawGatewayRoute, RawInput, RawPolicyRoute, RawTopic,
    DEFAULT_RETENTION_MS, POLICY_NAMESPACES, RETENTION_PRESETS,
};
use prpilot_core::TargetSystemKind;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    /// Digits only; parsed when the form is submitted.
    Number(String),
    Choice {
        options: Vec<String>,
        selected: usize,
    },
    Methods {
        enabled: Vec<(HttpMethod, bool)>,
        cursor: usize,
    },
    Tags {
        tags: Vec<String>,
        draft: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub value: FieldValue,
}

impl Field {
    fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            value: FieldValue::Text(String::new()),
        }
    }

    fn number(key: &'static str, label: &'static str, value: i64) -> Self {
        Self {
            key,
            label,
            value: FieldValue::Number(value.to_string()),
        }
    }

    fn choice(key: &'static str, label: &'static str, options: Vec<String>, selected: usize) -> Self {
        Self {
            key,
            label,
            value: FieldValue::Choice { options, selected },
        }
    }

    fn methods() -> Self {
        let enabled = HttpMethod::all()
            .into_iter()
            .map(|m| (m, m == HttpMethod::Get))
            .collect();
        Self {
            key: "methods",
            label: "HTTP Methods",
            value: FieldValue::Methods { enabled, cursor: 0 },
        }
    }

    fn tags(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            value: FieldValue::Tags {
                tags: Vec::new(),
                draft: String::new(),
            },
        }
    }

    /// One-line rendering of the current value.
    pub fn display(&self) -> String {
        match &self.value {
            FieldValue::Text(s) | FieldValue::Number(s) => s.clone(),
            FieldValue::Choice { options, selected } => options
                .get(*selected)
                .map(|o| format!("< {} >", o))
                .unwrap_or_default(),
            FieldValue::Methods { enabled, .. } => enabled
                .iter()
                .map(|(m, on)| if *on { format!("[x] {}", m.as_str()) } else { format!("[ ] {}", m.as_str()) })
                .collect::<Vec<_>>()
                .join("  "),
            FieldValue::Tags { tags, draft } => {
                let mut parts: Vec<String> = tags.iter().map(|t| format!("[{}]", t)).collect();
                parts.push(draft.clone());
                parts.join(" ")
            }
        }
    }
}

fn environment_choice() -> Field {
    let options = Environment::all().iter().map(|e| e.as_str().to_string()).collect();
    Field::choice("environment", "Environment", options, 0)
}

fn retention_choice() -> Field {
    let options = RETENTION_PRESETS.iter().map(|(label, _)| label.to_string()).collect();
    let selected = RETENTION_PRESETS
        .iter()
        .position(|(_, ms)| *ms == DEFAULT_RETENTION_MS)
        .unwrap_or(0);
    Field::choice("retentionMs", "Retention", options, selected)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub kind: TargetSystemKind,
    pub fields: Vec<Field>,
    pub selected: usize,
}

impl Form {
    pub fn new(kind: TargetSystemKind) -> Self {
        let fields = match kind {
            TargetSystemKind::MessageTopic => vec![
                Field::text("topicName", "Topic Name"),
                Field::number("partitions", "Partitions", 3),
                Field::number("replicationFactor", "Replication Factor", 3),
                retention_choice(),
                environment_choice(),
                Field::text("description", "Description"),
            ],
            TargetSystemKind::GatewayRoute => vec![
                Field::text("serviceName", "Service Name"),
                Field::text("routePath", "Route Path"),
                Field::methods(),
                Field::tags("hosts", "Hosts"),
                Field::tags("tags", "Tags"),
                environment_choice(),
                Field::text("description", "Description"),
            ],
            TargetSystemKind::PolicyRoute => vec![
                Field::text("routeName", "Route Name"),
                Field::choice(
                    "namespace",
                    "Namespace",
                    POLICY_NAMESPACES.iter().map(|n| n.to_string()).collect(),
                    0,
                ),
                Field::methods(),
                Field::text("publicPath", "Public Path"),
                Field::text("privatePath", "Private Path"),
                environment_choice(),
                Field::text("description", "Description"),
            ],
        };
        Self {
            kind,
            fields,
            selected: 0,
        }
    }

    pub fn current(&self) -> Option<&Field> {
        self.fields.get(self.selected)
    }

    /// Footer help for the focused field.
    pub fn key_hint(&self) -> &'static str {
        match self.current().map(|f| &f.value) {
            Some(FieldValue::Tags { .. }) => {
                "Type entry | Enter add | Backspace remove last | Up/Down field | Ctrl+G generate"
            }
            Some(FieldValue::Methods { .. }) => {
                "Left/Right method | Space toggle | Up/Down field | Enter generate"
            }
            Some(FieldValue::Choice { .. }) => "Left/Right choose | Up/Down field | Enter generate",
            _ => "Up/Down field | Enter generate | Ctrl+G generate | Esc chat",
        }
    }

    fn current_mut(&mut self) -> Option<&mut FieldValue> {
        self.fields.get_mut(self.selected).map(|f| &mut f.value)
    }

    pub fn select_next(&mut self) {
        if !self.fields.is_empty() {
            self.selected = (self.selected + 1) % self.fields.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.fields.is_empty() {
            self.selected = (self.selected + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn input_char(&mut self, c: char) {
        match self.current_mut() {
            Some(FieldValue::Text(s)) => s.push(c),
            Some(FieldValue::Number(s)) if c.is_ascii_digit() => s.push(c),
            Some(FieldValue::Tags { draft, .. }) => draft.push(c),
            Some(FieldValue::Methods { enabled, cursor }) if c == ' ' => {
                if let Some((_, on)) = enabled.get_mut(*cursor) {
                    *on = !*on;
                }
            }
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.current_mut() {
            Some(FieldValue::Text(s)) | Some(FieldValue::Number(s)) => {
                s.pop();
            }
            Some(FieldValue::Tags { tags, draft }) => {
                if draft.is_empty() {
                    tags.pop();
                } else {
                    draft.pop();
                }
            }
            _ => {}
        }
    }

    pub fn left(&mut self) {
        match self.current_mut() {
            Some(FieldValue::Choice { options, selected }) if !options.is_empty() => {
                *selected = (*selected + options.len() - 1) % options.len();
            }
            Some(FieldValue::Methods { cursor, .. }) => *cursor = cursor.saturating_sub(1),
            _ => {}
        }
    }

    pub fn right(&mut self) {
        match self.current_mut() {
            Some(FieldValue::Choice { options, selected }) if !options.is_empty() => {
                *selected = (*selected + 1) % options.len();
            }
            Some(FieldValue::Methods { enabled, cursor }) => {
                *cursor = (*cursor + 1).min(enabled.len().saturating_sub(1));
            }
            _ => {}
        }
    }

    /// Commit a tag draft. Returns false when the focused field does not
    /// take Enter, so the caller can treat it as "submit".
    pub fn enter(&mut self) -> bool {
        match self.current_mut() {
            Some(FieldValue::Tags { tags, draft }) => {
                let tag = draft.trim().to_string();
                if !tag.is_empty() && !tags.contains(&tag) {
                    tags.push(tag);
                }
                draft.clear();
                true
            }
            _ => false,
        }
    }

    fn value(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    fn text(&self, key: &str) -> String {
        match self.value(key) {
            Some(FieldValue::Text(s)) => s.clone(),
            Some(FieldValue::Choice { options, selected }) => {
                options.get(*selected).cloned().unwrap_or_default()
            }
            _ => String::new(),
        }
    }

    /// An unparsable number becomes 0, which validation then rejects.
    fn number(&self, key: &str) -> i64 {
        match self.value(key) {
            Some(FieldValue::Number(s)) => s.parse().unwrap_or(0),
            _ => 0,
        }
    }

    fn list(&self, key: &str) -> Vec<String> {
        match self.value(key) {
            Some(FieldValue::Tags { tags, draft }) => {
                // A pending draft counts as an entry.
                let mut tags = tags.clone();
                let draft = draft.trim();
                if !draft.is_empty() && !tags.iter().any(|t| t == draft) {
                    tags.push(draft.to_string());
                }
                tags
            }
            _ => Vec::new(),
        }
    }

    fn methods(&self) -> Vec<String> {
        match self.value("methods") {
            Some(FieldValue::Methods { enabled, .. }) => enabled
                .iter()
                .filter(|(_, on)| *on)
                .map(|(m, _)| m.as_str().to_string())
                .collect(),
            _ => Vec::new(),
        }
    }

    fn retention_ms(&self) -> i64 {
        match self.value("retentionMs") {
            Some(FieldValue::Choice { selected, .. }) => RETENTION_PRESETS
                .get(*selected)
                .map(|(_, ms)| *ms as i64)
                .unwrap_or(DEFAULT_RETENTION_MS as i64),
            _ => DEFAULT_RETENTION_MS as i64,
        }
    }

    pub fn to_raw(&self) -> RawInput {
        match self.kind {
            TargetSystemKind::MessageTopic => RawInput::Topic(RawTopic {
                topic_name: self.text("topicName"),
                partitions: self.number("partitions"),
                replication_factor: self.number("replicationFactor"),
                retention_ms: self.retention_ms(),
                environment: self.text("environment"),
                description: self.text("description"),
            }),
            TargetSystemKind::GatewayRoute => RawInput::GatewayRoute(RawGatewayRoute {
                service_name: self.text("serviceName"),
                route_path: self.text("routePath"),
                methods: self.methods(),
                hosts: self.list("hosts"),
                tags: self.list("tags"),
                environment: self.text("environment"),
                description: self.text("description"),
            }),
            TargetSystemKind::PolicyRoute => RawInput::PolicyRoute(RawPolicyRoute {
                route_name: self.text("routeName"),
                namespace: self.text("namespace"),
                methods: self.methods(),
                public_path: self.text("publicPath"),
                private_path: self.text("privatePath"),
                environment: self.text("environment"),
                description: self.text("description"),
            }),
        }
    }
}
