//! Input and output shapes for each target system.
//!
//! Raw records (`Raw*`) are what a form or a JSON file hands us; validated
//! inputs (`*Input`) are what the generators and the remote service see.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::kind::TargetSystemKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Staging => "staging",
            Environment::Prod => "prod",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "dev" => Some(Environment::Dev),
            "staging" => Some(Environment::Staging),
            "prod" => Some(Environment::Prod),
            _ => None,
        }
    }

    pub fn all() -> Vec<Environment> {
        vec![Environment::Dev, Environment::Staging, Environment::Prod]
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn all() -> Vec<HttpMethod> {
        vec![
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete,
            HttpMethod::Patch,
            HttpMethod::Options,
            HttpMethod::Head,
        ]
    }
}

/// Named retention periods offered by the topic form, in milliseconds.
pub const RETENTION_PRESETS: [(&str, u64); 4] = [
    ("1 day", 86_400_000),
    ("3 days", 259_200_000),
    ("7 days", 604_800_000),
    ("30 days", 2_592_000_000),
];

pub const DEFAULT_RETENTION_MS: u64 = 604_800_000;

/// Namespaces offered by the Gatekeeper form. Free-form values are accepted too.
pub const POLICY_NAMESPACES: [&str; 4] = ["default", "api", "services", "auth"];

pub const MAX_PARTITIONS: i64 = 16;
pub const MAX_REPLICATION_FACTOR: i64 = 5;

// Raw records. Signed numbers so that out-of-range values reach the validator.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTopic {
    #[serde(default)]
    pub topic_name: String,
    #[serde(default = "default_partitions")]
    pub partitions: i64,
    #[serde(default = "default_replication")]
    pub replication_factor: i64,
    #[serde(default = "default_retention")]
    pub retention_ms: i64,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGatewayRoute {
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub route_path: String,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPolicyRoute {
    #[serde(default)]
    pub route_name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub public_path: String,
    #[serde(default)]
    pub private_path: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub description: String,
}

fn default_partitions() -> i64 {
    3
}

fn default_replication() -> i64 {
    3
}

fn default_retention() -> i64 {
    DEFAULT_RETENTION_MS as i64
}

fn default_environment() -> String {
    "dev".to_string()
}

impl Default for RawTopic {
    fn default() -> Self {
        Self {
            topic_name: String::new(),
            partitions: default_partitions(),
            replication_factor: default_replication(),
            retention_ms: default_retention(),
            environment: default_environment(),
            description: String::new(),
        }
    }
}

impl Default for RawGatewayRoute {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            route_path: String::new(),
            methods: vec!["GET".to_string()],
            hosts: Vec::new(),
            tags: Vec::new(),
            environment: default_environment(),
            description: String::new(),
        }
    }
}

impl Default for RawPolicyRoute {
    fn default() -> Self {
        Self {
            route_name: String::new(),
            namespace: String::new(),
            methods: vec!["GET".to_string()],
            public_path: String::new(),
            private_path: String::new(),
            environment: default_environment(),
            description: String::new(),
        }
    }
}

/// An unvalidated record for one of the target systems.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Topic(RawTopic),
    GatewayRoute(RawGatewayRoute),
    PolicyRoute(RawPolicyRoute),
}

impl RawInput {
    pub fn kind(&self) -> TargetSystemKind {
        match self {
            RawInput::Topic(_) => TargetSystemKind::MessageTopic,
            RawInput::GatewayRoute(_) => TargetSystemKind::GatewayRoute,
            RawInput::PolicyRoute(_) => TargetSystemKind::PolicyRoute,
        }
    }

    /// Parse a flat JSON object as the raw record for `kind`.
    pub fn from_json(kind: TargetSystemKind, value: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match kind {
            TargetSystemKind::MessageTopic => RawInput::Topic(serde_json::from_value(value)?),
            TargetSystemKind::GatewayRoute => RawInput::GatewayRoute(serde_json::from_value(value)?),
            TargetSystemKind::PolicyRoute => RawInput::PolicyRoute(serde_json::from_value(value)?),
        })
    }
}

// Validated inputs.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicInput {
    pub topic_name: String,
    pub partitions: u32,
    pub replication_factor: u32,
    pub retention_ms: u64,
    pub environment: Environment,
    #[serde(default, with = "description_field")]
    pub description: Option<String>,
}

impl TopicInput {
    /// A replication factor of 1 must not demand 2 in-sync replicas.
    pub fn min_insync_replicas(&self) -> u32 {
        self.replication_factor.min(2)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRouteInput {
    pub service_name: String,
    pub route_path: String,
    pub methods: Vec<HttpMethod>,
    pub hosts: Vec<String>,
    pub tags: Vec<String>,
    pub environment: Environment,
    #[serde(default, with = "description_field")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRouteInput {
    pub route_name: String,
    pub namespace: String,
    pub methods: Vec<HttpMethod>,
    pub public_path: String,
    pub private_path: String,
    pub environment: Environment,
    #[serde(default, with = "description_field")]
    pub description: Option<String>,
}

impl PolicyRouteInput {
    pub fn internal_service(&self) -> String {
        format!("{}-service", self.route_name.to_lowercase())
    }
}

/// The wire form of an optional description is a plain string, empty when
/// absent.
mod description_field {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(d)?;
        Ok(value.filter(|v| !v.trim().is_empty()))
    }
}

/// A validated record. Serializes as the flat object of its variant, which
/// is the request body of the remote generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GenerationInput {
    Topic(TopicInput),
    GatewayRoute(GatewayRouteInput),
    PolicyRoute(PolicyRouteInput),
}

impl GenerationInput {
    pub fn kind(&self) -> TargetSystemKind {
        match self {
            GenerationInput::Topic(_) => TargetSystemKind::MessageTopic,
            GenerationInput::GatewayRoute(_) => TargetSystemKind::GatewayRoute,
            GenerationInput::PolicyRoute(_) => TargetSystemKind::PolicyRoute,
        }
    }

    pub fn environment(&self) -> Environment {
        match self {
            GenerationInput::Topic(t) => t.environment,
            GenerationInput::GatewayRoute(r) => r.environment,
            GenerationInput::PolicyRoute(r) => r.environment,
        }
    }
}

/// A generated configuration change, ready for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub title: String,
    pub description: String,
    pub content: String,
    #[serde(alias = "type")]
    pub kind: TargetSystemKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_insync_replicas_floor() {
        let mut topic = TopicInput {
            topic_name: "t".into(),
            partitions: 1,
            replication_factor: 1,
            retention_ms: DEFAULT_RETENTION_MS,
            environment: Environment::Dev,
            description: None,
        };
        assert_eq!(topic.min_insync_replicas(), 1);
        for rf in 2..=5 {
            topic.replication_factor = rf;
            assert_eq!(topic.min_insync_replicas(), 2);
        }
    }

    #[test]
    fn test_input_serializes_flat_camel_case() {
        let input = GenerationInput::GatewayRoute(GatewayRouteInput {
            service_name: "billing".into(),
            route_path: "/billing".into(),
            methods: vec![HttpMethod::Get, HttpMethod::Post],
            hosts: vec![],
            tags: vec!["internal".into()],
            environment: Environment::Staging,
            description: None,
        });
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["serviceName"], "billing");
        assert_eq!(json["methods"], serde_json::json!(["GET", "POST"]));
        assert_eq!(json["environment"], "staging");
        assert!(json.get("GatewayRoute").is_none());
        assert_eq!(json["description"], "");
    }

    #[test]
    fn test_result_accepts_type_alias() {
        let json = r#"{"title":"t","description":"d","content":"a: 1","type":"kong"}"#;
        let result: GenerationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.kind, TargetSystemKind::GatewayRoute);

        let out = serde_json::to_value(&result).unwrap();
        assert_eq!(out["kind"], "kong");
    }

    #[test]
    fn test_raw_defaults_match_form_defaults() {
        let raw: RawTopic = serde_json::from_str(r#"{"topicName":"x"}"#).unwrap();
        assert_eq!(raw.partitions, 3);
        assert_eq!(raw.replication_factor, 3);
        assert_eq!(raw.retention_ms, 604_800_000);
        assert_eq!(raw.environment, "dev");
        assert_eq!(RawGatewayRoute::default().methods, vec!["GET"]);
    }

    #[test]
    fn test_http_method_parse() {
        assert_eq!(HttpMethod::from_str("patch"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::from_str("TRACE"), None);
    }
}
