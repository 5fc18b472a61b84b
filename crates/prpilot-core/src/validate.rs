//! Raw record -> validated input.
//!
//! Every validator is total and side-effect free, and reports all offending
//! fields at once rather than stopping at the first.

use crate::error::{FieldIssue, ValidationError};
use crate::model::{
    Environment, GatewayRouteInput, GenerationInput, HttpMethod, PolicyRouteInput, RawGatewayRoute,
    RawInput, RawPolicyRoute, RawTopic, TopicInput, MAX_PARTITIONS, MAX_REPLICATION_FACTOR,
};

pub fn validate(raw: &RawInput) -> Result<GenerationInput, ValidationError> {
    match raw {
        RawInput::Topic(t) => validate_topic(t).map(GenerationInput::Topic),
        RawInput::GatewayRoute(r) => validate_gateway_route(r).map(GenerationInput::GatewayRoute),
        RawInput::PolicyRoute(r) => validate_policy_route(r).map(GenerationInput::PolicyRoute),
    }
}

/// Collects issues while the individual fields are checked.
#[derive(Default)]
struct Issues(Vec<FieldIssue>);

impl Issues {
    fn push(&mut self, field: &'static str, reason: impl Into<String>) {
        self.0.push(FieldIssue {
            field,
            reason: reason.into(),
        });
    }

    fn required(&mut self, field: &'static str, value: &str) -> String {
        let value = value.trim();
        if value.is_empty() {
            self.push(field, "is required");
        } else if has_control_chars(value, false) {
            self.push(field, "must not contain control characters");
        }
        value.to_string()
    }

    fn ranged(&mut self, field: &'static str, value: i64, min: i64, max: i64) -> u32 {
        if value < min || value > max {
            self.push(field, format!("must be between {} and {}", min, max));
            return min as u32;
        }
        value as u32
    }

    fn environment(&mut self, value: &str) -> Environment {
        Environment::from_str(value).unwrap_or_else(|| {
            self.push("environment", format!("must be one of dev, staging, prod (got \"{}\")", value.trim()));
            Environment::Dev
        })
    }

    fn methods(&mut self, values: &[String]) -> Vec<HttpMethod> {
        let mut methods = Vec::new();
        for value in values {
            match HttpMethod::from_str(value) {
                Some(m) if !methods.contains(&m) => methods.push(m),
                Some(_) => {}
                None => self.push("methods", format!("unsupported HTTP method \"{}\"", value.trim())),
            }
        }
        if values.is_empty() {
            self.push("methods", "at least one HTTP method is required");
        }
        methods
    }

    fn list(&mut self, field: &'static str, values: &[String]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for value in values {
            let value = value.trim();
            if value.is_empty() || out.iter().any(|v| v == value) {
                continue;
            }
            if has_control_chars(value, false) {
                self.push(field, "entries must not contain control characters");
                continue;
            }
            out.push(value.to_string());
        }
        out
    }

    fn description(&mut self, value: &str) -> Option<String> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if has_control_chars(value, true) {
            self.push("description", "must not contain control characters");
        }
        Some(value.to_string())
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError { issues: self.0 })
        }
    }
}

fn has_control_chars(value: &str, allow_line_breaks: bool) -> bool {
    value
        .chars()
        .any(|c| c.is_control() && !(allow_line_breaks && (c == '\n' || c == '\t')))
}

pub fn validate_topic(raw: &RawTopic) -> Result<TopicInput, ValidationError> {
    let mut issues = Issues::default();

    let topic_name = issues.required("topicName", &raw.topic_name);
    let partitions = issues.ranged("partitions", raw.partitions, 1, MAX_PARTITIONS);
    let replication_factor =
        issues.ranged("replicationFactor", raw.replication_factor, 1, MAX_REPLICATION_FACTOR);
    if raw.retention_ms <= 0 {
        issues.push("retentionMs", "must be a positive number of milliseconds");
    }
    let environment = issues.environment(&raw.environment);
    let description = issues.description(&raw.description);

    issues.finish(TopicInput {
        topic_name,
        partitions,
        replication_factor,
        retention_ms: raw.retention_ms.max(1) as u64,
        environment,
        description,
    })
}

pub fn validate_gateway_route(raw: &RawGatewayRoute) -> Result<GatewayRouteInput, ValidationError> {
    let mut issues = Issues::default();

    let service_name = issues.required("serviceName", &raw.service_name);
    let route_path = issues.required("routePath", &raw.route_path);
    let methods = issues.methods(&raw.methods);
    let hosts = issues.list("hosts", &raw.hosts);
    let tags = issues.list("tags", &raw.tags);
    let environment = issues.environment(&raw.environment);
    let description = issues.description(&raw.description);

    issues.finish(GatewayRouteInput {
        service_name,
        route_path,
        methods,
        hosts,
        tags,
        environment,
        description,
    })
}

pub fn validate_policy_route(raw: &RawPolicyRoute) -> Result<PolicyRouteInput, ValidationError> {
    let mut issues = Issues::default();

    let route_name = issues.required("routeName", &raw.route_name);
    let namespace = issues.required("namespace", &raw.namespace);
    let methods = issues.methods(&raw.methods);
    let public_path = issues.required("publicPath", &raw.public_path);
    let private_path = issues.required("privatePath", &raw.private_path);
    let environment = issues.environment(&raw.environment);
    let description = issues.description(&raw.description);

    issues.finish(PolicyRouteInput {
        route_name,
        namespace,
        methods,
        public_path,
        private_path,
        environment,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic() -> RawTopic {
        RawTopic {
            topic_name: "orders.created".into(),
            ..RawTopic::default()
        }
    }

    fn route() -> RawGatewayRoute {
        RawGatewayRoute {
            service_name: "billing".into(),
            route_path: "/billing".into(),
            ..RawGatewayRoute::default()
        }
    }

    fn policy() -> RawPolicyRoute {
        RawPolicyRoute {
            route_name: "UserRoute".into(),
            namespace: "api".into(),
            public_path: "/api/users".into(),
            private_path: "/users".into(),
            ..RawPolicyRoute::default()
        }
    }

    #[test]
    fn test_valid_topic_is_normalized() {
        let mut raw = topic();
        raw.topic_name = "  orders.created ".into();
        raw.environment = "PROD".into();
        raw.description = "   ".into();

        let input = validate_topic(&raw).unwrap();
        assert_eq!(input.topic_name, "orders.created");
        assert_eq!(input.environment, Environment::Prod);
        assert_eq!(input.description, None);
    }

    #[test]
    fn test_topic_ranges() {
        for (partitions, rf, ok) in [(1, 1, true), (16, 5, true), (0, 3, false), (17, 3, false), (3, 0, false), (3, 6, false)] {
            let mut raw = topic();
            raw.partitions = partitions;
            raw.replication_factor = rf;
            assert_eq!(validate_topic(&raw).is_ok(), ok, "partitions={} rf={}", partitions, rf);
        }
    }

    #[test]
    fn test_topic_reports_all_fields() {
        let raw = RawTopic {
            topic_name: "".into(),
            partitions: 99,
            replication_factor: 3,
            retention_ms: 0,
            environment: "qa".into(),
            description: String::new(),
        };
        let err = validate_topic(&raw).unwrap_err();
        assert_eq!(err.fields(), vec!["topicName", "partitions", "retentionMs", "environment"]);
    }

    #[test]
    fn test_free_form_retention_is_accepted() {
        let mut raw = topic();
        raw.retention_ms = 12_345;
        assert_eq!(validate_topic(&raw).unwrap().retention_ms, 12_345);
    }

    #[test]
    fn test_empty_method_set_is_rejected() {
        let mut raw = route();
        raw.methods.clear();
        let err = validate_gateway_route(&raw).unwrap_err();
        assert!(err.has_field("methods"));

        let mut raw = policy();
        raw.methods.clear();
        assert!(validate_policy_route(&raw).unwrap_err().has_field("methods"));
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let mut raw = route();
        raw.methods = vec!["GET".into(), "TRACE".into()];
        let err = validate_gateway_route(&raw).unwrap_err();
        assert!(err.issues[0].reason.contains("TRACE"));
    }

    #[test]
    fn test_methods_normalized_and_deduplicated() {
        let mut raw = route();
        raw.methods = vec!["post".into(), "GET".into(), "Post".into()];
        let input = validate_gateway_route(&raw).unwrap();
        assert_eq!(input.methods, vec![HttpMethod::Post, HttpMethod::Get]);
    }

    #[test]
    fn test_tags_and_hosts_deduplicated_in_order() {
        let mut raw = route();
        raw.tags = vec!["internal".into(), " internal ".into(), "".into(), "billing".into()];
        raw.hosts = vec!["b.example.com".into(), "a.example.com".into(), "b.example.com".into()];
        let input = validate_gateway_route(&raw).unwrap();
        assert_eq!(input.tags, vec!["internal", "billing"]);
        assert_eq!(input.hosts, vec!["b.example.com", "a.example.com"]);
    }

    #[test]
    fn test_control_characters_rejected_outside_description() {
        let mut raw = route();
        raw.service_name = "bill\u{7}ing".into();
        raw.description = "line one\nline two".into();
        let err = validate_gateway_route(&raw).unwrap_err();
        assert_eq!(err.fields(), vec!["serviceName"]);
    }

    #[test]
    fn test_policy_route_requires_paths_and_namespace() {
        let raw = RawPolicyRoute {
            route_name: "r".into(),
            ..RawPolicyRoute::default()
        };
        let err = validate_policy_route(&raw).unwrap_err();
        assert_eq!(err.fields(), vec!["namespace", "publicPath", "privatePath"]);
    }

    #[test]
    fn test_validate_dispatches_on_variant() {
        let input = validate(&RawInput::PolicyRoute(policy())).unwrap();
        assert_eq!(input.kind(), crate::TargetSystemKind::PolicyRoute);
    }
}
