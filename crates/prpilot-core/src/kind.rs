use serde::{Deserialize, Serialize};
use std::fmt;

/// The downstream system a configuration change is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetSystemKind {
    #[serde(rename = "kafka")]
    MessageTopic,
    #[serde(rename = "kong")]
    GatewayRoute,
    #[serde(rename = "gatekeeper")]
    PolicyRoute,
}

impl TargetSystemKind {
    /// Wire name, also used as the URL segment of the generation endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetSystemKind::MessageTopic => "kafka",
            TargetSystemKind::GatewayRoute => "kong",
            TargetSystemKind::PolicyRoute => "gatekeeper",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "kafka" => Some(TargetSystemKind::MessageTopic),
            "kong" => Some(TargetSystemKind::GatewayRoute),
            "gatekeeper" => Some(TargetSystemKind::PolicyRoute),
            _ => None,
        }
    }

    pub fn all() -> Vec<TargetSystemKind> {
        vec![
            TargetSystemKind::MessageTopic,
            TargetSystemKind::GatewayRoute,
            TargetSystemKind::PolicyRoute,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TargetSystemKind::MessageTopic => "Kafka Topic",
            TargetSystemKind::GatewayRoute => "Kong Route",
            TargetSystemKind::PolicyRoute => "Gatekeeper Route",
        }
    }

    /// Short tab label.
    pub fn tab_label(&self) -> &'static str {
        match self {
            TargetSystemKind::MessageTopic => "Kafka",
            TargetSystemKind::GatewayRoute => "Kong",
            TargetSystemKind::PolicyRoute => "Gatekeeper",
        }
    }
}

impl fmt::Display for TargetSystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(TargetSystemKind::from_str("Kafka"), Some(TargetSystemKind::MessageTopic));
        assert_eq!(TargetSystemKind::from_str(" KONG "), Some(TargetSystemKind::GatewayRoute));
        assert_eq!(TargetSystemKind::from_str("gatekeeper"), Some(TargetSystemKind::PolicyRoute));
        assert_eq!(TargetSystemKind::from_str("istio"), None);
    }

    #[test]
    fn test_wire_names_match_serde() {
        for kind in TargetSystemKind::all() {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
