use super::doc::{self, flow, map, string, Node};
use crate::kind::TargetSystemKind;
use crate::model::{GatewayRouteInput, GenerationResult};

pub const API_VERSION: &str = "configuration.konghq.com/v1";
pub const RATE_LIMIT_PER_MINUTE: u64 = 60;
pub const SERVICE_PORT: u64 = 80;

pub fn generate(route: &GatewayRouteInput) -> GenerationResult {
    let env = route.environment.as_str();

    let document = map(vec![
        ("apiVersion", string(API_VERSION)),
        ("kind", string("KongIngress")),
        (
            "metadata",
            map(vec![
                ("name", string(format!("{}-route", route.service_name))),
                ("namespace", string(format!("kong-{}", env))),
                ("annotations", map(vec![("kubernetes.io/ingress.class", string("kong"))])),
            ]),
        ),
        (
            "spec",
            map(vec![
                (
                    "route",
                    map(vec![
                        ("methods", flow(route.methods.iter().map(|m| m.as_str()))),
                        ("paths", flow([route.route_path.as_str()])),
                        ("hosts", flow(route.hosts.iter().map(String::as_str))),
                        ("tags", flow(route.tags.iter().map(String::as_str))),
                        ("strip_path", Node::Bool(true)),
                        ("preserve_host", Node::Bool(true)),
                    ]),
                ),
                (
                    "plugins",
                    Node::Seq(vec![
                        map(vec![("name", string("cors"))]),
                        map(vec![
                            ("name", string("rate-limiting")),
                            (
                                "config",
                                map(vec![
                                    ("minute", Node::Int(RATE_LIMIT_PER_MINUTE)),
                                    ("policy", string("local")),
                                ]),
                            ),
                        ]),
                    ]),
                ),
                (
                    "service",
                    map(vec![
                        ("name", string(&route.service_name)),
                        ("port", Node::Int(SERVICE_PORT)),
                    ]),
                ),
            ]),
        ),
    ]);

    GenerationResult {
        title: format!("Add Route for {} in {}", route.service_name, env),
        description: route.description.clone().unwrap_or_else(|| {
            format!(
                "This PR adds a new Kong route for the \"{}\" service in the {} environment.",
                route.service_name, env
            )
        }),
        content: doc::render(&document),
        kind: TargetSystemKind::GatewayRoute,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Environment, HttpMethod};

    fn route() -> GatewayRouteInput {
        GatewayRouteInput {
            service_name: "billing".into(),
            route_path: "/api/billing".into(),
            methods: vec![HttpMethod::Get, HttpMethod::Post],
            hosts: vec![],
            tags: vec!["internal".into()],
            environment: Environment::Staging,
            description: None,
        }
    }

    #[test]
    fn test_sequences_render_without_artifacts() {
        let result = generate(&route());
        assert!(result.content.contains("    methods: [\"GET\", \"POST\"]\n"));
        assert!(result.content.contains("    hosts: []\n"));
        assert!(result.content.contains("    tags: [\"internal\"]\n"));
        assert!(!result.content.contains(",]"));
        assert!(!result.content.contains(", ]"));
    }

    #[test]
    fn test_fixed_policies_and_flags() {
        let result = generate(&route());
        let parsed: serde_yaml::Value = serde_yaml::from_str(&result.content).unwrap();
        let spec = &parsed["spec"];
        assert_eq!(spec["route"]["strip_path"].as_bool(), Some(true));
        assert_eq!(spec["route"]["preserve_host"].as_bool(), Some(true));
        assert_eq!(spec["plugins"][0]["name"].as_str(), Some("cors"));
        assert_eq!(spec["plugins"][1]["name"].as_str(), Some("rate-limiting"));
        assert_eq!(spec["plugins"][1]["config"]["minute"].as_u64(), Some(60));
        assert_eq!(spec["plugins"][1]["config"]["policy"].as_str(), Some("local"));
        assert_eq!(spec["service"]["port"].as_u64(), Some(80));
        assert_eq!(parsed["metadata"]["namespace"].as_str(), Some("kong-staging"));
        assert_eq!(parsed["metadata"]["name"].as_str(), Some("billing-route"));
    }

    #[test]
    fn test_title_and_default_description() {
        let result = generate(&route());
        assert_eq!(result.title, "Add Route for billing in staging");
        assert!(result.description.contains("\"billing\" service in the staging environment"));
    }

    #[test]
    fn test_hosts_and_tags_keep_order() {
        let mut input = route();
        input.hosts = vec!["b.example.com".into(), "a.example.com".into()];
        input.tags = vec!["z".into(), "a".into()];
        let parsed: serde_yaml::Value = serde_yaml::from_str(&generate(&input).content).unwrap();
        let hosts: Vec<&str> = parsed["spec"]["route"]["hosts"]
            .as_sequence()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(hosts, vec!["b.example.com", "a.example.com"]);
    }
}
