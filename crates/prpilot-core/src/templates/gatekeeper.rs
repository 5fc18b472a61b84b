use super::doc::{self, flow, map, quoted, string, Node};
use crate::kind::TargetSystemKind;
use crate::model::{GenerationResult, PolicyRouteInput};

pub const API_VERSION: &str = "gatekeeper.io/v1";
pub const REQUESTS_PER_MINUTE: u64 = 60;

pub fn generate(route: &PolicyRouteInput) -> GenerationResult {
    let env = route.environment.as_str();

    let document = map(vec![
        ("apiVersion", string(API_VERSION)),
        ("kind", string("Route")),
        (
            "metadata",
            map(vec![
                ("name", string(&route.route_name)),
                ("namespace", string(format!("{}-{}", route.namespace, env))),
            ]),
        ),
        (
            "spec",
            map(vec![
                (
                    "public",
                    map(vec![
                        ("path", quoted(&route.public_path)),
                        ("methods", flow(route.methods.iter().map(|m| m.as_str()))),
                    ]),
                ),
                (
                    "private",
                    map(vec![
                        ("service", string(route.internal_service())),
                        ("path", quoted(&route.private_path)),
                    ]),
                ),
                (
                    "auth",
                    map(vec![("required", Node::Bool(true)), ("type", string("jwt"))]),
                ),
                (
                    "rateLimit",
                    map(vec![("requestsPerMinute", Node::Int(REQUESTS_PER_MINUTE))]),
                ),
                (
                    "cors",
                    map(vec![
                        ("enabled", Node::Bool(true)),
                        ("allowedOrigins", Node::Seq(vec![quoted("*")])),
                    ]),
                ),
            ]),
        ),
    ]);

    GenerationResult {
        title: format!("Add Route: {} in {}", route.route_name, env),
        description: route.description.clone().unwrap_or_else(|| {
            format!(
                "This PR adds a new Gatekeeper route \"{}\" in the {} environment.",
                route.route_name, env
            )
        }),
        content: doc::render(&document),
        kind: TargetSystemKind::PolicyRoute,
    }
}
