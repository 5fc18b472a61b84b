use super::doc::{self, map, string, Node};
use crate::kind::TargetSystemKind;
use crate::model::{GenerationResult, TopicInput};

pub const API_VERSION: &str = "kafka.strimzi.io/v1beta2";
pub const CLUSTER_LABEL: &str = "kafka-cluster";

pub fn generate(topic: &TopicInput) -> GenerationResult {
    let env = topic.environment.as_str();

    let document = map(vec![
        ("apiVersion", string(API_VERSION)),
        ("kind", string("KafkaTopic")),
        (
            "metadata",
            map(vec![
                ("name", string(&topic.topic_name)),
                ("namespace", string(format!("kafka-{}", env))),
                ("labels", map(vec![("strimzi.io/cluster", string(CLUSTER_LABEL))])),
            ]),
        ),
        (
            "spec",
            map(vec![
                ("partitions", Node::Int(topic.partitions.into())),
                ("replicas", Node::Int(topic.replication_factor.into())),
                (
                    "config",
                    map(vec![
                        ("retention.ms", Node::Int(topic.retention_ms)),
                        ("min.insync.replicas", Node::Int(topic.min_insync_replicas().into())),
                    ]),
                ),
            ]),
        ),
    ]);

    GenerationResult {
        title: format!("Add Topic: {} for {}", topic.topic_name, env),
        description: topic.description.clone().unwrap_or_else(|| {
            format!(
                "This PR adds a new Kafka topic \"{}\" in the {} environment.",
                topic.topic_name, env
            )
        }),
        content: doc::render(&document),
        kind: TargetSystemKind::MessageTopic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Environment;

    fn topic(replication_factor: u32) -> TopicInput {
        TopicInput {
            topic_name: "orders.created".into(),
            partitions: 3,
            replication_factor,
            retention_ms: 604_800_000,
            environment: Environment::Dev,
            description: None,
        }
    }

    #[test]
    fn test_orders_topic_end_to_end() {
        let result = generate(&topic(3));
        assert_eq!(result.title, "Add Topic: orders.created for dev");
        assert!(result.content.contains("partitions: 3"));
        assert!(result.content.contains("replicas: 3"));
        assert!(result.content.contains("retention.ms: 604800000"));
        assert!(result.content.contains("min.insync.replicas: 2"));
        assert!(result.content.contains("namespace: kafka-dev"));
        assert_eq!(
            result.description,
            "This PR adds a new Kafka topic \"orders.created\" in the dev environment."
        );
    }

    #[test]
    fn test_min_insync_replicas_in_document() {
        for (rf, expected) in [(1, 1), (2, 2), (3, 2), (5, 2)] {
            let result = generate(&topic(rf));
            let parsed: serde_yaml::Value = serde_yaml::from_str(&result.content).unwrap();
            assert_eq!(
                parsed["spec"]["config"]["min.insync.replicas"].as_u64(),
                Some(expected),
                "replication factor {}",
                rf
            );
        }
    }

    #[test]
    fn test_full_document_layout() {
        let expected = "\
apiVersion: kafka.strimzi.io/v1beta2
kind: KafkaTopic
metadata:
  name: orders.created
  namespace: kafka-dev
  labels:
    strimzi.io/cluster: kafka-cluster
spec:
  partitions: 3
  replicas: 1
  config:
    retention.ms: 604800000
    min.insync.replicas: 1
";
        assert_eq!(generate(&topic(1)).content, expected);
    }

    #[test]
    fn test_supplied_description_is_kept() {
        let mut input = topic(3);
        input.description = Some("Order events".into());
        assert_eq!(generate(&input).description, "Order events");
    }
}
