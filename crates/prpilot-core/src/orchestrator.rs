//! Conversation orchestrator: the state machine over [`SessionState`].
//!
//! Generation is split in three so a front-end can keep its event loop
//! running while the remote call is in flight:
//! [`Orchestrator::begin_generation`] (sync, mutates state),
//! [`PendingGeneration::run`] (async, touches no state) and
//! [`Orchestrator::complete_generation`] (sync, mutates state).
//! [`Orchestrator::request_generation`] chains the three.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::dispatcher::{Dispatcher, GenerateOptions, Generation};
use crate::error::{GenerationFailure, ValidationError};
use crate::kind::TargetSystemKind;
use crate::model::{GenerationInput, GenerationResult, RawInput};
use crate::prober::Prober;
use crate::remote::{HttpRemoteService, RemoteService};
use crate::state::{ChatRole, Reachability, SessionState};
use crate::validate::validate;

pub const HELP_REPLY: &str = "I can help you create PRs for Kafka topics, Kong routes, or Gatekeeper routes. Please select the appropriate tab and fill out the form to generate a PR.";
pub const BUSY_REPLY: &str = "A PR is already being generated. Please wait for it to finish.";

pub type GenerationOutcome = Result<Generation, GenerationFailure>;

/// Best-effort intent hint: the first kind whose keyword appears in `text`.
pub fn classify(text: &str) -> Option<TargetSystemKind> {
    let text = text.to_lowercase();
    TargetSystemKind::all()
        .into_iter()
        .find(|kind| text.contains(kind.as_str()))
}

fn canned_reply(kind: Option<TargetSystemKind>) -> &'static str {
    match kind {
        Some(TargetSystemKind::MessageTopic) => {
            "To create a Kafka topic PR, please use the Kafka form tab."
        }
        Some(TargetSystemKind::GatewayRoute) => {
            "For Kong route PRs, please switch to the Kong form tab."
        }
        Some(TargetSystemKind::PolicyRoute) => {
            "To create a Gatekeeper route PR, use the Gatekeeper form tab."
        }
        None => HELP_REPLY,
    }
}

fn validation_reply(err: &ValidationError) -> String {
    let issues: Vec<String> = err.issues.iter().map(|i| i.to_string()).collect();
    format!(
        "I couldn't generate that PR. Please fix the following: {}",
        issues.join("; ")
    )
}

/// An assistant reply waiting out the pacing delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub kind: Option<TargetSystemKind>,
    pub due: Instant,
}

impl PendingReply {
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due
    }
}

/// A validated request, ready to hand to the dispatcher.
#[derive(Debug, Clone)]
pub struct PendingGeneration {
    pub kind: TargetSystemKind,
    pub input: GenerationInput,
    pub options: GenerateOptions,
}

impl PendingGeneration {
    pub async fn run(self, dispatcher: &Dispatcher) -> GenerationOutcome {
        dispatcher.generate(self.kind, &self.input, self.options).await
    }
}

pub struct Orchestrator {
    state: SessionState,
    dispatcher: Dispatcher,
    prober: Prober,
    remote_enabled: bool,
    reply_delay: Duration,
}

impl Orchestrator {
    pub fn new(remote: Arc<dyn RemoteService>, timeout: Duration) -> Self {
        Self {
            state: SessionState::new(),
            dispatcher: Dispatcher::new(Arc::clone(&remote), timeout),
            prober: Prober::new(remote, timeout),
            remote_enabled: true,
            reply_delay: Duration::from_millis(crate::config::DEFAULT_REPLY_DELAY_MS),
        }
    }

    /// Build an orchestrator talking to the configured HTTP service.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let timeout = config.request_timeout();
        let remote = HttpRemoteService::new(&config.api_base_url(), timeout)?;
        Ok(Self::new(Arc::new(remote), timeout)
            .with_remote_enabled(config.remote_enabled())
            .with_reply_delay(config.reply_delay()))
    }

    pub fn with_remote_enabled(mut self, enabled: bool) -> Self {
        self.remote_enabled = enabled;
        self
    }

    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn prober(&self) -> &Prober {
        &self.prober
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote_enabled
    }

    pub fn set_active_kind(&mut self, kind: TargetSystemKind) {
        self.state.active_kind = kind;
    }

    /// Remote generation is only attempted once the probe has succeeded.
    pub fn prefer_remote(&self) -> bool {
        self.remote_enabled && self.state.backend_reachable == Reachability::Reachable
    }

    pub fn set_reachability(&mut self, reachable: bool) {
        self.state.backend_reachable = Reachability::from(reachable);
    }

    pub async fn probe_connectivity(&mut self) -> Reachability {
        if !self.remote_enabled {
            self.state.backend_reachable = Reachability::Unreachable;
            return self.state.backend_reachable;
        }
        let reachable = self.prober.probe().await;
        self.set_reachability(reachable);
        self.state.backend_reachable
    }

    /// Append the user's message and schedule the canned reply.
    /// Blank input is ignored.
    pub fn submit(&mut self, text: &str) -> Option<PendingReply> {
        if text.trim().is_empty() {
            return None;
        }
        self.state.push(ChatRole::User, text);
        Some(PendingReply {
            kind: classify(text),
            due: Instant::now() + self.reply_delay,
        })
    }

    pub fn deliver_reply(&mut self, reply: PendingReply) {
        if let Some(kind) = reply.kind {
            self.state.active_kind = kind;
        }
        self.state.push(ChatRole::Assistant, canned_reply(reply.kind));
    }

    pub async fn submit_and_reply(&mut self, text: &str) {
        if let Some(reply) = self.submit(text) {
            tokio::time::sleep(self.reply_delay).await;
            self.deliver_reply(reply);
        }
    }

    /// Returns `None` when the request was rejected (busy or invalid); the
    /// reason has already been appended to the conversation.
    pub fn begin_generation(
        &mut self,
        kind: TargetSystemKind,
        raw: &RawInput,
    ) -> Option<PendingGeneration> {
        if self.state.generating {
            tracing::debug!(%kind, "generation already in flight, rejecting request");
            self.state.push(ChatRole::Assistant, BUSY_REPLY);
            return None;
        }

        self.state.generating = true;
        self.state.push(
            ChatRole::Assistant,
            format!("Generating your {} PR...", kind.display_name()),
        );

        match validate(raw) {
            Ok(input) => Some(PendingGeneration {
                kind,
                input,
                options: GenerateOptions {
                    prefer_remote: self.prefer_remote(),
                },
            }),
            Err(e) => {
                tracing::info!(%kind, error = %e, "rejected invalid input");
                self.state.push(ChatRole::Assistant, validation_reply(&e));
                self.state.generating = false;
                None
            }
        }
    }

    pub fn complete_generation(&mut self, outcome: GenerationOutcome) -> Option<&GenerationResult> {
        self.state.generating = false;
        match outcome {
            Ok(generation) => {
                let kind = generation.result.kind;
                let text = match generation.fell_back() {
                    Some(reason) => format!(
                        "I've generated a PR for your {} configuration using the local templates (the generation service failed: {}). You can copy the YAML or download it.",
                        kind, reason
                    ),
                    None => format!(
                        "I've generated a PR for your {} configuration. You can copy the YAML or download it.",
                        kind
                    ),
                };
                self.state.last_result = Some(generation.result);
                self.state.push(ChatRole::Assistant, text);
                self.state.last_result.as_ref()
            }
            Err(e) => {
                self.fail_generation(&e.to_string());
                None
            }
        }
    }

    /// Close an in-flight generation that ended without an outcome, e.g. a
    /// panicked task.
    pub fn fail_generation(&mut self, reason: &str) {
        tracing::error!(%reason, "generation failed");
        self.state.generating = false;
        self.state.push(
            ChatRole::Assistant,
            format!("Sorry, there was an error generating the PR: {}", reason),
        );
    }

    pub async fn request_generation(
        &mut self,
        kind: TargetSystemKind,
        raw: &RawInput,
    ) -> Option<&GenerationResult> {
        let pending = self.begin_generation(kind, raw)?;
        let outcome = pending.run(&self.dispatcher).await;
        self.complete_generation(outcome)
    }

    pub fn dismiss_result(&mut self) {
        self.state.last_result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::model::{RawGatewayRoute, RawTopic};
    use crate::remote::FakeRemoteService;
    use crate::templates;

    fn orchestrator(fake: Arc<FakeRemoteService>) -> Orchestrator {
        Orchestrator::new(fake, Duration::from_secs(5)).with_reply_delay(Duration::from_millis(500))
    }

    fn raw_topic() -> RawInput {
        RawInput::Topic(RawTopic {
            topic_name: "orders.created".into(),
            ..RawTopic::default()
        })
    }

    fn texts(o: &Orchestrator) -> Vec<&str> {
        o.state().messages().iter().map(|m| m.text.as_str()).collect()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("I need a KAFKA topic"), Some(TargetSystemKind::MessageTopic));
        assert_eq!(classify("kong please"), Some(TargetSystemKind::GatewayRoute));
        assert_eq!(classify("Gatekeeper route"), Some(TargetSystemKind::PolicyRoute));
        assert_eq!(classify("kafka or kong"), Some(TargetSystemKind::MessageTopic));
        assert_eq!(classify("hello"), None);
    }

    #[test]
    fn test_submit_then_deliver_switches_kind() {
        let mut o = orchestrator(Arc::new(FakeRemoteService::unreachable()));
        let reply = o.submit("set up a kong route").unwrap();
        assert_eq!(o.state().messages().len(), 2);
        assert_eq!(o.state().active_kind, TargetSystemKind::MessageTopic);
        assert!(!reply.is_due(Instant::now()));

        o.deliver_reply(reply);
        assert_eq!(o.state().active_kind, TargetSystemKind::GatewayRoute);
        assert_eq!(o.state().last_message().unwrap().role, ChatRole::Assistant);
        assert!(o.state().last_message().unwrap().text.contains("Kong form"));
    }

    #[test]
    fn test_unmatched_text_gets_help_and_blank_is_ignored() {
        let mut o = orchestrator(Arc::new(FakeRemoteService::unreachable()));
        assert!(o.submit("   ").is_none());
        assert_eq!(o.state().messages().len(), 1);

        let reply = o.submit("what can you do?").unwrap();
        o.deliver_reply(reply);
        assert_eq!(texts(&o).last(), Some(&HELP_REPLY));
        assert_eq!(o.state().active_kind, TargetSystemKind::MessageTopic);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_and_reply_waits_for_delay() {
        let mut o = orchestrator(Arc::new(FakeRemoteService::unreachable()));
        let start = tokio::time::Instant::now();
        o.submit_and_reply("gatekeeper").await;
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert_eq!(o.state().active_kind, TargetSystemKind::PolicyRoute);
        assert_eq!(o.state().messages().len(), 3);
    }

    #[tokio::test]
    async fn test_generation_without_probe_stays_local() {
        let fake = Arc::new(FakeRemoteService::always_error(RemoteError::Unavailable("x".into())));
        let mut o = orchestrator(fake.clone());

        let result = o.request_generation(TargetSystemKind::MessageTopic, &raw_topic()).await.cloned();
        assert_eq!(result.unwrap().title, "Add Topic: orders.created for dev");
        assert_eq!(fake.generate_calls(), 0);
        assert!(!o.state().generating);

        let texts = texts(&o);
        assert!(texts[1].starts_with("Generating your Kafka Topic PR"));
        assert!(texts[2].starts_with("I've generated a PR for your kafka configuration."));
    }

    #[tokio::test]
    async fn test_generation_falls_back_after_successful_probe() {
        let fake = Arc::new(FakeRemoteService::always_error(RemoteError::Rejected {
            status: 503,
            detail: "maintenance".into(),
        }));
        let mut o = orchestrator(fake.clone());
        assert_eq!(o.probe_connectivity().await, Reachability::Reachable);
        assert!(o.prefer_remote());

        o.request_generation(TargetSystemKind::MessageTopic, &raw_topic()).await;
        assert_eq!(fake.generate_calls(), 1);

        let expected = templates::generate(&validate(&raw_topic()).unwrap());
        assert_eq!(o.state().last_result.as_ref(), Some(&expected));
        let last = o.state().last_message().unwrap();
        assert!(last.text.contains("local templates"));
        assert!(last.text.contains("maintenance"));
        assert!(!o.state().generating);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_dispatcher() {
        let fake = Arc::new(FakeRemoteService::new(true, vec![]));
        let mut o = orchestrator(fake.clone());
        o.probe_connectivity().await;

        let raw = RawInput::GatewayRoute(RawGatewayRoute {
            service_name: "billing".into(),
            route_path: "/billing".into(),
            methods: vec![],
            ..RawGatewayRoute::default()
        });
        assert!(o.request_generation(TargetSystemKind::GatewayRoute, &raw).await.is_none());
        assert_eq!(fake.generate_calls(), 0);
        assert!(!o.state().generating);
        assert!(o.state().last_result.is_none());
        assert!(o.state().last_message().unwrap().text.contains("methods"));
    }

    #[test]
    fn test_second_request_is_rejected_while_generating() {
        let mut o = orchestrator(Arc::new(FakeRemoteService::unreachable()));
        let pending = o.begin_generation(TargetSystemKind::MessageTopic, &raw_topic());
        assert!(pending.is_some());
        assert!(o.state().generating);

        let before = o.state().messages().len();
        assert!(o.begin_generation(TargetSystemKind::MessageTopic, &raw_topic()).is_none());
        assert!(o.state().generating);
        assert_eq!(o.state().messages().len(), before + 1);
        assert_eq!(texts(&o).last(), Some(&BUSY_REPLY));
    }

    #[tokio::test]
    async fn test_generation_failure_is_reported_and_clears_flag() {
        let mut o = orchestrator(Arc::new(FakeRemoteService::unreachable()));
        let result = o.request_generation(TargetSystemKind::PolicyRoute, &raw_topic()).await;
        assert!(result.is_none());
        assert!(!o.state().generating);
        assert!(o
            .state()
            .last_message()
            .unwrap()
            .text
            .starts_with("Sorry, there was an error generating the PR"));
    }

    #[tokio::test]
    async fn test_dismiss_keeps_history() {
        let mut o = orchestrator(Arc::new(FakeRemoteService::unreachable()));
        o.request_generation(TargetSystemKind::MessageTopic, &raw_topic()).await;
        let count = o.state().messages().len();
        o.dismiss_result();
        assert!(o.state().last_result.is_none());
        assert_eq!(o.state().messages().len(), count);
    }

    #[tokio::test]
    async fn test_disabled_remote_is_never_probed() {
        let fake = Arc::new(FakeRemoteService::new(true, vec![]));
        let mut o = orchestrator(fake.clone()).with_remote_enabled(false);
        assert_eq!(o.probe_connectivity().await, Reachability::Unreachable);
        assert_eq!(fake.hello_calls(), 0);
        assert!(!o.prefer_remote());
    }
}
