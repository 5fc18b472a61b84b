use std::path::PathBuf;
use std::time::Instant;

use prpilot_core::orchestrator::GenerationOutcome;
use prpilot_core::{export, ChatRole, Orchestrator, PendingReply, Reachability, TargetSystemKind};
use tokio::task::JoinHandle;

use crate::form::Form;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Chat,
    Form,
    Result,
}

pub struct App {
    pub should_quit: bool,
    pub focus: Focus,
    pub orchestrator: Orchestrator,

    // One form per target system, kept across tab switches
    pub forms: Vec<Form>,

    // Chat input
    pub chat_input: String,
    pub chat_cursor: usize,
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_width: u16,

    pub result_scroll: u16,

    pub pending_replies: Vec<PendingReply>,
    pub generation_task: Option<JoinHandle<GenerationOutcome>>,
    pub probe_task: Option<JoinHandle<bool>>,

    pub animation_frame: u8, // 0-2 for ellipsis animation
    pub notice: Option<String>,
    pub download_dir: PathBuf,
}

impl App {
    pub fn new(orchestrator: Orchestrator, download_dir: PathBuf) -> Self {
        Self {
            should_quit: false,
            focus: Focus::Chat,
            orchestrator,
            forms: TargetSystemKind::all().into_iter().map(Form::new).collect(),
            chat_input: String::new(),
            chat_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            result_scroll: 0,
            pending_replies: Vec::new(),
            generation_task: None,
            probe_task: None,
            animation_frame: 0,
            notice: None,
            download_dir,
        }
    }

    pub fn active_kind(&self) -> TargetSystemKind {
        self.orchestrator.state().active_kind
    }

    fn form_index(kind: TargetSystemKind) -> usize {
        TargetSystemKind::all()
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(0)
    }

    pub fn form(&self) -> &Form {
        &self.forms[Self::form_index(self.active_kind())]
    }

    pub fn form_mut(&mut self) -> &mut Form {
        let idx = Self::form_index(self.active_kind());
        &mut self.forms[idx]
    }

    pub fn select_kind(&mut self, kind: TargetSystemKind) {
        self.orchestrator.set_active_kind(kind);
        if self.focus == Focus::Chat {
            self.focus = Focus::Form;
        }
    }

    /// Tab order; the result panel only takes part while a result is shown.
    pub fn cycle_focus(&mut self) {
        let has_result = self.orchestrator.state().last_result.is_some();
        self.focus = match self.focus {
            Focus::Chat => Focus::Form,
            Focus::Form if has_result => Focus::Result,
            Focus::Form | Focus::Result => Focus::Chat,
        };
    }

    /// Start the connectivity probe in the background.
    pub fn start_probe(&mut self) {
        if !self.orchestrator.remote_enabled() {
            self.orchestrator.set_reachability(false);
            return;
        }
        let prober = self.orchestrator.prober().clone();
        self.probe_task = Some(tokio::spawn(async move { prober.probe().await }));
    }

    pub fn submit_chat(&mut self) {
        let text = std::mem::take(&mut self.chat_input);
        self.chat_cursor = 0;
        if let Some(reply) = self.orchestrator.submit(&text) {
            self.pending_replies.push(reply);
            self.scroll_chat_to_bottom();
        }
    }

    pub fn start_generation(&mut self) {
        let kind = self.active_kind();
        let raw = self.form().to_raw();
        if let Some(pending) = self.orchestrator.begin_generation(kind, &raw) {
            let dispatcher = self.orchestrator.dispatcher().clone();
            self.generation_task = Some(tokio::spawn(async move { pending.run(&dispatcher).await }));
        }
        self.scroll_chat_to_bottom();
    }

    pub fn is_generating(&self) -> bool {
        self.orchestrator.state().generating
    }

    /// Deliver due replies and collect finished background tasks.
    pub async fn poll_tasks(&mut self) {
        let before = self.orchestrator.state().messages().len();

        let now = Instant::now();
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending_replies)
            .into_iter()
            .partition(|r| r.is_due(now));
        self.pending_replies = waiting;
        for reply in due {
            self.orchestrator.deliver_reply(reply);
        }

        if self.probe_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.probe_task.take() {
                let reachable = task.await.unwrap_or(false);
                self.orchestrator.set_reachability(reachable);
            }
        }

        if self.generation_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.generation_task.take() {
                match task.await {
                    Ok(outcome) => {
                        if self.orchestrator.complete_generation(outcome).is_some() {
                            self.focus = Focus::Result;
                            self.result_scroll = 0;
                        }
                    }
                    Err(e) => self.orchestrator.fail_generation(&e.to_string()),
                }
            }
        }

        if self.orchestrator.state().messages().len() != before {
            self.scroll_chat_to_bottom();
        }
    }

    pub fn copy_result(&mut self) {
        let Some(result) = self.orchestrator.state().last_result.as_ref() else {
            return;
        };
        self.notice = Some(match crate::handler::copy_to_clipboard(&result.content) {
            Ok(()) => "Copied YAML to clipboard".to_string(),
            Err(e) => format!("Copy failed: {}", e),
        });
    }

    pub fn download_result(&mut self) {
        let Some(result) = self.orchestrator.state().last_result.as_ref() else {
            return;
        };
        self.notice = Some(match export::write_download(result, &self.download_dir) {
            Ok(path) => format!("Saved {}", path.display()),
            Err(e) => format!("Download failed: {:#}", e),
        });
    }

    pub fn close_result(&mut self) {
        self.orchestrator.dismiss_result();
        self.result_scroll = 0;
        self.focus = Focus::Form;
    }

    pub fn connectivity_label(&self) -> &'static str {
        match self.orchestrator.state().backend_reachable {
            Reachability::Unknown => "checking",
            Reachability::Reachable => "online",
            Reachability::Unreachable => "offline",
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_generating() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1).min(self.chat_total_lines());
    }

    fn chat_total_lines(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total: usize = 0;
        for msg in self.orchestrator.state().messages() {
            total += 1; // "You:" / "Assistant:" line
            for line in msg.text.lines() {
                total += line.chars().count() / wrap_width + 1;
            }
            total += 1; // Blank line after message
        }
        if self.is_generating() {
            total += 2;
        }
        total.min(u16::MAX as usize) as u16
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        let visible = if self.chat_height > 0 { self.chat_height } else { 20 };
        self.chat_scroll = self.chat_total_lines().saturating_sub(visible);
    }

    pub fn last_role(&self) -> Option<ChatRole> {
        self.orchestrator.state().last_message().map(|m| m.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prpilot_core::FakeRemoteService;
    use std::sync::Arc;
    use std::time::Duration;

    fn app() -> App {
        let orchestrator = Orchestrator::new(Arc::new(FakeRemoteService::unreachable()), Duration::from_secs(1))
            .with_reply_delay(Duration::ZERO);
        App::new(orchestrator, PathBuf::from("."))
    }

    async fn settle(app: &mut App) {
        for _ in 0..100 {
            app.poll_tasks().await;
            if app.generation_task.is_none() && app.probe_task.is_none() && app.pending_replies.is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_chat_reply_switches_form() {
        let mut app = app();
        app.chat_input = "new kong route".into();
        app.submit_chat();
        assert!(app.chat_input.is_empty());
        settle(&mut app).await;

        assert_eq!(app.active_kind(), TargetSystemKind::GatewayRoute);
        assert_eq!(app.form().kind, TargetSystemKind::GatewayRoute);
        assert_eq!(app.last_role(), Some(ChatRole::Assistant));
    }

    #[tokio::test]
    async fn test_generation_opens_result_panel() {
        let mut app = app();
        app.start_probe();
        settle(&mut app).await;
        assert_eq!(app.connectivity_label(), "offline");

        app.select_kind(TargetSystemKind::MessageTopic);
        for c in "orders.created".chars() {
            app.form_mut().input_char(c);
        }
        app.start_generation();
        assert!(app.is_generating());
        settle(&mut app).await;

        assert!(!app.is_generating());
        assert_eq!(app.focus, Focus::Result);
        let result = app.orchestrator.state().last_result.as_ref().unwrap();
        assert_eq!(result.title, "Add Topic: orders.created for dev");

        app.close_result();
        assert_eq!(app.focus, Focus::Form);
        assert!(app.orchestrator.state().last_result.is_none());
    }

    #[tokio::test]
    async fn test_download_writes_into_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        app.download_dir = dir.path().to_path_buf();
        for c in "orders.created".chars() {
            app.form_mut().input_char(c);
        }
        app.start_generation();
        settle(&mut app).await;

        app.download_result();
        let path = dir.path().join("kafka-add-topic--orders-created-for-dev.yaml");
        assert!(path.exists());
        assert!(app.notice.as_deref().unwrap().starts_with("Saved"));
    }

    #[test]
    fn test_focus_cycle_skips_result_without_one() {
        let mut app = app();
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Form);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Chat);
    }
}
