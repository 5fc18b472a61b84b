use anyhow::{anyhow, Result};
use std::io::Write;
use std::process::{Child, Command, ExitStatus, Stdio};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use prpilot_core::TargetSystemKind;

use crate::app::{App, Focus};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
    app.poll_tasks().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keys that work in any pane
    match key.code {
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('g') if ctrl => {
            app.start_generation();
            return;
        }
        KeyCode::Tab => {
            app.cycle_focus();
            return;
        }
        KeyCode::F(n @ 1..=3) => {
            let kind = TargetSystemKind::all()[(n - 1) as usize];
            app.select_kind(kind);
            return;
        }
        _ => {}
    }

    // Any other key clears the last footer notice
    app.notice = None;

    match app.focus {
        Focus::Chat => handle_chat_key(app, key),
        Focus::Form => handle_form_key(app, key),
        Focus::Result => handle_result_key(app, key),
    }
}

fn handle_chat_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_chat(),
        KeyCode::Up => app.scroll_chat_up(),
        KeyCode::Down => app.scroll_chat_down(),
        KeyCode::Backspace => {
            if app.chat_cursor > 0 {
                app.chat_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            if app.chat_cursor < app.chat_input.chars().count() {
                let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
                app.chat_input.remove(byte_pos);
            }
        }
        KeyCode::Left => app.chat_cursor = app.chat_cursor.saturating_sub(1),
        KeyCode::Right => {
            app.chat_cursor = (app.chat_cursor + 1).min(app.chat_input.chars().count());
        }
        KeyCode::Home => app.chat_cursor = 0,
        KeyCode::End => app.chat_cursor = app.chat_input.chars().count(),
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.chat_input, app.chat_cursor);
            app.chat_input.insert(byte_pos, c);
            app.chat_cursor += 1;
        }
        _ => {}
    }
}

fn handle_form_key(app: &mut App, key: KeyEvent) {
    let form = app.form_mut();
    match key.code {
        KeyCode::Down => form.select_next(),
        KeyCode::Up | KeyCode::BackTab => form.select_prev(),
        KeyCode::Left => form.left(),
        KeyCode::Right => form.right(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.input_char(c),
        KeyCode::Enter => {
            if !form.enter() {
                app.start_generation();
            }
        }
        KeyCode::Esc => app.focus = Focus::Chat,
        _ => {}
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('c') => app.copy_result(),
        KeyCode::Char('d') => app.download_result(),
        KeyCode::Char('x') | KeyCode::Esc => app.close_result(),
        KeyCode::Down | KeyCode::Char('j') => app.result_scroll = app.result_scroll.saturating_add(1),
        KeyCode::Up | KeyCode::Char('k') => app.result_scroll = app.result_scroll.saturating_sub(1),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let up = match mouse.kind {
        MouseEventKind::ScrollUp => true,
        MouseEventKind::ScrollDown => false,
        _ => return,
    };
    match (app.focus, up) {
        (Focus::Result, true) => app.result_scroll = app.result_scroll.saturating_sub(3),
        (Focus::Result, false) => app.result_scroll = app.result_scroll.saturating_add(3),
        (_, true) => app.scroll_chat_up(),
        (_, false) => app.scroll_chat_down(),
    }
}

/// Pipe `text` into the first clipboard tool that is installed.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    const TOOLS: [(&str, &[&str]); 3] = [
        ("pbcopy", &[]),
        ("wl-copy", &[]),
        ("xclip", &["-selection", "clipboard"]),
    ];

    for (tool, args) in TOOLS {
        let Ok(child) = Command::new(tool).args(args).stdin(Stdio::piped()).spawn() else {
            continue;
        };
        let status = feed_and_wait(child, text)?;
        if status.success() {
            return Ok(());
        }
        tracing::debug!(tool, ?status, "clipboard tool failed");
    }

    Err(anyhow!("no clipboard tool found (pbcopy, wl-copy, xclip)"))
}

/// Write `text` to the child's stdin and reap it, even when the write fails.
fn feed_and_wait(mut child: Child, text: &str) -> Result<ExitStatus> {
    let written = match child.stdin.take() {
        // Dropping stdin closes the pipe so the tool sees EOF.
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };
    let status = child.wait()?;
    written?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_to_byte_index_handles_multibyte() {
        assert_eq!(char_to_byte_index("añb", 2), 3);
        assert_eq!(char_to_byte_index("abc", 10), 3);
    }

    #[cfg(unix)]
    fn sh(script: &str) -> Child {
        Command::new("sh")
            .args(["-c", script])
            .stdin(Stdio::piped())
            .spawn()
            .unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_feed_and_wait_reaps_child_when_write_fails() {
        // The child exits without reading, so a large write hits a closed pipe.
        let child = sh("exit 0");
        let id = child.id();
        let text = "x".repeat(4 * 1024 * 1024);
        assert!(feed_and_wait(child, &text).is_err());

        // A reaped child no longer has a /proc entry.
        assert!(!std::path::Path::new(&format!("/proc/{}", id)).exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_feed_and_wait_returns_tool_status() {
        let status = feed_and_wait(sh("cat >/dev/null"), "kind: KafkaTopic\n").unwrap();
        assert!(status.success());
        let status = feed_and_wait(sh("cat >/dev/null; exit 3"), "x").unwrap();
        assert_eq!(status.code(), Some(3));
    }
}
