//! ``src/controller/event_loop.rs``
//! ============================================================================
//! # Event Loop: Task Results, Auth Changes and Key Mapping
//!
//! Background work reports back as `TaskResult`s over an unbounded channel.
//! `EventLoop` merges those with sign-in changes and a periodic tick into a
//! single stream of `Action`s; terminal input is mapped separately by
//! `map_terminal_event`, which needs the current state to resolve the entry
//! under the cursor.

use std::time::Duration;

use crossterm::event::{Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::{
    sync::mpsc,
    time::{Instant, Interval, MissedTickBehavior, interval_at},
};
use tracing::{debug, info, trace};

use crate::{
    auth::session::AuthSubscription,
    controller::actions::Action,
    error::AppError,
    model::{
        app_state::AppState,
        file_entry::FileEntry,
        ui_state::{UIMode, UIOverlay},
        view_state::Folder,
    },
    storage::gateway::ObjectRef,
};

/// Completion of a spawned background task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// A listing refresh finished; `generation` identifies which one.
    ListingLoaded {
        generation: u64,
        result: Result<Vec<FileEntry>, AppError>,
    },

    /// A batch submission finished; `session` is the one it was submitted in.
    UploadFinished {
        session: u64,
        result: Result<Vec<ObjectRef>, AppError>,
    },
}

pub struct EventLoop {
    task_rx: mpsc::UnboundedReceiver<TaskResult>,
    auth: AuthSubscription,
    tick: Interval,

    task_count: u64,
    auth_count: u64,
}

impl EventLoop {
    pub fn new(
        task_rx: mpsc::UnboundedReceiver<TaskResult>,
        auth: AuthSubscription,
        tick_rate: Duration,
    ) -> Self {
        let mut tick = interval_at(Instant::now() + tick_rate, tick_rate);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(tick_ms = tick_rate.as_millis() as u64, "Event loop initialized");

        Self {
            task_rx,
            auth,
            tick,
            task_count: 0,
            auth_count: 0,
        }
    }

    /// Wait for the next non-terminal action.
    pub async fn next_action(&mut self) -> Action {
        tokio::select! {
            biased;

            Some(task_result) = self.task_rx.recv() => {
                self.task_count += 1;
                debug!(tasks = self.task_count, "Task result received");
                Action::TaskResult(task_result)
            }

            Some(event) = self.auth.changed(), if self.auth.is_active() => {
                self.auth_count += 1;
                debug!(?event, "Auth event received");
                Action::Auth(event)
            }

            _ = self.tick.tick() => Action::Tick,
        }
    }

    /// Tear down the auth subscription.
    pub fn shutdown(&mut self) {
        self.auth.unsubscribe();
        info!(
            tasks = self.task_count,
            auth_events = self.auth_count,
            "Event loop shut down"
        );
    }
}

/// Map one terminal event to an action, given the current state.
#[must_use]
pub fn map_terminal_event(event: &TermEvent, state: &AppState) -> Option<Action> {
    let action = match event {
        TermEvent::Key(key) if key.kind != KeyEventKind::Release => map_key(key, state),
        TermEvent::Paste(text) => map_paste(text, state),
        TermEvent::Resize(width, height) => Some(Action::Resize(*width, *height)),
        _ => None,
    };

    trace!(?event, ?action, "Terminal event mapped");
    action
}

fn map_key(key: &KeyEvent, state: &AppState) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }

    match state.ui.mode {
        UIMode::Search => map_search_key(key, state),
        UIMode::UploadPath | UIMode::SignIn => map_text_key(key),
        UIMode::Browse => match state.ui.overlay {
            UIOverlay::UploadDialog => map_upload_key(key, state),
            UIOverlay::SignIn => map_text_key(key),
            UIOverlay::None => map_browse_key(key, state),
        },
    }
}

fn map_browse_key(key: &KeyEvent, state: &AppState) -> Option<Action> {
    let cursor_id = || state.cursor_entry().map(|e| e.id.clone());

    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),

        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),
        KeyCode::Tab => Some(Action::NextFolder),
        KeyCode::BackTab => Some(Action::PrevFolder),
        KeyCode::Char(c @ '1'..='8') => {
            let index = c.to_digit(10).map_or(0, |d| d as usize - 1);
            Folder::ALL.get(index).copied().map(Action::SelectFolder)
        }

        KeyCode::Char(' ') => cursor_id().map(Action::ToggleSelection),
        KeyCode::Enter | KeyCode::Char('d') => cursor_id().map(Action::Download),
        KeyCode::Char('s') => cursor_id().map(Action::ToggleStar),
        KeyCode::Char('D') => Some(Action::BulkDownload),

        KeyCode::Char('v') => Some(Action::ToggleViewMode),
        KeyCode::Char('/') => Some(Action::EnterSearch),
        KeyCode::Char('u') => Some(Action::OpenUploadDialog),
        KeyCode::Char('r') | KeyCode::F(5) => Some(Action::Refresh),
        KeyCode::Char('L') => Some(Action::SignOut),

        KeyCode::Esc if !state.view.search.text().is_empty() => {
            Some(Action::SetFilter(String::new()))
        }
        KeyCode::Esc if state.ui.notification.is_some() => Some(Action::DismissNotification),

        _ => None,
    }
}

fn map_upload_key(key: &KeyEvent, state: &AppState) -> Option<Action> {
    match key.code {
        KeyCode::Esc => Some(Action::CloseUploadDialog),
        KeyCode::Char('q') => Some(Action::Quit),

        KeyCode::Up | KeyCode::Char('k') => Some(Action::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::MoveDown),

        KeyCode::Char('p' | 'a') => Some(Action::EnterUploadPath),
        KeyCode::Char('x') | KeyCode::Delete if !state.upload.is_empty() => {
            Some(Action::Unstage(state.ui.upload_cursor))
        }
        KeyCode::Enter => Some(Action::SubmitUpload),

        _ => None,
    }
}

/// Search edits apply to the filter on every keystroke.
fn map_search_key(key: &KeyEvent, state: &AppState) -> Option<Action> {
    let text = state.view.search.text();

    match key.code {
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::SetFilter(String::new()))
        }
        KeyCode::Char(c) => Some(Action::SetFilter(format!("{text}{c}"))),
        KeyCode::Backspace => {
            let mut edited = text.to_string();
            edited.pop();
            Some(Action::SetFilter(edited))
        }
        KeyCode::Enter | KeyCode::Esc => Some(Action::CancelInput),
        _ => None,
    }
}

fn map_text_key(key: &KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char(c) => Some(Action::InputChar(c)),
        KeyCode::Backspace => Some(Action::InputBackspace),
        KeyCode::Enter => Some(Action::SubmitInput),
        KeyCode::Esc => Some(Action::CancelInput),
        _ => None,
    }
}

/// A paste is the terminal's drag-and-drop: the payload names the dropped
/// files. Inside text inputs it is typed text instead.
fn map_paste(text: &str, state: &AppState) -> Option<Action> {
    match state.ui.mode {
        UIMode::Search => {
            let pasted = text.trim();
            Some(Action::SetFilter(format!("{}{pasted}", state.view.search.text())))
        }
        UIMode::SignIn => None,
        UIMode::Browse | UIMode::UploadPath => {
            state.user.as_ref()?;
            (!text.trim().is_empty()).then(|| Action::StagePaths(text.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::session::{AuthEvent, AuthProvider, AuthUser, SessionAuth},
        model::file_entry::FileKind,
    };
    use chrono::Utc;
    use compact_str::CompactString;

    fn key(code: KeyCode) -> TermEvent {
        TermEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn signed_in_state() -> AppState {
        let mut state = AppState::default();
        state.user = Some(AuthUser::new("ada"));
        state.entries = ["a.txt", "b.txt"]
            .into_iter()
            .map(|name| FileEntry {
                id: CompactString::new(format!("files/{name}")),
                name: CompactString::new(name),
                kind: FileKind::Document,
                size_label: "1 KB".into(),
                modified_label: "1/1/2024".into(),
                starred: false,
                size_bytes: 1024,
                modified: Utc::now(),
                content_type: "text/plain".into(),
                download_url: None,
            })
            .collect();
        state
    }

    #[test]
    fn space_toggles_entry_under_cursor() {
        let mut state = signed_in_state();
        state.ui.cursor = 1;

        assert_eq!(
            map_terminal_event(&key(KeyCode::Char(' ')), &state),
            Some(Action::ToggleSelection("files/b.txt".into()))
        );
    }

    #[test]
    fn entry_keys_need_an_entry() {
        let state = AppState::default();

        assert_eq!(map_terminal_event(&key(KeyCode::Char('s')), &state), None);
        assert_eq!(map_terminal_event(&key(KeyCode::Enter), &state), None);
    }

    #[test]
    fn search_mode_edits_filter_live() {
        let mut state = signed_in_state();
        state.ui.mode = UIMode::Search;
        state.view.search.set("rep");

        assert_eq!(
            map_terminal_event(&key(KeyCode::Char('o')), &state),
            Some(Action::SetFilter("repo".into()))
        );
        assert_eq!(
            map_terminal_event(&key(KeyCode::Backspace), &state),
            Some(Action::SetFilter("re".into()))
        );
        // 'q' is text here, not quit.
        assert_eq!(
            map_terminal_event(&key(KeyCode::Char('q')), &state),
            Some(Action::SetFilter("repq".into()))
        );
    }

    #[test]
    fn paste_stages_paths_when_signed_in() {
        let state = signed_in_state();
        let paste = TermEvent::Paste("/tmp/a.txt /tmp/b.txt".into());

        assert_eq!(
            map_terminal_event(&paste, &state),
            Some(Action::StagePaths("/tmp/a.txt /tmp/b.txt".into()))
        );
        assert_eq!(map_terminal_event(&paste, &AppState::default()), None);
    }

    #[test]
    fn upload_dialog_keys() {
        let mut state = signed_in_state();
        state.ui.overlay = UIOverlay::UploadDialog;

        assert_eq!(map_terminal_event(&key(KeyCode::Enter), &state), Some(Action::SubmitUpload));
        assert_eq!(map_terminal_event(&key(KeyCode::Esc), &state), Some(Action::CloseUploadDialog));
        // Nothing staged, nothing to remove.
        assert_eq!(map_terminal_event(&key(KeyCode::Char('x')), &state), None);
    }

    #[test]
    fn number_keys_jump_to_folders() {
        let state = signed_in_state();

        assert_eq!(
            map_terminal_event(&key(KeyCode::Char('1')), &state),
            Some(Action::SelectFolder(Folder::ALL[0]))
        );
        assert_eq!(
            map_terminal_event(&key(KeyCode::Char('8')), &state),
            Some(Action::SelectFolder(Folder::ALL[7]))
        );
        assert_eq!(map_terminal_event(&key(KeyCode::Char('9')), &state), None);
    }

    #[test]
    fn esc_clears_filter_before_dismissing_toast() {
        let mut state = signed_in_state();
        assert_eq!(map_terminal_event(&key(KeyCode::Esc), &state), None);

        state.ui.show_info("Signed out");
        assert_eq!(
            map_terminal_event(&key(KeyCode::Esc), &state),
            Some(Action::DismissNotification)
        );

        state.view.search.set("a");
        assert_eq!(
            map_terminal_event(&key(KeyCode::Esc), &state),
            Some(Action::SetFilter(String::new()))
        );
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut state = AppState::default();
        state.ui.mode = UIMode::SignIn;
        let ctrl_c = TermEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));

        assert_eq!(map_terminal_event(&ctrl_c, &state), Some(Action::Quit));
    }

    #[tokio::test]
    async fn next_action_delivers_auth_then_tasks() {
        let auth = SessionAuth::new(Some(AuthUser::new("ada")));
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let mut events = EventLoop::new(task_rx, auth.subscribe(), Duration::from_secs(60));

        assert_eq!(
            events.next_action().await,
            Action::Auth(AuthEvent::SignedIn(AuthUser::new("ada")))
        );

        task_tx
            .send(TaskResult::UploadFinished { session: 0, result: Ok(Vec::new()) })
            .unwrap();
        assert_eq!(
            events.next_action().await,
            Action::TaskResult(TaskResult::UploadFinished {
                session: 0,
                result: Ok(Vec::new())
            })
        );

        auth.sign_out();
        assert_eq!(events.next_action().await, Action::Auth(AuthEvent::SignedOut));
    }

    #[tokio::test]
    async fn shutdown_unsubscribes() {
        let auth = SessionAuth::default();
        let (_task_tx, task_rx) = mpsc::unbounded_channel();
        let mut events = EventLoop::new(task_rx, auth.subscribe(), Duration::from_millis(10));

        events.shutdown();

        assert_eq!(auth.subscriber_count(), 0);
        assert_eq!(events.next_action().await, Action::Tick);
    }
}
