//! ``src/controller/actions.rs``
//! ============================================================================
//! # Actions: Every Intent the File Manager Responds To
//!
//! Terminal input, background task results and auth changes are all reduced
//! to `Action`s before they reach the `FileManager`.

use compact_str::CompactString;

use crate::{auth::session::AuthEvent, controller::event_loop::TaskResult, model::view_state::Folder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Sign-in state changed.
    Auth(AuthEvent),

    /// Notify about downloading every selected entry.
    BulkDownload,

    /// Leave the current text input mode.
    CancelInput,

    CloseUploadDialog,

    /// Hide the toast before it expires.
    DismissNotification,

    /// Download one entry by id.
    Download(CompactString),

    /// Start typing into the search box.
    EnterSearch,

    /// Start typing a path into the upload picker.
    EnterUploadPath,

    InputBackspace,

    InputChar(char),

    MoveDown,

    MoveUp,

    NextFolder,

    OpenUploadDialog,

    PrevFolder,

    Quit,

    Refresh,

    Resize(u16, u16),

    /// Jump straight to a sidebar folder.
    SelectFolder(Folder),

    /// Replace the name filter.
    SetFilter(String),

    /// Sign in under the given user name.
    SignIn(String),

    SignOut,

    /// Stage the files named in a drop payload or picker input.
    StagePaths(String),

    /// Confirm the text input of the current mode.
    SubmitInput,

    SubmitUpload,

    /// A background task finished.
    TaskResult(TaskResult),

    /// Periodic wake-up for notification expiry and the spinner.
    Tick,

    /// Flip selection of one entry by id.
    ToggleSelection(CompactString),

    /// Flip the session-local star of one entry by id.
    ToggleStar(CompactString),

    ToggleViewMode,

    /// Remove one staged blob by position.
    Unstage(usize),
}
