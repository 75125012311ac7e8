//! ``src/model/app_state.rs``
//! ============================================================================
//! # `AppState`: Everything the Page Knows
//!
//! Loaded entries, the selection and filter, view settings, the staged upload
//! batch, the signed-in user and the UI state live here. Only the controller
//! mutates it; the renderer reads it.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::{
    auth::session::AuthUser,
    config::Config,
    error::AppError,
    model::{
        file_entry::FileEntry,
        selection::{SelectionSet, visible_entries},
        ui_state::UIState,
        upload_batch::UploadBatch,
        view_state::ViewState,
    },
};

/// What happened to a listing result handed to `apply_listing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingOutcome {
    /// Entries replaced; carries the new count.
    Applied(usize),
    /// Refresh failed; previous entries kept.
    Failed(AppError),
    /// Result of a superseded refresh; state untouched.
    Stale,
}

#[derive(Debug)]
pub struct AppState {
    pub entries: Vec<FileEntry>,
    pub selection: SelectionSet,
    pub view: ViewState,
    pub upload: UploadBatch,

    /// True while the current refresh is in flight.
    pub is_loading: bool,
    /// True while a submitted batch is being uploaded.
    pub is_uploading: bool,

    pub user: Option<AuthUser>,
    pub ui: UIState,

    listing_generation: u64,
    listing_cancel: Option<CancellationToken>,
    session: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl AppState {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            entries: Vec::new(),
            selection: SelectionSet::new(),
            view: ViewState::new(config.ui.default_view),
            upload: UploadBatch::new(),
            is_loading: false,
            is_uploading: false,
            user: None,
            ui: UIState::new(config.ui.notification_ttl),
            listing_generation: 0,
            listing_cancel: None,
            session: 0,
        }
    }

    /// Entries passing the current name filter, in listing order.
    #[must_use]
    pub fn visible_entries(&self) -> Vec<&FileEntry> {
        visible_entries(&self.entries, &self.view.search)
    }

    /// Entry under the cursor, among the visible ones.
    #[must_use]
    pub fn cursor_entry(&self) -> Option<&FileEntry> {
        self.visible_entries().get(self.ui.cursor).copied()
    }

    pub fn entry_mut(&mut self, id: &str) -> Option<&mut FileEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Keep the cursor inside the visible range.
    pub fn clamp_cursor(&mut self) {
        let visible = self.visible_entries().len();
        self.ui.cursor = self.ui.cursor.min(visible.saturating_sub(1));
    }

    #[must_use]
    pub const fn listing_generation(&self) -> u64 {
        self.listing_generation
    }

    /// Bumped on every sign-out; background work tagged with an older value
    /// belongs to a session that no longer exists.
    #[must_use]
    pub const fn session(&self) -> u64 {
        self.session
    }

    /// Start a new refresh: cancel the one in flight, bump the generation and
    /// raise the loading flag. Returns the generation and token to run under.
    #[instrument(level = "debug", skip(self))]
    pub fn begin_refresh(&mut self) -> (u64, CancellationToken) {
        if let Some(previous) = self.listing_cancel.take() {
            debug!(generation = self.listing_generation, "Cancelling superseded refresh");
            previous.cancel();
        }

        self.listing_generation += 1;
        let token = CancellationToken::new();
        self.listing_cancel = Some(token.clone());
        self.is_loading = true;

        (self.listing_generation, token)
    }

    /// Fold a finished refresh into state.
    ///
    /// Only the current generation is applied. Success replaces the entries
    /// wholesale, so stars reset; failure keeps the previous entries. Either
    /// way the loading flag drops.
    #[instrument(level = "debug", skip(self, result), fields(current = self.listing_generation))]
    pub fn apply_listing(
        &mut self,
        generation: u64,
        result: Result<Vec<FileEntry>, AppError>,
    ) -> ListingOutcome {
        if generation != self.listing_generation {
            debug!(generation, "Dropping stale listing result");
            return ListingOutcome::Stale;
        }

        self.is_loading = false;
        self.listing_cancel = None;

        match result {
            Ok(entries) => {
                let count = entries.len();
                self.entries = entries;
                self.clamp_cursor();

                info!(generation, entries = count, "Listing applied");
                ListingOutcome::Applied(count)
            }

            Err(e) => ListingOutcome::Failed(e),
        }
    }

    /// Drop everything tied to the signed-in user.
    pub fn sign_out(&mut self) {
        if let Some(token) = self.listing_cancel.take() {
            token.cancel();
        }

        self.listing_generation += 1;
        self.session += 1;
        self.user = None;
        self.entries.clear();
        self.selection.clear();
        self.upload.clear();
        self.is_loading = false;
        self.is_uploading = false;
        self.ui.cursor = 0;
        self.ui.upload_cursor = 0;
    }
}
