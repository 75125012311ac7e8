//! ``src/controller/file_manager.rs``
//! ============================================================================
//! # `FileManager`: The Page Controller
//!
//! Owns `AppState` together with the storage gateway, the auth provider and
//! the listing pipeline, and is the only place state is mutated. Every
//! `Action` lands in `handle`; slow work (listing refreshes, uploads) is
//! spawned and reports back through the task channel.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    auth::session::{AuthEvent, AuthProvider, AuthUser},
    config::Config,
    controller::{actions::Action, event_loop::TaskResult},
    error::AppError,
    model::{
        app_state::{AppState, ListingOutcome},
        file_entry::FileEntry,
        ui_state::{RedrawFlag, UIMode, UIOverlay},
        upload_batch::{blobs_from_paths, normalize_file_list},
    },
    storage::gateway::{ObjectRef, StorageGateway},
    tasks::{
        listing_task::{ListingPipeline, spawn_listing_refresh},
        upload_task::spawn_upload,
    },
};

pub struct FileManager {
    state: AppState,
    gateway: Arc<dyn StorageGateway>,
    auth: Arc<dyn AuthProvider>,
    pipeline: Arc<ListingPipeline>,
    prefix: String,
    task_tx: UnboundedSender<TaskResult>,
}

impl FileManager {
    pub fn new(
        config: &Config,
        gateway: Arc<dyn StorageGateway>,
        auth: Arc<dyn AuthProvider>,
        task_tx: UnboundedSender<TaskResult>,
    ) -> Self {
        let pipeline = Arc::new(ListingPipeline::new(gateway.clone(), config.listing.clone()));

        Self {
            state: AppState::new(config),
            gateway,
            auth,
            pipeline,
            prefix: config.storage.prefix.clone(),
            task_tx,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    pub fn needs_redraw(&self) -> bool {
        self.state.ui.needs_redraw()
    }

    pub fn clear_redraw(&mut self) {
        self.state.ui.clear_redraw();
    }

    /// Apply one action. Returns false when the application should exit.
    #[instrument(level = "debug", skip(self))]
    pub async fn handle(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => {
                info!("Quit requested");
                return false;
            }

            Action::Auth(event) => self.on_auth(event),
            Action::TaskResult(result) => self.on_task_result(result),

            Action::Refresh => self.request_refresh(),

            Action::ToggleSelection(id) => {
                let selected = self.state.selection.toggle(&id);
                debug!(%id, selected, "Selection toggled");
                self.state.ui.request_redraw(RedrawFlag::Main);
            }

            Action::SetFilter(text) => {
                self.state.view.search.set(text);
                self.state.clamp_cursor();
                self.state.ui.request_redraw(RedrawFlag::All);
            }

            Action::ToggleViewMode => {
                self.state.view.view_mode = self.state.view.view_mode.toggled();
                self.state.ui.request_redraw(RedrawFlag::Main);
            }

            Action::SelectFolder(folder) => {
                self.state.view.selected_folder = folder;
                self.state.ui.request_redraw(RedrawFlag::All);
            }
            Action::NextFolder => {
                let folder = self.state.view.selected_folder.next();
                self.state.view.selected_folder = folder;
                self.state.ui.request_redraw(RedrawFlag::All);
            }
            Action::PrevFolder => {
                let folder = self.state.view.selected_folder.prev();
                self.state.view.selected_folder = folder;
                self.state.ui.request_redraw(RedrawFlag::All);
            }

            Action::MoveUp => self.move_cursor(-1),
            Action::MoveDown => self.move_cursor(1),

            Action::Download(id) => self.download(&id),
            Action::BulkDownload => self.bulk_download(),

            Action::ToggleStar(id) => {
                if let Some(entry) = self.state.entry_mut(&id) {
                    let starred = entry.toggle_star();
                    debug!(%id, starred, "Star toggled");
                }
                self.state.ui.request_redraw(RedrawFlag::Main);
            }

            Action::DismissNotification => self.state.ui.dismiss_notification(),

            Action::OpenUploadDialog => self.open_upload_dialog(),
            Action::CloseUploadDialog => self.close_upload_dialog(),

            Action::EnterSearch => {
                self.state.ui.mode = UIMode::Search;
                self.state.ui.request_redraw(RedrawFlag::All);
            }
            Action::EnterUploadPath => {
                self.state.ui.mode = UIMode::UploadPath;
                self.state.ui.clear_input();
                self.state.ui.request_redraw(RedrawFlag::Overlay);
            }

            Action::InputChar(c) => {
                self.state.ui.input.push(c);
                self.state.ui.request_redraw(RedrawFlag::Overlay);
            }
            Action::InputBackspace => {
                self.state.ui.input.pop();
                self.state.ui.request_redraw(RedrawFlag::Overlay);
            }
            Action::SubmitInput => self.submit_input().await,
            Action::CancelInput => self.cancel_input(),

            Action::StagePaths(raw) => self.stage_paths(&raw).await,
            Action::Unstage(index) => self.unstage(index),
            Action::SubmitUpload => self.submit_upload(),

            Action::SignIn(name) => self.sign_in(&name),
            Action::SignOut => self.auth.sign_out(),

            Action::Tick => {
                self.state.ui.update_notification();
                if self.state.is_loading || self.state.is_uploading {
                    self.state.ui.request_redraw(RedrawFlag::Main);
                }
            }

            Action::Resize(..) => self.state.ui.request_redraw(RedrawFlag::All),
        }

        true
    }

    fn on_auth(&mut self, event: AuthEvent) {
        match event {
            AuthEvent::SignedIn(user) => {
                info!(uid = %user.uid, "Session started");
                self.state.user = Some(user);
                self.state.ui.overlay = UIOverlay::None;
                self.state.ui.mode = UIMode::Browse;
                self.state.ui.clear_input();
                self.request_refresh();
            }

            AuthEvent::SignedOut => {
                info!("Session ended, routing to sign-in");
                self.state.sign_out();
                self.state.ui.overlay = UIOverlay::SignIn;
                self.state.ui.mode = UIMode::SignIn;
                self.state.ui.clear_input();
                self.state.ui.show_info("Signed out");
            }
        }

        self.state.ui.request_redraw(RedrawFlag::All);
    }

    fn on_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::ListingLoaded { generation, result } => {
                match self.state.apply_listing(generation, result) {
                    ListingOutcome::Applied(count) => {
                        debug!(generation, count, "Listing shown");
                    }
                    ListingOutcome::Failed(e) => {
                        error!(generation, error = %e, "Failed to load files");
                        self.state.ui.show_error("Failed to load files");
                    }
                    ListingOutcome::Stale => {}
                }
            }

            TaskResult::UploadFinished { session, result } => {
                self.on_upload_finished(session, result);
            }
        }

        self.state.ui.request_redraw(RedrawFlag::All);
    }

    /// Start a background refresh, superseding any refresh in flight.
    fn request_refresh(&mut self) {
        if self.state.user.is_none() {
            debug!("Refresh skipped, nobody signed in");
            return;
        }

        let (generation, cancel) = self.state.begin_refresh();
        info!(generation, prefix = %self.prefix, "Refreshing listing");

        spawn_listing_refresh(
            self.pipeline.clone(),
            self.prefix.clone(),
            generation,
            cancel,
            self.task_tx.clone(),
        );

        self.state.ui.request_redraw(RedrawFlag::Main);
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.state.ui.overlay == UIOverlay::UploadDialog {
            let len = self.state.upload.len();
            self.state.ui.upload_cursor = step(self.state.ui.upload_cursor, delta, len);
        } else {
            let len = self.state.visible_entries().len();
            self.state.ui.cursor = step(self.state.ui.cursor, delta, len);
        }

        self.state.ui.request_redraw(RedrawFlag::Main);
    }

    fn find_entry(&self, id: &str) -> Option<&FileEntry> {
        self.state.entries.iter().find(|e| e.id == id)
    }

    fn download(&mut self, id: &str) {
        let Some(entry) = self.find_entry(id) else {
            warn!(%id, "Download requested for unknown entry");
            return;
        };

        let message = format!("Downloading {}...", entry.name);
        info!(
            marker = "DOWNLOAD",
            id = %entry.id,
            url = entry.download_url.as_ref().map(|u| u.as_str()),
            "Download requested"
        );

        self.state.ui.show_success(message);
    }

    fn bulk_download(&mut self) {
        let count = self.state.selection.len();

        if count == 0 {
            self.state.ui.show_error("Please select files to download");
            return;
        }

        info!(marker = "BULK_DOWNLOAD", count, "Bulk download requested");
        self.state.ui.show_success(format!("Downloading {count} file(s)..."));
    }

    fn open_upload_dialog(&mut self) {
        if self.state.user.is_none() {
            return;
        }

        self.state.ui.overlay = UIOverlay::UploadDialog;
        self.state.ui.mode = UIMode::Browse;
        self.state.ui.upload_cursor = 0;
        self.state.ui.request_redraw(RedrawFlag::All);
    }

    /// Closing the dialog discards whatever was staged.
    fn close_upload_dialog(&mut self) {
        if self.state.is_uploading {
            self.state.ui.show_warning("Upload in progress");
            return;
        }

        self.state.upload.clear();
        self.state.ui.overlay = UIOverlay::None;
        self.state.ui.mode = UIMode::Browse;
        self.state.ui.clear_input();
        self.state.ui.request_redraw(RedrawFlag::All);
    }

    async fn submit_input(&mut self) {
        match self.state.ui.mode {
            UIMode::UploadPath => {
                let raw = self.state.ui.take_input();
                self.stage_paths(&raw).await;
            }
            UIMode::SignIn => {
                let name = self.state.ui.take_input();
                self.sign_in(&name);
            }
            UIMode::Search => self.state.ui.mode = UIMode::Browse,
            UIMode::Browse => {}
        }

        self.state.ui.request_redraw(RedrawFlag::All);
    }

    fn cancel_input(&mut self) {
        self.state.ui.clear_input();
        self.state.ui.mode = match self.state.ui.overlay {
            UIOverlay::SignIn => UIMode::SignIn,
            UIOverlay::None | UIOverlay::UploadDialog => UIMode::Browse,
        };
        self.state.ui.request_redraw(RedrawFlag::All);
    }

    fn sign_in(&mut self, name: &str) {
        let name = name.trim();

        if name.is_empty() {
            self.state.ui.show_warning("Enter a user name to sign in");
            return;
        }

        self.auth.sign_in(AuthUser::new(name));
    }

    /// Drop and picker input both end up here.
    async fn stage_paths(&mut self, raw: &str) {
        if self.state.user.is_none() {
            return;
        }

        if self.state.ui.overlay != UIOverlay::UploadDialog {
            self.open_upload_dialog();
        }
        self.state.ui.mode = UIMode::Browse;

        let paths = normalize_file_list(raw);
        let (blobs, errors) = blobs_from_paths(&paths).await;

        for e in &errors {
            warn!(error = %e, "Skipped unreadable path");
        }

        let added = self.state.upload.stage(blobs);

        if added > 0 {
            info!(added, staged = self.state.upload.len(), "Files staged");
            self.state.ui.show_success(format!("{added} file(s) added successfully"));
        } else if let Some(e) = errors.first() {
            self.state.ui.show_error(e.to_string());
        }

        self.state.ui.request_redraw(RedrawFlag::All);
    }

    fn unstage(&mut self, index: usize) {
        if let Some(removed) = self.state.upload.unstage(index) {
            debug!(name = %removed.name, index, "Unstaged");
        }

        let len = self.state.upload.len();
        self.state.ui.upload_cursor = self.state.ui.upload_cursor.min(len.saturating_sub(1));
        self.state.ui.request_redraw(RedrawFlag::Overlay);
    }

    fn submit_upload(&mut self) {
        if self.state.user.is_none() {
            self.state.ui.show_error(AppError::AuthRequired.to_string());
            return;
        }

        if self.state.upload.is_empty() || self.state.is_uploading {
            return;
        }

        self.state.is_uploading = true;
        info!(blobs = self.state.upload.len(), "Submitting upload batch");

        spawn_upload(
            self.gateway.clone(),
            self.prefix.clone(),
            self.state.upload.items().to_vec(),
            self.state.session(),
            self.task_tx.clone(),
        );

        self.state.ui.request_redraw(RedrawFlag::All);
    }

    fn on_upload_finished(&mut self, session: u64, result: Result<Vec<ObjectRef>, AppError>) {
        if session != self.state.session() {
            debug!(
                session,
                current = self.state.session(),
                "Dropping upload result from an ended session"
            );
            return;
        }

        self.state.is_uploading = false;

        match result {
            Ok(stored) => {
                info!(uploaded = stored.len(), "Upload batch stored");
                self.state.upload.clear();
                self.request_refresh();
                self.close_upload_dialog();
                self.state.ui.show_success("Files uploaded successfully");
            }

            Err(e) => {
                error!(error = %e, "Upload batch failed");
                self.state.ui.show_error(e.to_string());
            }
        }
    }
}

/// Move `current` by `delta` within `0..len`, clamping at both ends.
fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }

    current.saturating_add_signed(delta).min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::session::SessionAuth, model::view_state::Folder, storage::memory_bucket::MemoryBucket,
    };
    use bytes::Bytes;
    use chrono::Utc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    struct Harness {
        manager: FileManager,
        bucket: Arc<MemoryBucket>,
        auth: Arc<SessionAuth>,
        task_rx: UnboundedReceiver<TaskResult>,
    }

    impl Harness {
        fn new() -> Self {
            let bucket = Arc::new(MemoryBucket::new());
            let now = Utc::now();
            bucket.insert("files/a.pdf", "application/pdf", Bytes::from_static(b"a"), now);
            bucket.insert("files/b.png", "image/png", Bytes::from_static(b"b"), now);
            bucket.insert("files/c.zip", "application/zip", Bytes::from_static(b"c"), now);

            let auth = Arc::new(SessionAuth::default());
            let (task_tx, task_rx) = mpsc::unbounded_channel();
            let manager = FileManager::new(&Config::default(), bucket.clone(), auth.clone(), task_tx);

            Self {
                manager,
                bucket,
                auth,
                task_rx,
            }
        }

        async fn signed_in() -> Self {
            let mut h = Self::new();
            h.manager
                .handle(Action::Auth(AuthEvent::SignedIn(AuthUser::new("ada"))))
                .await;
            h.pump().await;
            h
        }

        /// Feed the next task result back into the manager.
        async fn pump(&mut self) {
            let result = tokio::time::timeout(Duration::from_secs(5), self.task_rx.recv())
                .await
                .expect("task result in time")
                .expect("task channel open");
            self.manager.handle(Action::TaskResult(result)).await;
        }

        fn notification(&self) -> String {
            self.manager
                .state()
                .ui
                .notification
                .as_ref()
                .map(|n| n.message.to_string())
                .unwrap_or_default()
        }
    }

    #[tokio::test]
    async fn sign_in_loads_listing() {
        let h = Harness::signed_in().await;
        let state = h.manager.state();

        assert_eq!(state.entries.len(), 3);
        assert!(!state.is_loading);
        assert_eq!(h.bucket.list_calls(), 1);
    }

    #[tokio::test]
    async fn metadata_failure_keeps_previous_entries() {
        let mut h = Harness::signed_in().await;
        h.bucket.fail_metadata_for("files/b.png");

        h.manager.handle(Action::Refresh).await;
        assert!(h.manager.state().is_loading);
        h.pump().await;

        let state = h.manager.state();
        assert_eq!(state.entries.len(), 3);
        assert!(!state.is_loading);
        assert_eq!(h.notification(), "Failed to load files");
    }

    #[tokio::test]
    async fn stage_two_and_submit_refreshes_once() {
        let mut h = Harness::signed_in().await;
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("one.txt");
        let second = dir.path().join("two.txt");
        tokio::fs::write(&first, b"1").await.unwrap();
        tokio::fs::write(&second, b"22").await.unwrap();

        let raw = format!("{}\n{}", first.display(), second.display());
        h.manager.handle(Action::StagePaths(raw)).await;
        assert_eq!(h.manager.state().upload.len(), 2);
        assert_eq!(h.notification(), "2 file(s) added successfully");
        assert_eq!(h.manager.state().ui.overlay, UIOverlay::UploadDialog);

        let lists_before = h.bucket.list_calls();
        h.manager.handle(Action::SubmitUpload).await;
        h.pump().await; // upload finished

        assert!(h.manager.state().upload.is_empty());
        assert_eq!(h.manager.state().ui.overlay, UIOverlay::None);
        assert_eq!(h.notification(), "Files uploaded successfully");

        h.pump().await; // refresh finished
        assert_eq!(h.bucket.list_calls(), lists_before + 1);
        assert_eq!(h.manager.state().entries.len(), 5);
        assert!(h.task_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_upload_keeps_batch() {
        let mut h = Harness::signed_in().await;
        h.bucket.fail_upload_for("bad.bin");
        h.manager.handle(Action::OpenUploadDialog).await;
        h.manager.state.upload.stage([
            crate::model::upload_batch::StagedBlob::from_bytes("ok.txt", Bytes::from_static(b"ok")),
            crate::model::upload_batch::StagedBlob::from_bytes("bad.bin", Bytes::from_static(b"no")),
        ]);

        let lists_before = h.bucket.list_calls();
        h.manager.handle(Action::SubmitUpload).await;
        h.pump().await;

        let state = h.manager.state();
        assert_eq!(state.upload.len(), 2);
        assert!(!state.is_uploading);
        assert_eq!(state.ui.overlay, UIOverlay::UploadDialog);
        assert_eq!(h.bucket.list_calls(), lists_before);
        assert!(h.notification().starts_with("Upload failed (1 uploaded, 1 failed)"));
    }

    #[tokio::test]
    async fn superseded_refresh_is_dropped() {
        let mut h = Harness::signed_in().await;
        h.manager.handle(Action::Refresh).await;
        let first = h.manager.state().listing_generation();

        h.bucket.insert("files/d.txt", "text/plain", Bytes::from_static(b"d"), Utc::now());
        h.manager.handle(Action::Refresh).await;

        // Both refreshes report back; only the newer one applies.
        h.pump().await;
        h.pump().await;

        let state = h.manager.state();
        assert_eq!(state.listing_generation(), first + 1);
        assert_eq!(state.entries.len(), 4);
        assert!(!state.is_loading);
        assert_eq!(h.notification(), "");
    }

    #[tokio::test]
    async fn filter_without_matches_shows_nothing() {
        let mut h = Harness::signed_in().await;
        h.manager.handle(Action::SetFilter("xyz".into())).await;

        assert!(h.manager.state().visible_entries().is_empty());
        assert_eq!(h.manager.state().entries.len(), 3);
    }

    #[tokio::test]
    async fn bulk_download_needs_selection() {
        let mut h = Harness::signed_in().await;

        h.manager.handle(Action::BulkDownload).await;
        assert_eq!(h.notification(), "Please select files to download");

        h.manager.handle(Action::ToggleSelection("files/a.pdf".into())).await;
        h.manager.handle(Action::ToggleSelection("files/c.zip".into())).await;
        h.manager.handle(Action::BulkDownload).await;
        assert_eq!(h.notification(), "Downloading 2 file(s)...");
    }

    #[tokio::test]
    async fn download_names_the_entry() {
        let mut h = Harness::signed_in().await;
        h.manager.handle(Action::Download("files/b.png".into())).await;

        assert_eq!(h.notification(), "Downloading b.png...");
    }

    #[tokio::test]
    async fn star_is_session_local() {
        let mut h = Harness::signed_in().await;
        h.manager.handle(Action::ToggleStar("files/a.pdf".into())).await;

        assert!(h.manager.state().entries[0].starred);
        assert_eq!(h.bucket.upload_calls(), 0);
    }

    #[tokio::test]
    async fn sign_out_routes_to_sign_in() {
        let mut h = Harness::signed_in().await;
        h.manager.handle(Action::ToggleSelection("files/a.pdf".into())).await;

        h.auth.sign_out();
        h.manager.handle(Action::Auth(AuthEvent::SignedOut)).await;

        let state = h.manager.state();
        assert_eq!(state.ui.overlay, UIOverlay::SignIn);
        assert_eq!(state.ui.mode, UIMode::SignIn);
        assert!(state.selection.is_empty());
        assert!(state.entries.is_empty());
        assert_eq!(h.notification(), "Signed out");
    }

    #[tokio::test]
    async fn upload_finishing_after_sign_out_is_ignored() {
        let mut h = Harness::signed_in().await;
        h.manager.handle(Action::OpenUploadDialog).await;
        h.manager.state.upload.stage([crate::model::upload_batch::StagedBlob::from_bytes(
            "late.txt",
            Bytes::from_static(b"late"),
        )]);

        let lists_before = h.bucket.list_calls();
        h.manager.handle(Action::SubmitUpload).await;
        h.auth.sign_out();
        h.manager.handle(Action::Auth(AuthEvent::SignedOut)).await;
        h.pump().await; // upload from the old session lands

        let state = h.manager.state();
        assert_eq!(state.ui.overlay, UIOverlay::SignIn);
        assert_eq!(state.ui.mode, UIMode::SignIn);
        assert!(state.user.is_none());
        assert!(state.entries.is_empty());
        assert_eq!(h.notification(), "Signed out");
        assert_eq!(h.bucket.list_calls(), lists_before);
        assert!(h.task_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn dismiss_and_folder_jump() {
        let mut h = Harness::signed_in().await;
        h.manager.handle(Action::BulkDownload).await;
        assert!(h.manager.state().ui.notification.is_some());

        h.manager.handle(Action::DismissNotification).await;
        assert!(h.manager.state().ui.notification.is_none());

        h.manager.handle(Action::SelectFolder(Folder::ALL[3])).await;
        assert_eq!(h.manager.state().view.selected_folder, Folder::ALL[3]);
    }

    #[tokio::test]
    async fn typed_name_signs_in() {
        let mut h = Harness::new();
        h.manager.handle(Action::Auth(AuthEvent::SignedOut)).await;

        for c in "Ada".chars() {
            h.manager.handle(Action::InputChar(c)).await;
        }
        h.manager.handle(Action::SubmitInput).await;

        assert_eq!(h.auth.current(), Some(AuthUser::new("Ada")));
    }

    #[tokio::test]
    async fn signed_out_refresh_is_skipped() {
        let mut h = Harness::new();
        h.manager.handle(Action::Refresh).await;

        assert!(!h.manager.state().is_loading);
        assert_eq!(h.bucket.list_calls(), 0);
    }

    #[test]
    fn step_clamps() {
        assert_eq!(step(0, -1, 3), 0);
        assert_eq!(step(2, 1, 3), 2);
        assert_eq!(step(1, 1, 3), 2);
        assert_eq!(step(5, 1, 0), 0);
    }
}
