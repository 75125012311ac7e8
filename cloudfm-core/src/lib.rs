pub mod error;

pub mod config;

pub mod auth {
    pub mod session;
    pub use session::{AuthEvent, AuthProvider, AuthSubscription, AuthUser, SessionAuth};
}

pub mod storage {
    pub mod gateway;
    pub use gateway::{GatewayError, ObjectMetadata, ObjectRef, StorageGateway, UploadBlob};

    pub mod local_bucket;
    pub use local_bucket::LocalBucket;

    pub mod memory_bucket;
    pub use memory_bucket::MemoryBucket;
}

pub mod controller {
    pub mod actions;
    pub use actions::Action;

    pub mod event_loop;
    pub use event_loop::{EventLoop, TaskResult};

    pub mod file_manager;
    pub use file_manager::FileManager;
}

pub mod model {
    pub mod app_state;

    pub mod file_entry;
    pub use file_entry::{FileEntry, FileKind};

    pub mod selection;
    pub use selection::{NameFilter, SelectionSet};

    pub mod ui_state;
    pub use ui_state::{Notification, NotificationLevel, RedrawFlag, UIMode, UIOverlay, UIState};

    pub mod upload_batch;
    pub use upload_batch::{StagedBlob, UploadBatch};

    pub mod view_state;
    pub use view_state::{Folder, ViewMode, ViewState};
}

pub mod tasks {
    pub mod listing_task;
    pub use listing_task::ListingPipeline;

    pub mod upload_task;
}

pub mod view {
    pub mod icons;

    pub mod theme;

    pub mod ui;

    pub mod components {
        pub mod file_grid;
        pub use file_grid::OptimizedFileGrid;
        pub mod header;
        pub use header::OptimizedHeader;
        pub mod loading_overlay;
        pub use loading_overlay::OptimizedLoadingOverlay;
        pub mod notification_overlay;
        pub use notification_overlay::OptimizedNotificationOverlay;
        pub mod object_table;
        pub use object_table::OptimizedFileTable;
        pub mod sidebar;
        pub use sidebar::OptimizedSidebar;
        pub mod sign_in;
        pub use sign_in::OptimizedSignInScreen;
        pub mod status_bar;
        pub use status_bar::OptimizedStatusBar;
        pub mod upload_dialog;
        pub use upload_dialog::OptimizedUploadDialog;
    }

    pub use components::*;
}

pub mod logging;
pub use logging::Logger;

pub mod util {
    pub mod humanize;
}

pub use error::AppError;

pub use model::{app_state::AppState, ui_state::UIState};
