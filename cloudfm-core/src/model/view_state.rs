//! ``src/model/view_state.rs``
//! ============================================================================
//! # `ViewState`: Folder, Layout and Search Text
//!
//! Pure presentation state; nothing here is persisted.

use serde::{Deserialize, Serialize};

use crate::model::selection::NameFilter;

/// Grid of cards or table of rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Grid => Self::List,
            Self::List => Self::Grid,
        }
    }
}

/// Sidebar folders. Selecting one changes the page heading only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Folder {
    #[default]
    Home,
    Recent,
    Starred,
    Documents,
    Images,
    Videos,
    Storage,
    Trash,
}

impl Folder {
    pub const ALL: [Self; 8] = [
        Self::Home,
        Self::Recent,
        Self::Starred,
        Self::Documents,
        Self::Images,
        Self::Videos,
        Self::Storage,
        Self::Trash,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Recent => "Recent",
            Self::Starred => "Starred",
            Self::Documents => "Documents",
            Self::Images => "Images",
            Self::Videos => "Videos",
            Self::Storage => "Storage",
            Self::Trash => "Trash",
        }
    }

    #[must_use]
    pub fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    /// Next folder down the sidebar, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    /// Previous folder up the sidebar, wrapping around.
    #[must_use]
    pub fn prev(self) -> Self {
        let len = Self::ALL.len();
        Self::ALL[(self.position() + len - 1) % len]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub selected_folder: Folder,
    pub view_mode: ViewMode,
    pub search: NameFilter,
}

impl ViewState {
    #[must_use]
    pub fn new(view_mode: ViewMode) -> Self {
        Self {
            view_mode,
            ..Self::default()
        }
    }
}
