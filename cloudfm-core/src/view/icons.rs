//! src/view/icons.rs
//! ============================================================================
//! # Icons (Nerd Fonts) and Kind Styles
//!
//! Every `FileKind` maps to exactly one icon and color through an `EnumMap`,
//! so adding a kind without a style fails to compile.

use std::sync::LazyLock;

use enum_map::{EnumMap, enum_map};
use ratatui::style::Color;

use crate::{
    model::{file_entry::FileKind, view_state::Folder},
    view::theme,
};

pub const STAR_ICON: &str = "\u{f005}";
pub const CHECKED_ICON: &str = "\u{f14a}";
pub const UNCHECKED_ICON: &str = "\u{f096}";
pub const UPLOAD_ICON: &str = "\u{f093}";
pub const DOWNLOAD_ICON: &str = "\u{f019}";
pub const SEARCH_ICON: &str = "\u{f002}";
pub const USER_ICON: &str = "\u{f007}";
pub const SPINNER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindStyle {
    pub icon: &'static str,
    pub color: Color,
}

pub static KIND_STYLES: LazyLock<EnumMap<FileKind, KindStyle>> = LazyLock::new(|| {
    enum_map! {
        FileKind::Document => KindStyle { icon: "\u{f15c}", color: theme::BLUE },
        FileKind::Image => KindStyle { icon: "\u{f1c5}", color: theme::GREEN },
        FileKind::Video => KindStyle { icon: "\u{f1c8}", color: theme::PURPLE },
        FileKind::Archive => KindStyle { icon: "\u{f1c6}", color: theme::ORANGE },
        FileKind::Audio => KindStyle { icon: "\u{f1c7}", color: theme::PINK },
        FileKind::Other => KindStyle { icon: "\u{f15b}", color: theme::COMMENT },
    }
});

#[inline]
#[must_use]
pub fn kind_style(kind: FileKind) -> KindStyle {
    KIND_STYLES[kind]
}

#[must_use]
pub const fn folder_icon(folder: Folder) -> &'static str {
    match folder {
        Folder::Home => "\u{f015}",
        Folder::Recent => "\u{f017}",
        Folder::Starred => STAR_ICON,
        Folder::Documents | Folder::Images | Folder::Videos => "\u{f07b}",
        Folder::Storage => "\u{f0a0}",
        Folder::Trash => "\u{f1f8}",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_have_distinct_colors() {
        let colors: std::collections::HashSet<_> =
            KIND_STYLES.values().map(|s| format!("{:?}", s.color)).collect();

        assert_eq!(colors.len(), KIND_STYLES.len());
        assert_eq!(kind_style(FileKind::Image).color, theme::GREEN);
    }
}
