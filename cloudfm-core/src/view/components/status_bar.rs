//! src/view/components/status_bar.rs
//!
//! Bottom line: current mode, selection and staging counts on the left, key
//! hints for the current mode on the right.

use crate::{
    model::{app_state::AppState, ui_state::UIMode},
    view::theme,
};
use ratatui::{
    prelude::*,
    widgets::{Paragraph, Widget},
};

pub struct OptimizedStatusBar;

impl OptimizedStatusBar {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let mode_str = match app.ui.mode {
            UIMode::Browse => "Browse",
            UIMode::Search => "Search",
            UIMode::UploadPath => "Upload",
            UIMode::SignIn => "Sign in",
        };

        let left_text = format!(
            " {} | Selected: {} | Staged: {}",
            mode_str,
            app.selection.len(),
            app.upload.len()
        );

        let right_text = match app.ui.mode {
            UIMode::Browse => {
                "space select  d download  s star  D bulk  u upload  v view  / search  r refresh  q quit "
            }
            UIMode::Search => "type to filter  Enter/Esc done ",
            UIMode::UploadPath => "Enter add  Esc cancel ",
            UIMode::SignIn => "Enter sign in ",
        };

        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(40), Constraint::Fill(1)])
            .split(area);

        Paragraph::new(left_text)
            .style(Style::default().fg(theme::FOREGROUND).bg(theme::SURFACE))
            .alignment(Alignment::Left)
            .render(layout[0], frame.buffer_mut());

        Paragraph::new(right_text)
            .style(Style::default().fg(theme::COMMENT).bg(theme::SURFACE))
            .alignment(Alignment::Right)
            .render(layout[1], frame.buffer_mut());
    }
}

impl Default for OptimizedStatusBar {
    fn default() -> Self {
        Self::new()
    }
}
