//! src/view/components/header.rs
//! ============================================================================
//! # Header: Search Box, View Toggle and Signed-In User

use crate::{
    model::{app_state::AppState, ui_state::UIMode, view_state::ViewMode},
    view::{icons, theme},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

pub struct OptimizedHeader;

impl OptimizedHeader {
    pub fn new() -> Self {
        Self
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn render(&self, frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let [search_area, toggle_area, user_area] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(16),
            Constraint::Length(20),
        ])
        .areas(area);

        let searching = app.ui.mode == UIMode::Search;
        let query = app.view.search.text();

        let search_line = if query.is_empty() && !searching {
            Line::from(vec![
                Span::raw(format!("{} ", icons::SEARCH_ICON)),
                Span::styled("Search files... (/)", theme::muted_style()),
            ])
        } else {
            Line::from(vec![
                Span::raw(format!("{} ", icons::SEARCH_ICON)),
                Span::styled(query, Style::default().fg(theme::FOREGROUND)),
            ])
        };

        let search_block = Block::default()
            .borders(Borders::ALL)
            .border_style(if searching {
                theme::focused_border_style()
            } else {
                theme::border_style()
            })
            .style(theme::panel_style());

        frame.render_widget(Paragraph::new(search_line).block(search_block), search_area);

        if searching {
            let typed = u16::try_from(query.chars().count()).unwrap_or(u16::MAX);
            let x = search_area.x.saturating_add(3).saturating_add(typed);
            frame.set_cursor_position((x.min(search_area.right().saturating_sub(2)), search_area.y + 1));
        }

        let (grid_style, list_style) = match app.view.view_mode {
            ViewMode::Grid => (theme::key_hint_style().reversed(), theme::muted_style()),
            ViewMode::List => (theme::muted_style(), theme::key_hint_style().reversed()),
        };

        let toggle = Line::from(vec![
            Span::styled(" Grid ", grid_style),
            Span::raw(" "),
            Span::styled(" List ", list_style),
        ]);

        frame.render_widget(
            Paragraph::new(toggle)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).border_style(theme::border_style())),
            toggle_area,
        );

        let user = app
            .user
            .as_ref()
            .map_or_else(String::new, |u| format!("{} {}", icons::USER_ICON, u.display_name));

        frame.render_widget(
            Paragraph::new(user)
                .alignment(Alignment::Right)
                .style(Style::default().fg(theme::CYAN))
                .block(Block::default().borders(Borders::ALL).border_style(theme::border_style())),
            user_area,
        );
    }
}

impl Default for OptimizedHeader {
    fn default() -> Self {
        Self::new()
    }
}
