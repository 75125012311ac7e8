//! ``src/view/components/sign_in.rs``
//! ============================================================================
//! # Sign-In Screen
//!
//! Shown instead of the file browser while nobody is signed in.

use crate::model::ui_state::UIState;
use crate::view::{icons, theme};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

pub struct OptimizedSignInScreen;

impl OptimizedSignInScreen {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame<'_>, ui: &UIState, area: Rect) {
        frame.render_widget(Clear, area);
        frame.render_widget(Block::default().style(theme::panel_style()), area);

        let [column] = Layout::horizontal([Constraint::Length(44)])
            .flex(Flex::Center)
            .areas(area);
        let [title, input, help] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .flex(Flex::Center)
        .areas(column);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw(format!("{} ", icons::USER_ICON)),
                Span::styled(
                    "Sign in to Cloud Files",
                    Style::default().fg(theme::PURPLE).add_modifier(Modifier::BOLD),
                ),
            ]))
            .alignment(Alignment::Center),
            title,
        );

        let input_block = Block::default()
            .borders(Borders::ALL)
            .title(" User name ")
            .border_style(theme::focused_border_style())
            .style(Style::default().bg(theme::BACKGROUND));

        frame.render_widget(
            Paragraph::new(ui.input.as_str())
                .style(Style::default().fg(theme::FOREGROUND))
                .block(input_block),
            input,
        );

        frame.set_cursor_position((
            input
                .x
                .saturating_add(u16::try_from(ui.input.chars().count()).unwrap_or(u16::MAX))
                .saturating_add(1)
                .min(input.right().saturating_sub(2)),
            input.y + 1,
        ));

        frame.render_widget(
            Paragraph::new("Type name • Enter to sign in • Ctrl+C to quit")
                .style(Style::default().fg(theme::COMMENT))
                .alignment(Alignment::Center),
            help,
        );
    }
}

impl Default for OptimizedSignInScreen {
    fn default() -> Self {
        Self::new()
    }
}
