//! src/view/components/sidebar.rs
use crate::{
    model::view_state::{Folder, ViewState},
    view::{icons, theme},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState},
};

/// Folder navigation column.
pub struct OptimizedSidebar;

impl OptimizedSidebar {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame<'_>, view: &ViewState, area: Rect) {
        let items: Vec<ListItem<'_>> = Folder::ALL
            .iter()
            .map(|folder| {
                ListItem::new(format!(" {}  {}", icons::folder_icon(*folder), folder.label()))
            })
            .collect();

        let mut list_state = ListState::default().with_selected(Some(view.selected_folder.position()));

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::RIGHT)
                    .title(" Cloud Files ")
                    .title_style(theme::title_style())
                    .border_style(theme::border_style())
                    .style(theme::panel_style()),
            )
            .highlight_style(
                Style::default()
                    .bg(theme::CURRENT_LINE)
                    .fg(theme::PURPLE)
                    .add_modifier(Modifier::BOLD),
            );

        frame.render_stateful_widget(list, area, &mut list_state);
    }
}

impl Default for OptimizedSidebar {
    fn default() -> Self {
        Self::new()
    }
}
