//! src/view/components/object_table.rs
//! List view: one row per entry with check mark, kind icon, name, size,
//! modified date and star.

use crate::{
    model::{file_entry::FileEntry, selection::SelectionSet},
    view::{icons, theme},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, HighlightSpacing, Row, Table, TableState},
};

pub struct OptimizedFileTable;

impl OptimizedFileTable {
    pub fn new() -> Self {
        Self
    }

    pub fn render_entries(
        &self,
        frame: &mut Frame<'_>,
        entries: &[&FileEntry],
        selection: &SelectionSet,
        cursor: usize,
        area: Rect,
    ) {
        let header = Row::new(vec!["", "Name", "Size", "Modified", ""])
            .style(Style::default().fg(theme::YELLOW).bold())
            .bottom_margin(1);

        let rows: Vec<Row<'_>> = entries
            .iter()
            .map(|entry| {
                let kind = icons::kind_style(entry.kind);
                let selected = selection.contains(&entry.id);

                let check = if selected {
                    Cell::from(icons::CHECKED_ICON).style(Style::default().fg(theme::BLUE))
                } else {
                    Cell::from(icons::UNCHECKED_ICON).style(theme::muted_style())
                };

                let star = if entry.starred {
                    Cell::from(icons::STAR_ICON).style(theme::star_style())
                } else {
                    Cell::from("")
                };

                let name_style = if selected {
                    theme::selected_border_style()
                } else {
                    Style::default().fg(theme::FOREGROUND)
                };

                Row::new(vec![
                    check,
                    Cell::from(Line::from(vec![
                        Span::styled(format!("{} ", kind.icon), Style::default().fg(kind.color)),
                        Span::styled(entry.name.as_str(), name_style),
                    ])),
                    Cell::from(entry.size_label.as_str()),
                    Cell::from(entry.modified_label.as_str()),
                    star,
                ])
                .style(Style::default().fg(theme::COMMENT))
            })
            .collect();

        let widths = [
            Constraint::Length(2),
            Constraint::Fill(1),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(2),
        ];

        let mut table_state = TableState::default().with_selected(Some(cursor));

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme::border_style())
                    .style(Style::default().bg(theme::BACKGROUND)),
            )
            .row_highlight_style(theme::cursor_style())
            .highlight_symbol("▶ ")
            .highlight_spacing(HighlightSpacing::Always);

        frame.render_stateful_widget(table, area, &mut table_state);
    }
}

impl Default for OptimizedFileTable {
    fn default() -> Self {
        Self::new()
    }
}
