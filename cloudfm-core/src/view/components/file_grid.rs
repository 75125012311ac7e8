//! src/view/components/file_grid.rs
//! ============================================================================
//! # Grid View: Cards Laid Out in Columns
//!
//! Each card shows the kind icon, the name and a `size • modified` line.
//! Checked cards get the accent border; the card under the cursor is
//! highlighted. Rows scroll to keep the cursor in view.

use crate::{
    model::{file_entry::FileEntry, selection::SelectionSet},
    view::{icons, theme},
};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};

pub const CARD_WIDTH: u16 = 26;
pub const CARD_HEIGHT: u16 = 5;

pub struct OptimizedFileGrid;

impl OptimizedFileGrid {
    pub fn new() -> Self {
        Self
    }

    /// Columns that fit into `width`; never zero.
    #[must_use]
    pub fn columns(width: u16) -> usize {
        usize::from((width / CARD_WIDTH).max(1))
    }

    pub fn render_entries(
        &self,
        frame: &mut Frame<'_>,
        entries: &[&FileEntry],
        selection: &SelectionSet,
        cursor: usize,
        area: Rect,
    ) {
        let columns = Self::columns(area.width);
        let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));
        let cursor_row = cursor / columns;
        let first_row = cursor_row.saturating_sub(visible_rows - 1);
        let card_width = area.width / columns as u16;

        for (index, entry) in entries.iter().enumerate().skip(first_row * columns) {
            let row = index / columns - first_row;
            if row >= visible_rows {
                break;
            }
            let column = index % columns;

            // Cards taller than a short area are cut at its bottom edge.
            let card = Rect {
                x: area.x.saturating_add(column as u16 * card_width),
                y: area.y.saturating_add(row as u16 * CARD_HEIGHT),
                width: card_width,
                height: CARD_HEIGHT,
            }
            .intersection(area);
            if card.is_empty() {
                continue;
            }

            self.render_card(
                frame,
                entry,
                selection.contains(&entry.id),
                index == cursor,
                card,
            );
        }
    }

    fn render_card(
        &self,
        frame: &mut Frame<'_>,
        entry: &FileEntry,
        selected: bool,
        under_cursor: bool,
        area: Rect,
    ) {
        let kind = icons::kind_style(entry.kind);

        let check = if selected {
            icons::CHECKED_ICON
        } else {
            icons::UNCHECKED_ICON
        };

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(format!(" {check} "))
            .border_style(if selected {
                theme::selected_border_style()
            } else {
                theme::border_style()
            })
            .style(if under_cursor {
                Style::default().bg(theme::CURRENT_LINE)
            } else {
                Style::default().bg(theme::BACKGROUND)
            });

        if entry.starred {
            block = block.title(
                Line::from(Span::styled(format!(" {} ", icons::STAR_ICON), theme::star_style()))
                    .right_aligned(),
            );
        }

        let lines = vec![
            Line::from(Span::styled(kind.icon, Style::default().fg(kind.color).bold())),
            Line::from(Span::styled(
                entry.name.as_str(),
                Style::default().fg(theme::FOREGROUND).bold(),
            )),
            Line::from(Span::styled(
                format!("{} • {}", entry.size_label, entry.modified_label),
                theme::muted_style(),
            )),
        ];

        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).block(block),
            area,
        );
    }
}

impl Default for OptimizedFileGrid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_never_zero() {
        assert_eq!(OptimizedFileGrid::columns(10), 1);
        assert_eq!(OptimizedFileGrid::columns(CARD_WIDTH * 3 + 5), 3);
    }
}
