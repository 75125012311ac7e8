//! src/view/components/upload_dialog.rs
//! ============================================================================
//! # Upload Dialog: Drop Zone, Path Picker and Staged List
//!
//! A paste into the terminal is the drop gesture; `p` opens the path picker.
//! Both feed the same staged list, which shows each blob with its size in
//! megabytes.

use crate::{
    model::{app_state::AppState, ui_state::UIMode},
    util::humanize::megabytes,
    view::{icons, theme},
};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph},
};

pub struct OptimizedUploadDialog;

impl OptimizedUploadDialog {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        frame.render_widget(Clear, area);

        let chrome = Block::default()
            .borders(Borders::ALL)
            .title(" Upload Files ")
            .title_alignment(Alignment::Center)
            .title_style(theme::title_style())
            .border_style(theme::focused_border_style())
            .style(theme::panel_style());

        let inner = chrome.inner(area);
        frame.render_widget(chrome, area);

        let [description, zone, staged, hints] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(6),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        frame.render_widget(
            Paragraph::new("Drag and drop files or type a path to browse")
                .style(theme::muted_style())
                .alignment(Alignment::Center),
            description,
        );

        self.render_drop_zone(frame, app, zone);
        self.render_staged(frame, app, staged);
        self.render_hints(frame, app, hints);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_drop_zone(&self, frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let picking = app.ui.mode == UIMode::UploadPath;

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(if picking {
                theme::focused_border_style()
            } else {
                theme::border_style()
            });

        let lines = if picking {
            vec![
                Line::from(Span::styled("Path to upload:", theme::muted_style())),
                Line::from(Span::styled(
                    format!("> {}", app.ui.input),
                    Style::default().fg(theme::FOREGROUND),
                )),
                Line::from(Span::styled("Enter to add • Esc to cancel", theme::muted_style())),
            ]
        } else {
            vec![
                Line::from(Span::styled(icons::UPLOAD_ICON, Style::default().fg(theme::PURPLE).bold())),
                Line::from(Span::styled(
                    "Drag & drop files here",
                    Style::default().fg(theme::FOREGROUND).bold(),
                )),
                Line::from(Span::styled("or press p to select files", theme::muted_style())),
            ]
        };

        let inner = block.inner(area);
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).block(block),
            area,
        );

        if picking {
            let typed = u16::try_from(app.ui.input.chars().count()).unwrap_or(u16::MAX);
            let line_width = typed.saturating_add(2);
            let x = inner
                .x
                .saturating_add(inner.width.saturating_sub(line_width) / 2)
                .saturating_add(line_width);
            frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y + 1));
        }
    }

    fn render_staged(&self, frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        if app.upload.is_empty() {
            return;
        }

        let items: Vec<ListItem<'_>> = app
            .upload
            .items()
            .iter()
            .map(|blob| {
                ListItem::new(Line::from(vec![
                    Span::styled(blob.name.as_str(), Style::default().fg(theme::FOREGROUND)),
                    Span::raw("  "),
                    Span::styled(megabytes(blob.size), theme::muted_style()),
                ]))
            })
            .collect();

        let mut list_state = ListState::default().with_selected(Some(app.ui.upload_cursor));

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Uploaded Files ({}) ", app.upload.len()))
                    .border_style(theme::border_style()),
            )
            .highlight_style(theme::cursor_style())
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_hints(&self, frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let line = if app.is_uploading {
            Line::from(Span::styled("Uploading...", Style::default().fg(theme::YELLOW).bold()))
        } else {
            Line::from(vec![
                Span::styled("Enter", theme::key_hint_style()),
                Span::raw(" upload  "),
                Span::styled("x", theme::key_hint_style()),
                Span::raw(" remove  "),
                Span::styled("p", theme::key_hint_style()),
                Span::raw(" add path  "),
                Span::styled("Esc", theme::key_hint_style()),
                Span::raw(" close"),
            ])
        };

        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }
}

impl Default for OptimizedUploadDialog {
    fn default() -> Self {
        Self::new()
    }
}
