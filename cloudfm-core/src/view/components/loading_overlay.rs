//! src/view/components/loading_overlay.rs
//! ============================================================
//! Indeterminate spinner drawn in place of the file area while a
//! listing refresh is in flight.

use crate::view::{icons, theme};
use ratatui::{layout::Flex, prelude::*, widgets::Paragraph};

pub struct OptimizedLoadingOverlay;

impl OptimizedLoadingOverlay {
    pub fn new() -> Self {
        Self
    }

    /// Draw the spinner frame for `tick` centered in `rect`.
    pub fn render_spinner(&self, frame: &mut Frame<'_>, tick: u64, rect: Rect) {
        let glyph = icons::SPINNER_FRAMES[(tick % icons::SPINNER_FRAMES.len() as u64) as usize];

        let [line] = Layout::vertical([Constraint::Length(1)])
            .flex(Flex::Center)
            .areas(rect);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(glyph, Style::default().fg(theme::PURPLE).bold()),
                Span::styled(" Loading files", theme::muted_style()),
            ]))
            .alignment(Alignment::Center),
            line,
        );
    }
}

impl Default for OptimizedLoadingOverlay {
    fn default() -> Self {
        Self::new()
    }
}
