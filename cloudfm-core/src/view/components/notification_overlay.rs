//! src/view/components/notification_overlay.rs
//! Toast drawn in the top-right corner; the footer counts down to
//! auto-dismiss.

use std::time::Duration;

use crate::model::ui_state::{Notification, NotificationLevel};
use crate::view::theme;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tracing::{debug, instrument};

/// Accent color, title and glyph for each level.
#[must_use]
pub const fn level_style(level: NotificationLevel) -> (Color, &'static str, &'static str) {
    match level {
        NotificationLevel::Info => (theme::CYAN, "Info", "ℹ"),
        NotificationLevel::Success => (theme::GREEN, "Success", "✓"),
        NotificationLevel::Warning => (theme::YELLOW, "Warning", "⚠"),
        NotificationLevel::Error => (theme::RED, "Error", "✕"),
    }
}

/// Whole seconds left before the toast goes away, rounded up.
#[must_use]
pub fn remaining_secs(notification: &Notification) -> Option<u64> {
    let ttl = notification.auto_dismiss?;
    let left = ttl.saturating_sub(notification.timestamp.elapsed());

    Some(left.as_secs() + u64::from(left.subsec_nanos() > 0))
}

pub struct OptimizedNotificationOverlay;

impl OptimizedNotificationOverlay {
    pub fn new() -> Self {
        Self
    }

    #[instrument(
        level = "trace",
        skip_all,
        fields(
            marker = "NOTIFICATION_DISPLAYED",
            operation_type = "notification_render",
            level = ?notification.level,
        )
    )]
    pub fn render_notification(
        &self,
        frame: &mut Frame<'_>,
        notification: &Notification,
        area: Rect,
    ) {
        frame.render_widget(Clear, area);

        let (accent, title, icon) = level_style(notification.level);
        let accent_style = Style::default().fg(accent);

        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {icon} {title} "))
            .title_style(accent_style.bold())
            .border_style(accent_style)
            .style(Style::default().bg(theme::BACKGROUND));

        if let Some(secs) = remaining_secs(notification).filter(|s| *s > 0) {
            block = block.title_bottom(
                Line::styled(format!(" {secs}s "), theme::muted_style()).right_aligned(),
            );
        }

        frame.render_widget(
            Paragraph::new(notification.message.as_str())
                .style(Style::default().fg(theme::FOREGROUND))
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Left)
                .block(block),
            area,
        );

        if notification.level == NotificationLevel::Error {
            debug!(
                marker = "NOTIFICATION_ERROR",
                message = %notification.message,
                "Error toast shown"
            );
        }
    }
}

impl Default for OptimizedNotificationOverlay {
    fn default() -> Self {
        Self::new()
    }
}
