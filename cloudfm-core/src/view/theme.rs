//! src/view/theme.rs
//! ============================================================================
//! # Catppuccin Mocha Theme Color Palette
//!
//! Color constants for the Catppuccin Mocha theme plus the handful of shared
//! styles the components reuse.
//! https://github.com/catppuccin/catppuccin

use ratatui::style::{Color, Modifier, Style};
use tracing::{debug, instrument};

/// Log the palette once at startup.
#[instrument(level = "debug")]
pub fn init_theme() {
    debug!("Initializing Catppuccin Mocha theme");
    debug!("Background: {:?}", BACKGROUND);
    debug!("Foreground: {:?}", FOREGROUND);
    debug!("Current line: {:?}", CURRENT_LINE);
}

pub const BACKGROUND: Color = Color::Rgb(30, 30, 46); // Base
pub const SURFACE: Color = Color::Rgb(49, 50, 68); // Surface0
pub const CURRENT_LINE: Color = Color::Rgb(69, 71, 90); // Surface1
pub const FOREGROUND: Color = Color::Rgb(205, 214, 244); // Text
pub const COMMENT: Color = Color::Rgb(127, 132, 156); // Overlay1
pub const BLUE: Color = Color::Rgb(137, 180, 250); // Blue
pub const CYAN: Color = Color::Rgb(137, 220, 235); // Sky
pub const GREEN: Color = Color::Rgb(166, 227, 161); // Green
pub const ORANGE: Color = Color::Rgb(250, 179, 135); // Peach
pub const PINK: Color = Color::Rgb(245, 194, 231); // Pink
pub const PURPLE: Color = Color::Rgb(203, 166, 247); // Mauve
pub const RED: Color = Color::Rgb(243, 139, 168); // Red
pub const YELLOW: Color = Color::Rgb(249, 226, 175); // Yellow

pub fn panel_style() -> Style {
    Style::default().bg(BACKGROUND).fg(FOREGROUND)
}

pub fn border_style() -> Style {
    Style::default().fg(COMMENT)
}

pub fn focused_border_style() -> Style {
    Style::default().fg(PURPLE)
}

pub fn title_style() -> Style {
    Style::default().fg(PURPLE).add_modifier(Modifier::BOLD)
}

pub fn muted_style() -> Style {
    Style::default().fg(COMMENT)
}

pub fn cursor_style() -> Style {
    Style::default().bg(CURRENT_LINE).add_modifier(Modifier::BOLD)
}

/// Checked entries get the accent border, like a ring around a card.
pub fn selected_border_style() -> Style {
    Style::default().fg(BLUE).add_modifier(Modifier::BOLD)
}

pub fn star_style() -> Style {
    Style::default().fg(YELLOW)
}

pub fn key_hint_style() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}
