//! src/view/ui.rs
//! ============================================================
//! Frame renderer that draws the whole page from `AppState`:
//! sidebar, header, heading with actions, then the spinner, the
//! empty state, the grid or the list. Overlays go on top.

use std::time::{Duration, Instant};

use ratatui::{
    layout::Flex,
    prelude::*,
    widgets::{Block, Paragraph},
};
use tracing::{instrument, warn};

use crate::{
    model::{app_state::AppState, ui_state::UIOverlay, view_state::ViewMode},
    view::{
        components::{
            file_grid::OptimizedFileGrid, header::OptimizedHeader,
            loading_overlay::OptimizedLoadingOverlay,
            notification_overlay::OptimizedNotificationOverlay, object_table::OptimizedFileTable,
            sidebar::OptimizedSidebar, sign_in::OptimizedSignInScreen,
            status_bar::OptimizedStatusBar, upload_dialog::OptimizedUploadDialog,
        },
        icons, theme,
    },
};

const SIDEBAR_WIDTH: u16 = 22;

/// ---------------------------------------------------------------------------
/// Renderer struct (layout cache + stats)
/// ---------------------------------------------------------------------------
pub struct UIRenderer {
    cache: LayoutCache,
    stats: RenderStats,
    frame: u64,
}

#[derive(Default)]
struct LayoutCache {
    screen: Rect,
    areas: PageAreas,
    hit: u64,
    miss: u64,
}

#[derive(Clone, Copy, Default)]
struct PageAreas {
    sidebar: Rect,
    header: Rect,
    heading: Rect,
    body: Rect,
    status: Rect,
}

#[derive(Default)]
pub struct RenderStats {
    pub frames: u64,
    pub slow: u64,
    pub total: Duration,
}

impl UIRenderer {
    pub fn new() -> Self {
        Self {
            cache: LayoutCache::default(),
            stats: RenderStats::default(),
            frame: 0,
        }
    }

    #[must_use]
    pub const fn stats(&self) -> &RenderStats {
        &self.stats
    }

    #[instrument(level = "trace", skip_all)]
    pub fn render(&mut self, f: &mut Frame<'_>, app: &AppState) {
        let start = Instant::now();
        let screen = f.area();

        f.render_widget(Block::default().style(theme::panel_style()), screen);

        if app.ui.overlay == UIOverlay::SignIn {
            OptimizedSignInScreen::new().render(f, &app.ui, screen);
        } else {
            let areas = self.layout(screen);

            OptimizedSidebar::new().render(f, &app.view, areas.sidebar);
            OptimizedHeader::new().render(f, app, areas.header);
            self.draw_heading(f, app, areas.heading);
            self.draw_body(f, app, areas.body);
            OptimizedStatusBar::new().render(f, app, areas.status);

            if app.ui.overlay == UIOverlay::UploadDialog {
                OptimizedUploadDialog::new().render(f, app, centered(screen, 70, 80));
            }
        }

        if let Some(n) = &app.ui.notification {
            OptimizedNotificationOverlay::new().render_notification(f, n, notification_rect(screen));
        }

        let dur = start.elapsed();
        self.stats.total += dur;
        if dur.as_millis() > 16 {
            self.stats.slow += 1;
            warn!(render_ms = dur.as_millis() as u64, "Slow frame");
        }
        self.stats.frames += 1;
        self.frame += 1;
    }
}

/// ---------------------------------------------------------------------------
/// page sections
/// ---------------------------------------------------------------------------
impl UIRenderer {
    /// Folder title with the visible count, plus the bulk-download and upload
    /// actions on the right.
    fn draw_heading(&self, f: &mut Frame<'_>, app: &AppState, area: Rect) {
        let [title_area, actions_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(40)]).areas(area);

        let heading = vec![
            Line::from(Span::styled(
                app.view.selected_folder.label(),
                Style::default().fg(theme::FOREGROUND).bold(),
            )),
            Line::from(Span::styled(
                format!("{} files", app.visible_entries().len()),
                theme::muted_style(),
            )),
        ];
        f.render_widget(Paragraph::new(heading), title_area.inner(Margin::new(1, 0)));

        let mut actions = Vec::new();
        if !app.selection.is_empty() {
            actions.push(Span::styled(
                format!(" {} Download ({}) ", icons::DOWNLOAD_ICON, app.selection.len()),
                Style::default().fg(theme::BACKGROUND).bg(theme::BLUE).bold(),
            ));
            actions.push(Span::raw("  "));
        }
        actions.push(Span::styled(
            format!(" {} Upload Files ", icons::UPLOAD_ICON),
            Style::default().fg(theme::BACKGROUND).bg(theme::PURPLE).bold(),
        ));

        f.render_widget(
            Paragraph::new(Line::from(actions)).alignment(Alignment::Right),
            actions_area.inner(Margin::new(1, 0)),
        );
    }

    fn draw_body(&self, f: &mut Frame<'_>, app: &AppState, area: Rect) {
        if app.is_loading {
            OptimizedLoadingOverlay::new().render_spinner(f, self.frame, area);
            return;
        }

        let visible = app.visible_entries();

        if visible.is_empty() {
            Self::draw_empty_state(f, area);
            return;
        }

        match app.view.view_mode {
            ViewMode::Grid => OptimizedFileGrid::new().render_entries(
                f,
                &visible,
                &app.selection,
                app.ui.cursor,
                area,
            ),
            ViewMode::List => OptimizedFileTable::new().render_entries(
                f,
                &visible,
                &app.selection,
                app.ui.cursor,
                area,
            ),
        }
    }

    fn draw_empty_state(f: &mut Frame<'_>, area: Rect) {
        let [text] = Layout::vertical([Constraint::Length(2)])
            .flex(Flex::Center)
            .areas(area);

        f.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled("No files found", theme::muted_style().bold())),
                Line::from(Span::styled("Upload files to get started", theme::muted_style())),
            ])
            .alignment(Alignment::Center),
            text,
        );
    }
}

/// ---------------------------------------------------------------------------
/// util: layout / rectangles
/// ---------------------------------------------------------------------------
impl UIRenderer {
    fn layout(&mut self, screen: Rect) -> PageAreas {
        if self.cache.screen == screen && self.cache.miss > 0 {
            self.cache.hit += 1;
            return self.cache.areas;
        }

        self.cache.screen = screen;
        self.cache.miss += 1;

        let [page, status] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(screen);
        let [sidebar, content] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Fill(1)]).areas(page);
        let [header, heading, body] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Fill(1),
        ])
        .areas(content);

        self.cache.areas = PageAreas {
            sidebar,
            header,
            heading,
            body,
            status,
        };
        self.cache.areas
    }
}

/// Percentages are taken in `u32` so wide screens cannot overflow.
fn centered(r: Rect, w_pct: u16, h_pct: u16) -> Rect {
    let w = percent_of(r.width, w_pct);
    let h = percent_of(r.height, h_pct);
    Rect {
        x: r.x + (r.width - w) / 2,
        y: r.y + (r.height - h) / 2,
        width: w,
        height: h,
    }
}

fn percent_of(len: u16, pct: u16) -> u16 {
    let scaled = u32::from(len) * u32::from(pct) / 100;
    u16::try_from(scaled).unwrap_or(len).min(len)
}

/// Top-right toast slot, one row below the top edge when there is room.
fn notification_rect(scr: Rect) -> Rect {
    let w = percent_of(scr.width, 40).max(30).min(scr.width);
    let h = 4.min(scr.height);
    Rect {
        x: scr.x + (scr.width - w),
        y: scr.y + (scr.height - h).min(1),
        width: w,
        height: h,
    }
    .intersection(scr)
}

impl Default for UIRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// ---------------------------------------------------------------------------
/// stats helpers
/// ---------------------------------------------------------------------------
impl RenderStats {
    pub fn fps(&self) -> f64 {
        if self.frames > 0 {
            self.frames as f64 / self.total.as_secs_f64()
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::session::AuthUser,
        model::{
            file_entry::{FileEntry, FileKind},
            upload_batch::StagedBlob,
        },
    };
    use bytes::Bytes;
    use chrono::Utc;
    use compact_str::CompactString;
    use ratatui::{Terminal, backend::TestBackend};

    fn entry(name: &str, kind: FileKind) -> FileEntry {
        FileEntry {
            id: CompactString::new(format!("files/{name}")),
            name: CompactString::new(name),
            kind,
            size_label: "1.5 KB".into(),
            modified_label: "3/14/2024".into(),
            starred: false,
            size_bytes: 1536,
            modified: Utc::now(),
            content_type: "text/plain".into(),
            download_url: None,
        }
    }

    fn signed_in() -> AppState {
        let mut app = AppState::default();
        app.user = Some(AuthUser::new("ada"));
        app.entries = vec![
            entry("Report.pdf", FileKind::Document),
            entry("photo.png", FileKind::Image),
            entry("backup.zip", FileKind::Archive),
        ];
        app
    }

    fn draw(app: &AppState) -> String {
        draw_sized(app, 120, 40)
    }

    fn draw_sized(app: &AppState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let mut renderer = UIRenderer::new();
        terminal.draw(|f| renderer.render(f, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn heading_counts_visible_files() {
        let out = draw(&signed_in());

        assert!(out.contains("Home"));
        assert!(out.contains("3 files"));
        assert!(out.contains("Report.pdf"));
        assert!(out.contains("1.5 KB • 3/14/2024"));
    }

    #[test]
    fn unmatched_filter_renders_empty_state() {
        let mut app = signed_in();
        app.view.search.set("xyz");

        let out = draw(&app);

        assert!(out.contains("0 files"));
        assert!(out.contains("No files found"));
        assert!(out.contains("Upload files to get started"));
        assert!(!out.contains("Report.pdf"));
    }

    #[test]
    fn loading_hides_entries() {
        let mut app = signed_in();
        app.is_loading = true;

        let out = draw(&app);

        assert!(out.contains("Loading files"));
        assert!(!out.contains("photo.png"));
    }

    #[test]
    fn list_view_shows_columns() {
        let mut app = signed_in();
        app.view.view_mode = ViewMode::List;

        let out = draw(&app);

        assert!(out.contains("Name"));
        assert!(out.contains("Modified"));
        assert!(out.contains("backup.zip"));
    }

    #[test]
    fn selection_shows_bulk_download_count() {
        let mut app = signed_in();
        app.selection.toggle("files/Report.pdf");
        app.selection.toggle("files/photo.png");

        assert!(draw(&app).contains("Download (2)"));
    }

    #[test]
    fn upload_dialog_lists_staged_sizes() {
        let mut app = signed_in();
        app.ui.overlay = UIOverlay::UploadDialog;
        app.upload.stage([StagedBlob::from_bytes(
            "big.bin",
            Bytes::from(vec![0u8; 1_572_864]),
        )]);

        let out = draw(&app);

        assert!(out.contains("Uploaded Files (1)"));
        assert!(out.contains("big.bin"));
        assert!(out.contains("1.50 MB"));
    }

    #[test]
    fn signed_out_shows_sign_in() {
        let mut app = AppState::default();
        app.ui.overlay = UIOverlay::SignIn;

        let out = draw(&app);

        assert!(out.contains("Sign in to Cloud Files"));
        assert!(!out.contains("Upload Files"));
    }

    #[test]
    fn notification_is_drawn() {
        let mut app = signed_in();
        app.ui.show_error("Failed to load files");

        assert!(draw(&app).contains("Failed to load files"));
    }

    #[test]
    fn tiny_and_huge_screens_draw_without_panicking() {
        let sizes = [(1, 1), (10, 2), (30, 3), (40, 6), (60, 9), (1000, 40)];

        let mut grid = signed_in();
        grid.ui.cursor = 2;
        grid.ui.show_error("Failed to load files");

        let mut list = signed_in();
        list.view.view_mode = ViewMode::List;
        list.ui.cursor = 2;
        list.ui.show_error("Failed to load files");

        let mut dialog = signed_in();
        dialog.ui.overlay = UIOverlay::UploadDialog;
        dialog.ui.set_input("x".repeat(300));
        dialog.upload.stage([StagedBlob::from_bytes("a.txt", Bytes::from_static(b"a"))]);

        let mut sign_in = AppState::default();
        sign_in.ui.overlay = UIOverlay::SignIn;
        sign_in.ui.set_input("y".repeat(300));

        for (width, height) in sizes {
            for app in [&grid, &list, &dialog, &sign_in] {
                let out = draw_sized(app, width, height);
                assert_eq!(out.lines().count(), usize::from(height));
            }
        }
    }

    #[test]
    fn toast_stays_on_screen() {
        for (width, height) in [(1, 1), (20, 2), (50, 3), (1000, 40)] {
            let screen = Rect::new(0, 0, width, height);
            let toast = notification_rect(screen);

            assert_eq!(toast.intersection(screen), toast);
            assert!(!toast.is_empty());
        }
        assert_eq!(notification_rect(Rect::new(0, 0, 1000, 40)).width, 400);
    }

    #[test]
    fn centered_handles_wide_screens() {
        let r = centered(Rect::new(0, 0, 1000, 500), 70, 80);

        assert_eq!((r.width, r.height), (700, 400));
        assert_eq!((r.x, r.y), (150, 50));
    }

    #[test]
    fn layout_cache_hits_on_same_size() {
        let mut r = UIRenderer::new();
        r.layout(Rect::new(0, 0, 100, 40));
        r.layout(Rect::new(0, 0, 100, 40));
        assert_eq!(r.cache.hit, 1);
    }
}
