//! UI state: input mode, cursor, text input, notifications and redraw flags

use std::time::{Duration, Instant};

use compact_str::CompactString;

/// Redraw flags; the renderer repaints when any bit is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RedrawFlag {
    Main = 1,
    StatusBar = 2,
    Overlay = 4,
    Notification = 8,
    All = 15,
}

impl RedrawFlag {
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Where keystrokes go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UIMode {
    #[default]
    Browse,
    /// Typing into the header search box.
    Search,
    /// Typing a path into the upload dialog's picker.
    UploadPath,
    /// Typing a user name on the sign-in screen.
    SignIn,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UIOverlay {
    #[default]
    None,
    UploadDialog,
    SignIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: CompactString,
    pub level: NotificationLevel,
    pub timestamp: Instant,
    pub auto_dismiss: Option<Duration>,
}

#[derive(Debug)]
pub struct UIState {
    pub redraw_flags: u8,

    pub mode: UIMode,
    pub overlay: UIOverlay,

    /// Cursor over the visible entries.
    pub cursor: usize,
    /// Cursor over the staged uploads in the upload dialog.
    pub upload_cursor: usize,

    pub input: CompactString,

    pub notification: Option<Notification>,
    pub notification_ttl: Duration,
}

impl Default for UIState {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

impl UIState {
    #[must_use]
    pub fn new(notification_ttl: Duration) -> Self {
        Self {
            redraw_flags: RedrawFlag::All.bits(),
            mode: UIMode::Browse,
            overlay: UIOverlay::None,
            cursor: 0,
            upload_cursor: 0,
            input: CompactString::new(""),
            notification: None,
            notification_ttl,
        }
    }

    #[inline]
    pub fn request_redraw(&mut self, flag: RedrawFlag) {
        self.redraw_flags |= flag.bits();
    }

    #[inline]
    #[must_use]
    pub const fn needs_redraw(&self) -> bool {
        self.redraw_flags != 0
    }

    #[inline]
    pub fn clear_redraw(&mut self) {
        self.redraw_flags = 0;
    }

    pub fn show_notification(
        &mut self,
        message: impl Into<CompactString>,
        level: NotificationLevel,
        auto_dismiss: Option<Duration>,
    ) {
        self.notification = Some(Notification {
            message: message.into(),
            level,
            timestamp: Instant::now(),
            auto_dismiss,
        });
        self.request_redraw(RedrawFlag::Notification);
    }

    #[inline]
    pub fn show_info(&mut self, message: impl Into<CompactString>) {
        let ttl = self.notification_ttl;
        self.show_notification(message, NotificationLevel::Info, Some(ttl));
    }

    #[inline]
    pub fn show_success(&mut self, message: impl Into<CompactString>) {
        let ttl = self.notification_ttl;
        self.show_notification(message, NotificationLevel::Success, Some(ttl));
    }

    #[inline]
    pub fn show_warning(&mut self, message: impl Into<CompactString>) {
        let ttl = self.notification_ttl * 2;
        self.show_notification(message, NotificationLevel::Warning, Some(ttl));
    }

    #[inline]
    pub fn show_error(&mut self, message: impl Into<CompactString>) {
        let ttl = self.notification_ttl * 2;
        self.show_notification(message, NotificationLevel::Error, Some(ttl));
    }

    pub fn dismiss_notification(&mut self) {
        if self.notification.take().is_some() {
            self.request_redraw(RedrawFlag::All);
        }
    }

    /// Drop an expired notification. Returns true if one was removed.
    pub fn update_notification(&mut self) -> bool {
        if let Some(notification) = &self.notification
            && let Some(ttl) = notification.auto_dismiss
            && notification.timestamp.elapsed() > ttl
        {
            self.notification = None;
            self.request_redraw(RedrawFlag::All);
            return true;
        }
        false
    }

    pub fn clear_input(&mut self) {
        self.input = CompactString::new("");
    }

    pub fn set_input(&mut self, text: impl Into<CompactString>) {
        self.input = text.into();
    }

    /// Take the typed text, leaving the input empty.
    pub fn take_input(&mut self) -> CompactString {
        std::mem::take(&mut self.input)
    }
}
