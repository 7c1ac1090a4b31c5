//! UI chrome state: dark mode, sidebar collapse, and transient notices.

#[cfg(test)]
#[path = "ui_test.rs"]
mod ui_test;

/// Shared UI state held in an `RwSignal` provided via context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    pub dark_mode: bool,
    pub sidebar_collapsed: bool,
    pub notice: Option<Notice>,
}

impl UiState {
    pub fn notify_success(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice { kind: NoticeKind::Success, text: text.into() });
    }

    pub fn notify_error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice { kind: NoticeKind::Error, text: text.into() });
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

/// A transient user-visible notification, rendered by the notice bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}
