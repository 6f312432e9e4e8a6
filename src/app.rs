//! Application state and core logic.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::style::Color;
use tracing::{info, warn};

use crate::config::Config;
use crate::document::Document;
use crate::modals::{PickerState, PromptState};
use crate::snippets::{self, RenderedSnippet, SnippetKind};
use crate::ui;

/// How long a notification stays in the status bar.
const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Why a snippet could not be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertError {
    /// No file is open, so there is nothing to insert into.
    NoActiveDocument,
    /// The buffer rejected the insertion.
    InsertionFailed(String),
}

impl std::fmt::Display for InsertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsertError::NoActiveDocument => write!(f, "No active document"),
            InsertError::InsertionFailed(reason) => {
                write!(f, "Failed to insert snippet: {}", reason)
            }
        }
    }
}

impl std::error::Error for InsertError {}

/// Severity of a status-bar notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

impl NotificationLevel {
    /// Display color for this level.
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Green,
            Self::Error => Color::Red,
        }
    }
}

/// A message shown in the status bar until it expires.
#[derive(Debug, Clone)]
pub struct Notification {
    pub text: String,
    pub level: NotificationLevel,
    pub shown_at: Instant,
}

/// Main application state.
pub struct App {
    /// The open file, if one was given on the command line.
    pub document: Option<Document>,
    /// Set when the event loop should exit.
    pub should_quit: bool,
    /// First buffer line visible in the pane.
    pub scroll_line: usize,
    /// First display column visible in the pane.
    pub scroll_col: usize,
    /// Height of the buffer pane content area (excluding borders).
    pub pane_height: u16,
    /// Width of the buffer pane content area (excluding borders and gutter).
    pub pane_width: u16,
    /// Snippet picker modal state (when open).
    pub picker_state: Option<PickerState>,
    /// Parameter prompt state (while collecting values).
    pub prompt_state: Option<PromptState>,
    pub show_help_modal: bool,
    /// Confirm popup raised when quitting with unsaved changes.
    pub show_quit_confirm: bool,
    /// Current status-bar notification, if any.
    pub notification: Option<Notification>,
    /// Session ID for this invocation (always populated).
    pub session_id: String,
    /// Directory where logs are written.
    pub log_directory: Option<PathBuf>,
    /// Loaded configuration.
    pub config: Config,
}

impl App {
    pub fn new(
        document: Option<Document>,
        session_id: String,
        log_directory: Option<PathBuf>,
        config: Config,
    ) -> Self {
        Self {
            document,
            should_quit: false,
            scroll_line: 0,
            scroll_col: 0,
            pane_height: 0,
            pane_width: 0,
            picker_state: None,
            prompt_state: None,
            show_help_modal: false,
            show_quit_confirm: false,
            notification: None,
            session_id,
            log_directory,
            config,
        }
    }

    pub fn notify_info(&mut self, text: String) {
        self.notify(NotificationLevel::Info, text);
    }

    pub fn notify_error(&mut self, text: String) {
        self.notify(NotificationLevel::Error, text);
    }

    fn notify(&mut self, level: NotificationLevel, text: String) {
        self.notification = Some(Notification {
            text,
            level,
            shown_at: Instant::now(),
        });
    }

    /// Per-frame housekeeping: expire the notification once its time is up.
    pub fn tick(&mut self) {
        if let Some(notification) = &self.notification
            && notification.shown_at.elapsed() >= NOTIFICATION_TTL
        {
            self.notification = None;
        }
    }

    /// Open the snippet picker.
    ///
    /// The picker opens even with no document loaded; the missing-document
    /// error surfaces only when a selection is committed, so cancelling
    /// the picker stays free of side effects.
    pub fn open_picker(&mut self) {
        info!("picker_opened");
        self.picker_state = Some(PickerState::new());
    }

    /// Commit a picker selection: insert directly, or start the prompts.
    pub fn pick_snippet(&mut self, kind: SnippetKind) {
        self.picker_state = None;
        if self.document.is_none() {
            warn!(kind = kind.label(), "insert_without_document");
            self.notify_error(InsertError::NoActiveDocument.to_string());
            return;
        }
        info!(kind = kind.label(), "snippet_picked");
        if kind.params().is_empty() {
            self.insert_snippet(kind, &[]);
        } else {
            self.prompt_state = Some(PromptState::new(kind));
        }
    }

    /// Insert the rendered snippet for `kind` at the cursor.
    ///
    /// Renders first, then commits in one step: the insertion position is
    /// validated before the buffer is touched, so a failure leaves the
    /// document exactly as it was. On success the cursor moves to the
    /// rendered cursor position inside the new text.
    pub fn insert_snippet(&mut self, kind: SnippetKind, values: &[String]) {
        let snippet = snippets::render(kind, values);
        match self.commit_insert(&snippet) {
            Ok(cursor) => {
                info!(
                    kind = kind.label(),
                    chars = snippet.text.chars().count(),
                    cursor,
                    "snippet_inserted"
                );
                self.ensure_cursor_visible();
                self.notify_info(format!("Inserted \"{}\" snippet", kind.label()));
            }
            Err(e) => {
                warn!(kind = kind.label(), error = %e, "insert_failed");
                self.notify_error(e.to_string());
            }
        }
    }

    /// Apply a rendered snippet to the document, returning the new cursor.
    fn commit_insert(&mut self, snippet: &RenderedSnippet) -> Result<usize, InsertError> {
        let Some(document) = &mut self.document else {
            return Err(InsertError::NoActiveDocument);
        };
        let end = document
            .insert_at_cursor(&snippet.text)
            .map_err(InsertError::InsertionFailed)?;
        // The offset stays within the inserted text, so this cannot underflow.
        let cursor = end - snippet.cursor_offset_from_end;
        document.set_cursor(cursor);
        Ok(cursor)
    }

    /// Write the document to disk.
    pub fn save_document(&mut self) {
        let Some(document) = &mut self.document else {
            self.notify_error("No active document".to_string());
            return;
        };
        let name = document.display_name();
        let result = document.save();
        match result {
            Ok(()) => self.notify_info(format!("Wrote {}", name)),
            Err(e) => {
                warn!(file = %name, error = %e, "document_save_failed");
                self.notify_error(format!("Failed to write {}: {}", name, e));
            }
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.document.as_ref().is_some_and(|d| d.modified)
    }

    /// Quit, or raise the confirm popup when the buffer has unsaved changes.
    pub fn request_quit(&mut self) {
        if self.has_unsaved_changes() {
            self.show_quit_confirm = true;
        } else {
            self.should_quit = true;
        }
    }

    /// Scroll so the cursor stays inside the visible window.
    pub fn ensure_cursor_visible(&mut self) {
        let (line, display_col) = match &self.document {
            Some(document) => {
                let (line, col) = document.cursor_line_col();
                let text = document.lines().nth(line).unwrap_or("");
                (
                    line,
                    ui::display_col(text, col, self.config.editor.tab_width),
                )
            }
            None => return,
        };

        let height = self.pane_height as usize;
        let width = self.pane_width as usize;
        if height == 0 || width == 0 {
            // Pane dimensions are recorded during drawing, so there is
            // nothing to clamp against before the first frame.
            return;
        }

        if line < self.scroll_line {
            self.scroll_line = line;
        } else if line >= self.scroll_line + height {
            self.scroll_line = line - height + 1;
        }

        if display_col < self.scroll_col {
            self.scroll_col = display_col;
        } else if display_col >= self.scroll_col + width {
            self.scroll_col = display_col - width + 1;
        }
    }

    /// Scroll the viewport up without moving the cursor (mouse wheel).
    pub fn scroll_view_up(&mut self, amount: usize) {
        self.scroll_line = self.scroll_line.saturating_sub(amount);
    }

    /// Scroll the viewport down without moving the cursor (mouse wheel).
    pub fn scroll_view_down(&mut self, amount: usize) {
        self.scroll_line = (self.scroll_line + amount).min(self.max_scroll_line());
    }

    pub fn max_scroll_line(&self) -> usize {
        let lines = self
            .document
            .as_ref()
            .map(|d| d.line_count())
            .unwrap_or(0);
        lines.saturating_sub(self.pane_height as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        App::new(None, "abc123".to_string(), None, Config::default())
    }

    fn app_with_empty_document() -> App {
        let dir = tempfile::tempdir().unwrap();
        let document = Document::open(&dir.path().join("buffer.py")).unwrap();
        App::new(
            Some(document),
            "abc123".to_string(),
            None,
            Config::default(),
        )
    }

    fn app_with_text(text: &str) -> App {
        let mut app = app_with_empty_document();
        let document = app.document.as_mut().unwrap();
        document.insert(0, text).unwrap();
        document.modified = false;
        app
    }

    // InsertError tests

    #[test]
    fn test_insert_error_display() {
        assert_eq!(
            InsertError::NoActiveDocument.to_string(),
            "No active document"
        );
        assert_eq!(
            InsertError::InsertionFailed("bad position".to_string()).to_string(),
            "Failed to insert snippet: bad position"
        );
    }

    // Committer tests

    #[test]
    fn test_insert_snippet_without_document() {
        let mut app = test_app();
        app.insert_snippet(SnippetKind::If, &[]);
        let notification = app.notification.expect("error notification expected");
        assert_eq!(notification.level, NotificationLevel::Error);
        assert_eq!(notification.text, "No active document");
        assert!(app.document.is_none());
    }

    #[test]
    fn test_insert_snippet_places_cursor_after_anchor() {
        let mut app = app_with_empty_document();
        app.insert_snippet(SnippetKind::If, &[]);
        let document = app.document.as_ref().unwrap();
        assert_eq!(document.text(), "if condition:\n    pass");
        assert_eq!(document.cursor(), 12); // just after "condition"
        assert!(document.modified);
        let notification = app.notification.unwrap();
        assert_eq!(notification.level, NotificationLevel::Info);
        assert_eq!(notification.text, "Inserted \"if\" snippet");
    }

    #[test]
    fn test_insert_snippet_mid_buffer() {
        let mut app = app_with_text("x = 1\n\nprint(x)\n");
        app.document.as_mut().unwrap().set_cursor(6);
        app.insert_snippet(SnippetKind::For, &["x".to_string(), "items".to_string()]);
        let document = app.document.as_ref().unwrap();
        assert_eq!(
            document.text(),
            "x = 1\nfor x in items:\n    pass\nprint(x)\n"
        );
        // Cursor sits at the end of the inserted text (offset zero).
        assert_eq!(
            document.cursor(),
            6 + "for x in items:\n    pass".chars().count()
        );
    }

    #[test]
    fn test_insert_snippet_cursor_on_first_condition() {
        let mut app = app_with_empty_document();
        app.insert_snippet(SnippetKind::IfElse, &[]);
        let document = app.document.as_ref().unwrap();
        let before: String = document.text().chars().take(document.cursor()).collect();
        assert_eq!(before, "if condition");
    }

    #[test]
    fn test_pick_snippet_without_document_is_single_error() {
        let mut app = test_app();
        app.open_picker();
        app.pick_snippet(SnippetKind::For);
        assert!(app.picker_state.is_none());
        assert!(app.prompt_state.is_none(), "prompts must not start");
        let notification = app.notification.unwrap();
        assert_eq!(notification.level, NotificationLevel::Error);
        assert_eq!(notification.text, "No active document");
    }

    #[test]
    fn test_pick_snippet_with_params_opens_prompt() {
        let mut app = app_with_empty_document();
        app.pick_snippet(SnippetKind::For);
        let prompt = app.prompt_state.as_ref().unwrap();
        assert_eq!(prompt.kind, SnippetKind::For);
        assert!(app.document.as_ref().unwrap().text().is_empty());
    }

    #[test]
    fn test_pick_snippet_without_params_inserts_immediately() {
        let mut app = app_with_empty_document();
        app.pick_snippet(SnippetKind::Main);
        assert!(app.prompt_state.is_none());
        assert_eq!(
            app.document.as_ref().unwrap().text(),
            "if __name__ == \"__main__\":\n    pass"
        );
    }

    // Notification tests

    #[test]
    fn test_notification_expires_after_ttl() {
        let mut app = test_app();
        app.notify_info("hello".to_string());
        app.notification.as_mut().unwrap().shown_at = Instant::now() - Duration::from_secs(6);
        app.tick();
        assert!(app.notification.is_none());
    }

    #[test]
    fn test_notification_stays_before_ttl() {
        let mut app = test_app();
        app.notify_info("hello".to_string());
        app.tick();
        assert!(app.notification.is_some());
    }

    #[test]
    fn test_newer_notification_replaces_older() {
        let mut app = test_app();
        app.notify_info("first".to_string());
        app.notify_error("second".to_string());
        let notification = app.notification.unwrap();
        assert_eq!(notification.text, "second");
        assert_eq!(notification.level, NotificationLevel::Error);
    }

    // Save and quit tests

    #[test]
    fn test_save_without_document_errors() {
        let mut app = test_app();
        app.save_document();
        assert_eq!(app.notification.unwrap().level, NotificationLevel::Error);
    }

    #[test]
    fn test_request_quit_clean_buffer() {
        let mut app = app_with_empty_document();
        app.request_quit();
        assert!(app.should_quit);
        assert!(!app.show_quit_confirm);
    }

    #[test]
    fn test_request_quit_unsaved_changes() {
        let mut app = app_with_empty_document();
        app.document.as_mut().unwrap().insert(0, "x").unwrap();
        app.request_quit();
        assert!(!app.should_quit);
        assert!(app.show_quit_confirm);
    }

    // Scrolling tests

    #[test]
    fn test_ensure_cursor_visible_scrolls_down() {
        let mut app = app_with_text("a\nb\nc\nd\ne\nf\ng\nh\n");
        app.pane_height = 3;
        app.pane_width = 20;
        let document = app.document.as_mut().unwrap();
        document.set_cursor(document.char_len());
        app.ensure_cursor_visible();
        // Cursor is on line 8 (the empty line after "h"); a window of
        // three lines must start at line 6 to include it.
        assert_eq!(app.scroll_line, 6);
    }

    #[test]
    fn test_ensure_cursor_visible_scrolls_back_up() {
        let mut app = app_with_text("a\nb\nc\nd\ne\nf\ng\nh\n");
        app.pane_height = 3;
        app.pane_width = 20;
        app.scroll_line = 5;
        app.document.as_mut().unwrap().set_cursor(0);
        app.ensure_cursor_visible();
        assert_eq!(app.scroll_line, 0);
    }

    #[test]
    fn test_scroll_view_clamps() {
        let mut app = app_with_text("a\nb\nc\nd\n");
        app.pane_height = 2;
        app.scroll_view_down(100);
        assert_eq!(app.scroll_line, app.max_scroll_line());
        app.scroll_view_up(100);
        assert_eq!(app.scroll_line, 0);
    }
}
