//! Modal dialog state and input handling.

use crossterm::event::KeyCode;
use tracing::debug;

use crate::app::App;
use crate::snippets::{ParamRequest, SnippetKind};

/// State for the snippet picker modal.
#[derive(Debug, Default)]
pub struct PickerState {
    /// Index into [`SnippetKind::ALL`].
    pub selected: usize,
    /// First catalog row visible in the list window.
    pub scroll_offset: usize,
}

impl PickerState {
    pub fn new() -> Self {
        Self {
            selected: 0,
            scroll_offset: 0,
        }
    }

    /// Move selection up.
    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    /// Move selection down.
    pub fn select_next(&mut self) {
        if self.selected < SnippetKind::ALL.len() - 1 {
            self.selected += 1;
        }
    }

    /// The kind the selection currently points at.
    pub fn selected_kind(&self) -> SnippetKind {
        SnippetKind::ALL[self.selected]
    }

    /// Ensure the selected item is visible, adjusting scroll_offset if needed.
    pub fn ensure_visible(&mut self, visible_height: usize) {
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected - visible_height + 1;
        }
    }
}

/// Outcome of answering one parameter prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum PromptOutcome {
    /// More requests remain; the next prompt is on screen.
    Continue,
    /// All requests answered; the values are ready to render.
    Done(Vec<String>),
}

/// State for the parameter prompt flow: one input modal per request.
#[derive(Debug)]
pub struct PromptState {
    /// Kind the collected values will render.
    pub kind: SnippetKind,
    /// Index of the request currently on screen.
    pub current: usize,
    /// Values accepted so far, one per completed request.
    pub values: Vec<String>,
    /// Text in the input field.
    pub input: String,
    /// Cursor within `input`, as a char index.
    pub cursor_pos: usize,
}

impl PromptState {
    pub fn new(kind: SnippetKind) -> Self {
        Self {
            kind,
            current: 0,
            values: Vec::with_capacity(kind.params().len()),
            input: String::new(),
            cursor_pos: 0,
        }
    }

    /// The request currently being asked.
    pub fn current_request(&self) -> &'static ParamRequest {
        &self.kind.params()[self.current]
    }

    /// Total number of requests for this kind.
    pub fn total(&self) -> usize {
        self.kind.params().len()
    }

    /// Accept the current input and advance.
    ///
    /// An empty input falls back to the request default, matching what
    /// the rendered templates document as the default value.
    pub fn accept(&mut self) -> PromptOutcome {
        let value = if self.input.is_empty() {
            self.current_request().default.to_string()
        } else {
            std::mem::take(&mut self.input)
        };
        self.values.push(value);
        self.input.clear();
        self.cursor_pos = 0;
        self.current += 1;
        if self.current >= self.total() {
            PromptOutcome::Done(std::mem::take(&mut self.values))
        } else {
            PromptOutcome::Continue
        }
    }

    /// Dismiss the current prompt: substitute the default and advance.
    ///
    /// Dismissal never aborts the flow; only the picker can do that.
    pub fn dismiss(&mut self) -> PromptOutcome {
        self.input.clear();
        self.cursor_pos = 0;
        self.accept()
    }

    /// Insert a char at the cursor.
    pub fn insert_char(&mut self, c: char) {
        let byte = byte_index(&self.input, self.cursor_pos);
        self.input.insert(byte, c);
        self.cursor_pos += 1;
    }

    /// Delete the char before the cursor (Backspace).
    pub fn delete_char_before(&mut self) {
        if self.cursor_pos == 0 {
            return;
        }
        let byte = byte_index(&self.input, self.cursor_pos - 1);
        self.input.remove(byte);
        self.cursor_pos -= 1;
    }

    /// Delete the char under the cursor (Delete).
    pub fn delete_char_at(&mut self) {
        if self.cursor_pos < self.input.chars().count() {
            let byte = byte_index(&self.input, self.cursor_pos);
            self.input.remove(byte);
        }
    }

    /// Move cursor left within the input.
    pub fn cursor_left(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
        }
    }

    /// Move cursor right within the input.
    pub fn cursor_right(&mut self) {
        if self.cursor_pos < self.input.chars().count() {
            self.cursor_pos += 1;
        }
    }

    /// Move to the beginning of the input.
    pub fn cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    /// Move to the end of the input.
    pub fn cursor_end(&mut self) {
        self.cursor_pos = self.input.chars().count();
    }
}

/// Byte offset of char index `at` in `s`, for splicing.
fn byte_index(s: &str, at: usize) -> usize {
    s.char_indices().nth(at).map(|(b, _)| b).unwrap_or(s.len())
}

/// Handle keyboard input for the snippet picker.
pub fn handle_picker_input(app: &mut App, key_code: KeyCode) {
    let Some(state) = &mut app.picker_state else {
        return;
    };

    match key_code {
        // Cancelling the picker aborts the whole flow, silently.
        KeyCode::Esc => {
            debug!("picker_cancelled");
            app.picker_state = None;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.select_prev();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.select_next();
        }
        KeyCode::Enter => {
            let kind = state.selected_kind();
            app.pick_snippet(kind);
        }
        _ => {}
    }
}

/// Handle keyboard input for a parameter prompt.
pub fn handle_prompt_input(app: &mut App, key_code: KeyCode) {
    let Some(state) = &mut app.prompt_state else {
        return;
    };

    match key_code {
        // Esc substitutes the default for this one parameter and moves on.
        KeyCode::Esc => {
            debug!(param = state.current, "prompt_dismissed");
            let kind = state.kind;
            let outcome = state.dismiss();
            finish_prompt(app, kind, outcome);
        }
        KeyCode::Enter => {
            let kind = state.kind;
            let outcome = state.accept();
            finish_prompt(app, kind, outcome);
        }
        KeyCode::Char(c) => {
            state.insert_char(c);
        }
        KeyCode::Backspace => {
            state.delete_char_before();
        }
        KeyCode::Delete => {
            state.delete_char_at();
        }
        KeyCode::Left => {
            state.cursor_left();
        }
        KeyCode::Right => {
            state.cursor_right();
        }
        KeyCode::Home => {
            state.cursor_home();
        }
        KeyCode::End => {
            state.cursor_end();
        }
        _ => {}
    }
}

/// Commit the collected values once the last request is answered.
fn finish_prompt(app: &mut App, kind: SnippetKind, outcome: PromptOutcome) {
    if let PromptOutcome::Done(values) = outcome {
        app.prompt_state = None;
        app.insert_snippet(kind, &values);
    }
}
