//! Document buffer: the file being edited and its char-indexed cursor.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

/// The file being edited.
///
/// The buffer is one flat string of `\n`-separated lines. The cursor and
/// every position handed to [`Document::insert`] are char indices, never
/// byte offsets, so multi-byte text behaves the same as ASCII.
#[derive(Debug)]
pub struct Document {
    /// Path the buffer reads from and writes to.
    pub path: PathBuf,
    /// Buffer differs from the file on disk.
    pub modified: bool,
    /// Path did not exist when opened; created on first save.
    pub new_file: bool,
    text: String,
    cursor: usize,
}

impl Document {
    /// Open `path`, or start an empty new buffer if it doesn't exist yet.
    pub fn open(path: &Path) -> io::Result<Document> {
        match fs::read_to_string(path) {
            Ok(text) => {
                info!(path = ?path, chars = text.chars().count(), "document_opened");
                Ok(Document {
                    path: path.to_path_buf(),
                    modified: false,
                    new_file: false,
                    text,
                    cursor: 0,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = ?path, "document_new");
                Ok(Document {
                    path: path.to_path_buf(),
                    modified: false,
                    new_file: true,
                    text: String::new(),
                    cursor: 0,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Write the buffer to its path, creating parent directories for new files.
    pub fn save(&mut self) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, &self.text)?;
        self.modified = false;
        self.new_file = false;
        info!(path = ?self.path, chars = self.text.chars().count(), "document_saved");
        Ok(())
    }

    /// File name for titles, falling back to the full path.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the buffer in chars.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Lines of the buffer. A trailing newline yields a final empty line
    /// the cursor may occupy.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Cursor position as a char index, `0..=char_len()`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor to `pos`, clamped to the buffer length.
    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.char_len());
    }

    /// Cursor position as zero-based (line, column) in chars.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let mut line = 0;
        let mut col = 0;
        for c in self.text.chars().take(self.cursor) {
            if c == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    /// Insert `text` at char index `at`.
    ///
    /// The position is validated against the buffer length before anything
    /// is touched, so a failed insert leaves the buffer untouched. Returns
    /// the char index just past the inserted text. The cursor does not
    /// move; callers reposition it afterwards.
    pub fn insert(&mut self, at: usize, text: &str) -> Result<usize, String> {
        let len = self.char_len();
        if at > len {
            return Err(format!(
                "insert position {} is beyond the end of the buffer ({} chars)",
                at, len
            ));
        }
        let byte = self.byte_index(at);
        self.text.insert_str(byte, text);
        self.modified = true;
        Ok(at + text.chars().count())
    }

    /// Insert `text` at the cursor. See [`Document::insert`].
    pub fn insert_at_cursor(&mut self, text: &str) -> Result<usize, String> {
        self.insert(self.cursor, text)
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    /// Move up one line, clamping the column to the target line length.
    pub fn move_up(&mut self) {
        let (line, col) = self.cursor_line_col();
        if line > 0 {
            self.cursor = self.char_index_at(line - 1, col);
        }
    }

    /// Move down one line, clamping the column to the target line length.
    pub fn move_down(&mut self) {
        let (line, col) = self.cursor_line_col();
        if line + 1 < self.line_count() {
            self.cursor = self.char_index_at(line + 1, col);
        }
    }

    pub fn move_line_start(&mut self) {
        let (line, _) = self.cursor_line_col();
        self.cursor = self.char_index_at(line, 0);
    }

    pub fn move_line_end(&mut self) {
        let (line, _) = self.cursor_line_col();
        self.cursor = self.char_index_at(line, self.line_char_len(line));
    }

    pub fn move_page_up(&mut self, page: usize) {
        let (line, col) = self.cursor_line_col();
        self.cursor = self.char_index_at(line.saturating_sub(page), col);
    }

    pub fn move_page_down(&mut self, page: usize) {
        let (line, col) = self.cursor_line_col();
        let last = self.line_count().saturating_sub(1);
        self.cursor = self.char_index_at((line + page).min(last), col);
    }

    /// Char index of (line, col), clamping col to the line length.
    fn char_index_at(&self, line: usize, col: usize) -> usize {
        let mut idx = 0;
        for (i, l) in self.text.split('\n').enumerate() {
            if i == line {
                return idx + col.min(l.chars().count());
            }
            idx += l.chars().count() + 1;
        }
        self.char_len()
    }

    fn line_char_len(&self, line: usize) -> usize {
        self.text
            .split('\n')
            .nth(line)
            .map(|l| l.chars().count())
            .unwrap_or(0)
    }

    /// Byte offset of char index `at`, for splicing into the string.
    fn byte_index(&self, at: usize) -> usize {
        self.text
            .char_indices()
            .nth(at)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }
}
