mod app;
mod config;
mod document;
mod logging;
mod modal_ui;
mod modals;
mod snippets;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{DefaultTerminal, Terminal};
use tracing::{debug, info};

use crate::app::App;
use crate::config::LoadedConfig;
use crate::document::Document;
use crate::modals::{handle_picker_input, handle_prompt_input};
use crate::ui::draw_ui;

/// Insert Python boilerplate snippets into a file from the terminal.
#[derive(Parser, Debug)]
#[command(name = "pysnip", version, about)]
struct Cli {
    /// Python file to edit. Omit to start without a document.
    file: Option<PathBuf>,

    /// Log filter level (overrides PYSNIP_LOG and the config file).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    use std::time::Instant;

    let start_time = Instant::now();
    let cli = Cli::parse();

    // Load configuration first so its log level can seed the filter.
    let loaded_config = config::load_config();

    // Level precedence: --log-level, then PYSNIP_LOG, then the config
    // file. PYSNIP_LOG is already folded into the loaded config.
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| loaded_config.config.logging.level.clone());

    let (session_id, log_directory, _guard) = match logging::init(&level) {
        Ok(ctx) => {
            logging::cleanup_old_logs(&ctx.log_directory);
            (ctx.session_id, Some(ctx.log_directory), Some(ctx._guard))
        }
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            ("------".to_string(), None, None)
        }
    };

    debug!(
        config_path = %loaded_config.config_path.display(),
        status = ?loaded_config.status,
        "config_loaded"
    );

    // Open the document named on the command line before touching the
    // terminal, so open errors print to a normal screen.
    let document = match &cli.file {
        Some(path) => {
            let document = Document::open(path)
                .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
            Some(document)
        }
        None => None,
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let terminal = Terminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

    let result = run_app(
        terminal,
        document,
        session_id.clone(),
        log_directory,
        loaded_config,
    );

    // Restore terminal
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;

    // Log session end
    let duration = start_time.elapsed();
    info!(
        session_id = %session_id,
        duration_secs = duration.as_secs_f64(),
        "session_end"
    );

    result
}

fn run_app(
    mut terminal: DefaultTerminal,
    document: Option<Document>,
    session_id: String,
    log_directory: Option<PathBuf>,
    loaded_config: LoadedConfig,
) -> Result<()> {
    let mut app = App::new(document, session_id, log_directory, loaded_config.config);

    loop {
        app.tick();

        terminal.draw(|f| draw_ui(f, &mut app))?;

        // Poll with a short timeout so notification expiry stays timely
        if crossterm::event::poll(Duration::from_millis(50))? {
            match crossterm::event::read()? {
                Event::Key(key) => {
                    handle_key(&mut app, key.code);
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        app.scroll_view_up(3);
                    }
                    MouseEventKind::ScrollDown => {
                        app.scroll_view_down(3);
                    }
                    _ => {}
                },
                Event::Resize(_, _) => {
                    // Terminal resized, will be handled in next draw
                }
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Route a key press to the topmost modal, or to the main view.
fn handle_key(app: &mut App, key_code: KeyCode) {
    if app.show_quit_confirm {
        handle_quit_confirm_input(app, key_code);
        return;
    }
    if app.show_help_modal {
        if matches!(key_code, KeyCode::Char('?') | KeyCode::Esc) {
            app.show_help_modal = false;
        }
        return;
    }
    if app.prompt_state.is_some() {
        handle_prompt_input(app, key_code);
        return;
    }
    if app.picker_state.is_some() {
        handle_picker_input(app, key_code);
        return;
    }

    match key_code {
        KeyCode::Char('q') => {
            app.request_quit();
        }
        KeyCode::Char('s') => {
            app.open_picker();
        }
        KeyCode::Char('w') => {
            app.save_document();
        }
        KeyCode::Char('?') => {
            app.show_help_modal = true;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            move_cursor(app, |d| d.move_up());
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_cursor(app, |d| d.move_down());
        }
        KeyCode::Left | KeyCode::Char('h') => {
            move_cursor(app, |d| d.move_left());
        }
        KeyCode::Right | KeyCode::Char('l') => {
            move_cursor(app, |d| d.move_right());
        }
        KeyCode::Home => {
            move_cursor(app, |d| d.move_line_start());
        }
        KeyCode::End => {
            move_cursor(app, |d| d.move_line_end());
        }
        KeyCode::PageUp => {
            let page = app.pane_height.max(1) as usize;
            move_cursor(app, move |d| d.move_page_up(page));
        }
        KeyCode::PageDown => {
            let page = app.pane_height.max(1) as usize;
            move_cursor(app, move |d| d.move_page_down(page));
        }
        _ => {}
    }
}

/// Apply a cursor movement to the open document and keep it in view.
fn move_cursor(app: &mut App, movement: impl FnOnce(&mut Document)) {
    if let Some(document) = &mut app.document {
        movement(document);
    }
    app.ensure_cursor_visible();
}

/// Keys for the unsaved-changes confirmation.
fn handle_quit_confirm_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Char('w') => {
            app.show_quit_confirm = false;
            app.save_document();
            // Stay in the app if the save failed.
            if !app.has_unsaved_changes() {
                app.should_quit = true;
            }
        }
        KeyCode::Char('q') => {
            app.show_quit_confirm = false;
            app.should_quit = true;
        }
        KeyCode::Esc => {
            app.show_quit_confirm = false;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::snippets::SnippetKind;

    fn app_with_file(dir: &tempfile::TempDir) -> App {
        let document = Document::open(&dir.path().join("buffer.py")).unwrap();
        App::new(
            Some(document),
            "abc123".to_string(),
            None,
            Config::default(),
        )
    }

    #[test]
    fn test_q_quits_without_unsaved_changes() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_file(&dir);
        handle_key(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
        assert!(!app.show_quit_confirm);
    }

    #[test]
    fn test_q_with_unsaved_changes_asks_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_file(&dir);
        app.insert_snippet(SnippetKind::If, &[]);
        handle_key(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert!(app.show_quit_confirm);
    }

    #[test]
    fn test_quit_confirm_quit_anyway() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_file(&dir);
        app.insert_snippet(SnippetKind::If, &[]);
        handle_key(&mut app, KeyCode::Char('q'));
        handle_key(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_quit_confirm_save_and_quit() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_file(&dir);
        app.insert_snippet(SnippetKind::If, &[]);
        handle_key(&mut app, KeyCode::Char('q'));
        handle_key(&mut app, KeyCode::Char('w'));
        assert!(app.should_quit);
        assert!(!app.has_unsaved_changes());
        assert!(dir.path().join("buffer.py").exists());
    }

    #[test]
    fn test_quit_confirm_esc_keeps_editing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_file(&dir);
        app.insert_snippet(SnippetKind::If, &[]);
        handle_key(&mut app, KeyCode::Char('q'));
        handle_key(&mut app, KeyCode::Esc);
        assert!(!app.should_quit);
        assert!(!app.show_quit_confirm);
        assert!(app.has_unsaved_changes());
    }

    #[test]
    fn test_s_opens_picker() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_file(&dir);
        handle_key(&mut app, KeyCode::Char('s'));
        assert!(app.picker_state.is_some());
    }

    #[test]
    fn test_s_opens_picker_without_document() {
        let mut app = App::new(None, "abc123".to_string(), None, Config::default());
        handle_key(&mut app, KeyCode::Char('s'));
        assert!(app.picker_state.is_some());
    }

    #[test]
    fn test_help_toggles() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_file(&dir);
        handle_key(&mut app, KeyCode::Char('?'));
        assert!(app.show_help_modal);
        // Keys other than ? and Esc are ignored while help is up
        handle_key(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        handle_key(&mut app, KeyCode::Esc);
        assert!(!app.show_help_modal);
    }

    #[test]
    fn test_picker_keys_win_over_main_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_file(&dir);
        handle_key(&mut app, KeyCode::Char('s'));
        // 'k' navigates the picker instead of moving the cursor
        handle_key(&mut app, KeyCode::Char('j'));
        handle_key(&mut app, KeyCode::Char('k'));
        assert_eq!(app.picker_state.as_ref().unwrap().selected, 0);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_movement_keys_follow_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_file(&dir);
        app.insert_snippet(SnippetKind::Main, &[]);
        handle_key(&mut app, KeyCode::Home);
        let document = app.document.as_ref().unwrap();
        let (_, col) = document.cursor_line_col();
        assert_eq!(col, 0);
    }
}
