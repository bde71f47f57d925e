mod app;
mod ui;

use anyhow::Result;
use app::{App, Pane};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use noteblocks_config::Config;
use noteblocks_engine::io;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    env,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
    time::Duration,
};

/// How long the event loop waits for input before driving the typing debounce.
const TICK: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    env_logger::init();

    // Determine notes path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Usage: {} <notes-folder-path>", args[0]);
            process::exit(1);
        }
    };
    let options = config
        .as_ref()
        .map(Config::editor_options)
        .unwrap_or_default();

    let (notes_path, from_config) = match (args.len(), config) {
        (2, _) => (PathBuf::from(&args[1]), false),
        (1, Some(config)) => (config.notes_path, true),
        (1, None) => {
            eprintln!("Error: No notes path provided and no config file found");
            eprintln!("Usage: {} <notes-folder-path>", args[0]);
            eprintln!("Or create a config file at {}", config_path.display());
            process::exit(1);
        }
        _ => {
            eprintln!("Usage: {} [notes-folder-path]", args[0]);
            process::exit(1);
        }
    };

    if let Err(e) = io::validate_notes_dir(&notes_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Notes path '{}'{} is invalid: {e}",
            notes_path.display(),
            source
        );
        process::exit(1);
    }
    info!("opening notes in {}", notes_path.display());

    let mut app = App::new(notes_path, options)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("{err:?}");
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::ui(f, app))?;

        if event::poll(TICK)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match app.pane {
                Pane::Files => match key.code {
                    KeyCode::Char('q') => {
                        app.save_if_dirty()?;
                        return Ok(());
                    }
                    KeyCode::Down | KeyCode::Char('j') => app.next_file(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous_file(),
                    KeyCode::Enter => {
                        if let Err(e) = app.open_selected() {
                            app.status = format!("Could not open note: {e}");
                        }
                    }
                    KeyCode::Tab if app.open_note.is_some() => app.pane = Pane::Editor,
                    _ => {}
                },
                Pane::Editor => {
                    if let Err(e) = app.handle_editor_key(key) {
                        app.status = format!("Error: {e}");
                    }
                }
            }
        }

        app.tick();
    }
}
