use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use focusboard::app::AppState;
use focusboard::clock::{Clock, SystemClock};
use focusboard::domain::{Priority, TaskFields, TaskStatus};
use focusboard::engine::{Engine, Event as BoardEvent};
use focusboard::persistence::{
    board_file, config_file, decode_str, encode_json, ensure_workspace_dir,
    history_file, init_local_workspace, load_config, load_history, log_file, FileHistory,
    FileStore, SessionHistory, TaskStore, WorkspaceConfig,
};
use focusboard::ticker::Ticker;
use focusboard::{input, report, ui};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "focusboard")]
#[command(about = "A calm, terminal-based Kanban board with per-task timers and focus sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .focusboard directory in the current directory
    Init,
    /// Write the board snapshot as JSON
    Export {
        /// Output file path. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the stored board with a snapshot file
    Import {
        /// Snapshot JSON file
        file: PathBuf,
    },
    /// Generate a markdown report with task and focus statistics
    Report {
        /// Output file path. Defaults to <workspace>/report-YYYY-MM-DD.md
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Add a task from the shell
    Add {
        title: String,
        /// Column: BACKLOG, TODO, IN_PROGRESS, IN_REVIEW or DONE
        #[arg(short, long, default_value = "TODO")]
        status: String,
        /// Priority: HIGH, MEDIUM, LOW or NONE
        #[arg(short, long)]
        priority: Option<String>,
    },
}

/// Tracing is opt-in via RUST_LOG. Invalid filters are ignored.
/// While the TUI owns the terminal, output goes to the workspace log file.
fn init_logging(log_path: Option<&Path>) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    let file = log_path.and_then(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    let (stderr_layer, file_layer) = match file {
        Some(file) => (
            None,
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))),
        ),
        None => (Some(fmt::layer().with_writer(io::stderr)), None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            init_logging(None);
            let dir = init_local_workspace()?;
            println!("Initialized focusboard directory: {}", dir.display());
            println!();
            println!("Focusboard will now use this local directory for the board.");
            println!("Run 'focusboard' to open it.");
            Ok(())
        }
        Some(Commands::Export { output }) => {
            init_logging(None);
            let (_, store) = open_store()?;
            let json = encode_json(store.board())?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("Board exported to {}", path.display());
                }
                None => println!("{}", json),
            }
            Ok(())
        }
        Some(Commands::Import { file }) => {
            init_logging(None);
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let mut board = decode_str(&content);
            if board.tasks.is_empty() && board.columns.is_empty() && !content.trim().is_empty() {
                eprintln!("Warning: {} did not decode to a board; importing an empty board", file.display());
            }
            let (dir, mut store) = open_store()?;
            if board.columns.is_empty() {
                board.columns = store.columns().to_vec();
            }
            let count = board.tasks.len();
            store.replace_board(board)?;
            println!("Imported {} tasks into {}", count, board_file(&dir).display());
            Ok(())
        }
        Some(Commands::Report { output }) => {
            init_logging(None);
            let (dir, store) = open_store()?;
            let history = load_history(history_file(&dir))?;
            let path = report::generate_report(&dir, store.board(), &history, SystemClock.now(), output)?;
            println!("Report generated: {}", path.display());
            Ok(())
        }
        Some(Commands::Add {
            title,
            status,
            priority,
        }) => {
            init_logging(None);
            add_task(title, &status, priority.as_deref())
        }
        None => run_tui(),
    }
}

fn load_workspace_config(dir: &Path) -> Result<WorkspaceConfig> {
    load_config(config_file(dir))
        .with_context(|| format!("Failed to read {}", config_file(dir).display()))
}

fn open_store() -> Result<(PathBuf, FileStore)> {
    let dir = ensure_workspace_dir()?;
    let config = load_workspace_config(&dir)?;
    let store = FileStore::open(&dir, config.default_columns())?;
    Ok((dir, store))
}

fn build_engine(dir: &Path, config: &WorkspaceConfig) -> Result<Engine<FileStore, FileHistory>> {
    let store = FileStore::open(dir, config.default_columns())?;
    let columns = store.columns().to_vec();
    Ok(Engine::new(
        store,
        FileHistory::new(history_file(dir)),
        columns,
        config.focus_settings(),
        config.time_step(),
        SystemClock.now(),
    ))
}

fn add_task(title: String, status: &str, priority: Option<&str>) -> Result<()> {
    let status = TaskStatus::from_tag(status)
        .with_context(|| format!("Unknown status: {}", status))?;
    let priority = match priority {
        Some(tag) => Priority::from_tag(tag).with_context(|| format!("Unknown priority: {}", tag))?,
        None => Priority::None,
    };

    let dir = ensure_workspace_dir()?;
    let config = load_workspace_config(&dir)?;
    let mut engine = build_engine(&dir, &config)?;

    let mut fields = TaskFields::titled(title.trim());
    fields.priority = priority;
    engine.dispatch(BoardEvent::TaskCreated { status, fields }, SystemClock.now());

    if let Some(message) = &engine.state().message {
        anyhow::bail!("{}", message.text);
    }
    println!("Added \"{}\" to {}", title.trim(), status.title());
    Ok(())
}

fn run_tui() -> Result<()> {
    let dir = ensure_workspace_dir()?;
    init_logging(Some(&log_file(&dir)));

    tracing::info!(dir = %dir.display(), "opening board");
    let config = load_workspace_config(&dir)?;
    let engine = build_engine(&dir, &config)?;
    let mut app = AppState::new(engine, SystemClock);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app<S, H>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState<S, H>,
    config: &WorkspaceConfig,
) -> Result<()>
where
    S: TaskStore,
    H: SessionHistory,
{
    let mut ticker = Ticker::new(config.tick_duration());

    loop {
        let now = app.now();
        let view = app.view();
        terminal.draw(|f| ui::render(f, &view, &app.ui, now))?;

        // Handle events with timeout for ticking
        if event::poll(ticker.timeout())? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press && input::handle_key(app, key) {
                    return Ok(());
                }
            }
        }

        if ticker.fire() {
            app.tick();
        }
    }
}
