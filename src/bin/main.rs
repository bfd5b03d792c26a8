use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use embassy_executor::Spawner;
use embassy_futures::select::{Either, select};
use embassy_time::{Instant, Timer};
use flashread_core::{
    import::{ImportError, import_pages, reopen},
    input::ReaderCommand,
    pacer::TickResult,
    progress::{ProgressTarget, ProgressTracker},
    session::ReaderSession,
    settings::ReaderConfig,
    storage::{DocumentId, DocumentRecord, Library},
};
use log::{error, info, warn};
use uuid::Uuid;

use extraction::PageDumpExtractor;
use file_store::FileStore;
use progress_sync::{ChannelSink, STORE_COMMANDS, StoreCommand, SystemClock};
use terminal::COMMANDS;

#[path = "main/extraction.rs"]
mod extraction;
#[path = "main/file_store.rs"]
mod file_store;
#[path = "main/progress_sync.rs"]
mod progress_sync;
#[path = "main/terminal.rs"]
mod terminal;

const APP_NAME: &str = "flashread";
const STORE_QUEUE_DEPTH: usize = 16;
const COMMAND_QUEUE_DEPTH: usize = 8;

/// Speed-read a text document one word at a time.
///
/// FILE is a page dump such as `pdftotext` output, with pages separated by
/// form feeds. Reading position is remembered per file.
#[derive(Parser, Debug)]
#[command(name = "flashread", version, about)]
struct Args {
    /// Page dump to read
    file: Option<PathBuf>,

    /// Reading speed in words per minute (overrides the saved setting)
    #[arg(long, env = "FLASHREAD_WPM")]
    wpm: Option<u32>,

    /// Words shown at once, 1 to 5 (overrides the saved setting)
    #[arg(long)]
    chunk: Option<usize>,

    /// Where history, library and settings are kept
    #[arg(long, env = "FLASHREAD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Display name for the document (defaults to the file name)
    #[arg(long)]
    name: Option<String>,

    /// List recently read files
    #[arg(long)]
    history: bool,

    /// List imported documents
    #[arg(long)]
    library: bool,

    /// Forget the recently read list
    #[arg(long)]
    clear_history: bool,

    /// Remove a document from the library by id
    #[arg(long, value_name = "ID")]
    remove: Option<String>,
}

impl Args {
    fn has_maintenance_flags(&self) -> bool {
        self.history || self.library || self.clear_history || self.remove.is_some()
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Err(err) = run(args).await {
        error!("flashread: {:#}", err);
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
    std::process::exit(0);
}

async fn run(args: Args) -> Result<()> {
    let data_dir = match &args.data_dir {
        Some(dir) => dir.clone(),
        None => default_data_dir()?,
    };
    let store = FileStore::open(&data_dir)
        .with_context(|| format!("cannot open data directory {}", data_dir.display()))?;
    info!("boot: data dir={}", store.dir().display());
    let mut library = Library::new(store);

    if args.clear_history {
        library.clear_recent()?;
        println!("history cleared");
    }
    if let Some(id) = &args.remove {
        if library.delete_document(&DocumentId::new(id.as_str()))? {
            println!("removed {id}");
        } else {
            bail!("no document with id {id}");
        }
    }
    if args.history {
        terminal::print_history(&library.recent_files());
    }
    if args.library {
        terminal::print_library(&library.documents());
    }

    let Some(path) = args.file.as_deref() else {
        if args.has_maintenance_flags() {
            return Ok(());
        }
        bail!("no file given, see --help");
    };

    let session = open_document(&mut library, path, &args)?;
    terminal::print_toc(&session);
    println!("{}", terminal::HELP);
    terminal::spawn_input_thread(&COMMANDS).context("cannot start input thread")?;

    let ui_future = reader_loop(session);
    let store_future = progress_sync::store_loop(&STORE_COMMANDS, &mut library);
    embassy_futures::join::join(ui_future, store_future).await;
    println!();
    Ok(())
}

fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_NAME))
        .context("no platform data directory, pass --data-dir")
}

/// Import or reopen `path`, register it in the library and build a session
/// that reports progress to the store future.
fn open_document(
    library: &mut Library<FileStore>,
    path: &Path,
    args: &Args,
) -> Result<ReaderSession> {
    let path = fs::canonicalize(path).with_context(|| format!("cannot open {}", path.display()))?;
    let locator = path.display().to_string();
    let name = args.name.clone().unwrap_or_else(|| display_name(&path));

    let known = library.find_by_locator(&locator);
    let mut extractor = PageDumpExtractor::new();
    let imported = match &known {
        Some(record) => reopen(&mut extractor, path.as_path(), record),
        None => import_pages(&mut extractor, path.as_path()),
    };
    let imported = match imported {
        Ok(imported) => imported,
        Err(ImportError::EmptyContent) => {
            bail!("{name} contains no readable text; it might be a scanned image")
        }
        Err(err) => return Err(err).with_context(|| format!("cannot import {name}")),
    };

    let total = imported.total_tokens();
    let (id, resume) = match &known {
        Some(record) => (record.id.clone(), record.last_index),
        None => (DocumentId::new(Uuid::new_v4().to_string()), 0),
    };
    let record = DocumentRecord {
        id: id.clone(),
        uri: locator.clone(),
        name: name.clone(),
        last_index: resume.min(total),
        total_words: total,
        page_map: imported.page_index.clone(),
        timestamp: progress_sync::wall_clock_ms(),
    };
    if let Err(err) = library.upsert_document(record.clone()) {
        warn!("open: library update failed id={} err={}", id, err);
    }
    if let Err(err) = library.record_recent(record.recent_entry()) {
        warn!("open: history update failed id={} err={}", id, err);
    }
    info!(
        "open: id={} tokens={} pages={} resume={}",
        id,
        total,
        record.page_map.page_count(),
        resume
    );

    let mut config = library
        .load_settings()
        .map(|settings| ReaderConfig::default().with_settings(settings))
        .unwrap_or_default();
    if let Some(wpm) = args.wpm {
        config.wpm = wpm.max(config.min_wpm);
    }
    if let Some(chunk) = args.chunk {
        config.chunk_size = chunk;
    }

    let mut session = ReaderSession::new(name.clone(), imported, config).resume_at(resume);
    let tracker = ProgressTracker::new(
        ProgressTarget {
            document_id: Some(id),
            locator,
            display_name: name,
        },
        ChannelSink::new(&STORE_COMMANDS),
        SystemClock,
    )
    .resuming_from(session.engine().position());
    session.subscribe(Box::new(tracker));
    Ok(session)
}

fn display_name(path: &Path) -> String {
    path.file_stem()
        .or(path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

/// Wait for the next command or the pending tick, whichever comes first.
async fn reader_loop(mut session: ReaderSession) {
    terminal::draw(&session.view());

    loop {
        let command = match session.next_tick_at() {
            Some(due_ms) => {
                match select(COMMANDS.receive(), Timer::at(Instant::from_millis(due_ms))).await {
                    Either::First(command) => Some(command),
                    Either::Second(()) => None,
                }
            }
            None => Some(COMMANDS.receive().await),
        };

        let now = now_ms();
        let redraw = match command {
            Some(ReaderCommand::Quit) => {
                session.apply(ReaderCommand::Quit, now);
                break;
            }
            Some(command) => session.apply(command, now),
            None => session.tick(now) != TickResult::Idle,
        };
        if redraw {
            terminal::draw(&session.view());
        }
    }

    let settings = session.settings();
    info!(
        "reader: closing position={} wpm={} chunk={}",
        session.engine().position(),
        settings.wpm,
        settings.chunk_size
    );
    // Dropping the session flushes the final position into the store queue.
    drop(session);
    STORE_COMMANDS
        .send(StoreCommand::SaveSettings(settings))
        .await;
    STORE_COMMANDS.send(StoreCommand::Shutdown).await;
}
