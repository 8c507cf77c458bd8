use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use pdfslots::controller::ViewController;
use pdfslots::event_source::KeyboardEventSource;
use pdfslots::library::{resolve_data_dir, resolve_log_path};
use pdfslots::main_app::{App, run_app_with_event_source};
use pdfslots::navigation::{PageNavigator, ScrollBehavior};
use pdfslots::page_probe::PdfCountProbe;
use pdfslots::panic_handler::initialize_panic_handler;
use pdfslots::settings;
use pdfslots::store::{FileKeyValueStore, SlotStore};

/// Keep up to nine PDF documents in named slots and browse them in the terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory for stored documents (overrides the config file)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Write the log here instead of the state directory
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_path = match args.log_file {
        Some(path) => path,
        None => resolve_log_path()?,
    };
    WriteLogger::init(
        if args.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        Config::default(),
        File::create(&log_path).with_context(|| format!("Failed to create log file {log_path:?}"))?,
    )?;
    info!("Starting pdfslots");

    settings::load_settings();
    if let Some(dir) = args.data_dir {
        let mut config = settings::current();
        config.data_dir = Some(dir);
        settings::set_current(config);
    }

    let data_dir = resolve_data_dir(settings::get_data_dir().as_deref())?;
    info!("Documents are stored in {data_dir:?}");

    let behavior = if settings::is_smooth_scroll() {
        ScrollBehavior::Smooth
    } else {
        ScrollBehavior::Instant
    };
    let page_height = settings::get_page_height();
    let store = SlotStore::new(FileKeyValueStore::with_root(data_dir));
    let controller = ViewController::new(Box::new(store), page_height)
        .with_navigator(PageNavigator::new(page_height).with_behavior(behavior));
    let mut app = App::new(
        controller,
        Box::new(PdfCountProbe),
        settings::get_scroll_step(),
    );

    initialize_panic_handler();
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app_with_event_source(&mut terminal, &mut app, &mut KeyboardEventSource);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {err:?}");
        eprintln!("{err:?}");
    }

    info!("Shutting down pdfslots");
    Ok(())
}
