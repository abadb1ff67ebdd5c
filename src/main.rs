mod app;
mod client;
mod error;
mod logging;
mod models;
mod poller;
mod views;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info, LevelFilter};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use structopt::StructOpt;
use tui::backend::CrosstermBackend;
use tui::Terminal;

use crate::client::StatsClient;
use crate::models::settings::FileStore;
use crate::views::{Context, B};

#[derive(StructOpt, Debug)]
#[structopt(about = "Live Wikipedia statistics in your terminal")]
struct Args {
    #[structopt(long = "endpoint", default_value = client::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Where auto-refresh and interval preferences are kept.
    #[structopt(long = "settings-file", parse(from_os_str))]
    settings_file: Option<PathBuf>,

    #[structopt(long = "log-file", default_value = "wikistats-tui.log", parse(from_os_str))]
    log_file: PathBuf,

    #[structopt(long = "log-level", default_value = "info")]
    log_level: LevelFilter,

    /// Request timeout in seconds.
    #[structopt(long = "timeout", default_value = "10")]
    timeout: u64,
}

fn default_settings_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wikistats-tui")
        .join("settings.json")
}

fn main() -> error::Result<()> {
    let args = Args::from_args();
    let _log_handle = logging::init(&args.log_file, args.log_level)?;

    let settings_file = args.settings_file.unwrap_or_else(default_settings_file);
    let client = StatsClient::new(args.endpoint, Duration::from_secs(args.timeout.max(1)))?;
    let settings_store = FileStore::open(settings_file);

    info!(
        "Starting, endpoint = {}, settings = {}",
        client.endpoint(),
        settings_store.path().display()
    );

    let mut ctx = Context::new(client, settings_store)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let tick_rate = Duration::from_millis(250);

    ctx.init();
    let res = run_app(&mut terminal, &mut ctx, tick_rate);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
    )?;
    terminal.show_cursor()?;

    ctx.shutdown();

    if let Err(err) = res {
        error!("Terminal error: {}", err);
        println!("{:?}", err);
    }

    info!("Exiting");

    Ok(())
}

fn run_app(terminal: &mut Terminal<B>, ctx: &mut Context, tick_rate: Duration) -> io::Result<()> {
    loop {
        ctx.process_messages();
        terminal.draw(|f| ctx.draw(f))?;

        if crossterm::event::poll(tick_rate)? {
            if let Event::Key(key) = crossterm::event::read()? {
                if !ctx.on_key_pressed(key) {
                    return Ok(());
                }
            }
        }
    }
}
