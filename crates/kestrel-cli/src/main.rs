use std::{path::PathBuf, str::FromStr};

use anyhow::{bail, Context, Result};
use clap::Parser;
use kestrel_core::{Settings, TeamColor};
use kestrel_executor::{
    behavior::Play,
    sync::{CommandTransport, LatestDispatcher},
    Executor,
};
use tracing_subscriber::{filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod formation;
mod mock_vision;

use formation::{formation_tactics, Formation};
use mock_vision::{MockField, MockRadio, MockVision};

#[derive(Debug, Parser)]
#[command(name = "kestrel", about = "Run the behavior engine against a mock field")]
struct Args {
    /// Settings file, created with defaults if missing
    #[clap(long, default_value = "kestrel.json")]
    settings: PathBuf,

    #[clap(long, default_value = "info")]
    log_level: String,

    /// JSON log file. `auto` picks a timestamped file in the local data
    /// directory, `none` disables file logging.
    #[clap(long, default_value = "none")]
    log_file: String,

    /// Stop after this many cycles instead of waiting for Ctrl-C
    #[clap(long)]
    cycles: Option<u64>,

    /// Seed of the mock vision noise
    #[clap(long, default_value = "0")]
    seed: u64,

    /// Send commands from a worker thread, keeping only the latest batch
    #[clap(long, default_value = "false")]
    async_dispatch: bool,
}

fn log_file_path(arg: &str) -> Result<Option<PathBuf>> {
    match arg {
        "none" => Ok(None),
        "auto" => {
            let time = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
            let filename = format!("kestrel-{time}.log");
            let path = dirs::data_local_dir()
                .map(|p| p.join("kestrel").join(&filename))
                .unwrap_or_else(|| PathBuf::from(&filename));
            Ok(Some(path))
        }
        other => {
            let path = PathBuf::from(other);
            if path.exists() {
                bail!("Log file already exists: {}", path.display());
            }
            Ok(Some(path))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = tracing::Level::from_str(&args.log_level)
        .map_err(|_| anyhow::anyhow!("Invalid log level: {}", args.log_level))?;
    let log_file = log_file_path(&args.log_file)?;

    // The guard flushes the file writer when main returns
    let mut _guard = None;
    let file_layer = match &log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log file: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            _guard = Some(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };
    tracing_subscriber::registry()
        .with(LevelFilter::from_level(log_level))
        .with(fmt::layer().without_time())
        .with(file_layer)
        .try_init()
        .context("Unable to set global tracing subscriber")?;
    if let Some(path) = &log_file {
        tracing::info!("Saving logs to {}", path.display());
    }

    let settings = Settings::load_or_insert(&args.settings)?;
    let color = settings.executor.own_color;
    let side = if color == TeamColor::Blue { -1.0 } else { 1.0 };

    let field = MockField::new(color);
    let radio = MockRadio::new(field.clone(), color);
    let transport: Box<dyn CommandTransport> = if args.async_dispatch {
        Box::new(LatestDispatcher::spawn(Box::new(radio))?)
    } else {
        Box::new(radio)
    };

    let play = Play::new(
        color,
        formation_tactics(side, settings.controller.clone()),
        Formation::new(color),
    );
    let vision = MockVision::new(field, settings.geometry.clone(), args.seed)?;
    let mut executor = Executor::new(settings, play, transport);
    executor.add_source(Box::new(vision))?;

    let handle = executor.handle();
    let mut task = tokio::spawn(executor.run_real_time(args.cycles));
    let finished = tokio::select! {
        res = &mut task => Some(res),
        _ = tokio::signal::ctrl_c() => None,
    };
    let result = match finished {
        Some(res) => res,
        None => {
            tracing::info!("Received Ctrl-C, stopping");
            handle.stop();
            task.await
        }
    };
    result.context("Executor task panicked")??;

    let info = handle.info();
    tracing::info!(
        "Stopped after {} cycles at t = {:.2}s",
        info.cycle,
        info.clock
    );
    Ok(())
}
