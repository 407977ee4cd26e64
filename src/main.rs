use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use timeline::render::RenderMode;
use timeline::ui::install_panic_hook;
use timeline::{util, App, Config, TapeSource};

/// Follow or scrub an agent telemetry tape in the terminal
#[derive(Debug, Parser)]
#[command(name = "timeline", version, about)]
struct Cli {
    /// JSONL tape to open
    tape: PathBuf,

    /// Keep reading points as the tape grows
    #[arg(short, long)]
    follow: bool,

    /// Config file (default: ~/.timeline/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Data directory for config and logs (default: ~/.timeline)
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Initial view
    #[arg(short, long, value_enum, default_value_t = RenderMode::Auto)]
    mode: RenderMode,

    /// Resume live follow when a scrub lands on the newest point
    #[arg(long)]
    resume_follow_at_live_edge: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    util::init_data_dir(cli.data_dir.clone());

    // Log to file (~/.timeline/logs/timeline.log); the terminal belongs to the UI
    fs::create_dir_all(util::logs_dir())?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(util::log_file_path())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let mut config = Config::load(cli.config.as_deref());
    if cli.resume_follow_at_live_edge {
        config = config.with_resume_follow_at_live_edge(true);
    }

    if !cli.follow && !cli.tape.exists() {
        anyhow::bail!("tape not found: {}", cli.tape.display());
    }

    install_panic_hook();
    let source = TapeSource {
        path: cli.tape,
        follow: cli.follow,
    };
    let mut app = App::new(config, source, cli.mode);
    app.run().await
}
