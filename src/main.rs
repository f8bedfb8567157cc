use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use wanianki::Config;

#[derive(Parser)]
#[command(name = "wanianki")]
#[command(version, about = "Export learned WaniKani vocabulary as an Audio -> Meaning Anki deck")]
struct Cli {
    /// A WaniKani API token, generated at https://www.wanikani.com/settings/personal_access_tokens
    #[arg(long, env = "WANIKANI_API_TOKEN", hide_env_values = true)]
    api_token: String,

    /// Also export vocabulary from the level currently in progress
    #[arg(long)]
    include_in_progress_level: bool,

    /// Directory for the subject cache, downloaded audio and the output deck
    #[arg(long)]
    data_directory: Option<PathBuf>,

    /// Where to write the deck (defaults to <data-directory>/wanikani_vocab.apkg)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Build the deck from audio already on disk without downloading the rest
    #[arg(long)]
    skip_audio: bool,
}

/// Logs go to stderr; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "wanianki=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::new(
        cli.api_token,
        cli.include_in_progress_level,
        cli.data_directory,
        cli.output,
        cli.skip_audio,
    );

    let summary = wanianki::run(&config)?;
    println!(
        "Wrote {} cards (levels 1-{}) to {}",
        summary.cards,
        summary.max_level,
        summary.output_path.display()
    );

    Ok(())
}
