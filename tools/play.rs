/// Play — runs an interactive session in the terminal.
///
/// Usage: play [--stories <dir>] [--encounters <file>] [--seed <n>] [--debug]

use adventure_engine::core::chat::{ChatOracle, OracleConfig};
use adventure_engine::core::freeform::FreeformNarrator;
use adventure_engine::core::io::{Line, PlayerIo, TerminalIo};
use adventure_engine::core::library::ChapterLibrary;
use adventure_engine::core::narrator::Narrator;
use adventure_engine::core::session::{Session, SessionOutcome};
use adventure_engine::schema::encounter::Encounter;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

const INTRO: &str = "\
In 2050 a missile fell on Seoul.
It was no shooting star. It was a nuclear warhead launched from the North.
Since the 2020s every nation had put itself first, wars broke out across the world,
and in the end the peninsula was struck too.
Seoul lies in ruins and there is no government left to speak of.
Everyone puts their own survival first and raids everyone else.
The one piece of good news: the army is pushing north and may soon retake the city.
Until that day comes, you must fight to survive one day at a time.";

#[derive(Parser)]
#[command(name = "play")]
#[command(about = "Survive ruined Seoul one day at a time", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory of RON chapter files
    #[arg(long, default_value = "story_db/chapters")]
    stories: PathBuf,

    /// RON list of freeform encounters
    #[arg(long, default_value = "story_db/encounters.ron")]
    encounters: PathBuf,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Show oracle decisions and log full prompts
    #[arg(short, long)]
    debug: bool,

    /// Chat-completions endpoint
    #[arg(long, env = "ORACLE_BASE_URL")]
    base_url: Option<String>,

    /// Model name sent to the endpoint
    #[arg(long, env = "ORACLE_MODEL")]
    model: Option<String>,

    /// Bearer token for the endpoint
    #[arg(long, env = "ORACLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adventure_engine=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let library = ChapterLibrary::load_dir(&cli.stories)
        .with_context(|| format!("loading chapters from {}", cli.stories.display()))?;
    let encounters = if cli.encounters.exists() {
        Encounter::load_all(&cli.encounters)
            .with_context(|| format!("loading encounters from {}", cli.encounters.display()))?
    } else {
        warn!(path = %cli.encounters.display(), "no encounter file, playing chapters only");
        Vec::new()
    };

    let mut narrators: Vec<Narrator> = library
        .entry_narrators()
        .into_iter()
        .map(Narrator::from)
        .collect();
    narrators.extend(encounters.into_iter().map(|e| Narrator::from(FreeformNarrator::from(e))));
    info!(chapters = library.len(), narrators = narrators.len(), "content loaded");

    let mut config = OracleConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(api_key) = cli.api_key {
        config.api_key = Some(api_key);
    }
    config.debug = cli.debug;
    let oracle = ChatOracle::new(config).context("configuring oracle")?;

    let mut builder = Session::builder().narrators(narrators).debug(cli.debug);
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }
    let mut session = builder.build();

    let mut io = TerminalIo::stdio();
    io.show(Line::Narration(INTRO.to_string()));

    let outcome = session.run(&oracle, &mut io, &library)?;
    match outcome {
        SessionOutcome::Died { day } => {
            io.show(Line::Notice(format!("You died on day {day}.\nGame over.")));
        }
        SessionOutcome::Survived { .. } => {
            io.show(Line::Notice(
                "The army has retaken Seoul.\nIt was hard going, but you proved yourself and survived.\nGame end."
                    .to_string(),
            ));
        }
    }
    io.show(Line::Status(session.status().to_string()));

    Ok(())
}
