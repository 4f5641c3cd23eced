use std::path::PathBuf;

use clap::Parser;
use simulation::{init, App, Bounds, Settings};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(version, about = "Headless lunar lander flown by an autopilot", long_about = None)]
struct Cli {
    /// Settings json file path
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Domain width in meters
    #[arg(long, default_value = "800")]
    width: f64,

    /// Domain height in meters
    #[arg(long, default_value = "600")]
    height: f64,

    /// Seed for terrain and spawn randomness
    #[arg(long)]
    seed: Option<u64>,

    /// Number of landing attempts to fly
    #[arg(long, short, default_value = "1")]
    attempts: usize,

    /// Maximal number of ticks per attempt
    #[arg(long, default_value = "20000")]
    max_ticks: usize,

    /// Print the telemetry of the last attempt
    #[arg(long)]
    trace: bool,

    /// Print results as json
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), String> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("simulation=info".parse().map_err(|e| format!("{e}"))?),
        )
        .init();

    let bounds = Bounds::try_new(cli.width, cli.height).map_err(|e| e.to_string())?;

    let mut settings = match &cli.config {
        Some(path) => init::json::parse_settings(path).map_err(|e| e.to_string())?,
        None => Settings::default(),
    };
    if let Some(seed) = cli.seed {
        settings.mission.seed = Some(seed);
    }

    let mut app = App::try_new(bounds, settings)?.with_max_ticks(cli.max_ticks);

    let now = std::time::Instant::now();
    let result = app.run(cli.attempts);
    let elapsed = now.elapsed();
    tracing::info!(?elapsed, "run ended");

    if cli.json {
        if cli.trace {
            if let Some(history) = app.get_histories().last() {
                for sample in history.iter_history() {
                    println!(
                        "{}",
                        serde_json::to_string(&sample).map_err(|e| e.to_string())?
                    );
                }
            }
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&app.summary()).map_err(|e| e.to_string())?
        );
    } else {
        if cli.trace {
            app.print_flight_state_results();
        }
        let summary = app.summary();
        for (i, landing) in summary.landings.iter().enumerate() {
            println!("Attempt {}: {landing:?}", i + 1);
        }
        println!(
            "Attempts: {}, successes: {}",
            summary.hud.attempts, summary.hud.successes
        );
    }

    result.map(|_| ())
}
