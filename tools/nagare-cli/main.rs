use clap::Parser;
use nagare::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Runs the starter node program on a fixed tick
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Text held by the program's Text node
    #[arg(short, long, default_value = "log")]
    text: String,

    /// Number of ticks to run before stopping
    #[arg(short = 'n', long, default_value_t = 5)]
    ticks: u64,

    /// Tick period in milliseconds (overrides the config file and NAGARE_TICK_MS)
    #[arg(short, long)]
    period_ms: Option<u64>,

    /// Path to a scheduler configuration JSON file
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli);

    let sink = nodes::sink(|text| {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", text);
    });

    let (editor, _start) = Editor::demo(sink, &cli.text)
        .await
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build the program: {}", e)));

    println!("--- Program ---");
    print!("{}", editor.describe().await);
    println!("---------------");

    let scheduler = editor
        .scheduler(config.clone())
        .await
        .with_error_reporter(|start, e| eprintln!("Pass from {} failed: {}", start, e));
    let handle = scheduler.start();

    while handle.stats().ticks < cli.ticks && !handle.is_finished() {
        tokio::time::sleep(config.period() / 4).await;
    }
    let stats = handle.stop().await;

    println!("\n--- Summary ---");
    println!("Ticks:    {}", stats.ticks);
    println!("Passes:   {}", stats.passes);
    println!("Failures: {}", stats.failures);
}

fn load_config(cli: &Cli) -> SchedulerConfig {
    let mut config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read config file '{}': {}", path, e))
            });
            SchedulerConfig::from_json_str(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse config JSON: {}", e)))
        }
        None => SchedulerConfig::from_env(),
    };
    if let Some(period_ms) = cli.period_ms {
        config = config.with_period(Duration::from_millis(period_ms));
    }
    config
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}
