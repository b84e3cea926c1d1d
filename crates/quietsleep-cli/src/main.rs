use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quietsleep-cli", version, about = "QuietSleep CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run or simulate a breathing session
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Noise synthesis
    Noise {
        #[command(subcommand)]
        action: commands::noise::NoiseAction,
    },
    /// Breathing rhythm presets
    Rhythm {
        #[command(subcommand)]
        action: commands::rhythm::RhythmAction,
    },
    /// Guided meditation tracks
    Meditation {
        #[command(subcommand)]
        action: commands::meditation::MeditationAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    // stdout carries JSON events; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Session { action } => commands::session::run(action),
        Commands::Noise { action } => commands::noise::run(action),
        Commands::Rhythm { action } => commands::rhythm::run(action),
        Commands::Meditation { action } => commands::meditation::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
