use std::path::PathBuf;

use clap::Subcommand;
use quietsleep_core::meditation::MEDITATION_TRACKS;
use quietsleep_core::{Config, RecordingSink, SessionController};

#[derive(Subcommand)]
pub enum MeditationAction {
    /// List meditation tracks
    List,
    /// Start a track and print the resulting events
    Play {
        /// Track id (e.g. en-1, zh-2)
        id: String,
        /// Directory holding the audio/ assets
        #[arg(long)]
        asset_root: Option<PathBuf>,
        /// Report missing asset files as audio warnings
        #[arg(long)]
        verify_assets: bool,
    },
}

pub fn run(action: MeditationAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        MeditationAction::List => {
            for track in MEDITATION_TRACKS {
                println!("{:<5} {:<20} {}", track.id, track.label, track.voice);
            }
        }
        MeditationAction::Play {
            id,
            asset_root,
            verify_assets,
        } => {
            let mut settings = Config::load_or_default().controller_settings();
            if let Some(root) = asset_root {
                settings.asset_root = root;
            }
            let sink = if verify_assets {
                RecordingSink::verifying_files()
            } else {
                RecordingSink::new()
            };
            let mut controller = SessionController::new(sink, settings);
            for event in controller.start_meditation(&id)? {
                println!("{}", serde_json::to_string(&event)?);
            }
            for event in controller.stop_meditation() {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
    }
    Ok(())
}
