//! Command-line definitions for the kettle dev tools.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Developer tools for the kettle wake-word core.
#[derive(Parser, Debug)]
#[command(name = "kettle", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Vectorize a mono 16-bit WAV and print the frame geometry.
    Frames(FramesCommand),
    /// Replay a probability trace through the trigger decoder.
    Trigger(TriggerCommand),
}

#[derive(Parser, Debug)]
pub struct FramesCommand {
    /// Input WAV file (mono, 16-bit PCM).
    pub wav: PathBuf,

    /// Spectral representation: `mels` or `mfccs`.
    #[arg(long, default_value = "mfccs")]
    pub vectorizer: String,

    /// Concatenate delta vectors to each frame.
    #[arg(long)]
    pub delta: bool,
}

#[derive(Parser, Debug)]
pub struct TriggerCommand {
    /// Probability trace: whitespace-separated floats. Reads stdin when
    /// omitted.
    pub trace: Option<PathBuf>,

    /// Detection sensitivity in [0, 1].
    #[arg(long, default_value_t = kettle::constants::DEFAULT_SENSITIVITY)]
    pub sensitivity: f32,

    /// Qualifying frames required before a trigger fires.
    #[arg(long, default_value_t = kettle::constants::DEFAULT_TRIGGER_LEVEL)]
    pub trigger_level: i32,

    /// Caller chunk size in bytes (scales the cooldown depth).
    #[arg(long, default_value_t = kettle::constants::DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
}
