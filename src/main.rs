//! kettle CLI binary
//! Developer tools for inspecting vectorizer output and tuning the trigger
//! decoder without a model in the loop.

use std::fs;
use std::io::Read;

use anyhow::{Context, Result, bail};
use clap::Parser;
use env_logger::Env;
use log::info;

mod cli;
use cli::{Cli, Commands, FramesCommand, TriggerCommand};

use kettle::{
    ListenerConfig, ListenerParams, MelVectorizer, TriggerConfig, TriggerDetector, Vectorize,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Frames(cmd) => frames(cmd),
        Commands::Trigger(cmd) => trigger(cmd),
    }
}

fn frames(cmd: FramesCommand) -> Result<()> {
    let reader = hound::WavReader::open(&cmd.wav)
        .with_context(|| format!("cannot open {}", cmd.wav.display()))?;
    let spec = reader.spec();
    if spec.channels != 1 || spec.bits_per_sample != 16 {
        bail!(
            "expected mono 16-bit PCM, got {} channel(s) at {} bits",
            spec.channels,
            spec.bits_per_sample
        );
    }

    let params = ListenerParams {
        sample_rate: spec.sample_rate as usize,
        vectorizer: cmd.vectorizer.parse().context("unknown vectorizer")?,
        use_delta: cmd.delta,
        ..ListenerParams::default()
    };
    ListenerConfig {
        params: params.clone(),
        trigger: TriggerConfig::default(),
    }
    .validate()
    .context("geometry degenerates at this sample rate")?;

    let samples: Vec<f32> = reader
        .into_samples::<i16>()
        .map(|s| s.map(|v| v as f32 / kettle::audio::MAX_WAV_VALUE))
        .collect::<std::result::Result<_, _>>()
        .context("failed to decode WAV samples")?;

    info!(
        "geometry: window {} / hop {} / buffer {} samples, {} x {} features",
        params.window_samples(),
        params.hop_samples(),
        params.buffer_samples(),
        params.n_features(),
        params.feature_size(),
    );

    let mut vectorizer = MelVectorizer::new(&params)?;
    let frames = vectorizer
        .extract(&samples)
        .map_err(|e| anyhow::anyhow!("extraction failed: {e}"))?;

    println!(
        "{} samples -> {} frames of {} features",
        samples.len(),
        frames.len(),
        params.feature_size()
    );
    if let Some(first) = frames.first() {
        let mean = first.iter().sum::<f32>() / first.len() as f32;
        let peak = first.iter().fold(f32::MIN, |a, &b| a.max(b));
        println!("first frame: mean {mean:.4}, peak {peak:.4}");
    }
    Ok(())
}

fn trigger(cmd: TriggerCommand) -> Result<()> {
    let raw = match &cmd.trace {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let cfg = TriggerConfig {
        sensitivity: cmd.sensitivity,
        trigger_level: cmd.trigger_level,
        chunk_size: cmd.chunk_size,
    };
    cfg.validate()?;
    let mut decoder = TriggerDetector::new(&cfg);

    let mut fired = 0usize;
    for (i, token) in raw.split_whitespace().enumerate() {
        let prob: f32 = token
            .parse()
            .with_context(|| format!("bad probability {token:?} at position {i}"))?;
        if decoder.update(prob) {
            fired += 1;
            println!("frame {i}: TRIGGER (prob {prob:.3})");
        }
    }
    println!("{fired} trigger(s), final activation {}", decoder.activation());
    Ok(())
}
