// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{crate_version, Parser, Subcommand};
use tracing::{info, warn};

use drumkit::audio::write_wav;
use drumkit::config::SamplerConfig;
use drumkit::models::{DrumPattern, User};
use drumkit::note::Note;
use drumkit::sampler::{create_drum_sampler, SampleLoader, Sampler, DEFAULT_SAMPLE_RATE};

/// Tempo used by `render` when neither --bpm nor --pattern is given.
const DEFAULT_BPM: f64 = 120.0;

/// Rendering stops this long after the last note even if voices are still sounding.
const MAX_TAIL: Duration = Duration::from_secs(10);

/// The longest sequence `render` will schedule, not counting the tail.
const MAX_SEQUENCE: Duration = Duration::from_secs(60 * 60);

/// Frames rendered per block.
const BLOCK_FRAMES: usize = 1024;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A note-triggered drum sampler."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the note to sample mappings of the sampler.
    Samples {
        /// A sampler config to use instead of the built-in drum kit.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Loads every sample and reports on it.
    Verify {
        /// A sampler config to use instead of the built-in drum kit.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// The directory that absolute sample paths are resolved under.
        #[arg(short, long)]
        root: Option<PathBuf>,
        /// The sample rate to convert samples to.
        #[arg(short, long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sample_rate: u32,
    },
    /// Renders a sequence of notes, one per beat, to a WAV file.
    Render {
        /// The WAV file to write.
        output: PathBuf,
        /// Comma separated notes, e.g. C3,E3,D3,E3. Use - for a rest.
        #[arg(short, long)]
        notes: String,
        /// The tempo in beats per minute.
        #[arg(short, long, conflicts_with = "pattern")]
        bpm: Option<f64>,
        /// A drum pattern file to take the tempo from.
        #[arg(short, long)]
        pattern: Option<PathBuf>,
        /// The velocity of every note, from 0.0 to 1.0.
        #[arg(short, long, default_value_t = 1.0)]
        velocity: f32,
        /// A sampler config to use instead of the built-in drum kit.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// The directory that absolute sample paths are resolved under.
        #[arg(short, long)]
        root: Option<PathBuf>,
        /// The output sample rate.
        #[arg(short, long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sample_rate: u32,
    },
    /// Parses and prints a drum pattern.
    Pattern {
        /// The path to a JSON or YAML pattern file.
        path: PathBuf,
    },
    /// Parses and prints a user.
    User {
        /// The path to a JSON or YAML user file.
        path: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Samples { config } => {
            let sampler = build_sampler(config.as_deref())?;

            println!("Base URL: {}", sampler.config().base_url());
            println!("Samples (count: {}):", sampler.urls().len());
            for (note, url) in sampler.urls() {
                println!("- {} (MIDI {}): {}", note, note.midi(), url);
            }
        }
        Commands::Verify {
            config,
            root,
            sample_rate,
        } => {
            let mut sampler = build_sampler(config.as_deref())?.with_output(sample_rate, 2);
            let mut loader = SampleLoader::new(sample_rate);
            sampler.load(&mut loader, root.as_deref())?;

            println!("Samples (count: {}):", sampler.urls().len());
            for (note, url) in sampler.urls() {
                if let Some(buffer) = sampler.buffer(note) {
                    println!(
                        "- {}: {} ({} channels, {}ms, {}KB)",
                        note,
                        url,
                        buffer.channel_count(),
                        buffer.duration().as_millis(),
                        buffer.memory_size() / 1024
                    );
                }
            }
            println!("{:?}", loader);
        }
        Commands::Render {
            output,
            notes,
            bpm,
            pattern,
            velocity,
            config,
            root,
            sample_rate,
        } => {
            let bpm = match (bpm, pattern) {
                (Some(bpm), _) => bpm,
                (None, Some(pattern)) => DrumPattern::load(&pattern)?.bpm,
                (None, None) => DEFAULT_BPM,
            };
            let sequence = parse_sequence(&notes)?;

            let mut sampler = build_sampler(config.as_deref())?.with_output(sample_rate, 2);
            let mut loader = SampleLoader::new(sample_rate);
            sampler.load(&mut loader, root.as_deref())?;

            render_sequence(&mut sampler, &sequence, bpm, velocity, &output)?;
        }
        Commands::Pattern { path } => {
            let pattern = DrumPattern::load(&path)?;

            println!("{} ({})", pattern.name, pattern.id);
            println!("Tempo: {} BPM", pattern.bpm);
            println!("Time signature: {}", pattern.time_signature);
            match pattern.beat_duration() {
                Some(beat) => println!("Beat: {}ms", beat.as_millis()),
                None => println!("Beat: invalid tempo"),
            }
            match pattern.bar_duration() {
                Some(bar) => println!("Bar: {}ms", bar.as_millis()),
                None => println!("Bar: unknown"),
            }
        }
        Commands::User { path } => {
            let user = User::load(&path)?;

            println!("{} <{}> ({})", user.display_name(), user.email, user.id);
        }
    }

    Ok(())
}

/// Builds the sampler from a config file, or the drum kit when none is given.
fn build_sampler(config: Option<&Path>) -> Result<Sampler, Box<dyn Error>> {
    Ok(match config {
        Some(path) => Sampler::new(SamplerConfig::deserialize(path)?)?,
        None => create_drum_sampler(),
    })
}

/// Parses a comma separated note list. `-` or an empty entry is a rest.
fn parse_sequence(notes: &str) -> Result<Vec<Option<Note>>, Box<dyn Error>> {
    notes
        .split(',')
        .map(|entry| -> Result<Option<Note>, Box<dyn Error>> {
            let entry = entry.trim();
            if entry.is_empty() || entry == "-" {
                Ok(None)
            } else {
                Ok(Some(entry.parse::<Note>()?))
            }
        })
        .collect()
}

/// Schedules one note per beat and renders until every voice has finished.
fn render_sequence(
    sampler: &mut Sampler,
    sequence: &[Option<Note>],
    bpm: f64,
    velocity: f32,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    let beat = if bpm.is_finite() && bpm > 0.0 {
        Duration::try_from_secs_f64(60.0 / bpm).ok()
    } else {
        None
    };
    let beat_frames = beat.map_or(0, |beat| sampler.frames_for(beat));
    let Some(beat) = beat.filter(|_| beat_frames > 0) else {
        return Err(format!("invalid tempo {}", bpm).into());
    };
    if beat.as_secs_f64() * sequence.len() as f64 > MAX_SEQUENCE.as_secs_f64() {
        return Err(format!(
            "{} beats at {} BPM is longer than {}s",
            sequence.len(),
            bpm,
            MAX_SEQUENCE.as_secs()
        )
        .into());
    }

    for (index, note) in sequence.iter().enumerate() {
        if let Some(note) = note {
            sampler.trigger_attack_release(*note, beat_frames, velocity, index * beat_frames)?;
        }
    }

    let channels = sampler.channel_count() as usize;
    let sequence_frames = beat_frames * sequence.len();
    let max_frames = sequence_frames + sampler.frames_for(MAX_TAIL);
    let mut rendered = Vec::with_capacity(sequence_frames * channels);
    let mut block = vec![0.0f32; BLOCK_FRAMES * channels];
    let mut frames = 0;

    while frames < sequence_frames || sampler.active_voices() > 0 {
        if frames >= max_frames {
            warn!(
                active_voices = sampler.active_voices(),
                "Render tail limit reached"
            );
            break;
        }
        sampler.render(&mut block)?;
        rendered.extend_from_slice(&block);
        frames += BLOCK_FRAMES;
    }

    info!(notes = sequence.len(), bpm, frames, "Rendered sequence");
    write_wav(
        output,
        &rendered,
        sampler.channel_count(),
        sampler.sample_rate(),
    )?;
    println!("Wrote {} frames to {}", frames, output.display());

    Ok(())
}
