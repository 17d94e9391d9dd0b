use clap::{Parser, Subcommand};
use hum2midi::{analysis, validate_input, Config, Transcriber};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Clip-to-MIDI Transcription
#[derive(Parser)]
#[command(name = "hum2midi")]
#[command(about = "Transcribe a monophonic voice or instrument clip to MIDI")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe an audio clip and write the MIDI output
    Transcribe {
        /// Input audio file (WAV)
        input: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Custom configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also write the tracked notes data as JSON
        #[arg(long)]
        notes_json: bool,

        /// Quiet output
        #[arg(short, long)]
        quiet: bool,
    },
    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config: PathBuf,
    },
    /// Show default configuration
    ShowConfig,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Transcribe {
            input,
            output,
            config,
            notes_json,
            quiet,
        } => {
            let config = if let Some(config_path) = config {
                hum2midi::config::load_config(config_path)?
            } else {
                Config::default()
            };

            validate_input(&input, &config)?;

            let transcriber = Transcriber::new(config);

            if !quiet {
                println!("Transcribing {}...", input.display());
            }

            let result = transcriber.transcribe_file(&input)?;

            fs::create_dir_all(&output)?;
            let midi_path = output.join(&result.midi_filename);
            fs::write(&midi_path, &result.midi_bytes)?;

            if notes_json {
                let notes_path = output.join(result.notes_filename());
                analysis::export_notes_json(&result.notes_data, &notes_path)?;
            }

            if !quiet {
                println!(
                    "Transcribed {} notes at {:.1} BPM -> {}",
                    result.note_events.len(),
                    if result.tempo_bpm > 0.0 {
                        result.tempo_bpm
                    } else {
                        transcriber.config().midi.fallback_bpm
                    },
                    midi_path.display()
                );
            }
        }
        Commands::ValidateConfig { config } => {
            let config = hum2midi::config::load_config(config)?;
            println!("Configuration is valid");
            if let Ok(json) = serde_json::to_string_pretty(&config) {
                println!("{}", json);
            }
        }
        Commands::ShowConfig => {
            let config = Config::default();
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
    }

    Ok(())
}
