//! CLI interface for Sway

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use sway::config::{SoundVariant, SourceKind};

/// Motion-driven synthesis from accelerometer streams
#[derive(Parser)]
#[command(name = "sway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play live from a motion source
    Play {
        /// Configuration file path
        #[arg(short, long, default_value = "sway.yaml")]
        config: PathBuf,

        /// Motion source (overrides the configuration)
        #[arg(short, long, value_enum)]
        source: Option<SourceArg>,

        /// Recording to replay; implies `--source file`
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Sound variant (overrides the configuration)
        #[arg(long, value_enum)]
        variant: Option<VariantArg>,

        /// Send notes to a MIDI port instead of the audio device
        #[arg(long)]
        midi: bool,

        /// MIDI port name (substring match)
        #[arg(long, requires = "midi")]
        port: Option<String>,

        /// Show the terminal display
        #[arg(long)]
        viz: bool,
    },

    /// Render a motion recording to a WAV file
    Record {
        /// Configuration file path
        #[arg(short, long, default_value = "sway.yaml")]
        config: PathBuf,

        /// Motion recording (JSON lines or CSV)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Seconds of silence appended for the tails
        #[arg(long, default_value = "2")]
        tail: f64,
    },

    /// Print the mapped frame for every sample of a recording as JSON lines
    Map {
        /// Configuration file path
        #[arg(short, long, default_value = "sway.yaml")]
        config: PathBuf,

        /// Motion recording (JSON lines or CSV)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List audio output devices and MIDI ports
    Devices,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "sway.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SourceArg {
    Simulated,
    Stdin,
    File,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Simulated => SourceKind::Simulated,
            SourceArg::Stdin => SourceKind::Stdin,
            SourceArg::File => SourceKind::File,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum VariantArg {
    Simple,
    Fm,
}

impl From<VariantArg> for SoundVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Simple => SoundVariant::Simple,
            VariantArg::Fm => SoundVariant::Fm,
        }
    }
}
