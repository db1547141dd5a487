//! Configuration schema definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for Sway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwayConfig {
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Master settings (volume, limiter, note length)
    #[serde(default)]
    pub master: MasterConfig,

    /// Motion-to-parameter mapping
    #[serde(default)]
    pub mapping: MappingConfig,

    /// Sound renderer variant and effect settings
    #[serde(default)]
    pub sound: SoundConfig,

    /// Where motion samples come from
    #[serde(default)]
    pub source: SourceConfig,

    /// MIDI output settings
    #[serde(default)]
    pub midi: MidiConfig,
}

impl SwayConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // NaN slips through every range comparison below
        for (name, value) in self.float_fields() {
            if !value.is_finite() {
                bail!("{} must be a finite number", name);
            }
        }

        // Audio
        if self.audio.sample_rate < 8000 || self.audio.sample_rate > 192000 {
            bail!("Sample rate must be between 8000 and 192000");
        }
        if self.audio.buffer_size < 64 || self.audio.buffer_size > 8192 {
            bail!("Buffer size must be between 64 and 8192");
        }

        // Master
        if self.master.volume < 0.0 || self.master.volume > 1.0 {
            bail!("Master volume must be between 0.0 and 1.0");
        }
        if self.master.limiter_ceiling_db > 0.0 {
            bail!("Limiter ceiling must be at or below 0 dB");
        }
        if self.master.note_length_secs <= 0.0 || self.master.note_length_secs > 10.0 {
            bail!("Note length must be between 0 and 10 seconds");
        }

        // Mapping
        let m = &self.mapping;
        if m.threshold < 0.0 {
            bail!("Activity threshold must not be negative");
        }
        if m.axis_range <= 0.0 {
            bail!("Axis range must be positive");
        }
        if m.filter_min_hz <= 0.0 || m.filter_max_hz <= m.filter_min_hz {
            bail!("Filter range must satisfy 0 < filter_min_hz < filter_max_hz");
        }
        if m.filter_max_hz >= self.audio.sample_rate as f64 / 2.0 {
            bail!("filter_max_hz must be below the Nyquist frequency");
        }
        if m.reverb_max < 0.0 || m.reverb_max > 1.0 {
            bail!("reverb_max must be between 0.0 and 1.0");
        }
        if let Some(scale) = m.display_scale {
            if scale <= 0.0 {
                bail!("Display scale must be positive");
            }
        }

        // Sound
        let s = &self.sound;
        if s.max_voices == 0 || s.max_voices > 128 {
            bail!("max_voices must be between 1 and 128");
        }
        if s.reverb_decay_secs <= 0.0 {
            bail!("Reverb decay must be positive");
        }
        if s.fm_reverb_wet < 0.0 || s.fm_reverb_wet > 1.0 {
            bail!("fm_reverb_wet must be between 0.0 and 1.0");
        }
        if s.delay_feedback < 0.0 || s.delay_feedback >= 1.0 {
            bail!("Delay feedback must be in [0.0, 1.0)");
        }
        if s.delay_wet < 0.0 || s.delay_wet > 1.0 {
            bail!("delay_wet must be between 0.0 and 1.0");
        }
        if s.harmonicity <= 0.0 {
            bail!("Harmonicity must be positive");
        }

        // Source
        if self.source.rate_hz <= 0.0 || self.source.rate_hz > 1000.0 {
            bail!("Source rate must be between 0 and 1000 Hz");
        }
        if self.source.kind == SourceKind::File && self.source.path.is_none() {
            bail!("File source requires a path");
        }

        // MIDI
        if self.midi.channel > 15 {
            bail!("MIDI channel must be between 0 and 15");
        }
        if self.midi.brightness_cc > 127 || self.midi.reverb_cc > 127 {
            bail!("MIDI controller numbers must be between 0 and 127");
        }

        Ok(())
    }

    fn float_fields(&self) -> Vec<(&'static str, f64)> {
        let m = &self.mapping;
        let s = &self.sound;
        let mut fields = vec![
            ("master.volume", self.master.volume as f64),
            ("master.synth_volume_db", self.master.synth_volume_db),
            ("master.limiter_ceiling_db", self.master.limiter_ceiling_db),
            ("master.note_length_secs", self.master.note_length_secs),
            ("mapping.threshold", m.threshold),
            ("mapping.axis_range", m.axis_range),
            ("mapping.filter_min_hz", m.filter_min_hz),
            ("mapping.filter_max_hz", m.filter_max_hz),
            ("mapping.reverb_max", m.reverb_max),
            ("sound.reverb_decay_secs", s.reverb_decay_secs),
            ("sound.fm_reverb_wet", s.fm_reverb_wet),
            ("sound.harmonicity", s.harmonicity),
            ("sound.modulation_index", s.modulation_index),
            ("sound.delay_feedback", s.delay_feedback),
            ("sound.delay_wet", s.delay_wet),
            ("source.rate_hz", self.source.rate_hz),
        ];
        if let Some(scale) = m.display_scale {
            fields.push(("mapping.display_scale", scale));
        }
        fields
    }

    /// Pixel scale for the motion indicator, falling back to the variant's own
    pub fn display_scale(&self) -> f64 {
        self.mapping
            .display_scale
            .unwrap_or_else(|| self.sound.variant.default_display_scale())
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Buffer size in samples (default: 512)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Output device name (None = default device)
    pub device: Option<String>,
}

fn default_sample_rate() -> u32 { 44100 }
fn default_buffer_size() -> usize { 512 }

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
            device: None,
        }
    }
}

/// Master settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterConfig {
    /// Master volume 0.0-1.0 (default: 0.8)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Synth gain in dB before effects (default: -10)
    #[serde(default = "default_synth_volume_db")]
    pub synth_volume_db: f64,

    /// Output limiter ceiling in dBFS (default: -1)
    #[serde(default = "default_limiter_ceiling_db")]
    pub limiter_ceiling_db: f64,

    /// How long each triggered note is held (default: an eighth at 120 BPM)
    #[serde(default = "default_note_length_secs")]
    pub note_length_secs: f64,
}

fn default_volume() -> f32 { 0.8 }
fn default_synth_volume_db() -> f64 { -10.0 }
fn default_limiter_ceiling_db() -> f64 { -1.0 }
fn default_note_length_secs() -> f64 { 0.25 }

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            synth_volume_db: default_synth_volume_db(),
            limiter_ceiling_db: default_limiter_ceiling_db(),
            note_length_secs: default_note_length_secs(),
        }
    }
}

/// Motion-to-parameter mapping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Total motion (|x|+|y|+|z|) above which a note triggers (default: 2.0)
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Nominal axis span; readings are expected in [-range, range] (default: 10)
    #[serde(default = "default_axis_range")]
    pub axis_range: f64,

    /// Filter cutoff for a level axis (default: 200 Hz)
    #[serde(default = "default_filter_min_hz")]
    pub filter_min_hz: f64,

    /// Filter cutoff at full range (default: 2000 Hz)
    #[serde(default = "default_filter_max_hz")]
    pub filter_max_hz: f64,

    /// Reverb amount at full range (default: 0.8)
    #[serde(default = "default_reverb_max")]
    pub reverb_max: f64,

    /// Clamp continuous parameters to their ranges when an axis exceeds
    /// `axis_range`; false extrapolates linearly (default: true)
    #[serde(default = "default_clamp")]
    pub clamp: bool,

    /// Pixels per sensor unit for the indicator (default: per variant)
    pub display_scale: Option<f64>,
}

fn default_threshold() -> f64 { 2.0 }
fn default_axis_range() -> f64 { 10.0 }
fn default_filter_min_hz() -> f64 { 200.0 }
fn default_filter_max_hz() -> f64 { 2000.0 }
fn default_reverb_max() -> f64 { 0.8 }
fn default_clamp() -> bool { true }

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            axis_range: default_axis_range(),
            filter_min_hz: default_filter_min_hz(),
            filter_max_hz: default_filter_max_hz(),
            reverb_max: default_reverb_max(),
            clamp: default_clamp(),
            display_scale: None,
        }
    }
}

/// Sound renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    /// Which synth/effects graph to drive (default: simple)
    #[serde(default)]
    pub variant: SoundVariant,

    /// Polyphony limit; the oldest voice is stolen beyond it (default: 32)
    #[serde(default = "default_max_voices")]
    pub max_voices: usize,

    /// Reverb decay for the simple variant (default: 2 s)
    #[serde(default = "default_reverb_decay_secs")]
    pub reverb_decay_secs: f64,

    /// Fixed reverb wet level for the FM variant (default: 0.4)
    #[serde(default = "default_fm_reverb_wet")]
    pub fm_reverb_wet: f64,

    /// FM modulator/carrier frequency ratio (default: 3)
    #[serde(default = "default_harmonicity")]
    pub harmonicity: f64,

    /// FM modulation index (default: 10)
    #[serde(default = "default_modulation_index")]
    pub modulation_index: f64,

    /// Delay feedback for the FM variant (default: 0.35)
    #[serde(default = "default_delay_feedback")]
    pub delay_feedback: f64,

    /// Delay wet level for the FM variant (default: 0.3)
    #[serde(default = "default_delay_wet")]
    pub delay_wet: f64,
}

fn default_max_voices() -> usize { 32 }
fn default_reverb_decay_secs() -> f64 { 2.0 }
fn default_fm_reverb_wet() -> f64 { 0.4 }
fn default_harmonicity() -> f64 { 3.0 }
fn default_modulation_index() -> f64 { 10.0 }
fn default_delay_feedback() -> f64 { 0.35 }
fn default_delay_wet() -> f64 { 0.3 }

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            variant: SoundVariant::default(),
            max_voices: default_max_voices(),
            reverb_decay_secs: default_reverb_decay_secs(),
            fm_reverb_wet: default_fm_reverb_wet(),
            harmonicity: default_harmonicity(),
            modulation_index: default_modulation_index(),
            delay_feedback: default_delay_feedback(),
            delay_wet: default_delay_wet(),
        }
    }
}

/// Sound renderer variants
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SoundVariant {
    /// Triangle poly synth into low-pass filter and reverb; z sets reverb amount
    #[default]
    Simple,
    /// FM poly synth into filter, delay and reverb; overall intensity sets
    /// velocity and delay time, z sets reverb decay
    Fm,
}

impl SoundVariant {
    pub fn default_display_scale(&self) -> f64 {
        match self {
            SoundVariant::Simple => 5.0,
            SoundVariant::Fm => 10.0,
        }
    }
}

/// Motion source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source type (default: simulated)
    #[serde(default)]
    pub kind: SourceKind,

    /// Recording to replay, for the file source
    pub path: Option<PathBuf>,

    /// Samples per second (default: 60)
    #[serde(default = "default_rate_hz")]
    pub rate_hz: f64,
}

fn default_rate_hz() -> f64 { 60.0 }

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            path: None,
            rate_hz: default_rate_hz(),
        }
    }
}

/// Types of motion sources
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Synthetic tilt path, no hardware needed
    #[default]
    Simulated,
    /// One sample per line on standard input
    Stdin,
    /// One sample per line from a recording
    File,
}

/// MIDI output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidiConfig {
    /// Port name substring (None = first port)
    pub port: Option<String>,

    /// MIDI channel 0-15 (default: 0)
    #[serde(default)]
    pub channel: u8,

    /// Controller receiving filter brightness (default: 74)
    #[serde(default = "default_brightness_cc")]
    pub brightness_cc: u8,

    /// Controller receiving reverb send (default: 91)
    #[serde(default = "default_reverb_cc")]
    pub reverb_cc: u8,
}

fn default_brightness_cc() -> u8 { 74 }
fn default_reverb_cc() -> u8 { 91 }

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            port: None,
            channel: 0,
            brightness_cc: default_brightness_cc(),
            reverb_cc: default_reverb_cc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_audio_config() {
        let yaml = "sample_rate: 48000";
        let config: AudioConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.buffer_size, 512); // default
    }

    #[test]
    fn test_empty_document_is_valid() {
        let config: SwayConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.mapping.threshold, 2.0);
        assert_eq!(config.sound.variant, SoundVariant::Simple);
        assert_eq!(config.source.kind, SourceKind::Simulated);
    }

    #[test]
    fn test_mapping_config() {
        let yaml = r#"
threshold: 3.5
clamp: false
filter_max_hz: 4000
"#;
        let config: MappingConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.threshold, 3.5);
        assert!(!config.clamp);
        assert_eq!(config.filter_min_hz, 200.0);
        assert_eq!(config.filter_max_hz, 4000.0);
    }

    #[test]
    fn test_display_scale_follows_variant() {
        let mut config = SwayConfig::default();
        assert_eq!(config.display_scale(), 5.0);

        config.sound.variant = SoundVariant::Fm;
        assert_eq!(config.display_scale(), 10.0);

        config.mapping.display_scale = Some(7.0);
        assert_eq!(config.display_scale(), 7.0);
    }

    #[test]
    fn test_sound_variant_names() {
        let config: SoundConfig = serde_yaml::from_str("variant: fm").unwrap();
        assert_eq!(config.variant, SoundVariant::Fm);
        assert!(serde_yaml::from_str::<SoundConfig>("variant: granular").is_err());
    }

    #[test]
    fn test_file_source_requires_path() {
        let mut config = SwayConfig::default();
        config.source.kind = SourceKind::File;
        assert!(config.validate().is_err());

        config.source.path = Some(PathBuf::from("samples.jsonl"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_filter_range_rejected() {
        let mut config = SwayConfig::default();
        config.mapping.filter_min_hz = 2000.0;
        config.mapping.filter_max_hz = 200.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_axis_range_rejected() {
        let mut config = SwayConfig::default();
        config.mapping.axis_range = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_values_rejected() {
        for yaml in [
            "master:\n  volume: .nan",
            "mapping:\n  threshold: .nan",
            "mapping:\n  display_scale: .nan",
            "sound:\n  harmonicity: .nan",
            "source:\n  rate_hz: .nan",
        ] {
            let config: SwayConfig = serde_yaml::from_str(yaml).unwrap();
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("finite"), "{}: {}", yaml, err);
        }
    }

    #[test]
    fn test_infinite_values_rejected() {
        for yaml in [
            "mapping:\n  axis_range: .inf",
            "master:\n  synth_volume_db: .inf",
            "master:\n  limiter_ceiling_db: -.inf",
            "sound:\n  modulation_index: .inf",
        ] {
            let config: SwayConfig = serde_yaml::from_str(yaml).unwrap();
            assert!(config.validate().is_err(), "{} should be rejected", yaml);
        }
    }

    #[test]
    fn test_runaway_delay_feedback_rejected() {
        let mut config = SwayConfig::default();
        config.sound.delay_feedback = 1.0;
        assert!(config.validate().is_err());
    }
}
