//! # Audio Processing Configuration
//!
//! Settings for the upload transform: pitch factor, interpolation strategy
//! and the encoder used to write the processed track.

use crate::resampler::{Interpolation, PitchFactor, PitchShifter};
use core_runtime::config::EnvReader;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Audio processing configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Resampling ratio applied to every upload.
    ///
    /// Default: 432/440.
    #[serde(default)]
    pub pitch_factor: PitchFactor,

    /// Interpolation between input samples.
    ///
    /// Default: cubic.
    #[serde(default)]
    pub interpolation: Interpolation,

    #[serde(default)]
    pub encoder: EncoderConfig,
}

impl ProcessingConfig {
    pub fn shifter(&self) -> PitchShifter {
        PitchShifter::new(self.pitch_factor, self.interpolation)
    }

    /// Load from `RETUNE_*` variables, starting from the defaults.
    ///
    /// | Variable | Meaning |
    /// |----------|---------|
    /// | `RETUNE_PITCH_FACTOR` | resampling ratio |
    /// | `RETUNE_INTERPOLATION` | `linear` or `cubic` |
    /// | `RETUNE_ENCODER` | `wav` for in-process WAV, otherwise a program name |
    /// | `RETUNE_ENCODER_ARGS` | comma-separated argument template |
    /// | `RETUNE_ENCODER_BITRATE` | kbps substituted for `{bitrate}` |
    /// | `RETUNE_ENCODER_TIMEOUT_MS` | encoder time budget |
    /// | `RETUNE_TEMP_DIR` | directory for encoder scratch files |
    pub fn from_env(env: &EnvReader) -> core_runtime::Result<Self> {
        let mut config = Self::default();

        if let Some(value) = env.parse::<f64>("PITCH_FACTOR")? {
            config.pitch_factor = PitchFactor::new(value)
                .map_err(|e| core_runtime::Error::Config(e.to_string()))?;
        }
        if let Some(interpolation) = env.parse::<Interpolation>("INTERPOLATION")? {
            config.interpolation = interpolation;
        }
        if let Some(program) = env.string("ENCODER") {
            config.encoder.program = if program.eq_ignore_ascii_case("wav") {
                None
            } else {
                Some(program)
            };
        }
        if let Some(args) = env.list("ENCODER_ARGS") {
            config.encoder.args = args;
        }
        if let Some(bitrate) = env.parse::<u32>("ENCODER_BITRATE")? {
            config.encoder.bitrate_kbps = bitrate;
        }
        if let Some(timeout) = env.duration_ms("ENCODER_TIMEOUT_MS")? {
            config.encoder.timeout = timeout;
        }
        if let Some(dir) = env.string("TEMP_DIR") {
            config.encoder.temp_dir = Some(PathBuf::from(dir));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> core_runtime::Result<()> {
        self.encoder.validate()
    }
}

/// External encoder invocation.
///
/// `program = None` selects the in-process WAV encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Encoder executable looked up on `PATH`.
    ///
    /// Default: `lame`.
    #[serde(default = "default_program")]
    pub program: Option<String>,

    /// Argument template. `{input}`, `{output}` and `{bitrate}` are
    /// substituted per invocation.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Default: 128 kbps.
    #[serde(default = "default_bitrate_kbps")]
    pub bitrate_kbps: u32,

    /// Time budget for a single encode, after which the process is killed.
    ///
    /// Default: 120 seconds.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Scratch directory for staged input/output files.
    ///
    /// Default: the system temp directory.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            bitrate_kbps: default_bitrate_kbps(),
            timeout: default_timeout(),
            temp_dir: None,
        }
    }
}

impl EncoderConfig {
    /// In-process WAV output, no external program.
    pub fn wav() -> Self {
        Self {
            program: None,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> core_runtime::Result<()> {
        let references = |placeholder: &str| self.args.iter().any(|a| a.contains(placeholder));
        if self.program.is_some() && !(references("{input}") && references("{output}")) {
            return Err(core_runtime::Error::Config(
                "Encoder arguments must reference {input} and {output}".to_string(),
            ));
        }
        if self.bitrate_kbps == 0 {
            return Err(core_runtime::Error::Config(
                "Encoder bitrate must be greater than 0".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(core_runtime::Error::Config(
                "Encoder timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_program() -> Option<String> {
    Some("lame".to_string())
}

fn default_args() -> Vec<String> {
    ["--quiet", "-b", "{bitrate}", "{input}", "{output}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_bitrate_kbps() -> u32 {
    128
}

fn default_timeout() -> Duration {
    Duration::from_secs(120)
}
