//! # External Encoder
//!
//! Hands a buffer to an out-of-process encoder (LAME by default) through a
//! pair of scoped temporary files.
//!
//! Each invocation:
//! 1. writes the buffer as 16-bit PCM WAV to a temporary input file
//! 2. reserves a temporary output path
//! 3. runs the encoder with `{input}`, `{output}` and `{bitrate}`
//!    substituted into the argument template, under a timeout
//! 4. reads the output file back
//!
//! Both temporary files are removed when the call returns, whether it
//! succeeded, failed or timed out. A timed-out encoder is killed.

use super::pcm::encode_wav;
use super::AudioEncoder;
use crate::buffer::AudioBuffer;
use crate::config::EncoderConfig;
use crate::error::{AudioError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::{Builder, NamedTempFile};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

const STDERR_TAIL_BYTES: usize = 512;

/// Encoder that shells out to a command-line program.
#[derive(Debug, Clone)]
pub struct ExternalEncoder {
    program: String,
    args: Vec<String>,
    bitrate_kbps: u32,
    timeout: Duration,
    temp_dir: Option<PathBuf>,
    content_type: String,
    extension: String,
}

impl ExternalEncoder {
    /// MP3 encoder running `program` with the default LAME arguments.
    pub fn new(program: impl Into<String>) -> Self {
        let defaults = EncoderConfig::default();
        Self {
            program: program.into(),
            args: defaults.args,
            bitrate_kbps: defaults.bitrate_kbps,
            timeout: defaults.timeout,
            temp_dir: None,
            content_type: "audio/mpeg".to_string(),
            extension: "mp3".to_string(),
        }
    }

    /// Build from configuration. Fails when no program is configured.
    pub fn from_config(config: &EncoderConfig) -> Result<Self> {
        let program = config.program.clone().ok_or_else(|| {
            AudioError::Codec("no external encoder program configured".to_string())
        })?;
        Ok(Self {
            args: config.args.clone(),
            bitrate_kbps: config.bitrate_kbps,
            timeout: config.timeout,
            temp_dir: config.temp_dir.clone(),
            ..Self::new(program)
        })
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Override what the program produces, e.g. `("audio/ogg", "ogg")`.
    pub fn with_output_format(
        mut self,
        content_type: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        self.content_type = content_type.into();
        self.extension = extension.into();
        self
    }

    fn render_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let bitrate = self.bitrate_kbps.to_string();
        self.args
            .iter()
            .map(|arg| match arg.as_str() {
                "{input}" => input.as_os_str().to_owned(),
                "{output}" => output.as_os_str().to_owned(),
                _ => OsString::from(
                    arg.replace("{input}", &input.to_string_lossy())
                        .replace("{output}", &output.to_string_lossy())
                        .replace("{bitrate}", &bitrate),
                ),
            })
            .collect()
    }

    fn create_temp(&self, prefix: &str, suffix: &str) -> Result<NamedTempFile> {
        let mut builder = Builder::new();
        builder.prefix(prefix).suffix(suffix);
        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(file)
    }
}

#[async_trait]
impl AudioEncoder for ExternalEncoder {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn file_extension(&self) -> &str {
        &self.extension
    }

    #[instrument(skip(self, buffer), fields(program = %self.program, frames = buffer.length()))]
    async fn encode(&self, buffer: &AudioBuffer) -> Result<Bytes> {
        let pcm = {
            let buffer = buffer.clone();
            tokio::task::spawn_blocking(move || encode_wav(&buffer))
                .await
                .map_err(|e| AudioError::Internal(format!("WAV staging task failed: {}", e)))??
        };

        let input = self.create_temp("retune-in-", ".wav")?;
        tokio::fs::write(input.path(), &pcm).await?;
        let output = self
            .create_temp("retune-out-", &format!(".{}", self.extension))?
            .into_temp_path();

        let args = self.render_args(input.path(), &output);
        debug!(args = ?args, "Starting encoder");

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AudioError::Codec(format!("failed to start encoder '{}': {}", self.program, e))
            })?;

        let finished = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| {
                AudioError::Codec(format!("encoder '{}' failed to run: {}", self.program, e))
            })?,
            Err(_) => {
                warn!(timeout = ?self.timeout, "Encoder timed out, killing process");
                return Err(AudioError::EncoderTimeout(self.timeout));
            }
        };

        if !finished.status.success() {
            let stderr = String::from_utf8_lossy(&finished.stderr);
            let tail = stderr
                .char_indices()
                .rev()
                .nth(STDERR_TAIL_BYTES)
                .map(|(i, _)| &stderr[i..])
                .unwrap_or(stderr.as_ref());
            warn!(status = %finished.status, "Encoder exited with failure");
            return Err(AudioError::Codec(format!(
                "encoder '{}' exited with {}: {}",
                self.program,
                finished.status,
                tail.trim()
            )));
        }

        let encoded = tokio::fs::read(&output).await.map_err(|e| {
            AudioError::Codec(format!("encoder output could not be read: {}", e))
        })?;
        if encoded.is_empty() {
            return Err(AudioError::Codec("encoder produced no output".to_string()));
        }

        debug!(size = encoded.len(), "Encoder finished");
        Ok(Bytes::from(encoded))
    }
}
