//! Subprocess synthesis pipeline: `gtts-cli` → `ffmpeg` → optional gzip.

use std::io::{self, Write};
use std::process::{Output, Stdio};

use async_trait::async_trait;
use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::Synthesizer;
use crate::audio::{AudioCodec, VariantOptions};
use crate::config::Config;
use crate::error::SynthesisError;

const SILENCE_FILTER: &str =
    "silenceremove=start_periods=1:start_silence=0.1:stop_periods=-1:stop_silence=0.1";

// == Command Synthesizer ==
/// Runs Google TTS through `gtts-cli`, transcodes with `ffmpeg`, then gzips.
///
/// Children are spawned with `kill_on_drop`, so a caller that gives up (e.g. on
/// timeout) takes the subprocesses down with it.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    gtts_program: String,
    ffmpeg_program: String,
}

impl CommandSynthesizer {
    pub fn new(gtts_program: impl Into<String>, ffmpeg_program: impl Into<String>) -> Self {
        Self {
            gtts_program: gtts_program.into(),
            ffmpeg_program: ffmpeg_program.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.gtts_program, &config.ffmpeg_program)
    }

    async fn speak(&self, text: &str, lang: &str) -> Result<Vec<u8>, SynthesisError> {
        let output = run(&self.gtts_program, &gtts_args(text, lang), None)
            .await
            .map_err(|e| spawn_error(&self.gtts_program, e))?;

        if !output.status.success() {
            return Err(SynthesisError::Unavailable(exit_message(
                &self.gtts_program,
                &output,
            )));
        }
        Ok(output.stdout)
    }

    async fn transcode(
        &self,
        input: Vec<u8>,
        variant: &VariantOptions,
    ) -> Result<Vec<u8>, SynthesisError> {
        let output = run(&self.ffmpeg_program, &ffmpeg_args(variant), Some(input))
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                    spawn_error(&self.ffmpeg_program, e)
                }
                _ => SynthesisError::EncodingFailed(format!("{}: {}", self.ffmpeg_program, e)),
            })?;

        if !output.status.success() {
            return Err(SynthesisError::EncodingFailed(exit_message(
                &self.ffmpeg_program,
                &output,
            )));
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl Synthesizer for CommandSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        lang: &str,
        variant: &VariantOptions,
    ) -> Result<Bytes, SynthesisError> {
        let speech = self.speak(text, lang).await?;
        debug!(bytes = speech.len(), lang, "gtts-cli produced audio");

        let encoded = self.transcode(speech, variant).await?;
        debug!(
            bytes = encoded.len(),
            codec = variant.codec.format_name(),
            "ffmpeg transcoded audio"
        );

        let payload = if variant.gzip {
            gzip(&encoded).map_err(|e| SynthesisError::EncodingFailed(format!("gzip: {}", e)))?
        } else {
            encoded
        };
        Ok(Bytes::from(payload))
    }
}

// == Helpers ==
/// Text goes after `--` so input such as `-` or `--help` is spoken, not parsed.
fn gtts_args(text: &str, lang: &str) -> Vec<String> {
    vec![
        "--lang".to_string(),
        lang.to_string(),
        "--nocheck".to_string(),
        "--".to_string(),
        text.to_string(),
    ]
}

fn ffmpeg_args(variant: &VariantOptions) -> Vec<String> {
    let mut args = vec!["-i".to_string(), "pipe:0".to_string()];
    if variant.trim_silence {
        args.push("-af".to_string());
        args.push(SILENCE_FILTER.to_string());
    }
    if variant.codec == AudioCodec::Ogg {
        args.push("-c:a".to_string());
        args.push("libvorbis".to_string());
    }
    args.extend([
        "-ar".to_string(),
        variant.sample_rate_hz.to_string(),
        "-b:a".to_string(),
        format!("{}k", variant.bitrate_kbps),
        "-f".to_string(),
        variant.codec.format_name().to_string(),
        "pipe:1".to_string(),
    ]);
    args
}

/// Runs `program`, feeding `stdin` if given, and collects its output.
async fn run(program: &str, args: &[String], stdin: Option<Vec<u8>>) -> io::Result<Output> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let pipe = child.stdin.take();
    let feed = async move {
        if let (Some(mut pipe), Some(input)) = (pipe, stdin) {
            pipe.write_all(&input).await?;
            pipe.shutdown().await?;
        }
        Ok::<_, io::Error>(())
    };

    let (fed, output) = tokio::join!(feed, child.wait_with_output());
    let output = output?;
    // A child that exits early closes its stdin; its exit status tells the real story
    if output.status.success() {
        fed?;
    }
    Ok(output)
}

fn gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

fn spawn_error(program: &str, err: io::Error) -> SynthesisError {
    SynthesisError::Unavailable(format!("failed to run {}: {}", program, err))
}

fn exit_message(program: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("{} exited with {}", program, output.status)
    } else {
        format!("{} exited with {}: {}", program, output.status, stderr)
    }
}
