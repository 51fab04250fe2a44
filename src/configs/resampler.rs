use serde::{Deserialize, Serialize};

use crate::audio::constants::{DEFAULT_CHUNK_BYTES, DEFAULT_PAD_FRAMES, QUALITY_HERMITE};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ResamplerConfig {
  #[serde(default = "default_input_rate")]
  pub input_rate: u32,
  #[serde(default = "default_output_rate")]
  pub output_rate: u32,
  /// `0` linear, `1` cubic Hermite.
  #[serde(default = "default_quality")]
  pub quality: i32,
  /// Output slack in frames added to every buffer.
  #[serde(default = "default_pad_frames")]
  pub pad_frames: usize,
  /// Bytes read per push by the command-line front end.
  #[serde(default = "default_chunk_bytes")]
  pub chunk_bytes: usize,
}

fn default_input_rate() -> u32 {
  44_100
}
fn default_output_rate() -> u32 {
  48_000
}
fn default_quality() -> i32 {
  QUALITY_HERMITE
}
fn default_pad_frames() -> usize {
  DEFAULT_PAD_FRAMES
}
fn default_chunk_bytes() -> usize {
  DEFAULT_CHUNK_BYTES
}

impl Default for ResamplerConfig {
  fn default() -> Self {
    Self {
      input_rate: default_input_rate(),
      output_rate: default_output_rate(),
      quality: default_quality(),
      pad_frames: default_pad_frames(),
      chunk_bytes: default_chunk_bytes(),
    }
  }
}
