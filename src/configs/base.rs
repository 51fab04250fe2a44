use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::types::AnyResult;
use crate::configs::*;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
  #[serde(default)]
  pub resampler: ResamplerConfig,
  pub logging: Option<LoggingConfig>,
}

impl Config {
  /// Load `path` if given, else `config.toml`, else `config.default.toml`.
  /// With none of them present the defaults are used.
  pub fn load(path: Option<&str>) -> AnyResult<Self> {
    let config_path = match path {
      Some(p) => p,
      None if Path::new("config.toml").exists() => "config.toml",
      None if Path::new("config.default.toml").exists() => "config.default.toml",
      None => return Ok(Self::default()),
    };

    let config_str = std::fs::read_to_string(config_path)
      .map_err(|e| format!("failed to read {}: {}", config_path, e))?;
    Self::parse(&config_str).map_err(|e| format!("{}: {}", config_path, e).into())
  }

  pub fn parse(config_str: &str) -> AnyResult<Self> {
    let config: Config = toml::from_str(config_str)?;
    if config.resampler.chunk_bytes == 0 {
      return Err("resampler.chunk_bytes must be greater than zero".into());
    }
    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_uses_defaults() {
    let config = Config::parse("").unwrap();
    assert_eq!(config.resampler.input_rate, 44_100);
    assert_eq!(config.resampler.output_rate, 48_000);
    assert_eq!(config.resampler.quality, 1);
    assert_eq!(config.resampler.pad_frames, 1_024);
    assert!(config.logging.is_none());
  }

  #[test]
  fn parses_sections() {
    let config = Config::parse(
      r#"
        [resampler]
        input_rate = 48000
        output_rate = 16000
        quality = 0
        chunk_bytes = 1000

        [logging]
        level = "debug"
        filters = "resample_stream::audio=trace"

        [logging.file]
        path = "logs/resample.log"
      "#,
    )
    .unwrap();

    assert_eq!(config.resampler.output_rate, 16_000);
    assert_eq!(config.resampler.quality, 0);
    assert_eq!(config.resampler.pad_frames, 1_024);
    let logging = config.logging.unwrap();
    assert_eq!(logging.level.as_deref(), Some("debug"));
    assert_eq!(logging.file.unwrap().max_lines, 10_000);
  }

  #[test]
  fn zero_chunk_is_rejected() {
    assert!(Config::parse("[resampler]\nchunk_bytes = 0\n").is_err());
  }
}
