use std::time::Instant;

use resample_stream::{Resampler, common::logger, common::types::AnyResult, configs::Config};
use tracing::info;

const USAGE: &str = "usage: resample-stream <input.f32> <output.f32> [config.toml]";

#[tokio::main]
async fn main() -> AnyResult<()> {
  let mut args = std::env::args().skip(1);
  let (Some(input), Some(output)) = (args.next(), args.next()) else {
    eprintln!("{}", USAGE);
    std::process::exit(2);
  };
  let config_path = args.next();

  let config = Config::load(config_path.as_deref())?;
  logger::init(config.logging.as_ref());

  info!(
    "resample-stream {}: {} Hz -> {} Hz, quality {}",
    env!("CARGO_PKG_VERSION"),
    config.resampler.input_rate,
    config.resampler.output_rate,
    config.resampler.quality
  );

  let pcm = tokio::fs::read(&input).await?;
  let started = Instant::now();

  let mut rs = Resampler::from_config(&config.resampler)?;
  rs.open()?;

  let mut converted = Vec::with_capacity((pcm.len() as f64 * rs.ratio()) as usize + 64);
  for chunk in pcm.chunks(config.resampler.chunk_bytes) {
    let out = rs.resample_await(chunk.to_vec()).await?;
    converted.extend_from_slice(&out);
  }
  converted.extend_from_slice(&rs.flush_await().await?);

  let dropped = rs.leftover_len();
  rs.close()?;

  tokio::fs::write(&output, &converted).await?;

  info!(
    "wrote {} bytes to {} from {} input bytes in {:?}",
    converted.len(),
    output,
    pcm.len(),
    started.elapsed()
  );
  if dropped > 0 {
    tracing::warn!("input ended with {} bytes short of a frame; ignored", dropped);
  }

  Ok(())
}
