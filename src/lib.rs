//! Streaming sample-rate conversion over raw `f32` byte chunks.
//!
//! Callers push arbitrarily sized chunks; each is cut to whole frames, the
//! sub-frame tail is carried into the next push, and the conversion runs on
//! tokio's blocking pool while the caller carries on.
//!
//! ```no_run
//! # async fn demo(pcm: Vec<u8>) -> resample_stream::Result<()> {
//! let mut rs = resample_stream::Resampler::new(44_100.0, 48_000.0, 1)?;
//! rs.open()?;
//! let out = rs.resample_await(pcm).await?;
//! let tail = rs.flush_await().await?;
//! rs.close()?;
//! # let _ = (out, tail);
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod common;
pub mod configs;

pub use audio::{Phase, Resampler};
pub use common::errors::{ResampleError, Result};
