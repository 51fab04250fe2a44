//! `engine/mod.rs`: the conversion engine seam.
//!
//! A `ConversionEngine` is the black-box sample-rate converter the session
//! drives. It is opened once per session through an [`EngineFactory`], keeps
//! whatever history it needs between calls, and is released by dropping it.
//!
//! | Engine | quality | Description |
//! |---|---|---|
//! | [`LinearEngine`] | `0` | Two-point interpolation (fast path) |
//! | [`HermiteEngine`] | `1` | Four-point Catmull-Rom |

pub mod hermite;
pub mod interpolator;
pub mod linear;

#[cfg(test)]
pub mod testing;

pub use hermite::HermiteEngine;
pub use interpolator::{Interpolator, Kernel};
pub use linear::LinearEngine;

use crate::audio::constants::{MAX_RATIO, MIN_RATIO, QUALITY_HERMITE, QUALITY_LINEAR};
use crate::common::errors::{ResampleError, Result};
use crate::common::types::Shared;

// ─── Engine trait ─────────────────────────────────────────────────────────────

/// One step of sample-rate conversion over `f32` frames.
///
/// A single call may consume only part of `input` and fill only part of
/// `output`; callers loop until the input is gone. When `last` is set the
/// engine emits whatever it still holds, and reports `0` produced once it has
/// nothing left.
pub trait ConversionEngine: Send {
    /// Returns `(frames consumed, frames produced)`.
    fn process(&mut self, input: &[f32], last: bool, output: &mut [f32]) -> Result<(usize, usize)>;
}

/// Type-erased engine.
pub type BoxedEngine = Box<dyn ConversionEngine>;

/// Engine handle shared between a session and its in-flight work item.
pub type SharedEngine = Shared<BoxedEngine>;

// ─── Factory ──────────────────────────────────────────────────────────────────

/// Opens engines for a given quality and ratio.
pub trait EngineFactory: Send + Sync {
    fn open(&self, quality: i32, ratio: f64) -> Result<BoxedEngine>;
}

impl<F> EngineFactory for F
where
    F: Fn(i32, f64) -> Result<BoxedEngine> + Send + Sync,
{
    fn open(&self, quality: i32, ratio: f64) -> Result<BoxedEngine> {
        self(quality, ratio)
    }
}

/// Opens the built-in interpolating engines.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterpolatingFactory;

impl EngineFactory for InterpolatingFactory {
    fn open(&self, quality: i32, ratio: f64) -> Result<BoxedEngine> {
        if !(MIN_RATIO..=MAX_RATIO).contains(&ratio) {
            return Err(ResampleError::open_failed(format!(
                "ratio {ratio} outside supported range [{MIN_RATIO}, {MAX_RATIO}]"
            )));
        }

        match quality {
            QUALITY_LINEAR => Ok(Box::new(LinearEngine::new(ratio))),
            QUALITY_HERMITE => Ok(Box::new(HermiteEngine::new(ratio))),
            other => Err(ResampleError::open_failed(format!(
                "unsupported quality {other}"
            ))),
        }
    }
}
