//! Central constants for the streaming resampler.
//!
//! All magic numbers in `src/audio/**` live here so they can be tuned in one
//! place and remain consistent across modules.

// ── Frames ───────────────────────────────────────────────────────────────────

/// Bytes per frame: one little-endian `f32` sample.
pub const FRAME_BYTES: usize = 4;

// ── Output sizing ────────────────────────────────────────────────────────────

/// Slack (in frames) added to every output buffer to absorb the engine's
/// internal latency. A heuristic, backed by the `OutputOverflow` check.
pub const DEFAULT_PAD_FRAMES: usize = 1_024;

// ── Reference engines ────────────────────────────────────────────────────────

/// Smallest output/input ratio an engine will open with.
pub const MIN_RATIO: f64 = 1.0 / 256.0;

/// Largest output/input ratio an engine will open with.
pub const MAX_RATIO: f64 = 256.0;

/// Input frames an interpolating engine holds at most; larger inputs are
/// consumed over several `process` calls.
pub const ENGINE_MAX_BUFFERED: usize = 4_096;

/// `quality` selecting the linear interpolator.
pub const QUALITY_LINEAR: i32 = 0;

/// `quality` selecting the cubic Hermite interpolator.
pub const QUALITY_HERMITE: i32 = 1;

// ── Front end ────────────────────────────────────────────────────────────────

/// Default read size for the CLI; odd on purpose so chunk boundaries split
/// frames.
pub const DEFAULT_CHUNK_BYTES: usize = 4_093;
