pub mod base;
pub mod logging;
pub mod resampler;

pub use base::*;
pub use logging::*;
pub use resampler::*;
