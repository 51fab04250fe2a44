//! `engine/linear.rs`: fast linear-interpolation engine.
//!
//! Two-point interpolation between the samples either side of the read head.
//! Cheap and good enough for voice; aliases noticeably when downsampling.

use super::interpolator::{Interpolator, Kernel};

pub struct Linear;

impl Kernel for Linear {
    const BEHIND: usize = 0;
    const AHEAD: usize = 1;

    #[inline]
    fn interpolate(window: &[f32], t: f32) -> f32 {
        window[0] * (1.0 - t) + window[1] * t
    }
}

pub type LinearEngine = Interpolator<Linear>;
