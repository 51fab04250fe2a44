//! `engine/hermite.rs`: cubic Hermite (Catmull-Rom) engine.
//!
//! Four-point cubic interpolation for noticeably better alias rejection than
//! the linear engine, at modest extra CPU cost.

use super::interpolator::{Interpolator, Kernel};

pub struct Hermite;

impl Kernel for Hermite {
    const BEHIND: usize = 1;
    const AHEAD: usize = 2;

    /// `window` = [p0, p1, p2, p3]; the output lies between p1 and p2.
    #[inline]
    fn interpolate(p: &[f32], t: f32) -> f32 {
        let c0 = p[1];
        let c1 = 0.5 * (p[2] - p[0]);
        let c2 = p[0] - 2.5 * p[1] + 2.0 * p[2] - 0.5 * p[3];
        let c3 = 0.5 * (p[3] - p[0]) + 1.5 * (p[1] - p[2]);
        ((c3 * t + c2) * t + c1) * t + c0
    }
}

pub type HermiteEngine = Interpolator<Hermite>;
