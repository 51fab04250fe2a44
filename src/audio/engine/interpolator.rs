//! `engine/interpolator.rs`: streaming driver shared by the reference engines.
//!
//! Holds a bounded window of input history and a fixed-point read head. The
//! kernel only ever sees a small window of samples and the fractional offset
//! between them, so the same driver serves linear and cubic interpolation.
//!
//! The read head is 32.32 fixed point: advancing and rebasing it is exact, so
//! the produced samples never depend on how the input was chunked.

use std::marker::PhantomData;

use super::ConversionEngine;
use crate::audio::constants::ENGINE_MAX_BUFFERED;
use crate::common::errors::Result;

const FRAC_BITS: u32 = 32;
const ONE: u64 = 1 << FRAC_BITS;
const FRAC_MASK: u64 = ONE - 1;

/// Interpolation kernel over a window of `BEHIND + 1 + AHEAD` samples.
pub trait Kernel: Send + 'static {
    /// Samples needed before the integer read position.
    const BEHIND: usize;
    /// Samples needed after the integer read position.
    const AHEAD: usize;
    const WIDTH: usize = Self::BEHIND + 1 + Self::AHEAD;

    /// `window[BEHIND]` is the sample at the read position; `t ∈ [0, 1)`.
    fn interpolate(window: &[f32], t: f32) -> f32;
}

pub struct Interpolator<K: Kernel> {
    /// Input frames advanced per output frame, 32.32 fixed point.
    step: u64,
    /// Read head relative to `history[0]`, 32.32 fixed point.
    pos: u64,
    history: Vec<f32>,
    max_buffered: usize,
    _kernel: PhantomData<K>,
}

impl<K: Kernel> Interpolator<K> {
    /// `ratio` is output rate over input rate and must be positive.
    pub fn new(ratio: f64) -> Self {
        Self::with_capacity(ratio, ENGINE_MAX_BUFFERED)
    }

    pub fn with_capacity(ratio: f64, max_buffered: usize) -> Self {
        let step = ((ONE as f64) / ratio).round().max(1.0) as u64;
        Self {
            step,
            pos: (K::BEHIND as u64) << FRAC_BITS,
            history: vec![0.0; K::BEHIND],
            max_buffered: max_buffered.max(K::WIDTH + 1),
            _kernel: PhantomData,
        }
    }

    /// Input frames currently held.
    pub fn buffered(&self) -> usize {
        self.history.len()
    }

    /// Sample at `idx`, holding the last real sample past the end.
    fn sample(&self, idx: usize) -> f32 {
        match self.history.get(idx) {
            Some(s) => *s,
            None => self.history.last().copied().unwrap_or(0.0),
        }
    }

    fn ready(&self, base: usize, last: bool) -> bool {
        if last {
            base < self.history.len()
        } else {
            base + K::AHEAD < self.history.len()
        }
    }

    /// Drop history the read head has moved past, keeping `BEHIND` samples.
    fn rebase(&mut self) {
        let base = (self.pos >> FRAC_BITS) as usize;
        let drop = base.saturating_sub(K::BEHIND).min(self.history.len());
        if drop > 0 {
            self.history.drain(..drop);
            self.pos -= (drop as u64) << FRAC_BITS;
        }
    }
}

impl<K: Kernel> ConversionEngine for Interpolator<K> {
    fn process(&mut self, input: &[f32], last: bool, output: &mut [f32]) -> Result<(usize, usize)> {
        let room = self.max_buffered.saturating_sub(self.history.len());
        let consumed = input.len().min(room);
        self.history.extend_from_slice(&input[..consumed]);

        let mut window = [0.0f32; 8];
        let window = &mut window[..K::WIDTH];
        let mut produced = 0;

        while produced < output.len() {
            let base = (self.pos >> FRAC_BITS) as usize;
            if !self.ready(base, last) {
                break;
            }

            let t = (self.pos & FRAC_MASK) as f32 / ONE as f32;
            for (k, w) in window.iter_mut().enumerate() {
                *w = self.sample(base + k - K::BEHIND);
            }

            output[produced] = K::interpolate(window, t);
            produced += 1;
            self.pos += self.step;
        }

        self.rebase();
        Ok((consumed, produced))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Nearest-left sample; makes positions easy to read in assertions.
    struct Hold;

    impl Kernel for Hold {
        const BEHIND: usize = 0;
        const AHEAD: usize = 0;

        fn interpolate(window: &[f32], _t: f32) -> f32 {
            window[0]
        }
    }

    fn ramp(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32).collect()
    }

    #[test]
    fn halving_ratio_takes_every_other_sample() {
        let mut engine = Interpolator::<Hold>::new(0.5);
        let mut out = [0.0; 16];
        let (consumed, produced) = engine.process(&ramp(8), false, &mut out).unwrap();
        assert_eq!(consumed, 8);
        assert_eq!(&out[..produced], &[0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn large_input_is_consumed_over_several_calls() {
        let mut engine = Interpolator::<Hold>::with_capacity(1.0, 16);
        let input = ramp(40);
        let mut out = vec![0.0; 64];
        let mut used = 0;
        let mut written = 0;
        let mut calls = 0;
        while used < input.len() {
            let (c, p) = engine.process(&input[used..], false, &mut out[written..]).unwrap();
            used += c;
            written += p;
            calls += 1;
        }
        assert!(calls > 1);
        assert_eq!(&out[..written], &input[..written]);
    }

    #[test]
    fn output_room_limits_production() {
        let mut engine = Interpolator::<Hold>::new(1.0);
        let mut out = [0.0; 3];
        let (_, produced) = engine.process(&ramp(10), false, &mut out).unwrap();
        assert_eq!(produced, 3);
        let mut more = [0.0; 16];
        let (_, produced) = engine.process(&[], false, &mut more).unwrap();
        assert_eq!(&more[..produced], &[3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn terminal_call_drains_then_reports_zero() {
        let mut engine = Interpolator::<Hold>::new(2.0);
        let mut out = [0.0; 16];
        let (_, first) = engine.process(&ramp(3), false, &mut out).unwrap();
        let mut tail = [0.0; 16];
        let (_, drained) = engine.process(&[], true, &mut tail).unwrap();
        assert_eq!(first + drained, 6);
        let (_, again) = engine.process(&[], true, &mut tail).unwrap();
        assert_eq!(again, 0);
    }
}
