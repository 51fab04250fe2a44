//! Deterministic stand-in engines for tests.

use super::ConversionEngine;
use crate::common::errors::{ResampleError, Result};

/// Sample value emitted while draining a [`StubEngine`] backlog.
pub const BACKLOG_SAMPLE: f32 = 0.5;

/// Copies input to output, at most `max_per_call` frames per call, and emits
/// a fixed backlog of `BACKLOG_SAMPLE` frames on terminal calls.
pub struct StubEngine {
    max_per_call: usize,
    backlog: usize,
}

impl StubEngine {
    pub fn new(max_per_call: usize, backlog: usize) -> Self {
        Self {
            max_per_call,
            backlog,
        }
    }
}

impl ConversionEngine for StubEngine {
    fn process(&mut self, input: &[f32], last: bool, output: &mut [f32]) -> Result<(usize, usize)> {
        let n = input.len().min(output.len()).min(self.max_per_call);
        output[..n].copy_from_slice(&input[..n]);

        let mut produced = n;
        if last && n == input.len() {
            let room = output.len() - n;
            let drained = self.backlog.min(room).min(self.max_per_call);
            output[n..n + drained].fill(BACKLOG_SAMPLE);
            self.backlog -= drained;
            produced += drained;
        }
        Ok((n, produced))
    }
}

/// Writes `factor` output frames per consumed input frame, holding back
/// whatever does not fit until the next call.
pub struct ExpandingEngine {
    factor: usize,
    pending: Vec<f32>,
}

impl ExpandingEngine {
    pub fn new(factor: usize) -> Self {
        Self {
            factor,
            pending: Vec::new(),
        }
    }
}

impl ConversionEngine for ExpandingEngine {
    fn process(&mut self, input: &[f32], _last: bool, output: &mut [f32]) -> Result<(usize, usize)> {
        let mut consumed = 0;
        let mut produced = 0;
        loop {
            let n = self.pending.len().min(output.len() - produced);
            output[produced..produced + n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            produced += n;

            if !self.pending.is_empty() || consumed == input.len() {
                break;
            }
            self.pending.resize(self.factor, input[consumed]);
            consumed += 1;
        }
        Ok((consumed, produced))
    }
}

/// Never runs dry when flushed: every terminal call fills the whole output.
pub struct EndlessTailEngine;

impl ConversionEngine for EndlessTailEngine {
    fn process(&mut self, input: &[f32], last: bool, output: &mut [f32]) -> Result<(usize, usize)> {
        if last {
            output.fill(0.0);
            return Ok((input.len(), output.len()));
        }
        Ok((input.len(), 0))
    }
}

/// Claims to have produced more frames than it was given room for.
pub struct LyingEngine;

impl ConversionEngine for LyingEngine {
    fn process(&mut self, input: &[f32], _last: bool, output: &mut [f32]) -> Result<(usize, usize)> {
        Ok((input.len(), output.len() + 1))
    }
}

/// Accepts nothing and produces nothing.
pub struct StalledEngine;

impl ConversionEngine for StalledEngine {
    fn process(&mut self, _input: &[f32], _last: bool, _output: &mut [f32]) -> Result<(usize, usize)> {
        Ok((0, 0))
    }
}

/// Fails every call.
pub struct FailingEngine;

impl ConversionEngine for FailingEngine {
    fn process(&mut self, _input: &[f32], _last: bool, _output: &mut [f32]) -> Result<(usize, usize)> {
        Err(ResampleError::Engine {
            reason: "filter state corrupted".into(),
        })
    }
}
