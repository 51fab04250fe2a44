//! `dispatch.rs`: offloading conversion work.
//!
//! A [`WorkItem`] owns everything one conversion step touches: its framed
//! input, its output capacity, a handle on the session's engine and the
//! channel its [`Completion`] goes back on. The [`Dispatcher`] runs it on
//! tokio's blocking pool so the accepting thread never waits on the engine.

use bytes::Bytes;
use flume::Sender;
use tokio::runtime::Handle;
use tracing::{Level, debug, error, span};

use crate::audio::buffer::{FramedInput, decode_frames, encode_frames};
use crate::audio::constants::FRAME_BYTES;
use crate::audio::engine::{ConversionEngine, SharedEngine};
use crate::common::errors::{ResampleError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkKind {
    Resample,
    Flush,
}

impl std::fmt::Display for WorkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resample => f.write_str("resample"),
            Self::Flush => f.write_str("flush"),
        }
    }
}

/// Result of one dispatched work item.
#[derive(Debug)]
pub struct Completion {
    pub id: u64,
    pub kind: WorkKind,
    pub result: Result<Bytes>,
}

// ── Output sizing ────────────────────────────────────────────────────────────

/// Output frames reserved for converting `body_bytes` of input.
///
/// `ceil(body_bytes * ratio)` bytes, rounded up to whole frames, plus the pad.
pub fn resample_capacity(body_bytes: usize, ratio: f64, pad_frames: usize) -> usize {
    let scaled = (body_bytes as f64 * ratio).ceil() as usize;
    scaled.div_ceil(FRAME_BYTES) + pad_frames
}

/// Output frames reserved for draining the engine.
pub fn flush_capacity(ratio: f64, pad_frames: usize) -> usize {
    (ratio * pad_frames as f64).ceil() as usize
}

// ── Work item ────────────────────────────────────────────────────────────────

pub struct WorkItem {
    id: u64,
    kind: WorkKind,
    input: FramedInput,
    capacity: usize,
    engine: SharedEngine,
    reply: Sender<Completion>,
}

impl WorkItem {
    pub fn resample(
        id: u64,
        engine: SharedEngine,
        input: FramedInput,
        capacity: usize,
        reply: Sender<Completion>,
    ) -> Self {
        Self {
            id,
            kind: WorkKind::Resample,
            input,
            capacity,
            engine,
            reply,
        }
    }

    pub fn flush(id: u64, engine: SharedEngine, capacity: usize, reply: Sender<Completion>) -> Self {
        Self {
            id,
            kind: WorkKind::Flush,
            input: FramedInput::default(),
            capacity,
            engine,
            reply,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> WorkKind {
        self.kind
    }

    /// Output capacity in frames.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    /// Run the conversion to completion and return the produced bytes,
    /// already cut to the produced length.
    pub fn execute(&self) -> Result<Bytes> {
        if self.kind == WorkKind::Resample && self.input.is_empty() {
            return Ok(Bytes::new());
        }

        let mut output = vec![0.0f32; self.capacity];
        let mut engine = self.engine.lock();

        let written = match self.kind {
            WorkKind::Resample => {
                let mut input = Vec::with_capacity(self.input.frames(FRAME_BYTES));
                for span in self.input.spans() {
                    decode_frames(span, &mut input);
                }
                convert(&mut **engine, &input, &mut output)?
            }
            WorkKind::Flush => drain(&mut **engine, &mut output)?,
        };

        output.truncate(written);
        Ok(encode_frames(&output))
    }

    /// Execute and send the completion back. A dropped receiver means the
    /// session went away; the result is discarded.
    fn complete(self) {
        let _span = span!(Level::DEBUG, "work_item", id = self.id, kind = %self.kind).entered();

        let result = self.execute();
        match &result {
            Ok(out) => debug!("produced {} bytes from {} input bytes", out.len(), self.input.len()),
            Err(e) if e.is_internal() => error!("conversion failed: {}", e),
            Err(e) => debug!("conversion failed: {}", e),
        }

        let completion = Completion {
            id: self.id,
            kind: self.kind,
            result,
        };
        if self.reply.send(completion).is_err() {
            debug!("session dropped before completion; discarding result");
        }
    }
}

/// Feed all of `input` through the engine.
fn convert(engine: &mut dyn ConversionEngine, input: &[f32], output: &mut [f32]) -> Result<usize> {
    let capacity = output.len();
    let mut used = 0;
    let mut written = 0;

    while used < input.len() {
        if written == capacity {
            return Err(ResampleError::OutputOverflow { capacity });
        }

        let (consumed, produced) = engine.process(&input[used..], false, &mut output[written..])?;
        check_progress(consumed, input.len() - used, produced, capacity - written, capacity)?;

        used += consumed;
        written += produced;
    }

    Ok(written)
}

/// Terminal calls until the engine reports nothing further.
fn drain(engine: &mut dyn ConversionEngine, output: &mut [f32]) -> Result<usize> {
    let capacity = output.len();
    let mut written = 0;

    loop {
        if written == capacity {
            // Full: anything still coming out of the engine would be truncated.
            let mut probe = [0.0f32; 1];
            let (_, produced) = engine.process(&[], true, &mut probe)?;
            if produced > 0 {
                return Err(ResampleError::OutputOverflow { capacity });
            }
            return Ok(written);
        }

        let (_, produced) = engine.process(&[], true, &mut output[written..])?;
        check_progress(0, 0, produced, capacity - written, capacity)?;
        if produced == 0 {
            return Ok(written);
        }
        written += produced;
    }
}

fn check_progress(
    consumed: usize,
    available: usize,
    produced: usize,
    room: usize,
    capacity: usize,
) -> Result<()> {
    if produced > room {
        return Err(ResampleError::OutputOverflow { capacity });
    }
    if consumed > available {
        return Err(ResampleError::Engine {
            reason: format!("consumed {consumed} frames of {available}"),
        });
    }
    if available > 0 && consumed == 0 && produced == 0 {
        return Err(ResampleError::EngineStalled);
    }
    Ok(())
}

// ── Dispatcher ───────────────────────────────────────────────────────────────

/// Runs work items on a tokio runtime's blocking pool.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    runtime: Handle,
}

impl Dispatcher {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Dispatcher on the runtime the caller is running in.
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| ResampleError::NoRuntime)
    }

    /// Schedule `item`; returns without waiting for it.
    pub fn dispatch(&self, item: WorkItem) {
        self.runtime.spawn_blocking(move || item.complete());
    }
}
