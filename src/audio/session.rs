//! `session.rs`: per-stream state and the lifecycle guards.
//!
//! All mutation happens on the caller's thread: either synchronously inside
//! an accepting call or when a completion is applied. The worker only ever
//! sees the [`WorkItem`] it was handed.

use std::sync::Arc;

use bytes::Bytes;
use flume::Receiver;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::audio::buffer::split;
use crate::audio::constants::{DEFAULT_PAD_FRAMES, FRAME_BYTES};
use crate::audio::dispatch::{Completion, WorkItem, WorkKind, flush_capacity, resample_capacity};
use crate::audio::engine::{EngineFactory, SharedEngine};
use crate::common::errors::{ResampleError, Result};

/// The one operation a session may have outstanding.
#[derive(Debug)]
pub struct InFlight {
    id: u64,
    rx: Receiver<Completion>,
}

impl InFlight {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn receiver(&self) -> &Receiver<Completion> {
        &self.rx
    }
}

#[derive(Debug)]
pub enum SessionState {
    Closed,
    Open,
    Resampling(InFlight),
    Flushing(InFlight),
    Closing,
}

/// Payload-free view of [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Open,
    Resampling,
    Flushing,
    Closing,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::Resampling => "resampling",
            Self::Flushing => "flushing",
            Self::Closing => "closing",
        };
        f.write_str(name)
    }
}

pub struct Session {
    state: SessionState,
    ratio: f64,
    quality: i32,
    pad_frames: usize,
    engine: Option<SharedEngine>,
    /// Sub-frame bytes carried into the next push; always `< FRAME_BYTES`.
    leftover: Vec<u8>,
    next_id: u64,
}

impl Session {
    pub fn new(ratio: f64, quality: i32) -> Self {
        Self {
            state: SessionState::Closed,
            ratio,
            quality,
            pad_frames: DEFAULT_PAD_FRAMES,
            engine: None,
            leftover: Vec::with_capacity(FRAME_BYTES),
            next_id: 0,
        }
    }

    pub fn set_pad_frames(&mut self, pad_frames: usize) {
        self.pad_frames = pad_frames;
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn quality(&self) -> i32 {
        self.quality
    }

    pub fn pad_frames(&self) -> usize {
        self.pad_frames
    }

    pub fn leftover_len(&self) -> usize {
        self.leftover.len()
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            SessionState::Closed => Phase::Closed,
            SessionState::Open => Phase::Open,
            SessionState::Resampling(_) => Phase::Resampling,
            SessionState::Flushing(_) => Phase::Flushing,
            SessionState::Closing => Phase::Closing,
        }
    }

    pub fn opened(&self) -> bool {
        matches!(
            self.state,
            SessionState::Open | SessionState::Resampling(_) | SessionState::Flushing(_)
        )
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        match &self.state {
            SessionState::Resampling(f) | SessionState::Flushing(f) => Some(f),
            _ => None,
        }
    }

    pub fn open(&mut self, factory: &dyn EngineFactory) -> Result<()> {
        match self.state {
            SessionState::Closed => {}
            SessionState::Closing => return Err(ResampleError::StillClosing),
            _ => return Err(ResampleError::AlreadyOpen),
        }

        let engine = factory.open(self.quality, self.ratio)?;
        self.engine = Some(Arc::new(Mutex::new(engine)));
        self.leftover.clear();
        self.state = SessionState::Open;

        info!(
            "session opened: ratio {} quality {}",
            self.ratio, self.quality
        );
        Ok(())
    }

    /// Accept a chunk: carry its sub-frame tail and build the work item for
    /// the frame-aligned body. A chunk too short to complete a frame still
    /// yields an (empty) work item so every accepted push completes once.
    pub fn accept_push(&mut self, chunk: Bytes) -> Result<WorkItem> {
        let engine = match (&self.state, &self.engine) {
            (SessionState::Open, Some(engine)) => engine.clone(),
            (SessionState::Resampling(_), _) => return Err(ResampleError::AlreadyResampling),
            (SessionState::Flushing(_), _) => return Err(ResampleError::StillFlushing),
            _ => return Err(ResampleError::NotOpen),
        };

        let (body, leftover) = split(&self.leftover, chunk, FRAME_BYTES);
        self.leftover = leftover;

        let capacity = resample_capacity(body.len(), self.ratio, self.pad_frames);
        let id = self.next_id();
        let (tx, rx) = flume::bounded(1);

        debug!(
            "push {} accepted: {} body bytes, {} carried, capacity {} frames",
            id,
            body.len(),
            self.leftover.len(),
            capacity
        );

        self.state = SessionState::Resampling(InFlight { id, rx });
        Ok(WorkItem::resample(id, engine, body, capacity, tx))
    }

    pub fn accept_flush(&mut self) -> Result<WorkItem> {
        let engine = match (&self.state, &self.engine) {
            (SessionState::Open, Some(engine)) => engine.clone(),
            (SessionState::Resampling(_), _) => return Err(ResampleError::StillResampling),
            (SessionState::Flushing(_), _) => return Err(ResampleError::AlreadyFlushing),
            _ => return Err(ResampleError::NotOpen),
        };

        let capacity = flush_capacity(self.ratio, self.pad_frames);
        let id = self.next_id();
        let (tx, rx) = flume::bounded(1);

        debug!("flush {} accepted: capacity {} frames", id, capacity);

        self.state = SessionState::Flushing(InFlight { id, rx });
        Ok(WorkItem::flush(id, engine, capacity, tx))
    }

    /// Apply the outcome of the in-flight operation and return to `Open`.
    /// `None` means the worker went away without reporting.
    pub fn complete(&mut self, completion: Option<Completion>) -> Result<Bytes> {
        let Some(in_flight) = self.in_flight() else {
            return Err(ResampleError::NothingPending);
        };
        let expected = in_flight.id;
        let busy = self.phase();
        self.state = SessionState::Open;

        let Some(completion) = completion else {
            warn!("operation {} lost its worker", expected);
            return Err(ResampleError::WorkerLost);
        };
        debug_assert_eq!(completion.id, expected);
        debug_assert_eq!(completion.kind.phase(), busy);

        match &completion.result {
            Ok(out) => debug!("{} {} completed: {} bytes", completion.kind, completion.id, out.len()),
            Err(e) => debug!("{} {} failed: {}", completion.kind, completion.id, e),
        }
        completion.result
    }

    pub fn close(&mut self) -> Result<()> {
        match self.state {
            SessionState::Open => {}
            SessionState::Closed => return Err(ResampleError::NotOpen),
            SessionState::Resampling(_) => return Err(ResampleError::StillResampling),
            SessionState::Flushing(_) => return Err(ResampleError::StillFlushing),
            SessionState::Closing => return Err(ResampleError::AlreadyClosing),
        }

        self.state = SessionState::Closing;
        // No work item is in flight, so this is the last handle on the engine.
        self.engine = None;
        self.leftover.clear();
        self.state = SessionState::Closed;

        info!("session closed");
        Ok(())
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl WorkKind {
    fn phase(self) -> Phase {
        match self {
            Self::Resample => Phase::Resampling,
            Self::Flush => Phase::Flushing,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight() {
            warn!(
                "session dropped while {} {} is in flight; its result will be discarded",
                self.phase(),
                in_flight.id
            );
        }
    }
}
