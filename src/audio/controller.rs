//! `Resampler`: the streaming front of a session.
//!
//! Accepting calls (`resample`, `flush`) validate against the session state,
//! hand a work item to the dispatcher and return straight away. The result
//! comes back as a message; retrieving it (`completion`, `wait_completion`,
//! `try_completion`) is what moves the session back to `Open`, on the
//! caller's thread.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::audio::dispatch::Dispatcher;
use crate::audio::engine::{EngineFactory, InterpolatingFactory};
use crate::audio::session::{Phase, Session};
use crate::common::errors::{ResampleError, Result};
use crate::configs::ResamplerConfig;

pub struct Resampler {
    session: Session,
    factory: Arc<dyn EngineFactory>,
    dispatcher: Dispatcher,
}

impl Resampler {
    /// A closed resampler converting `input_rate` to `output_rate` with the
    /// built-in engines. Must be created inside a tokio runtime.
    pub fn new(input_rate: f64, output_rate: f64, quality: i32) -> Result<Self> {
        Self::with_dispatcher(input_rate, output_rate, quality, Dispatcher::current()?)
    }

    pub fn with_dispatcher(
        input_rate: f64,
        output_rate: f64,
        quality: i32,
        dispatcher: Dispatcher,
    ) -> Result<Self> {
        for (name, rate) in [("input rate", input_rate), ("output rate", output_rate)] {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(ResampleError::invalid(format!(
                    "{name} must be a positive number, got {rate}"
                )));
            }
        }

        Ok(Self {
            session: Session::new(output_rate / input_rate, quality),
            factory: Arc::new(InterpolatingFactory),
            dispatcher,
        })
    }

    pub fn from_config(config: &ResamplerConfig) -> Result<Self> {
        Ok(Self::new(
            config.input_rate as f64,
            config.output_rate as f64,
            config.quality,
        )?
        .with_pad_frames(config.pad_frames))
    }

    /// Use `factory` for every subsequent `open`.
    pub fn with_factory(mut self, factory: impl EngineFactory + 'static) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    pub fn with_pad_frames(mut self, pad_frames: usize) -> Self {
        self.session.set_pad_frames(pad_frames);
        self
    }

    pub fn ratio(&self) -> f64 {
        self.session.ratio()
    }

    pub fn quality(&self) -> i32 {
        self.session.quality()
    }

    pub fn state(&self) -> Phase {
        self.session.phase()
    }

    /// `true` while open, including with an operation in flight.
    pub fn opened(&self) -> bool {
        self.session.opened()
    }

    /// Bytes carried over from the last chunk.
    pub fn leftover_len(&self) -> usize {
        self.session.leftover_len()
    }

    pub fn open(&mut self) -> Result<()> {
        self.session.open(self.factory.as_ref())
    }

    pub fn close(&mut self) -> Result<()> {
        self.session.close()
    }

    /// Queue `chunk` for conversion. The output arrives through one of the
    /// completion methods.
    pub fn resample(&mut self, chunk: impl Into<Bytes>) -> Result<()> {
        let item = self.session.accept_push(chunk.into())?;
        debug!("dispatching push {} ({} bytes)", item.id(), item.input_len());
        self.dispatcher.dispatch(item);
        Ok(())
    }

    /// Queue a drain of the engine's remaining output.
    pub fn flush(&mut self) -> Result<()> {
        let item = self.session.accept_flush()?;
        debug!("dispatching flush {}", item.id());
        self.dispatcher.dispatch(item);
        Ok(())
    }

    /// Wait for the in-flight operation and return its output.
    pub async fn completion(&mut self) -> Result<Bytes> {
        let received = match self.session.in_flight() {
            Some(in_flight) => in_flight.receiver().recv_async().await.ok(),
            None => return Err(ResampleError::NothingPending),
        };
        self.session.complete(received)
    }

    /// Blocking variant of [`completion`](Self::completion). Do not call from
    /// inside an async task.
    pub fn wait_completion(&mut self) -> Result<Bytes> {
        let received = match self.session.in_flight() {
            Some(in_flight) => in_flight.receiver().recv().ok(),
            None => return Err(ResampleError::NothingPending),
        };
        self.session.complete(received)
    }

    /// Non-blocking poll: `Ok(None)` while the operation is still running.
    pub fn try_completion(&mut self) -> Result<Option<Bytes>> {
        let received = match self.session.in_flight() {
            Some(in_flight) => match in_flight.receiver().try_recv() {
                Ok(completion) => Some(completion),
                Err(flume::TryRecvError::Empty) => return Ok(None),
                Err(flume::TryRecvError::Disconnected) => None,
            },
            None => return Err(ResampleError::NothingPending),
        };
        self.session.complete(received).map(Some)
    }

    pub async fn resample_await(&mut self, chunk: impl Into<Bytes>) -> Result<Bytes> {
        self.resample(chunk)?;
        self.completion().await
    }

    pub async fn flush_await(&mut self) -> Result<Bytes> {
        self.flush()?;
        self.completion().await
    }
}
