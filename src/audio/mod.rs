pub mod buffer;
pub mod constants;
pub mod controller;
pub mod dispatch;
pub mod engine;
pub mod session;

pub use buffer::{FramedInput, split};
pub use controller::Resampler;
pub use dispatch::{Completion, Dispatcher, WorkItem, WorkKind};
pub use engine::{BoxedEngine, ConversionEngine, EngineFactory, InterpolatingFactory};
pub use session::{Phase, Session};
