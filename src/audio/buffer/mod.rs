pub mod frame;

pub use frame::{FramedInput, concat, decode_frames, encode_frames, split};
