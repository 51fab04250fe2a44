//! Frame alignment across chunk boundaries.
//!
//! Chunks arrive at arbitrary byte lengths; the engine only ever sees whole
//! frames. [`split`] joins the carried remainder with the next chunk and cuts
//! the result into a frame-aligned body plus a new sub-frame remainder.

use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;

/// Frame-aligned input for one conversion step.
///
/// The body is kept in two parts so the bulk of a chunk is never copied:
/// `head` is the previous remainder completed to exactly one frame with the
/// first bytes of the chunk, `tail` is a zero-copy slice of the chunk.
#[derive(Debug, Clone, Default)]
pub struct FramedInput {
    pub head: Vec<u8>,
    pub tail: Bytes,
}

impl FramedInput {
    pub fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn frames(&self, frame_width: usize) -> usize {
        self.len() / frame_width
    }

    /// Both parts in stream order; either may be empty.
    pub fn spans(&self) -> [&[u8]; 2] {
        [&self.head, &self.tail]
    }

    /// Contiguous copy of the body.
    pub fn to_vec(&self) -> Vec<u8> {
        concat(&self.head, &self.tail)
    }
}

/// `remainder ++ chunk` as a fresh buffer.
pub fn concat(remainder: &[u8], chunk: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(remainder.len() + chunk.len());
    out.extend_from_slice(remainder);
    out.extend_from_slice(chunk);
    out
}

/// Split `remainder ++ chunk` into a frame-aligned body and the trailing
/// `0..frame_width` bytes.
///
/// `remainder` must already be shorter than one frame.
pub fn split(remainder: &[u8], chunk: Bytes, frame_width: usize) -> (FramedInput, Vec<u8>) {
    debug_assert!(frame_width > 0);
    debug_assert!(remainder.len() < frame_width);

    if remainder.len() + chunk.len() < frame_width {
        return (FramedInput::default(), concat(remainder, &chunk));
    }

    let (head, rest) = if remainder.is_empty() {
        (Vec::new(), chunk)
    } else {
        let fill = frame_width - remainder.len();
        (concat(remainder, &chunk[..fill]), chunk.slice(fill..))
    };

    let aligned = rest.len() - rest.len() % frame_width;
    let new_remainder = rest[aligned..].to_vec();
    let tail = rest.slice(..aligned);

    (FramedInput { head, tail }, new_remainder)
}

/// Decode little-endian `f32` frames, appending to `out`.
pub fn decode_frames(bytes: &[u8], out: &mut Vec<f32>) {
    let frames = bytes.len() / 4;
    let start = out.len();
    out.resize(start + frames, 0.0);
    LittleEndian::read_f32_into(&bytes[..frames * 4], &mut out[start..]);
}

/// Encode samples as little-endian `f32` frames.
pub fn encode_frames(samples: &[f32]) -> Bytes {
    let mut out = vec![0u8; samples.len() * 4];
    LittleEndian::write_f32_into(samples, &mut out);
    Bytes::from(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_chunk_without_remainder_is_sliced_whole() {
        let chunk = Bytes::from(vec![1u8; 16]);
        let (body, rem) = split(&[], chunk.clone(), 4);
        assert!(body.head.is_empty());
        assert_eq!(body.tail.len(), 16);
        assert_eq!(body.tail.as_ptr(), chunk.as_ptr());
        assert!(rem.is_empty());
    }

    #[test]
    fn trailing_bytes_become_remainder() {
        let (body, rem) = split(&[], Bytes::from_static(&[0, 1, 2, 3, 4, 5]), 4);
        assert_eq!(body.to_vec(), vec![0, 1, 2, 3]);
        assert_eq!(rem, vec![4, 5]);
    }

    #[test]
    fn remainder_is_completed_from_chunk_head() {
        let (body, rem) = split(&[9, 8, 7], Bytes::from_static(&[6, 5, 4, 3, 2, 1]), 4);
        assert_eq!(body.head, vec![9, 8, 7, 6]);
        assert_eq!(&body.tail[..], &[5, 4, 3, 2]);
        assert_eq!(rem, vec![1]);
    }

    #[test]
    fn short_concatenation_is_all_remainder() {
        let (body, rem) = split(&[1], Bytes::from_static(&[2, 3]), 4);
        assert!(body.is_empty());
        assert_eq!(rem, vec![1, 2, 3]);

        let (body, rem) = split(&[1, 2], Bytes::new(), 4);
        assert!(body.is_empty());
        assert_eq!(rem, vec![1, 2]);
    }

    #[test]
    fn remainder_exactly_completed() {
        let (body, rem) = split(&[1, 2, 3], Bytes::from_static(&[4]), 4);
        assert_eq!(body.to_vec(), vec![1, 2, 3, 4]);
        assert!(body.tail.is_empty());
        assert!(rem.is_empty());
        assert_eq!(body.frames(4), 1);
    }

    #[test]
    fn every_split_preserves_the_stream() {
        let stream: Vec<u8> = (0..=255u8).collect();
        for cut in [1usize, 2, 3, 5, 7, 13] {
            let mut remainder = Vec::new();
            let mut rebuilt = Vec::new();
            for piece in stream.chunks(cut) {
                let (body, rem) = split(&remainder, Bytes::copy_from_slice(piece), 4);
                assert_eq!(body.len() % 4, 0);
                assert!(rem.len() < 4);
                rebuilt.extend(body.to_vec());
                remainder = rem;
            }
            rebuilt.extend(&remainder);
            assert_eq!(rebuilt, stream);
        }
    }

    #[test]
    fn frames_decode_little_endian() {
        let encoded = encode_frames(&[1.0, -0.5]);
        assert_eq!(&encoded[..4], &1.0f32.to_le_bytes());
        let mut decoded = vec![7.0];
        decode_frames(&encoded, &mut decoded);
        assert_eq!(decoded, vec![7.0, 1.0, -0.5]);
    }
}
