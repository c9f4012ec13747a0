//! Packed float associations.
//!
//! A document's diet scores are stored as one byte string: a tight sequence
//! of 8-byte pairs, each a big-endian 32-bit taxonomy ordinal followed by the
//! big-endian IEEE-754 bits of the score. There is no length prefix; readers
//! decode pairs until the bytes run out.

/// Size of one encoded `(ordinal, value)` pair.
pub const PAIR_BYTES: usize = 8;

/// Encode `(ordinal, value)` pairs in the given order.
pub fn encode<I>(pairs: I) -> Vec<u8>
where
    I: IntoIterator<Item = (u32, f32)>,
{
    let pairs = pairs.into_iter();
    let mut bytes = Vec::with_capacity(pairs.size_hint().0 * PAIR_BYTES);
    for (ordinal, value) in pairs {
        bytes.extend_from_slice(&ordinal.to_be_bytes());
        bytes.extend_from_slice(&value.to_bits().to_be_bytes());
    }
    bytes
}

/// Lazily decode pairs from `bytes`.
///
/// Trailing bytes that do not form a whole pair are ignored.
pub fn decode(bytes: &[u8]) -> AssociationIter<'_> {
    AssociationIter {
        chunks: bytes.chunks_exact(PAIR_BYTES),
    }
}

/// Iterator over encoded `(ordinal, value)` pairs.
#[derive(Debug, Clone)]
pub struct AssociationIter<'a> {
    chunks: std::slice::ChunksExact<'a, u8>,
}

impl Iterator for AssociationIter<'_> {
    type Item = (u32, f32);

    fn next(&mut self) -> Option<Self::Item> {
        let &[a, b, c, d, e, f, g, h] = self.chunks.next()? else {
            return None;
        };
        let ordinal = u32::from_be_bytes([a, b, c, d]);
        let value = f32::from_bits(u32::from_be_bytes([e, f, g, h]));
        Some((ordinal, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

// ============================================================================
// Tests
// ============================================================================
