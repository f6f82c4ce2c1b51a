//! shardsort wire format — the on-wire record and stream framing.
//!
//! The record IS the protocol. A shuffle stream is nothing but 100-byte
//! frames written back-to-back: no length prefix, no checksum, no
//! versioning. The stream ends with a single all-zero frame, after which
//! the sender closes the connection. Changing any size here is a breaking
//! change for every node in a cluster.
//!
//! `Record` is #[repr(transparent)] over its byte array and uses zerocopy
//! derives for safe, allocation-free serialization. There is no unsafe
//! code in this module.

use bytes::BytesMut;
use static_assertions::assert_eq_size;
use zerocopy::{AsBytes, FromBytes, FromZeroes};

// ── Sizes ─────────────────────────────────────────────────────────────────────

/// Exact size of every record on the wire and on disk.
pub const RECORD_LEN: usize = 100;

/// Leading bytes of a record that form the sort/partition key.
pub const KEY_LEN: usize = 10;

// ── Record ────────────────────────────────────────────────────────────────────

/// The atomic unit of shardsort: a fixed 100-byte sequence.
///
/// The first 10 bytes are the key, used for both partitioning and the
/// final ordering. The remaining 90 bytes are opaque payload that the
/// core never inspects.
#[derive(Clone, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(transparent)]
pub struct Record([u8; RECORD_LEN]);

// Compile-time size guard. If this fails, the wire format has silently changed.
assert_eq_size!(Record, [u8; 100]);

impl Record {
    /// The end-of-stream marker: 100 zero bytes.
    ///
    /// Never a valid data record — the protocol assumes data records are
    /// never all-zero. This precondition is not enforced.
    pub const SENTINEL: Record = Record([0u8; RECORD_LEN]);

    pub fn new(bytes: [u8; RECORD_LEN]) -> Self {
        Record(bytes)
    }

    /// The sort/partition key: the first [`KEY_LEN`] bytes.
    pub fn key(&self) -> &[u8] {
        &self.0[..KEY_LEN]
    }

    /// The opaque remainder of the record.
    pub fn payload(&self) -> &[u8] {
        &self.0[KEY_LEN..]
    }

    pub fn is_sentinel(&self) -> bool {
        self.0 == Self::SENTINEL.0
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_sentinel() {
            write!(f, "Record(SENTINEL)")
        } else {
            write!(f, "Record(key={})", hex::encode(self.key()))
        }
    }
}

// ── Stream framing ────────────────────────────────────────────────────────────

/// Reassembles records from an unframed byte stream.
///
/// TCP delivers bytes at arbitrary boundaries; the decoder accumulates
/// them and yields a record for every full 100 bytes, keeping any
/// remainder for the next read. A short remainder left at end-of-stream
/// is the caller's to discard.
#[derive(Default)]
pub struct FrameDecoder {
    buf: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes read from the stream.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Take the next complete record, if one has accumulated.
    pub fn next_record(&mut self) -> Option<Record> {
        if self.buf.len() < RECORD_LEN {
            return None;
        }
        let frame = self.buf.split_to(RECORD_LEN);
        // Length is checked above, so the read always succeeds.
        Record::read_from(&frame[..])
    }

    /// Bytes held that do not yet form a complete record.
    pub fn residual(&self) -> usize {
        self.buf.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
