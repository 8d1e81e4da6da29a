//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! # Overview
//!
//! Synchronous zlib stream helpers for the telwire session engine. The MCCP2
//! compression option splices a single long-lived zlib stream into the middle
//! of a TELNET connection, so the session layer needs incremental compression
//! primitives it can drive byte-chunk by byte-chunk without owning any I/O:
//! every call must consume the whole input chunk and flush the stream far
//! enough that the peer can decode everything produced so far (zlib
//! `SYNC_FLUSH` semantics).
//!
//! [`DeflateStream`] is the send side: each [`DeflateStream::compress`] call
//! appends the sync-flushed compressed form of the input to a caller-provided
//! buffer. [`InflateStream`] is the receive side: [`InflateStream::inflate`]
//! appends decompressed bytes and reports, via [`InflateOutcome`], whether the
//! peer ended the stream mid-chunk and how many raw bytes trail the stream
//! end.
//!
//! # Examples
//!
//! ```
//! use telwire_compress::{DeflateStream, InflateStream, InflateOutcome};
//!
//! let mut tx = DeflateStream::new();
//! let mut rx = InflateStream::new();
//!
//! let mut wire = Vec::new();
//! tx.compress(b"Hello, MUD!", &mut wire).unwrap();
//!
//! let mut plain = Vec::new();
//! let outcome = rx.inflate(&wire, &mut plain).unwrap();
//! assert_eq!(outcome, InflateOutcome::Consumed);
//! assert_eq!(plain, b"Hello, MUD!");
//! ```

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(clippy::missing_errors_doc)]

use flate2::{Compress, CompressError, Compression, Decompress, DecompressError};
use flate2::{FlushCompress, FlushDecompress, Status};

/// Output is produced in steps of this many bytes. Small enough to keep a
/// mostly idle session cheap, large enough that interactive traffic flushes
/// in one step.
const OUTPUT_STEP: usize = 4096;

/// Error raised by either stream direction.
///
/// Wraps the underlying zlib failure text. A deflate error leaves the stream
/// unusable; an inflate error additionally means the remaining connection
/// bytes cannot be recovered, since the peer gives no resynchronization
/// point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamError {
    message: String,
}

impl StreamError {
    fn new(message: impl Into<String>) -> Self {
        StreamError {
            message: message.into(),
        }
    }

    /// Human-readable description of the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "zlib stream error: {}", self.message)
    }
}

impl std::error::Error for StreamError {}

impl From<CompressError> for StreamError {
    fn from(err: CompressError) -> Self {
        StreamError::new(err.to_string())
    }
}

impl From<DecompressError> for StreamError {
    fn from(err: DecompressError) -> Self {
        StreamError::new(err.to_string())
    }
}

/// Result of one [`InflateStream::inflate`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InflateOutcome {
    /// The whole input chunk was consumed; the stream continues.
    Consumed,
    /// The compressed stream ended inside the chunk. `trailing` input bytes
    /// after the stream end were left untouched and belong to the plain
    /// (uncompressed) connection again.
    StreamEnd {
        /// Number of unconsumed bytes at the end of the input chunk.
        trailing: usize,
    },
}

/// Incremental zlib compressor with `SYNC_FLUSH` semantics.
///
/// One `DeflateStream` lives for the remainder of a session once MCCP2 is
/// negotiated; it is never finished, only dropped.
pub struct DeflateStream {
    ctx: Compress,
}

impl DeflateStream {
    /// Creates a compressor at zlib's default level, with the zlib header
    /// the MCCP2 wire format requires.
    #[must_use]
    pub fn new() -> Self {
        Self::with_level(Compression::default())
    }

    /// Creates a compressor at an explicit level.
    #[must_use]
    pub fn with_level(level: Compression) -> Self {
        DeflateStream {
            ctx: Compress::new(level, true),
        }
    }

    /// Compresses `input` and appends the sync-flushed output to `out`.
    ///
    /// On return every byte of `input` has been consumed and `out` holds
    /// enough of the stream for the peer to decode all of it.
    pub fn compress(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), StreamError> {
        let mut consumed = 0usize;
        loop {
            let before_in = self.ctx.total_in();
            out.reserve(OUTPUT_STEP);
            self.ctx
                .compress_vec(&input[consumed..], out, FlushCompress::Sync)?;
            consumed += usize::try_from(self.ctx.total_in() - before_in)
                .map_err(|_| StreamError::new("input larger than addressable memory"))?;
            // Spare output room after the call means the flush is complete.
            if consumed == input.len() && out.capacity() > out.len() {
                return Ok(());
            }
        }
    }

    /// Total raw bytes fed into the stream so far.
    #[must_use]
    pub fn total_in(&self) -> u64 {
        self.ctx.total_in()
    }

    /// Total compressed bytes produced so far.
    #[must_use]
    pub fn total_out(&self) -> u64 {
        self.ctx.total_out()
    }
}

impl Default for DeflateStream {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DeflateStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeflateStream")
            .field("total_in", &self.ctx.total_in())
            .field("total_out", &self.ctx.total_out())
            .finish()
    }
}

/// Incremental zlib decompressor, the receive-side mirror of
/// [`DeflateStream`].
pub struct InflateStream {
    ctx: Decompress,
}

impl InflateStream {
    /// Creates a decompressor expecting a zlib-wrapped stream.
    #[must_use]
    pub fn new() -> Self {
        InflateStream {
            ctx: Decompress::new(true),
        }
    }

    /// Decompresses `input`, appending plain bytes to `out`.
    ///
    /// Returns [`InflateOutcome::StreamEnd`] when the peer terminated the
    /// zlib stream inside this chunk; the reported `trailing` count tells the
    /// caller how many bytes at the end of `input` were never consumed and
    /// must be reprocessed as uncompressed data.
    pub fn inflate(
        &mut self,
        input: &[u8],
        out: &mut Vec<u8>,
    ) -> Result<InflateOutcome, StreamError> {
        let mut consumed = 0usize;
        loop {
            let before_in = self.ctx.total_in();
            out.reserve(OUTPUT_STEP);
            let status = self
                .ctx
                .decompress_vec(&input[consumed..], out, FlushDecompress::Sync)?;
            consumed += usize::try_from(self.ctx.total_in() - before_in)
                .map_err(|_| StreamError::new("input larger than addressable memory"))?;
            match status {
                Status::StreamEnd => {
                    return Ok(InflateOutcome::StreamEnd {
                        trailing: input.len() - consumed,
                    });
                }
                Status::Ok | Status::BufError => {
                    if consumed == input.len() && out.capacity() > out.len() {
                        return Ok(InflateOutcome::Consumed);
                    }
                }
            }
        }
    }

    /// Total compressed bytes fed into the stream so far.
    #[must_use]
    pub fn total_in(&self) -> u64 {
        self.ctx.total_in()
    }

    /// Total plain bytes produced so far.
    #[must_use]
    pub fn total_out(&self) -> u64 {
        self.ctx.total_out()
    }
}

impl Default for InflateStream {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InflateStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InflateStream")
            .field("total_in", &self.ctx.total_in())
            .field("total_out", &self.ctx.total_out())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    fn round_trip(payload: &[u8], chunk: usize) -> Vec<u8> {
        let mut tx = DeflateStream::new();
        let mut rx = InflateStream::new();
        let mut plain = Vec::new();
        for piece in payload.chunks(chunk.max(1)) {
            let mut wire = Vec::new();
            tx.compress(piece, &mut wire).expect("compress chunk");
            let outcome = rx.inflate(&wire, &mut plain).expect("inflate chunk");
            assert_eq!(outcome, InflateOutcome::Consumed);
        }
        plain
    }

    #[test]
    fn round_trip_preserves_payload() {
        let payload = b"The quick brown fox jumps over the lazy dog".repeat(16);
        assert_eq!(round_trip(&payload, payload.len()), payload);
    }

    #[test]
    fn round_trip_survives_tiny_chunks() {
        let payload: Vec<u8> = (0u16..1024).map(|i| (i % 251) as u8).collect();
        assert_eq!(round_trip(&payload, 3), payload);
    }

    #[test]
    fn sync_flush_makes_each_chunk_decodable() {
        let mut tx = DeflateStream::new();
        let mut rx = InflateStream::new();

        let mut wire = Vec::new();
        tx.compress(b"prompt> ", &mut wire).expect("compress");

        // The flush must allow full decode without any further input.
        let mut plain = Vec::new();
        rx.inflate(&wire, &mut plain).expect("inflate");
        assert_eq!(plain, b"prompt> ");
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let mut tx = DeflateStream::new();
        let mut wire = Vec::new();
        tx.compress(&[], &mut wire).expect("compress nothing");

        let mut rx = InflateStream::new();
        let mut plain = Vec::new();
        // Feed whatever the empty flush produced; nothing may come out.
        let outcome = rx.inflate(&wire, &mut plain).expect("inflate nothing");
        assert_eq!(outcome, InflateOutcome::Consumed);
        assert!(plain.is_empty());
    }

    #[test]
    fn stream_end_reports_trailing_bytes() {
        // A finished zlib stream followed by plain-text bytes, as happens
        // when a server terminates MCCP2.
        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"compressed part").expect("encode");
        let mut wire = encoder.finish().expect("finish");
        wire.extend_from_slice(b"PLAIN");

        let mut rx = InflateStream::new();
        let mut plain = Vec::new();
        let outcome = rx.inflate(&wire, &mut plain).expect("inflate");
        assert_eq!(outcome, InflateOutcome::StreamEnd { trailing: 5 });
        assert_eq!(plain, b"compressed part");
    }

    #[test]
    fn garbage_input_is_an_error() {
        let mut rx = InflateStream::new();
        let mut plain = Vec::new();
        let err = rx
            .inflate(b"\x00\x01\x02definitely not zlib", &mut plain)
            .expect_err("garbage must fail");
        assert!(!err.message().is_empty());
    }
}
