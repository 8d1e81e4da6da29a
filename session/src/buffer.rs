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

use crate::consts;
use crate::result::SessionError;
use bytes::{BufMut, BytesMut};

///
/// Accumulation buffer for subnegotiation bodies. Capacity climbs the fixed
/// ladder in [`consts::SB_BUFFER_SIZES`] on demand and never shrinks for the
/// lifetime of the session; only the write cursor resets between frames. The
/// last rung is a hard ceiling so a hostile peer cannot grow the buffer
/// without bound.
///
#[derive(Debug)]
pub(crate) struct SubBuffer {
    data: BytesMut,
    capacity: usize,
}

impl SubBuffer {
    pub(crate) fn new() -> Self {
        let capacity = consts::SB_BUFFER_SIZES[0];
        SubBuffer {
            data: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Resets the write cursor for a new frame. Capacity is retained.
    pub(crate) fn reset(&mut self) {
        self.data.clear();
    }

    /// Appends one body byte, growing to the next ladder rung when full.
    ///
    /// # Errors
    ///
    /// [`SessionError::Overflow`] when the byte would not fit and the top
    /// rung has been reached. The caller is expected to discard the frame.
    pub(crate) fn push(&mut self, byte: u8) -> Result<(), SessionError> {
        if self.data.len() == self.capacity {
            self.grow()?;
        }
        self.data.put_u8(byte);
        Ok(())
    }

    fn grow(&mut self) -> Result<(), SessionError> {
        let next = consts::SB_BUFFER_SIZES
            .iter()
            .copied()
            .find(|&size| size > self.capacity)
            .ok_or(SessionError::Overflow {
                limit: self.capacity,
            })?;
        self.data.reserve(next - self.data.len());
        self.capacity = next;
        Ok(())
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_the_first_rung() {
        let buffer = SubBuffer::new();
        assert_eq!(buffer.capacity(), 512);
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn climbs_the_ladder_one_rung_at_a_time() {
        let mut buffer = SubBuffer::new();
        for _ in 0..513 {
            buffer.push(0x2A).expect("within ceiling");
        }
        assert_eq!(buffer.capacity(), 2048);
        for _ in 513..2049 {
            buffer.push(0x2A).expect("within ceiling");
        }
        assert_eq!(buffer.capacity(), 8192);
    }

    #[test]
    fn ceiling_is_sixteen_kib() {
        let mut buffer = SubBuffer::new();
        for _ in 0..16384 {
            buffer.push(0x00).expect("within ceiling");
        }
        assert_eq!(buffer.capacity(), 16384);
        let err = buffer.push(0x00).expect_err("ceiling reached");
        assert_eq!(err, SessionError::Overflow { limit: 16384 });
    }

    #[test]
    fn reset_keeps_capacity() {
        let mut buffer = SubBuffer::new();
        for _ in 0..600 {
            buffer.push(0x01).expect("within ceiling");
        }
        assert_eq!(buffer.capacity(), 2048);
        buffer.reset();
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.capacity(), 2048);
    }

    #[test]
    fn cursor_never_exceeds_capacity() {
        let mut buffer = SubBuffer::new();
        for i in 0..20000usize {
            if buffer.push((i % 256) as u8).is_err() {
                break;
            }
            assert!(buffer.len() <= buffer.capacity());
            assert!(buffer.capacity() <= 16384);
        }
        assert_eq!(buffer.len(), 16384);
    }
}
