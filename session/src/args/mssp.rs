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

//! MUD Server Status Protocol
//!
//! <https://tintin.sourceforge.io/protocols/mssp/>
//!
//! MSSP carries server metadata as key/value pairs inside a subnegotiation
//! on telopt 70: each key is prefixed by a `VAR` marker, each value by a
//! `VAL` marker, and a key may carry several values.

use crate::args::tagged;
use crate::consts;
use crate::result::{SessionError, SessionResult};
use byteorder::WriteBytesExt;
use bytes::BufMut;
use std::collections::BTreeMap;

/// MSSP key/value set, for building outgoing status frames and for reading
/// decoded ones.
///
/// Keys are kept sorted so encoded frames are deterministic.
///
/// ```
/// use telwire_session::mssp::MudServerStatus;
///
/// let mut status = MudServerStatus::new();
/// status.insert("NAME", "Dawn of the Ages");
/// status.insert("PLAYERS", "52");
/// assert_eq!(status.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MudServerStatus(BTreeMap<String, Vec<String>>);

impl MudServerStatus {
    /// Creates an empty status set.
    #[must_use]
    pub fn new() -> MudServerStatus {
        MudServerStatus(BTreeMap::new())
    }

    /// Adds one value for `key`, keeping any values already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// Values recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no keys are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reconstructs a status set from the tag-segmented argv of a decoded
    /// MSSP subnegotiation.
    ///
    /// Deliberately permissive: segments before the first `VAR` are skipped,
    /// repeated `VAL` tags accumulate under the current key, and bytes are
    /// read as lossy UTF-8.
    #[must_use]
    pub fn from_segments(segments: &[&[u8]]) -> MudServerStatus {
        let mut status = MudServerStatus::new();
        let mut key: Option<String> = None;
        for segment in segments {
            let (tag, payload) = tagged::split_tag(segment);
            let text = String::from_utf8_lossy(payload).into_owned();
            match tag {
                consts::option::mssp::VAR => key = Some(text),
                consts::option::mssp::VAL => {
                    if let Some(key) = &key {
                        status.0.entry(key.clone()).or_default().push(text);
                    }
                }
                _ => {}
            }
        }
        status
    }

    /// Encoded byte length of the frame body, before marker filtering.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        let mut length = 0;
        for (key, values) in &self.0 {
            length += 1 + key.len();
            for value in values {
                length += 1 + value.len();
            }
        }
        length
    }

    /// Encodes the frame body into `dst`.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> SessionResult<usize> {
        self.write(&mut dst.writer())
            .map_err(|err| SessionError::BadValue {
                reason: format!("MSSP encode failed: {err}"),
            })
    }

    /// Writes the frame body: `VAR key (VAL value)*` per entry, with bytes
    /// that would corrupt the framing (NUL, IAC, VAR, VAL) dropped from keys
    /// and values.
    pub fn write<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<usize> {
        fn clean(text: &str) -> Vec<u8> {
            text.bytes()
                .filter(|&byte| {
                    byte != consts::NUL
                        && byte != consts::IAC
                        && byte != consts::option::mssp::VAR
                        && byte != consts::option::mssp::VAL
                })
                .collect()
        }

        let mut written = 0;
        for (key, values) in &self.0 {
            writer.write_u8(consts::option::mssp::VAR)?;
            let key = clean(key);
            writer.write_all(&key)?;
            written += 1 + key.len();
            for value in values {
                writer.write_u8(consts::option::mssp::VAL)?;
                let value = clean(value);
                writer.write_all(&value)?;
                written += 1 + value.len();
            }
        }
        Ok(written)
    }
}
