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

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Diagnostics raised by the session engine.
///
/// Peer-triggered problems reach the host as [`crate::TelnetEvent::Warning`]
/// or [`crate::TelnetEvent::Error`] events; host API misuse is returned as
/// `Err` from the offending call. Message text is intended for humans and is
/// not a stable interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A session operation was called with an invalid argument or in an
    /// invalid state, such as initializing the compression stream twice.
    BadValue {
        /// Description of the misuse.
        reason: String,
    },

    /// A subnegotiation body would exceed the buffer ceiling. The partial
    /// frame is discarded and the receiver returns to data processing.
    Overflow {
        /// The ceiling in bytes that would have been exceeded.
        limit: usize,
    },

    /// The peer sent an illegal byte sequence. The engine recovers by
    /// re-entering data processing.
    Protocol {
        /// Description of the violation.
        reason: String,
        /// The offending byte, when a single byte is to blame.
        byte: Option<u8>,
    },

    /// The zlib stream failed. Fatal for the compression stream; fatal for
    /// the whole session when the receive path can no longer be decoded.
    Compression {
        /// Failure text from the stream layer.
        reason: String,
    },
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::BadValue { reason } => {
                write!(f, "invalid value: {reason}")
            }
            SessionError::Overflow { limit } => {
                write!(f, "subnegotiation exceeds {limit} byte buffer ceiling")
            }
            SessionError::Protocol { reason, byte } => {
                if let Some(byte) = byte {
                    write!(f, "protocol violation: {reason} (byte 0x{byte:02X})")
                } else {
                    write!(f, "protocol violation: {reason}")
                }
            }
            SessionError::Compression { reason } => {
                write!(f, "compression failure: {reason}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offending_byte() {
        let err = SessionError::Protocol {
            reason: "unexpected byte after IAC in subnegotiation".into(),
            byte: Some(0x41),
        };
        assert!(format!("{err}").contains("0x41"));
    }

    #[test]
    fn display_overflow_names_limit() {
        let err = SessionError::Overflow { limit: 16384 };
        assert!(format!("{err}").contains("16384"));
    }
}
