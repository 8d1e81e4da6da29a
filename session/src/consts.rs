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

//! Byte values of the TELNET protocol (RFC 854/855) and of the option
//! sub-protocols the engine decodes.

/// Interpret As Command.
pub const IAC: u8 = 255;
/// Don't use option.
pub const DONT: u8 = 254;
/// Do use option.
pub const DO: u8 = 253;
/// Won't use option.
pub const WONT: u8 = 252;
/// Will use option.
pub const WILL: u8 = 251;
/// Subnegotiation begin.
pub const SB: u8 = 250;
/// Go ahead.
pub const GA: u8 = 249;
/// Erase line.
pub const EL: u8 = 248;
/// Erase character.
pub const EC: u8 = 247;
/// Are you there.
pub const AYT: u8 = 246;
/// Abort output.
pub const AO: u8 = 245;
/// Interrupt process.
pub const IP: u8 = 244;
/// Break.
pub const BRK: u8 = 243;
/// Data mark.
pub const DM: u8 = 242;
/// No operation.
pub const NOP: u8 = 241;
/// Subnegotiation end.
pub const SE: u8 = 240;
/// End of record.
pub const EOR: u8 = 239;

/// Carriage return.
pub const CR: u8 = b'\r';
/// Line feed.
pub const LF: u8 = b'\n';
/// NUL byte; terminates ZMP arguments and follows a bare CR on the wire.
pub const NUL: u8 = 0;

/// Capacity ladder for the subnegotiation buffer. The last rung is a hard
/// ceiling: a larger frame is discarded with an overflow warning.
pub const SB_BUFFER_SIZES: [usize; 4] = [512, 2048, 8192, 16384];

/// Size of the stack buffer backing the formatted-send helpers. Longer
/// formatted output is truncated on the wire; the intended length is still
/// reported to the caller.
pub const FORMAT_BUFFER_SIZE: usize = 4096;

/// Registered TELNET option codes.
pub mod option {
    /// Binary transmission (RFC 856).
    pub const BINARY: u8 = 0;
    /// Echo (RFC 857).
    pub const ECHO: u8 = 1;
    /// Suppress go ahead (RFC 858).
    pub const SGA: u8 = 3;
    /// Status (RFC 859).
    pub const STATUS: u8 = 5;
    /// Timing mark (RFC 860).
    pub const TM: u8 = 6;
    /// Terminal type (RFC 1091).
    pub const TTYPE: u8 = 24;
    /// End of record (RFC 885).
    pub const EOR: u8 = 25;
    /// Negotiate about window size (RFC 1073).
    pub const NAWS: u8 = 31;
    /// Terminal speed (RFC 1079).
    pub const TSPEED: u8 = 32;
    /// Remote flow control (RFC 1372).
    pub const LFLOW: u8 = 33;
    /// Linemode (RFC 1184).
    pub const LINEMODE: u8 = 34;
    /// Environment option (RFC 1408).
    pub const ENVIRON: u8 = 36;
    /// Authentication (RFC 2941).
    pub const AUTHENTICATION: u8 = 37;
    /// Encryption (RFC 2946).
    pub const ENCRYPTION: u8 = 38;
    /// New environment option (RFC 1572).
    pub const NEW_ENVIRON: u8 = 39;
    /// Charset (RFC 2066).
    pub const CHARSET: u8 = 42;
    /// MUD Server Data Protocol.
    pub const MSDP: u8 = 69;
    /// MUD Server Status Protocol.
    pub const MSSP: u8 = 70;
    /// MUD Client Compression Protocol, version 1.
    pub const COMPRESS1: u8 = 85;
    /// MUD Client Compression Protocol, version 2.
    pub const COMPRESS2: u8 = 86;
    /// Zenith MUD Protocol.
    pub const ZMP: u8 = 93;
    /// Generic MUD Communication Protocol.
    pub const GMCP: u8 = 201;
    /// Extended options list (RFC 861).
    pub const EXOPL: u8 = 255;

    /// TTYPE subnegotiation verbs (RFC 1091).
    pub mod ttype {
        /// Terminal-type answer.
        pub const IS: u8 = 0;
        /// Terminal-type request.
        pub const SEND: u8 = 1;
    }

    /// ENVIRON / NEW-ENVIRON subnegotiation values (RFC 1408 / RFC 1572).
    pub mod environ {
        /// Values answer.
        pub const IS: u8 = 0;
        /// Values request.
        pub const SEND: u8 = 1;
        /// Unsolicited update.
        pub const INFO: u8 = 2;
        /// Well-known variable marker.
        pub const VAR: u8 = 0;
        /// Variable value marker.
        pub const VALUE: u8 = 1;
        /// Escape marker.
        pub const ESC: u8 = 2;
        /// User variable marker.
        pub const USERVAR: u8 = 3;
    }

    /// MSSP subnegotiation markers.
    pub mod mssp {
        /// Key marker.
        pub const VAR: u8 = 1;
        /// Value marker.
        pub const VAL: u8 = 2;
    }
}
