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

//! # Telwire TELNET Session Engine
//!
//! This crate implements the TELNET protocol (RFC 854) as a per-connection
//! session engine: a state machine that turns raw network bytes into
//! protocol events and host intent into wire-correct output, without ever
//! touching a socket. It covers option negotiation (RFC 855) driven by the
//! RFC 1143 "Q Method", and the option sub-protocols common around MUD
//! servers: TTYPE (RFC 1091), ENVIRON and NEW-ENVIRON (RFC 1408/1572), MSSP,
//! MCCP2 stream compression (telopt 86) and ZMP (telopt 93).
//!
//! ## Core Components
//!
//! ### [`TelnetSession`]
//!
//! The session object. The host feeds inbound bytes through
//! [`TelnetSession::recv`] and calls the `send_*` operations for outbound
//! intent; everything the engine has to say comes back synchronously through
//! the host's [`EventSink`].
//!
//! ### [`TelnetEvent`]
//!
//! The event vocabulary: extracted payload ([`TelnetEvent::Data`]), bytes to
//! put on the wire ([`TelnetEvent::Send`]), negotiation notifications with a
//! writable accept flag, decoded subnegotiations, compression state changes
//! and diagnostics.
//!
//! ### [`PolicyTable`]
//!
//! Which options the engine may accept when the peer initiates. Anything not
//! allowed by the table can still be granted per-event by the sink; with
//! neither, the engine refuses — and the RFC 1143 state machine guarantees
//! the refusal cannot loop.
//!
//! ## Usage Example
//!
//! ```rust
//! use telwire_session::{
//!     PolicyTable, SessionFlags, TelnetEvent, TelnetOption, TelnetSession,
//! };
//!
//! let policy = PolicyTable::new()
//!     .allow_local(TelnetOption::TerminalType)
//!     .allow_remote(TelnetOption::Compress2);
//!
//! let mut wire_out = Vec::new();
//! let mut session = TelnetSession::with_config(
//!     |event: &mut TelnetEvent<'_>| match event {
//!         TelnetEvent::Send(bytes) => wire_out.extend_from_slice(bytes),
//!         TelnetEvent::Data(bytes) => println!("peer says: {bytes:?}"),
//!         _ => {}
//!     },
//!     policy,
//!     SessionFlags::default(),
//! );
//!
//! // IAC DO TTYPE from the peer; the engine agrees with IAC WILL TTYPE.
//! session.recv(&[0xFF, 0xFD, 0x18]).unwrap();
//! # assert_eq!(wire_out, vec![0xFF, 0xFB, 0x18]);
//! ```
//!
//! ## Protocol Details
//!
//! All commands start with the IAC byte (0xFF): two-byte commands
//! (`IAC NOP`), three-byte negotiations (`IAC WILL <option>`), and framed
//! subnegotiations (`IAC SB <option> ... IAC SE`). A literal 0xFF in payload
//! is transmitted doubled, in data and in subnegotiation bodies alike; the
//! engine performs both directions of that escaping.
//!
//! When MCCP2 is confirmed, every byte after the activation frame's SE is
//! zlib-compressed. The receive pipeline splices its inflate stream into the
//! middle of the current chunk, and the transmit pipeline routes everything
//! after [`TelnetSession::begin_compress2`] through deflate; the activation
//! marker itself always travels uncompressed.
//!
//! ## Concurrency
//!
//! A session is a plain single-threaded value: no locks, no I/O, no
//! blocking. Events are dispatched inline and in source order. Distinct
//! sessions are independent and may live on different threads.

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod args;
mod buffer;
pub mod consts;
mod event;
mod options;
mod result;
mod session;

pub use self::args::{mssp, tagged, zmp, SubArgument};
pub use self::event::{EventSink, TelnetEvent};
pub use self::options::{NegotiationVerb, PolicyTable, TelnetOption};
pub use self::result::{SessionError, SessionResult};
pub use self::session::{SessionFlags, TelnetSession};
