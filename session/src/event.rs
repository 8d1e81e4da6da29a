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

use crate::args::SubArgument;
use crate::options::TelnetOption;
use crate::result::SessionError;

///
/// `TelnetEvent` is everything the session engine tells its host: payload
/// bytes extracted from the inbound stream, wire bytes the host must deliver
/// to the peer, negotiation notifications, completed subnegotiations, and
/// diagnostics. Payload slices borrow from the engine's working buffers and
/// are valid only for the duration of the sink callback.
///
#[derive(Debug, PartialEq)]
pub enum TelnetEvent<'a> {
    /// Payload bytes extracted from the inbound stream, IAC-unescaped.
    Data(&'a [u8]),
    /// Wire bytes the engine wants transmitted. The host must deliver them
    /// to the peer exactly as given.
    Send(&'a [u8]),
    /// A standalone `IAC <cmd>` was received, for commands that carry no
    /// option byte (NOP, GA, AYT, ...).
    Command(u8),
    /// The peer offers to enable an option on its side.
    ///
    /// `accept` is writable: it is pre-seeded from the session policy table
    /// and the sink may set it before returning. The option is enabled when
    /// either the table or the sink allows it. The flag only matters while
    /// the option is idle; for confirmations and refusals this is a pure
    /// notification.
    Will {
        /// The option being negotiated.
        option: TelnetOption,
        /// Writable accept flag, see above.
        accept: bool,
    },
    /// The peer refuses or disables an option on its side.
    Wont {
        /// The option being negotiated.
        option: TelnetOption,
    },
    /// The peer asks us to enable an option on our side. `accept` behaves as
    /// in [`TelnetEvent::Will`].
    Do {
        /// The option being negotiated.
        option: TelnetOption,
        /// Writable accept flag.
        accept: bool,
    },
    /// The peer asks us to disable an option on our side.
    Dont {
        /// The option being negotiated.
        option: TelnetOption,
    },
    /// A complete `IAC SB ... IAC SE` frame was received. For the recognized
    /// option sub-protocols the decoded argument vector rides along.
    Subnegotiation {
        /// The option the frame belongs to.
        option: TelnetOption,
        /// The raw body with IAC escapes already collapsed.
        body: &'a [u8],
        /// Decoded argument view for known sub-protocols.
        argument: Option<SubArgument<'a>>,
    },
    /// Compression was enabled (`true`) or disabled (`false`).
    Compress(bool),
    /// A recoverable problem. The session remains usable.
    Warning(SessionError),
    /// A fatal problem. The session should be dropped.
    Error(SessionError),
}

///
/// Host-supplied consumer for session events, invoked synchronously from
/// within engine calls. A sink must not call back into the same session with
/// a mutating operation while an event is being dispatched; queue such work
/// and run it after the engine call returns.
///
pub trait EventSink {
    /// Consumes one event. The mutable reference exists so the sink can set
    /// the `accept` flag on [`TelnetEvent::Will`] / [`TelnetEvent::Do`].
    fn consume(&mut self, event: &mut TelnetEvent<'_>);
}

impl<F> EventSink for F
where
    F: FnMut(&mut TelnetEvent<'_>),
{
    fn consume(&mut self, event: &mut TelnetEvent<'_>) {
        self(event);
    }
}
