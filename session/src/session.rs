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

use crate::args::mssp::MudServerStatus;
use crate::args::{tagged, zmp, SubArgument};
use crate::buffer::SubBuffer;
use crate::consts;
use crate::event::{EventSink, TelnetEvent};
use crate::options::{NegotiationVerb, OptionNegotiator, PolicyTable, QState, TelnetOption};
use crate::result::{SessionError, SessionResult};
use bytes::BytesMut;
use telwire_compress::{DeflateStream, InflateOutcome, InflateStream};
use tracing::warn;

/// Session feature flags, fixed at construction.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SessionFlags {
    /// Relay mode for inspection proxies. Inbound negotiations bypass the
    /// Q-Method and surface as bare events; outbound negotiation calls go on
    /// the wire verbatim; a relayed MCCP2 activation frame converts the send
    /// side to deflate after its SE byte.
    pub proxy: bool,
}

/// A per-connection TELNET protocol engine.
///
/// The session owns no socket and spawns no task: the host feeds raw inbound
/// bytes through [`TelnetSession::recv`] and delivers every
/// [`TelnetEvent::Send`] it is handed to the peer. All events are dispatched
/// synchronously, in source-stream order, before the call that produced them
/// returns.
///
/// A session is single-threaded; drive it from one place at a time. Dropping
/// it releases the negotiation table, the subnegotiation buffer and any
/// compression stream.
///
/// ```
/// use telwire_session::{PolicyTable, SessionFlags, TelnetEvent, TelnetOption, TelnetSession};
///
/// let policy = PolicyTable::new().allow_local(TelnetOption::TerminalType);
/// let mut session = TelnetSession::with_config(
///     |event: &mut TelnetEvent<'_>| {
///         if let TelnetEvent::Send(bytes) = event {
///             // hand `bytes` to the socket
///             let _ = bytes;
///         }
///     },
///     policy,
///     SessionFlags::default(),
/// );
/// // IAC DO TTYPE from the peer; the engine answers IAC WILL TTYPE.
/// session.recv(&[255, 253, 24]).unwrap();
/// assert!(session.local_enabled(TelnetOption::TerminalType));
/// ```
pub struct TelnetSession<S: EventSink> {
    sink: S,
    flags: SessionFlags,
    negotiator: OptionNegotiator,
    state: ReceiverState,
    sb: SubBuffer,
    stream: Option<StreamState>,
}

impl<S: EventSink> TelnetSession<S> {
    /// Creates a session with an all-deny policy table and default flags.
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, PolicyTable::new(), SessionFlags::default())
    }

    /// Creates a session with an explicit policy table and flags.
    pub fn with_config(sink: S, policy: PolicyTable, flags: SessionFlags) -> Self {
        TelnetSession {
            sink,
            flags,
            negotiator: OptionNegotiator::new(policy),
            state: ReceiverState::Data,
            sb: SubBuffer::new(),
            stream: None,
        }
    }

    /// The flags the session was created with.
    #[must_use]
    pub fn flags(&self) -> SessionFlags {
        self.flags
    }

    /// Borrows the event sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the session, returning the sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Whether `option` is currently enabled on our side.
    ///
    /// Always `false` in proxy mode, where no negotiation state is kept.
    #[must_use]
    pub fn local_enabled(&self, option: TelnetOption) -> bool {
        self.negotiator.local_enabled(option)
    }

    /// Whether `option` is currently enabled on the peer's side.
    #[must_use]
    pub fn remote_enabled(&self, option: TelnetOption) -> bool {
        self.negotiator.remote_enabled(option)
    }

    // #### Receive pipeline ##################################################

    /// Feeds inbound bytes from the peer through the engine.
    ///
    /// Chunks may split any protocol sequence at any boundary; the state
    /// machine resumes where the previous call left off. When MCCP2 is (or
    /// becomes) active, the chunk runs through the inflate stream first.
    ///
    /// # Errors
    ///
    /// Only fatal conditions are returned, currently an unrecoverable
    /// inflate failure; the matching [`TelnetEvent::Error`] is dispatched
    /// first. Recoverable peer mistakes surface as warnings and leave the
    /// session usable.
    pub fn recv(&mut self, bytes: &[u8]) -> SessionResult<()> {
        if matches!(self.stream, Some(StreamState::Inflate(_))) {
            return self.recv_spliced(bytes);
        }
        match self.process_chunk(bytes)? {
            None => Ok(()),
            Some(offset) => self.recv_spliced(&bytes[offset..]),
        }
    }

    /// Drives input through the inflate stream, re-entering the plain
    /// pipeline when the stream ends. A loop rather than recursion, so a
    /// peer stacking activation frames cannot grow the stack.
    fn recv_spliced(&mut self, input: &[u8]) -> SessionResult<()> {
        let mut source = SpliceSource::Borrowed(input);
        let mut start = 0usize;
        loop {
            let window_len = source.tail(start).len();
            if let Some(StreamState::Inflate(stream)) = self.stream.as_mut() {
                let mut plain = Vec::new();
                match stream.inflate(source.tail(start), &mut plain) {
                    Err(err) => {
                        self.stream = None;
                        let error = SessionError::Compression {
                            reason: err.to_string(),
                        };
                        warn!(%error, "inflate stream failed, session unrecoverable");
                        self.notify(TelnetEvent::Error(error.clone()));
                        return Err(error);
                    }
                    Ok(InflateOutcome::Consumed) => {
                        // An activation frame inside compressed data is
                        // rejected as double initialization, so this pass
                        // cannot splice again.
                        self.process_chunk(&plain)?;
                        return Ok(());
                    }
                    Ok(InflateOutcome::StreamEnd { trailing }) => {
                        // Decompressed bytes first, while the occupied
                        // stream slot still blocks re-activation.
                        self.process_chunk(&plain)?;
                        self.stream = None;
                        self.notify(TelnetEvent::Compress(false));
                        let tail = source.tail(start)[window_len - trailing..].to_vec();
                        source = SpliceSource::Owned(tail);
                        start = 0;
                    }
                }
            } else {
                if source.tail(start).is_empty() {
                    return Ok(());
                }
                match self.process_chunk(source.tail(start))? {
                    None => return Ok(()),
                    Some(offset) => start += offset,
                }
            }
        }
    }

    /// Advances the byte-granular state machine over one plain chunk.
    ///
    /// Returns `Some(offset)` when an MCCP2 activation completed at
    /// `offset`, meaning the rest of the chunk is compressed and must go
    /// back through [`TelnetSession::recv_spliced`].
    fn process_chunk(&mut self, data: &[u8]) -> SessionResult<Option<usize>> {
        let mut run_start = 0usize;
        let mut index = 0usize;
        while index < data.len() {
            let byte = data[index];
            match (self.state, byte) {
                (ReceiverState::Data, consts::IAC) => {
                    if index > run_start {
                        self.notify(TelnetEvent::Data(&data[run_start..index]));
                    }
                    self.state = ReceiverState::Iac;
                }
                (ReceiverState::Data, _) => {}
                (ReceiverState::Iac, consts::IAC) => {
                    // escaped 0xFF is one payload byte
                    self.notify(TelnetEvent::Data(&data[index..=index]));
                    self.state = ReceiverState::Data;
                    run_start = index + 1;
                }
                (ReceiverState::Iac, consts::SB) => {
                    self.state = ReceiverState::Sb;
                }
                (ReceiverState::Iac, consts::WILL) => {
                    self.state = ReceiverState::NegotiateWill;
                }
                (ReceiverState::Iac, consts::WONT) => {
                    self.state = ReceiverState::NegotiateWont;
                }
                (ReceiverState::Iac, consts::DO) => {
                    self.state = ReceiverState::NegotiateDo;
                }
                (ReceiverState::Iac, consts::DONT) => {
                    self.state = ReceiverState::NegotiateDont;
                }
                (ReceiverState::Iac, command) => {
                    self.state = ReceiverState::Data;
                    run_start = index + 1;
                    self.notify(TelnetEvent::Command(command));
                }
                (ReceiverState::NegotiateWill, code) => {
                    self.state = ReceiverState::Data;
                    run_start = index + 1;
                    self.receive_negotiation(NegotiationVerb::Will, TelnetOption::from(code))?;
                }
                (ReceiverState::NegotiateWont, code) => {
                    self.state = ReceiverState::Data;
                    run_start = index + 1;
                    self.receive_negotiation(NegotiationVerb::Wont, TelnetOption::from(code))?;
                }
                (ReceiverState::NegotiateDo, code) => {
                    self.state = ReceiverState::Data;
                    run_start = index + 1;
                    self.receive_negotiation(NegotiationVerb::Do, TelnetOption::from(code))?;
                }
                (ReceiverState::NegotiateDont, code) => {
                    self.state = ReceiverState::Data;
                    run_start = index + 1;
                    self.receive_negotiation(NegotiationVerb::Dont, TelnetOption::from(code))?;
                }
                (ReceiverState::Sb, code) => {
                    self.sb.reset();
                    self.state = ReceiverState::SbData(code);
                }
                (ReceiverState::SbData(code), consts::IAC) => {
                    self.state = ReceiverState::SbDataIac(code);
                }
                (ReceiverState::SbData(_), body_byte) => {
                    if let Err(error) = self.sb.push(body_byte) {
                        self.sb.reset();
                        self.state = ReceiverState::Data;
                        run_start = index + 1;
                        self.emit_warning(error);
                    }
                }
                (ReceiverState::SbDataIac(code), consts::IAC) => {
                    self.state = ReceiverState::SbData(code);
                    if let Err(error) = self.sb.push(consts::IAC) {
                        self.sb.reset();
                        self.state = ReceiverState::Data;
                        run_start = index + 1;
                        self.emit_warning(error);
                    }
                }
                (ReceiverState::SbDataIac(code), consts::SE) => {
                    self.state = ReceiverState::Data;
                    run_start = index + 1;
                    if self.dispatch_subnegotiation(code) {
                        return Ok(Some(index + 1));
                    }
                }
                (ReceiverState::SbDataIac(_), stray) => {
                    self.warn_protocol(
                        "unexpected byte after IAC inside subnegotiation",
                        Some(stray),
                    );
                    self.sb.reset();
                    self.state = ReceiverState::Iac;
                    // reinterpret this byte as a normal IAC command
                    continue;
                }
            }
            index += 1;
        }
        if matches!(self.state, ReceiverState::Data) && run_start < data.len() {
            self.notify(TelnetEvent::Data(&data[run_start..]));
        }
        Ok(None)
    }

    /// Runs the decoder for a completed `SB ... SE` frame and returns
    /// whether an inflate stream was just installed (the mid-chunk splice).
    fn dispatch_subnegotiation(&mut self, code: u8) -> bool {
        let option = TelnetOption::from(code);
        match option {
            TelnetOption::Compress2 => {
                {
                    let mut event = TelnetEvent::Subnegotiation {
                        option,
                        body: self.sb.bytes(),
                        argument: None,
                    };
                    self.sink.consume(&mut event);
                }
                if self.stream.is_some() {
                    self.emit_warning(SessionError::BadValue {
                        reason: "compression stream already initialized".into(),
                    });
                    return false;
                }
                self.stream = Some(StreamState::Inflate(InflateStream::new()));
                self.notify(TelnetEvent::Compress(true));
                true
            }
            TelnetOption::Zmp if !self.flags.proxy => {
                if let Some(argv) = zmp::parse(self.sb.bytes()) {
                    let mut event = TelnetEvent::Subnegotiation {
                        option,
                        body: self.sb.bytes(),
                        argument: Some(SubArgument::Zmp(argv)),
                    };
                    self.sink.consume(&mut event);
                } else {
                    self.warn_protocol("incomplete ZMP frame", None);
                    let mut event = TelnetEvent::Subnegotiation {
                        option,
                        body: self.sb.bytes(),
                        argument: None,
                    };
                    self.sink.consume(&mut event);
                }
                false
            }
            TelnetOption::TerminalType
            | TelnetOption::Environ
            | TelnetOption::NewEnviron
            | TelnetOption::Mssp
                if !self.flags.proxy =>
            {
                if let Some(parts) = tagged::parse(self.sb.bytes()) {
                    let mut event = TelnetEvent::Subnegotiation {
                        option,
                        body: self.sb.bytes(),
                        argument: Some(SubArgument::Tagged(parts)),
                    };
                    self.sink.consume(&mut event);
                } else {
                    self.warn_protocol("subnegotiation body does not start with a tag", None);
                    let mut event = TelnetEvent::Subnegotiation {
                        option,
                        body: self.sb.bytes(),
                        argument: None,
                    };
                    self.sink.consume(&mut event);
                }
                false
            }
            _ => {
                let mut event = TelnetEvent::Subnegotiation {
                    option,
                    body: self.sb.bytes(),
                    argument: None,
                };
                self.sink.consume(&mut event);
                false
            }
        }
    }

    // #### Option negotiator #################################################

    fn receive_negotiation(
        &mut self,
        verb: NegotiationVerb,
        option: TelnetOption,
    ) -> SessionResult<()> {
        if self.flags.proxy {
            // Pass-through: notify and nothing else; the host relays.
            match verb {
                NegotiationVerb::Will => self.notify(TelnetEvent::Will {
                    option,
                    accept: false,
                }),
                NegotiationVerb::Wont => self.notify(TelnetEvent::Wont { option }),
                NegotiationVerb::Do => self.notify(TelnetEvent::Do {
                    option,
                    accept: false,
                }),
                NegotiationVerb::Dont => self.notify(TelnetEvent::Dont { option }),
            }
            return Ok(());
        }
        match verb {
            NegotiationVerb::Will => self.receive_will(option),
            NegotiationVerb::Wont => self.receive_wont(option),
            NegotiationVerb::Do => self.receive_do(option),
            NegotiationVerb::Dont => self.receive_dont(option),
        }
    }

    /// Peer announces it will perform `option` (updates `him`).
    fn receive_will(&mut self, option: TelnetOption) -> SessionResult<()> {
        match self.negotiator.him(option) {
            QState::No => {
                let seeded = self.negotiator.policy().allows_remote(option);
                let sink_accept = self.notify_ask(TelnetEvent::Will {
                    option,
                    accept: seeded,
                });
                if seeded || sink_accept {
                    self.negotiator.set_him(option, QState::Yes);
                    self.transmit(&[consts::IAC, consts::DO, option.to_u8()])
                } else {
                    self.transmit(&[consts::IAC, consts::DONT, option.to_u8()])
                }
            }
            QState::Yes => Ok(()),
            QState::WantNo => {
                self.negotiator.set_him(option, QState::No);
                self.notify(TelnetEvent::Wont { option });
                self.warn_protocol("DONT answered by WILL", None);
                Ok(())
            }
            QState::WantNoOpposite => {
                self.negotiator.set_him(option, QState::Yes);
                self.notify(TelnetEvent::Will {
                    option,
                    accept: true,
                });
                self.warn_protocol("DONT answered by WILL", None);
                Ok(())
            }
            QState::WantYes => {
                self.negotiator.set_him(option, QState::Yes);
                self.notify(TelnetEvent::Will {
                    option,
                    accept: true,
                });
                Ok(())
            }
            QState::WantYesOpposite => {
                self.negotiator.set_him(option, QState::WantNo);
                self.transmit(&[consts::IAC, consts::DONT, option.to_u8()])?;
                self.notify(TelnetEvent::Will {
                    option,
                    accept: true,
                });
                Ok(())
            }
        }
    }

    /// Peer announces it won't perform `option` (updates `him`).
    fn receive_wont(&mut self, option: TelnetOption) -> SessionResult<()> {
        match self.negotiator.him(option) {
            QState::No => Ok(()),
            QState::Yes => {
                self.negotiator.set_him(option, QState::No);
                self.transmit(&[consts::IAC, consts::DONT, option.to_u8()])?;
                self.notify(TelnetEvent::Wont { option });
                Ok(())
            }
            QState::WantNo => {
                self.negotiator.set_him(option, QState::No);
                self.notify(TelnetEvent::Wont { option });
                Ok(())
            }
            QState::WantNoOpposite => {
                // Disable acknowledged; the queued enable goes out now.
                self.negotiator.set_him(option, QState::WantYes);
                self.transmit(&[consts::IAC, consts::DO, option.to_u8()])?;
                self.notify(TelnetEvent::Wont { option });
                Ok(())
            }
            QState::WantYes | QState::WantYesOpposite => {
                self.negotiator.set_him(option, QState::No);
                self.notify(TelnetEvent::Wont { option });
                Ok(())
            }
        }
    }

    /// Peer asks us to perform `option` (updates `us`).
    fn receive_do(&mut self, option: TelnetOption) -> SessionResult<()> {
        match self.negotiator.us(option) {
            QState::No => {
                let seeded = self.negotiator.policy().allows_local(option);
                let sink_accept = self.notify_ask(TelnetEvent::Do {
                    option,
                    accept: seeded,
                });
                if seeded || sink_accept {
                    self.negotiator.set_us(option, QState::Yes);
                    self.transmit(&[consts::IAC, consts::WILL, option.to_u8()])
                } else {
                    self.transmit(&[consts::IAC, consts::WONT, option.to_u8()])
                }
            }
            QState::Yes => Ok(()),
            QState::WantNo => {
                self.negotiator.set_us(option, QState::No);
                self.notify(TelnetEvent::Dont { option });
                self.warn_protocol("WONT answered by DO", None);
                Ok(())
            }
            QState::WantNoOpposite => {
                self.negotiator.set_us(option, QState::Yes);
                self.notify(TelnetEvent::Do {
                    option,
                    accept: true,
                });
                self.warn_protocol("WONT answered by DO", None);
                Ok(())
            }
            QState::WantYes => {
                self.negotiator.set_us(option, QState::Yes);
                self.notify(TelnetEvent::Do {
                    option,
                    accept: true,
                });
                Ok(())
            }
            QState::WantYesOpposite => {
                self.negotiator.set_us(option, QState::WantNo);
                self.transmit(&[consts::IAC, consts::WONT, option.to_u8()])?;
                self.notify(TelnetEvent::Do {
                    option,
                    accept: true,
                });
                Ok(())
            }
        }
    }

    /// Peer asks us not to perform `option` (updates `us`).
    fn receive_dont(&mut self, option: TelnetOption) -> SessionResult<()> {
        match self.negotiator.us(option) {
            QState::No => Ok(()),
            QState::Yes => {
                self.negotiator.set_us(option, QState::No);
                self.transmit(&[consts::IAC, consts::WONT, option.to_u8()])?;
                self.notify(TelnetEvent::Dont { option });
                Ok(())
            }
            QState::WantNo => {
                self.negotiator.set_us(option, QState::No);
                self.notify(TelnetEvent::Dont { option });
                Ok(())
            }
            QState::WantNoOpposite => {
                // Disable acknowledged; the queued enable goes out now.
                self.negotiator.set_us(option, QState::WantYes);
                self.transmit(&[consts::IAC, consts::WILL, option.to_u8()])?;
                self.notify(TelnetEvent::Dont { option });
                Ok(())
            }
            QState::WantYes | QState::WantYesOpposite => {
                self.negotiator.set_us(option, QState::No);
                self.notify(TelnetEvent::Dont { option });
                Ok(())
            }
        }
    }

    // #### Transmit pipeline #################################################

    /// Sends payload bytes, doubling embedded IAC bytes. Runs between
    /// escapes are delivered in single [`TelnetEvent::Send`] events.
    pub fn send_data(&mut self, bytes: &[u8]) -> SessionResult<()> {
        let mut start = 0usize;
        for (i, &byte) in bytes.iter().enumerate() {
            if byte == consts::IAC {
                self.transmit(&bytes[start..i])?;
                self.transmit(&[consts::IAC, consts::IAC])?;
                start = i + 1;
            }
        }
        self.transmit(&bytes[start..])
    }

    /// Sends a standalone `IAC <command>`.
    pub fn send_command(&mut self, command: u8) -> SessionResult<()> {
        self.transmit(&[consts::IAC, command])
    }

    /// Initiates (or answers) a negotiation for `option`.
    ///
    /// Outside proxy mode the request runs through the Q-Method: duplicates
    /// collapse to nothing on the wire and a request made while the opposite
    /// is in flight is queued, not sent. In proxy mode the three bytes go
    /// out verbatim.
    pub fn send_negotiate(
        &mut self,
        verb: NegotiationVerb,
        option: TelnetOption,
    ) -> SessionResult<()> {
        if self.flags.proxy {
            return self.transmit(&[consts::IAC, verb.byte(), option.to_u8()]);
        }
        if let Some(out) = self.negotiator.request(verb, option) {
            self.transmit(&[consts::IAC, out.byte(), option.to_u8()])?;
        }
        Ok(())
    }

    /// Sends the `IAC SB <option>` header of a subnegotiation. The body goes
    /// out through [`TelnetSession::send_data`], then
    /// [`TelnetSession::finish_subnegotiation`] closes the frame.
    pub fn begin_subnegotiation(&mut self, option: TelnetOption) -> SessionResult<()> {
        self.transmit(&[consts::IAC, consts::SB, option.to_u8()])
    }

    /// Sends the `IAC SE` trailer of a subnegotiation.
    pub fn finish_subnegotiation(&mut self) -> SessionResult<()> {
        self.transmit(&[consts::IAC, consts::SE])
    }

    /// Sends a complete subnegotiation frame with an IAC-escaped body.
    ///
    /// In proxy mode, relaying an MCCP2 activation frame installs the
    /// deflate stream once the SE byte is out; the frame itself is never
    /// compressed.
    pub fn subnegotiation(&mut self, option: TelnetOption, body: &[u8]) -> SessionResult<()> {
        self.begin_subnegotiation(option)?;
        self.send_data(body)?;
        self.finish_subnegotiation()?;
        if self.flags.proxy && option == TelnetOption::Compress2 {
            if self.stream.is_some() {
                self.emit_warning(SessionError::BadValue {
                    reason: "compression stream already initialized".into(),
                });
            } else {
                self.stream = Some(StreamState::Deflate(DeflateStream::new()));
                self.notify(TelnetEvent::Compress(true));
            }
        }
        Ok(())
    }

    /// Starts MCCP2 compression on the send side (server only).
    ///
    /// The five-byte activation marker is written to the sink directly; it
    /// must never pass through the compressor it announces. Everything sent
    /// afterwards is deflated.
    ///
    /// # Errors
    ///
    /// [`SessionError::BadValue`] when a compression stream already exists.
    pub fn begin_compress2(&mut self) -> SessionResult<()> {
        if self.stream.is_some() {
            return Err(SessionError::BadValue {
                reason: "compression stream already initialized".into(),
            });
        }
        let marker = [
            consts::IAC,
            consts::SB,
            consts::option::COMPRESS2,
            consts::IAC,
            consts::SE,
        ];
        let mut event = TelnetEvent::Send(&marker);
        self.sink.consume(&mut event);
        self.stream = Some(StreamState::Deflate(DeflateStream::new()));
        self.notify(TelnetEvent::Compress(true));
        Ok(())
    }

    /// Formatted send with TELNET line-ending translation: `\r` becomes
    /// `CR NUL`, `\n` becomes `CR LF`, and IAC bytes are doubled.
    ///
    /// Output longer than the internal format buffer is truncated on the
    /// wire; the returned count is the length the format call intended, so
    /// callers can detect the truncation.
    pub fn print(&mut self, args: std::fmt::Arguments<'_>) -> SessionResult<usize> {
        let mut buffer = FormatBuffer::new();
        // Infallible into a fixed buffer; overflow is tracked, not failed.
        let _ = std::fmt::write(&mut buffer, args);
        let text = buffer.as_bytes();
        let mut start = 0usize;
        for (i, &byte) in text.iter().enumerate() {
            match byte {
                consts::IAC => {
                    self.transmit(&text[start..i])?;
                    self.transmit(&[consts::IAC, consts::IAC])?;
                    start = i + 1;
                }
                consts::CR => {
                    self.transmit(&text[start..i])?;
                    self.transmit(&[consts::CR, consts::NUL])?;
                    start = i + 1;
                }
                consts::LF => {
                    self.transmit(&text[start..i])?;
                    self.transmit(&[consts::CR, consts::LF])?;
                    start = i + 1;
                }
                _ => {}
            }
        }
        self.transmit(&text[start..])?;
        Ok(buffer.intended())
    }

    /// Formatted send without line-ending translation; IAC bytes are still
    /// doubled. Returns the intended length, as [`TelnetSession::print`].
    pub fn print_raw(&mut self, args: std::fmt::Arguments<'_>) -> SessionResult<usize> {
        let mut buffer = FormatBuffer::new();
        let _ = std::fmt::write(&mut buffer, args);
        self.send_data(buffer.as_bytes())?;
        Ok(buffer.intended())
    }

    /// Sends a tag/value subnegotiation for TTYPE, ENVIRON, NEW-ENVIRON or
    /// MSSP: each pair goes out as its one-byte tag followed by the string
    /// bytes, with no terminator.
    pub fn format_sb(&mut self, option: TelnetOption, pairs: &[(u8, &str)]) -> SessionResult<()> {
        self.begin_subnegotiation(option)?;
        for (tag, value) in pairs {
            self.send_data(&[*tag])?;
            self.send_data(value.as_bytes())?;
        }
        self.finish_subnegotiation()
    }

    /// Sends a ZMP command frame: every argument is emitted in full,
    /// followed by one NUL terminator.
    pub fn send_zmp(&mut self, argv: &[&str]) -> SessionResult<()> {
        self.begin_subnegotiation(TelnetOption::Zmp)?;
        for argument in argv {
            self.send_data(argument.as_bytes())?;
            self.send_data(&[consts::NUL])?;
        }
        self.finish_subnegotiation()
    }

    /// Sends an MSSP status frame.
    pub fn send_mssp(&mut self, status: &MudServerStatus) -> SessionResult<()> {
        let mut body = BytesMut::with_capacity(status.encoded_len());
        status.encode(&mut body)?;
        self.subnegotiation(TelnetOption::Mssp, &body)
    }

    /// Emits wire bytes, routing through the deflate stream when one is
    /// active. Empty slices are dropped so escape handling never produces
    /// zero-length `Send` events.
    fn transmit(&mut self, bytes: &[u8]) -> SessionResult<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        if let Some(StreamState::Deflate(stream)) = self.stream.as_mut() {
            let mut compressed = Vec::new();
            match stream.compress(bytes, &mut compressed) {
                Ok(()) => {
                    if !compressed.is_empty() {
                        let mut event = TelnetEvent::Send(&compressed);
                        self.sink.consume(&mut event);
                    }
                    Ok(())
                }
                Err(err) => {
                    self.stream = None;
                    let error = SessionError::Compression {
                        reason: err.to_string(),
                    };
                    warn!(%error, "deflate stream failed");
                    self.notify(TelnetEvent::Error(error.clone()));
                    Err(error)
                }
            }
        } else {
            let mut event = TelnetEvent::Send(bytes);
            self.sink.consume(&mut event);
            Ok(())
        }
    }

    // #### Event plumbing ####################################################

    fn notify(&mut self, mut event: TelnetEvent<'_>) {
        self.sink.consume(&mut event);
    }

    /// Dispatches a `Will`/`Do` question and reports whether the sink set
    /// the accept flag.
    fn notify_ask(&mut self, mut event: TelnetEvent<'_>) -> bool {
        self.sink.consume(&mut event);
        matches!(
            event,
            TelnetEvent::Will { accept: true, .. } | TelnetEvent::Do { accept: true, .. }
        )
    }

    fn emit_warning(&mut self, error: SessionError) {
        warn!(%error, "telnet session warning");
        self.notify(TelnetEvent::Warning(error));
    }

    fn warn_protocol(&mut self, reason: &str, byte: Option<u8>) {
        self.emit_warning(SessionError::Protocol {
            reason: reason.to_string(),
            byte,
        });
    }
}

impl<S: EventSink> std::fmt::Debug for TelnetSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetSession")
            .field("flags", &self.flags)
            .field("state", &self.state)
            .field("sb_len", &self.sb.len())
            .field("stream", &self.stream)
            .finish_non_exhaustive()
    }
}

/// Where the bytes of the current splice pass come from: the caller's chunk,
/// or an owned tail captured after an in-chunk stream end.
enum SpliceSource<'a> {
    Borrowed(&'a [u8]),
    Owned(Vec<u8>),
}

impl SpliceSource<'_> {
    fn tail(&self, start: usize) -> &[u8] {
        match self {
            SpliceSource::Borrowed(bytes) => &bytes[start..],
            SpliceSource::Owned(bytes) => &bytes[start..],
        }
    }
}

/// The single active compression stream; direction is fixed for the rest of
/// the session once installed.
#[derive(Debug)]
enum StreamState {
    Deflate(DeflateStream),
    Inflate(InflateStream),
}

///
/// Receiver state, advanced one byte at a time.
///
/// - `Data`: copying payload bytes.
/// - `Iac`: one 0xFF seen; the next byte is a command.
/// - `NegotiateWill`/`NegotiateWont`/`NegotiateDo`/`NegotiateDont`: awaiting
///   the option byte of a negotiation.
/// - `Sb`: awaiting the option byte that names the subnegotiation.
/// - `SbData(option)`: accumulating the subnegotiation body.
/// - `SbDataIac(option)`: a 0xFF inside the body; the next byte is SE (end
///   of frame), IAC (escaped body byte), or a protocol error.
///
#[derive(Clone, Copy, Debug)]
enum ReceiverState {
    Data,
    Iac,
    NegotiateWill,
    NegotiateWont,
    NegotiateDo,
    NegotiateDont,
    Sb,
    SbData(u8),
    SbDataIac(u8),
}

/// Fixed-size formatting target for the `print` helpers. Overflowing writes
/// are truncated while the intended length keeps counting.
struct FormatBuffer {
    data: [u8; consts::FORMAT_BUFFER_SIZE],
    len: usize,
    intended: usize,
}

impl FormatBuffer {
    fn new() -> Self {
        FormatBuffer {
            data: [0; consts::FORMAT_BUFFER_SIZE],
            len: 0,
            intended: 0,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    fn intended(&self) -> usize {
        self.intended
    }
}

impl std::fmt::Write for FormatBuffer {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.intended += s.len();
        let room = self.data.len() - self.len;
        let take = room.min(s.len());
        self.data[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}
