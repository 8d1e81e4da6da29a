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

///
/// [Telnet options](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml)
/// the engine can name. Codes without a variant round-trip through
/// [`TelnetOption::Unknown`]; the engine negotiates and frames them like any
/// other option, it just cannot decode their subnegotiation bodies.
///
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetOption {
    /// [`consts::option::BINARY`] Binary transmission [RFC856](https://tools.ietf.org/html/rfc856)
    TransmitBinary,
    /// [`consts::option::ECHO`] Echo [RFC857](https://tools.ietf.org/html/rfc857)
    Echo,
    /// [`consts::option::SGA`] Suppress go ahead [RFC858](https://tools.ietf.org/html/rfc858)
    SuppressGoAhead,
    /// [`consts::option::STATUS`] Status [RFC859](https://tools.ietf.org/html/rfc859)
    Status,
    /// [`consts::option::TM`] Timing mark [RFC860](https://tools.ietf.org/html/rfc860)
    TimingMark,
    /// [`consts::option::TTYPE`] Terminal type [RFC1091](https://tools.ietf.org/html/rfc1091)
    TerminalType,
    /// [`consts::option::EOR`] End of record [RFC885](https://tools.ietf.org/html/rfc885)
    EndOfRecord,
    /// [`consts::option::NAWS`] Negotiate about window size [RFC1073](https://tools.ietf.org/html/rfc1073)
    WindowSize,
    /// [`consts::option::TSPEED`] Terminal speed [RFC1079](https://tools.ietf.org/html/rfc1079)
    TerminalSpeed,
    /// [`consts::option::LFLOW`] Remote flow control [RFC1372](https://tools.ietf.org/html/rfc1372)
    FlowControl,
    /// [`consts::option::LINEMODE`] Linemode [RFC1184](https://tools.ietf.org/html/rfc1184)
    Linemode,
    /// [`consts::option::ENVIRON`] Environment [RFC1408](https://tools.ietf.org/html/rfc1408)
    Environ,
    /// [`consts::option::AUTHENTICATION`] Authentication [RFC2941](https://tools.ietf.org/html/rfc2941)
    Authentication,
    /// [`consts::option::ENCRYPTION`] Encryption [RFC2946](https://tools.ietf.org/html/rfc2946)
    Encryption,
    /// [`consts::option::NEW_ENVIRON`] New environment [RFC1572](https://tools.ietf.org/html/rfc1572)
    NewEnviron,
    /// [`consts::option::CHARSET`] Charset [RFC2066](https://tools.ietf.org/html/rfc2066)
    Charset,
    /// [`consts::option::MSDP`] MUD Server Data Protocol
    Msdp,
    /// [`consts::option::MSSP`] MUD Server Status Protocol
    Mssp,
    /// [`consts::option::COMPRESS1`] MUD client compression, version 1
    Compress1,
    /// [`consts::option::COMPRESS2`] MUD client compression, version 2
    Compress2,
    /// [`consts::option::ZMP`] Zenith MUD Protocol
    Zmp,
    /// [`consts::option::GMCP`] Generic MUD Communication Protocol
    Gmcp,
    /// [`consts::option::EXOPL`] Extended options list [RFC861](https://tools.ietf.org/html/rfc861)
    Exopl,
    /// Any other option code.
    Unknown(u8),
}

impl TelnetOption {
    /// Returns the wire code for this option.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        match self {
            TelnetOption::TransmitBinary => consts::option::BINARY,
            TelnetOption::Echo => consts::option::ECHO,
            TelnetOption::SuppressGoAhead => consts::option::SGA,
            TelnetOption::Status => consts::option::STATUS,
            TelnetOption::TimingMark => consts::option::TM,
            TelnetOption::TerminalType => consts::option::TTYPE,
            TelnetOption::EndOfRecord => consts::option::EOR,
            TelnetOption::WindowSize => consts::option::NAWS,
            TelnetOption::TerminalSpeed => consts::option::TSPEED,
            TelnetOption::FlowControl => consts::option::LFLOW,
            TelnetOption::Linemode => consts::option::LINEMODE,
            TelnetOption::Environ => consts::option::ENVIRON,
            TelnetOption::Authentication => consts::option::AUTHENTICATION,
            TelnetOption::Encryption => consts::option::ENCRYPTION,
            TelnetOption::NewEnviron => consts::option::NEW_ENVIRON,
            TelnetOption::Charset => consts::option::CHARSET,
            TelnetOption::Msdp => consts::option::MSDP,
            TelnetOption::Mssp => consts::option::MSSP,
            TelnetOption::Compress1 => consts::option::COMPRESS1,
            TelnetOption::Compress2 => consts::option::COMPRESS2,
            TelnetOption::Zmp => consts::option::ZMP,
            TelnetOption::Gmcp => consts::option::GMCP,
            TelnetOption::Exopl => consts::option::EXOPL,
            TelnetOption::Unknown(byte) => byte,
        }
    }

    /// Classifies a wire code.
    #[must_use]
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            consts::option::BINARY => TelnetOption::TransmitBinary,
            consts::option::ECHO => TelnetOption::Echo,
            consts::option::SGA => TelnetOption::SuppressGoAhead,
            consts::option::STATUS => TelnetOption::Status,
            consts::option::TM => TelnetOption::TimingMark,
            consts::option::TTYPE => TelnetOption::TerminalType,
            consts::option::EOR => TelnetOption::EndOfRecord,
            consts::option::NAWS => TelnetOption::WindowSize,
            consts::option::TSPEED => TelnetOption::TerminalSpeed,
            consts::option::LFLOW => TelnetOption::FlowControl,
            consts::option::LINEMODE => TelnetOption::Linemode,
            consts::option::ENVIRON => TelnetOption::Environ,
            consts::option::AUTHENTICATION => TelnetOption::Authentication,
            consts::option::ENCRYPTION => TelnetOption::Encryption,
            consts::option::NEW_ENVIRON => TelnetOption::NewEnviron,
            consts::option::CHARSET => TelnetOption::Charset,
            consts::option::MSDP => TelnetOption::Msdp,
            consts::option::MSSP => TelnetOption::Mssp,
            consts::option::COMPRESS1 => TelnetOption::Compress1,
            consts::option::COMPRESS2 => TelnetOption::Compress2,
            consts::option::ZMP => TelnetOption::Zmp,
            consts::option::GMCP => TelnetOption::Gmcp,
            consts::option::EXOPL => TelnetOption::Exopl,
            byte => TelnetOption::Unknown(byte),
        }
    }
}

impl std::fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetOption::Unknown(code) => write!(f, "Unknown({code})"),
            other => write!(f, "{other:?}"),
        }
    }
}

impl From<u8> for TelnetOption {
    fn from(byte: u8) -> Self {
        Self::from_u8(byte)
    }
}

impl From<TelnetOption> for u8 {
    fn from(option: TelnetOption) -> Self {
        option.to_u8()
    }
}

///
/// The four option-negotiation verbs of RFC 855.
///
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NegotiationVerb {
    /// We offer to enable an option on our side.
    Will,
    /// We refuse or disable an option on our side.
    Wont,
    /// We ask the peer to enable an option on its side.
    Do,
    /// We ask the peer to disable an option on its side.
    Dont,
}

impl NegotiationVerb {
    /// Returns the wire byte for this verb.
    #[must_use]
    pub fn byte(self) -> u8 {
        match self {
            NegotiationVerb::Will => consts::WILL,
            NegotiationVerb::Wont => consts::WONT,
            NegotiationVerb::Do => consts::DO,
            NegotiationVerb::Dont => consts::DONT,
        }
    }
}

impl std::fmt::Display for NegotiationVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NegotiationVerb::Will => write!(f, "WILL"),
            NegotiationVerb::Wont => write!(f, "WONT"),
            NegotiationVerb::Do => write!(f, "DO"),
            NegotiationVerb::Dont => write!(f, "DONT"),
        }
    }
}

///
/// Host policy for peer-initiated negotiations: for each option, whether the
/// engine may answer `DO` with `WILL` (local side) and `WILL` with `DO`
/// (remote side). Options absent from the table are refused unless the sink
/// overrides the decision on the notification event.
///
/// ```
/// use telwire_session::{PolicyTable, TelnetOption};
///
/// let policy = PolicyTable::new()
///     .allow_local(TelnetOption::TerminalType)
///     .allow(TelnetOption::Compress2);
/// assert!(policy.allows_local(TelnetOption::TerminalType));
/// assert!(!policy.allows_remote(TelnetOption::TerminalType));
/// ```
#[derive(Clone, Debug)]
pub struct PolicyTable {
    entries: [OptionPolicy; 256],
}

#[derive(Clone, Copy, Debug, Default)]
struct OptionPolicy {
    local: bool,
    remote: bool,
}

impl PolicyTable {
    /// Creates a table that refuses every option on both sides.
    #[must_use]
    pub fn new() -> Self {
        PolicyTable {
            entries: [OptionPolicy::default(); 256],
        }
    }

    /// Allows the local side of `option`: a peer `DO` is answered `WILL`.
    #[must_use]
    pub fn allow_local(mut self, option: TelnetOption) -> Self {
        self.entries[option.to_u8() as usize].local = true;
        self
    }

    /// Allows the remote side of `option`: a peer `WILL` is answered `DO`.
    #[must_use]
    pub fn allow_remote(mut self, option: TelnetOption) -> Self {
        self.entries[option.to_u8() as usize].remote = true;
        self
    }

    /// Allows both sides of `option`.
    #[must_use]
    pub fn allow(self, option: TelnetOption) -> Self {
        self.allow_local(option).allow_remote(option)
    }

    /// Whether the local side of `option` is allowed.
    #[must_use]
    pub fn allows_local(&self, option: TelnetOption) -> bool {
        self.entries[option.to_u8() as usize].local
    }

    /// Whether the remote side of `option` is allowed.
    #[must_use]
    pub fn allows_remote(&self, option: TelnetOption) -> bool {
        self.entries[option.to_u8() as usize].remote
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::new()
    }
}

/// RFC 1143 per-side negotiation state.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) enum QState {
    /// Option is off and nothing is pending.
    #[default]
    No,
    /// We sent a disable request and await the acknowledgment.
    WantNo,
    /// Disable pending, with an enable request queued behind it.
    WantNoOpposite,
    /// Option is on.
    Yes,
    /// We sent an enable request and await the acknowledgment.
    WantYes,
    /// Enable pending, with a disable request queued behind it.
    WantYesOpposite,
}

#[derive(Clone, Copy, Debug, Default)]
struct OptionState {
    us: QState,
    him: QState,
}

///
/// Per-session RFC 1143 state for both sides of every option, plus the host
/// policy table. The inbound half of the Q-Method lives in the session (it
/// has to interleave event dispatch); this type owns the state storage and
/// the host-initiated request transitions.
///
#[derive(Clone, Debug)]
pub(crate) struct OptionNegotiator {
    policy: PolicyTable,
    state: [OptionState; 256],
}

impl OptionNegotiator {
    pub(crate) fn new(policy: PolicyTable) -> Self {
        OptionNegotiator {
            policy,
            state: [OptionState::default(); 256],
        }
    }

    pub(crate) fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    pub(crate) fn us(&self, option: TelnetOption) -> QState {
        self.state[option.to_u8() as usize].us
    }

    pub(crate) fn him(&self, option: TelnetOption) -> QState {
        self.state[option.to_u8() as usize].him
    }

    pub(crate) fn set_us(&mut self, option: TelnetOption, state: QState) {
        self.state[option.to_u8() as usize].us = state;
    }

    pub(crate) fn set_him(&mut self, option: TelnetOption, state: QState) {
        self.state[option.to_u8() as usize].him = state;
    }

    /// Whether the option is enabled on our side.
    pub(crate) fn local_enabled(&self, option: TelnetOption) -> bool {
        matches!(
            self.us(option),
            QState::Yes | QState::WantNo | QState::WantNoOpposite
        )
    }

    /// Whether the option is enabled on the peer's side.
    pub(crate) fn remote_enabled(&self, option: TelnetOption) -> bool {
        matches!(
            self.him(option),
            QState::Yes | QState::WantNo | QState::WantNoOpposite
        )
    }

    /// Applies a host-initiated negotiation request and returns the verb to
    /// put on the wire, if any.
    ///
    /// Duplicate requests collapse to nothing, and a request made while the
    /// opposite request is in flight is queued via the `-Opposite` states
    /// instead of being sent; the queued verb goes out when the pending
    /// exchange resolves.
    pub(crate) fn request(
        &mut self,
        verb: NegotiationVerb,
        option: TelnetOption,
    ) -> Option<NegotiationVerb> {
        let index = option.to_u8() as usize;
        match verb {
            NegotiationVerb::Will => match self.state[index].us {
                QState::No => {
                    self.state[index].us = QState::WantYes;
                    Some(NegotiationVerb::Will)
                }
                QState::WantNo => {
                    self.state[index].us = QState::WantNoOpposite;
                    None
                }
                QState::WantYesOpposite => {
                    self.state[index].us = QState::WantYes;
                    None
                }
                QState::Yes | QState::WantYes | QState::WantNoOpposite => None,
            },
            NegotiationVerb::Wont => match self.state[index].us {
                QState::Yes => {
                    self.state[index].us = QState::WantNo;
                    Some(NegotiationVerb::Wont)
                }
                QState::WantYes => {
                    self.state[index].us = QState::WantYesOpposite;
                    None
                }
                QState::WantNoOpposite => {
                    self.state[index].us = QState::WantNo;
                    None
                }
                QState::No | QState::WantNo | QState::WantYesOpposite => None,
            },
            NegotiationVerb::Do => match self.state[index].him {
                QState::No => {
                    self.state[index].him = QState::WantYes;
                    Some(NegotiationVerb::Do)
                }
                QState::WantNo => {
                    self.state[index].him = QState::WantNoOpposite;
                    None
                }
                QState::WantYesOpposite => {
                    self.state[index].him = QState::WantYes;
                    None
                }
                QState::Yes | QState::WantYes | QState::WantNoOpposite => None,
            },
            NegotiationVerb::Dont => match self.state[index].him {
                QState::Yes => {
                    self.state[index].him = QState::WantNo;
                    Some(NegotiationVerb::Dont)
                }
                QState::WantYes => {
                    self.state[index].him = QState::WantYesOpposite;
                    None
                }
                QState::WantNoOpposite => {
                    self.state[index].him = QState::WantNo;
                    None
                }
                QState::No | QState::WantNo | QState::WantYesOpposite => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPT: TelnetOption = TelnetOption::TransmitBinary;

    #[test]
    fn option_code_round_trip() {
        for code in 0..=255u8 {
            assert_eq!(TelnetOption::from_u8(code).to_u8(), code);
        }
    }

    #[test]
    fn policy_defaults_to_deny() {
        let policy = PolicyTable::new();
        assert!(!policy.allows_local(TelnetOption::Echo));
        assert!(!policy.allows_remote(TelnetOption::Echo));
    }

    #[test]
    fn policy_sides_are_independent() {
        let policy = PolicyTable::new().allow_remote(TelnetOption::Compress2);
        assert!(!policy.allows_local(TelnetOption::Compress2));
        assert!(policy.allows_remote(TelnetOption::Compress2));
    }

    #[test]
    fn request_will_from_idle_sends_and_arms() {
        let mut neg = OptionNegotiator::new(PolicyTable::new());
        assert_eq!(neg.request(NegotiationVerb::Will, OPT), Some(NegotiationVerb::Will));
        assert_eq!(neg.us(OPT), QState::WantYes);
        assert!(!neg.local_enabled(OPT));
    }

    #[test]
    fn duplicate_request_collapses_to_nothing() {
        let mut neg = OptionNegotiator::new(PolicyTable::new());
        neg.request(NegotiationVerb::Will, OPT);
        assert_eq!(neg.request(NegotiationVerb::Will, OPT), None);
        assert_eq!(neg.us(OPT), QState::WantYes);
    }

    #[test]
    fn opposite_request_queues_instead_of_sending() {
        let mut neg = OptionNegotiator::new(PolicyTable::new());
        neg.set_us(OPT, QState::Yes);
        assert_eq!(neg.request(NegotiationVerb::Wont, OPT), Some(NegotiationVerb::Wont));
        assert_eq!(neg.us(OPT), QState::WantNo);
        // Re-enable while the disable is still in flight: nothing on the
        // wire, intent queued.
        assert_eq!(neg.request(NegotiationVerb::Will, OPT), None);
        assert_eq!(neg.us(OPT), QState::WantNoOpposite);
    }

    #[test]
    fn queued_request_can_be_cancelled() {
        let mut neg = OptionNegotiator::new(PolicyTable::new());
        neg.set_us(OPT, QState::WantNoOpposite);
        assert_eq!(neg.request(NegotiationVerb::Wont, OPT), None);
        assert_eq!(neg.us(OPT), QState::WantNo);
    }

    #[test]
    fn remote_side_mirrors_local_side() {
        let mut neg = OptionNegotiator::new(PolicyTable::new());
        assert_eq!(neg.request(NegotiationVerb::Do, OPT), Some(NegotiationVerb::Do));
        assert_eq!(neg.him(OPT), QState::WantYes);
        assert_eq!(neg.request(NegotiationVerb::Dont, OPT), None);
        assert_eq!(neg.him(OPT), QState::WantYesOpposite);
    }

    #[test]
    fn enabled_follows_current_agreement_not_pending_intent() {
        let mut neg = OptionNegotiator::new(PolicyTable::new());
        neg.set_us(OPT, QState::Yes);
        neg.request(NegotiationVerb::Wont, OPT);
        // Disable requested but not yet acknowledged: still enabled.
        assert!(neg.local_enabled(OPT));
        neg.set_us(OPT, QState::No);
        assert!(!neg.local_enabled(OPT));
    }
}
