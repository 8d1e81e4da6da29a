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

//! Structured views over subnegotiation bodies. The receive pipeline runs
//! these decoders before emitting the subnegotiation event so hosts get an
//! argument vector for the sub-protocols the MUD ecosystem actually speaks;
//! everything else is delivered as the raw body.

/// ZMP argument vectors (telopt 93).
pub mod zmp;

/// Tag-segmented bodies: TTYPE, ENVIRON, NEW-ENVIRON and MSSP.
pub mod tagged;

/// MSSP key/value helpers (telopt 70).
pub mod mssp;

///
/// Decoded argument view riding along a
/// [`TelnetEvent::Subnegotiation`](crate::TelnetEvent::Subnegotiation)
/// event. All slices borrow from the engine's subnegotiation buffer and live
/// only for the duration of the sink callback.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubArgument<'a> {
    /// A ZMP command line: the NUL-separated arguments of the frame, with
    /// the terminating NULs stripped from the views.
    Zmp(Vec<&'a [u8]>),
    /// A tag-segmented body (TTYPE/ENVIRON/NEW-ENVIRON/MSSP): one element
    /// per tagged segment, each beginning with its tag byte (0..=3).
    Tagged(Vec<&'a [u8]>),
}

impl SubArgument<'_> {
    /// Number of decoded elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            SubArgument::Zmp(parts) | SubArgument::Tagged(parts) => parts.len(),
        }
    }

    /// Whether the argument vector is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
