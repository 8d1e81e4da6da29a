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

//! Tag-segmented subnegotiation bodies.
//!
//! TTYPE (RFC 1091), ENVIRON (RFC 1408), NEW-ENVIRON (RFC 1572) and MSSP all
//! share one shape: a sequence of one-byte tags in `0..=3`, each followed by
//! payload bytes running to the next tag or the end of the body. ENVIRON ESC
//! (2) sequences are not decoded; escaped bytes stay literal inside their
//! segment.

/// Highest byte value that acts as a segment tag.
const MAX_TAG: u8 = 3;

/// Splits a tag-segmented body into its segments.
///
/// Each returned element starts with its tag byte. Returns `None` when the
/// body is empty or does not begin with a tag, in which case the caller
/// falls back to the raw body.
#[must_use]
pub fn parse(body: &[u8]) -> Option<Vec<&[u8]>> {
    if *body.first()? > MAX_TAG {
        return None;
    }
    let mut parts = Vec::new();
    let mut start = 0usize;
    for (i, &byte) in body.iter().enumerate().skip(1) {
        if byte <= MAX_TAG {
            parts.push(&body[start..i]);
            start = i;
        }
    }
    parts.push(&body[start..]);
    Some(parts)
}

/// Splits a segment into its tag byte and payload.
#[must_use]
pub fn split_tag(segment: &[u8]) -> (u8, &[u8]) {
    match segment.split_first() {
        Some((&tag, payload)) => (tag, payload),
        None => (0, segment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::option::{environ, ttype};

    #[test]
    fn ttype_is_answer_is_one_segment() {
        let body = b"\x00xterm-256color";
        let parts = parse(body).expect("well-formed body");
        assert_eq!(parts, vec![&body[..]]);
        let (tag, payload) = split_tag(parts[0]);
        assert_eq!(tag, ttype::IS);
        assert_eq!(payload, b"xterm-256color");
    }

    #[test]
    fn ttype_send_request_is_a_bare_tag() {
        let parts = parse(&[ttype::SEND]).expect("well-formed body");
        assert_eq!(parts, vec![&[ttype::SEND][..]]);
    }

    #[test]
    fn environ_pairs_split_at_every_tag() {
        // IS VAR "USER" VALUE "grim"
        let body = b"\x00\x00USER\x01grim";
        let parts = parse(body).expect("well-formed body");
        assert_eq!(
            parts,
            vec![&[environ::IS][..], &b"\x00USER"[..], &b"\x01grim"[..]]
        );
    }

    #[test]
    fn escaped_bytes_stay_literal() {
        // An ESC tag splits like any other; no unescaping is attempted.
        let body = b"\x00\x00A\x02\x01B";
        let parts = parse(body).expect("well-formed body");
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[2], &[environ::ESC][..]);
    }

    #[test]
    fn leading_payload_byte_is_malformed() {
        assert_eq!(parse(b"xterm"), None);
    }

    #[test]
    fn empty_body_is_malformed() {
        assert_eq!(parse(b""), None);
    }
}
