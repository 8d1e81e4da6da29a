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

//! Zenith MUD Protocol frames: a command name and its arguments, each
//! NUL-terminated, inside an `SB`/`SE` envelope on telopt 93.

/// Splits a ZMP body into its argument vector.
///
/// A well-formed frame is non-empty and ends with a NUL; each argument view
/// in the result excludes its terminator. Returns `None` for malformed
/// frames, in which case the caller falls back to the raw body.
#[must_use]
pub fn parse(body: &[u8]) -> Option<Vec<&[u8]>> {
    let (&last, init) = body.split_last()?;
    if last != 0 {
        return None;
    }
    Some(init.split(|&byte| byte == 0).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_command_and_arguments() {
        let body = b"zmp.ping\0now\0";
        let argv = parse(body).expect("well-formed frame");
        assert_eq!(argv, vec![&b"zmp.ping"[..], &b"now"[..]]);
    }

    #[test]
    fn single_command_without_arguments() {
        let argv = parse(b"zmp.check\0").expect("well-formed frame");
        assert_eq!(argv, vec![&b"zmp.check"[..]]);
    }

    #[test]
    fn empty_arguments_are_preserved() {
        let argv = parse(b"cmd\0\0x\0").expect("well-formed frame");
        assert_eq!(argv, vec![&b"cmd"[..], &b""[..], &b"x"[..]]);
    }

    #[test]
    fn empty_body_is_malformed() {
        assert_eq!(parse(b""), None);
    }

    #[test]
    fn missing_terminator_is_malformed() {
        assert_eq!(parse(b"zmp.ping\0now"), None);
    }
}
