//! Byte-level name codec.
//!
//! Two rule sets, each in two directions, selected by [`Direction`] and
//! [`NameKind`]. Nothing here touches the filesystem.
//!
//! ## Directory rule
//!
//! | Direction | Byte | Becomes |
//! |-----------|------|---------|
//! | encode | space | [`SENTINEL`] |
//! | decode | [`SENTINEL`] | space |
//!
//! The rule never touches a separator, and decoding an encoded name gives back
//! the original for any name that did not already contain the sentinel.
//!
//! ## File rule
//!
//! | Direction | Byte | Becomes |
//! |-----------|------|---------|
//! | encode | separator | `@` |
//! | encode | space | `_` |
//! | encode | [`SENTINEL`] | space |
//! | decode | `@` | platform separator |
//! | decode | `_` or [`SENTINEL`] | space |
//!
//! Encoding a sentinel to a space lets a path that still carries an
//! un-decoded directory name be flattened into a readable file name.
//!
//! Decoding also strips a leading `./` (or `.\`) before mapping, strips one
//! leading separator after mapping so a flattened absolute path comes back
//! relative, and normalizes separators to the platform's own.
//!
//! ### Known limitation
//!
//! The file rule is lossy: decode maps `_`, the sentinel, and an encoded space
//! all to a space. A file named `notes_v2.txt` encodes unchanged and decodes
//! to `notes v2.txt`. The collision is kept as-is; existing encoded trees
//! depend on it.

use crate::paths::{self, MAX_PATH_BYTES, PathBytes, PathTooLong, SEPARATOR};

/// Stand-in for a space in encoded directory names (Latin-1 `§`).
pub const SENTINEL: u8 = 0xA7;

/// Stand-in for a path separator in encoded file names.
pub const ENCODED_SEPARATOR: u8 = b'@';

/// Stand-in for a space in encoded file names.
pub const ENCODED_SPACE: u8 = b'_';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encode,
    Decode,
}

/// Which rule set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    File,
    Directory,
}

/// Apply the codec to `input`.
///
/// Fails with [`PathTooLong`] when the result would not fit in
/// [`MAX_PATH_BYTES`]; nothing is ever truncated.
pub fn transform(
    input: &[u8],
    direction: Direction,
    kind: NameKind,
) -> Result<PathBytes, PathTooLong> {
    let body = match (direction, kind) {
        (Direction::Decode, NameKind::File) => strip_dot_prefix(input),
        _ => input,
    };
    if body.len() > MAX_PATH_BYTES {
        return Err(PathTooLong {
            len: body.len(),
            max: MAX_PATH_BYTES,
        });
    }

    let mut out: Vec<u8> = body
        .iter()
        .map(|&b| map_byte(b, direction, kind))
        .collect();

    if direction == Direction::Decode {
        if kind == NameKind::File && out.first().is_some_and(|&b| paths::is_separator(b)) {
            out.remove(0);
        }
        normalize_separators(&mut out);
    }

    PathBytes::new(out)
}

fn map_byte(b: u8, direction: Direction, kind: NameKind) -> u8 {
    match (kind, direction) {
        (NameKind::Directory, Direction::Encode) if b == b' ' => SENTINEL,
        (NameKind::Directory, Direction::Decode) if b == SENTINEL => b' ',
        (NameKind::Directory, _) => b,
        (NameKind::File, Direction::Encode) => match b {
            b' ' => ENCODED_SPACE,
            SENTINEL => b' ',
            _ if paths::is_separator(b) => ENCODED_SEPARATOR,
            _ => b,
        },
        (NameKind::File, Direction::Decode) => match b {
            ENCODED_SEPARATOR => SEPARATOR,
            ENCODED_SPACE | SENTINEL => b' ',
            _ => b,
        },
    }
}

fn strip_dot_prefix(input: &[u8]) -> &[u8] {
    input
        .strip_prefix(b"./")
        .or_else(|| input.strip_prefix(b".\\"))
        .unwrap_or(input)
}

fn normalize_separators(bytes: &mut [u8]) {
    for b in bytes.iter_mut().filter(|b| paths::is_separator(**b)) {
        *b = SEPARATOR;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_dir(s: &[u8]) -> Vec<u8> {
        transform(s, Direction::Encode, NameKind::Directory)
            .unwrap()
            .as_bytes()
            .to_vec()
    }

    fn decode_dir(s: &[u8]) -> Vec<u8> {
        transform(s, Direction::Decode, NameKind::Directory)
            .unwrap()
            .as_bytes()
            .to_vec()
    }

    fn encode_file(s: &[u8]) -> Vec<u8> {
        transform(s, Direction::Encode, NameKind::File)
            .unwrap()
            .as_bytes()
            .to_vec()
    }

    fn decode_file(s: &[u8]) -> Vec<u8> {
        transform(s, Direction::Decode, NameKind::File)
            .unwrap()
            .as_bytes()
            .to_vec()
    }

    fn native(s: &str) -> Vec<u8> {
        s.bytes()
            .map(|b| if b == b'/' { SEPARATOR } else { b })
            .collect()
    }

    const SAMPLES: &[&str] = &[
        "",
        "plain",
        "My Docs",
        " leading",
        "trailing ",
        "a  b   c",
        "under_score stays",
        "at@sign and space",
        "dots . and .. here",
    ];

    // =========================================================================
    // Directory rule
    // =========================================================================

    #[test]
    fn dir_encode_replaces_spaces_with_sentinel() {
        assert_eq!(encode_dir(b"My Docs"), b"My\xA7Docs");
    }

    #[test]
    fn dir_decode_replaces_sentinel_with_space() {
        assert_eq!(decode_dir(b"My\xA7Docs"), b"My Docs");
    }

    #[test]
    fn dir_rule_leaves_separators_and_file_markers_alone() {
        assert_eq!(encode_dir(b"a/b_c@d"), b"a/b_c@d");
        assert_eq!(decode_dir(b"a_b@c"), b"a_b@c");
    }

    #[test]
    fn dir_rule_is_an_involution_on_space_free_of_sentinel() {
        for s in SAMPLES {
            let encoded = encode_dir(s.as_bytes());
            assert!(!encoded.contains(&b' '), "space left in {encoded:?}");
            assert_eq!(decode_dir(&encoded), s.as_bytes(), "round trip of {s:?}");
        }
    }

    #[test]
    fn dir_rule_is_an_involution_in_reverse() {
        for s in SAMPLES {
            let with_sentinel: Vec<u8> = s
                .bytes()
                .map(|b| if b == b' ' { SENTINEL } else { b })
                .collect();
            let decoded = decode_dir(&with_sentinel);
            assert_eq!(encode_dir(&decoded), with_sentinel);
        }
    }

    // =========================================================================
    // File rule: encode
    // =========================================================================

    #[test]
    fn file_encode_flattens_separators_and_spaces() {
        assert_eq!(encode_file(b"/tmp/My Docs/a b.txt"), b"@tmp@My_Docs@a_b.txt");
    }

    #[test]
    fn file_encode_turns_leftover_sentinel_into_space() {
        assert_eq!(encode_file(b"/proj/My\xA7Docs/x.txt"), b"@proj@My Docs@x.txt");
    }

    #[test]
    fn file_encode_keeps_existing_markers() {
        assert_eq!(encode_file(b"a_b@c"), b"a_b@c");
    }

    #[cfg(not(windows))]
    #[test]
    fn file_encode_leaves_backslash_alone_off_windows() {
        assert_eq!(encode_file(b"a\\b"), b"a\\b");
    }

    #[cfg(windows)]
    #[test]
    fn file_encode_flattens_backslash_on_windows() {
        assert_eq!(encode_file(b"C:\\a b\\c"), b"C:@a_b@c");
    }

    // =========================================================================
    // File rule: decode
    // =========================================================================

    #[test]
    fn file_decode_restores_separators_and_spaces() {
        assert_eq!(decode_file(b"My_Docs@a_b.txt"), native("My Docs/a b.txt"));
    }

    #[test]
    fn file_decode_strips_leading_separator() {
        assert_eq!(
            decode_file(b"@tmp@proj@My_Docs@a_b.txt"),
            native("tmp/proj/My Docs/a b.txt")
        );
    }

    #[test]
    fn file_decode_strips_dot_slash_prefix() {
        assert_eq!(decode_file(b"./a_b.txt"), b"a b.txt");
        assert_eq!(decode_file(b".\\a_b.txt"), b"a b.txt");
    }

    #[test]
    fn file_decode_only_strips_one_dot_prefix() {
        assert_eq!(decode_file(b"././x"), native("./x"));
    }

    #[test]
    fn file_decode_maps_sentinel_to_space() {
        assert_eq!(decode_file(b"My\xA7Docs.txt"), b"My Docs.txt");
    }

    #[test]
    fn dir_decode_does_not_strip_leading_separator() {
        assert_eq!(decode_dir(b"/abs/A\xA7B"), native("/abs/A B"));
    }

    #[test]
    fn file_round_trip_without_underscores() {
        for s in ["a b.txt", "My Docs/a b.txt", "deep/er/path/x y z", "plain.txt"] {
            assert_eq!(
                decode_file(&encode_file(s.as_bytes())),
                native(s),
                "round trip of {s:?}"
            );
        }
    }

    #[test]
    fn file_round_trip_loses_literal_underscore() {
        let original = b"notes_v2 final.txt";
        let round_tripped = decode_file(&encode_file(original));
        assert_eq!(round_tripped, b"notes v2 final.txt");
        assert_ne!(round_tripped, original);
    }

    #[test]
    fn underscore_sentinel_and_space_collide_on_decode() {
        let from_underscore = decode_file(&encode_file(b"a_b"));
        let from_space = decode_file(&encode_file(b"a b"));
        let from_sentinel_name = decode_file(b"a\xA7b");
        assert_eq!(from_underscore, from_space);
        assert_eq!(from_space, from_sentinel_name);
    }

    // =========================================================================
    // Length checks
    // =========================================================================

    #[test]
    fn transform_accepts_input_at_the_limit() {
        let input = vec![b'x'; MAX_PATH_BYTES];
        let out = transform(&input, Direction::Encode, NameKind::File).unwrap();
        assert_eq!(out.as_bytes().len(), MAX_PATH_BYTES);
    }

    #[test]
    fn transform_rejects_input_past_the_limit() {
        let input = vec![b'x'; MAX_PATH_BYTES + 1];
        for (direction, kind) in [
            (Direction::Encode, NameKind::File),
            (Direction::Decode, NameKind::File),
            (Direction::Encode, NameKind::Directory),
            (Direction::Decode, NameKind::Directory),
        ] {
            let err = transform(&input, direction, kind).unwrap_err();
            assert_eq!(err.len, MAX_PATH_BYTES + 1);
        }
    }

    #[test]
    fn dot_prefix_is_stripped_before_the_length_check() {
        let mut input = b"./".to_vec();
        input.extend(vec![b'x'; MAX_PATH_BYTES]);
        let out = transform(&input, Direction::Decode, NameKind::File).unwrap();
        assert_eq!(out.as_bytes().len(), MAX_PATH_BYTES);
    }
}
