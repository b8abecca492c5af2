//! Identifier sanitising
//!
//! Names coming from node trees or file paths may contain any character.
//! The result of [`to_valid_identifier`] is made of ASCII letters, digits and
//! underscores only, and never starts with a digit.

use std::fmt::Write;

/// Convert an arbitrary name into an identifier-safe string
///
/// The result always starts with `n`. ASCII alphanumeric bytes are kept,
/// every other byte of the UTF-8 encoding becomes `_` followed by its
/// decimal value:
/// - `Mix RGB` -> `nMix_32RGB`
/// - `1.5` -> `n1_465`
/// - `ä` -> `n_195_164`
pub fn to_valid_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 1);
    result.push('n');

    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() {
            result.push(char::from(byte));
        } else {
            let _ = write!(result, "_{}", byte);
        }
    }

    result
}
