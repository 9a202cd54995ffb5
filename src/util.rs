/// The 64 digits of our base64 flavor, in value order. It's the URL-safe
/// alphabet, so the encoded strings can appear in URLs and JSON without any
/// escaping.
pub(crate) const BASE64_DIGITS: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Returns the value of a single base64 digit, or `None` if the byte is not
/// part of our alphabet.
pub(crate) fn base64_decode_digit(digit: u8) -> Option<u8> {
    match digit {
        b'A'..=b'Z' => Some(digit - b'A'),
        b'a'..=b'z' => Some(digit - b'a' + 26),
        b'0'..=b'9' => Some(digit - b'0' + 52),
        b'-' => Some(62),
        b'_' => Some(63),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_roundtrip() {
        for (value, &digit) in BASE64_DIGITS.iter().enumerate() {
            assert_eq!(base64_decode_digit(digit), Some(value as u8));
        }
    }

    #[test]
    fn invalid_digits() {
        for digit in [b'*', b'?', b'/', b'+', b' ', 0] {
            assert_eq!(base64_decode_digit(digit), None);
        }
    }
}
