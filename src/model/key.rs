use std::fmt;

use bytes::BytesMut;
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use crate::util::{BASE64_DIGITS, base64_decode_digit};


/// Our primary ID type, which we call "key". In the database, it's a `bigint`
/// (`i64`), but we have a separate Rust type for it for several reasons.
/// Implements `ToSql` and `FromSql` by casting to/from `i64`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) struct Key(pub(crate) u64);

impl Key {
    pub(crate) fn from_base64(s: &str) -> Option<Self> {
        if s.len() != 11 {
            return None;
        }

        let src: [u8; 11] = s.as_bytes().try_into().ok()?;

        // Reject strings that would decode to a number > `u64::MAX`. The
        // largest valid value encodes to `P__________`, so the first digit
        // just has to stay within 'A'..='P'.
        if src[0] > b'P' || src[0] < b'A' {
            return None;
        }

        src.iter()
            .rev()
            .enumerate()
            .map(|(i, &d)| base64_decode_digit(d).map(|n| n as u64 * 64u64.pow(i as u32)))
            .sum::<Option<u64>>()
            .map(Key)
    }

    pub(crate) fn to_base64<'a>(&self, out: &'a mut [u8; 11]) -> &'a str {
        // Eleven base64 digits hold 66 bit, so the loop always consumes the
        // full `u64`.
        let mut n = self.0;
        for i in (0..out.len()).rev() {
            out[i] = BASE64_DIGITS[(n % 64) as usize];
            n /= 64;
        }
        debug_assert!(n == 0);

        std::str::from_utf8(out)
            .expect("bug: base64 did produce non-ASCII character")
    }
}

impl ToSql for Key {
    fn to_sql(
        &self,
        ty: &postgres_types::Type,
        out: &mut BytesMut,
    ) -> Result<postgres_types::IsNull, Box<dyn std::error::Error + Sync + Send>> {
        (self.0 as i64).to_sql(ty, out)
    }

    fn accepts(ty: &postgres_types::Type) -> bool {
        <i64 as ToSql>::accepts(ty)
    }

    postgres_types::to_sql_checked!();
}

impl<'a> FromSql<'a> for Key {
    fn from_sql(
        ty: &postgres_types::Type,
        raw: &'a [u8],
    ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        i64::from_sql(ty, raw).map(|i| Key(i as u64))
    }

    fn accepts(ty: &postgres_types::Type) -> bool {
        <i64 as FromSql>::accepts(ty)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0; 11];
        write!(f, "Key({} :: {})", self.0 as i64, self.to_base64(&mut buf))
    }
}

#[cfg(test)]
mod tests {
    use super::Key;

    #[test]
    fn base64_roundtrip() {
        for n in [0, 1, 62, 63, 64, 65, 4040, u64::MAX - 1, u64::MAX] {
            let mut buf = [0; 11];
            let s = Key(n).to_base64(&mut buf).to_owned();
            assert_eq!(Key::from_base64(&s), Some(Key(n)), "failed for {n}");
        }
    }

    #[test]
    fn known_encodings() {
        let mut buf = [0; 11];
        assert_eq!(Key(0).to_base64(&mut buf), "AAAAAAAAAAA");
        assert_eq!(Key(1).to_base64(&mut buf), "AAAAAAAAAAB");
        assert_eq!(Key(62).to_base64(&mut buf), "AAAAAAAAAA-");
        assert_eq!(Key(63).to_base64(&mut buf), "AAAAAAAAAA_");
        assert_eq!(Key(64).to_base64(&mut buf), "AAAAAAAAABA");
        assert_eq!(Key(u64::MAX).to_base64(&mut buf), "P__________");
    }

    #[test]
    fn invalid_base64() {
        // Wrong length
        assert_eq!(Key::from_base64(""), None);
        assert_eq!(Key::from_base64("AAAA"), None);
        assert_eq!(Key::from_base64("AAAAAAAAAAAA"), None);

        // Invalid digits
        assert_eq!(Key::from_base64("AAAAAAAAAA*"), None);
        assert_eq!(Key::from_base64("AAAAAAAAAA/"), None);

        // Would decode to a value > `u64::MAX`
        assert_eq!(Key::from_base64("QAAAAAAAAAA"), None);
        assert_eq!(Key::from_base64("___________"), None);
    }
}
