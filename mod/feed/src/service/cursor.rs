//! Opaque feed cursor.
//!
//! Encodes the (create_at, id) of the last post a client saw. The pair
//! is a position in the feed's total order — create_at descending, id
//! descending as the same-instant tie-break — so resuming from it can
//! neither skip nor repeat a post while the feed is append-only.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use karmafeed_core::ServiceError;

pub(crate) fn encode(create_at: &str, id: &str) -> String {
    URL_SAFE_NO_PAD.encode(format!("{create_at}|{id}"))
}

pub(crate) fn decode(token: &str) -> Result<(String, String), ServiceError> {
    let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
    let s = String::from_utf8(bytes).map_err(|_| invalid())?;
    let (create_at, id) = s.split_once('|').ok_or_else(invalid)?;
    if create_at.is_empty() || id.is_empty() {
        return Err(invalid());
    }
    Ok((create_at.to_string(), id.to_string()))
}

fn invalid() -> ServiceError {
    ServiceError::Validation("invalid feed cursor".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let token = encode("2026-08-01T10:00:00+00:00", "abc123");
        let (ts, id) = decode(&token).unwrap();
        assert_eq!(ts, "2026-08-01T10:00:00+00:00");
        assert_eq!(id, "abc123");
    }

    #[test]
    fn garbage_rejected() {
        assert!(decode("not base64 ∞").is_err());
        // Valid base64 without the separator.
        let token = URL_SAFE_NO_PAD.encode("no-separator-here");
        assert!(decode(&token).is_err());
    }
}
