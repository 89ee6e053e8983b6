//! Session token credential.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

/// Opaque bearer credential proving ownership of a session.
///
/// Issued by the identity provider and carried back by clients in the
/// session cookie or an `Authorization: Bearer` header. The value is held in
/// a [`SecretString`], so `Debug` output is redacted and the raw token is only
/// reachable through [`ExposeSecret`].
#[derive(Debug, Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    /// Wrap a raw token value.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Whether the token is empty (an empty cookie counts as no credential).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }
}

impl ExposeSecret<str> for SessionToken {
    fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl PartialEq for SessionToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose_secret() == other.expose_secret()
    }
}

impl Eq for SessionToken {}

impl<'de> Deserialize<'de> for SessionToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for SessionToken {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for SessionToken {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        Ok(Self::new(<String as sqlx::Decode<sqlx::Postgres>>::decode(value)?))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for SessionToken {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.expose_secret(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts() {
        let token = SessionToken::new("st_live_abcdef");
        let debug = format!("{token:?}");
        assert!(!debug.contains("abcdef"));
        assert_eq!(token.expose_secret(), "st_live_abcdef");
    }

    #[test]
    fn test_equality_compares_exposed_value() {
        assert_eq!(SessionToken::new("tok-1"), SessionToken::new("tok-1"));
        assert_ne!(SessionToken::new("tok-1"), SessionToken::new("tok-2"));
        assert!(SessionToken::new("").is_empty());
    }

    #[test]
    fn test_deserializes_from_string() {
        let token: SessionToken = serde_json::from_str("\"tok-json\"").unwrap();
        assert_eq!(token.expose_secret(), "tok-json");
    }
}
