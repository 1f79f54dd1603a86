//! Staging database connection string
//!
//! The DSN usually embeds the database password, so it lives in a
//! `secrecy::Secret`: zeroed on drop, `[REDACTED]` in `Debug` output, and
//! reachable only through `expose_secret()` when the pool is built or the
//! host part is shown to an operator.
//!
//! ```rust
//! use order_export::config::secret_connection_string;
//! use secrecy::ExposeSecret;
//!
//! let dsn = secret_connection_string("postgresql://etl:pw@erp-db/erp".to_string());
//! assert_eq!(dsn.expose_secret().after_credentials(), Some("erp-db/erp"));
//! assert!(!format!("{dsn:?}").contains("pw"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Raw connection string
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct ConnectionString(String);

impl CloneableSecret for ConnectionString {}
impl DebugSecret for ConnectionString {}
impl SerializableSecret for ConnectionString {}

impl From<String> for ConnectionString {
    fn from(s: String) -> Self {
        ConnectionString(s)
    }
}

impl AsRef<str> for ConnectionString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ConnectionString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl ConnectionString {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// URL scheme check, e.g. `postgresql://`
    pub fn starts_with(&self, scheme: &str) -> bool {
        self.0.starts_with(scheme)
    }

    /// Host, port and database: everything after the last `@`
    ///
    /// `None` when the string carries no credentials.
    pub fn after_credentials(&self) -> Option<&str> {
        self.0.rsplit_once('@').map(|(_, host)| host)
    }

    /// Parses into a driver config such as `tokio_postgres::Config`
    pub fn parse<F: std::str::FromStr>(&self) -> Result<F, F::Err> {
        self.0.parse()
    }
}

impl Serialize for ConnectionString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConnectionString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(ConnectionString)
    }
}

/// Connection string behind `secrecy::Secret`
pub type SecretConnectionString = Secret<ConnectionString>;

#[inline]
pub fn secret_connection_string(value: String) -> SecretConnectionString {
    Secret::new(ConnectionString::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_debug_hides_password() {
        let dsn = secret_connection_string("postgresql://etl:hunter2@db/erp".to_string());
        let debug_output = format!("{dsn:?}");

        assert!(!debug_output.contains("hunter2"));
        assert!(debug_output.contains("REDACTED"));
        assert_eq!(dsn.expose_secret(), "postgresql://etl:hunter2@db/erp");
    }

    #[test]
    fn test_after_credentials() {
        let value = ConnectionString::from("postgresql://u:p@w@db:5432/erp".to_string());
        assert_eq!(value.after_credentials(), Some("db:5432/erp"));

        let bare = ConnectionString::from("postgresql://db/erp".to_string());
        assert_eq!(bare.after_credentials(), None);
    }

    #[test]
    fn test_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Section {
            connection_string: SecretConnectionString,
        }

        let section: Section =
            toml::from_str("connection_string = \"postgres://etl@db/erp\"").unwrap();
        assert!(section.connection_string.expose_secret().starts_with("postgres://"));
        assert!(!section.connection_string.expose_secret().is_empty());
    }
}
