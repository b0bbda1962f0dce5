//! Where the networked backend lives.

use std::fmt;

/// Default MySQL port, used when the config has none or an unparsable one.
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Config keys the descriptor is read from.
pub mod keys {
    pub const HOST: &str = "host";
    pub const PORT: &str = "port";
    pub const USER: &str = "user";
    pub const PASSWORD: &str = "password";
    pub const DATABASE: &str = "database";

    /// Every connection key, in the order the settings form shows them.
    pub const ALL: [&str; 5] = [HOST, PORT, USER, PASSWORD, DATABASE];
}

/// Connection parameters for the networked backend.
///
/// An empty `host` means "not configured": the store goes straight to the
/// embedded backend.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectionDescriptor {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        ConnectionDescriptor {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: database.into(),
        }
    }

    /// Builds a descriptor from any key/value source (normally the config
    /// store). Missing keys become empty strings.
    ///
    /// ## Example
    /// ```rust
    /// use std::collections::HashMap;
    /// use stockroom_db::ConnectionDescriptor;
    ///
    /// let values = HashMap::from([("host", "db.local"), ("port", "3307")]);
    /// let descriptor = ConnectionDescriptor::from_lookup(|key| {
    ///     values.get(key).map(|v| v.to_string())
    /// });
    ///
    /// assert_eq!(descriptor.host, "db.local");
    /// assert_eq!(descriptor.port, 3307);
    /// assert!(descriptor.user.is_empty());
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();

        ConnectionDescriptor {
            host: get(keys::HOST).trim().to_string(),
            port: parse_port(lookup(keys::PORT).as_deref()),
            user: get(keys::USER),
            password: get(keys::PASSWORD),
            database: get(keys::DATABASE),
        }
    }

    /// True when a host is set and a networked attempt makes sense.
    pub fn is_configured(&self) -> bool {
        !self.host.trim().is_empty()
    }

    /// `(key, value)` pairs for persisting, port rendered as text.
    pub fn to_pairs(&self) -> [(&'static str, String); 5] {
        [
            (keys::HOST, self.host.clone()),
            (keys::PORT, self.port.to_string()),
            (keys::USER, self.user.clone()),
            (keys::PASSWORD, self.password.clone()),
            (keys::DATABASE, self.database.clone()),
        ]
    }
}

// Password stays out of logs.
impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// Parses a stored port, falling back to [`DEFAULT_MYSQL_PORT`].
pub fn parse_port(value: Option<&str>) -> u16 {
    value
        .and_then(|v| v.trim().parse::<u16>().ok())
        .filter(|port| *port != 0)
        .unwrap_or(DEFAULT_MYSQL_PORT)
}
