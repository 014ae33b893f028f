//! Where the database lives.

use std::fmt;

/// SQL dialect of a [`DatabaseTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Remote `PostgreSQL` server.
    Postgres,
    /// Embedded `SQLite` file.
    Sqlite,
}

impl Backend {
    /// Lowercase name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Resolved connection descriptor.
///
/// A remote server is always reached over TLS; the local file is meant for
/// development and tests only.
#[derive(Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    /// `PostgreSQL` with `sslmode=require`.
    Postgres {
        /// Login role.
        user: String,
        /// Password.
        password: String,
        /// Host name or address.
        host: String,
        /// TCP port.
        port: u16,
        /// Database name.
        name: String,
    },
    /// Local file-backed database, created on first use.
    LocalFile {
        /// File path.
        path: String,
    },
}

impl DatabaseTarget {
    /// Dialect spoken by this target.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        match self {
            Self::Postgres { .. } => Backend::Postgres,
            Self::LocalFile { .. } => Backend::Sqlite,
        }
    }

    /// Connection URL, credentials included.
    #[must_use]
    pub fn url(&self) -> String {
        match self {
            Self::Postgres {
                user,
                password,
                host,
                port,
                name,
            } => format!(
                "postgres://{}:{}@{host}:{port}/{name}?sslmode=require",
                urlencoding::encode(user),
                urlencoding::encode(password),
            ),
            Self::LocalFile { path } => format!("sqlite://{path}?mode=rwc"),
        }
    }

    /// Connection URL with the password masked, safe to log.
    #[must_use]
    pub fn redacted_url(&self) -> String {
        match self {
            Self::Postgres {
                user,
                host,
                port,
                name,
                ..
            } => format!(
                "postgres://{}:***@{host}:{port}/{name}?sslmode=require",
                urlencoding::encode(user)
            ),
            Self::LocalFile { .. } => self.url(),
        }
    }
}

impl fmt::Debug for DatabaseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DatabaseTarget").field(&self.redacted_url()).finish()
    }
}

impl fmt::Display for DatabaseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted_url())
    }
}
