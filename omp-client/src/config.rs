//! Session configuration.

use std::fmt;
use std::time::Duration;

use omp_wire::{DEFAULT_PORT, TlsOptions};

/// Everything a [`crate::Session`] needs, captured once at construction.
///
/// ```rust
/// use std::time::Duration;
/// use omp_client::Config;
///
/// let cfg = Config::default()
///     .host("scanner.example.org")
///     .credentials("admin", "s3cret")
///     .read_timeout(Duration::from_secs(5));
/// assert_eq!(cfg.port, 9390);
/// ```
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    pub host:            String,
    pub port:            u16,
    pub username:        String,
    pub password:        String,
    /// Bytes requested per read; a shorter read ends the response.
    pub buffer_size:     usize,
    /// How long one read may wait for data before the response is
    /// considered complete.
    pub read_timeout:    Duration,
    /// Bound on TCP connect and on the TLS handshake, separately.
    pub connect_timeout: Duration,
    /// 0: milestones only. 1: request/response sizes. 2+: full payloads
    /// (credentials excluded).
    pub verbosity:       u8,
    /// Open the connection in [`crate::Session::open`] and reopen it on
    /// demand before a request.
    pub auto_connect:    bool,
    /// Log in from [`crate::Session::open`] when both credentials are set.
    pub auto_login:      bool,
    pub tls:             TlsOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host:            "localhost".into(),
            port:            DEFAULT_PORT,
            username:        "openvas".into(),
            password:        "openvas".into(),
            buffer_size:     16384,
            read_timeout:    Duration::from_secs(3),
            connect_timeout: Duration::from_secs(10),
            verbosity:       0,
            auto_connect:    true,
            auto_login:      true,
            tls:             TlsOptions::default(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("buffer_size", &self.buffer_size)
            .field("read_timeout", &self.read_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("verbosity", &self.verbosity)
            .field("auto_connect", &self.auto_connect)
            .field("auto_login", &self.auto_login)
            .field("tls", &self.tls)
            .finish()
    }
}

impl Config {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into(); self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port; self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes; self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout; self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout; self
    }

    pub fn verbosity(mut self, level: u8) -> Self {
        self.verbosity = level; self
    }

    pub fn auto_connect(mut self, on: bool) -> Self {
        self.auto_connect = on; self
    }

    pub fn auto_login(mut self, on: bool) -> Self {
        self.auto_login = on; self
    }

    pub fn tls(mut self, tls: TlsOptions) -> Self {
        self.tls = tls; self
    }

    pub(crate) fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}
