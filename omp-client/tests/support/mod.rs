#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use omp_client::{Config, Session, Transport, TransportError};

/// Plays an OMP manager: each request written is answered with the next
/// scripted reply, which becomes readable immediately.
#[derive(Default)]
pub struct MockManager {
    replies:     VecDeque<Reply>,
    pending:     Vec<u8>,
    open:        bool,
    refuse_open: bool,
    pub opens:   usize,
    pub written: Vec<String>,
}

enum Reply {
    Bytes(Vec<u8>),
    Hangup,
}

impl MockManager {
    pub fn new() -> Self { Self::default() }

    pub fn reply(mut self, xml: &str) -> Self {
        self.replies.push_back(Reply::Bytes(xml.as_bytes().to_vec()));
        self
    }

    /// Close the connection instead of answering the next request.
    pub fn hangup(mut self) -> Self {
        self.replies.push_back(Reply::Hangup);
        self
    }

    pub fn refusing(mut self) -> Self {
        self.refuse_open = true;
        self
    }

    pub fn last_request(&self) -> &str {
        self.written.last().map(String::as_str).unwrap_or("")
    }
}

impl Transport for MockManager {
    async fn open(&mut self, _host: &str, _port: u16) -> Result<(), TransportError> {
        if self.refuse_open {
            return Err(TransportError::Connect {
                addr:   "mock:9390".into(),
                source: std::io::ErrorKind::ConnectionRefused.into(),
            });
        }
        self.opens += 1;
        self.open = true;
        self.pending.clear();
        Ok(())
    }

    async fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::NotConnected);
        }
        self.written.push(String::from_utf8_lossy(data).into_owned());
        match self.replies.pop_front() {
            Some(Reply::Bytes(bytes)) => self.pending.extend_from_slice(&bytes),
            Some(Reply::Hangup) => self.open = false,
            None => {}
        }
        Ok(())
    }

    async fn read_some(&mut self, max: usize, _timeout: Duration) -> Result<Vec<u8>, TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        let n = max.min(self.pending.len());
        Ok(self.pending.drain(..n).collect())
    }
}

pub const AUTH_OK: &str =
    r#"<authenticate_response status="200" status_text="OK"><role>Admin</role></authenticate_response><help_response status="200">HELP</help_response>"#;

pub const AUTH_BAD: &str =
    r#"<authenticate_response status="400" status_text="Authentication failed"/><help_response status="200">HELP</help_response>"#;

/// Wrap a response so it looks like what the manager sends to an
/// authenticated request.
pub fn authed(body: &str) -> String {
    format!(r#"<authenticate_response status="200" status_text="OK"/>{body}"#)
}

pub fn config() -> Config {
    Config::default().credentials("admin", "secret").auto_login(false)
}

/// A connected, logged-in session over `mock`, with the login exchange
/// already consumed.
pub async fn logged_in(mock: MockManager) -> Session<MockManager> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut script = MockManager::new().reply(AUTH_OK);
    script.replies.extend(mock.replies);
    let mut session = Session::with_transport(config(), script);
    session.login("admin", "secret").await.expect("login");
    session
}
