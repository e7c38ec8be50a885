//! The OMP session: connection state, the authentication envelope, and the
//! request/response cycle every operation goes through.
//!
//! OMP has no server-side session. After a successful `login` the
//! `<authenticate>` fragment is cached and prepended, unchanged, to every
//! later request until `logout`.

use std::fmt;

use omp_wire::{FrameReader, TlsTransport, Transport, TransportError};
use omp_xml::{Element, Fragment, Status, attributed_element, element_with_children, parse};

use crate::errors::{Failure, OmpError, operation_of};
use crate::{Config, Response};

// ─── ConnectionState ──────────────────────────────────────────────────────────

/// Where a [`Session`] stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport connection.
    Disconnected,
    /// Connected, no cached credentials.
    Connected,
    /// Connected, and every request carries the cached credentials.
    Authenticated,
}

// ─── Session ──────────────────────────────────────────────────────────────────

/// A single connection to an OMP manager.
///
/// One request is outstanding at a time; every request-issuing method takes
/// `&mut self`.
///
/// ```rust,no_run
/// use omp_client::{Config, Session};
///
/// # async fn f() -> Result<(), omp_client::OmpError> {
/// let mut session = Session::open(Config::default().credentials("admin", "admin")).await?;
/// println!("manager speaks OMP {}", session.version().await?);
/// session.logout().await;
/// # Ok(()) }
/// ```
pub struct Session<T: Transport = TlsTransport> {
    config: Config,
    wire:   FrameReader<T>,
    /// `<authenticate>…</authenticate>`, or empty when not logged in.
    auth:   Fragment,
}

impl Session<TlsTransport> {
    /// Build a TLS session without touching the network.
    pub fn new(config: Config) -> Result<Self, OmpError> {
        let transport = TlsTransport::new(&config.tls, config.connect_timeout)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Build a TLS session, then connect and log in as
    /// [`Config::auto_connect`] / [`Config::auto_login`] say.
    pub async fn open(config: Config) -> Result<Self, OmpError> {
        let mut session = Self::new(config)?;
        session.start().await?;
        Ok(session)
    }
}

impl<T: Transport> Session<T> {
    /// Build a session over any transport.
    pub fn with_transport(config: Config, transport: T) -> Self {
        let wire = FrameReader::new(transport, config.buffer_size, config.read_timeout);
        Self { config, wire, auth: Fragment::empty() }
    }

    /// Apply the auto-connect / auto-login toggles.
    pub async fn start(&mut self) -> Result<(), OmpError> {
        if self.config.auto_connect {
            self.connect().await?;
        }
        if self.config.auto_login && self.config.has_credentials() {
            let (user, pass) = (self.config.username.clone(), self.config.password.clone());
            self.login(&user, &pass).await?;
        }
        Ok(())
    }

    pub fn config(&self) -> &Config { &self.config }

    pub fn transport(&self) -> &T { self.wire.inner() }

    pub fn transport_mut(&mut self) -> &mut T { self.wire.inner_mut() }

    pub fn is_connected(&self) -> bool {
        self.wire.inner().is_open()
    }

    /// `true` iff credentials are cached.
    pub fn is_authenticated(&self) -> bool {
        !self.auth.is_empty()
    }

    /// Cached credentials survive a dropped connection until `logout`, so a
    /// session can be authenticated yet report `Disconnected`.
    pub fn state(&self) -> ConnectionState {
        match (self.is_connected(), self.is_authenticated()) {
            (false, _)    => ConnectionState::Disconnected,
            (true, false) => ConnectionState::Connected,
            (true, true)  => ConnectionState::Authenticated,
        }
    }

    /// Open the transport. Calling it again replaces the connection.
    pub async fn connect(&mut self) -> Result<(), OmpError> {
        let Config { host, port, .. } = &self.config;
        self.wire
            .inner_mut()
            .open(host, *port)
            .await
            .map_err(|e| OmpError::classify(Failure::Transport(e), &Fragment::empty(), b""))
    }

    /// Authenticate, connecting first if needed.
    ///
    /// The `<authenticate>` request goes out together with a `<help/>` so the
    /// manager always has something to answer. On a 2xx
    /// `authenticate_response` the envelope is cached; otherwise the session
    /// keeps whatever credentials it had before.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), OmpError> {
        if !self.is_connected() {
            self.connect().await?;
        }

        let auth = element_with_children("credentials", &[("username", username), ("password", password)])
            .wrapped_in("authenticate");
        let probe   = attributed_element("help", &[]);
        let context = attributed_element("authenticate", &[]);

        let raw = self.exchange(&auth.clone().then(&probe), &context).await?;
        let status = parse(&raw)
            .and_then(|root| Status::of(root.require("authenticate_response")?))
            .map_err(|e| OmpError::classify(Failure::Xml(e), &context, &raw))?;

        if !status.is_success() {
            log::warn!("[omp] Login as {username} rejected: {status}");
            return Err(OmpError::classify(Failure::Rejected(status), &context, &raw));
        }
        self.auth = auth;
        log::info!("[omp] Logged in as {username} ✓");
        Ok(())
    }

    /// Forget the credentials and close the connection. Always succeeds.
    pub async fn logout(&mut self) {
        self.auth = Fragment::empty();
        self.wire.inner_mut().close().await;
        log::info!("[omp] Logged out");
    }

    /// Send `request` behind the cached credentials and return the response
    /// bytes untouched.
    ///
    /// Without credentials the request goes out bare and the manager decides
    /// whether to answer it.
    pub async fn send_raw(&mut self, request: &Fragment) -> Result<Vec<u8>, OmpError> {
        let payload = self.auth.clone().then(request);
        self.exchange(&payload, request).await
    }

    /// [`send_raw`](Self::send_raw), then parse and check every status.
    ///
    /// The primary status is the `authenticate_response` one when present,
    /// else that of the first `*_response` element; it must exist. Any other
    /// `*_response` carrying a status must be 2xx as well.
    pub async fn send_and_parse(&mut self, request: &Fragment) -> Result<Response, OmpError> {
        let raw  = self.send_raw(request).await?;
        let root = parse(&raw).map_err(|e| OmpError::classify(Failure::Xml(e), request, &raw))?;
        check_statuses(&root).map_err(|f| OmpError::classify(f, request, &raw))?;
        Ok(Response::new(request.clone(), raw, root))
    }

    /// Write `payload`, read one response. `context` is what gets logged and
    /// stands in for the payload in errors, so credentials never leak.
    async fn exchange(&mut self, payload: &Fragment, context: &Fragment) -> Result<Vec<u8>, OmpError> {
        let op = operation_of(context.as_str());
        if !self.is_connected() {
            if !self.config.auto_connect {
                return Err(OmpError::classify(Failure::Transport(TransportError::NotConnected), context, b""));
            }
            log::info!("[omp] Not connected, reconnecting before <{op}> …");
            self.connect().await?;
        }

        if self.config.verbosity >= 1 {
            log::debug!("[omp] → <{op}> ({} bytes)", payload.as_bytes().len());
        }
        if self.config.verbosity >= 2 {
            log::trace!("[omp] → {context}");
        }

        match self.wire.exchange(payload.as_bytes()).await {
            Ok(raw) => {
                if self.config.verbosity >= 1 {
                    log::debug!("[omp] ← <{op}> answered with {} bytes", raw.len());
                }
                if self.config.verbosity >= 2 {
                    log::trace!("[omp] ← {}", String::from_utf8_lossy(&raw));
                }
                Ok(raw)
            }
            Err(e) => {
                log::warn!("[omp] <{op}> failed: {e}; dropping connection");
                self.wire.inner_mut().close().await;
                Err(OmpError::classify(Failure::Transport(e), context, b""))
            }
        }
    }
}

fn is_response(el: &Element) -> bool {
    el.name().ends_with("_response")
}

fn check_statuses(root: &Element) -> Result<(), Failure> {
    let primary = root
        .child("authenticate_response")
        .or_else(|| root.children().find(|el| is_response(el)))
        .ok_or_else(|| omp_xml::XmlError::MissingElement("authenticate_response".into()))?;

    let status = Status::of(primary)?;
    if !status.is_success() {
        return Err(Failure::Status { element: primary.name().to_string(), status });
    }

    for other in root.children().filter(|el| is_response(el) && el.attr("status").is_some()) {
        let status = Status::of(other)?;
        if !status.is_success() {
            return Err(Failure::Status { element: other.name().to_string(), status });
        }
    }
    Ok(())
}

impl<T: Transport> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
