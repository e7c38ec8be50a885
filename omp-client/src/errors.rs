//! Error types for omp-client.
//!
//! Every failure a [`crate::Session`] reports is one of four kinds, named by
//! [`ErrorKind`]. Transport and parser errors never escape unclassified.

use omp_wire::TransportError;
use omp_xml::{Fragment, Status, XmlError};

// ─── ErrorKind ────────────────────────────────────────────────────────────────

/// Which layer a failure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Socket or TLS failure. Not retried; call `connect` again.
    Connection,
    /// The manager rejected the credentials given to `login`.
    Authentication,
    /// The response could not be parsed or lacks an expected part.
    XmlParsing,
    /// The manager understood the request and reported failure.
    Protocol,
}

// ─── OmpError ─────────────────────────────────────────────────────────────────

/// The error type returned from any [`crate::Session`] method that talks to
/// the manager.
///
/// Requests recorded here never include the authentication envelope.
#[derive(Debug, thiserror::Error)]
pub enum OmpError {
    /// Transport-level failure.
    #[error("connection error: {0}")]
    Connection(#[from] TransportError),

    /// `login` was answered with a non-2xx `authenticate_response`.
    #[error("authentication rejected: {status}")]
    Authentication { status: Status },

    /// The response to `request` could not be interpreted.
    #[error("cannot interpret response to <{operation}>: {source}")]
    XmlParsing {
        #[source]
        source:    XmlError,
        operation: String,
        request:   String,
        response:  String,
    },

    /// A `*_response` element carried a status outside 200..=299.
    #[error("<{element}> reported {status}")]
    Protocol {
        element:  String,
        status:   Status,
        request:  String,
        response: String,
    },
}

/// A raw condition observed while running a request, before classification.
#[derive(Debug)]
pub(crate) enum Failure {
    Transport(TransportError),
    Xml(XmlError),
    /// Non-2xx status on `authenticate_response` during `login`.
    Rejected(Status),
    /// Non-2xx status on the named response element.
    Status { element: String, status: Status },
}

impl From<XmlError> for Failure {
    fn from(e: XmlError) -> Self { Self::Xml(e) }
}

impl OmpError {
    /// Map a condition to its error kind, attaching the request and raw
    /// response where the kind calls for them.
    pub(crate) fn classify(failure: Failure, request: &Fragment, response: &[u8]) -> Self {
        match failure {
            Failure::Transport(e) => Self::Connection(e),
            Failure::Rejected(status) => Self::Authentication { status },
            Failure::Xml(source) => Self::XmlParsing {
                source,
                operation: operation_of(request.as_str()).to_string(),
                request:   request.to_string(),
                response:  String::from_utf8_lossy(response).into_owned(),
            },
            Failure::Status { element, status } => Self::Protocol {
                element,
                status,
                request:  request.to_string(),
                response: String::from_utf8_lossy(response).into_owned(),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection(_)          => ErrorKind::Connection,
            Self::Authentication { .. }  => ErrorKind::Authentication,
            Self::XmlParsing { .. }      => ErrorKind::XmlParsing,
            Self::Protocol { .. }        => ErrorKind::Protocol,
        }
    }

    /// The status the manager reported, for authentication and protocol
    /// failures.
    pub fn status(&self) -> Option<&Status> {
        match self {
            Self::Authentication { status } | Self::Protocol { status, .. } => Some(status),
            _ => None,
        }
    }

    /// The request that provoked the failure, when recorded.
    pub fn request(&self) -> Option<&str> {
        match self {
            Self::XmlParsing { request, .. } | Self::Protocol { request, .. } => Some(request),
            _ => None,
        }
    }

    /// The raw response, when recorded.
    pub fn response(&self) -> Option<&str> {
        match self {
            Self::XmlParsing { response, .. } | Self::Protocol { response, .. } => Some(response),
            _ => None,
        }
    }
}

/// Tag name of the first element in a fragment: `<get_tasks task_id=…/>` →
/// `get_tasks`.
pub(crate) fn operation_of(xml: &str) -> &str {
    let rest = xml.trim_start().trim_start_matches('<');
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    &rest[..end]
}
