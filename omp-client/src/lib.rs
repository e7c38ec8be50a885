//! # omp-client
//!
//! Async client for the OpenVAS Management Protocol (OMP) over TLS.
//!
//! ## Features
//! - Session state machine: connect, login, logout, reconnect on demand
//! - Stateless authentication: the `<authenticate>` envelope rides on every request
//! - Status checking of every `*_response` element, with 2xx as success
//! - Four error kinds: connection, authentication, XML parsing, protocol
//! - Targets, scan configurations, tasks, report formats and reports
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use omp_client::{Config, NewTarget, NewTask, Session};
//!
//! # async fn f() -> Result<(), omp_client::OmpError> {
//! let mut omp = Session::open(
//!     Config::default().host("scanner.internal").credentials("admin", "admin"),
//! ).await?;
//!
//! let target = omp.create_target(&NewTarget::new("web", "10.0.0.0/28")).await?;
//! let config = omp.scan_config_by_name("Full and fast").await?.expect("stock config");
//! let task   = omp.create_task(&NewTask::new("nightly", config.id, target)).await?;
//! omp.start_task(&task).await?;
//!
//! while !omp.task_finished(&task).await? {
//!     tokio::time::sleep(std::time::Duration::from_secs(30)).await;
//! }
//! # Ok(()) }
//! ```
//!
//! Anything the typed helpers do not cover goes through
//! [`Session::send_and_parse`] with a fragment built by [`attributed_element`],
//! [`element_with_children`] or [`mixed_element`].

#![deny(unsafe_code)]

mod config;
mod errors;
mod response;
mod session;

pub mod configs;
pub mod reports;
mod server;
pub mod targets;
pub mod tasks;

pub use config::Config;
pub use errors::{ErrorKind, OmpError};
pub use response::Response;
pub use session::{ConnectionState, Session};

pub use configs::ScanConfig;
pub use reports::{ReportFormat, ReportSummary, is_base64_format};
pub use targets::{NewTarget, Target};
pub use tasks::{NewTask, Task};

pub use omp_wire::{DEFAULT_PORT, TlsOptions, TlsTransport, Transport, TransportError};
pub use omp_xml::{
    Element, Fragment, Status, XmlError, attributed_element, element_with_children, mixed_element,
};
