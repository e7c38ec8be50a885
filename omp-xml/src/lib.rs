//! The OMP envelope: building request fragments and reading responses.
//!
//! Requests only ever take three shapes, so instead of a general XML writer
//! there is one builder per shape:
//!
//! | Builder                     | Produces                                      |
//! |-----------------------------|-----------------------------------------------|
//! | [`attributed_element`]      | `<get_tasks task_id="…"/>`                    |
//! | [`element_with_children`]   | `<credentials><username>…</username>…`        |
//! | [`mixed_element`]           | `<create_task><name>…</name><config id="…"/>` |
//!
//! Responses arrive as zero or more sibling top-level elements with no common
//! parent. [`parse`] wraps them in a synthetic [`ROOT`] element so the result
//! is always one navigable [`Element`] tree.
//!
//! ```rust
//! use omp_xml::{attributed_element, parse, Status};
//!
//! let req = attributed_element("get_tasks", &[("task_id", "42")]);
//! assert_eq!(req.as_str(), r#"<get_tasks task_id="42"/>"#);
//!
//! let root = parse(br#"<authenticate_response status="200"/><get_tasks_response status="200"/>"#)?;
//! let status = Status::of(root.require("authenticate_response")?)?;
//! assert!(status.is_success());
//! # Ok::<(), omp_xml::XmlError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod document;
mod error;
mod fragment;
mod status;

pub use document::{Element, ROOT, parse};
pub use error::XmlError;
pub use fragment::{Fragment, attributed_element, element_with_children, mixed_element};
pub use status::Status;
