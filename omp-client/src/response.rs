//! A parsed, successfully-statused response.

use std::ops::Deref;

use omp_xml::{Element, Fragment, XmlError};

use crate::errors::{Failure, OmpError};

/// What [`crate::Session::send_and_parse`] hands back: the synthetic root of
/// the response, plus the request and raw bytes so that later extraction
/// failures can still be reported with full context.
#[derive(Debug)]
pub struct Response {
    request: Fragment,
    raw:     Vec<u8>,
    root:    Element,
}

impl Response {
    pub(crate) fn new(request: Fragment, raw: Vec<u8>, root: Element) -> Self {
        Self { request, raw, root }
    }

    /// The synthetic root wrapping every top-level element.
    pub fn root(&self) -> &Element { &self.root }

    /// The response exactly as received.
    pub fn raw(&self) -> &[u8] { &self.raw }

    pub fn into_raw(self) -> Vec<u8> { self.raw }

    /// Run an extraction against the root; an [`XmlError`] becomes an
    /// [`OmpError::XmlParsing`] carrying this request and response.
    pub fn extract<'a, U>(
        &'a self,
        f: impl FnOnce(&'a Element) -> Result<U, XmlError>,
    ) -> Result<U, OmpError> {
        f(&self.root).map_err(|e| OmpError::classify(Failure::Xml(e), &self.request, &self.raw))
    }
}

impl Deref for Response {
    type Target = Element;
    fn deref(&self) -> &Element { &self.root }
}
