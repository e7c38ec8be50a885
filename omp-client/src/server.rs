//! Manager-level queries.

use omp_wire::Transport;
use omp_xml::attributed_element;

use crate::{OmpError, Session};

impl<T: Transport> Session<T> {
    /// The OMP version the manager speaks, e.g. `"4.0"`.
    pub async fn version(&mut self) -> Result<String, OmpError> {
        let resp = self.send_and_parse(&attributed_element("get_version", &[])).await?;
        resp.extract(|root| Ok(root.require_text("get_version_response/version")?.to_string()))
    }

    /// The manager's command listing.
    pub async fn help(&mut self) -> Result<String, OmpError> {
        let resp = self.send_and_parse(&attributed_element("help", &[])).await?;
        resp.extract(|root| Ok(root.require_text("help_response")?.to_string()))
    }
}
