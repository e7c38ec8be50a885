//! Scan configurations.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use omp_wire::Transport;
use omp_xml::{Element, XmlError, attributed_element, element_with_children};

use crate::{OmpError, Session};

/// A scan configuration as listed by `get_configs`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    pub id:      String,
    pub name:    String,
    pub comment: Option<String>,
}

impl ScanConfig {
    fn from_element(el: &Element) -> Result<Self, XmlError> {
        Ok(Self {
            id:      el.require_attr("id")?.to_string(),
            name:    el.require_text("name")?.to_string(),
            comment: el.opt_text("comment"),
        })
    }
}

impl<T: Transport> Session<T> {
    pub async fn scan_configs(&mut self) -> Result<Vec<ScanConfig>, OmpError> {
        let resp = self.send_and_parse(&attributed_element("get_configs", &[])).await?;
        resp.extract(|root| {
            root.find_all("get_configs_response/config")
                .into_iter()
                .map(ScanConfig::from_element)
                .collect()
        })
    }

    /// First configuration whose name matches exactly.
    pub async fn scan_config_by_name(&mut self, name: &str) -> Result<Option<ScanConfig>, OmpError> {
        Ok(self.scan_configs().await?.into_iter().find(|c| c.name == name))
    }

    /// Clone an existing configuration under a new name; returns the new id.
    pub async fn copy_scan_config(&mut self, source_id: &str, name: &str) -> Result<String, OmpError> {
        let req = element_with_children("create_config", &[("copy", source_id), ("name", name)]);
        self.create_config(&req).await
    }

    /// Create a configuration from an OpenVAS rc file; returns the new id.
    pub async fn import_scan_config(&mut self, name: &str, rc: &[u8]) -> Result<String, OmpError> {
        let encoded = STANDARD.encode(rc);
        let req = element_with_children("create_config", &[("rcfile", encoded.as_str()), ("name", name)]);
        self.create_config(&req).await
    }

    pub async fn delete_scan_config(&mut self, id: &str) -> Result<(), OmpError> {
        self.send_and_parse(&attributed_element("delete_config", &[("config_id", id)])).await?;
        Ok(())
    }

    async fn create_config(&mut self, req: &omp_xml::Fragment) -> Result<String, OmpError> {
        let resp = self.send_and_parse(req).await?;
        resp.extract(|root| Ok(root.require("create_config_response")?.require_attr("id")?.to_string()))
    }
}
