//! Scan targets: named host lists.

use omp_wire::Transport;
use omp_xml::{Element, XmlError, attributed_element, element_with_children};

use crate::{OmpError, Session};

// ─── Target ───────────────────────────────────────────────────────────────────

/// A target as listed by `get_targets`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub id:        String,
    pub name:      String,
    /// Comma-separated hosts, addresses or ranges, as the manager stores them.
    pub hosts:     String,
    pub comment:   Option<String>,
    pub max_hosts: Option<u32>,
    /// Referenced by at least one task.
    pub in_use:    bool,
}

impl Target {
    fn from_element(el: &Element) -> Result<Self, XmlError> {
        let max_hosts = match el.opt_text("max_hosts") {
            Some(raw) => Some(raw.parse().map_err(|_| XmlError::InvalidValue {
                element: "max_hosts".into(),
                what:    "host count".into(),
                value:   raw,
            })?),
            None => None,
        };
        Ok(Self {
            id:      el.require_attr("id")?.to_string(),
            name:    el.require_text("name")?.to_string(),
            hosts:   el.opt_text("hosts").unwrap_or_default(),
            comment: el.opt_text("comment"),
            max_hosts,
            in_use:  el.opt_text("in_use").is_some_and(|v| v != "0"),
        })
    }
}

/// Arguments to [`Session::create_target`].
#[derive(Clone, Debug, Default)]
pub struct NewTarget {
    pub name:    String,
    pub hosts:   String,
    pub comment: String,
}

impl NewTarget {
    pub fn new(name: impl Into<String>, hosts: impl Into<String>) -> Self {
        Self { name: name.into(), hosts: hosts.into(), comment: String::new() }
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into(); self
    }
}

// ─── Session methods ──────────────────────────────────────────────────────────

impl<T: Transport> Session<T> {
    /// Create a target and return the id the manager assigned to it.
    pub async fn create_target(&mut self, target: &NewTarget) -> Result<String, OmpError> {
        let req = element_with_children("create_target", &[
            ("name",    target.name.as_str()),
            ("hosts",   target.hosts.as_str()),
            ("comment", target.comment.as_str()),
        ]);
        let resp = self.send_and_parse(&req).await?;
        let id = resp.extract(|root| Ok(root.require("create_target_response")?.require_attr("id")?.to_string()))?;
        log::info!("[omp] Created target {:?} ({id})", target.name);
        Ok(id)
    }

    pub async fn delete_target(&mut self, id: &str) -> Result<(), OmpError> {
        self.send_and_parse(&attributed_element("delete_target", &[("target_id", id)])).await?;
        Ok(())
    }

    /// Every target the user can see.
    pub async fn targets(&mut self) -> Result<Vec<Target>, OmpError> {
        let resp = self.send_and_parse(&attributed_element("get_targets", &[])).await?;
        resp.extract(|root| {
            root.find_all("get_targets_response/target")
                .into_iter()
                .map(Target::from_element)
                .collect()
        })
    }

    /// One target by id.
    pub async fn target(&mut self, id: &str) -> Result<Target, OmpError> {
        let resp = self
            .send_and_parse(&attributed_element("get_targets", &[("target_id", id)]))
            .await?;
        resp.extract(|root| Target::from_element(root.require("get_targets_response/target")?))
    }

    /// The unparsed `get_targets` response.
    pub async fn targets_raw(&mut self) -> Result<Vec<u8>, OmpError> {
        self.send_raw(&attributed_element("get_targets", &[])).await
    }
}
