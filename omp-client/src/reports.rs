//! Reports and report formats.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use omp_wire::Transport;
use omp_xml::{Element, XmlError, attributed_element};

use crate::errors::{Failure, OmpError};
use crate::Session;

/// Formats whose report body the manager sends base64-encoded.
const BASE64_FORMATS: &[&str] = &["HTML", "NBE", "PDF", "ARF", "TXT", "LaTeX"];

/// `true` when reports in format `name` arrive base64-encoded (case-insensitive).
pub fn is_base64_format(name: &str) -> bool {
    BASE64_FORMATS.iter().any(|f| f.eq_ignore_ascii_case(name))
}

// ─── ReportFormat ─────────────────────────────────────────────────────────────

/// An output format the manager can render reports in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportFormat {
    pub id:           String,
    pub name:         String,
    pub extension:    String,
    pub content_type: String,
    pub summary:      Option<String>,
}

impl ReportFormat {
    fn from_element(el: &Element) -> Result<Self, XmlError> {
        Ok(Self {
            id:           el.require_attr("id")?.to_string(),
            name:         el.require_text("name")?.to_string(),
            extension:    el.opt_text("extension").unwrap_or_default(),
            content_type: el.opt_text("content_type").unwrap_or_default(),
            summary:      el.opt_text("summary"),
        })
    }
}

// ─── ReportSummary ────────────────────────────────────────────────────────────

/// One entry of `get_reports` without a format: enough to pick a report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportSummary {
    pub id:              String,
    pub task_id:         Option<String>,
    pub scan_run_status: Option<String>,
}

impl ReportSummary {
    fn from_element(el: &Element) -> Result<Self, XmlError> {
        Ok(Self {
            id:              el.require_attr("id")?.to_string(),
            task_id:         el.child("task").and_then(|t| t.attr("id")).map(str::to_owned),
            scan_run_status: el.opt_text("scan_run_status"),
        })
    }
}

fn formats_in(root: &Element) -> Result<Vec<ReportFormat>, XmlError> {
    root.find_all("get_report_formats_response/report_format")
        .into_iter()
        .map(ReportFormat::from_element)
        .collect()
}

// ─── Session methods ──────────────────────────────────────────────────────────

impl<T: Transport> Session<T> {
    pub async fn report_formats(&mut self) -> Result<Vec<ReportFormat>, OmpError> {
        let resp = self.send_and_parse(&attributed_element("get_report_formats", &[])).await?;
        resp.extract(formats_in)
    }

    /// Format lookup by name, ignoring ASCII case: `"pdf"` finds `PDF`.
    pub async fn report_format_by_name(&mut self, name: &str) -> Result<Option<ReportFormat>, OmpError> {
        Ok(self.report_formats().await?.into_iter().find(|f| f.name.eq_ignore_ascii_case(name)))
    }

    pub async fn reports(&mut self) -> Result<Vec<ReportSummary>, OmpError> {
        let resp = self.send_and_parse(&attributed_element("get_reports", &[])).await?;
        resp.extract(|root| {
            root.find_all("get_reports_response/report")
                .into_iter()
                .map(ReportSummary::from_element)
                .collect()
        })
    }

    /// The unparsed `get_reports` response for one report in one format.
    pub async fn report_raw(&mut self, id: &str, format_id: &str) -> Result<Vec<u8>, OmpError> {
        self.send_raw(&attributed_element("get_reports", &[("report_id", id), ("format_id", format_id)]))
            .await
    }

    /// Fetch a report rendered in the format called `format_name`.
    ///
    /// Binary and document formats (see [`is_base64_format`]) come back
    /// decoded; any other format yields the response XML as received.
    pub async fn report(&mut self, id: &str, format_name: &str) -> Result<Vec<u8>, OmpError> {
        let listing = self.send_and_parse(&attributed_element("get_report_formats", &[])).await?;
        let format = listing.extract(|root| {
            formats_in(root)?
                .into_iter()
                .find(|f| f.name.eq_ignore_ascii_case(format_name))
                .ok_or_else(|| XmlError::MissingElement(format!("report_format[name={format_name}]")))
        })?;

        let req = attributed_element("get_reports", &[("report_id", id), ("format_id", format.id.as_str())]);
        let resp = self.send_and_parse(&req).await?;
        if !is_base64_format(&format.name) {
            return Ok(resp.into_raw());
        }

        let body = resp.extract(|root| root.require_text("get_reports_response/report"))?;
        let decoded = STANDARD
            .decode(body.split_ascii_whitespace().collect::<String>())
            .map_err(|e| {
                let bad = XmlError::InvalidValue {
                    element: "report".into(),
                    what:    format!("base64 body ({e})"),
                    value:   body.chars().take(32).collect(),
                };
                OmpError::classify(Failure::Xml(bad), &req, resp.raw())
            })?;
        log::info!("[omp] Report {id} fetched as {} ({} bytes)", format.name, decoded.len());
        Ok(decoded)
    }

    pub async fn delete_report(&mut self, id: &str) -> Result<(), OmpError> {
        self.send_and_parse(&attributed_element("delete_report", &[("report_id", id)])).await?;
        Ok(())
    }
}
