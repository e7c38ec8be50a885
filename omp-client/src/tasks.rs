//! Scan tasks: creation, control and status.

use omp_wire::Transport;
use omp_xml::{Element, XmlError, attributed_element, mixed_element};

use crate::{OmpError, Session};

// ─── Task ─────────────────────────────────────────────────────────────────────

/// Status string the manager reports for a completed task.
pub const STATUS_DONE: &str = "Done";

/// A task as listed by `get_tasks`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub id:           String,
    pub name:         String,
    pub comment:      Option<String>,
    /// `New`, `Requested`, `Running`, `Stopped`, `Done`, …
    pub status:       String,
    /// Percent complete; `-1` when the task is not running.
    pub progress:     i32,
    pub first_report: Option<String>,
    pub last_report:  Option<String>,
}

impl Task {
    fn from_element(el: &Element) -> Result<Self, XmlError> {
        Ok(Self {
            id:           el.require_attr("id")?.to_string(),
            name:         el.require_text("name")?.to_string(),
            comment:      el.opt_text("comment"),
            status:       el.require_text("status")?.to_string(),
            progress:     progress_of(el)?,
            first_report: report_id(el, "first_report"),
            last_report:  report_id(el, "last_report"),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.status == STATUS_DONE
    }
}

fn progress_of(task: &Element) -> Result<i32, XmlError> {
    let raw = task.require_text("progress")?;
    if raw.is_empty() {
        return Ok(-1);
    }
    raw.parse().map_err(|_| XmlError::InvalidValue {
        element: "progress".into(),
        what:    "percentage".into(),
        value:   raw.to_string(),
    })
}

fn report_id(task: &Element, slot: &str) -> Option<String> {
    task.find(slot)?.child("report")?.attr("id").map(str::to_owned)
}

/// Arguments to [`Session::create_task`].
#[derive(Clone, Debug, Default)]
pub struct NewTask {
    pub name:      String,
    pub comment:   String,
    pub config_id: String,
    pub target_id: String,
}

impl NewTask {
    pub fn new(name: impl Into<String>, config_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            name:      name.into(),
            comment:   String::new(),
            config_id: config_id.into(),
            target_id: target_id.into(),
        }
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into(); self
    }
}

// ─── Session methods ──────────────────────────────────────────────────────────

impl<T: Transport> Session<T> {
    /// Create a task binding a scan configuration to a target; returns its id.
    pub async fn create_task(&mut self, task: &NewTask) -> Result<String, OmpError> {
        let req = mixed_element(
            "create_task",
            &[("name", task.name.as_str()), ("comment", task.comment.as_str())],
            "id",
            &[("config", task.config_id.as_str()), ("target", task.target_id.as_str())],
        );
        let resp = self.send_and_parse(&req).await?;
        let id = resp.extract(|root| Ok(root.require("create_task_response")?.require_attr("id")?.to_string()))?;
        log::info!("[omp] Created task {:?} ({id})", task.name);
        Ok(id)
    }

    pub async fn delete_task(&mut self, id: &str) -> Result<(), OmpError> {
        self.task_command("delete_task", id).await.map(drop)
    }

    /// Start a task. Returns the id of the report the run writes into, when
    /// the manager names one.
    pub async fn start_task(&mut self, id: &str) -> Result<Option<String>, OmpError> {
        let resp = self.task_command("start_task", id).await?;
        Ok(resp.find("start_task_response/report_id").map(|el| el.text().to_string()))
    }

    pub async fn stop_task(&mut self, id: &str) -> Result<(), OmpError> {
        self.task_command("stop_task", id).await.map(drop)
    }

    pub async fn pause_task(&mut self, id: &str) -> Result<(), OmpError> {
        self.task_command("pause_task", id).await.map(drop)
    }

    /// Resume a paused or stopped task, or start it if it never ran.
    pub async fn resume_or_start_task(&mut self, id: &str) -> Result<(), OmpError> {
        self.task_command("resume_or_start_task", id).await.map(drop)
    }

    pub async fn tasks(&mut self) -> Result<Vec<Task>, OmpError> {
        let resp = self.send_and_parse(&attributed_element("get_tasks", &[])).await?;
        resp.extract(|root| {
            root.find_all("get_tasks_response/task")
                .into_iter()
                .map(Task::from_element)
                .collect()
        })
    }

    pub async fn task(&mut self, id: &str) -> Result<Task, OmpError> {
        let resp = self
            .send_and_parse(&attributed_element("get_tasks", &[("task_id", id)]))
            .await?;
        resp.extract(|root| Task::from_element(root.require("get_tasks_response/task")?))
    }

    pub async fn task_progress(&mut self, id: &str) -> Result<i32, OmpError> {
        Ok(self.task(id).await?.progress)
    }

    pub async fn task_finished(&mut self, id: &str) -> Result<bool, OmpError> {
        Ok(self.task(id).await?.is_finished())
    }

    async fn task_command(&mut self, command: &str, id: &str) -> Result<crate::Response, OmpError> {
        let resp = self.send_and_parse(&attributed_element(command, &[("task_id", id)])).await?;
        log::debug!("[omp] <{command}> {id} accepted");
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_xml(status: &str, progress: &str) -> Element {
        let raw = format!(
            r#"<task id="t1"><name>weekly</name><comment></comment><status>{status}</status>
               <progress>{progress}</progress>
               <last_report><report id="r9"/></last_report></task>"#
        );
        omp_xml::parse(raw.as_bytes()).unwrap().child("task").unwrap().clone()
    }

    #[test]
    fn done_means_finished() {
        let t = Task::from_element(&task_xml("Done", "-1")).unwrap();
        assert!(t.is_finished());
        assert_eq!(t.progress, -1);
        assert_eq!(t.comment, None);
        assert_eq!(t.first_report, None);
        assert_eq!(t.last_report.as_deref(), Some("r9"));
    }

    #[test]
    fn running_is_not_finished() {
        let t = Task::from_element(&task_xml("Running", "42")).unwrap();
        assert!(!t.is_finished());
        assert_eq!(t.progress, 42);
    }

    #[test]
    fn garbled_progress_is_rejected() {
        let err = Task::from_element(&task_xml("Running", "lots")).unwrap_err();
        assert!(matches!(err, XmlError::InvalidValue { .. }));
    }
}
