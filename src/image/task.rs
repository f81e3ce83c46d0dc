//! Asynchronous image task wire types and the per-poll decision.

use serde::{Deserialize, Serialize};

/// Status of a remote image-generation task.
///
/// The service spells success `SUCCEED`; unknown values are preserved and
/// treated as still-running rather than rejected, so a new intermediate
/// status on the server side cannot break the poller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    /// Task finished and produced output.
    Succeed,
    /// Task failed on the server.
    Failed,
    /// Task was canceled on the server.
    Canceled,
    /// Task is queued.
    Pending,
    /// Task is executing.
    Running,
    /// Any status value this client does not know about.
    Other(String),
}

impl TaskStatus {
    /// True for states the task can never leave.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeed | Self::Failed | Self::Canceled)
    }

    /// Wire representation of the status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Succeed => "SUCCEED",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "SUCCEED" | "SUCCEEDED" => Self::Succeed,
            "FAILED" => Self::Failed,
            "CANCELED" | "CANCELLED" => Self::Canceled,
            "PENDING" => Self::Pending,
            "RUNNING" | "PROCESSING" => Self::Running,
            _ => Self::Other(s),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_owned()
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single image reference returned by a completed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutput {
    /// Base64-encoded image bytes, ready to decode locally.
    Inline(String),
    /// Remote URL the image must be fetched from.
    Url(String),
}

impl ImageOutput {
    /// Classifies a raw output string from the wire.
    ///
    /// The service usually returns plain URLs, but some model deployments
    /// return base64 (bare or as a `data:` URL) instead.
    pub fn from_wire(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_owned())
        } else if let Some(rest) = raw.strip_prefix("data:") {
            match rest.split_once("base64,") {
                Some((_, b64)) => Self::Inline(b64.to_owned()),
                None => Self::Inline(rest.to_owned()),
            }
        } else {
            Self::Inline(raw.to_owned())
        }
    }
}

/// Response body of the task status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskResponse {
    /// Current task status.
    pub task_status: TaskStatus,
    /// Output image URLs (or inline payloads), present once the task succeeds.
    #[serde(default)]
    pub output_images: Vec<String>,
    /// Alternate output shape some deployments use.
    #[serde(default)]
    pub data: Vec<InlineImageData>,
}

/// Inline base64 output entry (`data[].b64_json` shape).
#[derive(Debug, Clone, Deserialize)]
pub struct InlineImageData {
    /// Base64-encoded image bytes.
    pub b64_json: String,
}

impl TaskResponse {
    /// Collects all outputs, inline entries first, classified for resolution.
    pub fn outputs(&self) -> Vec<ImageOutput> {
        self.data
            .iter()
            .map(|d| ImageOutput::Inline(d.b64_json.clone()))
            .chain(self.output_images.iter().map(|s| ImageOutput::from_wire(s)))
            .collect()
    }
}

/// What the poller should do after seeing one status response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollDecision {
    /// Task produced output; stop polling and resolve.
    Ready(Vec<ImageOutput>),
    /// Task is still running (or succeeded with no output yet); poll again.
    Wait,
    /// Task reached a terminal failure state; stop polling.
    Fail(TaskStatus),
}

/// Maps one status response to a poll decision.
///
/// `SUCCEED` with an empty output list counts as not-yet-ready: the task
/// record can become visible before its outputs do, so polling continues
/// until the budget runs out.
pub fn decide(response: &TaskResponse) -> PollDecision {
    match response.task_status {
        TaskStatus::Succeed => {
            let outputs = response.outputs();
            if outputs.is_empty() {
                PollDecision::Wait
            } else {
                PollDecision::Ready(outputs)
            }
        }
        TaskStatus::Failed | TaskStatus::Canceled => {
            PollDecision::Fail(response.task_status.clone())
        }
        _ => PollDecision::Wait,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: &str, outputs: &[&str]) -> TaskResponse {
        TaskResponse {
            task_status: TaskStatus::from(status.to_owned()),
            output_images: outputs.iter().map(|s| (*s).to_owned()).collect(),
            data: Vec::new(),
        }
    }

    #[test]
    fn test_status_from_wire() {
        assert_eq!(TaskStatus::from("SUCCEED".to_owned()), TaskStatus::Succeed);
        assert_eq!(
            TaskStatus::from("SUCCEEDED".to_owned()),
            TaskStatus::Succeed
        );
        assert_eq!(TaskStatus::from("FAILED".to_owned()), TaskStatus::Failed);
        assert_eq!(
            TaskStatus::from("CANCELED".to_owned()),
            TaskStatus::Canceled
        );
        assert_eq!(TaskStatus::from("PENDING".to_owned()), TaskStatus::Pending);
        assert_eq!(TaskStatus::from("RUNNING".to_owned()), TaskStatus::Running);
        assert_eq!(
            TaskStatus::from("WARMING_UP".to_owned()),
            TaskStatus::Other("WARMING_UP".into())
        );
    }

    #[test]
    fn test_status_terminality() {
        assert!(TaskStatus::Succeed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Canceled.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(!TaskStatus::Other("WARMING_UP".into()).is_terminal());
    }

    #[test]
    fn test_task_response_deserialization() {
        let json = r#"{
            "task_status": "SUCCEED",
            "output_images": ["https://cdn.example.com/out.png"]
        }"#;
        let resp: TaskResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.task_status, TaskStatus::Succeed);
        assert_eq!(
            resp.outputs(),
            vec![ImageOutput::Url("https://cdn.example.com/out.png".into())]
        );
    }

    #[test]
    fn test_task_response_b64_shape() {
        let json = r#"{
            "task_status": "SUCCEED",
            "data": [{"b64_json": "aGVsbG8="}]
        }"#;
        let resp: TaskResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.outputs(), vec![ImageOutput::Inline("aGVsbG8=".into())]);
    }

    #[test]
    fn test_output_classification() {
        assert_eq!(
            ImageOutput::from_wire("https://cdn.example.com/a.png"),
            ImageOutput::Url("https://cdn.example.com/a.png".into())
        );
        assert_eq!(
            ImageOutput::from_wire("data:image/png;base64,aGVsbG8="),
            ImageOutput::Inline("aGVsbG8=".into())
        );
        assert_eq!(
            ImageOutput::from_wire("aGVsbG8="),
            ImageOutput::Inline("aGVsbG8=".into())
        );
    }

    #[test]
    fn test_decide_ready_on_success_with_outputs() {
        let decision = decide(&response("SUCCEED", &["https://cdn.example.com/a.png"]));
        assert!(matches!(decision, PollDecision::Ready(outputs) if outputs.len() == 1));
    }

    #[test]
    fn test_decide_waits_on_empty_success() {
        assert_eq!(decide(&response("SUCCEED", &[])), PollDecision::Wait);
    }

    #[test]
    fn test_decide_waits_on_non_terminal() {
        assert_eq!(decide(&response("PENDING", &[])), PollDecision::Wait);
        assert_eq!(decide(&response("RUNNING", &[])), PollDecision::Wait);
        assert_eq!(decide(&response("WARMING_UP", &[])), PollDecision::Wait);
    }

    #[test]
    fn test_decide_fails_on_terminal_failure() {
        assert_eq!(
            decide(&response("FAILED", &[])),
            PollDecision::Fail(TaskStatus::Failed)
        );
        assert_eq!(
            decide(&response("CANCELED", &[])),
            PollDecision::Fail(TaskStatus::Canceled)
        );
    }
}
