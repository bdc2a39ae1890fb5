//! Command output types.

use std::ops::Index;
use std::time::Duration;

use serde::Serialize;

/// Response from a single command execution on the device.
#[derive(Debug, Clone)]
pub struct Response {
    /// The command that was executed.
    pub command: String,

    /// The command output (normalized - command echo and trailing prompt removed).
    pub result: String,

    /// The raw output before normalization.
    pub raw_result: String,

    /// The prompt that was matched at the end.
    pub prompt: String,

    /// Time taken to execute the command.
    pub elapsed: Duration,

    /// Failure message if the command failed (based on failure patterns).
    pub failure_message: Option<String>,
}

impl Response {
    /// Create a new successful response.
    pub fn new(
        command: impl Into<String>,
        result: impl Into<String>,
        raw_result: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            result: result.into(),
            raw_result: raw_result.into(),
            prompt: prompt.into(),
            elapsed,
            failure_message: None,
        }
    }

    /// Mark the response as failed with the matched failure text.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }

    /// Check if the response indicates success.
    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}

/// Outputs of one round, index-aligned with the commands that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResponseSet(Vec<String>);

impl ResponseSet {
    /// Wrap raw outputs, one per command.
    pub fn new(outputs: Vec<String>) -> Self {
        Self(outputs)
    }

    /// Number of outputs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no outputs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Output at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// All outputs in command order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Each output split on newlines.
    pub fn to_lines(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|output| output.split('\n').map(str::to_string).collect())
            .collect()
    }

    /// Take the outputs.
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Index<usize> for ResponseSet {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.0[index]
    }
}

impl From<Vec<String>> for ResponseSet {
    fn from(outputs: Vec<String>) -> Self {
        Self(outputs)
    }
}

impl From<Vec<Response>> for ResponseSet {
    fn from(responses: Vec<Response>) -> Self {
        Self(responses.into_iter().map(|r| r.result).collect())
    }
}

impl<'a> FromIterator<&'a str> for ResponseSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_lines_splits_each_output() {
        let set: ResponseSet = ["line1\nline2", "single"].into_iter().collect();
        assert_eq!(
            set.to_lines(),
            vec![
                vec!["line1".to_string(), "line2".to_string()],
                vec!["single".to_string()],
            ]
        );
    }

    #[test]
    fn test_from_responses_keeps_order() {
        let responses = vec![
            Response::new("display version", "VRP", "raw", "<HUAWEI>", Duration::ZERO),
            Response::new("display device", "Board", "raw", "<HUAWEI>", Duration::ZERO),
        ];
        let set = ResponseSet::from(responses);
        assert_eq!(set.len(), 2);
        assert_eq!(&set[0], "VRP");
        assert_eq!(set.get(1), Some("Board"));
        assert_eq!(set.get(2), None);
    }

    #[test]
    fn test_serializes_as_list() {
        let set: ResponseSet = ["a", "b"].into_iter().collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["a","b"]"#);
    }
}
