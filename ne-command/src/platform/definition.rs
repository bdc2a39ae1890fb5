//! Platform definition for vendor-specific configurations.

use memchr::{memchr, memrchr};
use regex::bytes::Regex;

/// Prompt, paging and error conventions of one device family.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "huawei_vrp").
    pub name: String,

    /// Matches the device prompt at the end of output.
    pub prompt_pattern: Regex,

    /// Substrings that mark a command as rejected by the device.
    pub failed_when_contains: Vec<String>,

    /// Commands to run when connection is established.
    pub on_open_commands: Vec<String>,

    /// Commands to run before connection is closed.
    pub on_close_commands: Vec<String>,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,
}

impl PlatformDefinition {
    /// Create a platform with the given prompt pattern.
    pub fn new(name: impl Into<String>, prompt_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            prompt_pattern: Regex::new(prompt_pattern)?,
            failed_when_contains: vec![],
            on_open_commands: vec![],
            on_close_commands: vec![],
            terminal_width: 511,
            terminal_height: 24,
        })
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Add an on_open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Add an on_close command.
    pub fn with_on_close_command(mut self, command: impl Into<String>) -> Self {
        self.on_close_commands.push(command.into());
        self
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Whether `text` ends in a device prompt.
    pub fn is_prompt(&self, text: &str) -> bool {
        self.prompt_pattern.is_match(text.as_bytes())
    }

    /// First failure pattern found in `output`.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|pattern| output.contains(pattern.as_str()))
            .map(String::as_str)
    }

    /// Strip the echoed command line and the trailing prompt line.
    pub fn normalize_output(&self, raw: &str, command: &str) -> String {
        let mut body = raw.as_bytes();

        if let Some(eol) = memchr(b'\n', body) {
            let first = String::from_utf8_lossy(&body[..eol]);
            if !command.is_empty() && first.contains(command) {
                body = &body[eol + 1..];
            }
        }

        let last_start = memrchr(b'\n', body).map_or(0, |pos| pos + 1);
        if self.prompt_pattern.is_match(&body[last_start..]) {
            body = &body[..last_start];
        }

        String::from_utf8_lossy(body)
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect::<Vec<_>>()
            .join("\n")
            .trim_end()
            .to_string()
    }
}
