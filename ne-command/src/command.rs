//! Commands sent to the device each round.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single CLI command, optionally answering one interactive prompt.
///
/// Deserializes from either a bare string or a
/// `{command, prompt, answer}` object.
///
/// ```rust
/// use ne_command::Command;
///
/// let save = Command::new("save").with_prompt(r"\[Y/N\]", "y");
/// assert_eq!(save.command, "save");
/// assert!(save.is_interactive());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CommandEntry")]
pub struct Command {
    /// The literal text sent to the device.
    pub command: String,

    /// Regex the device may print after `command` that expects `answer`.
    pub prompt: Option<String>,

    /// Text sent when `prompt` is seen.
    pub answer: Option<String>,
}

impl Command {
    /// Create a plain, non-interactive command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            prompt: None,
            answer: None,
        }
    }

    /// Attach a prompt/answer pair.
    pub fn with_prompt(mut self, prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self.answer = Some(answer.into());
        self
    }

    /// Whether this command expects an interactive prompt.
    pub fn is_interactive(&self) -> bool {
        self.prompt.is_some()
    }

    /// Whether this is a read-only `display` command.
    pub fn is_display(&self) -> bool {
        self.command.trim_start().starts_with("dis")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)
    }
}

impl From<&str> for Command {
    fn from(command: &str) -> Self {
        Self::new(command)
    }
}

impl From<String> for Command {
    fn from(command: String) -> Self {
        Self::new(command)
    }
}

/// Wire form of a command entry.
#[derive(Deserialize)]
#[serde(untagged)]
enum CommandEntry {
    Text(String),
    Full {
        command: String,
        #[serde(default)]
        prompt: Option<String>,
        #[serde(default)]
        answer: Option<String>,
    },
}

impl From<CommandEntry> for Command {
    fn from(entry: CommandEntry) -> Self {
        match entry {
            CommandEntry::Text(command) => Command::new(command),
            CommandEntry::Full {
                command,
                prompt,
                answer,
            } => Command {
                command,
                prompt,
                answer,
            },
        }
    }
}

/// Drop everything but display commands, returning a warning per dropped command.
///
/// Used when the host asks for a dry run.
pub fn retain_display_commands(commands: &mut Vec<Command>) -> Vec<String> {
    let mut warnings = Vec::new();
    commands.retain(|item| {
        if item.is_display() {
            return true;
        }
        warnings.push(format!(
            "Only display commands are supported when using check_mode, not executing {}",
            item.command
        ));
        false
    });
    warnings
}
