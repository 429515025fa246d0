//! Merge command tokenizer
//!
//! A comment is a command only when it is exactly the trigger word followed
//! by known flags. Text that starts with the trigger but does not parse is
//! reported back as unrecognized so the user learns about the typo.

/// A flag accepted after the trigger word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFlag {
    /// Merge even without a valid approval
    OverrideApproval,
}

impl CommandFlag {
    /// Every known flag, in usage order
    pub const ALL: [Self; 1] = [Self::OverrideApproval];

    /// Spelling on the command line
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OverrideApproval => "--override-approval",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.as_str() == token)
    }
}

/// Parsed merge intent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeCommand {
    /// `--override-approval` was given
    pub override_approval: bool,
}

impl MergeCommand {
    fn apply(&mut self, flag: CommandFlag) {
        match flag {
            CommandFlag::OverrideApproval => self.override_approval = true,
        }
    }
}

/// Result of inspecting a comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParse {
    /// Ordinary comment; ignore silently
    NotCommand,
    /// A well-formed merge command
    Command(MergeCommand),
    /// Looks like the trigger but does not parse
    Unrecognized {
        /// The offending text (trimmed)
        text: String,
    },
}

/// Inspect `text` for the merge command introduced by `trigger`
pub fn parse_command(text: &str, trigger: &str) -> CommandParse {
    let text = text.trim();
    if !text.starts_with(trigger) {
        return CommandParse::NotCommand;
    }
    let unrecognized = || CommandParse::Unrecognized {
        text: text.to_string(),
    };

    if text.lines().count() > 1 {
        return unrecognized();
    }

    let mut tokens = text.split_ascii_whitespace();
    if tokens.next() != Some(trigger) {
        return unrecognized();
    }

    let mut command = MergeCommand::default();
    let mut seen: Vec<CommandFlag> = Vec::new();
    for token in tokens {
        let Some(flag) = CommandFlag::parse(token) else {
            return unrecognized();
        };
        if seen.contains(&flag) {
            return unrecognized();
        }
        seen.push(flag);
        command.apply(flag);
    }

    CommandParse::Command(command)
}

/// Usage string shown in the unrecognized-command notice
pub fn command_usage(trigger: &str) -> String {
    let flags: Vec<String> = CommandFlag::ALL
        .iter()
        .map(|f| format!("[{}]", f.as_str()))
        .collect();
    format!("`{trigger} {}`", flags.join(" "))
}
