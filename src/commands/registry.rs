//! Static command table.
//!
//! Every supported command is declared once with the number of arguments it
//! takes (not counting the command name). Arity checks happen here, before a
//! handler ever sees the arguments.

/// The handler a command name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Ping,
    Echo,
    Get,
    Set,
}

/// A command table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Uppercase command name
    pub name: &'static str,
    pub kind: CommandKind,
    /// Minimum number of arguments after the name
    pub min_args: usize,
    /// Maximum number of arguments after the name
    pub max_args: usize,
}

impl CommandSpec {
    /// Returns true if `argc` arguments satisfy this command's arity.
    #[inline]
    pub fn accepts(&self, argc: usize) -> bool {
        (self.min_args..=self.max_args).contains(&argc)
    }
}

/// Declared element count (name included) at which SET carries `PX <ttl>`.
pub const SET_WITH_TTL_LEN: usize = 5;

/// All commands the dispatcher understands.
pub const COMMAND_TABLE: &[CommandSpec] = &[
    CommandSpec {
        name: "PING",
        kind: CommandKind::Ping,
        min_args: 0,
        max_args: 0,
    },
    CommandSpec {
        name: "ECHO",
        kind: CommandKind::Echo,
        min_args: 1,
        max_args: 1,
    },
    CommandSpec {
        name: "GET",
        kind: CommandKind::Get,
        min_args: 1,
        max_args: 1,
    },
    // SET key value [PX milliseconds]
    CommandSpec {
        name: "SET",
        kind: CommandKind::Set,
        min_args: 2,
        max_args: SET_WITH_TTL_LEN - 1,
    },
];

/// Finds the table entry for an uppercase command name.
///
/// Matching is exact: no prefixes or abbreviations.
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMAND_TABLE.iter().find(|spec| spec.name == name)
}
