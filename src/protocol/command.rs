//! User command vocabulary
// (c) 2025 the mftp developers

use super::wire::ControlMessage;

/// A command entered at the client prompt.
///
/// Each variant corresponds to one word of the REPL vocabulary. Variants
/// carrying a `String` require an argument; the others refuse one.
#[derive(Debug, Clone, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    /// Gracefully shut down the session.
    Exit,
    /// Change the client's working directory. Local only.
    Cd(String),
    /// Change the server session's working directory.
    Rcd(String),
    /// List the client's working directory through the pager. Local only.
    Ls,
    /// List the server session's working directory.
    Rls,
    /// Retrieve a file from the server into the client's working directory.
    Get(String),
    /// Retrieve a file from the server and present it through the pager.
    Show(String),
    /// Send a local file into the server session's working directory.
    Put(String),
}

/// Why a line of user input did not parse as a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unrecognized command")]
    UnknownCommand,
    #[error("command requires an argument")]
    MissingArgument,
    #[error("command takes no argument")]
    UnexpectedArgument,
}

impl Command {
    /// Parses one line of user input.
    ///
    /// The first whitespace-delimited word selects the command; the rest of
    /// the line, trimmed on the left, is the argument. The argument must be
    /// present exactly when the command requires one.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim_start();
        let word_end = line
            .find(|c: char| c.is_whitespace())
            .unwrap_or(line.len());
        let (word, rest) = line.split_at(word_end);
        let arg = rest.trim_start();

        let takes_arg = !arg.is_empty();
        let require_arg = || {
            if takes_arg {
                Ok(arg.to_string())
            } else {
                Err(ParseError::MissingArgument)
            }
        };
        let forbid_arg = |cmd: Command| {
            if takes_arg {
                Err(ParseError::UnexpectedArgument)
            } else {
                Ok(cmd)
            }
        };

        match word {
            "exit" => forbid_arg(Command::Exit),
            "cd" => Ok(Command::Cd(require_arg()?)),
            "rcd" => Ok(Command::Rcd(require_arg()?)),
            "ls" => forbid_arg(Command::Ls),
            "rls" => forbid_arg(Command::Rls),
            "get" => Ok(Command::Get(require_arg()?)),
            "show" => Ok(Command::Show(require_arg()?)),
            "put" => Ok(Command::Put(require_arg()?)),
            _ => Err(ParseError::UnknownCommand),
        }
    }

    /// The command's argument, if it carries one.
    #[must_use]
    pub fn argument(&self) -> Option<&str> {
        match self {
            Command::Exit | Command::Ls | Command::Rls => None,
            Command::Cd(arg)
            | Command::Rcd(arg)
            | Command::Get(arg)
            | Command::Show(arg)
            | Command::Put(arg) => Some(arg),
        }
    }

    /// Whether this command involves the server at all.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        !matches!(self, Command::Cd(_) | Command::Ls)
    }

    /// Whether this command transfers a payload over a data connection.
    #[must_use]
    pub fn needs_data(&self) -> bool {
        matches!(
            self,
            Command::Rls | Command::Get(_) | Command::Show(_) | Command::Put(_)
        )
    }

    /// The control message this command sends, or `None` for local-only
    /// commands.
    #[must_use]
    pub fn to_wire(&self) -> Option<ControlMessage> {
        match self {
            Command::Cd(_) | Command::Ls => None,
            Command::Exit => Some(ControlMessage::Quit),
            Command::Rcd(arg) => Some(ControlMessage::Chdir(arg.clone())),
            Command::Rls => Some(ControlMessage::List),
            Command::Get(arg) => Some(ControlMessage::Get(arg.clone())),
            Command::Show(arg) => Some(ControlMessage::Show(arg.clone())),
            Command::Put(arg) => Some(ControlMessage::Put(arg.clone())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Command, ParseError};
    use crate::protocol::ControlMessage;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_whole_vocabulary() {
        assert_eq!(Command::parse("exit"), Ok(Command::Exit));
        assert_eq!(Command::parse("cd /tmp"), Ok(Command::Cd("/tmp".into())));
        assert_eq!(Command::parse("rcd /tmp"), Ok(Command::Rcd("/tmp".into())));
        assert_eq!(Command::parse("ls"), Ok(Command::Ls));
        assert_eq!(Command::parse("rls"), Ok(Command::Rls));
        assert_eq!(Command::parse("get a.txt"), Ok(Command::Get("a.txt".into())));
        assert_eq!(
            Command::parse("show a.txt"),
            Ok(Command::Show("a.txt".into()))
        );
        assert_eq!(Command::parse("put a.txt"), Ok(Command::Put("a.txt".into())));
    }

    #[test]
    fn argument_shape_is_enforced() {
        assert_eq!(Command::parse("get"), Err(ParseError::MissingArgument));
        assert_eq!(Command::parse("cd"), Err(ParseError::MissingArgument));
        assert_eq!(Command::parse("exit now"), Err(ParseError::UnexpectedArgument));
        assert_eq!(Command::parse("ls -l"), Err(ParseError::UnexpectedArgument));
    }

    #[test]
    fn unknown_words_are_rejected() {
        assert_eq!(Command::parse("quit"), Err(ParseError::UnknownCommand));
        assert_eq!(Command::parse("getx file"), Err(ParseError::UnknownCommand));
    }

    #[test]
    fn whitespace_handling() {
        // Interior and trailing whitespace belongs to the argument.
        assert_eq!(
            Command::parse("get  spaced name"),
            Ok(Command::Get("spaced name".into()))
        );
        assert_eq!(Command::parse("  rls"), Ok(Command::Rls));
    }

    #[test]
    fn display_names_match_the_vocabulary() {
        assert_eq!(Command::Exit.to_string(), "exit");
        assert_eq!(Command::Get("x".into()).to_string(), "get");
        assert_eq!(Command::Rcd("x".into()).to_string(), "rcd");
    }

    #[test]
    fn predicates() {
        assert!(!Command::Cd("x".into()).is_remote());
        assert!(!Command::Ls.is_remote());
        assert!(Command::Exit.is_remote());
        assert!(Command::Rcd("x".into()).is_remote());

        assert!(Command::Rls.needs_data());
        assert!(Command::Put("x".into()).needs_data());
        assert!(!Command::Exit.needs_data());
        assert!(!Command::Rcd("x".into()).needs_data());
    }

    #[test]
    fn wire_round_trip() {
        // A parsed command must arrive at the server as the same kind with
        // the same argument.
        for line in ["exit", "rcd /tmp", "rls", "get f", "show f", "put f"] {
            let cmd = Command::parse(line).unwrap();
            let msg = cmd.to_wire().unwrap();
            let encoded = msg.encode();
            let decoded = ControlMessage::decode(encoded.trim_end()).unwrap();
            assert_eq!(decoded, msg, "round trip failed for {line:?}");
        }
    }

    #[test]
    fn local_commands_have_no_wire_form() {
        assert_eq!(Command::Ls.to_wire(), None);
        assert_eq!(Command::Cd("x".into()).to_wire(), None);
    }
}
