//! # Slash Commands
//!
//! Input starting with `/` is parsed here instead of being posted.
//!
//! | Input                  | Effect                                        |
//! |------------------------|-----------------------------------------------|
//! | `/edit <id>`           | refill the input with `/edit <id> <original>` |
//! | `/edit <id> <text>`    | replace the message's text                    |
//! | `/thread <id> <text>`  | reply in the message's thread                 |
//! | `/<cmd> <text>`        | hand the command to the service               |
//!
//! `<id>` is the hex tag shown in the transcript (`[07]`).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::ingest::unescape;
use crate::core::message::ShortId;
use crate::core::transcript::{MessageRef, Transcript};
use crate::service::{ChatService, ServiceError};

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// The tag does not name a message in the loaded transcript.
    UnknownId(String),
    /// The input looked like a command but did not parse.
    Malformed(String),
    /// The service refused or failed the call.
    Service(ServiceError),
}

impl CommandError {
    /// Errors the user can fix by editing the input.
    pub fn is_user_input(&self) -> bool {
        matches!(self, CommandError::UnknownId(_) | CommandError::Malformed(_))
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownId(tag) => write!(f, "no message with id [{tag}]"),
            CommandError::Malformed(usage) => write!(f, "malformed command, usage: {usage}"),
            CommandError::Service(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<ServiceError> for CommandError {
    fn from(e: ServiceError) -> Self {
        CommandError::Service(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlashCommand {
    /// `/edit <id>`: fetch the original so it can be edited.
    EditFetch { tag: String },
    Edit { tag: String, text: String },
    Thread { tag: String, text: String },
    /// Anything else, e.g. `/giphy cats`.
    Passthrough { command: String, text: String },
}

/// What the caller should do with the input box after a command ran.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Done,
    /// Put this text into the input and keep editing.
    Refill(String),
}

const EDIT_USAGE: &str = "/edit <id> [text]";
const THREAD_USAGE: &str = "/thread <id> <text>";

struct Patterns {
    edit_fetch: Regex,
    edit: Regex,
    thread: Regex,
    passthrough: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            edit_fetch: Regex::new(r"(?s)^/edit\s+([0-9a-fA-F]+)\s*$")?,
            edit: Regex::new(r"(?s)^/edit\s+([0-9a-fA-F]+)\s+(.+)$")?,
            thread: Regex::new(r"(?s)^/thread\s+([0-9a-fA-F]+)\s+(.+)$")?,
            passthrough: Regex::new(r"(?s)^(/\S+)\s*(.*)$")?,
        })
    }
}

static PATTERNS: LazyLock<Option<Patterns>> = LazyLock::new(|| Patterns::compile().ok());

/// Parse one line of input that starts with `/`. Patterns are tried in
/// table order; the first match wins.
pub fn parse(input: &str) -> Result<SlashCommand, CommandError> {
    let Some(p) = PATTERNS.as_ref() else {
        return Err(CommandError::Malformed(input.to_string()));
    };

    if let Some(caps) = p.edit_fetch.captures(input) {
        return Ok(SlashCommand::EditFetch {
            tag: caps[1].to_string(),
        });
    }
    if let Some(caps) = p.edit.captures(input) {
        return Ok(SlashCommand::Edit {
            tag: caps[1].to_string(),
            text: caps[2].to_string(),
        });
    }
    if let Some(caps) = p.thread.captures(input) {
        return Ok(SlashCommand::Thread {
            tag: caps[1].to_string(),
            text: caps[2].to_string(),
        });
    }

    let Some(caps) = p.passthrough.captures(input) else {
        return Err(CommandError::Malformed("/<command> [text]".to_string()));
    };
    let command = caps[1].to_string();
    match command.as_str() {
        "/edit" => Err(CommandError::Malformed(EDIT_USAGE.to_string())),
        "/thread" => Err(CommandError::Malformed(THREAD_USAGE.to_string())),
        _ => Ok(SlashCommand::Passthrough {
            command,
            text: caps[2].to_string(),
        }),
    }
}

/// Carry out `cmd` against `channel`, resolving tags through `transcript`.
pub async fn execute(
    cmd: SlashCommand,
    channel: &str,
    transcript: &Transcript,
    service: &dyn ChatService,
) -> Result<Outcome, CommandError> {
    match cmd {
        SlashCommand::EditFetch { tag } => {
            let target = resolve(transcript, &tag)?;
            let original = service
                .fetch_message(channel, &target.ts, target.thread_ts.as_deref())
                .await?;
            Ok(Outcome::Refill(format!(
                "/edit {tag} {}",
                unescape(&original.text)
            )))
        }
        SlashCommand::Edit { tag, text } => {
            let target = resolve(transcript, &tag)?;
            service.edit(channel, &target.ts, &text).await?;
            Ok(Outcome::Done)
        }
        SlashCommand::Thread { tag, text } => {
            let target = resolve(transcript, &tag)?;
            let thread_ts = target.thread_ts.as_deref().unwrap_or(&target.ts);
            service.reply(channel, thread_ts, &text).await?;
            Ok(Outcome::Done)
        }
        SlashCommand::Passthrough { command, text } => {
            service.command(channel, &command, &text).await?;
            Ok(Outcome::Done)
        }
    }
}

fn resolve(transcript: &Transcript, tag: &str) -> Result<MessageRef, CommandError> {
    ShortId::parse(tag)
        .and_then(|id| transcript.lookup(id))
        .ok_or_else(|| CommandError::UnknownId(tag.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{Message, MessageKind};
    use crate::service::RawMessage;
    use crate::test_support::MockService;
    use chrono::Local;

    fn transcript() -> Transcript {
        let mut t = Transcript::new();
        t.append(Message {
            time: Local::now(),
            author: "alice".to_string(),
            text: "hello".to_string(),
            kind: MessageKind::Normal,
            short_id: Some(ShortId(7)),
            ts: "100.7".to_string(),
            thread_ts: None,
        });
        t.append(Message {
            time: Local::now(),
            author: "bob".to_string(),
            text: "in thread".to_string(),
            kind: MessageKind::Reply,
            short_id: Some(ShortId(8)),
            ts: "100.8".to_string(),
            thread_ts: Some("100.7".to_string()),
        });
        t
    }

    #[test]
    fn parses_in_table_order() {
        assert_eq!(
            parse("/edit 7"),
            Ok(SlashCommand::EditFetch {
                tag: "7".to_string()
            })
        );
        assert_eq!(
            parse("/edit 07 new words"),
            Ok(SlashCommand::Edit {
                tag: "07".to_string(),
                text: "new words".to_string()
            })
        );
        assert_eq!(
            parse("/thread 1a on it"),
            Ok(SlashCommand::Thread {
                tag: "1a".to_string(),
                text: "on it".to_string()
            })
        );
        assert_eq!(
            parse("/giphy party parrot"),
            Ok(SlashCommand::Passthrough {
                command: "/giphy".to_string(),
                text: "party parrot".to_string()
            })
        );
    }

    #[test]
    fn multi_line_text_is_kept() {
        assert_eq!(
            parse("/edit 7 first\nsecond"),
            Ok(SlashCommand::Edit {
                tag: "7".to_string(),
                text: "first\nsecond".to_string()
            })
        );
    }

    #[test]
    fn malformed_builtins_are_rejected() {
        assert!(matches!(parse("/edit"), Err(CommandError::Malformed(_))));
        assert!(matches!(parse("/edit zz"), Err(CommandError::Malformed(_))));
        assert!(matches!(parse("/thread 7"), Err(CommandError::Malformed(_))));
        assert!(matches!(parse("/"), Err(CommandError::Malformed(_))));
    }

    #[tokio::test]
    async fn edit_fetch_refills_with_original_text() {
        let service = MockService::new().with_message(
            "C1",
            RawMessage {
                ts: "100.7".to_string(),
                text: "hello".to_string(),
                ..Default::default()
            },
        );
        let outcome = execute(parse("/edit 7").unwrap(), "C1", &transcript(), &service)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Refill("/edit 7 hello".to_string()));
    }

    #[tokio::test]
    async fn edit_fetch_refill_is_unescaped() {
        let service = MockService::new().with_message(
            "C1",
            RawMessage {
                ts: "100.7".to_string(),
                text: "x &lt; y &amp; z".to_string(),
                ..Default::default()
            },
        );
        let outcome = execute(parse("/edit 7").unwrap(), "C1", &transcript(), &service)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Refill("/edit 7 x < y & z".to_string()));
    }

    #[tokio::test]
    async fn edit_calls_service_with_timestamp() {
        let service = MockService::new();
        let outcome = execute(
            parse("/edit 7 world").unwrap(),
            "C1",
            &transcript(),
            &service,
        )
        .await
        .unwrap();
        assert_eq!(outcome, Outcome::Done);
        assert_eq!(service.calls(), vec!["edit C1 100.7 world".to_string()]);
    }

    #[tokio::test]
    async fn thread_targets_parent_of_a_reply() {
        let service = MockService::new();
        let t = transcript();
        execute(parse("/thread 7 top").unwrap(), "C1", &t, &service)
            .await
            .unwrap();
        execute(parse("/thread 8 nested").unwrap(), "C1", &t, &service)
            .await
            .unwrap();
        assert_eq!(
            service.calls(),
            vec![
                "reply C1 100.7 top".to_string(),
                "reply C1 100.7 nested".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn unknown_id_is_a_user_error() {
        let service = MockService::new();
        let err = execute(parse("/edit 42 x").unwrap(), "C1", &transcript(), &service)
            .await
            .unwrap_err();
        assert_eq!(err, CommandError::UnknownId("42".to_string()));
        assert!(err.is_user_input());
        assert!(service.calls().is_empty());
    }

    #[test]
    fn vanished_original_is_a_service_error() {
        let service = MockService::new();
        let err = tokio_test::block_on(execute(
            parse("/edit 7").unwrap(),
            "C1",
            &transcript(),
            &service,
        ))
        .unwrap_err();
        assert!(matches!(err, CommandError::Service(ServiceError::Api { .. })));
        assert!(!err.is_user_input());
        assert_eq!(service.calls(), vec!["fetch C1 100.7".to_string()]);
    }

    #[tokio::test]
    async fn passthrough_goes_to_service() {
        let service = MockService::new();
        execute(parse("/shrug").unwrap(), "C1", &transcript(), &service)
            .await
            .unwrap();
        assert_eq!(service.calls(), vec!["command C1 /shrug ".to_string()]);
    }
}
