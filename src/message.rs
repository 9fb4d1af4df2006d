// Message composition: pick a subject and body (command line, saved files,
// or built-in defaults), fill `{field}` placeholders from the sender profile,
// and write the filled-in text back out once the operator agrees to send.

use crate::profile::SenderProfile;
use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_SUBJECT: &str = "I urge Rep. Foushee to support a cease-fire";

pub const DEFAULT_MESSAGE: &str = "
Dear Rep. Foushee,

I am once again contacting you to ask you to call for a humanitarian cease-fire
in the ongoing conflict in Gaza, so that civilians do not die.

Sincerely,
- {first} {last}
";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("Unknown placeholder {{{0}}}: the sender profile has no such field")]
    UnknownPlaceholder(String),
    #[error("Unmatched brace at byte {0}; write {{{{ or }}}} for a literal brace")]
    UnmatchedBrace(usize),
}

/// A subject line and message body, either as templates or filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent {
    pub subject: String,
    pub body: String,
}

impl MessageContent {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        MessageContent {
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Built-in cease-fire message signed with `{first} {last}`.
    pub fn default_templates() -> Self {
        MessageContent::new(DEFAULT_SUBJECT, DEFAULT_MESSAGE)
    }

    /// Explicit subject and message from the command line. Only an argument
    /// list of exactly two entries counts; anything else yields `None`.
    pub fn from_args(args: &[String]) -> Option<Self> {
        match args {
            [subject, body] => Some(MessageContent::new(subject.as_str(), body.as_str())),
            _ => None,
        }
    }

    /// Fill every placeholder in both subject and body.
    pub fn render(&self, profile: &SenderProfile) -> Result<MessageContent, RenderError> {
        Ok(MessageContent {
            subject: render(&self.subject, profile)?,
            body: render(&self.body, profile)?,
        })
    }
}

/// Replace each `{key}` in `template` with the profile's value for `key`.
/// `{{` and `}}` stand for literal braces.
pub fn render(template: &str, profile: &SenderProfile) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        match c {
            '{' => {
                if let Some((_, '{')) = chars.peek() {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut end = None;
                for (i, c) in chars.by_ref() {
                    match c {
                        '}' => {
                            end = Some(i);
                            break;
                        }
                        '{' => return Err(RenderError::UnmatchedBrace(offset)),
                        _ => {}
                    }
                }
                let end = end.ok_or(RenderError::UnmatchedBrace(offset))?;
                let key = &template[offset + 1..end];
                let value = profile
                    .get(key)
                    .ok_or_else(|| RenderError::UnknownPlaceholder(key.to_string()))?;
                out.push_str(value);
            }
            '}' => {
                if let Some((_, '}')) = chars.peek() {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(RenderError::UnmatchedBrace(offset));
                }
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

/// The two plain-text files holding the last subject and message.
pub struct MessageStore {
    subject_path: PathBuf,
    message_path: PathBuf,
}

impl MessageStore {
    pub fn new(subject_path: impl Into<PathBuf>, message_path: impl Into<PathBuf>) -> Self {
        MessageStore {
            subject_path: subject_path.into(),
            message_path: message_path.into(),
        }
    }

    pub fn load_subject(&self) -> Result<Option<String>> {
        read_optional(&self.subject_path)
    }

    pub fn load_message(&self) -> Result<Option<String>> {
        read_optional(&self.message_path)
    }

    /// Resolve the templates to use: the command-line pair when given,
    /// otherwise each saved file that exists, otherwise the defaults.
    /// Progress lines go to `out`.
    pub fn resolve<W: Write + ?Sized>(&self, args: &[String], out: &mut W) -> Result<MessageContent> {
        if let Some(content) = MessageContent::from_args(args) {
            writeln!(out, "Using message from command line...")?;
            return Ok(content);
        }
        let subject = match self.load_subject()? {
            Some(subject) => {
                writeln!(out, "Loading {}...", file_name(&self.subject_path))?;
                subject
            }
            None => DEFAULT_SUBJECT.to_string(),
        };
        let body = match self.load_message()? {
            Some(body) => {
                writeln!(out, "Loading {}...", file_name(&self.message_path))?;
                body
            }
            None => DEFAULT_MESSAGE.to_string(),
        };
        Ok(MessageContent { subject, body })
    }

    /// Overwrite both files with `content`.
    pub fn save<W: Write + ?Sized>(&self, content: &MessageContent, out: &mut W) -> Result<()> {
        writeln!(out, "Saving {}...", file_name(&self.subject_path))?;
        std::fs::write(&self.subject_path, &content.subject)
            .with_context(|| format!("Failed to write {}", self.subject_path.display()))?;
        writeln!(out, "Saving {}...", file_name(&self.message_path))?;
        std::fs::write(&self.message_path, &content.body)
            .with_context(|| format!("Failed to write {}", self.message_path.display()))?;
        tracing::debug!(
            subject = %self.subject_path.display(),
            message = %self.message_path.display(),
            "saved rendered message"
        );
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
