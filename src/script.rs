//! Edit scripts replayed against a buffer through the undo history.
//!
//! One command per line; blank lines and `#` comments are skipped:
//!
//! ```text
//! insert 0 hello\n
//! backspace 6
//! delete 0
//! replace 0 4 HELLO
//! undo
//! redo
//! break
//! ```
//!
//! Offsets are char indices. Text arguments run to the end of the line and
//! understand `\n`, `\t` and `\\`.

use anyhow::{anyhow, bail, Context, Result};

use chango_buffer::{EditHistory, HistoryError, TextBuffer};
use chango_logger as logger;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Insert { offset: usize, text: String },
    Backspace { offset: usize },
    Delete { offset: usize },
    Replace { start: usize, end: usize, text: String },
    Undo,
    Redo,
    Break,
}

/// Parse a whole script. Errors name the offending line.
pub fn parse_script(source: &str) -> Result<Vec<ScriptCommand>> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| parse_line(line).with_context(|| format!("line {}", index + 1)))
        .collect()
}

fn parse_line(line: &str) -> Result<ScriptCommand> {
    let line = line.trim_start();
    let (name, rest) = split_word(line);

    let command = match name {
        "insert" => {
            let (offset, text) = split_word(rest);
            ScriptCommand::Insert {
                offset: parse_offset(offset)?,
                text: unescape(text)?,
            }
        }
        "backspace" => ScriptCommand::Backspace {
            offset: parse_offset(single_arg(rest)?)?,
        },
        "delete" => ScriptCommand::Delete {
            offset: parse_offset(single_arg(rest)?)?,
        },
        "replace" => {
            let (start, rest) = split_word(rest);
            let (end, text) = split_word(rest);
            let (start, end) = (parse_offset(start)?, parse_offset(end)?);
            if start > end {
                bail!("replace range {}..{} is reversed", start, end);
            }
            ScriptCommand::Replace {
                start,
                end,
                text: unescape(text)?,
            }
        }
        "undo" | "redo" | "break" if !rest.trim().is_empty() => {
            bail!("`{}` takes no arguments", name)
        }
        "undo" => ScriptCommand::Undo,
        "redo" => ScriptCommand::Redo,
        "break" => ScriptCommand::Break,
        other => bail!("unknown command `{}`", other),
    };
    Ok(command)
}

/// Split off the first space-separated word. The remainder keeps everything
/// after exactly one separating space.
fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(' ') {
        Some((word, rest)) => (word, rest),
        None => (s, ""),
    }
}

fn single_arg(rest: &str) -> Result<&str> {
    let rest = rest.trim();
    if rest.is_empty() || rest.contains(char::is_whitespace) {
        bail!("expected exactly one offset");
    }
    Ok(rest)
}

fn parse_offset(s: &str) -> Result<usize> {
    s.parse()
        .map_err(|_| anyhow!("invalid offset `{}`", s))
}

fn unescape(s: &str) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => bail!("unknown escape `\\{}`", other),
            None => bail!("dangling `\\` at end of text"),
        }
    }
    Ok(out)
}

/// Apply commands in order, recording every edit in `history`.
pub fn run_script(
    commands: &[ScriptCommand],
    buffer: &mut TextBuffer,
    history: &mut EditHistory,
) -> Result<()> {
    for (index, command) in commands.iter().enumerate() {
        apply(command, buffer, history)
            .with_context(|| format!("command #{} ({:?})", index + 1, command))?;
    }
    logger::debug(format!(
        "Script done: {} commands, {} undo steps, {} redo steps",
        commands.len(),
        history.undo_depth(),
        history.redo_depth()
    ));
    Ok(())
}

fn apply(command: &ScriptCommand, buffer: &mut TextBuffer, history: &mut EditHistory) -> Result<()> {
    match command {
        ScriptCommand::Insert { offset, text } => {
            let operation = buffer.insert(*offset, text)?;
            history.record(operation);
        }
        ScriptCommand::Backspace { offset } => {
            if let Some(operation) = buffer.delete_backward(*offset)? {
                history.record(operation);
            }
        }
        ScriptCommand::Delete { offset } => {
            if let Some(operation) = buffer.delete_forward(*offset)? {
                history.record(operation);
            }
        }
        ScriptCommand::Replace { start, end, text } => {
            let operation = buffer.replace(*start..*end, text)?;
            history.record(operation);
        }
        ScriptCommand::Undo => skip_if_empty(history.undo(buffer))?,
        ScriptCommand::Redo => skip_if_empty(history.redo(buffer))?,
        ScriptCommand::Break => history.break_coalescing(),
    }
    Ok(())
}

/// An empty undo or redo stack is nothing to do, not a failure
fn skip_if_empty<T>(result: Result<T, HistoryError>) -> Result<(), HistoryError> {
    match result {
        Ok(_) => Ok(()),
        Err(e @ (HistoryError::EmptyHistory | HistoryError::EmptyRedo)) => {
            logger::debug(format!("Script step skipped: {}", e));
            Ok(())
        }
        Err(e) => Err(e),
    }
}
