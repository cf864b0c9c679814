//! Interactive prompts for the menu front-end.
//!
//! Both prompts re-ask until they get a usable line, matching the menu's
//! forgiving style: blank input and parse failures are not errors. Ctrl-D
//! cancels the prompt and returns `None` so the caller can fall back to
//! the menu.

use std::io;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::{Error, IoOp, Result};
use crate::types::{Key, KEY_MAX};

/// Reads a non-blank index file name.
pub fn read_file_name(editor: &mut DefaultEditor) -> Result<Option<String>> {
    loop {
        match editor.readline("Enter index file name: ") {
            Ok(line) => {
                let name = line.trim();
                if name.is_empty() {
                    continue;
                }
                return Ok(Some(name.to_string()));
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(readline_error(err)),
        }
    }
}

/// Reads a decimal key in `[0, KEY_MAX]`.
pub fn read_key(editor: &mut DefaultEditor) -> Result<Option<Key>> {
    let prompt = format!("Enter the value (0-{KEY_MAX}): ");
    loop {
        match editor.readline(&prompt) {
            Ok(line) => {
                if let Ok(value) = line.trim().parse::<Key>() {
                    return Ok(Some(value));
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(readline_error(err)),
        }
    }
}

/// Maps an unexpected line-editor failure onto the crate error type.
pub fn readline_error(err: ReadlineError) -> Error {
    Error::io(IoOp::Read, io::Error::other(err))
}
