//! Reader commands and their terminal spelling.

use core::str::FromStr;

use thiserror::Error;

/// Words skipped by a bare `<` or `>`.
pub const SEEK_STEP: i64 = 10;

/// Logical actions consumed by a reader session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReaderCommand {
    TogglePlay,
    Faster,
    Slower,
    SetRate(u32),
    ChunkSize(usize),
    SeekBy(i64),
    /// Absolute 0-based token position.
    SeekTo(i64),
    /// 1-based page number.
    GotoPage(usize),
    Restart,
    Quit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum ParseCommandError {
    #[error("unknown command")]
    Unknown,
    #[error("missing argument")]
    MissingArgument,
    #[error("invalid number")]
    InvalidNumber,
}

impl ReaderCommand {
    /// Parse one line of terminal input.
    ///
    /// An empty line toggles playback, so pressing enter acts as play/pause.
    pub fn parse(line: &str) -> Result<Self, ParseCommandError> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Ok(Self::TogglePlay);
        };
        let arg = parts.next();

        let command = match verb {
            "t" | "toggle" | "play" | "pause" => Self::TogglePlay,
            "+" | "f" | "faster" => Self::Faster,
            "-" | "s" | "slower" => Self::Slower,
            "w" | "wpm" => Self::SetRate(number(arg)?),
            "c" | "chunk" => Self::ChunkSize(number(arg)?),
            ">" | "fwd" => Self::SeekBy(optional_number(arg, SEEK_STEP)?),
            "<" | "back" => Self::SeekBy(
                optional_number(arg, SEEK_STEP)?
                    .checked_neg()
                    .ok_or(ParseCommandError::InvalidNumber)?,
            ),
            "j" | "jump" => Self::SeekTo(number::<i64>(arg)?.saturating_sub(1)),
            "p" | "page" => Self::GotoPage(number(arg)?),
            "r" | "restart" => Self::Restart,
            "q" | "quit" | "exit" => Self::Quit,
            _ => return Err(ParseCommandError::Unknown),
        };
        Ok(command)
    }
}

impl FromStr for ReaderCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        Self::parse(line)
    }
}

fn number<T: FromStr>(arg: Option<&str>) -> Result<T, ParseCommandError> {
    arg.ok_or(ParseCommandError::MissingArgument)?
        .parse()
        .map_err(|_| ParseCommandError::InvalidNumber)
}

fn optional_number(arg: Option<&str>, default: i64) -> Result<i64, ParseCommandError> {
    match arg {
        Some(_) => number(arg),
        None => Ok(default),
    }
}
