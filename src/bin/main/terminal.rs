use std::{
    io::{self, BufRead, Write},
    thread,
};

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use flashread_core::{
    input::ReaderCommand,
    session::{ReaderSession, ReaderView},
    storage::{DocumentRecord, RecentFile},
};
use log::{debug, warn};

use super::COMMAND_QUEUE_DEPTH;

pub(super) type CommandChannel =
    Channel<CriticalSectionRawMutex, ReaderCommand, COMMAND_QUEUE_DEPTH>;

pub(super) static COMMANDS: CommandChannel = Channel::new();

/// Column the pivot character is pinned to, so the eye never moves.
const PIVOT_COLUMN: usize = 16;
const PIVOT_STYLE: &str = "\x1b[1;31m";
const RESET_STYLE: &str = "\x1b[0m";
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Read stdin lines on a plain thread and forward parsed commands.
///
/// End of input counts as quit.
pub(super) fn spawn_input_thread(commands: &'static CommandChannel) -> io::Result<()> {
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!("input: read failed err={}", err);
                        break;
                    }
                };
                match ReaderCommand::parse(&line) {
                    Ok(command) => {
                        debug!("input: command={:?}", command);
                        embassy_futures::block_on(commands.send(command));
                        if command == ReaderCommand::Quit {
                            return;
                        }
                    }
                    Err(err) => eprintln!("\n{err}: {:?}\n{HELP}", line.trim()),
                }
            }
            embassy_futures::block_on(commands.send(ReaderCommand::Quit));
        })?;
    Ok(())
}

pub(super) const HELP: &str = "\
enter/t play-pause   +/- faster/slower   w N rate   c N chunk
> [N] / < [N] skip   j N jump to word    p N page   r restart   q quit";

pub(super) fn draw(view: &ReaderView<'_>) {
    let mut out = io::stdout().lock();
    let _ = write!(out, "{CLEAR_LINE}{}", status_line(view));
    let _ = out.flush();
}

pub(super) fn status_line(view: &ReaderView<'_>) -> String {
    let state = if view.finished {
        "end"
    } else if view.playing {
        ">"
    } else {
        "||"
    };
    let word = match view.pivot {
        Some(split) => {
            let pad = PIVOT_COLUMN.saturating_sub(split.left.chars().count());
            format!(
                "{:pad$}{}{PIVOT_STYLE}{}{RESET_STYLE}{}",
                "", split.left, split.pivot, split.right
            )
        }
        None => format!("{:PIVOT_COLUMN$}{}", "", view.chunk_text),
    };
    format!(
        "[{state:>3}] p{}/{} {}/{} {:>3}% {}wpm x{} |{word}",
        view.page,
        view.page_count,
        view.display_index,
        view.total,
        view.percent,
        view.wpm,
        view.chunk_size
    )
}

pub(super) fn print_toc(session: &ReaderSession) {
    println!("{} ({} words)", session.title(), session.engine().total_tokens());
    for entry in session.toc() {
        println!("  page {:>4}  word {:>7}", entry.page, entry.start + 1);
    }
}

pub(super) fn print_history(items: &[RecentFile]) {
    if items.is_empty() {
        println!("no recently read files");
        return;
    }
    for item in items {
        let percent = if item.total_words == 0 {
            0
        } else {
            item.last_index.min(item.total_words) * 100 / item.total_words
        };
        println!("{:>3}%  {}  {}", percent, item.name, item.uri);
    }
}

pub(super) fn print_library(records: &[DocumentRecord]) {
    if records.is_empty() {
        println!("library is empty");
        return;
    }
    for record in records {
        println!(
            "{}  {:>3}%  {} pages  {}",
            record.id,
            record.percent_read(),
            record.page_map.page_count(),
            record.name
        );
    }
}
