/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2024-2026 ByteDance and/or its affiliates.
 */

use std::io::{self, IsTerminal, Write};

use chrono::Local;
use flume::{Receiver, Sender};
use slog::{Drain, Level, OwnedKVList, Record};

mod format;
use format::StdLogFormatter;

const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

pub struct StdLogValue {
    level: Level,
    message: String,
    kv_pairs: Vec<(String, String)>,
    location: Option<String>,
}

impl StdLogValue {
    fn message_str(&self) -> &str {
        if self.message.is_empty() {
            "()"
        } else {
            &self.message
        }
    }
}

/// A slog drain that formats in place and writes in a dedicated io thread.
///
/// Records are dropped if the io thread falls behind.
pub struct AsyncStdLogger {
    sender: Sender<StdLogValue>,
    formatter: StdLogFormatter,
}

impl Drain for AsyncStdLogger {
    type Ok = ();
    type Err = slog::Error;

    fn log(&self, record: &Record, logger_values: &OwnedKVList) -> Result<(), slog::Error> {
        let v = self.formatter.format_slog(record, logger_values)?;
        let _ = self.sender.try_send(v);
        Ok(())
    }
}

pub fn new_async_logger(
    thread_name: &str,
    append_code_position: bool,
    use_stdout: bool,
) -> io::Result<AsyncStdLogger> {
    let (sender, receiver) = flume::bounded::<StdLogValue>(DEFAULT_CHANNEL_CAPACITY);

    let io_thread = AsyncIoThread { receiver };
    let _detached_thread = std::thread::Builder::new()
        .name(thread_name.to_string())
        .spawn(move || {
            if use_stdout {
                io_thread.run_with_stdout();
            } else {
                io_thread.run_with_stderr();
            }
        })?;

    Ok(AsyncStdLogger {
        sender,
        formatter: StdLogFormatter::new(append_code_position),
    })
}

struct AsyncIoThread {
    receiver: Receiver<StdLogValue>,
}

impl AsyncIoThread {
    fn write_time<IO: Write>(&self, io: &mut IO) -> io::Result<()> {
        let datetime = Local::now();
        write!(io, "{}", datetime.format("%Y-%m-%d %H:%M:%S%.6f"))
    }

    fn run_with_stderr(self) {
        let stderr = io::stderr();
        if stderr.is_terminal() {
            self.run(stderr, write_console)
        } else {
            self.run(stderr, write_plain)
        }
    }

    fn run_with_stdout(self) {
        let stdout = io::stdout();
        if stdout.is_terminal() {
            self.run(stdout, write_console)
        } else {
            self.run(stdout, write_plain)
        }
    }

    fn run<IO, F>(&self, mut io: IO, write_value: F)
    where
        IO: Write,
        F: Fn(&mut Vec<u8>, &StdLogValue) -> io::Result<()>,
    {
        let mut buf: Vec<u8> = Vec::with_capacity(1024);
        while let Ok(v) = self.receiver.recv() {
            buf.clear();
            let _ = self.write_time(&mut buf);
            let _ = write_value(&mut buf, &v);
            let _ = io.write_all(&buf);

            while let Ok(v) = self.receiver.try_recv() {
                buf.clear();
                let _ = self.write_time(&mut buf);
                let _ = write_value(&mut buf, &v);
                let _ = io.write_all(&buf);
            }

            let _ = io.flush();
        }
    }
}

fn write_plain(io: &mut Vec<u8>, v: &StdLogValue) -> io::Result<()> {
    write!(io, " {}", v.level)?;
    for (k, v) in &v.kv_pairs {
        write!(io, " {k}: {v},")?;
    }
    write!(io, " {}", v.message_str())?;
    if let Some(location) = &v.location {
        write!(io, " <{location}>")?;
    }
    writeln!(io)
}

fn write_console(io: &mut Vec<u8>, v: &StdLogValue) -> io::Result<()> {
    use anstyle::{AnsiColor, Color, Style};

    const COLOR_MAGENTA: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Magenta)));
    const COLOR_RED: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));
    const COLOR_YELLOW: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
    const COLOR_GREEN: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
    const COLOR_CYAN: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
    const COLOR_BLUE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue)));
    const STYLE_BOLD: Style = Style::new().bold();
    const STYLE_ITALIC: Style = Style::new().italic();

    let bold_s = STYLE_BOLD.render();
    let bold_e = STYLE_BOLD.render_reset();

    let level_color = match v.level {
        Level::Critical => COLOR_MAGENTA,
        Level::Error => COLOR_RED,
        Level::Warning => COLOR_YELLOW,
        Level::Info => COLOR_GREEN,
        Level::Debug => COLOR_CYAN,
        Level::Trace => COLOR_BLUE,
    };
    write!(
        io,
        " {}{}{}",
        level_color.render(),
        v.level,
        level_color.render_reset(),
    )?;

    for (k, v) in &v.kv_pairs {
        write!(io, " {bold_s}{k}{bold_e}={v},")?;
    }

    write!(io, " {bold_s}{}{bold_e}", v.message_str())?;

    if let Some(location) = &v.location {
        write!(
            io,
            " <{}{location}{}>",
            STYLE_ITALIC.render(),
            STYLE_ITALIC.render_reset()
        )?;
    }
    writeln!(io)
}
