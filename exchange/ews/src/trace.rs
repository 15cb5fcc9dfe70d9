use std::io::{self, Write};

/// A sink for the human-readable transcript of a session.
pub trait Trace {
    fn write_line(&mut self, line: &str);
}

impl Trace for Vec<String> {
    fn write_line(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Writes each transcript line to both the console and a log.
///
/// Failing to write to the log isn't fatal to the session; the failure is
/// reported through the `log` facade and the console copy is kept.
pub struct TeeTrace<C: Write, L: Write> {
    console: C,
    log: L,
}

impl<C: Write, L: Write> TeeTrace<C, L> {
    pub fn new(console: C, log: L) -> Self {
        Self { console, log }
    }

    /// Flushes both sinks, handing back the log so the caller can close it.
    pub fn close(mut self) -> io::Result<L> {
        self.console.flush()?;
        self.log.flush()?;

        Ok(self.log)
    }
}

impl<C: Write, L: Write> Trace for TeeTrace<C, L> {
    fn write_line(&mut self, line: &str) {
        if let Err(err) = writeln!(self.console, "{line}") {
            log::warn!("failed to write transcript line to console: {err}");
        }

        if let Err(err) = writeln!(self.log, "{line}") {
            log::warn!("failed to write transcript line to log: {err}");
        }
    }
}
