use crossterm::terminal;
use std::io;
use std::io::Write;

/// Keeps the terminal in raw mode while alive.
pub struct RawLock {}

impl Drop for RawLock {
    fn drop(&mut self) {
        // terminal stays in raw mode but no means to repair
        if let Err(e) = terminal::disable_raw_mode() {
            log::error!("Error resetting terminal {e}");
        }
    }
}

/// Set terminal to raw in best-effort mode, only log on failure, since it does not work
/// without an interactive terminal, e.g. when input is piped.
#[must_use]
pub fn set_terminal_raw() -> RawLock {
    if let Err(e) = terminal::enable_raw_mode() {
        log::warn!("Could not set terminal to raw mode: {e}");
    }
    RawLock {}
}

/// Output for a terminal in raw mode, where a line feed does not return the cursor to the
/// first column: every `\n` is written as `\r\n`.
pub struct RawOutput<W: Write> {
    inner: W,
}

impl<W: Write> RawOutput<W> {
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for RawOutput<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for (idx, part) in buf.split(|b| *b == b'\n').enumerate() {
            if idx > 0 {
                self.inner.write_all(b"\r\n")?;
            }
            self.inner.write_all(part)?;
        }
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
