//! Captures key presses on a separate thread and feeds them to the [`Keyboard`] queue.
use crate::hardware::keyboard::Keyboard;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How long a key event source blocks before the relay re-checks for shutdown.
pub const RELAY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A captured key as seen by the relay.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RelayKey {
    /// Character code handed to the emulated machine.
    Char(u16),
    /// Quit, escape, interrupt or end-of-transmission: stop the machine.
    Terminate,
}

/// Providing key presses independent of an implementation.
pub trait KeyEventSource {
    /// Waits at most `timeout` for the next relevant key press.
    ///
    /// # Errors
    /// - the underlying input could not be read
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<RelayKey>>;
}

/// Key presses from the interactive terminal, expected to be in raw mode.
#[derive(Debug, Default)]
pub struct TerminalKeySource;

impl KeyEventSource for TerminalKeySource {
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<RelayKey>> {
        if event::poll(timeout)?
            && let Event::Key(key_event) = event::read()?
        {
            return Ok(to_relay_key(key_event));
        }
        Ok(None)
    }
}

/// Maps a terminal key event, `None` for releases and keys without an ASCII representation.
#[must_use]
pub fn to_relay_key(event: KeyEvent) -> Option<RelayKey> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match event.code {
        KeyCode::Esc => Some(RelayKey::Terminate),
        // interrupt, end-of-transmission and quit
        KeyCode::Char('c' | 'd' | 'q') if ctrl => Some(RelayKey::Terminate),
        KeyCode::Enter => Some(RelayKey::Char(u16::from(b'\n'))),
        KeyCode::Tab => Some(RelayKey::Char(u16::from(b'\t'))),
        KeyCode::Backspace => Some(RelayKey::Char(0x08)),
        KeyCode::Char(c) if !ctrl => u8::try_from(c)
            .ok()
            .filter(u8::is_ascii)
            .map(|b| RelayKey::Char(u16::from(b))),
        _ => None,
    }
}

/// Moves keys from a [`KeyEventSource`] to the shared [`Keyboard`] until shutdown.
pub struct InputRelay<S> {
    source: S,
    keyboard: Arc<Keyboard>,
}

impl<S: KeyEventSource> InputRelay<S> {
    pub const fn new(source: S, keyboard: Arc<Keyboard>) -> Self {
        Self { source, keyboard }
    }

    /// Relays keys in capture order until a termination key arrives or the keyboard is
    /// shut down by the emulator.
    ///
    /// # Errors
    /// - reading from the source failed, the keyboard is shut down in that case as well
    pub fn run(mut self) -> io::Result<()> {
        while !self.keyboard.is_shut_down() {
            match self.source.next_key(RELAY_POLL_INTERVAL) {
                Ok(Some(RelayKey::Char(c))) => self.keyboard.push(c),
                Ok(Some(RelayKey::Terminate)) => {
                    log::info!("Termination key pressed");
                    self.keyboard.shutdown();
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Reading keyboard input failed: {e}");
                    self.keyboard.shutdown();
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

impl<S: KeyEventSource + Send + 'static> InputRelay<S> {
    /// Runs the relay on its own thread.
    ///
    /// # Errors
    /// - the thread could not be spawned
    pub fn spawn(self) -> io::Result<thread::JoinHandle<io::Result<()>>> {
        thread::Builder::new()
            .name("input-relay".into())
            .spawn(move || self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use std::collections::VecDeque;
    use yare::parameterized;

    /// Replays scripted results, then reports no input until shutdown.
    struct ScriptedKeySource {
        script: VecDeque<io::Result<Option<RelayKey>>>,
    }
    impl ScriptedKeySource {
        fn new(script: Vec<io::Result<Option<RelayKey>>>) -> Self {
            Self {
                script: script.into(),
            }
        }
    }
    impl KeyEventSource for ScriptedKeySource {
        fn next_key(&mut self, timeout: Duration) -> io::Result<Option<RelayKey>> {
            self.script.pop_front().unwrap_or_else(|| {
                thread::sleep(timeout);
                Ok(None)
            })
        }
    }

    #[gtest]
    fn test_relay_keeps_order_and_stops_on_terminate() {
        let keyboard = Arc::new(Keyboard::new());
        let source = ScriptedKeySource::new(vec![
            Ok(Some(RelayKey::Char(u16::from(b'h')))),
            Ok(None),
            Ok(Some(RelayKey::Char(u16::from(b'i')))),
            Ok(Some(RelayKey::Terminate)),
            Ok(Some(RelayKey::Char(u16::from(b'!')))),
        ]);
        InputRelay::new(source, Arc::clone(&keyboard)).run().unwrap();
        expect_that!(keyboard.is_shut_down(), eq(true));
        expect_that!(keyboard.try_pop(), some(eq(u16::from(b'h'))));
        expect_that!(keyboard.try_pop(), some(eq(u16::from(b'i'))));
        expect_that!(keyboard.try_pop(), none());
    }

    #[gtest]
    fn test_relay_error_shuts_keyboard_down() {
        let keyboard = Arc::new(Keyboard::new());
        let source = ScriptedKeySource::new(vec![Err(io::Error::other("tty gone"))]);
        let res = InputRelay::new(source, Arc::clone(&keyboard)).run();
        expect_that!(res.unwrap_err().to_string(), eq("tty gone"));
        expect_that!(keyboard.is_shut_down(), eq(true));
    }

    #[gtest]
    fn test_spawned_relay_stops_when_emulator_shuts_down() {
        let keyboard = Arc::new(Keyboard::new());
        let source = ScriptedKeySource::new(vec![Ok(Some(RelayKey::Char(u16::from(b'a'))))]);
        let handle = InputRelay::new(source, Arc::clone(&keyboard))
            .spawn()
            .unwrap();
        expect_that!(
            keyboard.wait_pop(Duration::from_millis(5)),
            some(eq(u16::from(b'a')))
        );
        keyboard.shutdown();
        assert!(handle.join().unwrap().is_ok());
    }

    #[parameterized(
        letter = { KeyCode::Char('a'), KeyModifiers::NONE, Some(RelayKey::Char(0x61)) },
        shifted = { KeyCode::Char('A'), KeyModifiers::SHIFT, Some(RelayKey::Char(0x41)) },
        enter = { KeyCode::Enter, KeyModifiers::NONE, Some(RelayKey::Char(0x0A)) },
        backspace = { KeyCode::Backspace, KeyModifiers::NONE, Some(RelayKey::Char(0x08)) },
        escape = { KeyCode::Esc, KeyModifiers::NONE, Some(RelayKey::Terminate) },
        interrupt = { KeyCode::Char('c'), KeyModifiers::CONTROL, Some(RelayKey::Terminate) },
        end_of_transmission = { KeyCode::Char('d'), KeyModifiers::CONTROL, Some(RelayKey::Terminate) },
        quit = { KeyCode::Char('q'), KeyModifiers::CONTROL, Some(RelayKey::Terminate) },
        plain_q = { KeyCode::Char('q'), KeyModifiers::NONE, Some(RelayKey::Char(0x71)) },
        other_control = { KeyCode::Char('x'), KeyModifiers::CONTROL, None },
        non_ascii = { KeyCode::Char('ä'), KeyModifiers::NONE, None },
        arrow = { KeyCode::Left, KeyModifiers::NONE, None },
    )]
    fn test_to_relay_key(code: KeyCode, modifiers: KeyModifiers, expected: Option<RelayKey>) {
        assert_that!(to_relay_key(KeyEvent::new(code, modifiers)), eq(expected));
    }

    #[gtest]
    fn test_key_release_is_ignored() {
        let event = KeyEvent::new_with_kind(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        );
        expect_that!(to_relay_key(event), none());
    }
}
