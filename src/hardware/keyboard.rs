use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Interval in which a blocked `GETC` or `IN` re-checks for shutdown.
pub const KEYBOARD_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Keystroke queue shared between the input relay (producer) and the emulator (consumer).
///
/// Keys are delivered in capture order. Besides the queue it carries the shutdown signal:
/// once a termination key was captured or the emulator halted, both sides stop.
#[derive(Debug, Default)]
pub struct Keyboard {
    queue: Mutex<VecDeque<u16>>,
    key_available: Condvar,
    shutdown: AtomicBool,
}

impl Keyboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // The queue only holds plain data, a panic while holding the lock cannot corrupt it.
    fn lock(&self) -> MutexGuard<'_, VecDeque<u16>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a key and wakes up a waiting consumer.
    pub fn push(&self, key: u16) {
        self.lock().push_back(key);
        self.key_available.notify_one();
    }

    /// Pops the oldest key without blocking.
    pub fn try_pop(&self) -> Option<u16> {
        self.lock().pop_front()
    }

    /// Blocks the calling thread until a key is available and pops it.
    ///
    /// Returns `None` if the keyboard was shut down while waiting.
    pub fn wait_pop(&self, poll_interval: Duration) -> Option<u16> {
        let mut queue = self.lock();
        loop {
            if let Some(key) = queue.pop_front() {
                return Some(key);
            }
            if self.is_shut_down() {
                return None;
            }
            queue = self
                .key_available
                .wait_timeout(queue, poll_interval)
                .map_or_else(|e| e.into_inner().0, |(guard, _timeout)| guard);
        }
    }

    /// Signals both the relay and the emulator to stop.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.key_available.notify_all();
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    #[gtest]
    fn test_fifo_order() {
        let kbd = Keyboard::new();
        kbd.push(u16::from(b'a'));
        kbd.push(u16::from(b'b'));
        expect_that!(kbd.try_pop(), some(eq(u16::from(b'a'))));
        expect_that!(kbd.try_pop(), some(eq(u16::from(b'b'))));
        expect_that!(kbd.try_pop(), none());
    }

    #[gtest]
    fn test_wait_pop_returns_queued_key_immediately() {
        let kbd = Keyboard::new();
        kbd.push(7);
        expect_that!(kbd.wait_pop(KEYBOARD_POLL_INTERVAL), some(eq(7)));
    }

    #[gtest]
    fn test_wait_pop_unblocks_on_push_from_other_thread() {
        let kbd = Arc::new(Keyboard::new());
        let producer = {
            let kbd = Arc::clone(&kbd);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                kbd.push(u16::from(b'x'));
            })
        };
        expect_that!(kbd.wait_pop(KEYBOARD_POLL_INTERVAL), some(eq(u16::from(b'x'))));
        producer.join().unwrap();
    }

    #[gtest]
    fn test_wait_pop_returns_none_after_shutdown() {
        let kbd = Arc::new(Keyboard::new());
        let stopper = {
            let kbd = Arc::clone(&kbd);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                kbd.shutdown();
            })
        };
        expect_that!(kbd.wait_pop(KEYBOARD_POLL_INTERVAL), none());
        expect_that!(kbd.is_shut_down(), eq(true));
        stopper.join().unwrap();
    }
}
