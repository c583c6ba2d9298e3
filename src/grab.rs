//! Grab Module
//!
//! Bounded polling for input focus and the exclusive keyboard grab. Both race
//! the server and whichever client held focus or a grab when we started, so
//! each is retried on a fixed timer and gives up fatally at its ceiling.

use std::thread;
use std::time::Duration;
use tracing::{debug, info};
use x11rb::protocol::xproto::{InputFocus, Window};

use crate::display::DisplayService;
use crate::error::{ModalError, Result};

/// Attempt ceiling and inter-attempt delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

/// Move input focus onto `window`, reverting to pointer root if it is lost later
pub fn acquire_focus<D: DisplayService>(
    display: &mut D,
    window: Window,
    policy: RetryPolicy,
) -> Result<()> {
    for attempt in 1..=policy.attempts {
        let focused = display.input_focus()?;
        if focused == window {
            debug!("Focus on {} after {} attempt(s)", window, attempt);
            return Ok(());
        }
        display.set_input_focus(window, InputFocus::POINTER_ROOT)?;
        thread::sleep(policy.delay);
    }
    Err(ModalError::FocusExhausted(policy.attempts))
}

/// Grab the keyboard for `window`; another client may still hold it for a while
pub fn grab_keyboard<D: DisplayService>(
    display: &mut D,
    window: Window,
    policy: RetryPolicy,
) -> Result<()> {
    for attempt in 1..=policy.attempts {
        if display.grab_keyboard(window)? {
            debug!("Keyboard grabbed for {} after {} attempt(s)", window, attempt);
            return Ok(());
        }
        thread::sleep(policy.delay);
    }
    Err(ModalError::KeyboardExhausted(policy.attempts))
}

/// Focus first, then keyboard. Both are mandatory.
pub fn acquire<D: DisplayService>(
    display: &mut D,
    window: Window,
    focus: RetryPolicy,
    keyboard: RetryPolicy,
) -> Result<()> {
    acquire_focus(display, window, focus)?;
    grab_keyboard(display, window, keyboard)?;
    info!("Input grabbed for {}", window);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeDisplay, HOST};

    fn fast(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO)
    }

    #[test]
    fn test_focus_already_held() {
        let mut display = FakeDisplay::new();
        display.focus = HOST;

        acquire_focus(&mut display, HOST, fast(100)).unwrap();
        assert_eq!(display.focus_queries, 1);
        assert!(display.calls.is_empty());
    }

    #[test]
    fn test_focus_taken_on_retry() {
        let mut display = FakeDisplay::new();
        display.focus_refusals = 3;

        acquire_focus(&mut display, HOST, fast(100)).unwrap();
        assert_eq!(display.focus_queries, 5);
        assert_eq!(
            display.calls.iter().filter(|c| matches!(c, Call::SetFocus(HOST, _))).count(),
            4
        );
        assert!(display
            .calls
            .iter()
            .all(|c| *c == Call::SetFocus(HOST, InputFocus::POINTER_ROOT)));
    }

    #[test]
    fn test_focus_exhausted() {
        let mut display = FakeDisplay::new();
        display.focus_refusals = u32::MAX;

        let err = acquire_focus(&mut display, HOST, fast(100)).unwrap_err();
        assert!(matches!(err, ModalError::FocusExhausted(100)));
        assert_eq!(display.focus_queries, 100);
    }

    #[test]
    fn test_keyboard_grabbed_on_retry() {
        let mut display = FakeDisplay::new();
        display.grab_refusals = 7;

        grab_keyboard(&mut display, HOST, fast(1000)).unwrap();
        assert_eq!(display.grab_attempts, 8);
    }

    #[test]
    fn test_keyboard_exhausted_after_ceiling() {
        let mut display = FakeDisplay::new();
        display.grab_refusals = u32::MAX;

        let err = grab_keyboard(&mut display, HOST, fast(1000)).unwrap_err();
        assert!(matches!(err, ModalError::KeyboardExhausted(1000)));
        assert_eq!(display.grab_attempts, 1000);
    }

    #[test]
    fn test_keyboard_not_tried_without_focus() {
        let mut display = FakeDisplay::new();
        display.focus_refusals = u32::MAX;

        assert!(acquire(&mut display, HOST, fast(3), fast(3)).is_err());
        assert_eq!(display.grab_attempts, 0);
    }
}
