//! Embedder Module
//!
//! The embedding state machine and its event dispatcher. One host window,
//! at most one embedded window. Notifications arrive one at a time from the
//! display service and each is handled to completion before the next.

use std::fmt;
use tracing::{debug, info, warn};
use x11rb::protocol::xproto::*;
use x11rb::protocol::Event;

use crate::config::GrabConfig;
use crate::display::DisplayService;
use crate::error::Result;
use crate::grab;
use crate::xembed::{self, XEmbedMessage};

/// Lifecycle of the embedded window slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedState {
    /// No window embedded yet
    Unmanaged,
    /// Host placed, grabs and reparenting in progress
    Managing,
    /// Handshake done, input is forwarded
    Managed,
    /// The embedded window is gone; the event loop stops
    Terminated,
}

/// Which of our windows a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Child,
    Other,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Host => "host",
            Self::Child => "child",
            Self::Other => "other",
        })
    }
}

pub struct Embedder<D: DisplayService> {
    display: D,
    host: Window,
    screen: (u16, u16),
    /// Current host size; the embedded window always fills it
    width: u16,
    height: u16,
    embedded: Option<Window>,
    state: EmbedState,
    grab: GrabConfig,
}

impl<D: DisplayService> Embedder<D> {
    pub fn new(display: D, grab: GrabConfig) -> Self {
        let host = display.host();
        let screen = display.screen_size();
        Self {
            display,
            host,
            screen,
            width: 1,
            height: 1,
            embedded: None,
            state: EmbedState::Unmanaged,
            grab,
        }
    }

    pub fn state(&self) -> EmbedState {
        self.state
    }

    pub fn embedded(&self) -> Option<Window> {
        self.embedded
    }

    pub fn host_size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    fn role(&self, window: Window) -> Role {
        if window == self.host {
            Role::Host
        } else if Some(window) == self.embedded {
            Role::Child
        } else {
            Role::Other
        }
    }

    fn trace(&self, name: &str, window: Window) {
        info!("{}: {} {}", name, window, self.role(window));
    }

    /// The embedded window, once the handshake has completed
    fn active(&self) -> Option<Window> {
        match self.state {
            EmbedState::Managed => self.embedded,
            _ => None,
        }
    }

    /// Dispatch notifications until the embedded window goes away
    pub fn run(&mut self) -> Result<()> {
        info!("Entering event loop");
        while self.state != EmbedState::Terminated {
            let event = self.display.next_event()?;
            self.dispatch(event)?;
        }
        info!("Event loop finished");
        Ok(())
    }

    /// Route one notification to its handler
    pub fn dispatch(&mut self, event: Event) -> Result<()> {
        match event {
            Event::CreateNotify(e) => self.on_create(e),
            Event::DestroyNotify(e) => {
                self.trace("DestroyNotify", e.window);
                self.on_gone(e.window);
                Ok(())
            }
            Event::UnmapNotify(e) => {
                self.trace("UnmapNotify", e.window);
                self.on_gone(e.window);
                Ok(())
            }
            Event::ConfigureNotify(e) => self.on_configure(e),
            Event::ConfigureRequest(e) => self.on_configure_request(e),
            Event::FocusIn(e) => self.on_focus_in(e),
            Event::KeyPress(e) => {
                self.trace("KeyPress", e.event);
                self.forward_key(e)
            }
            Event::KeyRelease(e) => {
                self.trace("KeyRelease", e.event);
                self.forward_key(e)
            }
            Event::MapRequest(e) => {
                self.trace("MapRequest", e.window);
                Ok(())
            }
            Event::Expose(e) => {
                self.trace("Expose", e.window);
                Ok(())
            }
            Event::Error(e) => {
                warn!(
                    "X11 Error: error_code={}, request_code={}, minor_code={}",
                    e.error_code, e.major_opcode, e.minor_opcode
                );
                Ok(())
            }
            other => {
                debug!("Unhandled event: {:?}", other);
                Ok(())
            }
        }
    }

    fn on_create(&mut self, e: CreateNotifyEvent) -> Result<()> {
        self.trace("CreateNotify", e.window);

        if e.window == self.host {
            return Ok(());
        }
        if let Some(current) = self.embedded {
            info!("Ignoring window {}, already embedding {}", e.window, current);
            return Ok(());
        }
        if self.state != EmbedState::Unmanaged {
            return Ok(());
        }

        self.manage(e.window, e.width, e.height)
    }

    /// Destroy or unmap. Only the embedded window ends the session.
    fn on_gone(&mut self, window: Window) {
        if Some(window) == self.embedded {
            info!("Unmanage window {}", window);
            self.embedded = None;
            self.state = EmbedState::Terminated;
        }
    }

    fn on_configure(&mut self, e: ConfigureNotifyEvent) -> Result<()> {
        self.trace("ConfigureNotify", e.window);

        if e.window != self.host || (e.width, e.height) == (self.width, self.height) {
            return Ok(());
        }

        self.width = e.width;
        self.height = e.height;
        if let Some(window) = self.embedded {
            self.fill(window)?;
        }
        self.display.sync()
    }

    fn on_configure_request(&mut self, e: ConfigureRequestEvent) -> Result<()> {
        self.trace("ConfigureRequest", e.window);

        if let Some(window) = self.active() {
            let changes = reflect_request(&e, self.width, self.height);
            self.display.configure_window(window, &changes)?;
        }
        Ok(())
    }

    fn on_focus_in(&mut self, e: FocusInEvent) -> Result<()> {
        self.trace("FocusIn", e.event);

        if e.mode == NotifyMode::UNGRAB {
            return Ok(());
        }

        let focused = self.display.input_focus()?;
        self.trace("FocusIn(focused)", focused);
        match self.active() {
            Some(window) if window == focused => self.focus(window),
            _ => Ok(()),
        }
    }

    fn forward_key(&mut self, mut e: KeyPressEvent) -> Result<()> {
        let Some(window) = self.active() else {
            return Ok(());
        };
        e.event = window;
        self.display.send_key(window, e)?;
        self.display.sync()
    }

    /// Unmanaged -> Managing -> Managed
    fn manage(&mut self, window: Window, width: u16, height: u16) -> Result<()> {
        info!("Manage window {} ({}x{})", window, width, height);
        self.embedded = Some(window);
        self.state = EmbedState::Managing;

        self.width = width;
        self.height = height;
        let (x, y) = centered(self.screen, (width, height));
        let placement = ConfigureWindowAux::new()
            .x(x)
            .y(y)
            .width(u32::from(width))
            .height(u32::from(height));
        self.display.configure_window(self.host, &placement)?;
        self.display.map_window(self.host)?;
        self.display.sync()?;

        grab::acquire(
            &mut self.display,
            self.host,
            self.grab.focus_policy(),
            self.grab.keyboard_policy(),
        )?;

        self.display.reparent_window(window, self.host, 0, 0)?;
        self.display.watch_embedded(window)?;
        self.display.sync()?;
        self.display.lower_window(window)?;
        self.display.map_window(window)?;

        self.display
            .send_xembed(self.host, window, XEmbedMessage::embedded_notify(self.host))?;
        self.display.sync()?;

        self.state = EmbedState::Managed;
        self.focus(window)
    }

    /// Give the embedded window the keyboard and tell it so
    fn focus(&mut self, window: Window) -> Result<()> {
        debug!("Focus window {}", window);
        self.fill(window)?;
        self.display.raise_window(window)?;
        self.display.set_input_focus(window, InputFocus::PARENT)?;
        self.display.send_xembed(
            window,
            window,
            XEmbedMessage::focus_in(xembed::FOCUS_CURRENT),
        )?;
        self.display
            .send_xembed(window, window, XEmbedMessage::window_activate())?;
        self.display.sync()
    }

    /// Resize `window` to the host size and announce it with a synthetic ConfigureNotify
    fn fill(&mut self, window: Window) -> Result<()> {
        self.display.resize_window(window, self.width, self.height)?;
        self.display
            .send_configure_notify(window, self.width, self.height)
    }

    /// Release the keyboard, drop the host and give focus back to `previous`
    pub fn shutdown(&mut self, previous: Window) -> Result<()> {
        self.display.ungrab_keyboard()?;
        self.display.destroy_window(self.host)?;
        self.display.set_input_focus(previous, InputFocus::POINTER_ROOT)?;
        self.display.sync()
    }
}

/// Top-left corner that centers `size` on `screen`
fn centered(screen: (u16, u16), size: (u16, u16)) -> (i32, i32) {
    (
        (i32::from(screen.0) - i32::from(size.0)) / 2,
        (i32::from(screen.1) - i32::from(size.1)) / 2,
    )
}

/// Answer to a configure request: pinned to (0,0) at the host size, with only
/// the requested stacking honored. Only fields named in the request's mask are set.
pub fn reflect_request(e: &ConfigureRequestEvent, width: u16, height: u16) -> ConfigureWindowAux {
    let mask = u16::from(e.value_mask);
    let requested = |flag: ConfigWindow| mask & u16::from(flag) != 0;

    let mut changes = ConfigureWindowAux::new();
    if requested(ConfigWindow::X) {
        changes = changes.x(0i32);
    }
    if requested(ConfigWindow::Y) {
        changes = changes.y(0i32);
    }
    if requested(ConfigWindow::WIDTH) {
        changes = changes.width(u32::from(width));
    }
    if requested(ConfigWindow::HEIGHT) {
        changes = changes.height(u32::from(height));
    }
    if requested(ConfigWindow::BORDER_WIDTH) {
        changes = changes.border_width(0u32);
    }
    if requested(ConfigWindow::SIBLING) {
        changes = changes.sibling(e.sibling);
    }
    if requested(ConfigWindow::STACK_MODE) {
        changes = changes.stack_mode(e.stack_mode);
    }
    changes
}
