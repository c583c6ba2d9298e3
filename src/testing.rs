//! Scripted display service for unit tests

use std::collections::VecDeque;
use x11rb::errors::ConnectionError;
use x11rb::protocol::xproto::*;
use x11rb::protocol::Event;

use crate::display::DisplayService;
use crate::error::{ModalError, Result};
use crate::xembed::XEmbedMessage;

pub const HOST: Window = 0x0020_0001;
pub const CHILD: Window = 0x0040_0002;
pub const STRANGER: Window = 0x0060_0003;

/// Everything the embedder asked the display to do, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Resize(Window, u16, u16),
    Map(Window),
    Raise(Window),
    Lower(Window),
    Destroy(Window),
    Reparent(Window, Window, i16, i16),
    Watch(Window),
    Configure(Window, ConfigureWindowAux),
    XEmbed {
        destination: Window,
        window: Window,
        message: XEmbedMessage,
    },
    ConfigureNotify(Window, u16, u16),
    Key(Window, KeyPressEvent),
    SetFocus(Window, InputFocus),
    Grabbed(Window),
    Ungrab,
    Sync,
}

pub struct FakeDisplay {
    pub screen: (u16, u16),
    pub calls: Vec<Call>,
    pub events: VecDeque<Event>,
    pub focus: Window,
    /// set_input_focus requests the fake server ignores before honoring one
    pub focus_refusals: u32,
    pub focus_queries: u32,
    pub grab_refusals: u32,
    pub grab_attempts: u32,
}

impl FakeDisplay {
    pub fn new() -> Self {
        Self {
            screen: (1920, 1080),
            calls: Vec::new(),
            events: VecDeque::new(),
            focus: x11rb::NONE,
            focus_refusals: 0,
            focus_queries: 0,
            grab_refusals: 0,
            grab_attempts: 0,
        }
    }

    pub fn xembed_calls(&self) -> Vec<(Window, Window, XEmbedMessage)> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                Call::XEmbed {
                    destination,
                    window,
                    message,
                } => Some((destination, window, message)),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, call: &Call) -> Option<usize> {
        self.calls.iter().position(|c| c == call)
    }
}

impl DisplayService for FakeDisplay {
    fn host(&self) -> Window {
        HOST
    }

    fn screen_size(&self) -> (u16, u16) {
        self.screen
    }

    fn resize_window(&mut self, window: Window, width: u16, height: u16) -> Result<()> {
        self.calls.push(Call::Resize(window, width, height));
        Ok(())
    }

    fn map_window(&mut self, window: Window) -> Result<()> {
        self.calls.push(Call::Map(window));
        Ok(())
    }

    fn raise_window(&mut self, window: Window) -> Result<()> {
        self.calls.push(Call::Raise(window));
        Ok(())
    }

    fn lower_window(&mut self, window: Window) -> Result<()> {
        self.calls.push(Call::Lower(window));
        Ok(())
    }

    fn destroy_window(&mut self, window: Window) -> Result<()> {
        self.calls.push(Call::Destroy(window));
        Ok(())
    }

    fn reparent_window(&mut self, window: Window, parent: Window, x: i16, y: i16) -> Result<()> {
        self.calls.push(Call::Reparent(window, parent, x, y));
        Ok(())
    }

    fn watch_embedded(&mut self, window: Window) -> Result<()> {
        self.calls.push(Call::Watch(window));
        Ok(())
    }

    fn configure_window(&mut self, window: Window, changes: &ConfigureWindowAux) -> Result<()> {
        self.calls.push(Call::Configure(window, *changes));
        Ok(())
    }

    fn send_xembed(
        &mut self,
        destination: Window,
        window: Window,
        message: XEmbedMessage,
    ) -> Result<()> {
        self.calls.push(Call::XEmbed {
            destination,
            window,
            message,
        });
        Ok(())
    }

    fn send_configure_notify(&mut self, window: Window, width: u16, height: u16) -> Result<()> {
        self.calls.push(Call::ConfigureNotify(window, width, height));
        Ok(())
    }

    fn send_key(&mut self, target: Window, event: KeyPressEvent) -> Result<()> {
        self.calls.push(Call::Key(target, event));
        Ok(())
    }

    fn input_focus(&mut self) -> Result<Window> {
        self.focus_queries += 1;
        Ok(self.focus)
    }

    fn set_input_focus(&mut self, window: Window, revert_to: InputFocus) -> Result<()> {
        self.calls.push(Call::SetFocus(window, revert_to));
        if self.focus_refusals > 0 {
            self.focus_refusals -= 1;
        } else {
            self.focus = window;
        }
        Ok(())
    }

    fn grab_keyboard(&mut self, window: Window) -> Result<bool> {
        self.grab_attempts += 1;
        if self.grab_refusals > 0 {
            self.grab_refusals -= 1;
            return Ok(false);
        }
        self.calls.push(Call::Grabbed(window));
        Ok(true)
    }

    fn ungrab_keyboard(&mut self) -> Result<()> {
        self.calls.push(Call::Ungrab);
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        self.calls.push(Call::Sync);
        Ok(())
    }

    fn next_event(&mut self) -> Result<Event> {
        self.events
            .pop_front()
            .ok_or(ModalError::Connection(ConnectionError::UnknownError))
    }
}

pub fn create_notify(window: Window, width: u16, height: u16) -> Event {
    Event::CreateNotify(CreateNotifyEvent {
        response_type: CREATE_NOTIFY_EVENT,
        sequence: 0,
        parent: HOST,
        window,
        x: 0,
        y: 0,
        width,
        height,
        border_width: 0,
        override_redirect: false,
    })
}

pub fn destroy_notify(window: Window) -> Event {
    Event::DestroyNotify(DestroyNotifyEvent {
        response_type: DESTROY_NOTIFY_EVENT,
        sequence: 0,
        event: HOST,
        window,
    })
}

pub fn unmap_notify(window: Window) -> Event {
    Event::UnmapNotify(UnmapNotifyEvent {
        response_type: UNMAP_NOTIFY_EVENT,
        sequence: 0,
        event: HOST,
        window,
        from_configure: false,
    })
}

pub fn configure_notify(window: Window, width: u16, height: u16) -> Event {
    Event::ConfigureNotify(ConfigureNotifyEvent {
        response_type: CONFIGURE_NOTIFY_EVENT,
        sequence: 0,
        event: window,
        window,
        above_sibling: x11rb::NONE,
        x: 0,
        y: 0,
        width,
        height,
        border_width: 0,
        override_redirect: true,
    })
}

pub fn focus_in(window: Window, mode: NotifyMode) -> Event {
    Event::FocusIn(FocusInEvent {
        response_type: FOCUS_IN_EVENT,
        detail: NotifyDetail::INFERIOR,
        sequence: 0,
        event: window,
        mode,
    })
}

pub fn key_press(window: Window, keycode: u8, state: u16) -> KeyPressEvent {
    KeyPressEvent {
        response_type: KEY_PRESS_EVENT,
        detail: keycode,
        sequence: 0,
        time: 4242,
        root: 1,
        event: window,
        child: x11rb::NONE,
        root_x: 10,
        root_y: 20,
        event_x: 3,
        event_y: 4,
        state: KeyButMask::from(state),
        same_screen: true,
    }
}
