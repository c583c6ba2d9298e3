//! Display Module
//!
//! The display service the embedder drives: a small set of window, focus and
//! grab primitives plus the notification stream. `X11Display` implements it
//! on top of an x11rb connection and owns the host window.

use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use x11rb::COPY_DEPTH_FROM_PARENT;

use crate::error::Result;
use crate::xembed::{self, XEmbedMessage};

/// Primitive windowing operations used by the embedder.
///
/// Requests are sent in order; `sync` returns once the server has
/// processed everything queued so far.
pub trait DisplayService {
    /// The host container window
    fn host(&self) -> Window;

    /// Size of the display area the host is centered on
    fn screen_size(&self) -> (u16, u16);

    fn resize_window(&mut self, window: Window, width: u16, height: u16) -> Result<()>;
    fn map_window(&mut self, window: Window) -> Result<()>;
    fn raise_window(&mut self, window: Window) -> Result<()>;
    fn lower_window(&mut self, window: Window) -> Result<()>;
    fn destroy_window(&mut self, window: Window) -> Result<()>;
    fn reparent_window(&mut self, window: Window, parent: Window, x: i16, y: i16) -> Result<()>;

    /// Select property, structure and enter notifications on an embedded window
    fn watch_embedded(&mut self, window: Window) -> Result<()>;

    fn configure_window(&mut self, window: Window, changes: &ConfigureWindowAux) -> Result<()>;

    /// Deliver an `_XEMBED` client message whose window field is `window` to `destination`
    fn send_xembed(
        &mut self,
        destination: Window,
        window: Window,
        message: XEmbedMessage,
    ) -> Result<()>;

    /// Deliver a synthetic ConfigureNotify describing `window` at (0,0) with the given size
    fn send_configure_notify(&mut self, window: Window, width: u16, height: u16) -> Result<()>;

    /// Deliver a key event to `target` unchanged
    fn send_key(&mut self, target: Window, event: KeyPressEvent) -> Result<()>;

    fn input_focus(&mut self) -> Result<Window>;
    fn set_input_focus(&mut self, window: Window, revert_to: InputFocus) -> Result<()>;

    /// Exclusive keyboard grab, synchronous pointer and asynchronous keyboard.
    /// Returns whether the server granted it.
    fn grab_keyboard(&mut self, window: Window) -> Result<bool>;
    fn ungrab_keyboard(&mut self) -> Result<()>;

    fn sync(&mut self) -> Result<()>;

    /// Block for the next notification
    fn next_event(&mut self) -> Result<Event>;
}

/// Display service backed by an X server connection
pub struct X11Display {
    conn: RustConnection,
    screen_width: u16,
    screen_height: u16,
    host: Window,
    xembed_atom: Atom,
}

impl X11Display {
    /// Connect to `$DISPLAY`, intern `_XEMBED` and create the host window
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = RustConnection::connect(None)?;
        info!("Connected to X server, screen {}", screen_num);

        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        let screen_width = screen.width_in_pixels;
        let screen_height = screen.height_in_pixels;
        debug!("Screen size: {}x{}", screen_width, screen_height);

        let xembed_atom = conn
            .intern_atom(false, xembed::XEMBED_ATOM.as_bytes())?
            .reply()?
            .atom;

        let host = conn.generate_id()?;
        let mask = EventMask::SUBSTRUCTURE_NOTIFY
            | EventMask::FOCUS_CHANGE
            | EventMask::BUTTON_PRESS
            | EventMask::EXPOSURE
            | EventMask::KEY_PRESS
            | EventMask::KEY_RELEASE
            | EventMask::PROPERTY_CHANGE
            | EventMask::STRUCTURE_NOTIFY
            | EventMask::SUBSTRUCTURE_REDIRECT;

        conn.create_window(
            COPY_DEPTH_FROM_PARENT,
            host,
            root,
            1,
            1,
            1,
            1,
            0,
            WindowClass::COPY_FROM_PARENT,
            x11rb::COPY_FROM_PARENT,
            &CreateWindowAux::new()
                .override_redirect(1u32)
                .event_mask(mask),
        )?
        .check()?;

        info!("Host window {}", host);

        Ok(Self {
            conn,
            screen_width,
            screen_height,
            host,
            xembed_atom,
        })
    }
}

impl DisplayService for X11Display {
    fn host(&self) -> Window {
        self.host
    }

    fn screen_size(&self) -> (u16, u16) {
        (self.screen_width, self.screen_height)
    }

    fn resize_window(&mut self, window: Window, width: u16, height: u16) -> Result<()> {
        self.conn.configure_window(
            window,
            &ConfigureWindowAux::new()
                .width(u32::from(width))
                .height(u32::from(height)),
        )?;
        Ok(())
    }

    fn map_window(&mut self, window: Window) -> Result<()> {
        self.conn.map_window(window)?;
        Ok(())
    }

    fn raise_window(&mut self, window: Window) -> Result<()> {
        self.conn.configure_window(
            window,
            &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
        )?;
        Ok(())
    }

    fn lower_window(&mut self, window: Window) -> Result<()> {
        self.conn.configure_window(
            window,
            &ConfigureWindowAux::new().stack_mode(StackMode::BELOW),
        )?;
        Ok(())
    }

    fn destroy_window(&mut self, window: Window) -> Result<()> {
        self.conn.destroy_window(window)?;
        Ok(())
    }

    fn reparent_window(&mut self, window: Window, parent: Window, x: i16, y: i16) -> Result<()> {
        self.conn.reparent_window(window, parent, x, y)?;
        Ok(())
    }

    fn watch_embedded(&mut self, window: Window) -> Result<()> {
        let mask = EventMask::PROPERTY_CHANGE
            | EventMask::STRUCTURE_NOTIFY
            | EventMask::ENTER_WINDOW;
        self.conn.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().event_mask(mask),
        )?;
        Ok(())
    }

    fn configure_window(&mut self, window: Window, changes: &ConfigureWindowAux) -> Result<()> {
        self.conn.configure_window(window, changes)?;
        Ok(())
    }

    fn send_xembed(
        &mut self,
        destination: Window,
        window: Window,
        message: XEmbedMessage,
    ) -> Result<()> {
        debug!(
            "XEmbed {} to {} (window {})",
            xembed::opcode_name(message.opcode),
            destination,
            window
        );
        let event = ClientMessageEvent::new(32, window, self.xembed_atom, message.to_data());
        self.conn
            .send_event(false, destination, EventMask::NO_EVENT, event)?;
        Ok(())
    }

    fn send_configure_notify(&mut self, window: Window, width: u16, height: u16) -> Result<()> {
        let event = ConfigureNotifyEvent {
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
            override_redirect: false,
        };
        self.conn
            .send_event(false, window, EventMask::STRUCTURE_NOTIFY, event)?;
        Ok(())
    }

    fn send_key(&mut self, target: Window, event: KeyPressEvent) -> Result<()> {
        self.conn
            .send_event(false, target, EventMask::NO_EVENT, event)?;
        Ok(())
    }

    fn input_focus(&mut self) -> Result<Window> {
        Ok(self.conn.get_input_focus()?.reply()?.focus)
    }

    fn set_input_focus(&mut self, window: Window, revert_to: InputFocus) -> Result<()> {
        self.conn
            .set_input_focus(revert_to, window, x11rb::CURRENT_TIME)?;
        Ok(())
    }

    fn grab_keyboard(&mut self, window: Window) -> Result<bool> {
        let reply = self
            .conn
            .grab_keyboard(
                true,
                window,
                x11rb::CURRENT_TIME,
                GrabMode::SYNC,
                GrabMode::ASYNC,
            )?
            .reply()?;
        Ok(reply.status == GrabStatus::SUCCESS)
    }

    fn ungrab_keyboard(&mut self) -> Result<()> {
        self.conn.ungrab_keyboard(x11rb::CURRENT_TIME)?;
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        self.conn.get_input_focus()?.reply()?;
        Ok(())
    }

    fn next_event(&mut self) -> Result<Event> {
        Ok(self.conn.wait_for_event()?)
    }
}
