//! XEmbed Protocol
//!
//! Opcodes and the five-word payload layout of `_XEMBED` client messages.
//! The layout is `[time, opcode, detail, data1, data2]`, format 32.

use x11rb::protocol::xproto::Window;

/// Atom name carried as the message type of every XEmbed message
pub const XEMBED_ATOM: &str = "_XEMBED";

pub const EMBEDDED_NOTIFY: u32 = 0;
pub const WINDOW_ACTIVATE: u32 = 1;
pub const WINDOW_DEACTIVATE: u32 = 2;
pub const REQUEST_FOCUS: u32 = 3;
pub const FOCUS_IN: u32 = 4;
pub const FOCUS_OUT: u32 = 5;
pub const FOCUS_NEXT: u32 = 6;
pub const FOCUS_PREV: u32 = 7;
// 8-9 were GRAB_KEY/UNGRAB_KEY
pub const MODALITY_ON: u32 = 10;
pub const MODALITY_OFF: u32 = 11;
pub const REGISTER_ACCELERATOR: u32 = 12;
pub const UNREGISTER_ACCELERATOR: u32 = 13;
pub const ACTIVATE_ACCELERATOR: u32 = 14;

/// Details for FOCUS_IN
pub const FOCUS_CURRENT: u32 = 0;
pub const FOCUS_FIRST: u32 = 1;
pub const FOCUS_LAST: u32 = 2;

/// One XEmbed message before it is wrapped into a client message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XEmbedMessage {
    pub time: u32,
    pub opcode: u32,
    pub detail: u32,
    pub data1: u32,
    pub data2: u32,
}

impl XEmbedMessage {
    /// Message with CurrentTime as timestamp
    pub fn new(opcode: u32, detail: u32, data1: u32, data2: u32) -> Self {
        Self {
            time: x11rb::CURRENT_TIME,
            opcode,
            detail,
            data1,
            data2,
        }
    }

    /// Tells the peer it now lives inside `host`
    pub fn embedded_notify(host: Window) -> Self {
        Self::new(EMBEDDED_NOTIFY, 0, host, 0)
    }

    pub fn focus_in(detail: u32) -> Self {
        Self::new(FOCUS_IN, detail, 0, 0)
    }

    pub fn window_activate() -> Self {
        Self::new(WINDOW_ACTIVATE, 0, 0, 0)
    }

    /// The 32-bit data words in wire order
    pub fn to_data(self) -> [u32; 5] {
        [self.time, self.opcode, self.detail, self.data1, self.data2]
    }
}

/// Name of an opcode for traces
pub fn opcode_name(opcode: u32) -> &'static str {
    match opcode {
        EMBEDDED_NOTIFY => "EMBEDDED_NOTIFY",
        WINDOW_ACTIVATE => "WINDOW_ACTIVATE",
        WINDOW_DEACTIVATE => "WINDOW_DEACTIVATE",
        REQUEST_FOCUS => "REQUEST_FOCUS",
        FOCUS_IN => "FOCUS_IN",
        FOCUS_OUT => "FOCUS_OUT",
        FOCUS_NEXT => "FOCUS_NEXT",
        FOCUS_PREV => "FOCUS_PREV",
        MODALITY_ON => "MODALITY_ON",
        MODALITY_OFF => "MODALITY_OFF",
        REGISTER_ACCELERATOR => "REGISTER_ACCELERATOR",
        UNREGISTER_ACCELERATOR => "UNREGISTER_ACCELERATOR",
        ACTIVATE_ACCELERATOR => "ACTIVATE_ACCELERATOR",
        _ => "UNKNOWN",
    }
}
