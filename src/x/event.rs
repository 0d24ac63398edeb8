//! Data types for working with X events
use crate::{
    core::bindings::ModMask,
    pure::geometry::{Point, Rect},
    x::Atom,
    Xid,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Wrapper around the low level X event types the manager reacts to.
///
/// Backends convert raw wire events into these before they reach the
/// dispatcher; event kinds with no variant here are simply dropped at the
/// conversion layer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum XEvent {
    /// A grabbed pointer button was pressed
    ButtonPress(ButtonEvent),
    /// A pointer button was released (ends gesture loops)
    ButtonRelease(ButtonEvent),
    /// A message was sent to a client via a ClientMessage event
    ClientMessage(ClientMessageEvent),
    /// Client or root geometry has changed
    ConfigureNotify(ConfigureNotifyEvent),
    /// A client is requesting to be repositioned
    ConfigureRequest(ConfigureRequestEvent),
    /// A client window was destroyed
    Destroy(Xid),
    /// The pointer entered a new window
    Enter(PointerChange),
    /// Part of a window became visible
    Expose(ExposeEvent),
    /// A client claims to have input focus
    FocusIn(Xid),
    /// A grabbed key combination was pressed
    KeyPress(KeyPressEvent),
    /// The keyboard mapping changed
    MappingNotify {
        /// Whether the keyboard mapping (as opposed to the pointer map)
        /// changed, requiring keys to be re-grabbed
        keyboard: bool,
    },
    /// A window asked to be mapped onto the screen
    MapRequest(Xid),
    /// The pointer moved
    Motion(MotionEvent),
    /// A window property changed
    PropertyNotify(PropertyEvent),
    /// A window was unmapped
    UnmapNotify {
        /// The window being unmapped
        id: Xid,
        /// Synthetic unmaps signal an ICCCM withdraw rather than a destroy
        synthetic: bool,
    },
}

/// A button press or release on a grabbed window.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonEvent {
    /// The window the press landed on
    pub id: Xid,
    /// The pointer button (1 = left, 2 = middle, 3 = right)
    pub button: u8,
    /// Raw modifier state at press time
    pub mods: ModMask,
    /// Position relative to the root window
    pub abs: Point,
}

/// A ClientMessage whose type atom is one the manager understands.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientMessageEvent {
    /// The window the message concerns
    pub id: Xid,
    /// The message type
    pub dtype: Atom,
    /// The 32 bit payload words
    pub data: [u32; 5],
}

/// A notification that a window's geometry changed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigureNotifyEvent {
    /// The window that changed
    pub id: Xid,
    /// Its new geometry
    pub r: Rect,
    /// Whether this is the root window (a screen size change)
    pub is_root: bool,
}

/// A client request to change its own geometry or stacking, with each field
/// present only when the corresponding bit was set in the request mask.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigureRequestEvent {
    /// The requesting window
    pub id: Xid,
    /// Requested x position
    pub x: Option<i32>,
    /// Requested y position
    pub y: Option<i32>,
    /// Requested width
    pub w: Option<u32>,
    /// Requested height
    pub h: Option<u32>,
    /// Requested border width
    pub border_width: Option<u32>,
    /// Requested stacking sibling
    pub sibling: Option<Xid>,
    /// Requested stacking mode, as the raw protocol value
    pub stack_mode: Option<u32>,
}

/// The pointer crossed into a window.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerChange {
    /// The window that was entered
    pub id: Xid,
    /// Absolute position of the pointer
    pub abs: Point,
}

/// Part of a window needs repainting.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExposeEvent {
    /// The exposed window
    pub id: Xid,
    /// The number of expose events still pending for it
    pub count: u16,
}

/// A grabbed key press, resolved to a keysym.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPressEvent {
    /// The keysym in the unshifted column for the pressed keycode
    pub keysym: u32,
    /// Raw modifier state at press time
    pub mods: ModMask,
}

/// The pointer moved.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MotionEvent {
    /// The window the motion was reported against
    pub id: Xid,
    /// Absolute position of the pointer
    pub abs: Point,
    /// Server timestamp in milliseconds, used for rate limiting
    pub time: u32,
}

/// A property changed on a window we care about.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyEvent {
    /// The window that had a property changed
    pub id: Xid,
    /// The property that changed
    pub atom: Atom,
    /// Whether this is the root window
    pub is_root: bool,
    /// Whether the property was deleted rather than replaced
    pub deleted: bool,
}
