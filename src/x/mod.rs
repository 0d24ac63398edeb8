//! Logic for interacting with the X server
//!
//! [`XConn`] is the single boundary between the window manager and the
//! windowing system: everything the manager does to the outside world goes
//! through a method on this trait. The production implementation lives in
//! [`crate::x11rb_conn`]; tests implement [`mock::StubXConn`] instead and get
//! an `XConn` for free.
use crate::{
    core::bindings::{ButtonBinding, KeyBinding, ModMask},
    pure::{
        geometry::{Point, Rect},
        hints::SizeHints,
    },
    Color, Result, Xid,
};

pub mod atom;
pub mod event;
pub mod mock;
pub mod property;

pub use atom::{Atom, EWMH_SUPPORTED_ATOMS};
pub use event::XEvent;
pub use property::{Hints, WindowAttributes, WmState};

/// The cursor shapes used by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorKind {
    /// The default left pointer
    Normal,
    /// Shown while a pointer resize is in progress
    Resize,
    /// Shown while a pointer move is in progress
    Move,
}

/// A handle on a running X11 connection that we can use for issuing X
/// requests.
///
/// Methods are deliberately fine grained and free of manager state: the
/// [WindowManager][crate::manager::WindowManager] sequences them, this trait
/// only talks wire protocol.
pub trait XConn {
    /// The ID of the window manager root window.
    fn root(&self) -> Xid;
    /// The full rectangle of the X screen (not of any single monitor).
    fn screen_rect(&self) -> Rect;
    /// Ask the multi-head extension for the rectangle of each output.
    fn screen_details(&self) -> Result<Vec<Rect>>;
    /// The current (x, y) coordinates of the pointer on the root window.
    fn cursor_position(&self) -> Result<Point>;

    /// Block and wait for the next event from the X server.
    fn next_event(&self) -> Result<XEvent>;
    /// Flush any pending requests to the X server.
    fn flush(&self);
    /// Flush and wait for the server to have processed everything so far.
    fn sync(&self) -> Result<()>;
    /// Discard any Enter events already queued, so that a restack does not
    /// spuriously refocus under the pointer.
    fn drain_enter_events(&self) -> Result<()>;

    /// Claim substructure redirection on the root window, asserting sole
    /// window manager status. Fails with
    /// [Error::OtherWmRunning][crate::Error::OtherWmRunning] if another WM
    /// already holds it.
    fn become_wm(&self) -> Result<()>;
    /// Publish the EWMH support properties, returning the check window.
    fn advertise_wm(&self, wm_name: &str) -> Result<Xid>;
    /// Install the root window event mask and cursor.
    fn select_root_events(&self) -> Result<()>;
    /// The IDs of all current top level windows, in stacking order.
    fn existing_clients(&self) -> Result<Vec<Xid>>;
    /// Create an unmanaged bar window covering `r`.
    fn create_bar_win(&self, r: Rect) -> Result<Xid>;
    /// Destroy a window we own (bars, the check window).
    fn destroy_window(&self, id: Xid) -> Result<()>;

    /// Request the window attributes relevant for adoption decisions.
    fn get_window_attributes(&self, id: Xid) -> Result<WindowAttributes>;
    /// Current geometry and border width of a window.
    fn client_geometry(&self, id: Xid) -> Result<(Rect, u32)>;
    /// The client title per EWMH falling back to ICCCM.
    fn window_title(&self, id: Xid) -> Result<Option<String>>;
    /// The root window name (the status text source).
    fn root_name(&self) -> Result<Option<String>>;
    /// WM_CLASS as (instance, class).
    fn wm_class(&self, id: Xid) -> Result<Option<(String, String)>>;
    /// WM_TRANSIENT_FOR, if set.
    fn transient_for(&self, id: Xid) -> Result<Option<Xid>>;
    /// WM_NORMAL_HINTS, already resolved per ICCCM.
    fn size_hints(&self, id: Xid) -> Result<Option<SizeHints>>;
    /// The WM_HINTS fields the manager cares about.
    fn hints(&self, id: Xid) -> Result<Option<Hints>>;
    /// Rewrite the urgency bit of WM_HINTS.
    fn set_urgency(&self, id: Xid, urgent: bool) -> Result<()>;
    /// Read the first word of an ATOM valued property.
    fn atom_prop(&self, id: Xid, atom: Atom) -> Result<Option<u32>>;
    /// The server id interned for `atom`.
    fn known_atom(&self, atom: Atom) -> u32;
    /// Read the ICCCM WM_STATE of a window.
    fn wm_state(&self, id: Xid) -> Result<Option<WmState>>;
    /// Set the ICCCM WM_STATE of a window.
    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()>;
    /// Send `proto` via WM_PROTOCOLS if the client advertises support for
    /// it, reporting whether it was sent.
    fn send_protocol(&self, id: Xid, proto: Atom) -> Result<bool>;
    /// Set or clear _NET_WM_STATE_FULLSCREEN on a client.
    fn set_fullscreen_prop(&self, id: Xid, fullscreen: bool) -> Result<()>;
    /// Update _NET_ACTIVE_WINDOW on the root (None deletes it).
    fn set_active_window(&self, id: Option<Xid>) -> Result<()>;
    /// Append one id to _NET_CLIENT_LIST.
    fn append_client_list(&self, id: Xid) -> Result<()>;
    /// Rewrite _NET_CLIENT_LIST wholesale.
    fn set_client_list(&self, ids: &[Xid]) -> Result<()>;

    /// Commit position, size and border width for a client window.
    fn position_client(&self, id: Xid, r: Rect, bw: u32) -> Result<()>;
    /// Move a window without touching its size (used to park hidden
    /// clients off screen).
    fn move_client(&self, id: Xid, p: Point) -> Result<()>;
    /// Move and resize an unmanaged window (the bars).
    fn move_resize(&self, id: Xid, r: Rect) -> Result<()>;
    /// Send a synthetic ConfigureNotify telling the client its committed
    /// geometry.
    fn send_configure_notify(&self, id: Xid, r: Rect, bw: u32) -> Result<()>;
    /// Forward an unmodified configure request from an unmanaged window.
    fn forward_configure_request(&self, ev: &event::ConfigureRequestEvent) -> Result<()>;
    /// Set only the border width of a window.
    fn set_border_width(&self, id: Xid, bw: u32) -> Result<()>;
    /// Set the border color of a window.
    fn set_border_color(&self, id: Xid, color: Color) -> Result<()>;
    /// Subscribe to the client event mask (enter/focus/property/structure).
    fn select_client_events(&self, id: Xid) -> Result<()>;
    /// Raise a window to the top of the stacking order.
    fn raise_window(&self, id: Xid) -> Result<()>;
    /// Stack `id` directly below `sibling`.
    fn stack_below(&self, id: Xid, sibling: Xid) -> Result<()>;
    /// Map a window onto the screen.
    fn map_window(&self, id: Xid) -> Result<()>;
    /// Give a window the X input focus.
    fn set_input_focus(&self, id: Xid) -> Result<()>;
    /// Revert the X input focus to the root window.
    fn focus_root(&self) -> Result<()>;
    /// Forcibly kill a client under a server grab.
    fn kill_client(&self, id: Xid) -> Result<()>;

    /// The modifier bit NumLock is currently mapped to.
    fn numlock_mask(&self) -> Result<ModMask>;
    /// Grab every configured key for each lock modifier combination.
    fn grab_keys(&self, keys: &[KeyBinding], numlock: ModMask) -> Result<()>;
    /// Release all key grabs on the root window.
    fn ungrab_keys(&self) -> Result<()>;
    /// Grab the client-window button bindings on `id`; unfocused clients
    /// additionally grab every button so that a first click can focus them.
    fn grab_buttons(
        &self,
        id: Xid,
        focused: bool,
        buttons: &[ButtonBinding],
        numlock: ModMask,
    ) -> Result<()>;
    /// Release all button grabs on `id`.
    fn ungrab_buttons(&self, id: Xid) -> Result<()>;
    /// Grab the pointer for a gesture, reporting whether the grab was won.
    fn grab_pointer(&self, cursor: CursorKind) -> Result<bool>;
    /// Release a pointer grab taken with [XConn::grab_pointer].
    fn ungrab_pointer(&self) -> Result<()>;
    /// Warp the pointer to (x, y) relative to the given window.
    fn warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()>;
}
