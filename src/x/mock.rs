//! A stub implementation of [XConn] for testing the manager without a
//! running X server.
//!
//! Implement [StubXConn] and override only the `mock_*` methods your test
//! cares about: every implementor gets a full [XConn] via the blanket impl
//! below. Defaults are benign (empty reads, successful writes) so that
//! whole manager flows run under test; `mock_next_event` is the exception
//! since a test driving the event loop must supply its own events.
use crate::{
    core::bindings::{ButtonBinding, KeyBinding, ModMask},
    pure::{
        geometry::{Point, Rect},
        hints::SizeHints,
    },
    x::{
        event::ConfigureRequestEvent, Atom, CursorKind, Hints, WindowAttributes, WmState, XConn,
        XEvent,
    },
    Color, Error, Result, Xid,
};

#[allow(unused_variables)]
pub trait StubXConn {
    fn mock_root(&self) -> Xid {
        Xid(1)
    }

    fn mock_screen_rect(&self) -> Rect {
        Rect::new(0, 0, 1920, 1080)
    }

    fn mock_screen_details(&self) -> Result<Vec<Rect>> {
        Ok(vec![self.mock_screen_rect()])
    }

    fn mock_cursor_position(&self) -> Result<Point> {
        Ok(Point::new(0, 0))
    }

    fn mock_next_event(&self) -> Result<XEvent> {
        Err(Error::UnimplementedMock)
    }

    fn mock_flush(&self) {}

    fn mock_sync(&self) -> Result<()> {
        Ok(())
    }

    fn mock_drain_enter_events(&self) -> Result<()> {
        Ok(())
    }

    fn mock_become_wm(&self) -> Result<()> {
        Ok(())
    }

    fn mock_advertise_wm(&self, wm_name: &str) -> Result<Xid> {
        Ok(Xid(2))
    }

    fn mock_select_root_events(&self) -> Result<()> {
        Ok(())
    }

    fn mock_existing_clients(&self) -> Result<Vec<Xid>> {
        Ok(Vec::new())
    }

    fn mock_create_bar_win(&self, r: Rect) -> Result<Xid> {
        Ok(Xid(90))
    }

    fn mock_destroy_window(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_get_window_attributes(&self, id: Xid) -> Result<WindowAttributes> {
        Ok(WindowAttributes::default())
    }

    fn mock_client_geometry(&self, id: Xid) -> Result<(Rect, u32)> {
        Ok((Rect::new(0, 0, 800, 600), 0))
    }

    fn mock_window_title(&self, id: Xid) -> Result<Option<String>> {
        Ok(None)
    }

    fn mock_root_name(&self) -> Result<Option<String>> {
        Ok(None)
    }

    fn mock_wm_class(&self, id: Xid) -> Result<Option<(String, String)>> {
        Ok(None)
    }

    fn mock_transient_for(&self, id: Xid) -> Result<Option<Xid>> {
        Ok(None)
    }

    fn mock_size_hints(&self, id: Xid) -> Result<Option<SizeHints>> {
        Ok(None)
    }

    fn mock_hints(&self, id: Xid) -> Result<Option<Hints>> {
        Ok(None)
    }

    fn mock_set_urgency(&self, id: Xid, urgent: bool) -> Result<()> {
        Ok(())
    }

    fn mock_atom_prop(&self, id: Xid, atom: Atom) -> Result<Option<u32>> {
        Ok(None)
    }

    fn mock_known_atom(&self, atom: Atom) -> u32 {
        // stable fake ids, clear of the predefined atom range
        1000 + atom as u32
    }

    fn mock_wm_state(&self, id: Xid) -> Result<Option<WmState>> {
        Ok(None)
    }

    fn mock_set_wm_state(&self, id: Xid, state: WmState) -> Result<()> {
        Ok(())
    }

    fn mock_send_protocol(&self, id: Xid, proto: Atom) -> Result<bool> {
        Ok(false)
    }

    fn mock_set_fullscreen_prop(&self, id: Xid, fullscreen: bool) -> Result<()> {
        Ok(())
    }

    fn mock_set_active_window(&self, id: Option<Xid>) -> Result<()> {
        Ok(())
    }

    fn mock_append_client_list(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_set_client_list(&self, ids: &[Xid]) -> Result<()> {
        Ok(())
    }

    fn mock_position_client(&self, id: Xid, r: Rect, bw: u32) -> Result<()> {
        Ok(())
    }

    fn mock_move_client(&self, id: Xid, p: Point) -> Result<()> {
        Ok(())
    }

    fn mock_move_resize(&self, id: Xid, r: Rect) -> Result<()> {
        Ok(())
    }

    fn mock_send_configure_notify(&self, id: Xid, r: Rect, bw: u32) -> Result<()> {
        Ok(())
    }

    fn mock_forward_configure_request(&self, ev: &ConfigureRequestEvent) -> Result<()> {
        Ok(())
    }

    fn mock_set_border_width(&self, id: Xid, bw: u32) -> Result<()> {
        Ok(())
    }

    fn mock_set_border_color(&self, id: Xid, color: Color) -> Result<()> {
        Ok(())
    }

    fn mock_select_client_events(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_raise_window(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_stack_below(&self, id: Xid, sibling: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_map_window(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_set_input_focus(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_focus_root(&self) -> Result<()> {
        Ok(())
    }

    fn mock_kill_client(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_numlock_mask(&self) -> Result<ModMask> {
        Ok(ModMask::MOD2)
    }

    fn mock_grab_keys(&self, keys: &[KeyBinding], numlock: ModMask) -> Result<()> {
        Ok(())
    }

    fn mock_ungrab_keys(&self) -> Result<()> {
        Ok(())
    }

    fn mock_grab_buttons(
        &self,
        id: Xid,
        focused: bool,
        buttons: &[ButtonBinding],
        numlock: ModMask,
    ) -> Result<()> {
        Ok(())
    }

    fn mock_ungrab_buttons(&self, id: Xid) -> Result<()> {
        Ok(())
    }

    fn mock_grab_pointer(&self, cursor: CursorKind) -> Result<bool> {
        Ok(true)
    }

    fn mock_ungrab_pointer(&self) -> Result<()> {
        Ok(())
    }

    fn mock_warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()> {
        Ok(())
    }
}

impl<T> XConn for T
where
    T: StubXConn,
{
    fn root(&self) -> Xid {
        self.mock_root()
    }

    fn screen_rect(&self) -> Rect {
        self.mock_screen_rect()
    }

    fn screen_details(&self) -> Result<Vec<Rect>> {
        self.mock_screen_details()
    }

    fn cursor_position(&self) -> Result<Point> {
        self.mock_cursor_position()
    }

    fn next_event(&self) -> Result<XEvent> {
        self.mock_next_event()
    }

    fn flush(&self) {
        self.mock_flush()
    }

    fn sync(&self) -> Result<()> {
        self.mock_sync()
    }

    fn drain_enter_events(&self) -> Result<()> {
        self.mock_drain_enter_events()
    }

    fn become_wm(&self) -> Result<()> {
        self.mock_become_wm()
    }

    fn advertise_wm(&self, wm_name: &str) -> Result<Xid> {
        self.mock_advertise_wm(wm_name)
    }

    fn select_root_events(&self) -> Result<()> {
        self.mock_select_root_events()
    }

    fn existing_clients(&self) -> Result<Vec<Xid>> {
        self.mock_existing_clients()
    }

    fn create_bar_win(&self, r: Rect) -> Result<Xid> {
        self.mock_create_bar_win(r)
    }

    fn destroy_window(&self, id: Xid) -> Result<()> {
        self.mock_destroy_window(id)
    }

    fn get_window_attributes(&self, id: Xid) -> Result<WindowAttributes> {
        self.mock_get_window_attributes(id)
    }

    fn client_geometry(&self, id: Xid) -> Result<(Rect, u32)> {
        self.mock_client_geometry(id)
    }

    fn window_title(&self, id: Xid) -> Result<Option<String>> {
        self.mock_window_title(id)
    }

    fn root_name(&self) -> Result<Option<String>> {
        self.mock_root_name()
    }

    fn wm_class(&self, id: Xid) -> Result<Option<(String, String)>> {
        self.mock_wm_class(id)
    }

    fn transient_for(&self, id: Xid) -> Result<Option<Xid>> {
        self.mock_transient_for(id)
    }

    fn size_hints(&self, id: Xid) -> Result<Option<SizeHints>> {
        self.mock_size_hints(id)
    }

    fn hints(&self, id: Xid) -> Result<Option<Hints>> {
        self.mock_hints(id)
    }

    fn set_urgency(&self, id: Xid, urgent: bool) -> Result<()> {
        self.mock_set_urgency(id, urgent)
    }

    fn atom_prop(&self, id: Xid, atom: Atom) -> Result<Option<u32>> {
        self.mock_atom_prop(id, atom)
    }

    fn known_atom(&self, atom: Atom) -> u32 {
        self.mock_known_atom(atom)
    }

    fn wm_state(&self, id: Xid) -> Result<Option<WmState>> {
        self.mock_wm_state(id)
    }

    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()> {
        self.mock_set_wm_state(id, state)
    }

    fn send_protocol(&self, id: Xid, proto: Atom) -> Result<bool> {
        self.mock_send_protocol(id, proto)
    }

    fn set_fullscreen_prop(&self, id: Xid, fullscreen: bool) -> Result<()> {
        self.mock_set_fullscreen_prop(id, fullscreen)
    }

    fn set_active_window(&self, id: Option<Xid>) -> Result<()> {
        self.mock_set_active_window(id)
    }

    fn append_client_list(&self, id: Xid) -> Result<()> {
        self.mock_append_client_list(id)
    }

    fn set_client_list(&self, ids: &[Xid]) -> Result<()> {
        self.mock_set_client_list(ids)
    }

    fn position_client(&self, id: Xid, r: Rect, bw: u32) -> Result<()> {
        self.mock_position_client(id, r, bw)
    }

    fn move_client(&self, id: Xid, p: Point) -> Result<()> {
        self.mock_move_client(id, p)
    }

    fn move_resize(&self, id: Xid, r: Rect) -> Result<()> {
        self.mock_move_resize(id, r)
    }

    fn send_configure_notify(&self, id: Xid, r: Rect, bw: u32) -> Result<()> {
        self.mock_send_configure_notify(id, r, bw)
    }

    fn forward_configure_request(&self, ev: &ConfigureRequestEvent) -> Result<()> {
        self.mock_forward_configure_request(ev)
    }

    fn set_border_width(&self, id: Xid, bw: u32) -> Result<()> {
        self.mock_set_border_width(id, bw)
    }

    fn set_border_color(&self, id: Xid, color: Color) -> Result<()> {
        self.mock_set_border_color(id, color)
    }

    fn select_client_events(&self, id: Xid) -> Result<()> {
        self.mock_select_client_events(id)
    }

    fn raise_window(&self, id: Xid) -> Result<()> {
        self.mock_raise_window(id)
    }

    fn stack_below(&self, id: Xid, sibling: Xid) -> Result<()> {
        self.mock_stack_below(id, sibling)
    }

    fn map_window(&self, id: Xid) -> Result<()> {
        self.mock_map_window(id)
    }

    fn set_input_focus(&self, id: Xid) -> Result<()> {
        self.mock_set_input_focus(id)
    }

    fn focus_root(&self) -> Result<()> {
        self.mock_focus_root()
    }

    fn kill_client(&self, id: Xid) -> Result<()> {
        self.mock_kill_client(id)
    }

    fn numlock_mask(&self) -> Result<ModMask> {
        self.mock_numlock_mask()
    }

    fn grab_keys(&self, keys: &[KeyBinding], numlock: ModMask) -> Result<()> {
        self.mock_grab_keys(keys, numlock)
    }

    fn ungrab_keys(&self) -> Result<()> {
        self.mock_ungrab_keys()
    }

    fn grab_buttons(
        &self,
        id: Xid,
        focused: bool,
        buttons: &[ButtonBinding],
        numlock: ModMask,
    ) -> Result<()> {
        self.mock_grab_buttons(id, focused, buttons, numlock)
    }

    fn ungrab_buttons(&self, id: Xid) -> Result<()> {
        self.mock_ungrab_buttons(id)
    }

    fn grab_pointer(&self, cursor: CursorKind) -> Result<bool> {
        self.mock_grab_pointer(cursor)
    }

    fn ungrab_pointer(&self) -> Result<()> {
        self.mock_ungrab_pointer()
    }

    fn warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()> {
        self.mock_warp_pointer(id, x, y)
    }
}
