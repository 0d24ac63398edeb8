//! API wrapper for talking to the X server using x11rb
use crate::{
    core::bindings::{ButtonBinding, KeyBinding, ModMask},
    pure::{
        geometry::{Point, Rect},
        hints::SizeHints,
    },
    x::{
        atom::EWMH_SUPPORTED_ATOMS,
        event::{
            ButtonEvent, ClientMessageEvent, ConfigureNotifyEvent, ConfigureRequestEvent,
            ExposeEvent, KeyPressEvent, MotionEvent, PointerChange, PropertyEvent,
        },
        Atom, CursorKind, Hints, WindowAttributes, WmState, XConn, XEvent,
    },
    Color, Error, Result, Xid,
};
use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
};
use strum::IntoEnumIterator;
use tracing::{debug, error, trace, warn};
use x11::keysym::XK_Num_Lock;
use x11rb::{
    connection::Connection,
    properties::{WmClass, WmHints, WmSizeHints},
    protocol::{
        randr::{self, ConnectionExt as _},
        xproto::{
            AtomEnum, ButtonIndex, ChangeWindowAttributesAux, ClientMessageEvent as XClientMessageEvent,
            CloseDown, ConfigWindow, ConfigureNotifyEvent as XConfigureNotifyEvent,
            ConfigureWindowAux, ConnectionExt as _, CreateGCAux, CreateWindowAux, Cursor,
            EventMask, Font, Gcontext, Grab, GrabMode, GrabStatus, InputFocus, Mapping, MapState,
            ModMask as XModMask, NotifyDetail, NotifyMode, Property, PropMode, StackMode, Window,
            WindowClass, CONFIGURE_NOTIFY_EVENT,
        },
        ErrorKind, Event,
    },
    rust_connection::RustConnection,
    wrapper::ConnectionExt as _,
    x11_utils::X11Error,
    CURRENT_TIME, NONE,
};

use super::draw::Frame;

// cursor font glyphs (cursorfont.h)
const XC_LEFT_PTR: u16 = 68;
const XC_SIZING: u16 = 120;
const XC_FLEUR: u16 = 52;

// request opcodes appearing in the harmless-error filter
const OP_CONFIGURE_WINDOW: u8 = 12;
const OP_GRAB_BUTTON: u8 = 28;
const OP_GRAB_KEY: u8 = 33;
const OP_SET_INPUT_FOCUS: u8 = 42;
const OP_COPY_AREA: u8 = 62;
const OP_POLY_SEGMENT: u8 = 66;
const OP_POLY_FILL_RECTANGLE: u8 = 70;
const OP_POLY_TEXT8: u8 = 74;

struct Keymap {
    min: u8,
    per: usize,
    syms: Vec<u32>,
}

/// Handles communication with the X server via the x11rb crate.
pub struct X11rbConn {
    pub(super) conn: RustConnection,
    pub(super) root: Window,
    screen: Rect,
    pub(super) depth: u8,
    atoms: HashMap<Atom, u32>,
    cursor_normal: Cursor,
    cursor_resize: Cursor,
    cursor_move: Cursor,
    /// Events read and deferred while selectively draining the queue
    pending: RefCell<VecDeque<XEvent>>,
    keymap: RefCell<Option<Keymap>>,
    // bar drawing state (see super::draw)
    pub(super) font: Font,
    pub(super) font_ascent: u32,
    pub(super) font_h: u32,
    pub(super) gc: Gcontext,
    pub(super) frame: Option<Frame>,
}

impl X11rbConn {
    /// Connect to the display named by `DISPLAY` and prepare everything the
    /// manager needs: interned atoms, cursors and the bar font.
    pub fn new(font_name: &str) -> Result<Self> {
        let (conn, screen_num) = RustConnection::connect(None)?;
        let screen = conn.setup().roots[screen_num].clone();
        let root = screen.root;

        // batch the atom interning: all requests first, then all replies
        let cookies = Atom::iter()
            .map(|a| Ok((a, conn.intern_atom(false, a.as_ref().as_bytes())?)))
            .collect::<Result<Vec<_>>>()?;
        let atoms = cookies
            .into_iter()
            .map(|(a, c)| Ok((a, c.reply()?.atom)))
            .collect::<Result<HashMap<_, _>>>()?;

        let (cursor_normal, cursor_resize, cursor_move) = Self::create_cursors(&conn)?;
        let (font, font_ascent, font_h) = Self::load_font(&conn, font_name)?;

        let gc = conn.generate_id()?;
        conn.create_gc(gc, root, &CreateGCAux::new().font(font))?;

        // screen change notifications keep multi-head state fresh; a server
        // without RandR simply never delivers any
        let _ = conn.randr_select_input(root, randr::NotifyMask::SCREEN_CHANGE);

        Ok(Self {
            conn,
            root,
            screen: Rect::new(
                0,
                0,
                screen.width_in_pixels as u32,
                screen.height_in_pixels as u32,
            ),
            depth: screen.root_depth,
            atoms,
            cursor_normal,
            cursor_resize,
            cursor_move,
            pending: RefCell::new(VecDeque::new()),
            keymap: RefCell::new(None),
            font,
            font_ascent,
            font_h,
            gc,
            frame: None,
        })
    }

    fn create_cursors(conn: &RustConnection) -> Result<(Cursor, Cursor, Cursor)> {
        let cursor_font = conn.generate_id()?;
        conn.open_font(cursor_font, b"cursor")?;

        let make = |glyph: u16| -> Result<Cursor> {
            let id = conn.generate_id()?;
            conn.create_glyph_cursor(
                id,
                cursor_font,
                cursor_font,
                glyph,
                glyph + 1,
                0,
                0,
                0,
                0xffff,
                0xffff,
                0xffff,
            )?;
            Ok(id)
        };

        Ok((make(XC_LEFT_PTR)?, make(XC_SIZING)?, make(XC_FLEUR)?))
    }

    fn load_font(conn: &RustConnection, name: &str) -> Result<(Font, u32, u32)> {
        let try_open = |name: &str| -> Result<Font> {
            let id = conn.generate_id()?;
            conn.open_font(id, name.as_bytes())?.check()?;
            Ok(id)
        };

        let font = match try_open(name) {
            Ok(f) => f,
            Err(_) if name != "fixed" => {
                warn!(name, "unable to load font, falling back to fixed");
                try_open("fixed").map_err(|_| Error::NoFont(name.to_string()))?
            }
            Err(_) => return Err(Error::NoFont(name.to_string())),
        };

        let info = conn.query_font(font)?.reply()?;
        let ascent = info.font_ascent.max(0) as u32;
        let height = ascent + info.font_descent.max(0) as u32;

        Ok((font, ascent, height))
    }

    fn cursor_for(&self, kind: CursorKind) -> Cursor {
        match kind {
            CursorKind::Normal => self.cursor_normal,
            CursorKind::Resize => self.cursor_resize,
            CursorKind::Move => self.cursor_move,
        }
    }

    fn atom_from_id(&self, id: u32) -> Option<Atom> {
        self.atoms
            .iter()
            .find(|(_, &v)| v == id)
            .map(|(&a, _)| a)
    }

    fn with_keymap<T>(&self, f: impl FnOnce(&Keymap) -> T) -> Result<T> {
        let mut cache = self.keymap.borrow_mut();
        if cache.is_none() {
            let setup = self.conn.setup();
            let (min, max) = (setup.min_keycode, setup.max_keycode);
            let reply = self
                .conn
                .get_keyboard_mapping(min, max - min + 1)?
                .reply()?;
            *cache = Some(Keymap {
                min,
                per: (reply.keysyms_per_keycode as usize).max(1),
                syms: reply.keysyms,
            });
        }

        Ok(f(cache.as_ref().expect("populated above")))
    }

    fn keysym_for(&self, code: u8) -> Result<u32> {
        self.with_keymap(|km| {
            let ix = (code.saturating_sub(km.min)) as usize * km.per;
            km.syms.get(ix).copied().unwrap_or(0)
        })
    }

    fn keycodes_for(&self, keysym: u32) -> Result<Vec<u8>> {
        self.with_keymap(|km| {
            km.syms
                .chunks(km.per)
                .enumerate()
                .filter(|(_, chunk)| chunk.first() == Some(&keysym))
                .map(|(i, _)| km.min + i as u8)
                .collect()
        })
    }

    fn text_prop(&self, win: Window, atom: u32) -> Result<Option<String>> {
        let reply = self
            .conn
            .get_property(false, win, atom, AtomEnum::ANY, 0, 1024)?
            .reply()?;
        if reply.value.is_empty() {
            return Ok(None);
        }

        let s = String::from_utf8_lossy(&reply.value)
            .trim_end_matches('\0')
            .to_string();

        Ok(Some(s))
    }

    /// Errors that stem from races with clients (windows vanishing between
    /// our observation and our request) are expected and harmless.
    fn is_harmless(e: &X11Error) -> bool {
        matches!(e.error_kind, ErrorKind::Window)
            || matches!(
                (e.major_opcode, e.error_kind),
                (OP_SET_INPUT_FOCUS, ErrorKind::Match)
                    | (OP_CONFIGURE_WINDOW, ErrorKind::Match)
                    | (OP_POLY_TEXT8, ErrorKind::Drawable)
                    | (OP_POLY_FILL_RECTANGLE, ErrorKind::Drawable)
                    | (OP_POLY_SEGMENT, ErrorKind::Drawable)
                    | (OP_COPY_AREA, ErrorKind::Drawable)
                    | (OP_GRAB_BUTTON, ErrorKind::Access)
                    | (OP_GRAB_KEY, ErrorKind::Access)
            )
    }

    /// Convert one wire event into our event model. `None` means the event
    /// kind is not interesting to the manager and is dropped here.
    fn convert(&self, event: Event) -> Option<XEvent> {
        match event {
            Event::Error(e) => {
                if Self::is_harmless(&e) {
                    debug!(?e, "ignoring harmless X error");
                } else {
                    error!(?e, "X request failed");
                }
                None
            }

            Event::ButtonPress(ev) => Some(XEvent::ButtonPress(ButtonEvent {
                id: Xid(ev.event),
                button: ev.detail,
                mods: ModMask::from_bits_truncate(u16::from(ev.state)),
                abs: Point::new(ev.root_x as i32, ev.root_y as i32),
            })),

            Event::ButtonRelease(ev) => Some(XEvent::ButtonRelease(ButtonEvent {
                id: Xid(ev.event),
                button: ev.detail,
                mods: ModMask::from_bits_truncate(u16::from(ev.state)),
                abs: Point::new(ev.root_x as i32, ev.root_y as i32),
            })),

            Event::MotionNotify(ev) => Some(XEvent::Motion(MotionEvent {
                id: Xid(ev.event),
                abs: Point::new(ev.root_x as i32, ev.root_y as i32),
                time: ev.time,
            })),

            Event::KeyPress(ev) => {
                let keysym = self.keysym_for(ev.detail).ok()?;
                Some(XEvent::KeyPress(KeyPressEvent {
                    keysym,
                    mods: ModMask::from_bits_truncate(u16::from(ev.state)),
                }))
            }

            Event::MapRequest(ev) => Some(XEvent::MapRequest(Xid(ev.window))),

            Event::EnterNotify(ev) => {
                // grab/ungrab crossings and inferior-window crossings are
                // not user-meaningful focus changes
                let uninteresting = (ev.mode != NotifyMode::NORMAL
                    || ev.detail == NotifyDetail::INFERIOR)
                    && ev.event != self.root;
                if uninteresting {
                    return None;
                }

                Some(XEvent::Enter(PointerChange {
                    id: Xid(ev.event),
                    abs: Point::new(ev.root_x as i32, ev.root_y as i32),
                }))
            }

            Event::DestroyNotify(ev) => Some(XEvent::Destroy(Xid(ev.window))),

            Event::UnmapNotify(ev) => Some(XEvent::UnmapNotify {
                id: Xid(ev.window),
                synthetic: ev.response_type & 0x80 != 0,
            }),

            Event::ConfigureNotify(ev) => Some(XEvent::ConfigureNotify(ConfigureNotifyEvent {
                id: Xid(ev.window),
                r: Rect::new(
                    ev.x as i32,
                    ev.y as i32,
                    ev.width as u32,
                    ev.height as u32,
                ),
                is_root: ev.window == self.root,
            })),

            Event::ConfigureRequest(ev) => {
                let mask = u16::from(ev.value_mask);
                let has = |flag: ConfigWindow| mask & u16::from(flag) != 0;
                Some(XEvent::ConfigureRequest(ConfigureRequestEvent {
                    id: Xid(ev.window),
                    x: has(ConfigWindow::X).then_some(ev.x as i32),
                    y: has(ConfigWindow::Y).then_some(ev.y as i32),
                    w: has(ConfigWindow::WIDTH).then_some(ev.width as u32),
                    h: has(ConfigWindow::HEIGHT).then_some(ev.height as u32),
                    border_width: has(ConfigWindow::BORDER_WIDTH)
                        .then_some(ev.border_width as u32),
                    sibling: has(ConfigWindow::SIBLING).then_some(Xid(ev.sibling)),
                    stack_mode: has(ConfigWindow::STACK_MODE)
                        .then_some(u32::from(ev.stack_mode)),
                }))
            }

            Event::PropertyNotify(ev) => {
                let atom = self.atom_from_id(ev.atom)?;
                Some(XEvent::PropertyNotify(PropertyEvent {
                    id: Xid(ev.window),
                    atom,
                    is_root: ev.window == self.root,
                    deleted: ev.state == Property::DELETE,
                }))
            }

            Event::ClientMessage(ev) => {
                let dtype = self.atom_from_id(ev.type_)?;
                Some(XEvent::ClientMessage(ClientMessageEvent {
                    id: Xid(ev.window),
                    dtype,
                    data: ev.data.as_data32(),
                }))
            }

            Event::Expose(ev) => Some(XEvent::Expose(ExposeEvent {
                id: Xid(ev.window),
                count: ev.count,
            })),

            Event::FocusIn(ev) => Some(XEvent::FocusIn(Xid(ev.event))),

            Event::MappingNotify(ev) => {
                *self.keymap.borrow_mut() = None;
                Some(XEvent::MappingNotify {
                    keyboard: ev.request == Mapping::KEYBOARD,
                })
            }

            Event::RandrScreenChangeNotify(ev) => {
                // surfaces as a root geometry change so the regular monitor
                // reconciliation picks it up
                Some(XEvent::ConfigureNotify(ConfigureNotifyEvent {
                    id: Xid(self.root),
                    r: Rect::new(0, 0, ev.width as u32, ev.height as u32),
                    is_root: true,
                }))
            }

            _ => None,
        }
    }
}

impl XConn for X11rbConn {
    fn root(&self) -> Xid {
        Xid(self.root)
    }

    fn screen_rect(&self) -> Rect {
        self.screen
    }

    fn screen_details(&self) -> Result<Vec<Rect>> {
        let from_randr = || -> Result<Vec<Rect>> {
            let resources = self
                .conn
                .randr_get_screen_resources_current(self.root)?
                .reply()?;
            let cookies = resources
                .crtcs
                .iter()
                .map(|&c| Ok(self.conn.randr_get_crtc_info(c, 0)?))
                .collect::<Result<Vec<_>>>()?;

            Ok(cookies
                .into_iter()
                .flat_map(|c| c.reply().ok())
                .filter(|info| info.width > 0)
                .map(|info| {
                    Rect::new(
                        info.x as i32,
                        info.y as i32,
                        info.width as u32,
                        info.height as u32,
                    )
                })
                .collect())
        };

        match from_randr() {
            Ok(rects) if !rects.is_empty() => Ok(rects),
            _ => Ok(vec![self.screen]),
        }
    }

    fn cursor_position(&self) -> Result<Point> {
        let reply = self.conn.query_pointer(self.root)?.reply()?;

        Ok(Point::new(reply.root_x as i32, reply.root_y as i32))
    }

    fn next_event(&self) -> Result<XEvent> {
        if let Some(ev) = self.pending.borrow_mut().pop_front() {
            return Ok(ev);
        }

        loop {
            let raw = self.conn.wait_for_event()?;
            if let Some(ev) = self.convert(raw) {
                return Ok(ev);
            }
        }
    }

    fn flush(&self) {
        let _ = self.conn.flush();
    }

    fn sync(&self) -> Result<()> {
        // a round trip forces everything queued so far through the server
        self.conn.get_input_focus()?.reply()?;

        Ok(())
    }

    fn drain_enter_events(&self) -> Result<()> {
        while let Some(raw) = self.conn.poll_for_event()? {
            match self.convert(raw) {
                Some(XEvent::Enter(ev)) => trace!(?ev, "dropping queued Enter event"),
                Some(other) => self.pending.borrow_mut().push_back(other),
                None => {}
            }
        }

        Ok(())
    }

    fn become_wm(&self) -> Result<()> {
        let aux =
            ChangeWindowAttributesAux::new().event_mask(EventMask::SUBSTRUCTURE_REDIRECT);
        let res = self
            .conn
            .change_window_attributes(self.root, &aux)?
            .check();

        match res {
            Ok(()) => Ok(()),
            Err(x11rb::errors::ReplyError::X11Error(ref e))
                if e.error_kind == ErrorKind::Access =>
            {
                Err(Error::OtherWmRunning)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn advertise_wm(&self, wm_name: &str) -> Result<Xid> {
        let check = self.conn.generate_id()?;
        let aux = CreateWindowAux::new().override_redirect(1);
        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            check,
            self.root,
            0,
            0,
            1,
            1,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &aux,
        )?;

        let check_atom = self.known_atom(Atom::NetSupportingWmCheck);
        let name_atom = self.known_atom(Atom::NetWmName);
        let utf8 = self.known_atom(Atom::UTF8String);
        for win in [check, self.root] {
            self.conn
                .change_property32(PropMode::REPLACE, win, check_atom, AtomEnum::WINDOW, &[check])?;
        }
        self.conn
            .change_property8(PropMode::REPLACE, check, name_atom, utf8, wm_name.as_bytes())?;

        let supported: Vec<u32> = EWMH_SUPPORTED_ATOMS
            .iter()
            .map(|&a| self.known_atom(a))
            .collect();
        self.conn.change_property32(
            PropMode::REPLACE,
            self.root,
            self.known_atom(Atom::NetSupported),
            AtomEnum::ATOM,
            &supported,
        )?;
        self.conn
            .delete_property(self.root, self.known_atom(Atom::NetClientList))?;

        Ok(Xid(check))
    }

    fn select_root_events(&self) -> Result<()> {
        let mask = EventMask::SUBSTRUCTURE_REDIRECT
            | EventMask::SUBSTRUCTURE_NOTIFY
            | EventMask::BUTTON_PRESS
            | EventMask::POINTER_MOTION
            | EventMask::ENTER_WINDOW
            | EventMask::LEAVE_WINDOW
            | EventMask::STRUCTURE_NOTIFY
            | EventMask::PROPERTY_CHANGE;
        let aux = ChangeWindowAttributesAux::new()
            .event_mask(mask)
            .cursor(self.cursor_normal);
        self.conn.change_window_attributes(self.root, &aux)?;

        Ok(())
    }

    fn existing_clients(&self) -> Result<Vec<Xid>> {
        let reply = self.conn.query_tree(self.root)?.reply()?;

        Ok(reply.children.into_iter().map(Xid).collect())
    }

    fn create_bar_win(&self, r: Rect) -> Result<Xid> {
        let id = self.conn.generate_id()?;
        let aux = CreateWindowAux::new()
            .override_redirect(1)
            .background_pixel(0)
            .event_mask(EventMask::BUTTON_PRESS | EventMask::EXPOSURE)
            .cursor(self.cursor_normal);
        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            id,
            self.root,
            r.x as i16,
            r.y as i16,
            r.w.max(1) as u16,
            r.h.max(1) as u16,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &aux,
        )?;
        self.conn.map_window(id)?;
        self.conn
            .configure_window(id, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))?;

        Ok(Xid(id))
    }

    fn destroy_window(&self, id: Xid) -> Result<()> {
        self.conn.unmap_window(*id)?;
        self.conn.destroy_window(*id)?;

        Ok(())
    }

    fn get_window_attributes(&self, id: Xid) -> Result<WindowAttributes> {
        let reply = self.conn.get_window_attributes(*id)?.reply()?;

        Ok(WindowAttributes {
            override_redirect: reply.override_redirect,
            viewable: reply.map_state == MapState::VIEWABLE,
        })
    }

    fn client_geometry(&self, id: Xid) -> Result<(Rect, u32)> {
        let geo = self.conn.get_geometry(*id)?.reply()?;

        Ok((
            Rect::new(geo.x as i32, geo.y as i32, geo.width as u32, geo.height as u32),
            geo.border_width as u32,
        ))
    }

    fn window_title(&self, id: Xid) -> Result<Option<String>> {
        match self.text_prop(*id, self.known_atom(Atom::NetWmName))? {
            Some(name) => Ok(Some(name)),
            None => self.text_prop(*id, self.known_atom(Atom::WmName)),
        }
    }

    fn root_name(&self) -> Result<Option<String>> {
        self.text_prop(self.root, self.known_atom(Atom::WmName))
    }

    fn wm_class(&self, id: Xid) -> Result<Option<(String, String)>> {
        let reply = WmClass::get(&self.conn, *id)?.reply_unchecked();

        Ok(reply.ok().flatten().map(|c| {
            (
                String::from_utf8_lossy(c.instance()).to_string(),
                String::from_utf8_lossy(c.class()).to_string(),
            )
        }))
    }

    fn transient_for(&self, id: Xid) -> Result<Option<Xid>> {
        let reply = self
            .conn
            .get_property(
                false,
                *id,
                self.known_atom(Atom::WmTransientFor),
                AtomEnum::WINDOW,
                0,
                1,
            )?
            .reply()?;

        Ok(reply
            .value32()
            .and_then(|mut it| it.next())
            .filter(|&w| w != NONE)
            .map(Xid))
    }

    fn size_hints(&self, id: Xid) -> Result<Option<SizeHints>> {
        let reply = WmSizeHints::get_normal_hints(&self.conn, *id)?.reply_unchecked();
        let raw = match reply.ok().flatten() {
            Some(h) => h,
            None => return Ok(None),
        };

        let pair = |p: Option<(i32, i32)>| p.map(|(a, b)| (a.max(0) as u32, b.max(0) as u32));
        let aspect = raw.aspect.map(|(min, max)| {
            (
                (min.numerator.max(0) as u32, min.denominator.max(0) as u32),
                (max.numerator.max(0) as u32, max.denominator.max(0) as u32),
            )
        });

        Ok(Some(SizeHints::from_icccm(
            pair(raw.base_size),
            pair(raw.min_size),
            pair(raw.max_size),
            pair(raw.size_increment),
            aspect,
        )))
    }

    fn hints(&self, id: Xid) -> Result<Option<Hints>> {
        let reply = WmHints::get(&self.conn, *id)?.reply_unchecked();

        Ok(reply.ok().flatten().map(|h| Hints {
            urgent: h.urgent,
            input: h.input,
        }))
    }

    fn set_urgency(&self, id: Xid, urgent: bool) -> Result<()> {
        let mut hints = WmHints::get(&self.conn, *id)?
            .reply_unchecked()
            .ok()
            .flatten()
            .unwrap_or_default();
        hints.urgent = urgent;
        hints.set(&self.conn, *id)?;

        Ok(())
    }

    fn atom_prop(&self, id: Xid, atom: Atom) -> Result<Option<u32>> {
        let reply = self
            .conn
            .get_property(false, *id, self.known_atom(atom), AtomEnum::ATOM, 0, 1024)?
            .reply()?;

        Ok(reply.value32().and_then(|mut it| it.next()))
    }

    fn known_atom(&self, atom: Atom) -> u32 {
        *self.atoms.get(&atom).expect("all atoms interned at startup")
    }

    fn wm_state(&self, id: Xid) -> Result<Option<WmState>> {
        let state = self.known_atom(Atom::WmState);
        let reply = self
            .conn
            .get_property(false, *id, state, state, 0, 2)?
            .reply()?;

        Ok(reply
            .value32()
            .and_then(|mut it| it.next())
            .and_then(|raw| WmState::try_from(raw).ok()))
    }

    fn set_wm_state(&self, id: Xid, state: WmState) -> Result<()> {
        let atom = self.known_atom(Atom::WmState);
        self.conn
            .change_property32(PropMode::REPLACE, *id, atom, atom, &[state.into(), NONE])?;

        Ok(())
    }

    fn send_protocol(&self, id: Xid, proto: Atom) -> Result<bool> {
        let protocols = self
            .conn
            .get_property(
                false,
                *id,
                self.known_atom(Atom::WmProtocols),
                AtomEnum::ATOM,
                0,
                1024,
            )?
            .reply()?;
        let proto_id = self.known_atom(proto);
        let supported = protocols
            .value32()
            .map(|it| it.collect::<Vec<_>>())
            .unwrap_or_default()
            .contains(&proto_id);

        if supported {
            let event = XClientMessageEvent::new(
                32,
                *id,
                self.known_atom(Atom::WmProtocols),
                [proto_id, CURRENT_TIME, 0, 0, 0],
            );
            self.conn
                .send_event(false, *id, EventMask::NO_EVENT, event)?;
        }

        Ok(supported)
    }

    fn set_fullscreen_prop(&self, id: Xid, fullscreen: bool) -> Result<()> {
        let data: &[u32] = if fullscreen {
            &[self.known_atom(Atom::NetWmStateFullscreen)]
        } else {
            &[]
        };
        self.conn.change_property32(
            PropMode::REPLACE,
            *id,
            self.known_atom(Atom::NetWmState),
            AtomEnum::ATOM,
            data,
        )?;

        Ok(())
    }

    fn set_active_window(&self, id: Option<Xid>) -> Result<()> {
        let atom = self.known_atom(Atom::NetActiveWindow);
        match id {
            Some(id) => {
                self.conn.change_property32(
                    PropMode::REPLACE,
                    self.root,
                    atom,
                    AtomEnum::WINDOW,
                    &[*id],
                )?;
            }
            None => {
                self.conn.delete_property(self.root, atom)?;
            }
        }

        Ok(())
    }

    fn append_client_list(&self, id: Xid) -> Result<()> {
        self.conn.change_property32(
            PropMode::APPEND,
            self.root,
            self.known_atom(Atom::NetClientList),
            AtomEnum::WINDOW,
            &[*id],
        )?;

        Ok(())
    }

    fn set_client_list(&self, ids: &[Xid]) -> Result<()> {
        let raw: Vec<u32> = ids.iter().map(|id| **id).collect();
        self.conn.change_property32(
            PropMode::REPLACE,
            self.root,
            self.known_atom(Atom::NetClientList),
            AtomEnum::WINDOW,
            &raw,
        )?;

        Ok(())
    }

    fn position_client(&self, id: Xid, r: Rect, bw: u32) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .x(r.x)
            .y(r.y)
            .width(r.w.max(1))
            .height(r.h.max(1))
            .border_width(bw);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn move_client(&self, id: Xid, p: Point) -> Result<()> {
        let aux = ConfigureWindowAux::new().x(p.x).y(p.y);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn move_resize(&self, id: Xid, r: Rect) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .x(r.x)
            .y(r.y)
            .width(r.w.max(1))
            .height(r.h.max(1));
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn send_configure_notify(&self, id: Xid, r: Rect, bw: u32) -> Result<()> {
        let event = XConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: *id,
            window: *id,
            above_sibling: NONE,
            x: r.x as i16,
            y: r.y as i16,
            width: r.w as u16,
            height: r.h as u16,
            border_width: bw as u16,
            override_redirect: false,
        };
        self.conn
            .send_event(false, *id, EventMask::STRUCTURE_NOTIFY, event)?;

        Ok(())
    }

    fn forward_configure_request(&self, ev: &ConfigureRequestEvent) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .x(ev.x)
            .y(ev.y)
            .width(ev.w)
            .height(ev.h)
            .border_width(ev.border_width)
            .sibling(ev.sibling.map(|s| *s))
            .stack_mode(ev.stack_mode.map(|m| StackMode::from(m as u8)));
        self.conn.configure_window(*ev.id, &aux)?;

        Ok(())
    }

    fn set_border_width(&self, id: Xid, bw: u32) -> Result<()> {
        self.conn
            .configure_window(*id, &ConfigureWindowAux::new().border_width(bw))?;

        Ok(())
    }

    fn set_border_color(&self, id: Xid, color: Color) -> Result<()> {
        let aux = ChangeWindowAttributesAux::new().border_pixel(color.rgb_u32());
        self.conn.change_window_attributes(*id, &aux)?;

        Ok(())
    }

    fn select_client_events(&self, id: Xid) -> Result<()> {
        let mask = EventMask::ENTER_WINDOW
            | EventMask::FOCUS_CHANGE
            | EventMask::PROPERTY_CHANGE
            | EventMask::STRUCTURE_NOTIFY;
        self.conn
            .change_window_attributes(*id, &ChangeWindowAttributesAux::new().event_mask(mask))?;

        Ok(())
    }

    fn raise_window(&self, id: Xid) -> Result<()> {
        self.conn
            .configure_window(*id, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))?;

        Ok(())
    }

    fn stack_below(&self, id: Xid, sibling: Xid) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .sibling(*sibling)
            .stack_mode(StackMode::BELOW);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn map_window(&self, id: Xid) -> Result<()> {
        self.conn.map_window(*id)?;

        Ok(())
    }

    fn set_input_focus(&self, id: Xid) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, *id, CURRENT_TIME)?;

        Ok(())
    }

    fn focus_root(&self) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, self.root, CURRENT_TIME)?;

        Ok(())
    }

    fn kill_client(&self, id: Xid) -> Result<()> {
        self.conn.grab_server()?;
        let _ = self.conn.set_close_down_mode(CloseDown::DESTROY_ALL);
        let _ = self.conn.kill_client(*id);
        let _ = self.sync();
        self.conn.ungrab_server()?;
        self.flush();

        Ok(())
    }

    fn numlock_mask(&self) -> Result<ModMask> {
        let reply = self.conn.get_modifier_mapping()?.reply()?;
        let per = reply.keycodes_per_modifier() as usize;
        let numlock_codes = self.keycodes_for(XK_Num_Lock)?;

        for (i, chunk) in reply.keycodes.chunks(per).enumerate() {
            if chunk.iter().any(|kc| numlock_codes.contains(kc)) {
                return Ok(ModMask::from_bits_truncate(1 << i));
            }
        }

        Ok(ModMask::empty())
    }

    fn grab_keys(&self, keys: &[KeyBinding], numlock: ModMask) -> Result<()> {
        // the server side mapping may have changed under us
        *self.keymap.borrow_mut() = None;
        self.conn
            .ungrab_key(Grab::ANY, self.root, XModMask::ANY.into())?;

        let combos = [
            ModMask::empty(),
            ModMask::LOCK,
            numlock,
            numlock | ModMask::LOCK,
        ];
        for key in keys {
            for code in self.keycodes_for(key.keysym)? {
                for combo in combos {
                    self.conn.grab_key(
                        true,
                        self.root,
                        XModMask::from((key.mods | combo).bits()),
                        code,
                        GrabMode::ASYNC,
                        GrabMode::ASYNC,
                    )?;
                }
            }
        }
        self.flush();

        Ok(())
    }

    fn ungrab_keys(&self) -> Result<()> {
        self.conn
            .ungrab_key(Grab::ANY, self.root, XModMask::ANY.into())?;

        Ok(())
    }

    fn grab_buttons(
        &self,
        id: Xid,
        focused: bool,
        buttons: &[ButtonBinding],
        numlock: ModMask,
    ) -> Result<()> {
        use crate::core::bindings::ClickRegion;

        self.conn
            .ungrab_button(ButtonIndex::ANY, *id, XModMask::ANY.into())?;

        if !focused {
            // intercept every click so an unfocused client can be focused;
            // the click itself is swallowed
            self.conn.grab_button(
                false,
                *id,
                EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE,
                GrabMode::SYNC,
                GrabMode::SYNC,
                NONE,
                NONE,
                ButtonIndex::ANY,
                XModMask::ANY.into(),
            )?;
        }

        let combos = [
            ModMask::empty(),
            ModMask::LOCK,
            numlock,
            numlock | ModMask::LOCK,
        ];
        for b in buttons.iter().filter(|b| b.click == ClickRegion::ClientWin) {
            for combo in combos {
                self.conn.grab_button(
                    false,
                    *id,
                    EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE,
                    GrabMode::ASYNC,
                    GrabMode::SYNC,
                    NONE,
                    NONE,
                    ButtonIndex::from(b.button),
                    XModMask::from((b.mods | combo).bits()),
                )?;
            }
        }

        Ok(())
    }

    fn ungrab_buttons(&self, id: Xid) -> Result<()> {
        self.conn
            .ungrab_button(ButtonIndex::ANY, *id, XModMask::ANY.into())?;

        Ok(())
    }

    fn grab_pointer(&self, cursor: CursorKind) -> Result<bool> {
        let reply = self
            .conn
            .grab_pointer(
                false,
                self.root,
                EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::POINTER_MOTION,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                NONE,
                self.cursor_for(cursor),
                CURRENT_TIME,
            )?
            .reply()?;

        Ok(reply.status == GrabStatus::SUCCESS)
    }

    fn ungrab_pointer(&self) -> Result<()> {
        self.conn.ungrab_pointer(CURRENT_TIME)?;

        Ok(())
    }

    fn warp_pointer(&self, id: Xid, x: i16, y: i16) -> Result<()> {
        self.conn.warp_pointer(NONE, *id, 0, 0, 0, 0, x, y)?;

        Ok(())
    }
}
