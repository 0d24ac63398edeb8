//! The window manager itself: event dispatch, client adoption and the
//! mirroring of pure state changes out to the X server.
use crate::{
    bar::{self, BarContent, Draw, SelInfo},
    config::Config,
    core::{
        bindings::{Arg, ClickRegion, Command, ModMask},
        client::Client,
        state::ClientSet,
    },
    layout::{self, LayoutKind},
    pure::geometry::{Point, Rect},
    util,
    x::{
        event::{
            ButtonEvent, ClientMessageEvent, ConfigureNotifyEvent, ConfigureRequestEvent,
            ExposeEvent, KeyPressEvent, MotionEvent, PointerChange, PropertyEvent,
        },
        Atom, CursorKind, WmState, XConn, XEvent,
    },
    Error, Result, Xid,
};
use tracing::{debug, error, info, trace};

/// The name advertised through _NET_SUPPORTING_WM_CHECK.
const WM_NAME: &str = "vesper";

/// Pointer motion during gestures is applied at most this often.
const MOTION_INTERVAL_MS: u32 = 1000 / 60;

/// The status text is clipped to this many bytes.
const STATUS_MAX: usize = 256;

/// A running window manager over some [XConn] + [Draw] backend.
///
/// All field access is single threaded: the only entry points are
/// [new][WindowManager::new], [run][WindowManager::run] and (for embedding
/// and tests) [handle_xevent][WindowManager::handle_xevent] /
/// [run_command][WindowManager::run_command].
pub struct WindowManager<X>
where
    X: XConn + Draw,
{
    x: X,
    config: Config,
    cs: ClientSet,
    status: String,
    screen: Rect,
    bar_h: u32,
    numlock: ModMask,
    check_win: Xid,
    running: bool,
    /// The monitor the pointer was last seen on while crossing root space
    motion_mon: Option<usize>,
}

impl<X> WindowManager<X>
where
    X: XConn + Draw,
{
    /// Claim window manager status on the connection and bring the world up:
    /// monitors, bars, EWMH properties, key grabs and initial focus.
    pub fn new(x: X, config: Config) -> Result<Self> {
        config.validate()?;
        x.become_wm()?;

        let screen = x.screen_rect();
        let bar_h = bar::bar_height(&x);
        let mut cs = ClientSet::new();
        let details = x.screen_details()?;
        cs.update_monitors(&details, bar_h, &config);
        if cs.monitors.is_empty() {
            return Err(Error::NoScreens);
        }

        let check_win = x.advertise_wm(WM_NAME)?;
        let numlock = x.numlock_mask()?;

        let mut wm = Self {
            x,
            config,
            cs,
            status: default_status(),
            screen,
            bar_h,
            numlock,
            check_win,
            running: false,
            motion_mon: None,
        };

        wm.update_status();
        wm.update_bars()?;
        wm.x.select_root_events()?;
        wm.grab_keys()?;
        wm.focus(None);

        info!(monitors = wm.cs.monitors.len(), "window manager initialized");

        Ok(wm)
    }

    /// Adopt existing windows and process events until [Command::Quit].
    pub fn run(&mut self) -> Result<()> {
        self.scan();
        self.running = true;

        while self.running {
            let event = self.x.next_event()?;
            trace!(?event, "got event");
            if let Err(error) = self.handle_xevent(event) {
                error!(%error, "error handling event");
            }
        }

        self.cleanup();

        Ok(())
    }

    /// The current pure state, for inspection by tests and embedders.
    pub fn client_set(&self) -> &ClientSet {
        &self.cs
    }

    /// The current status bar text.
    pub fn status_text(&self) -> &str {
        &self.status
    }

    /// Whether the event loop is (still) running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Dispatch one event to its handler.
    pub fn handle_xevent(&mut self, event: XEvent) -> Result<()> {
        use XEvent::*;

        match event {
            ButtonPress(ev) => self.button_press(ev),
            ButtonRelease(_) => Ok(()),
            ClientMessage(ev) => self.client_message(ev),
            ConfigureNotify(ev) => self.configure_notify(ev),
            ConfigureRequest(ev) => self.configure_request(ev),
            Destroy(id) => self.unmanage(id, true),
            Enter(ev) => self.enter_notify(ev),
            Expose(ev) => self.expose(ev),
            FocusIn(id) => self.focus_in(id),
            KeyPress(ev) => self.key_press(ev),
            MappingNotify { keyboard } => self.mapping_notify(keyboard),
            MapRequest(id) => self.map_request(id),
            Motion(ev) => self.motion_notify(ev),
            PropertyNotify(ev) => self.property_notify(ev),
            UnmapNotify { id, synthetic } => self.unmap_notify(id, synthetic),
        }
    }

    // Lifecycle

    /// Manage windows that existed before we started: regular windows first,
    /// transients second so their parents are already known.
    fn scan(&mut self) {
        let wins = match self.x.existing_clients() {
            Ok(wins) => wins,
            Err(error) => {
                error!(%error, "unable to query existing windows");
                return;
            }
        };

        let adoptable = |wm: &Self, win: Xid| match wm.x.get_window_attributes(win) {
            Ok(attrs) if !attrs.override_redirect => {
                let iconic = matches!(wm.x.wm_state(win), Ok(Some(WmState::Iconic)));
                attrs.viewable || iconic
            }
            _ => false,
        };

        for &win in &wins {
            let transient = matches!(self.x.transient_for(win), Ok(Some(_)));
            if !transient && adoptable(self, win) {
                if let Err(error) = self.manage(win) {
                    error!(%error, %win, "unable to manage existing window");
                }
            }
        }

        for &win in &wins {
            let transient = matches!(self.x.transient_for(win), Ok(Some(_)));
            if transient && adoptable(self, win) {
                if let Err(error) = self.manage(win) {
                    error!(%error, %win, "unable to manage existing transient");
                }
            }
        }
    }

    fn cleanup(&mut self) {
        info!("cleaning up");
        let all_tags = self.config.tag_mask();
        let float = self
            .config
            .layouts
            .iter()
            .copied()
            .find(|l| !l.arranges());

        for m in self.cs.monitors.iter_mut() {
            m.view(all_tags);
            if let Some(l) = float {
                m.lt[m.sel_lt] = l;
            }
        }

        let ids: Vec<Xid> = self.cs.clients.keys().copied().collect();
        for id in ids {
            let _ = self.unmanage(id, false);
        }

        let _ = self.x.ungrab_keys();
        for ix in 0..self.cs.monitors.len() {
            if let Some(bar) = self.cs.monitors[ix].bar_win.take() {
                let _ = self.x.destroy_window(bar);
            }
        }
        let _ = self.x.destroy_window(self.check_win);
        let _ = self.x.focus_root();
        let _ = self.x.set_active_window(None);
        let _ = self.x.sync();
    }

    // Event handlers

    fn button_press(&mut self, ev: ButtonEvent) -> Result<()> {
        let mon = if ev.id == self.x.root() {
            self.cs.point_to_mon(ev.abs)
        } else {
            self.cs.win_to_mon(ev.id).unwrap_or(self.cs.sel_mon)
        };

        if mon != self.cs.sel_mon {
            self.unfocus(self.cs.selected(), true);
            self.cs.sel_mon = mon;
            self.focus(None);
        }

        let (click, tag_mask) = if Some(ev.id) == self.cs.monitor(mon).bar_win {
            let rel_x = ev.abs.x - self.cs.monitor(mon).work.x;
            let (width, symbol) = {
                let m = self.cs.monitor(mon);
                (m.work.w, m.lt_symbol.clone())
            };
            let tags = self.config.tags.clone();
            let status = self.status.clone();
            bar::click_at(&mut self.x, rel_x, width, &tags, &symbol, &status)?
        } else if self.cs.contains(ev.id) {
            self.focus(Some(ev.id));
            self.restack(self.cs.sel_mon);
            (ClickRegion::ClientWin, 0)
        } else {
            (ClickRegion::RootWin, 0)
        };

        let bindings: Vec<_> = self
            .config
            .buttons
            .iter()
            .copied()
            .filter(|b| {
                b.click == click
                    && b.button == ev.button
                    && b.mods.clean(self.numlock) == ev.mods.clean(self.numlock)
            })
            .collect();

        for b in bindings {
            let arg = match (click, b.arg) {
                (ClickRegion::TagBar, Arg::UInt(0)) => Arg::UInt(tag_mask),
                _ => b.arg,
            };
            self.run_command(b.cmd, arg)?;
        }

        Ok(())
    }

    fn key_press(&mut self, ev: KeyPressEvent) -> Result<()> {
        let matches: Vec<_> = self
            .config
            .keys
            .iter()
            .copied()
            .filter(|k| {
                k.keysym == ev.keysym
                    && k.mods.clean(self.numlock) == ev.mods.clean(self.numlock)
            })
            .collect();

        for k in matches {
            debug!(keysym = ev.keysym, cmd = ?k.cmd, "running keybinding");
            self.run_command(k.cmd, k.arg)?;
        }

        Ok(())
    }

    fn client_message(&mut self, ev: ClientMessageEvent) -> Result<()> {
        if !self.cs.contains(ev.id) {
            return Ok(());
        }

        match ev.dtype {
            Atom::NetWmState => {
                let fullscreen = self.x.known_atom(Atom::NetWmStateFullscreen);
                if ev.data[1] == fullscreen || ev.data[2] == fullscreen {
                    // EWMH action codes: 0 = remove, 1 = add, 2 = toggle
                    let currently = self
                        .cs
                        .client(ev.id)
                        .map(|c| c.fullscreen)
                        .unwrap_or(false);
                    let enable = ev.data[0] == 1 || (ev.data[0] == 2 && !currently);
                    self.set_fullscreen(ev.id, enable);
                }
            }
            Atom::NetActiveWindow => {
                let urgent = self.cs.client(ev.id).map(|c| c.urgent).unwrap_or(true);
                if Some(ev.id) != self.cs.selected() && !urgent {
                    self.set_urgent(ev.id, true);
                    self.draw_bars();
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn configure_notify(&mut self, ev: ConfigureNotifyEvent) -> Result<()> {
        if !ev.is_root {
            return Ok(());
        }

        let dirty = self.screen.w != ev.r.w || self.screen.h != ev.r.h;
        self.screen = ev.r;

        if self.update_geometry() || dirty {
            self.update_bars()?;

            for ix in 0..self.cs.monitors.len() {
                let (screen_rect, bar_rect, bar_win) = {
                    let m = self.cs.monitor(ix);
                    (m.screen, m.bar_rect(self.bar_h), m.bar_win)
                };
                let fullscreen: Vec<Xid> = self.cs.monitors[ix]
                    .clients
                    .iter()
                    .copied()
                    .filter(|id| self.cs.clients[id].fullscreen)
                    .collect();
                for id in fullscreen {
                    self.resize_client(id, screen_rect);
                }
                if let Some(bar) = bar_win {
                    let _ = self.x.move_resize(bar, bar_rect);
                }
            }

            self.focus(None);
            self.arrange(None);
        }

        Ok(())
    }

    fn configure_request(&mut self, ev: ConfigureRequestEvent) -> Result<()> {
        if !self.cs.contains(ev.id) {
            self.x.forward_configure_request(&ev)?;
            return self.x.sync();
        }

        let floating_layout = !self.cs.sel_monitor().arranges();
        let (mon, floating) = {
            let c = self.cs.client(ev.id).expect("contains checked");
            (c.mon, c.floating)
        };

        if let Some(bw) = ev.border_width {
            let c = self.cs.client_mut(ev.id).expect("contains checked");
            c.bw = bw;
        } else if floating || floating_layout {
            let m_screen = self.cs.monitors[mon].screen;
            {
                let c = self.cs.client_mut(ev.id).expect("contains checked");
                c.old_rect = c.rect;

                // requested positions are interpreted relative to the
                // owning monitor; an off-monitor result gets centered
                if let Some(x) = ev.x {
                    c.rect.x = m_screen.x + x;
                }
                if let Some(y) = ev.y {
                    c.rect.y = m_screen.y + y;
                }
                if let Some(w) = ev.w {
                    c.rect.w = w;
                }
                if let Some(h) = ev.h {
                    c.rect.h = h;
                }

                if c.rect.right() > m_screen.right() && c.floating {
                    c.rect.x = m_screen.x + (m_screen.w as i32 / 2 - c.total_w() as i32 / 2);
                }
                if c.rect.bottom() > m_screen.bottom() && c.floating {
                    c.rect.y = m_screen.y + (m_screen.h as i32 / 2 - c.total_h() as i32 / 2);
                }
            }

            let only_moved =
                (ev.x.is_some() || ev.y.is_some()) && ev.w.is_none() && ev.h.is_none();
            let (rect, bw) = {
                let c = self.cs.client(ev.id).expect("contains checked");
                (c.rect, c.bw)
            };
            if only_moved {
                self.x.send_configure_notify(ev.id, rect, bw)?;
            }
            if self.cs.is_visible(ev.id) {
                self.x.position_client(ev.id, rect, bw)?;
            }
        } else {
            // tiled clients are told their committed geometry, not what
            // they asked for
            let (rect, bw) = {
                let c = self.cs.client(ev.id).expect("contains checked");
                (c.rect, c.bw)
            };
            self.x.send_configure_notify(ev.id, rect, bw)?;
        }

        self.x.sync()
    }

    fn enter_notify(&mut self, ev: PointerChange) -> Result<()> {
        let is_root = ev.id == self.x.root();
        let mon = if is_root {
            self.cs.point_to_mon(ev.abs)
        } else {
            match self.cs.win_to_mon(ev.id) {
                Some(m) => m,
                None => return Ok(()),
            }
        };
        let is_client = self.cs.contains(ev.id);

        if mon != self.cs.sel_mon {
            self.unfocus(self.cs.selected(), true);
            self.cs.sel_mon = mon;
        } else if !is_client || Some(ev.id) == self.cs.selected() {
            return Ok(());
        }

        self.focus(is_client.then_some(ev.id));

        Ok(())
    }

    fn expose(&mut self, ev: ExposeEvent) -> Result<()> {
        if ev.count == 0 {
            if let Some(mon) = self.cs.win_to_mon(ev.id) {
                self.draw_bar(mon);
            }
        }

        Ok(())
    }

    /// Clients occasionally set input focus themselves; pull it back to the
    /// selection.
    fn focus_in(&mut self, id: Xid) -> Result<()> {
        if let Some(sel) = self.cs.selected() {
            if id != sel {
                self.set_focus(sel);
            }
        }

        Ok(())
    }

    fn mapping_notify(&mut self, keyboard: bool) -> Result<()> {
        if keyboard {
            self.grab_keys()?;
        }

        Ok(())
    }

    fn map_request(&mut self, id: Xid) -> Result<()> {
        let attrs = match self.x.get_window_attributes(id) {
            Ok(attrs) => attrs,
            Err(_) => return Ok(()), // window already gone
        };

        if !attrs.override_redirect && !self.cs.contains(id) {
            self.manage(id)?;
        }

        Ok(())
    }

    fn motion_notify(&mut self, ev: MotionEvent) -> Result<()> {
        if ev.id != self.x.root() {
            return Ok(());
        }

        let mon = self.cs.point_to_mon(ev.abs);
        if let Some(prev) = self.motion_mon {
            if mon != prev {
                self.unfocus(self.cs.selected(), true);
                self.cs.sel_mon = mon;
                self.focus(None);
            }
        }
        self.motion_mon = Some(mon);

        Ok(())
    }

    fn property_notify(&mut self, ev: PropertyEvent) -> Result<()> {
        if ev.is_root && ev.atom == Atom::WmName {
            self.update_status();
            return Ok(());
        }

        if ev.deleted || !self.cs.contains(ev.id) {
            return Ok(());
        }

        match ev.atom {
            Atom::WmTransientFor => {
                let floating = self.cs.client(ev.id).map(|c| c.floating).unwrap_or(true);
                if !floating {
                    let parent = self.x.transient_for(ev.id)?;
                    if parent.map(|p| self.cs.contains(p)).unwrap_or(false) {
                        if let Some(c) = self.cs.client_mut(ev.id) {
                            c.floating = true;
                        }
                        let mon = self.cs.client(ev.id).map(|c| c.mon);
                        self.arrange(mon);
                    }
                }
            }
            Atom::WmNormalHints => {
                if let Some(c) = self.cs.client_mut(ev.id) {
                    c.hints = None;
                }
            }
            Atom::WmHints => {
                self.update_wm_hints(ev.id);
                self.draw_bars();
            }
            Atom::WmName | Atom::NetWmName => {
                let name = self.x.window_title(ev.id).unwrap_or(None);
                let mon = {
                    let c = self.cs.client_mut(ev.id).expect("contains checked");
                    c.set_name(name);
                    c.mon
                };
                if self.cs.monitor(mon).sel == Some(ev.id) {
                    self.draw_bar(mon);
                }
            }
            Atom::NetWmWindowType => self.update_window_type(ev.id),
            _ => {}
        }

        Ok(())
    }

    fn unmap_notify(&mut self, id: Xid, synthetic: bool) -> Result<()> {
        if !self.cs.contains(id) {
            return Ok(());
        }

        if synthetic {
            // an ICCCM withdraw request rather than a real unmap
            self.x.set_wm_state(id, WmState::Withdrawn)
        } else {
            self.unmanage(id, false)
        }
    }

    // Client adoption and removal

    fn manage(&mut self, win: Xid) -> Result<()> {
        trace!(%win, "managing new client");
        let (geometry, old_bw) = self.x.client_geometry(win)?;
        let mut c = Client::new(win, geometry, old_bw, self.cs.sel_mon);

        c.set_name(self.x.window_title(win).unwrap_or(None));

        // transients inherit their parent's monitor and tags instead of
        // going through the rules
        let parent = self
            .x
            .transient_for(win)
            .unwrap_or(None)
            .and_then(|t| self.cs.client(t).map(|p| (p.mon, p.tags)));
        let is_transient = parent.is_some();
        match parent {
            Some((mon, tags)) => {
                c.mon = mon;
                c.tags = tags;
            }
            None => self.apply_rules(&mut c),
        }

        // keep the new window inside its monitor's work area
        let work = self.cs.monitor(c.mon).work;
        if c.rect.x + c.total_w() as i32 > work.right() {
            c.rect.x = work.right() - c.total_w() as i32;
        }
        if c.rect.y + c.total_h() as i32 > work.bottom() {
            c.rect.y = work.bottom() - c.total_h() as i32;
        }
        c.rect.x = c.rect.x.max(work.x);
        c.rect.y = c.rect.y.max(work.y);
        c.bw = self.config.border_width;

        self.x.set_border_width(win, c.bw)?;
        self.x.set_border_color(win, self.config.normal.border)?;
        self.x.send_configure_notify(win, c.rect, c.bw)?;

        let dialog = self.x.atom_prop(win, Atom::NetWmWindowType)?
            == Some(self.x.known_atom(Atom::NetWindowTypeDialog));
        let wants_fullscreen = self.x.atom_prop(win, Atom::NetWmState)?
            == Some(self.x.known_atom(Atom::NetWmStateFullscreen));

        let hints = self.x.size_hints(win).unwrap_or(None).unwrap_or_default();
        c.fixed = hints.is_fixed();
        c.hints = Some(hints);

        if let Ok(Some(h)) = self.x.hints(win) {
            c.urgent = h.urgent;
            c.never_focus = !h.input.unwrap_or(true);
        }

        self.x.select_client_events(win)?;
        self.grab_buttons(win, false)?;

        if dialog {
            c.floating = true;
        }
        if !c.floating {
            c.floating = is_transient || c.fixed;
            c.old_floating = c.floating;
        }
        if c.floating {
            self.x.raise_window(win)?;
        }

        let mon = c.mon;
        self.cs.insert(c);
        self.x.append_client_list(win)?;

        // move way off screen before mapping: some clients need to see a
        // real position change before their first draw
        let parked = {
            let c = self.cs.client(win).expect("just inserted");
            Point::new(c.rect.x + 2 * self.screen.w as i32, c.rect.y)
        };
        self.x.move_client(win, parked)?;
        self.x.set_wm_state(win, WmState::Normal)?;

        if wants_fullscreen {
            self.set_fullscreen(win, true);
        }

        if mon == self.cs.sel_mon {
            self.unfocus(self.cs.selected(), false);
        }
        self.cs.monitor_mut(mon).sel = Some(win);

        self.arrange(Some(mon));
        self.x.map_window(win)?;
        self.focus(None);

        debug!(%win, mon, "managed new client");

        Ok(())
    }

    fn unmanage(&mut self, win: Xid, destroyed: bool) -> Result<()> {
        let c = match self.cs.remove(win) {
            Some(c) => c,
            None => return Ok(()),
        };
        trace!(%win, destroyed, "unmanaging client");

        if !destroyed {
            // the window may disappear under us at any point here; errors
            // are expected and dropped
            let _ = self.x.ungrab_buttons(win);
            let _ = self.x.set_border_width(win, c.old_bw);
            let _ = self.x.set_wm_state(win, WmState::Withdrawn);
            let _ = self.x.sync();
        }

        self.update_client_list();
        self.focus(None);
        self.arrange(None);

        Ok(())
    }

    fn apply_rules(&mut self, c: &mut Client) {
        c.floating = false;
        c.tags = 0;

        let (instance, class) = self
            .x
            .wm_class(c.win)
            .unwrap_or(None)
            .unwrap_or_else(|| ("broken".to_string(), "broken".to_string()));

        for r in self.config.rules.iter() {
            let title_ok = r.title.map_or(true, |t| c.name.contains(t));
            let class_ok = r.class.map_or(true, |cl| class.contains(cl));
            let instance_ok = r.instance.map_or(true, |i| instance.contains(i));

            if title_ok && class_ok && instance_ok {
                c.floating = r.floating;
                c.tags |= r.tags;
                if let Some(mon) = r.monitor {
                    if mon < self.cs.monitors.len() {
                        c.mon = mon;
                    }
                }
            }
        }

        let masked = c.tags & self.config.tag_mask();
        c.tags = if masked != 0 {
            masked
        } else {
            self.cs.monitor(c.mon).active_tagset()
        };
    }

    fn update_client_list(&mut self) {
        let ids: Vec<Xid> = self
            .cs
            .monitors
            .iter()
            .flat_map(|m| m.clients.iter().copied())
            .collect();
        let _ = self.x.set_client_list(&ids);
    }

    // Focus handling

    /// Focus `target`, or fall back to the most recently focused visible
    /// client on the selected monitor.
    fn focus(&mut self, target: Option<Xid>) {
        let target = target
            .filter(|&id| self.cs.is_visible(id))
            .or_else(|| self.cs.focus_target(self.cs.sel_mon));

        let prev = self.cs.selected();
        if prev.is_some() && prev != target {
            self.unfocus(prev, false);
        }

        match target {
            Some(id) => {
                let urgent = self.cs.client(id).map(|c| c.urgent).unwrap_or(false);
                if urgent {
                    self.set_urgent(id, false);
                }
                self.cs.focus_client(id);
                let _ = self.grab_buttons(id, true);
                let _ = self.x.set_border_color(id, self.config.selected.border);
                self.set_focus(id);
            }
            None => {
                let _ = self.x.focus_root();
                let _ = self.x.set_active_window(None);
                self.cs.sel_monitor_mut().sel = None;
            }
        }

        self.draw_bars();
    }

    fn unfocus(&mut self, id: Option<Xid>, revert_focus: bool) {
        let id = match id {
            Some(id) if self.cs.contains(id) => id,
            _ => return,
        };

        let _ = self.grab_buttons(id, false);
        let _ = self.x.set_border_color(id, self.config.normal.border);
        if revert_focus {
            let _ = self.x.focus_root();
            let _ = self.x.set_active_window(None);
        }
    }

    /// The ICCCM input-model aware half of focusing: only clients that did
    /// not clear the input hint get real X focus, everyone is offered
    /// WM_TAKE_FOCUS.
    fn set_focus(&mut self, id: Xid) {
        let never_focus = self
            .cs
            .client(id)
            .map(|c| c.never_focus)
            .unwrap_or(false);

        if !never_focus {
            let _ = self.x.set_input_focus(id);
            let _ = self.x.set_active_window(Some(id));
        }
        let _ = self.x.send_protocol(id, Atom::WmTakeFocus);
    }

    fn set_urgent(&mut self, id: Xid, urgent: bool) {
        if let Some(c) = self.cs.client_mut(id) {
            c.urgent = urgent;
        }
        let _ = self.x.set_urgency(id, urgent);
    }

    // Geometry and arrangement

    /// Clamp and commit a proposed rectangle for `id`, returning whatever
    /// geometry the client ends up with.
    fn resize(&mut self, id: Xid, proposed: Rect, interact: bool) -> Rect {
        let (use_hints, needs_refresh, current) = match self.cs.client(id) {
            Some(c) => {
                let floating_layout = !self.cs.monitor(c.mon).arranges();
                let uh = self.config.resize_hints || c.floating || floating_layout;
                (uh, c.hints.is_none(), c.rect)
            }
            None => return proposed,
        };

        if needs_refresh {
            // hints were invalidated by a PropertyNotify; refetch lazily
            let hints = self.x.size_hints(id).unwrap_or(None).unwrap_or_default();
            if let Some(c) = self.cs.client_mut(id) {
                c.fixed = hints.is_fixed();
                c.hints = Some(hints);
            }
        }

        let change = {
            let c = self.cs.client(id).expect("checked above");
            let work = self.cs.monitor(c.mon).work;
            c.apply_size_hints(proposed, self.screen, work, self.bar_h, use_hints, interact)
        };

        match change {
            Some(r) => {
                self.resize_client(id, r);
                r
            }
            None => current,
        }
    }

    /// Commit a geometry to both our state and the server, remembering the
    /// previous rectangle for fullscreen restores.
    fn resize_client(&mut self, id: Xid, r: Rect) {
        let bw = match self.cs.client_mut(id) {
            Some(c) => {
                c.old_rect = c.rect;
                c.rect = r;
                c.bw
            }
            None => return,
        };

        let _ = self.x.position_client(id, r, bw);
        let _ = self.x.send_configure_notify(id, r, bw);
        let _ = self.x.sync();
    }

    /// Re-layout one monitor (or all of them), then restack.
    fn arrange(&mut self, mon: Option<usize>) {
        let targets: Vec<usize> = match mon {
            Some(ix) => vec![ix],
            None => (0..self.cs.monitors.len()).collect(),
        };

        for &ix in &targets {
            self.show_hide(ix);
        }
        for &ix in &targets {
            self.arrange_monitor(ix);
            self.restack(ix);
        }
    }

    /// Move visible clients into place (top of the focus stack first) and
    /// park hidden ones off screen (bottom up).
    fn show_hide(&mut self, mon: usize) {
        let stack = self.cs.monitors[mon].stack.clone();

        for &id in &stack {
            if !self.cs.is_visible(id) {
                continue;
            }
            let (pos, rect, needs_float_resize) = {
                let c = &self.cs.clients[&id];
                let floating_layout = !self.cs.monitor(mon).arranges();
                (
                    Point::new(c.rect.x, c.rect.y),
                    c.rect,
                    (floating_layout || c.floating) && !c.fullscreen,
                )
            };
            let _ = self.x.move_client(id, pos);
            if needs_float_resize {
                self.resize(id, rect, false);
            }
        }

        for &id in stack.iter().rev() {
            if self.cs.is_visible(id) {
                continue;
            }
            let c = &self.cs.clients[&id];
            let parked = Point::new(-2 * c.total_w() as i32, c.rect.y);
            let _ = self.x.move_client(id, parked);
        }
    }

    fn arrange_monitor(&mut self, mon: usize) {
        let layout = self.cs.monitor(mon).layout();
        self.cs.monitor_mut(mon).lt_symbol = layout.symbol.to_string();

        let tiled = self.cs.tiled_clients(mon);
        let (work, mfact, nmaster) = {
            let m = self.cs.monitor(mon);
            (m.work, m.mfact, m.nmaster)
        };

        match layout.kind {
            LayoutKind::Tile => {
                layout::tile(work, mfact, nmaster, &tiled, |id, r| {
                    self.resize(id, r, false)
                });
            }
            LayoutKind::Monocle => {
                let n = self.cs.visible_clients(mon).len();
                if n > 0 {
                    self.cs.monitor_mut(mon).lt_symbol = format!("[{n}]");
                }
                layout::monocle(work, &tiled, |id, r| self.resize(id, r, false));
            }
            LayoutKind::Float => {}
        }
    }

    /// Reapply stacking: the selected floating client on top, tiled clients
    /// below the bar in focus-stack order.
    fn restack(&mut self, mon: usize) {
        self.draw_bar(mon);

        let (sel, arranges, bar_win) = {
            let m = self.cs.monitor(mon);
            (m.sel, m.arranges(), m.bar_win)
        };
        let sel = match sel {
            Some(sel) => sel,
            None => return,
        };

        let sel_floating = self
            .cs
            .client(sel)
            .map(|c| c.floating)
            .unwrap_or(false);
        if sel_floating || !arranges {
            let _ = self.x.raise_window(sel);
        }

        if arranges {
            if let Some(bar) = bar_win {
                let mut sibling = bar;
                let stack = self.cs.monitors[mon].stack.clone();
                for id in stack {
                    let tiled_visible = self
                        .cs
                        .client(id)
                        .map(|c| !c.floating && self.cs.is_visible(id))
                        .unwrap_or(false);
                    if tiled_visible {
                        let _ = self.x.stack_below(id, sibling);
                        sibling = id;
                    }
                }
            }
        }

        let _ = self.x.sync();
        // the rearrangement must not refocus whatever ends up under the
        // pointer
        let _ = self.x.drain_enter_events();
    }

    // Fullscreen

    fn set_fullscreen(&mut self, id: Xid, fullscreen: bool) {
        let current = match self.cs.client(id) {
            Some(c) => c.fullscreen,
            None => return,
        };

        if fullscreen && !current {
            let _ = self.x.set_fullscreen_prop(id, true);
            let mon = {
                let c = self.cs.client_mut(id).expect("checked above");
                c.fullscreen = true;
                c.old_floating = c.floating;
                c.old_bw = c.bw;
                c.bw = 0;
                c.floating = true;
                c.mon
            };
            let mon_screen = self.cs.monitors[mon].screen;
            self.resize_client(id, mon_screen);
            let _ = self.x.raise_window(id);
        } else if !fullscreen && current {
            let _ = self.x.set_fullscreen_prop(id, false);
            let (restored, mon) = {
                let c = self.cs.client_mut(id).expect("checked above");
                c.fullscreen = false;
                c.floating = c.old_floating;
                c.bw = c.old_bw;
                (c.old_rect, c.mon)
            };
            self.resize_client(id, restored);
            self.arrange(Some(mon));
        }
    }

    // Window property refresh

    fn update_window_type(&mut self, id: Xid) {
        let state = self.x.atom_prop(id, Atom::NetWmState).unwrap_or(None);
        let wtype = self.x.atom_prop(id, Atom::NetWmWindowType).unwrap_or(None);

        if state == Some(self.x.known_atom(Atom::NetWmStateFullscreen)) {
            self.set_fullscreen(id, true);
        }
        if wtype == Some(self.x.known_atom(Atom::NetWindowTypeDialog)) {
            if let Some(c) = self.cs.client_mut(id) {
                c.floating = true;
            }
        }
    }

    fn update_wm_hints(&mut self, id: Xid) {
        let hints = match self.x.hints(id) {
            Ok(Some(h)) => h,
            _ => return,
        };

        if Some(id) == self.cs.selected() && hints.urgent {
            // the selected client has our attention already
            let _ = self.x.set_urgency(id, false);
        } else if let Some(c) = self.cs.client_mut(id) {
            c.urgent = hints.urgent;
        }

        if let Some(c) = self.cs.client_mut(id) {
            c.never_focus = !hints.input.unwrap_or(true);
        }
    }

    fn update_status(&mut self) {
        let mut status = self
            .x
            .root_name()
            .unwrap_or(None)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(default_status);

        if status.len() > STATUS_MAX {
            let mut end = STATUS_MAX;
            while !status.is_char_boundary(end) {
                end -= 1;
            }
            status.truncate(end);
        }

        self.status = status;
        self.draw_bar(self.cs.sel_mon);
    }

    // Geometry reconciliation

    fn update_geometry(&mut self) -> bool {
        let details = match self.x.screen_details() {
            Ok(d) if !d.is_empty() => d,
            _ => vec![self.screen],
        };

        let dirty = self
            .cs
            .update_monitors(&details, self.bar_h, &self.config);
        if dirty {
            if let Ok(p) = self.x.cursor_position() {
                self.cs.sel_mon = self.cs.point_to_mon(p);
            }
        }

        dirty
    }

    fn update_bars(&mut self) -> Result<()> {
        for ix in 0..self.cs.monitors.len() {
            if self.cs.monitors[ix].bar_win.is_some() {
                continue;
            }
            let r = self.cs.monitors[ix].bar_rect(self.bar_h);
            let bar = self.x.create_bar_win(r)?;
            self.cs.monitors[ix].bar_win = Some(bar);
        }

        Ok(())
    }

    // Bar rendering

    fn draw_bars(&mut self) {
        for ix in 0..self.cs.monitors.len() {
            self.draw_bar(ix);
        }
    }

    fn draw_bar(&mut self, mon: usize) {
        let m = &self.cs.monitors[mon];
        let bar_win = match m.bar_win {
            Some(bar) => bar,
            None => return,
        };

        let (mut occupied, mut urgent) = (0u32, 0u32);
        for id in &m.clients {
            let c = &self.cs.clients[id];
            occupied |= c.tags;
            if c.urgent {
                urgent |= c.tags;
            }
        }

        let sel = m.sel.and_then(|id| self.cs.clients.get(&id)).map(|c| SelInfo {
            name: c.name(),
            floating: c.floating,
            fixed: c.fixed,
            tags: c.tags,
        });

        let content = BarContent {
            bar_win,
            width: m.work.w,
            tags: &self.config.tags,
            active_tagset: m.active_tagset(),
            occupied,
            urgent,
            lt_symbol: &m.lt_symbol,
            is_selmon: mon == self.cs.sel_mon,
            sel,
            status: &self.status,
        };

        if let Err(error) =
            bar::draw_bar(&mut self.x, &content, &self.config.normal, &self.config.selected)
        {
            error!(%error, mon, "unable to draw bar");
        }
    }

    // Grabs

    fn grab_keys(&mut self) -> Result<()> {
        self.numlock = self.x.numlock_mask()?;
        self.x.grab_keys(&self.config.keys, self.numlock)
    }

    fn grab_buttons(&mut self, id: Xid, focused: bool) -> Result<()> {
        self.numlock = self.x.numlock_mask()?;
        self.x
            .grab_buttons(id, focused, &self.config.buttons, self.numlock)
    }

    // Commands

    /// Run one user command with its argument. This is the single entry
    /// point for key bindings, button bindings and embedding code.
    pub fn run_command(&mut self, cmd: Command, arg: Arg) -> Result<()> {
        trace!(?cmd, ?arg, "running command");

        match (cmd, arg) {
            (Command::View, Arg::UInt(mask)) => self.view(mask),
            (Command::ToggleView, Arg::UInt(mask)) => self.toggle_view(mask),
            (Command::Tag, Arg::UInt(mask)) => self.tag(mask),
            (Command::ToggleTag, Arg::UInt(mask)) => self.toggle_tag(mask),
            (Command::FocusStack, Arg::Int(dir)) => self.focus_stack(dir),
            (Command::IncNMaster, Arg::Int(delta)) => self.inc_nmaster(delta),
            (Command::SetMFact, Arg::Float(f)) => self.set_mfact(f),
            (Command::Zoom, _) => self.zoom(),
            (Command::SetLayout, Arg::Layout(ix)) => self.set_layout(ix),
            (Command::SetLayout, Arg::None) => self.set_layout(None),
            (Command::ToggleBar, _) => self.toggle_bar(),
            (Command::ToggleFloating, _) => self.toggle_floating(),
            (Command::MoveMouse, _) => self.move_mouse(),
            (Command::ResizeMouse, _) => self.resize_mouse(),
            (Command::FocusMon, Arg::Int(dir)) => self.focus_mon(dir),
            (Command::TagMon, Arg::Int(dir)) => self.tag_mon(dir),
            (Command::KillClient, _) => self.kill_client(),
            (Command::Quit, _) => {
                self.running = false;
                Ok(())
            }
            (Command::Spawn, Arg::Argv(argv)) => util::spawn(argv),
            (cmd, arg) => {
                error!(?cmd, ?arg, "command invoked with an unusable argument");
                Ok(())
            }
        }
    }

    fn view(&mut self, mask: u32) -> Result<()> {
        let mask = mask & self.config.tag_mask();
        if self.cs.sel_monitor_mut().view(mask) {
            self.focus(None);
            self.arrange(Some(self.cs.sel_mon));
        }

        Ok(())
    }

    fn toggle_view(&mut self, mask: u32) -> Result<()> {
        let mask = mask & self.config.tag_mask();
        if self.cs.sel_monitor_mut().toggle_view(mask) {
            self.focus(None);
            self.arrange(Some(self.cs.sel_mon));
        }

        Ok(())
    }

    fn tag(&mut self, mask: u32) -> Result<()> {
        let mask = mask & self.config.tag_mask();
        let sel = self.cs.selected();

        if let (Some(id), true) = (sel, mask != 0) {
            if let Some(c) = self.cs.client_mut(id) {
                c.tags = mask;
            }
            self.focus(None);
            self.arrange(Some(self.cs.sel_mon));
        }

        Ok(())
    }

    fn toggle_tag(&mut self, mask: u32) -> Result<()> {
        let sel = match self.cs.selected() {
            Some(id) => id,
            None => return Ok(()),
        };
        let mask = mask & self.config.tag_mask();
        let toggled = self.cs.client(sel).map(|c| c.tags ^ mask).unwrap_or(0);

        if toggled != 0 {
            if let Some(c) = self.cs.client_mut(sel) {
                c.tags = toggled;
            }
            self.focus(None);
            self.arrange(Some(self.cs.sel_mon));
        }

        Ok(())
    }

    fn focus_stack(&mut self, dir: i32) -> Result<()> {
        let sel = match self.cs.selected_client() {
            Some(c) => c,
            None => return Ok(()),
        };
        if sel.fullscreen && self.config.lock_fullscreen {
            return Ok(());
        }

        if let Some(target) = self.cs.cycle_target(dir) {
            self.focus(Some(target));
            self.restack(self.cs.sel_mon);
        }

        Ok(())
    }

    fn inc_nmaster(&mut self, delta: i32) -> Result<()> {
        let m = self.cs.sel_monitor_mut();
        m.nmaster = (m.nmaster as i32 + delta).max(0) as u32;
        self.arrange(Some(self.cs.sel_mon));

        Ok(())
    }

    fn set_mfact(&mut self, f: f32) -> Result<()> {
        if !self.cs.sel_monitor().arranges() {
            return Ok(());
        }

        // values above 1 are absolute (offset by 1), below 1 relative
        let m = self.cs.sel_monitor_mut();
        let new = if f < 1.0 { f + m.mfact } else { f - 1.0 };
        if !(0.05..=0.95).contains(&new) {
            return Ok(());
        }

        m.mfact = new;
        self.arrange(Some(self.cs.sel_mon));

        Ok(())
    }

    fn zoom(&mut self) -> Result<()> {
        let sel = match self.cs.selected_client() {
            Some(c) if !c.floating && self.cs.sel_monitor().arranges() => c.win,
            _ => return Ok(()),
        };

        let tiled = self.cs.tiled_clients(self.cs.sel_mon);
        let target = match tiled.first() {
            // zooming the master swaps the next client into its place
            Some(&(head, _)) if head == sel => match tiled.get(1) {
                Some(&(next, _)) => next,
                None => return Ok(()),
            },
            _ => sel,
        };

        let mon = self.cs.clients[&target].mon;
        self.cs.pop(target);
        self.focus(Some(target));
        self.arrange(Some(mon));

        Ok(())
    }

    fn set_layout(&mut self, ix: Option<usize>) -> Result<()> {
        let layout = match ix {
            Some(ix) => match self.config.layouts.get(ix) {
                Some(&l) => Some(l),
                None => return Ok(()),
            },
            None => None,
        };

        {
            let m = self.cs.sel_monitor_mut();
            match layout {
                Some(l) => {
                    if l != m.layout() {
                        m.sel_lt ^= 1;
                    }
                    m.lt[m.sel_lt] = l;
                }
                None => m.sel_lt ^= 1,
            }
            m.lt_symbol = m.layout().symbol.to_string();
        }

        if self.cs.selected().is_some() {
            self.arrange(Some(self.cs.sel_mon));
        } else {
            self.draw_bar(self.cs.sel_mon);
        }

        Ok(())
    }

    fn toggle_bar(&mut self) -> Result<()> {
        let (bar_win, bar_rect) = {
            let m = self.cs.sel_monitor_mut();
            m.show_bar = !m.show_bar;
            m.update_bar_pos(self.bar_h);
            (m.bar_win, m.bar_rect(self.bar_h))
        };

        if let Some(bar) = bar_win {
            let _ = self.x.move_resize(bar, bar_rect);
        }
        self.arrange(Some(self.cs.sel_mon));

        Ok(())
    }

    fn toggle_floating(&mut self) -> Result<()> {
        let sel = match self.cs.selected() {
            Some(id) => id,
            None => return Ok(()),
        };
        if self.cs.clients[&sel].fullscreen {
            return Ok(());
        }

        let (floating, rect) = {
            let c = self.cs.client_mut(sel).expect("selected is managed");
            c.floating = !c.floating || c.fixed;
            (c.floating, c.rect)
        };

        if floating {
            self.resize(sel, rect, false);
        }
        self.arrange(Some(self.cs.sel_mon));

        Ok(())
    }

    fn focus_mon(&mut self, dir: i32) -> Result<()> {
        if self.cs.monitors.len() < 2 {
            return Ok(());
        }

        let target = self.cs.dir_to_mon(dir);
        if target == self.cs.sel_mon {
            return Ok(());
        }

        self.unfocus(self.cs.selected(), false);
        self.cs.sel_mon = target;
        self.focus(None);

        Ok(())
    }

    fn tag_mon(&mut self, dir: i32) -> Result<()> {
        let sel = match self.cs.selected() {
            Some(id) => id,
            None => return Ok(()),
        };
        if self.cs.monitors.len() < 2 {
            return Ok(());
        }

        self.send_mon(sel, self.cs.dir_to_mon(dir));

        Ok(())
    }

    fn send_mon(&mut self, id: Xid, target: usize) {
        if self.cs.clients.get(&id).map(|c| c.mon) == Some(target) {
            return;
        }

        self.unfocus(Some(id), true);
        self.cs.send_to_monitor(id, target);
        self.focus(None);
        self.arrange(None);
    }

    fn kill_client(&mut self) -> Result<()> {
        let sel = match self.cs.selected() {
            Some(id) => id,
            None => return Ok(()),
        };

        if !self.x.send_protocol(sel, Atom::WmDeleteWindow)? {
            self.x.kill_client(sel)?;
        }

        Ok(())
    }

    // Interactive gestures

    /// Modal pointer-move loop. Pumps only a small whitelist of events until
    /// the button is released; everything else that arrives mid-gesture is
    /// dropped.
    fn move_mouse(&mut self) -> Result<()> {
        let sel = match self.cs.selected() {
            Some(id) => id,
            None => return Ok(()),
        };
        if self.cs.clients[&sel].fullscreen {
            return Ok(()); // no moving fullscreen windows around
        }

        self.restack(self.cs.sel_mon);
        let origin = self.cs.clients[&sel].rect;
        if !self.x.grab_pointer(CursorKind::Move)? {
            return Ok(());
        }
        let start = match self.x.cursor_position() {
            Ok(p) => p,
            Err(_) => {
                let _ = self.x.ungrab_pointer();
                return Ok(());
            }
        };

        let snap = self.config.snap as i32;
        let mut last_motion = 0u32;

        loop {
            let ev = self.x.next_event()?;
            match ev {
                XEvent::ConfigureRequest(_) | XEvent::Expose(_) | XEvent::MapRequest(_) => {
                    self.handle_xevent(ev)?;
                }
                XEvent::Motion(m) => {
                    if m.time.wrapping_sub(last_motion) <= MOTION_INTERVAL_MS {
                        continue;
                    }
                    last_motion = m.time;

                    let (total_w, total_h, rect, floating) = {
                        let c = &self.cs.clients[&sel];
                        (c.total_w() as i32, c.total_h() as i32, c.rect, c.floating)
                    };
                    let work = self.cs.sel_monitor().work;

                    let mut nx = origin.x + (m.abs.x - start.x);
                    let mut ny = origin.y + (m.abs.y - start.y);
                    if (work.x - nx).abs() < snap {
                        nx = work.x;
                    } else if ((work.right()) - (nx + total_w)).abs() < snap {
                        nx = work.right() - total_w;
                    }
                    if (work.y - ny).abs() < snap {
                        ny = work.y;
                    } else if ((work.bottom()) - (ny + total_h)).abs() < snap {
                        ny = work.bottom() - total_h;
                    }

                    let arranges = self.cs.sel_monitor().arranges();
                    if !floating
                        && arranges
                        && ((nx - rect.x).abs() > snap || (ny - rect.y).abs() > snap)
                    {
                        self.toggle_floating()?;
                    }

                    let floating = self.cs.clients[&sel].floating;
                    if !self.cs.sel_monitor().arranges() || floating {
                        self.resize(sel, Rect::new(nx, ny, rect.w, rect.h), true);
                    }
                }
                XEvent::ButtonRelease(_) => break,
                _ => {} // not part of the gesture whitelist
            }
        }

        let _ = self.x.ungrab_pointer();
        self.finish_gesture(sel);

        Ok(())
    }

    /// Modal pointer-resize loop; same event whitelist as [move_mouse].
    fn resize_mouse(&mut self) -> Result<()> {
        let sel = match self.cs.selected() {
            Some(id) => id,
            None => return Ok(()),
        };
        if self.cs.clients[&sel].fullscreen {
            return Ok(());
        }

        self.restack(self.cs.sel_mon);
        let origin = self.cs.clients[&sel].rect;
        if !self.x.grab_pointer(CursorKind::Resize)? {
            return Ok(());
        }

        let warp_to_corner = |wm: &Self| {
            let c = &wm.cs.clients[&sel];
            let _ = wm.x.warp_pointer(
                sel,
                (c.rect.w + c.bw - 1) as i16,
                (c.rect.h + c.bw - 1) as i16,
            );
        };
        warp_to_corner(self);

        let snap = self.config.snap as i32;
        let mut last_motion = 0u32;

        loop {
            let ev = self.x.next_event()?;
            match ev {
                XEvent::ConfigureRequest(_) | XEvent::Expose(_) | XEvent::MapRequest(_) => {
                    self.handle_xevent(ev)?;
                }
                XEvent::Motion(m) => {
                    if m.time.wrapping_sub(last_motion) <= MOTION_INTERVAL_MS {
                        continue;
                    }
                    last_motion = m.time;

                    let (bw, rect, floating) = {
                        let c = &self.cs.clients[&sel];
                        (c.bw as i32, c.rect, c.floating)
                    };
                    let work = self.cs.sel_monitor().work;

                    let nw = (m.abs.x - origin.x - 2 * bw + 1).max(1) as u32;
                    let nh = (m.abs.y - origin.y - 2 * bw + 1).max(1) as u32;

                    let corner_in_work = work.contains_point(Point::new(
                        origin.x + nw as i32,
                        origin.y + nh as i32,
                    ));
                    let arranges = self.cs.sel_monitor().arranges();
                    if corner_in_work
                        && !floating
                        && arranges
                        && ((nw as i32 - rect.w as i32).abs() > snap
                            || (nh as i32 - rect.h as i32).abs() > snap)
                    {
                        self.toggle_floating()?;
                    }

                    let floating = self.cs.clients[&sel].floating;
                    if !self.cs.sel_monitor().arranges() || floating {
                        self.resize(sel, Rect::new(rect.x, rect.y, nw, nh), true);
                    }
                }
                XEvent::ButtonRelease(_) => break,
                _ => {}
            }
        }

        warp_to_corner(self);
        let _ = self.x.ungrab_pointer();
        let _ = self.x.drain_enter_events();
        self.finish_gesture(sel);

        Ok(())
    }

    /// After a gesture: if the client now sits on a different monitor, it
    /// migrates there and focus follows.
    fn finish_gesture(&mut self, id: Xid) {
        let rect = match self.cs.client(id) {
            Some(c) => c.rect,
            None => return,
        };

        let target = self.cs.rect_to_mon(rect);
        if target != self.cs.sel_mon {
            self.send_mon(id, target);
            self.cs.sel_mon = target;
            self.focus(None);
        }
    }
}

fn default_status() -> String {
    format!("{WM_NAME}-{}", env!("CARGO_PKG_VERSION"))
}
