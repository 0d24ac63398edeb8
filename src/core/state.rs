//! The client registry: an arena of managed clients plus the per-monitor
//! tile and focus orderings over it.
//!
//! Everything in here is pure bookkeeping. The [manager][crate::manager]
//! mirrors these mutations out to the X server; tests drive the registry
//! directly.
use crate::{
    config::Config,
    core::{client::Client, monitor::Monitor},
    pure::geometry::{Point, Rect},
    Xid,
};
use std::collections::HashMap;
use tracing::debug;

/// All managed clients and monitors, and the current selection.
///
/// Invariants maintained between operations:
///   * every managed id is in exactly one monitor's `clients` and the same
///     monitor's `stack`, once in each
///   * a client's `mon` index names the monitor whose lists contain it
///   * each monitor's `sel` is `None` or a client on that monitor
#[derive(Debug, Default, Clone)]
pub struct ClientSet {
    pub(crate) clients: HashMap<Xid, Client>,
    pub(crate) monitors: Vec<Monitor>,
    pub(crate) sel_mon: usize,
}

impl ClientSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Look up a managed client by window id.
    pub fn client(&self, win: Xid) -> Option<&Client> {
        self.clients.get(&win)
    }

    pub(crate) fn client_mut(&mut self, win: Xid) -> Option<&mut Client> {
        self.clients.get_mut(&win)
    }

    /// Whether `win` is a managed client.
    pub fn contains(&self, win: Xid) -> bool {
        self.clients.contains_key(&win)
    }

    /// The number of managed clients across all monitors.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// True when no clients are managed.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub(crate) fn monitor(&self, ix: usize) -> &Monitor {
        &self.monitors[ix]
    }

    pub(crate) fn monitor_mut(&mut self, ix: usize) -> &mut Monitor {
        &mut self.monitors[ix]
    }

    /// All monitors in index order.
    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    /// The index of the currently selected monitor.
    pub fn sel_monitor_index(&self) -> usize {
        self.sel_mon
    }

    /// The currently selected monitor.
    pub fn sel_monitor(&self) -> &Monitor {
        &self.monitors[self.sel_mon]
    }

    pub(crate) fn sel_monitor_mut(&mut self) -> &mut Monitor {
        &mut self.monitors[self.sel_mon]
    }

    /// The selected client on the selected monitor, if any.
    pub fn selected(&self) -> Option<Xid> {
        self.sel_monitor().sel
    }

    pub(crate) fn selected_client(&self) -> Option<&Client> {
        self.selected().and_then(|id| self.client(id))
    }

    /// Whether `win` is visible on its owning monitor's active tagset.
    pub fn is_visible(&self, win: Xid) -> bool {
        match self.client(win) {
            Some(c) => c.is_visible_on(self.monitors[c.mon].active_tagset()),
            None => false,
        }
    }

    // Attach / detach for the two orderings. New clients go to the head of
    // both: first in tile order and most recently focused.

    pub(crate) fn attach(&mut self, win: Xid) {
        let mon = self.clients[&win].mon;
        self.monitors[mon].clients.insert(0, win);
    }

    pub(crate) fn detach(&mut self, win: Xid) {
        let mon = self.clients[&win].mon;
        self.monitors[mon].clients.retain(|&id| id != win);
    }

    pub(crate) fn attach_stack(&mut self, win: Xid) {
        let mon = self.clients[&win].mon;
        self.monitors[mon].stack.insert(0, win);
    }

    pub(crate) fn detach_stack(&mut self, win: Xid) {
        let mon = self.clients[&win].mon;
        self.monitors[mon].stack.retain(|&id| id != win);

        if self.monitors[mon].sel == Some(win) {
            self.monitors[mon].sel = self.focus_target(mon);
        }
    }

    /// Insert a newly managed client at the head of both orderings.
    pub(crate) fn insert(&mut self, client: Client) {
        let win = client.win;
        self.clients.insert(win, client);
        self.attach(win);
        self.attach_stack(win);
    }

    /// Remove a client from the registry entirely.
    pub(crate) fn remove(&mut self, win: Xid) -> Option<Client> {
        if !self.contains(win) {
            return None;
        }

        self.detach(win);
        self.detach_stack(win);
        self.clients.remove(&win)
    }

    /// The most recently focused visible client on `mon`: what focus falls
    /// back to whenever no explicit target is given.
    pub(crate) fn focus_target(&self, mon: usize) -> Option<Xid> {
        self.monitors[mon]
            .stack
            .iter()
            .copied()
            .find(|&id| self.is_visible(id))
    }

    /// Record `win` as focused: select its monitor, move it to the head of
    /// the focus stack and mark it selected there.
    pub(crate) fn focus_client(&mut self, win: Xid) {
        let mon = match self.client(win) {
            Some(c) => c.mon,
            None => return,
        };

        self.sel_mon = mon;
        self.detach_stack(win);
        self.attach_stack(win);
        self.monitors[mon].sel = Some(win);
    }

    /// Move `win` to the head of the tile order (the master slot).
    pub(crate) fn pop(&mut self, win: Xid) {
        self.detach(win);
        self.attach(win);
    }

    /// Visible clients of `mon` in tile order.
    pub(crate) fn visible_clients(&self, mon: usize) -> Vec<Xid> {
        self.monitors[mon]
            .clients
            .iter()
            .copied()
            .filter(|&id| self.is_visible(id))
            .collect()
    }

    /// Visible, non-floating clients of `mon` in tile order, with their
    /// border widths: the input to the layout engine.
    pub(crate) fn tiled_clients(&self, mon: usize) -> Vec<(Xid, u32)> {
        self.monitors[mon]
            .clients
            .iter()
            .filter_map(|&id| {
                let c = &self.clients[&id];
                (c.is_tiled() && self.is_visible(id)).then_some((id, c.bw))
            })
            .collect()
    }

    /// The next (dir > 0) or previous (dir < 0) visible client relative to
    /// the current selection on the selected monitor, cycling.
    pub(crate) fn cycle_target(&self, dir: i32) -> Option<Xid> {
        let m = self.sel_monitor();
        let sel = m.sel?;
        let visible: Vec<Xid> = self.visible_clients(self.sel_mon);
        let pos = visible.iter().position(|&id| id == sel)?;

        match visible.len() {
            0 | 1 => None,
            n if dir > 0 => Some(visible[(pos + 1) % n]),
            n => Some(visible[(pos + n - 1) % n]),
        }
    }

    /// The monitor index `dir` steps away from the selected one, cycling.
    pub(crate) fn dir_to_mon(&self, dir: i32) -> usize {
        let n = self.monitors.len();

        if dir > 0 {
            (self.sel_mon + 1) % n
        } else {
            (self.sel_mon + n - 1) % n
        }
    }

    /// The monitor with the greatest overlap with `r`, defaulting to the
    /// selected monitor when nothing overlaps.
    pub(crate) fn rect_to_mon(&self, r: Rect) -> usize {
        let mut best = self.sel_mon;
        let mut area = 0;

        for (ix, m) in self.monitors.iter().enumerate() {
            let a = m.work.overlap_area(&r);
            if a > area {
                area = a;
                best = ix;
            }
        }

        best
    }

    /// The monitor under the given root coordinates.
    pub(crate) fn point_to_mon(&self, p: Point) -> usize {
        self.rect_to_mon(Rect::new(p.x, p.y, 1, 1))
    }

    /// The monitor owning `win`, whether it is a bar window or a client.
    pub(crate) fn win_to_mon(&self, win: Xid) -> Option<usize> {
        if let Some(ix) = self.monitors.iter().position(|m| m.bar_win == Some(win)) {
            return Some(ix);
        }

        self.client(win).map(|c| c.mon)
    }

    /// Move a client to `target`, inheriting the target monitor's active
    /// tagset. No-op when the client is already there.
    pub(crate) fn send_to_monitor(&mut self, win: Xid, target: usize) {
        let mon = match self.client(win) {
            Some(c) if c.mon != target => c.mon,
            _ => return,
        };

        debug!(%win, from = mon, to = target, "moving client between monitors");
        self.detach(win);
        self.detach_stack(win);

        let tags = self.monitors[target].active_tagset();
        let c = self.clients.get_mut(&win).expect("client was just detached");
        c.mon = target;
        c.tags = tags;

        self.attach(win);
        self.attach_stack(win);
    }

    /// Reconcile the monitor list against the rectangles reported by the
    /// multi-head backend. Duplicate rectangles are collapsed, new monitors
    /// are created, removed monitors hand their clients to monitor 0.
    ///
    /// Returns true if anything changed so the caller can re-arrange.
    pub(crate) fn update_monitors(&mut self, raw: &[Rect], bar_h: u32, config: &Config) -> bool {
        let mut unique: Vec<Rect> = Vec::with_capacity(raw.len());
        for r in raw {
            if !unique.contains(r) {
                unique.push(*r);
            }
        }

        let mut dirty = false;

        while self.monitors.len() < unique.len() {
            let num = self.monitors.len();
            self.monitors.push(Monitor::new(
                num,
                config.mfact,
                config.nmaster,
                config.initial_layouts(),
                config.show_bar,
                config.top_bar,
            ));
            dirty = true;
        }

        for (m, &r) in self.monitors.iter_mut().zip(unique.iter()) {
            if m.screen != r {
                dirty = true;
                m.screen = r;
                m.update_bar_pos(bar_h);
            }
        }

        while self.monitors.len() > unique.len().max(1) {
            let gone = self.monitors.pop().expect("len > 1");
            dirty = true;

            for win in gone.clients {
                let c = self.clients.get_mut(&win).expect("registered client");
                c.mon = 0;
                c.tags = self.monitors[0].active_tagset();
                self.attach(win);
                self.attach_stack(win);
            }
        }

        if dirty {
            self.sel_mon = 0;
        }

        dirty
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use simple_test_case::test_case;

    pub(crate) fn set_with_monitors(n: usize) -> ClientSet {
        let config = Config::default();
        let mut cs = ClientSet::new();
        let rects: Vec<Rect> = (0..n)
            .map(|i| Rect::new(i as i32 * 1920, 0, 1920, 1080))
            .collect();
        cs.update_monitors(&rects, 16, &config);

        cs
    }

    pub(crate) fn add_client(cs: &mut ClientSet, win: u32, mon: usize) -> Xid {
        let id = Xid(win);
        let mut c = Client::new(id, Rect::new(0, 0, 100, 100), 1, mon);
        c.tags = cs.monitors[mon].active_tagset();
        cs.insert(c);
        cs.focus_client(id);

        id
    }

    fn assert_invariants(cs: &ClientSet) {
        for (ix, m) in cs.monitors.iter().enumerate() {
            let mut clients = m.clients.clone();
            let mut stack = m.stack.clone();
            clients.sort();
            stack.sort();
            assert_eq!(clients, stack, "clients and stack diverge on monitor {ix}");
            clients.windows(2).for_each(|w| {
                assert_ne!(w[0], w[1], "duplicate id on monitor {ix}");
            });

            for &id in &m.clients {
                assert_eq!(cs.clients[&id].mon, ix, "client {id} has a stale mon index");
            }

            if let Some(sel) = m.sel {
                assert!(m.clients.contains(&sel), "sel not on its monitor");
            }

            assert_ne!(m.active_tagset(), 0, "empty active tagset");
        }

        let total: usize = cs.monitors.iter().map(|m| m.clients.len()).sum();
        assert_eq!(total, cs.clients.len(), "arena and orderings disagree");
    }

    #[test]
    fn new_clients_go_to_the_head_of_both_orderings() {
        let mut cs = set_with_monitors(1);
        add_client(&mut cs, 1, 0);
        add_client(&mut cs, 2, 0);

        assert_eq!(cs.monitors[0].clients, vec![Xid(2), Xid(1)]);
        assert_eq!(cs.monitors[0].stack, vec![Xid(2), Xid(1)]);
        assert_eq!(cs.selected(), Some(Xid(2)));
        assert_invariants(&cs);
    }

    #[test]
    fn remove_then_reinsert_restores_the_lists() {
        let mut cs = set_with_monitors(1);
        add_client(&mut cs, 1, 0);
        add_client(&mut cs, 2, 0);
        add_client(&mut cs, 3, 0);

        let c = cs.remove(Xid(3)).expect("managed");
        assert_eq!(cs.monitors[0].clients, vec![Xid(2), Xid(1)]);
        assert_invariants(&cs);

        cs.insert(c);
        assert_eq!(cs.monitors[0].clients, vec![Xid(3), Xid(2), Xid(1)]);
        assert_invariants(&cs);
    }

    #[test]
    fn removing_the_selected_client_falls_back_to_the_stack() {
        let mut cs = set_with_monitors(1);
        add_client(&mut cs, 1, 0);
        add_client(&mut cs, 2, 0);
        add_client(&mut cs, 3, 0); // stack order: 3, 2, 1

        cs.remove(Xid(3));

        assert_eq!(cs.selected(), Some(Xid(2)));
        assert_invariants(&cs);
    }

    #[test]
    fn focus_client_moves_to_stack_head_but_keeps_tile_order() {
        let mut cs = set_with_monitors(1);
        add_client(&mut cs, 1, 0);
        add_client(&mut cs, 2, 0);
        add_client(&mut cs, 3, 0);

        cs.focus_client(Xid(1));

        assert_eq!(cs.monitors[0].stack, vec![Xid(1), Xid(3), Xid(2)]);
        assert_eq!(cs.monitors[0].clients, vec![Xid(3), Xid(2), Xid(1)]);
        assert_eq!(cs.selected(), Some(Xid(1)));
        assert_invariants(&cs);
    }

    #[test]
    fn pop_moves_a_client_to_the_master_slot() {
        let mut cs = set_with_monitors(1);
        add_client(&mut cs, 1, 0);
        add_client(&mut cs, 2, 0);

        cs.pop(Xid(1));

        assert_eq!(cs.monitors[0].clients, vec![Xid(1), Xid(2)]);
        assert_invariants(&cs);
    }

    #[test_case(1, &[2, 3, 1]; "forward wraps")]
    #[test_case(-1, &[3, 1, 2]; "backward wraps")]
    #[test]
    fn cycle_target_is_cyclic(dir: i32, expected: &[u32]) {
        let mut cs = set_with_monitors(1);
        add_client(&mut cs, 1, 0);
        add_client(&mut cs, 2, 0);
        add_client(&mut cs, 3, 0);
        // tile order 3, 2, 1; start selected on 3

        let mut seen = Vec::new();
        for _ in 0..3 {
            let next = cs.cycle_target(dir).expect("multiple visible clients");
            cs.focus_client(next);
            seen.push(*next);
        }

        assert_eq!(seen, expected);
    }

    #[test]
    fn cycle_forward_then_back_returns_to_the_start() {
        let mut cs = set_with_monitors(1);
        for w in 1..=4 {
            add_client(&mut cs, w, 0);
        }
        cs.focus_client(Xid(2));

        let fwd = cs.cycle_target(1).expect("target");
        cs.focus_client(fwd);
        let back = cs.cycle_target(-1).expect("target");
        cs.focus_client(back);

        assert_eq!(cs.selected(), Some(Xid(2)));
    }

    #[test]
    fn cycle_skips_hidden_clients() {
        let mut cs = set_with_monitors(1);
        add_client(&mut cs, 1, 0);
        add_client(&mut cs, 2, 0);
        add_client(&mut cs, 3, 0);
        cs.client_mut(Xid(2)).expect("managed").tags = 0b10; // hidden on tag 2

        assert_eq!(cs.cycle_target(1), Some(Xid(1)));
        assert_eq!(cs.cycle_target(-1), Some(Xid(1)));
    }

    #[test]
    fn send_to_monitor_inherits_the_target_tagset() {
        let mut cs = set_with_monitors(2);
        cs.monitor_mut(1).view(0b0110);
        let id = add_client(&mut cs, 1, 0);

        cs.send_to_monitor(id, 1);

        let c = cs.client(id).expect("still managed");
        assert_eq!(c.mon, 1);
        assert_eq!(c.tags, 0b0110);
        assert!(cs.monitors[1].clients.contains(&id));
        assert!(!cs.monitors[0].clients.contains(&id));
        assert_invariants(&cs);
    }

    #[test_case(Rect::new(1800, 100, 300, 200), 1; "majority on second monitor")]
    #[test_case(Rect::new(100, 100, 300, 200), 0; "fully on first monitor")]
    #[test_case(Rect::new(9000, 9000, 10, 10), 0; "no overlap defaults to selmon")]
    #[test]
    fn rect_to_mon_picks_the_largest_overlap(r: Rect, expected: usize) {
        let cs = set_with_monitors(2);

        assert_eq!(cs.rect_to_mon(r), expected);
    }

    #[test]
    fn monitor_removal_migrates_clients_to_the_first_monitor() {
        let config = Config::default();
        let mut cs = set_with_monitors(2);
        add_client(&mut cs, 1, 1);
        add_client(&mut cs, 2, 1);
        add_client(&mut cs, 3, 0);

        let dirty = cs.update_monitors(&[Rect::new(0, 0, 1920, 1080)], 16, &config);

        assert!(dirty);
        assert_eq!(cs.monitors.len(), 1);
        assert_eq!(cs.clients.len(), 3);
        assert!(cs.monitors[0].clients.contains(&Xid(1)));
        assert!(cs.monitors[0].clients.contains(&Xid(2)));
        assert_invariants(&cs);
    }

    #[test]
    fn duplicate_screen_rects_are_collapsed() {
        let config = Config::default();
        let mut cs = ClientSet::new();
        let r = Rect::new(0, 0, 1920, 1080);

        cs.update_monitors(&[r, r, Rect::new(1920, 0, 1280, 1024)], 16, &config);

        assert_eq!(cs.monitors.len(), 2);
    }

    #[test]
    fn unchanged_topology_is_not_dirty() {
        let config = Config::default();
        let mut cs = ClientSet::new();
        let rects = [Rect::new(0, 0, 1920, 1080)];

        assert!(cs.update_monitors(&rects, 16, &config));
        assert!(!cs.update_monitors(&rects, 16, &config));
    }

    #[test]
    fn work_area_excludes_the_bar() {
        let cs = set_with_monitors(1);

        assert_eq!(cs.monitors[0].work, Rect::new(0, 16, 1920, 1064));
    }
}
