//! Per-monitor state: tagsets, layout slots, bar placement and the two
//! client orderings (tile order and focus history).
use crate::{
    layout::Layout,
    pure::geometry::Rect,
    Xid,
};

/// State for a single physical screen region.
///
/// `clients` is the tile ordering (new clients attach at the head) and
/// `stack` the focus history (most recently focused at the head). The two
/// always hold the same set of ids; only the order differs.
#[derive(Debug, Clone, PartialEq)]
pub struct Monitor {
    pub(crate) num: usize,
    pub(crate) lt_symbol: String,
    pub(crate) mfact: f32,
    pub(crate) nmaster: u32,
    /// Full screen rectangle for this output
    pub(crate) screen: Rect,
    /// Work area: the screen rectangle minus the bar strip
    pub(crate) work: Rect,
    /// Current and previous tagsets, selected by `sel_tags`
    pub(crate) tagset: [u32; 2],
    pub(crate) sel_tags: usize,
    /// Current and previous layout slots, selected by `sel_lt`
    pub(crate) lt: [Layout; 2],
    pub(crate) sel_lt: usize,
    pub(crate) show_bar: bool,
    pub(crate) top_bar: bool,
    pub(crate) bar_win: Option<Xid>,
    pub(crate) bar_y: i32,
    pub(crate) clients: Vec<Xid>,
    pub(crate) stack: Vec<Xid>,
    pub(crate) sel: Option<Xid>,
}

impl Monitor {
    pub(crate) fn new(
        num: usize,
        mfact: f32,
        nmaster: u32,
        layouts: [Layout; 2],
        show_bar: bool,
        top_bar: bool,
    ) -> Self {
        Self {
            num,
            lt_symbol: layouts[0].symbol.to_string(),
            mfact,
            nmaster,
            screen: Rect::default(),
            work: Rect::default(),
            tagset: [1, 1],
            sel_tags: 0,
            lt: layouts,
            sel_lt: 0,
            show_bar,
            top_bar,
            bar_win: None,
            bar_y: 0,
            clients: Vec::new(),
            stack: Vec::new(),
            sel: None,
        }
    }

    /// This monitor's index as reported to rules and commands.
    pub fn num(&self) -> usize {
        self.num
    }

    /// The tagset clients are currently matched against for visibility.
    pub fn active_tagset(&self) -> u32 {
        self.tagset[self.sel_tags]
    }

    /// The active layout slot.
    pub fn layout(&self) -> Layout {
        self.lt[self.sel_lt]
    }

    /// Whether the active layout arranges clients (false = floating layout).
    pub fn arranges(&self) -> bool {
        self.layout().arranges()
    }

    /// The symbol currently shown for this monitor's layout.
    pub fn layout_symbol(&self) -> &str {
        &self.lt_symbol
    }

    /// The tile ordering of clients on this monitor.
    pub fn clients(&self) -> &[Xid] {
        &self.clients
    }

    /// The focus history of clients on this monitor, most recent first.
    pub fn stack(&self) -> &[Xid] {
        &self.stack
    }

    /// The selected client on this monitor.
    pub fn selected(&self) -> Option<Xid> {
        self.sel
    }

    /// The screen rectangle minus the bar strip.
    pub fn work_area(&self) -> Rect {
        self.work
    }

    /// Whether the bar is currently shown.
    pub fn bar_visible(&self) -> bool {
        self.show_bar
    }

    /// Switch the active tagset. A zero mask flips back to the previous
    /// tagset without replacing it; a no-op view is reported as `false`.
    pub(crate) fn view(&mut self, mask: u32) -> bool {
        if mask == self.active_tagset() {
            return false;
        }

        self.sel_tags ^= 1;
        if mask != 0 {
            self.tagset[self.sel_tags] = mask;
        }

        true
    }

    /// XOR tag bits into the active tagset, refusing a result of zero.
    pub(crate) fn toggle_view(&mut self, mask: u32) -> bool {
        let toggled = self.active_tagset() ^ mask;
        if toggled == 0 {
            return false;
        }

        self.tagset[self.sel_tags] = toggled;

        true
    }

    /// Recompute the work area and bar position from the screen rectangle.
    pub(crate) fn update_bar_pos(&mut self, bar_h: u32) {
        self.work = self.screen;

        if self.show_bar {
            self.work.h = self.work.h.saturating_sub(bar_h);
            if self.top_bar {
                self.bar_y = self.work.y;
                self.work.y += bar_h as i32;
            } else {
                self.bar_y = self.work.bottom();
            }
        } else {
            self.bar_y = -(bar_h as i32);
        }
    }

    /// The rectangle the bar window should occupy.
    pub(crate) fn bar_rect(&self, bar_h: u32) -> Rect {
        Rect::new(self.work.x, self.bar_y, self.work.w, bar_h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutKind;
    use simple_test_case::test_case;

    pub(crate) fn test_monitor(num: usize) -> Monitor {
        let layouts = [
            Layout {
                symbol: "[]=",
                kind: LayoutKind::Tile,
            },
            Layout {
                symbol: "><>",
                kind: LayoutKind::Float,
            },
        ];

        Monitor::new(num, 0.55, 1, layouts, true, true)
    }

    #[test_case(true, true, Rect::new(0, 16, 1920, 1064), 0; "top bar")]
    #[test_case(true, false, Rect::new(0, 0, 1920, 1064), 1064; "bottom bar")]
    #[test_case(false, true, Rect::new(0, 0, 1920, 1080), -16; "hidden bar")]
    #[test]
    fn bar_position(show: bool, top: bool, expected_work: Rect, expected_by: i32) {
        let mut m = test_monitor(0);
        m.screen = Rect::new(0, 0, 1920, 1080);
        m.show_bar = show;
        m.top_bar = top;

        m.update_bar_pos(16);

        assert_eq!(m.work, expected_work);
        assert_eq!(m.bar_y, expected_by);
    }

    #[test]
    fn view_zero_toggles_to_previous()  {
        let mut m = test_monitor(0);

        assert!(m.view(0b0100));
        assert_eq!(m.active_tagset(), 0b0100);

        assert!(m.view(0));
        assert_eq!(m.active_tagset(), 1);

        assert!(m.view(0));
        assert_eq!(m.active_tagset(), 0b0100);
    }

    #[test]
    fn view_of_current_tagset_is_a_noop() {
        let mut m = test_monitor(0);
        m.view(0b0010);

        assert!(!m.view(0b0010));
        assert_eq!(m.active_tagset(), 0b0010);
    }

    #[test]
    fn toggle_view_twice_is_identity() {
        let mut m = test_monitor(0);
        m.view(0b0011);

        assert!(m.toggle_view(0b0110));
        assert_eq!(m.active_tagset(), 0b0101);

        assert!(m.toggle_view(0b0110));
        assert_eq!(m.active_tagset(), 0b0011);
    }

    #[test]
    fn toggle_view_refuses_empty_result() {
        let mut m = test_monitor(0);

        assert!(!m.toggle_view(1));
        assert_eq!(m.active_tagset(), 1);
    }
}
