//! Per-window client state.
use crate::{
    pure::{geometry::Rect, hints::SizeHints},
    Xid,
};

/// Clients with unreadable or empty titles render as this placeholder.
pub const BROKEN: &str = "broken";

/// Titles are clipped to this many bytes.
const TITLE_MAX: usize = 256;

/// The managed state for a single top level client window.
///
/// A client belongs to exactly one monitor (named by index into the
/// [ClientSet][crate::core::ClientSet] monitor list) and to every tag set in
/// its `tags` bitmask. Geometry is the last position committed by the
/// manager, with `old_rect`/`old_bw` holding the values to restore when
/// leaving fullscreen.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub(crate) win: Xid,
    pub(crate) name: String,
    pub(crate) rect: Rect,
    pub(crate) old_rect: Rect,
    pub(crate) bw: u32,
    pub(crate) old_bw: u32,
    pub(crate) tags: u32,
    pub(crate) mon: usize,
    /// Cached WM_NORMAL_HINTS; `None` after a PropertyNotify invalidated
    /// them, repopulated lazily before the next resize that needs them.
    pub(crate) hints: Option<SizeHints>,
    pub(crate) fixed: bool,
    pub(crate) floating: bool,
    pub(crate) urgent: bool,
    pub(crate) never_focus: bool,
    pub(crate) old_floating: bool,
    pub(crate) fullscreen: bool,
}

impl Client {
    pub(crate) fn new(win: Xid, rect: Rect, old_bw: u32, mon: usize) -> Self {
        Self {
            win,
            name: String::new(),
            rect,
            old_rect: rect,
            bw: 0,
            old_bw,
            tags: 0,
            mon,
            hints: None,
            fixed: false,
            floating: false,
            urgent: false,
            never_focus: false,
            old_floating: false,
            fullscreen: false,
        }
    }

    /// The id of the X window this client wraps.
    pub fn win(&self) -> Xid {
        self.win
    }

    /// The client title for the bar, clipped for rendering.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current geometry as committed by the manager.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Total on-screen width including both borders.
    pub fn total_w(&self) -> u32 {
        self.rect.w + 2 * self.bw
    }

    /// Total on-screen height including both borders.
    pub fn total_h(&self) -> u32 {
        self.rect.h + 2 * self.bw
    }

    /// Whether this client shows on a monitor whose active tagset is `tagset`.
    pub fn is_visible_on(&self, tagset: u32) -> bool {
        self.tags & tagset != 0
    }

    /// Tiled clients participate in layout arrangement.
    pub fn is_tiled(&self) -> bool {
        !self.floating
    }

    /// The tag bitmask this client is on.
    pub fn tags(&self) -> u32 {
        self.tags
    }

    /// The index of the monitor owning this client.
    pub fn monitor_index(&self) -> usize {
        self.mon
    }

    /// The current border width in pixels.
    pub fn border_width(&self) -> u32 {
        self.bw
    }

    /// Whether the client is floating above the tiled layer.
    pub fn is_floating(&self) -> bool {
        self.floating
    }

    /// Whether the client is fullscreen.
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Whether the client has raised the ICCCM urgency hint.
    pub fn is_urgent(&self) -> bool {
        self.urgent
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        let mut name = match name {
            Some(n) if !n.is_empty() => n,
            _ => BROKEN.to_string(),
        };

        if name.len() > TITLE_MAX {
            let mut end = TITLE_MAX;
            while !name.is_char_boundary(end) {
                end -= 1;
            }
            name.truncate(end);
        }

        self.name = name;
    }

    pub(crate) fn save_rect(&mut self) {
        self.old_rect = self.rect;
    }

    /// Clamp a proposed rectangle against the given bounds and this client's
    /// size hints, returning `Some` only when the result differs from the
    /// current geometry (no-op reconfigures are suppressed).
    ///
    /// `interact` selects the clamp bounds: the whole X screen for pointer
    /// driven moves, the monitor work area otherwise (guaranteeing at least
    /// a sliver of the window remains inside it). `use_hints` is expected to
    /// already account for the resize_hints config, floating state and the
    /// monitor layout; hints must have been refreshed by the caller.
    pub(crate) fn apply_size_hints(
        &self,
        proposed: Rect,
        screen: Rect,
        work: Rect,
        bar_h: u32,
        use_hints: bool,
        interact: bool,
    ) -> Option<Rect> {
        let Rect { mut x, mut y, w, h } = proposed;
        let mut w = w.max(1);
        let mut h = h.max(1);
        let edge = 2 * self.bw as i32;

        if interact {
            if x > screen.right() {
                x = screen.right() - (w as i32 + edge);
            }
            if y > screen.bottom() {
                y = screen.bottom() - (h as i32 + edge);
            }
            if x + w as i32 + edge < screen.x {
                x = screen.x;
            }
            if y + h as i32 + edge < screen.y {
                y = screen.y;
            }
        } else {
            if x >= work.right() {
                x = work.right() - (w as i32 + edge);
            }
            if y >= work.bottom() {
                y = work.bottom() - (h as i32 + edge);
            }
            if x + w as i32 + edge <= work.x {
                x = work.x;
            }
            if y + h as i32 + edge <= work.y {
                y = work.y;
            }
        }

        w = w.max(bar_h);
        h = h.max(bar_h);

        if use_hints {
            if let Some(hints) = &self.hints {
                (w, h) = hints.apply(w, h);
            }
        }

        let r = Rect { x, y, w, h };
        (r != self.rect).then_some(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);
    const WORK: Rect = Rect::new(0, 16, 1920, 1064);
    const BH: u32 = 16;

    fn client_at(r: Rect) -> Client {
        let mut c = Client::new(Xid(1), r, 1, 0);
        c.bw = 1;
        c
    }

    #[test]
    fn noop_reconfigure_is_suppressed() {
        let c = client_at(Rect::new(10, 30, 200, 100));

        let res = c.apply_size_hints(Rect::new(10, 30, 200, 100), SCREEN, WORK, BH, false, false);

        assert!(res.is_none());
    }

    #[test_case(Rect::new(5000, 30, 200, 100), Rect::new(1718, 30, 200, 100); "right of work area")]
    #[test_case(Rect::new(-5000, 30, 200, 100), Rect::new(0, 30, 200, 100); "left of work area")]
    #[test_case(Rect::new(10, 5000, 200, 100), Rect::new(10, 978, 200, 100); "below work area")]
    #[test_case(Rect::new(10, -5000, 200, 100), Rect::new(10, 16, 200, 100); "above work area")]
    #[test]
    fn sliver_remains_in_work_area(proposed: Rect, expected: Rect) {
        let c = client_at(Rect::new(10, 30, 200, 100));

        let res = c.apply_size_hints(proposed, SCREEN, WORK, BH, false, false);

        assert_eq!(res, Some(expected));
    }

    #[test]
    fn tiny_windows_grow_to_bar_height() {
        let c = client_at(Rect::new(10, 30, 200, 100));

        let res = c.apply_size_hints(Rect::new(10, 30, 3, 5), SCREEN, WORK, BH, false, false);

        assert_eq!(res, Some(Rect::new(10, 30, BH, BH)));
    }

    #[test]
    fn hints_only_applied_when_requested() {
        let mut c = client_at(Rect::new(10, 30, 200, 100));
        c.hints = Some(SizeHints {
            inc_w: 7,
            inc_h: 13,
            ..Default::default()
        });

        let tiled = c.apply_size_hints(Rect::new(10, 30, 200, 105), SCREEN, WORK, BH, false, false);
        let floating =
            c.apply_size_hints(Rect::new(10, 30, 200, 105), SCREEN, WORK, BH, true, false);

        assert_eq!(tiled, Some(Rect::new(10, 30, 200, 105)));
        // 200 - 200 % 7 == 196, 105 - 105 % 13 == 104
        assert_eq!(floating, Some(Rect::new(10, 30, 196, 104)));
    }

    #[test_case(Some("hello".into()), "hello"; "plain title")]
    #[test_case(Some(String::new()), BROKEN; "empty title")]
    #[test_case(None, BROKEN; "unreadable title")]
    #[test]
    fn titles_fall_back_to_broken(name: Option<String>, expected: &str) {
        let mut c = client_at(Rect::new(0, 0, 1, 1));

        c.set_name(name);

        assert_eq!(c.name(), expected);
    }

    #[test]
    fn long_titles_are_clipped_on_a_char_boundary() {
        let mut c = client_at(Rect::new(0, 0, 1, 1));

        c.set_name(Some("é".repeat(200))); // 400 bytes of 2-byte chars

        assert_eq!(c.name().len(), 256);
        assert_eq!(c.name().chars().count(), 128);
    }
}
