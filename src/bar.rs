//! The status bar: tag indicators, layout symbol, focused title and status
//! text, composited onto each monitor's bar window.
//!
//! Rendering goes through the [`Draw`] trait so the compositing logic stays
//! independent of the rasterizer; the production implementation lives in
//! [crate::x11rb_conn::draw]. All text widths include the font-height worth
//! of horizontal padding the drawing layer adds around strings.
use crate::{
    config::ColorScheme,
    core::bindings::ClickRegion,
    pure::geometry::Rect,
    Color, Result, Xid,
};

/// An abstract drawing surface for one bar at a time.
///
/// A frame is bracketed by [begin][Draw::begin] and [commit][Draw::commit];
/// drawing calls between the two paint into an off screen buffer that is
/// blitted to the bar window on commit.
pub trait Draw {
    /// Height of the loaded font (ascent + descent) in pixels.
    fn font_height(&self) -> u32;
    /// The unpadded pixel width of `s` in the loaded font.
    fn text_extent(&mut self, s: &str) -> Result<u32>;
    /// Start a frame for the given bar window.
    fn begin(&mut self, target: Xid, w: u32, h: u32) -> Result<()>;
    /// Fill (or outline) a rectangle in the current frame.
    fn rect(&mut self, r: Rect, color: Color, filled: bool) -> Result<()>;
    /// Paint `s` in a `w` x `h` cell at `x`, background filled with `bg`.
    fn text(&mut self, x: i32, w: u32, h: u32, left_pad: u32, s: &str, fg: Color, bg: Color)
        -> Result<()>;
    /// Blit the finished frame to the bar window.
    fn commit(&mut self) -> Result<()>;
}

/// The height bars are created with for a given drawing surface.
pub fn bar_height<D: Draw>(d: &D) -> u32 {
    d.font_height() + 2
}

/// A padded text width: what one bar segment rendering `s` occupies.
pub fn text_w<D: Draw>(d: &mut D, s: &str) -> Result<u32> {
    Ok(d.text_extent(s)? + d.font_height())
}

/// Everything needed to render one monitor's bar.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BarContent<'a> {
    pub bar_win: Xid,
    pub width: u32,
    pub tags: &'a [String],
    pub active_tagset: u32,
    /// Tags with at least one client on them
    pub occupied: u32,
    /// Tags with at least one urgent client
    pub urgent: u32,
    pub lt_symbol: &'a str,
    /// Whether this bar belongs to the selected monitor
    pub is_selmon: bool,
    /// The selected client on this monitor
    pub sel: Option<SelInfo<'a>>,
    pub status: &'a str,
}

/// Bar-relevant details of a monitor's selected client.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SelInfo<'a> {
    pub name: &'a str,
    pub floating: bool,
    pub fixed: bool,
    pub tags: u32,
}

/// Composite one bar frame.
pub(crate) fn draw_bar<D: Draw>(
    d: &mut D,
    content: &BarContent<'_>,
    normal: &ColorScheme,
    selected: &ColorScheme,
) -> Result<()> {
    let fh = d.font_height();
    let bh = fh + 2;
    let lrpad = fh;
    let boxs = (fh / 9) as i32;
    let boxw = fh / 6 + 2;

    d.begin(content.bar_win, content.width, bh)?;

    // status text first, so the title knows how much room remains
    let mut status_w = 0;
    if content.is_selmon {
        status_w = d.text_extent(content.status)? + 2;
        d.text(
            content.width as i32 - status_w as i32,
            status_w,
            bh,
            0,
            content.status,
            normal.fg,
            normal.bg,
        )?;
    }

    let mut x = 0i32;
    for (i, tag) in content.tags.iter().enumerate() {
        let mask = 1 << i;
        let w = d.text_extent(tag)? + lrpad;
        let scheme = if content.active_tagset & mask != 0 {
            selected
        } else {
            normal
        };
        let (fg, bg) = if content.urgent & mask != 0 {
            (scheme.bg, scheme.fg)
        } else {
            (scheme.fg, scheme.bg)
        };

        d.text(x, w, bh, lrpad / 2, tag, fg, bg)?;

        if content.occupied & mask != 0 {
            let sel_tags = content.sel.map(|s| s.tags).unwrap_or(0);
            let filled = content.is_selmon && sel_tags & mask != 0;
            d.rect(Rect::new(x + boxs, boxs, boxw, boxw), fg, filled)?;
        }

        x += w as i32;
    }

    let w = d.text_extent(content.lt_symbol)? + lrpad;
    d.text(x, w, bh, lrpad / 2, content.lt_symbol, normal.fg, normal.bg)?;
    x += w as i32;

    let remaining = content.width as i64 - status_w as i64 - x as i64;
    if remaining > bh as i64 {
        match content.sel {
            Some(sel) => {
                let scheme = if content.is_selmon { selected } else { normal };
                d.text(x, remaining as u32, bh, lrpad / 2, sel.name, scheme.fg, scheme.bg)?;
                if sel.floating {
                    d.rect(Rect::new(x + boxs, boxs, boxw, boxw), scheme.fg, sel.fixed)?;
                }
            }
            None => d.rect(Rect::new(x, 0, remaining as u32, bh), normal.bg, true)?,
        }
    }

    d.commit()
}

/// Classify a click at bar x-coordinate `x`, returning the region and the
/// tag mask for tag bar clicks (0 otherwise).
pub(crate) fn click_at<D: Draw>(
    d: &mut D,
    x: i32,
    bar_width: u32,
    tags: &[String],
    lt_symbol: &str,
    status: &str,
) -> Result<(ClickRegion, u32)> {
    let mut edge = 0i32;

    for (i, tag) in tags.iter().enumerate() {
        edge += text_w(d, tag)? as i32;
        if x < edge {
            return Ok((ClickRegion::TagBar, 1 << i));
        }
    }

    if x < edge + text_w(d, lt_symbol)? as i32 {
        Ok((ClickRegion::LtSymbol, 0))
    } else if x > bar_width as i32 - text_w(d, status)? as i32 {
        Ok((ClickRegion::StatusText, 0))
    } else {
        Ok((ClickRegion::WinTitle, 0))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use simple_test_case::test_case;

    /// Fixed metrics: every char is 6px wide, the font is 14px tall.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingDraw {
        pub ops: Vec<Op>,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Op {
        Begin(Xid, u32, u32),
        Rect(Rect, Color, bool),
        Text(i32, u32, String, Color, Color),
        Commit,
    }

    impl Draw for RecordingDraw {
        fn font_height(&self) -> u32 {
            14
        }

        fn text_extent(&mut self, s: &str) -> Result<u32> {
            Ok(6 * s.chars().count() as u32)
        }

        fn begin(&mut self, target: Xid, w: u32, h: u32) -> Result<()> {
            self.ops.push(Op::Begin(target, w, h));
            Ok(())
        }

        fn rect(&mut self, r: Rect, color: Color, filled: bool) -> Result<()> {
            self.ops.push(Op::Rect(r, color, filled));
            Ok(())
        }

        fn text(
            &mut self,
            x: i32,
            w: u32,
            _h: u32,
            _left_pad: u32,
            s: &str,
            fg: Color,
            bg: Color,
        ) -> Result<()> {
            self.ops.push(Op::Text(x, w, s.to_string(), fg, bg));
            Ok(())
        }

        fn commit(&mut self) -> Result<()> {
            self.ops.push(Op::Commit);
            Ok(())
        }
    }

    fn schemes() -> (ColorScheme, ColorScheme) {
        (
            ColorScheme {
                fg: Color::from(0xbbbbbb),
                bg: Color::from(0x222222),
                border: Color::from(0x444444),
            },
            ColorScheme {
                fg: Color::from(0xeeeeee),
                bg: Color::from(0x005577),
                border: Color::from(0x005577),
            },
        )
    }

    fn tag_names() -> Vec<String> {
        vec!["1".into(), "2".into(), "3".into()]
    }

    #[test]
    fn frame_is_bracketed_and_sized() {
        let (normal, selected) = schemes();
        let mut d = RecordingDraw::default();
        let tags = tag_names();
        let content = BarContent {
            bar_win: Xid(9),
            width: 800,
            tags: &tags,
            active_tagset: 1,
            occupied: 0,
            urgent: 0,
            lt_symbol: "[]=",
            is_selmon: false,
            sel: None,
            status: "",
        };

        draw_bar(&mut d, &content, &normal, &selected).unwrap();

        assert_eq!(d.ops.first(), Some(&Op::Begin(Xid(9), 800, 16)));
        assert_eq!(d.ops.last(), Some(&Op::Commit));
    }

    #[test]
    fn active_and_urgent_tags_use_distinct_schemes() {
        let (normal, selected) = schemes();
        let mut d = RecordingDraw::default();
        let tags = tag_names();
        let content = BarContent {
            bar_win: Xid(9),
            width: 800,
            tags: &tags,
            active_tagset: 0b001,
            occupied: 0b011,
            urgent: 0b010,
            lt_symbol: "[]=",
            is_selmon: true,
            sel: Some(SelInfo {
                name: "term",
                floating: false,
                fixed: false,
                tags: 0b001,
            }),
            status: "ok",
        };

        draw_bar(&mut d, &content, &normal, &selected).unwrap();

        let texts: Vec<_> = d
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Text(x, _, s, fg, bg) => Some((*x, s.as_str(), *fg, *bg)),
                _ => None,
            })
            .collect();

        // status is drawn first, then the tags left to right
        assert_eq!(texts[0].1, "ok");
        // active tag 1: selected scheme
        assert_eq!(texts[1], (0, "1", selected.fg, selected.bg));
        // urgent tag 2: normal scheme, inverted
        assert_eq!(texts[2], (20, "2", normal.bg, normal.fg));
        // plain tag 3
        assert_eq!(texts[3], (40, "3", normal.fg, normal.bg));
    }

    #[test]
    fn occupied_tags_get_an_indicator_box() {
        let (normal, selected) = schemes();
        let mut d = RecordingDraw::default();
        let tags = tag_names();
        let content = BarContent {
            bar_win: Xid(9),
            width: 800,
            tags: &tags,
            active_tagset: 0b001,
            occupied: 0b101,
            urgent: 0,
            lt_symbol: "[]=",
            is_selmon: true,
            sel: Some(SelInfo {
                name: "term",
                floating: false,
                fixed: false,
                tags: 0b001,
            }),
            status: "",
        };

        draw_bar(&mut d, &content, &normal, &selected).unwrap();

        let boxes: Vec<_> = d
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Rect(r, _, filled) => Some((r.x, *filled)),
                _ => None,
            })
            .collect();

        // tag 1 holds the selected client (filled), tag 3 is only occupied
        assert_eq!(boxes, vec![(1, true), (41, false)]);
    }

    #[test]
    fn status_only_renders_on_the_selected_monitor() {
        let (normal, selected) = schemes();
        let tags = tag_names();
        let mut content = BarContent {
            bar_win: Xid(9),
            width: 800,
            tags: &tags,
            active_tagset: 1,
            occupied: 0,
            urgent: 0,
            lt_symbol: "[]=",
            is_selmon: false,
            sel: None,
            status: "status",
        };

        let mut d = RecordingDraw::default();
        draw_bar(&mut d, &content, &normal, &selected).unwrap();
        assert!(!d
            .ops
            .iter()
            .any(|op| matches!(op, Op::Text(_, _, s, _, _) if s == "status")));

        content.is_selmon = true;
        let mut d = RecordingDraw::default();
        draw_bar(&mut d, &content, &normal, &selected).unwrap();
        assert!(d
            .ops
            .iter()
            .any(|op| matches!(op, Op::Text(_, _, s, _, _) if s == "status")));
    }

    #[test]
    fn empty_title_area_is_cleared() {
        let (normal, selected) = schemes();
        let mut d = RecordingDraw::default();
        let tags = tag_names();
        let content = BarContent {
            bar_win: Xid(9),
            width: 800,
            tags: &tags,
            active_tagset: 1,
            occupied: 0,
            urgent: 0,
            lt_symbol: "[]=",
            is_selmon: false,
            sel: None,
            status: "",
        };

        draw_bar(&mut d, &content, &normal, &selected).unwrap();

        // tag area is 3 * 20, layout symbol 18 + 14 = 32 -> title fill at 92
        assert!(d
            .ops
            .contains(&Op::Rect(Rect::new(92, 0, 800 - 92, 16), normal.bg, true)));
    }

    // Tag cells are 20px wide (6px glyph + 14px padding); the layout symbol
    // occupies [60, 92).
    #[test_case(0, ClickRegion::TagBar, 0b001; "first tag")]
    #[test_case(19, ClickRegion::TagBar, 0b001; "first tag right edge")]
    #[test_case(20, ClickRegion::TagBar, 0b010; "second tag")]
    #[test_case(59, ClickRegion::TagBar, 0b100; "last tag")]
    #[test_case(60, ClickRegion::LtSymbol, 0; "layout symbol")]
    #[test_case(91, ClickRegion::LtSymbol, 0; "layout symbol right edge")]
    #[test_case(92, ClickRegion::WinTitle, 0; "title area")]
    #[test_case(780, ClickRegion::StatusText, 0; "status text")]
    #[test]
    fn click_regions(x: i32, region: ClickRegion, mask: u32) {
        let mut d = RecordingDraw::default();
        let tags = tag_names();

        let res = click_at(&mut d, x, 800, &tags, "[]=", "st").unwrap();

        assert_eq!(res, (region, mask));
    }
}
