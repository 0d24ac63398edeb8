//! A minimal bar drawing surface using only the core protocol: server side
//! fonts, a scratch pixmap per frame and `ImageText8`.
use crate::{bar::Draw, pure::geometry::Rect, Color, Result, Xid};
use x11rb::{
    connection::Connection,
    protocol::xproto::{Char2b, ChangeGCAux, ConnectionExt as _, Pixmap, Rectangle, Window},
};

use super::xconn::X11rbConn;

/// ImageText8 carries its string length in a single byte.
const TEXT_MAX: usize = 254;

/// The in-flight frame between begin and commit.
#[derive(Debug, Clone, Copy)]
pub(super) struct Frame {
    pixmap: Pixmap,
    target: Window,
    w: u16,
    h: u16,
}

impl Draw for X11rbConn {
    fn font_height(&self) -> u32 {
        self.font_h
    }

    fn text_extent(&mut self, s: &str) -> Result<u32> {
        if s.is_empty() {
            return Ok(0);
        }

        // core fonts index 16 bit chars; treating the raw bytes as the low
        // byte keeps ASCII correct, which is all these fonts render anyway
        let chars: Vec<Char2b> = s
            .bytes()
            .take(TEXT_MAX)
            .map(|b| Char2b { byte1: b, byte2: 0 })
            .collect();
        let reply = self.conn.query_text_extents(self.font, &chars)?.reply()?;

        Ok(reply.overall_width.max(0) as u32)
    }

    fn begin(&mut self, target: Xid, w: u32, h: u32) -> Result<()> {
        let pixmap = self.conn.generate_id()?;
        self.conn.create_pixmap(
            self.depth,
            pixmap,
            self.root,
            w.max(1) as u16,
            h.max(1) as u16,
        )?;
        self.frame = Some(Frame {
            pixmap,
            target: *target,
            w: w as u16,
            h: h as u16,
        });

        Ok(())
    }

    fn rect(&mut self, r: Rect, color: Color, filled: bool) -> Result<()> {
        let frame = match self.frame {
            Some(f) => f,
            None => return Ok(()),
        };

        self.conn
            .change_gc(self.gc, &ChangeGCAux::new().foreground(color.rgb_u32()))?;

        if filled {
            let rect = Rectangle {
                x: r.x as i16,
                y: r.y as i16,
                width: r.w as u16,
                height: r.h as u16,
            };
            self.conn.poly_fill_rectangle(frame.pixmap, self.gc, &[rect])?;
        } else {
            let rect = Rectangle {
                x: r.x as i16,
                y: r.y as i16,
                width: r.w.saturating_sub(1) as u16,
                height: r.h.saturating_sub(1) as u16,
            };
            self.conn.poly_rectangle(frame.pixmap, self.gc, &[rect])?;
        }

        Ok(())
    }

    fn text(
        &mut self,
        x: i32,
        w: u32,
        h: u32,
        left_pad: u32,
        s: &str,
        fg: Color,
        bg: Color,
    ) -> Result<()> {
        let frame = match self.frame {
            Some(f) => f,
            None => return Ok(()),
        };

        self.rect(Rect::new(x, 0, w, h), bg, true)?;

        // clip the string to its cell so long titles do not bleed into the
        // segment to their right
        let avail = w.saturating_sub(left_pad);
        let mut end = s.len().min(TEXT_MAX);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        while end > 0 && self.text_extent(&s[..end])? > avail {
            end -= 1;
            while !s.is_char_boundary(end) {
                end -= 1;
            }
        }
        let clipped = &s[..end];
        if clipped.is_empty() {
            return Ok(());
        }

        let aux = ChangeGCAux::new()
            .foreground(fg.rgb_u32())
            .background(bg.rgb_u32());
        self.conn.change_gc(self.gc, &aux)?;

        let baseline = ((h.saturating_sub(self.font_h)) / 2 + self.font_ascent) as i16;
        self.conn.image_text8(
            frame.pixmap,
            self.gc,
            (x + left_pad as i32) as i16,
            baseline,
            clipped.as_bytes(),
        )?;

        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if let Some(f) = self.frame.take() {
            self.conn
                .copy_area(f.pixmap, f.target, self.gc, 0, 0, 0, 0, f.w, f.h)?;
            self.conn.free_pixmap(f.pixmap)?;
            self.conn.flush()?;
        }

        Ok(())
    }
}
