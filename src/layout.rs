//! The built in layout algorithms.
//!
//! A layout is a symbol for the bar plus an arrangement kind; the floating
//! "layout" performs no arrangement at all. The arrangement functions place
//! clients through a `resize` callback which commits the geometry (applying
//! size hints) and returns the rectangle that was actually used: the tile
//! algorithm advances its running offsets by committed heights, so a client
//! that shrank its slot via hints leaves the freed space to the next one.
use crate::{pure::geometry::Rect, Xid};

/// How a monitor arranges the visible tiled clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutKind {
    /// Master column + stacking column
    Tile,
    /// Every visible client takes the full work area
    Monocle,
    /// No arrangement: clients keep whatever geometry they have
    Float,
}

/// A layout slot: the bar symbol and the arrangement to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Symbol rendered in the bar while this layout is active
    pub symbol: &'static str,
    /// The arrangement behavior
    pub kind: LayoutKind,
}

impl Layout {
    /// Whether this layout repositions clients ([`LayoutKind::Float`] does not).
    pub fn arranges(&self) -> bool {
        self.kind != LayoutKind::Float
    }
}

/// A client to be arranged: its id and current border width.
pub(crate) type Tiled = (Xid, u32);

/// Arrange `tiled` into a master column and a stack column.
///
/// The first `nmaster` clients share the master column (full width when
/// there is no stack, `mfact` of it otherwise); the rest share the stack
/// column. Column heights are divided between the remaining slots at each
/// step, which distributes rounding remainders without any fractional math.
pub(crate) fn tile<F>(
    work: Rect,
    mfact: f32,
    nmaster: u32,
    tiled: &[Tiled],
    mut resize: F,
) where
    F: FnMut(Xid, Rect) -> Rect,
{
    let n = tiled.len() as u32;
    if n == 0 {
        return;
    }

    let mw = if n > nmaster {
        if nmaster > 0 {
            (work.w as f32 * mfact) as u32
        } else {
            0
        }
    } else {
        work.w
    };

    let (mut my, mut ty) = (0u32, 0u32);
    for (i, &(id, bw)) in tiled.iter().enumerate() {
        let i = i as u32;

        if i < nmaster {
            let h = (work.h - my) / (n.min(nmaster) - i);
            let r = resize(
                id,
                Rect::new(
                    work.x,
                    work.y + my as i32,
                    inner(mw, bw),
                    inner(h, bw),
                ),
            );
            if my + r.h + 2 * bw < work.h {
                my += r.h + 2 * bw;
            }
        } else {
            let h = (work.h - ty) / (n - i);
            let r = resize(
                id,
                Rect::new(
                    work.x + mw as i32,
                    work.y + ty as i32,
                    inner(work.w - mw, bw),
                    inner(h, bw),
                ),
            );
            if ty + r.h + 2 * bw < work.h {
                ty += r.h + 2 * bw;
            }
        }
    }
}

/// Give every tiled client the whole work area.
pub(crate) fn monocle<F>(work: Rect, tiled: &[Tiled], mut resize: F)
where
    F: FnMut(Xid, Rect) -> Rect,
{
    for &(id, bw) in tiled {
        resize(
            id,
            Rect::new(work.x, work.y, inner(work.w, bw), inner(work.h, bw)),
        );
    }
}

// Shrink an outer dimension by the border on both sides, never below a
// single pixel (a zero width master column with large borders would
// otherwise wrap around).
fn inner(outer: u32, bw: u32) -> u32 {
    (outer as i64 - 2 * bw as i64).max(1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    const WORK: Rect = Rect::new(0, 16, 1920, 1064);

    fn run_tile(mfact: f32, nmaster: u32, clients: &[Tiled]) -> Vec<(Xid, Rect)> {
        let mut placed = Vec::new();
        tile(WORK, mfact, nmaster, clients, |id, r| {
            placed.push((id, r));
            r
        });

        placed
    }

    #[test]
    fn single_client_fills_the_work_area() {
        let placed = run_tile(0.5, 1, &[(Xid(1), 1)]);

        assert_eq!(placed, vec![(Xid(1), Rect::new(0, 16, 1918, 1062))]);
    }

    #[test]
    fn two_clients_split_at_mfact() {
        let placed = run_tile(0.5, 1, &[(Xid(1), 1), (Xid(2), 1)]);

        assert_eq!(
            placed,
            vec![
                (Xid(1), Rect::new(0, 16, 958, 1062)),
                (Xid(2), Rect::new(960, 16, 958, 1062)),
            ]
        );
    }

    #[test]
    fn stack_heights_absorb_the_remainder() {
        let work = Rect::new(0, 0, 200, 100);
        let mut placed = Vec::new();
        tile(
            work,
            0.5,
            1,
            &[(Xid(1), 0), (Xid(2), 0), (Xid(3), 0), (Xid(4), 0)],
            |id, r| {
                placed.push((id, r));
                r
            },
        );

        let stack: Vec<_> = placed[1..].iter().map(|(_, r)| (r.y, r.h)).collect();
        assert_eq!(stack, vec![(0, 33), (33, 33), (66, 34)]);
        assert_eq!(placed[0].1, Rect::new(0, 0, 100, 100));
    }

    #[test_case(0, 0.5; "no master slots")]
    #[test_case(3, 0.7; "more masters than clients")]
    #[test]
    fn master_column_edge_cases(nmaster: u32, mfact: f32) {
        let placed = run_tile(mfact, nmaster, &[(Xid(1), 0), (Xid(2), 0)]);

        if nmaster == 0 {
            // everything stacks in a full width column at x = 0
            assert!(placed.iter().all(|(_, r)| r.x == 0 && r.w >= 1));
        } else {
            // all clients are masters sharing the full width
            assert!(placed.iter().all(|(_, r)| r.w == WORK.w));
            assert_eq!(placed[0].1.h + placed[1].1.h, WORK.h);
        }
    }

    #[test]
    fn committed_height_drives_the_offset() {
        let work = Rect::new(0, 0, 200, 100);
        let mut placed = Vec::new();
        // the first stack client only accepts half its slot
        tile(
            work,
            0.5,
            1,
            &[(Xid(1), 0), (Xid(2), 0), (Xid(3), 0)],
            |id, mut r| {
                if id == Xid(2) {
                    r.h /= 2;
                }
                placed.push((id, r));
                r
            },
        );

        // slot was 50, client kept 25, the next client starts at 25 and is
        // offered the remaining 75
        assert_eq!(placed[1].1, Rect::new(100, 0, 100, 25));
        assert_eq!(placed[2].1, Rect::new(100, 25, 100, 75));
    }

    #[test]
    fn monocle_gives_everyone_the_full_area() {
        let mut placed = Vec::new();
        monocle(WORK, &[(Xid(1), 1), (Xid(2), 2)], |id, r| {
            placed.push((id, r));
            r
        });

        assert_eq!(
            placed,
            vec![
                (Xid(1), Rect::new(0, 16, 1918, 1062)),
                (Xid(2), Rect::new(0, 16, 1916, 1060)),
            ]
        );
    }

    #[test]
    fn empty_tile_is_a_noop() {
        let placed = run_tile(0.5, 1, &[]);

        assert!(placed.is_empty());
    }
}
