//! A scriptable stub connection for driving the manager end to end.
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};
use vesper::{
    bar::Draw,
    pure::geometry::{Point, Rect},
    x::{mock::StubXConn, WindowAttributes, XEvent},
    Color, Result, Xid,
};

/// Shorthand for building window ids in test bodies.
pub fn id(n: u32) -> Xid {
    Xid::from(n)
}

/// Shared recording of the X calls the tests assert on.
#[derive(Debug, Default)]
pub struct Recorder {
    pub moves: RefCell<Vec<(Xid, Point)>>,
    pub appended: RefCell<Vec<Xid>>,
    pub client_list: RefCell<Vec<Xid>>,
}

/// A stub backend with a pre-scripted event queue.
pub struct Conn {
    pub screens: Vec<Rect>,
    pub union: Rect,
    pub existing: Vec<Xid>,
    pub events: RefCell<VecDeque<XEvent>>,
    bar_seq: Cell<u32>,
    pub rec: Rc<Recorder>,
}

impl Conn {
    pub fn new(screens: Vec<Rect>) -> (Self, Rc<Recorder>) {
        let union = screens
            .iter()
            .fold(Rect::new(0, 0, 0, 0), |acc, r| {
                Rect::new(
                    acc.x.min(r.x),
                    acc.y.min(r.y),
                    (acc.right().max(r.right()) - acc.x.min(r.x)) as u32,
                    (acc.bottom().max(r.bottom()) - acc.y.min(r.y)) as u32,
                )
            });
        let rec = Rc::new(Recorder::default());
        let conn = Self {
            screens,
            union,
            existing: Vec::new(),
            events: RefCell::new(VecDeque::new()),
            bar_seq: Cell::new(0),
            rec: Rc::clone(&rec),
        };

        (conn, rec)
    }

    pub fn single_monitor() -> (Self, Rc<Recorder>) {
        Self::new(vec![Rect::new(0, 0, 1920, 1080)])
    }

    pub fn dual_monitor() -> (Self, Rc<Recorder>) {
        Self::new(vec![
            Rect::new(0, 0, 1920, 1080),
            Rect::new(1920, 0, 1920, 1080),
        ])
    }

    pub fn push_events(&self, events: impl IntoIterator<Item = XEvent>) {
        self.events.borrow_mut().extend(events);
    }
}

impl StubXConn for Conn {
    fn mock_screen_rect(&self) -> Rect {
        self.union
    }

    fn mock_screen_details(&self) -> Result<Vec<Rect>> {
        Ok(self.screens.clone())
    }

    fn mock_next_event(&self) -> Result<XEvent> {
        self.events
            .borrow_mut()
            .pop_front()
            .ok_or(vesper::Error::UnimplementedMock)
    }

    fn mock_existing_clients(&self) -> Result<Vec<Xid>> {
        Ok(self.existing.clone())
    }

    fn mock_get_window_attributes(&self, _: Xid) -> Result<WindowAttributes> {
        Ok(WindowAttributes {
            override_redirect: false,
            viewable: true,
        })
    }

    fn mock_create_bar_win(&self, _: Rect) -> Result<Xid> {
        let seq = self.bar_seq.get();
        self.bar_seq.set(seq + 1);

        Ok(Xid::from(900 + seq))
    }

    fn mock_move_client(&self, id: Xid, p: Point) -> Result<()> {
        self.rec.moves.borrow_mut().push((id, p));
        Ok(())
    }

    fn mock_append_client_list(&self, id: Xid) -> Result<()> {
        self.rec.appended.borrow_mut().push(id);
        Ok(())
    }

    fn mock_set_client_list(&self, ids: &[Xid]) -> Result<()> {
        *self.rec.client_list.borrow_mut() = ids.to_vec();
        Ok(())
    }
}

impl Draw for Conn {
    fn font_height(&self) -> u32 {
        14
    }

    fn text_extent(&mut self, s: &str) -> Result<u32> {
        Ok(6 * s.chars().count() as u32)
    }

    fn begin(&mut self, _: Xid, _: u32, _: u32) -> Result<()> {
        Ok(())
    }

    fn rect(&mut self, _: Rect, _: Color, _: bool) -> Result<()> {
        Ok(())
    }

    fn text(&mut self, _: i32, _: u32, _: u32, _: u32, _: &str, _: Color, _: Color) -> Result<()> {
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }
}
