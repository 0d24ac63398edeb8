//! End to end scenarios driven through the public event and command API
//! against a scripted stub connection.
use vesper::{
    core::bindings::ModMask,
    pure::geometry::{Point, Rect},
    x::event::{ButtonEvent, KeyPressEvent, MotionEvent, PointerChange},
    x::XEvent,
    Arg, Command, Config, WindowManager, Xid,
};
use x11::keysym::XK_q;

mod common;
use common::{id, Conn};

fn map(wm: &mut WindowManager<Conn>, win: u32) {
    wm.handle_xevent(XEvent::MapRequest(Xid::from(win))).unwrap();
}

#[test]
fn startup_tiles_the_first_window_against_the_bar() {
    let (conn, _) = Conn::single_monitor();
    let mut wm = WindowManager::new(conn, Config::default()).unwrap();

    map(&mut wm, 100);

    let cs = wm.client_set();
    assert_eq!(cs.selected(), Some(id(100)));
    assert_eq!(
        cs.client(id(100)).unwrap().rect(),
        Rect::new(0, 16, 1918, 1062)
    );
    assert_eq!(cs.sel_monitor().active_tagset(), 1);
}

#[test]
fn hidden_clients_are_parked_at_twice_their_width() {
    let (conn, rec) = Conn::single_monitor();
    let mut wm = WindowManager::new(conn, Config::default()).unwrap();
    map(&mut wm, 100);

    // move the client to tag 2 while viewing tag 1
    wm.run_command(Command::Tag, Arg::UInt(0b10)).unwrap();

    assert!(!wm.client_set().is_visible(id(100)));
    // tiled to 1918 + 2 * 1px border = 1920 wide, so parked at -3840
    let parked = rec
        .moves
        .borrow()
        .iter()
        .any(|&(win, p)| win == id(100) && p.x == -3840);
    assert!(parked, "hidden client was not moved off screen");
}

#[test]
fn dragging_a_client_onto_another_monitor_migrates_it() {
    let (conn, _) = Conn::dual_monitor();
    conn.push_events([
        XEvent::Motion(MotionEvent {
            id: id(1),
            abs: Point::new(2400, 300),
            time: 100,
        }),
        XEvent::ButtonRelease(ButtonEvent {
            id: id(1),
            button: 1,
            mods: ModMask::empty(),
            abs: Point::new(2400, 300),
        }),
    ]);
    let mut wm = WindowManager::new(conn, Config::default()).unwrap();
    map(&mut wm, 100);
    assert_eq!(wm.client_set().sel_monitor_index(), 0);

    wm.run_command(Command::MoveMouse, Arg::None).unwrap();

    let c = wm.client_set().client(id(100)).unwrap();
    assert!(c.is_floating(), "a large drag should toggle floating");
    assert_eq!(c.monitor_index(), 1);
    assert_eq!(c.tags(), wm.client_set().monitors()[1].active_tagset());
    assert_eq!(wm.client_set().sel_monitor_index(), 1);
    assert_eq!(wm.client_set().selected(), Some(id(100)));
}

#[test]
fn pointer_resize_commits_the_dragged_size() {
    let (conn, _) = Conn::single_monitor();
    conn.push_events([
        XEvent::Motion(MotionEvent {
            id: id(1),
            abs: Point::new(400, 316),
            time: 100,
        }),
        XEvent::ButtonRelease(ButtonEvent {
            id: id(1),
            button: 3,
            mods: ModMask::empty(),
            abs: Point::new(400, 316),
        }),
    ]);
    let mut wm = WindowManager::new(conn, Config::default()).unwrap();
    map(&mut wm, 100);
    wm.run_command(Command::ToggleFloating, Arg::None).unwrap();

    wm.run_command(Command::ResizeMouse, Arg::None).unwrap();

    // nw = 400 - x(0) - 2 * bw(1) + 1, nh likewise from y = 16
    let c = wm.client_set().client(id(100)).unwrap();
    assert_eq!(c.rect(), Rect::new(0, 16, 399, 299));
}

#[test]
fn entering_a_window_on_another_monitor_switches_selection() {
    let (conn, _) = Conn::dual_monitor();
    let mut wm = WindowManager::new(conn, Config::default()).unwrap();
    map(&mut wm, 100);
    wm.run_command(Command::FocusMon, Arg::Int(1)).unwrap();
    map(&mut wm, 200); // lands on the selected monitor 1
    wm.run_command(Command::FocusMon, Arg::Int(-1)).unwrap();
    assert_eq!(wm.client_set().selected(), Some(id(100)));

    wm.handle_xevent(XEvent::Enter(PointerChange {
        id: id(200),
        abs: Point::new(2000, 500),
    }))
    .unwrap();

    assert_eq!(wm.client_set().sel_monitor_index(), 1);
    assert_eq!(wm.client_set().selected(), Some(id(200)));
}

#[test]
fn tag_mon_sends_the_selection_across() {
    let (conn, _) = Conn::dual_monitor();
    let mut wm = WindowManager::new(conn, Config::default()).unwrap();
    map(&mut wm, 100);

    wm.run_command(Command::TagMon, Arg::Int(1)).unwrap();

    let c = wm.client_set().client(id(100)).unwrap();
    assert_eq!(c.monitor_index(), 1);
    assert!(wm.client_set().monitors()[0].clients().is_empty());
    assert_eq!(wm.client_set().monitors()[1].clients(), &[id(100)]);
}

#[test]
fn clicking_a_tag_in_the_bar_views_it() {
    let (conn, _) = Conn::single_monitor();
    let mut wm = WindowManager::new(conn, Config::default()).unwrap();

    // tag cells are 20px wide with the stub metrics; x = 25 is tag 2
    wm.handle_xevent(XEvent::ButtonPress(ButtonEvent {
        id: id(900),
        button: 1,
        mods: ModMask::empty(),
        abs: Point::new(25, 8),
    }))
    .unwrap();

    assert_eq!(wm.client_set().sel_monitor().active_tagset(), 0b10);
}

#[test]
fn run_adopts_existing_windows_and_quits_cleanly() {
    let (mut conn, rec) = Conn::single_monitor();
    conn.existing = vec![id(10), id(11)];
    conn.push_events([XEvent::KeyPress(KeyPressEvent {
        keysym: XK_q,
        mods: ModMask::MOD1 | ModMask::SHIFT,
    })]);
    let mut wm = WindowManager::new(conn, Config::default()).unwrap();

    wm.run().unwrap();

    // both pre-existing windows were adopted during the scan
    assert_eq!(&*rec.appended.borrow(), &[id(10), id(11)]);
    // and released again by cleanup on the way out
    assert!(wm.client_set().is_empty());
    assert!(!wm.is_running());
}

#[test]
fn client_list_reflects_manage_and_unmanage() {
    let (conn, rec) = Conn::single_monitor();
    let mut wm = WindowManager::new(conn, Config::default()).unwrap();
    map(&mut wm, 100);
    map(&mut wm, 101);
    assert_eq!(&*rec.appended.borrow(), &[id(100), id(101)]);

    wm.handle_xevent(XEvent::Destroy(id(100))).unwrap();

    assert_eq!(&*rec.client_list.borrow(), &[id(101)]);
}
