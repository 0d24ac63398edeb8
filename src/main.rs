//! vesper: a dynamic tiling window manager for X11
use std::{env, process};
use tracing_subscriber::{self, EnvFilter};
use vesper::{util, x11rb_conn::X11rbConn, Config, WindowManager};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() == 2 && args[1] == "-v" {
        println!("vesper-{VERSION}");
        process::exit(0);
    } else if args.len() > 1 {
        eprintln!("usage: vesper [-v]");
        process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("vesper: {e}");
        process::exit(1);
    }
}

fn run() -> vesper::Result<()> {
    util::init_signals()?;

    let config = Config::default();
    let conn = X11rbConn::new(&config.font)?;
    let mut wm = WindowManager::new(conn, config)?;

    wm.run()
}
