//! vesper: a dynamic tiling window manager for X11.
//!
//! vesper manages windows the way dwm does: clients are tagged rather than
//! placed on workspaces, each monitor arranges its visible clients with a
//! dynamic layout (tile, monocle or floating) and a small status bar shows
//! the tag state, the layout symbol, the focused window title and a status
//! string read from the root window name.
//!
//! The crate is split into three layers:
//!   * pure state and geometry (no X calls at all) under [`pure`] and [`core`]
//!   * an [`x::XConn`] trait describing everything the manager needs from the
//!     windowing system, plus a [`Draw`][bar::Draw] trait for the bar surface
//!   * an [x11rb][x11rb_conn] backed implementation of both
//!
//! The [`manager::WindowManager`] drives the event loop over any `XConn`,
//! which keeps every interesting code path testable against the stub
//! connection in [`x::mock`].
use std::ops::Deref;

pub mod bar;
pub mod config;
pub mod core;
pub mod layout;
pub mod manager;
pub mod pure;
pub mod util;
pub mod x;
pub mod x11rb_conn;

#[doc(inline)]
pub use crate::core::bindings::{Arg, ButtonBinding, ClickRegion, Command, KeyBinding, ModMask};
#[doc(inline)]
pub use config::Config;
#[doc(inline)]
pub use manager::WindowManager;

/// An X11 ID for a given resource
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Xid(pub(crate) u32);

impl std::fmt::Display for Xid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for Xid {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u32> for Xid {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A simple RGB color for borders and bar rendering, stored as `0xRRGGBB`.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color(u32);

impl Color {
    /// The raw `0xRRGGBB` pixel value for this color.
    pub fn rgb_u32(&self) -> u32 {
        self.0
    }

    /// Parse a color from a `#RRGGBB` hex string.
    pub fn try_from_hex(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix('#')
            .filter(|d| d.len() == 6)
            .ok_or_else(|| Error::InvalidColor(s.to_string()))?;

        u32::from_str_radix(digits, 16)
            .map(Color)
            .map_err(|_| Error::InvalidColor(s.to_string()))
    }
}

impl From<u32> for Color {
    fn from(rgb: u32) -> Self {
        Self(rgb & 0x00ff_ffff)
    }
}

/// Error variants from the core window manager logic and its backends.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Something went wrong using the x11rb backend
    #[error(transparent)]
    Backend(#[from] x11rb_conn::BackendError),

    /// A color string in the config was not of the form `#RRGGBB`
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// The user provided configuration failed validation
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// An IO error was encountered (typically while spawning a subprocess)
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A system call made through nix failed
    #[error(transparent)]
    Nix(#[from] nix::errno::Errno),

    /// There were no screens available from the multi-head backend
    #[error("the X server did not report any usable screens")]
    NoScreens,

    /// None of the configured fonts could be loaded for the bar
    #[error("unable to load font: {0}")]
    NoFont(String),

    /// Another window manager already owns substructure redirection on root
    #[error("another window manager is already running")]
    OtherWmRunning,

    /// Parsing an [Atom][crate::x::Atom] from a str failed
    #[error(transparent)]
    Strum(#[from] strum::ParseError),

    /// An attempt was made to reference a client that is not currently managed
    #[error("{0} is not a known client")]
    UnknownClient(Xid),

    /// A stubbed method was called without a test implementation being provided
    #[error("mock method not implemented")]
    UnimplementedMock,
}

/// Result type for fallible operations in this crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("#000000", Some(0x000000); "black")]
    #[test_case("#ffffff", Some(0xffffff); "white")]
    #[test_case("#1a2B3c", Some(0x1a2b3c); "mixed case")]
    #[test_case("123456", None; "missing hash")]
    #[test_case("#12345", None; "too short")]
    #[test_case("#zzzzzz", None; "not hex")]
    #[test]
    fn color_from_hex(s: &str, expected: Option<u32>) {
        let res = Color::try_from_hex(s).ok().map(|c| c.rgb_u32());

        assert_eq!(res, expected);
    }
}
