//! Typed views of the client properties the manager reads and writes.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The ICCCM WM_STATE value for a client window.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WmState {
    /// The window is not mapped and should not appear in pagers
    Withdrawn,
    /// The window is mapped and visible to the user
    Normal,
    /// The window is iconified / hidden
    Iconic,
}

impl From<WmState> for u32 {
    fn from(s: WmState) -> u32 {
        match s {
            WmState::Withdrawn => 0,
            WmState::Normal => 1,
            WmState::Iconic => 3,
        }
    }
}

impl TryFrom<u32> for WmState {
    type Error = u32;

    fn try_from(raw: u32) -> std::result::Result<Self, u32> {
        match raw {
            0 => Ok(WmState::Withdrawn),
            1 => Ok(WmState::Normal),
            3 => Ok(WmState::Iconic),
            other => Err(other),
        }
    }
}

/// The subset of window attributes the manager inspects before adoption.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowAttributes {
    /// Windows with override-redirect set are never managed
    pub override_redirect: bool,
    /// Whether the window is currently mapped and viewable
    pub viewable: bool,
}

/// The ICCCM WM_HINTS fields the manager reacts to.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Hints {
    /// The urgency flag: the client wants user attention
    pub urgent: bool,
    /// The input model hint: `Some(false)` means the client never wants
    /// real input focus, `None` means the hint was not supplied
    pub input: Option<bool>,
}
