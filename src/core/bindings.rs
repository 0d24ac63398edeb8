//! User facing key and button bindings and the commands they trigger.
use bitflags::bitflags;

bitflags! {
    /// X modifier key state, bit compatible with the wire encoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ModMask: u16 {
        const SHIFT = 1 << 0;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1 = 1 << 3;
        const MOD2 = 1 << 4;
        const MOD3 = 1 << 5;
        const MOD4 = 1 << 6;
        const MOD5 = 1 << 7;
    }
}

impl ModMask {
    /// Strip CapsLock and the runtime discovered NumLock modifier so that
    /// bindings fire regardless of lock state. Both the raw event state and
    /// the configured binding mask are cleaned before comparison.
    pub fn clean(self, numlock: ModMask) -> ModMask {
        self & !(numlock | ModMask::LOCK)
            & (ModMask::SHIFT
                | ModMask::CONTROL
                | ModMask::MOD1
                | ModMask::MOD2
                | ModMask::MOD3
                | ModMask::MOD4
                | ModMask::MOD5)
    }
}

/// The parameter passed to a [`Command`] when it runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg {
    /// No parameter
    None,
    /// A signed amount or direction
    Int(i32),
    /// A tag bitmask
    UInt(u32),
    /// A master factor adjustment
    Float(f32),
    /// An index into the configured layouts; `None` flips back to the
    /// previous layout slot
    Layout(Option<usize>),
    /// A command line for [`Command::Spawn`]
    Argv(&'static [&'static str]),
}

/// Every verb a binding can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch the active tagset (0 = toggle to previous)
    View,
    /// XOR bits into the active tagset
    ToggleView,
    /// Move the selected client to a tag set
    Tag,
    /// XOR bits into the selected client's tags
    ToggleTag,
    /// Cycle focus through visible clients
    FocusStack,
    /// Adjust the number of master area clients
    IncNMaster,
    /// Adjust the master area fraction
    SetMFact,
    /// Move the selected client to the master slot
    Zoom,
    /// Swap the active layout slot
    SetLayout,
    /// Show or hide the bar
    ToggleBar,
    /// Toggle the selected client between tiled and floating
    ToggleFloating,
    /// Drag the selected client with the pointer
    MoveMouse,
    /// Resize the selected client with the pointer
    ResizeMouse,
    /// Move focus to another monitor
    FocusMon,
    /// Send the selected client to another monitor
    TagMon,
    /// Politely ask the selected client to close, or force it
    KillClient,
    /// Stop the event loop
    Quit,
    /// Launch an external command
    Spawn,
}

/// Where on the screen a button press landed, for [`ButtonBinding`] matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickRegion {
    /// The tag indicators at the left of the bar
    TagBar,
    /// The layout symbol in the bar
    LtSymbol,
    /// The status text at the right of the bar
    StatusText,
    /// The window title area of the bar
    WinTitle,
    /// A managed client window
    ClientWin,
    /// The root window
    RootWin,
}

/// One row of the key binding table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyBinding {
    /// Modifiers that must be held (compared after cleaning)
    pub mods: ModMask,
    /// The keysym to match
    pub keysym: u32,
    /// The command to run
    pub cmd: Command,
    /// Its parameter
    pub arg: Arg,
}

/// One row of the button binding table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonBinding {
    /// The click region this binding applies to
    pub click: ClickRegion,
    /// Modifiers that must be held (compared after cleaning)
    pub mods: ModMask,
    /// The pointer button (1 = left, 2 = middle, 3 = right)
    pub button: u8,
    /// The command to run
    pub cmd: Command,
    /// Its parameter
    pub arg: Arg,
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    const NUMLOCK: ModMask = ModMask::MOD2;

    #[test_case(ModMask::MOD4, ModMask::MOD4; "plain modifier untouched")]
    #[test_case(ModMask::MOD4.union(ModMask::LOCK), ModMask::MOD4; "capslock stripped")]
    #[test_case(ModMask::MOD4.union(NUMLOCK), ModMask::MOD4; "numlock stripped")]
    #[test_case(
        ModMask::MOD4.union(NUMLOCK).union(ModMask::LOCK),
        ModMask::MOD4;
        "both locks stripped"
    )]
    #[test_case(
        ModMask::MOD4.union(ModMask::SHIFT),
        ModMask::MOD4.union(ModMask::SHIFT);
        "combined modifiers kept"
    )]
    #[test]
    fn clean_mask(raw: ModMask, expected: ModMask) {
        assert_eq!(raw.clean(NUMLOCK), expected);
    }

    #[test]
    fn cleaned_masks_compare_equal_regardless_of_locks() {
        let bound = ModMask::MOD1;
        let pressed = ModMask::MOD1 | ModMask::LOCK | NUMLOCK;

        assert_eq!(bound.clean(NUMLOCK), pressed.clean(NUMLOCK));
    }
}
