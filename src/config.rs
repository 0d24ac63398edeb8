//! Runtime configuration: tags, rules, layouts, colors and bindings.
//!
//! Everything here is plain data constructed before the manager starts.
//! [`Config::default`] supplies the stock setup; a custom binary builds its
//! own value (or patches the default) and hands it to
//! [`WindowManager::new`][crate::manager::WindowManager::new].
use crate::{
    core::bindings::{Arg, ButtonBinding, ClickRegion, Command, KeyBinding, ModMask},
    layout::{Layout, LayoutKind},
    Color, Error, Result,
};
use x11::keysym::*;

/// Tag bitmasks must fit a 31 bit array.
pub const MAX_TAGS: usize = 31;

const TAGS: [&str; 9] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];
const _: () = assert!(TAGS.len() <= MAX_TAGS, "too many tags for the bitmask");

/// The primary modifier for the default bindings.
const MODKEY: ModMask = ModMask::MOD1;

/// Default terminal command.
pub const TERMCMD: &[&str] = &["st"];
/// Default launcher command.
pub const MENUCMD: &[&str] = &["dmenu_run"];

/// Foreground, background and border colors for one scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    /// Text color
    pub fg: Color,
    /// Fill color
    pub bg: Color,
    /// Window border color
    pub border: Color,
}

/// A window placement rule, matched by substring against the client's
/// class, instance and title at manage time.
///
/// All matching rules apply cumulatively: tag bits are OR-ed together while
/// the floating flag and monitor are overwritten by each match in turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Substring required in WM_CLASS class (None matches anything)
    pub class: Option<&'static str>,
    /// Substring required in WM_CLASS instance
    pub instance: Option<&'static str>,
    /// Substring required in the window title
    pub title: Option<&'static str>,
    /// Tag bits to assign (0 = keep the monitor's current tagset)
    pub tags: u32,
    /// Whether the client starts floating
    pub floating: bool,
    /// Monitor to place the client on (None = where it appeared)
    pub monitor: Option<usize>,
}

/// The full configuration consumed by the window manager.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tag names shown in the bar, at most [`MAX_TAGS`]
    pub tags: Vec<String>,
    /// Placement rules applied when a client is first managed
    pub rules: Vec<Rule>,
    /// Available layouts; index 0 is the startup layout, index 1 the
    /// startup previous-layout slot
    pub layouts: Vec<Layout>,
    /// Key binding table
    pub keys: Vec<KeyBinding>,
    /// Button binding table
    pub buttons: Vec<ButtonBinding>,
    /// Client border width in pixels
    pub border_width: u32,
    /// Edge snap distance for pointer moves, in pixels
    pub snap: u32,
    /// Whether bars start visible
    pub show_bar: bool,
    /// Whether bars sit at the top of the screen
    pub top_bar: bool,
    /// Default master area fraction
    pub mfact: f32,
    /// Default number of master area clients
    pub nmaster: u32,
    /// Respect client size hints in tiled resizals
    pub resize_hints: bool,
    /// Refuse to cycle focus away from a fullscreen client
    pub lock_fullscreen: bool,
    /// Core font used for the bar
    pub font: String,
    /// Scheme for unfocused elements
    pub normal: ColorScheme,
    /// Scheme for the focused client and active tags
    pub selected: ColorScheme,
}

impl Config {
    /// A bitmask with every configured tag set.
    pub fn tag_mask(&self) -> u32 {
        (1 << self.tags.len()) - 1
    }

    /// The two layout slots a fresh monitor starts with.
    pub(crate) fn initial_layouts(&self) -> [Layout; 2] {
        [self.layouts[0], self.layouts[1 % self.layouts.len()]]
    }

    /// Check the constraints the manager relies on. Called once at startup.
    pub fn validate(&self) -> Result<()> {
        if self.tags.is_empty() || self.tags.len() > MAX_TAGS {
            return Err(Error::InvalidConfig(format!(
                "between 1 and {MAX_TAGS} tags are required, got {}",
                self.tags.len()
            )));
        }

        if self.layouts.is_empty() {
            return Err(Error::InvalidConfig("at least one layout is required".into()));
        }

        if !(0.05..=0.95).contains(&self.mfact) {
            return Err(Error::InvalidConfig(format!(
                "mfact must be in [0.05, 0.95], got {}",
                self.mfact
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        let layouts = vec![
            Layout {
                symbol: "[]=",
                kind: LayoutKind::Tile,
            },
            Layout {
                symbol: "><>",
                kind: LayoutKind::Float,
            },
            Layout {
                symbol: "[M]",
                kind: LayoutKind::Monocle,
            },
        ];

        Self {
            tags: TAGS.iter().map(|s| s.to_string()).collect(),
            rules: vec![
                Rule {
                    class: Some("Gimp"),
                    instance: None,
                    title: None,
                    tags: 0,
                    floating: true,
                    monitor: None,
                },
                Rule {
                    class: Some("Firefox"),
                    instance: None,
                    title: None,
                    tags: 1 << 8,
                    floating: false,
                    monitor: None,
                },
            ],
            layouts,
            keys: default_keys(),
            buttons: default_buttons(),
            border_width: 1,
            snap: 32,
            show_bar: true,
            top_bar: true,
            mfact: 0.55,
            nmaster: 1,
            resize_hints: true,
            lock_fullscreen: true,
            font: "fixed".to_string(),
            normal: ColorScheme {
                fg: Color::from(0xbbbbbb),
                bg: Color::from(0x222222),
                border: Color::from(0x444444),
            },
            selected: ColorScheme {
                fg: Color::from(0xeeeeee),
                bg: Color::from(0x005577),
                border: Color::from(0x005577),
            },
        }
    }
}

fn default_keys() -> Vec<KeyBinding> {
    let key = |mods, keysym, cmd, arg| KeyBinding {
        mods,
        keysym,
        cmd,
        arg,
    };
    let shift = MODKEY | ModMask::SHIFT;
    let ctrl = MODKEY | ModMask::CONTROL;
    let ctrl_shift = ctrl | ModMask::SHIFT;

    let mut keys = vec![
        key(MODKEY, XK_p, Command::Spawn, Arg::Argv(MENUCMD)),
        key(shift, XK_Return, Command::Spawn, Arg::Argv(TERMCMD)),
        key(MODKEY, XK_b, Command::ToggleBar, Arg::None),
        key(MODKEY, XK_j, Command::FocusStack, Arg::Int(1)),
        key(MODKEY, XK_k, Command::FocusStack, Arg::Int(-1)),
        key(MODKEY, XK_i, Command::IncNMaster, Arg::Int(1)),
        key(MODKEY, XK_d, Command::IncNMaster, Arg::Int(-1)),
        key(MODKEY, XK_h, Command::SetMFact, Arg::Float(-0.05)),
        key(MODKEY, XK_l, Command::SetMFact, Arg::Float(0.05)),
        key(MODKEY, XK_Return, Command::Zoom, Arg::None),
        key(MODKEY, XK_Tab, Command::View, Arg::UInt(0)),
        key(shift, XK_c, Command::KillClient, Arg::None),
        key(MODKEY, XK_t, Command::SetLayout, Arg::Layout(Some(0))),
        key(MODKEY, XK_f, Command::SetLayout, Arg::Layout(Some(1))),
        key(MODKEY, XK_m, Command::SetLayout, Arg::Layout(Some(2))),
        key(MODKEY, XK_space, Command::SetLayout, Arg::Layout(None)),
        key(shift, XK_space, Command::ToggleFloating, Arg::None),
        key(MODKEY, XK_0, Command::View, Arg::UInt(!0)),
        key(shift, XK_0, Command::Tag, Arg::UInt(!0)),
        key(MODKEY, XK_comma, Command::FocusMon, Arg::Int(-1)),
        key(MODKEY, XK_period, Command::FocusMon, Arg::Int(1)),
        key(shift, XK_comma, Command::TagMon, Arg::Int(-1)),
        key(shift, XK_period, Command::TagMon, Arg::Int(1)),
        key(shift, XK_q, Command::Quit, Arg::None),
    ];

    let tag_keys = [XK_1, XK_2, XK_3, XK_4, XK_5, XK_6, XK_7, XK_8, XK_9];
    for (i, &keysym) in tag_keys.iter().take(TAGS.len()).enumerate() {
        let mask = 1 << i;
        keys.push(key(MODKEY, keysym, Command::View, Arg::UInt(mask)));
        keys.push(key(ctrl, keysym, Command::ToggleView, Arg::UInt(mask)));
        keys.push(key(shift, keysym, Command::Tag, Arg::UInt(mask)));
        keys.push(key(ctrl_shift, keysym, Command::ToggleTag, Arg::UInt(mask)));
    }

    keys
}

fn default_buttons() -> Vec<ButtonBinding> {
    let btn = |click, mods, button, cmd, arg| ButtonBinding {
        click,
        mods,
        button,
        cmd,
        arg,
    };

    vec![
        btn(
            ClickRegion::LtSymbol,
            ModMask::empty(),
            1,
            Command::SetLayout,
            Arg::Layout(None),
        ),
        btn(
            ClickRegion::LtSymbol,
            ModMask::empty(),
            3,
            Command::SetLayout,
            Arg::Layout(Some(2)),
        ),
        btn(ClickRegion::WinTitle, ModMask::empty(), 2, Command::Zoom, Arg::None),
        btn(
            ClickRegion::StatusText,
            ModMask::empty(),
            2,
            Command::Spawn,
            Arg::Argv(TERMCMD),
        ),
        btn(ClickRegion::ClientWin, MODKEY, 1, Command::MoveMouse, Arg::None),
        btn(
            ClickRegion::ClientWin,
            MODKEY,
            2,
            Command::ToggleFloating,
            Arg::None,
        ),
        btn(ClickRegion::ClientWin, MODKEY, 3, Command::ResizeMouse, Arg::None),
        btn(ClickRegion::TagBar, ModMask::empty(), 1, Command::View, Arg::UInt(0)),
        btn(
            ClickRegion::TagBar,
            ModMask::empty(),
            3,
            Command::ToggleView,
            Arg::UInt(0),
        ),
        btn(ClickRegion::TagBar, MODKEY, 1, Command::Tag, Arg::UInt(0)),
        btn(ClickRegion::TagBar, MODKEY, 3, Command::ToggleTag, Arg::UInt(0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn tag_mask_covers_all_tags() {
        let config = Config::default();

        assert_eq!(config.tag_mask(), 0b1_1111_1111);
    }

    #[test]
    fn mfact_bounds_are_enforced() {
        let mut config = Config::default();
        config.mfact = 0.96;

        assert!(config.validate().is_err());
    }

    #[test]
    fn at_most_31_tags() {
        let mut config = Config::default();
        config.tags = (0..32).map(|i| i.to_string()).collect();

        assert!(config.validate().is_err());
    }
}
