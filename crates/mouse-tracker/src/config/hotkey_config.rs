use std::fmt;

use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use serde::{Deserialize, Serialize};

/// Global hotkeys the recorder can toggle on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HotkeyPreset {
    /// F9
    #[serde(rename = "F9")]
    F9,
    /// F10
    #[serde(rename = "F10")]
    F10,
    /// F11
    #[serde(rename = "F11")]
    F11,
    /// F12
    #[serde(rename = "F12")]
    F12,
    /// CTRL+R
    #[default]
    #[serde(rename = "Ctrl+R")]
    CtrlR,
    /// CTRL+SHIFT+R
    #[serde(rename = "Ctrl+Shift+R")]
    CtrlShiftR,
}

impl HotkeyPreset {
    /// Every preset, in menu order.
    pub const ALL: [HotkeyPreset; 6] = [
        HotkeyPreset::F9,
        HotkeyPreset::F10,
        HotkeyPreset::F11,
        HotkeyPreset::F12,
        HotkeyPreset::CtrlR,
        HotkeyPreset::CtrlShiftR,
    ];

    /// Name as written in the configuration file.
    pub fn label(self) -> &'static str {
        match self {
            HotkeyPreset::F9 => "F9",
            HotkeyPreset::F10 => "F10",
            HotkeyPreset::F11 => "F11",
            HotkeyPreset::F12 => "F12",
            HotkeyPreset::CtrlR => "Ctrl+R",
            HotkeyPreset::CtrlShiftR => "Ctrl+Shift+R",
        }
    }

    /// The `global-hotkey` binding for this preset.
    pub fn hotkey(self) -> HotKey {
        match self {
            HotkeyPreset::F9 => HotKey::new(None, Code::F9),
            HotkeyPreset::F10 => HotKey::new(None, Code::F10),
            HotkeyPreset::F11 => HotKey::new(None, Code::F11),
            HotkeyPreset::F12 => HotKey::new(None, Code::F12),
            HotkeyPreset::CtrlR => HotKey::new(Some(Modifiers::CONTROL), Code::KeyR),
            HotkeyPreset::CtrlShiftR => {
                HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyR)
            }
        }
    }
}

impl fmt::Display for HotkeyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `[hotkey]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyConfig {
    /// Start/stop toggle.
    #[serde(default)]
    pub preset: HotkeyPreset,
}
