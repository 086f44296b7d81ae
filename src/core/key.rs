//! Key identity table.
//!
//! Every keyboard key, mouse button and synthetic wheel direction is
//! identified by a stable numeric code in 0..=260. The codes follow the
//! Windows virtual-key layout with a few extras the hook layer synthesizes
//! (mouse buttons reuse low codes, the four wheel directions live at
//! 256..=259 and the numpad Enter at 260).

use std::fmt;
use std::str::FromStr;

use crate::core::ParseError;

/// Highest valid key code (inclusive).
pub const MAX_CODE: u16 = 260;

/// Number of distinct key codes; sizes the classifier's down-state tables.
pub const KEY_SPACE: usize = MAX_CODE as usize + 1;

/// A single key identity, backed by its stable numeric code.
///
/// `Key` is a closed set: construction goes through [`Key::from_code`] (or
/// the named constants) and never yields a code above [`MAX_CODE`]. Codes
/// without a defined display name still render deterministically as
/// `VirtualKey<N>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(u16);

impl Key {
    pub const MOUSE_LEFT: Key = Key(1);
    pub const MOUSE_RIGHT: Key = Key(2);
    pub const MOUSE_MIDDLE: Key = Key(4);
    pub const MOUSE_BACK: Key = Key(5);
    pub const MOUSE_FORWARD: Key = Key(6);

    pub const BACKSPACE: Key = Key(8);
    pub const TAB: Key = Key(9);
    pub const ENTER: Key = Key(13);

    pub const SHIFT: Key = Key(16);
    pub const CTRL: Key = Key(17);
    pub const ALT: Key = Key(18);

    pub const ESCAPE: Key = Key(27);
    pub const SPACE: Key = Key(32);

    pub const PAGE_UP: Key = Key(33);
    pub const PAGE_DOWN: Key = Key(34);
    pub const END: Key = Key(35);
    pub const HOME: Key = Key(36);
    pub const LEFT: Key = Key(37);
    pub const UP: Key = Key(38);
    pub const RIGHT: Key = Key(39);
    pub const DOWN: Key = Key(40);

    pub const A: Key = Key(65);
    pub const C: Key = Key(67);
    pub const H: Key = Key(72);
    pub const V: Key = Key(86);
    pub const Z: Key = Key(90);

    pub const LWIN: Key = Key(91);
    pub const RWIN: Key = Key(92);

    pub const NUMPAD0: Key = Key(96);
    pub const NUM_DIVIDE: Key = Key(111);
    pub const F1: Key = Key(112);
    pub const F24: Key = Key(135);

    pub const LSHIFT: Key = Key(160);
    pub const RSHIFT: Key = Key(161);
    pub const LCTRL: Key = Key(162);
    pub const RCTRL: Key = Key(163);
    pub const LALT: Key = Key(164);
    pub const RALT: Key = Key(165);

    pub const MOUSE_WHEEL_UP: Key = Key(256);
    pub const MOUSE_WHEEL_DOWN: Key = Key(257);
    pub const MOUSE_WHEEL_LEFT: Key = Key(258);
    pub const MOUSE_WHEEL_RIGHT: Key = Key(259);
    pub const NUM_ENTER: Key = Key(260);

    /// Construct a key from its numeric code, rejecting out-of-range codes.
    pub fn from_code(code: u16) -> Option<Key> {
        (code <= MAX_CODE).then_some(Key(code))
    }

    /// The stable numeric code. Injective inverse of [`Key::from_code`].
    pub fn code(self) -> u16 {
        self.0
    }

    /// One of the 11 modifier identities (Win/Ctrl/Alt/Shift, left/right
    /// and the ambiguous generic variant each).
    pub fn is_modifier_key(self) -> bool {
        matches!(self.0, 16..=18 | 91 | 92 | 160..=165)
    }

    pub fn is_mouse_button(self) -> bool {
        matches!(self.0, 1 | 2 | 4..=6)
    }

    pub fn is_mouse_wheel(self) -> bool {
        matches!(self.0, 256..=259)
    }

    pub fn is_function_key(self) -> bool {
        matches!(self.0, 112..=135)
    }

    pub fn is_numpad_key(self) -> bool {
        matches!(self.0, 96..=111)
    }

    pub fn is_arrow_key(self) -> bool {
        matches!(self.0, 37..=40)
    }

    pub fn is_home_end_page_key(self) -> bool {
        matches!(self.0, 33..=36)
    }

    pub fn is_navigation_key(self) -> bool {
        self.is_arrow_key() || self.is_home_end_page_key()
    }

    /// Browser, volume, media transport and launcher keys.
    pub fn is_media_key(self) -> bool {
        matches!(self.0, 166..=183)
    }

    /// Letters, digits and the OEM punctuation keys.
    pub fn is_character_key(self) -> bool {
        matches!(self.0, 48..=57 | 65..=90 | 186..=192 | 219..=223 | 226)
    }

    /// The report bucket this key falls into. Buckets are checked in a fixed
    /// order so overlapping predicates resolve deterministically.
    pub fn class(self) -> KeyClass {
        if self.is_mouse_button() || self.is_mouse_wheel() {
            KeyClass::Mouse
        } else if self.is_modifier_key() {
            KeyClass::Modifier
        } else if self.is_navigation_key() {
            KeyClass::Navigation
        } else if self.is_function_key() {
            KeyClass::Function
        } else if self.is_numpad_key() {
            KeyClass::Numpad
        } else if self.is_media_key() {
            KeyClass::Media
        } else if self.is_character_key() {
            KeyClass::Character
        } else {
            KeyClass::Other
        }
    }

    /// Display name, if this code has one defined.
    fn static_name(self) -> Option<&'static str> {
        let name = match self.0 {
            1 => "MouseLeft",
            2 => "MouseRight",
            3 => "Break",
            4 => "MouseMiddle",
            5 => "MouseBack",
            6 => "MouseForward",
            8 => "Backspace",
            9 => "Tab",
            10 => "LineFeed",
            12 => "Clear",
            13 => "Enter",
            16 => "Shift",
            17 => "Ctrl",
            18 => "Alt",
            19 => "Pause",
            20 => "CapsLock",
            21 => "KanaMode",
            23 => "JunjaMode",
            24 => "FinalMode",
            25 => "KanjiMode",
            27 => "Escape",
            28 => "IMEConvert",
            29 => "IMENonconvert",
            30 => "IMEAccept",
            31 => "IMEModeChange",
            32 => "Space",
            33 => "PageUp",
            34 => "PageDown",
            35 => "End",
            36 => "Home",
            37 => "Left",
            38 => "Up",
            39 => "Right",
            40 => "Down",
            41 => "Select",
            42 => "Print",
            43 => "Execute",
            44 => "PrintScreen",
            45 => "Insert",
            46 => "Delete",
            47 => "Help",
            48 => "D0",
            49 => "D1",
            50 => "D2",
            51 => "D3",
            52 => "D4",
            53 => "D5",
            54 => "D6",
            55 => "D7",
            56 => "D8",
            57 => "D9",
            65 => "A",
            66 => "B",
            67 => "C",
            68 => "D",
            69 => "E",
            70 => "F",
            71 => "G",
            72 => "H",
            73 => "I",
            74 => "J",
            75 => "K",
            76 => "L",
            77 => "M",
            78 => "N",
            79 => "O",
            80 => "P",
            81 => "Q",
            82 => "R",
            83 => "S",
            84 => "T",
            85 => "U",
            86 => "V",
            87 => "W",
            88 => "X",
            89 => "Y",
            90 => "Z",
            91 => "LWin",
            92 => "RWin",
            93 => "Apps",
            95 => "Sleep",
            96 => "NumPad0",
            97 => "NumPad1",
            98 => "NumPad2",
            99 => "NumPad3",
            100 => "NumPad4",
            101 => "NumPad5",
            102 => "NumPad6",
            103 => "NumPad7",
            104 => "NumPad8",
            105 => "NumPad9",
            106 => "NumMultiply",
            107 => "NumAdd",
            108 => "NumSeparator",
            109 => "NumSubtract",
            110 => "NumDecimal",
            111 => "NumDivide",
            112 => "F1",
            113 => "F2",
            114 => "F3",
            115 => "F4",
            116 => "F5",
            117 => "F6",
            118 => "F7",
            119 => "F8",
            120 => "F9",
            121 => "F10",
            122 => "F11",
            123 => "F12",
            124 => "F13",
            125 => "F14",
            126 => "F15",
            127 => "F16",
            128 => "F17",
            129 => "F18",
            130 => "F19",
            131 => "F20",
            132 => "F21",
            133 => "F22",
            134 => "F23",
            135 => "F24",
            144 => "NumLock",
            145 => "ScrollLock",
            160 => "LShift",
            161 => "RShift",
            162 => "LCtrl",
            163 => "RCtrl",
            164 => "LAlt",
            165 => "RAlt",
            166 => "BrowserBack",
            167 => "BrowserForward",
            168 => "BrowserRefresh",
            169 => "BrowserStop",
            170 => "BrowserSearch",
            171 => "BrowserFavorites",
            172 => "BrowserHome",
            173 => "VolumeMute",
            174 => "VolumeDown",
            175 => "VolumeUp",
            176 => "MediaNextTrack",
            177 => "MediaPreviousTrack",
            178 => "MediaStop",
            179 => "MediaPlayPause",
            180 => "LaunchMail",
            181 => "LaunchMedia",
            182 => "LaunchApplication1",
            183 => "LaunchCalculator",
            186 => "OemSemicolon",
            187 => "OemPlus",
            188 => "OemComma",
            189 => "OemMinus",
            190 => "OemPeriod",
            191 => "OemQuestion",
            192 => "OemTilde",
            219 => "OemOpenBracket",
            220 => "OemPipe",
            221 => "OemCloseBracket",
            222 => "OemQuotes",
            223 => "OemBacktick",
            226 => "OemBackslash",
            229 => "ProcessKey",
            231 => "Packet",
            246 => "Attn",
            247 => "Crsel",
            248 => "Exsel",
            249 => "EraseEof",
            250 => "Play",
            251 => "Zoom",
            252 => "NoName",
            253 => "Pa1",
            254 => "OemClear",
            256 => "MouseWheelUp",
            257 => "MouseWheelDown",
            258 => "MouseWheelLeft",
            259 => "MouseWheelRight",
            260 => "NumEnter",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.static_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "VirtualKey{}", self.0),
        }
    }
}

/// Parses the numeric serialization form (the decimal key code).
impl FromStr for Key {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u16>()
            .ok()
            .and_then(Key::from_code)
            .ok_or_else(|| ParseError::BadKey(s.to_string()))
    }
}

/// Report bucket for aggregate per-class usage percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyClass {
    Mouse,
    Modifier,
    Navigation,
    Function,
    Numpad,
    Media,
    Character,
    Other,
}

impl KeyClass {
    /// All buckets, in report order.
    pub const ALL: [KeyClass; 8] = [
        KeyClass::Mouse,
        KeyClass::Modifier,
        KeyClass::Navigation,
        KeyClass::Function,
        KeyClass::Numpad,
        KeyClass::Media,
        KeyClass::Character,
        KeyClass::Other,
    ];
}

impl fmt::Display for KeyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyClass::Mouse => "Mouse",
            KeyClass::Modifier => "Modifier",
            KeyClass::Navigation => "Navigation",
            KeyClass::Function => "Function",
            KeyClass::Numpad => "Numpad",
            KeyClass::Media => "Media",
            KeyClass::Character => "Character",
            KeyClass::Other => "Other",
        };
        f.write_str(name)
    }
}
