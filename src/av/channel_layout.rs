//! Audio channel layouts.
//!
//! A [`ChannelLayout`] is a bitmask of speaker positions. The number of
//! channels is the number of bits set.

use std::fmt;
use std::str::FromStr;

/// Bitmask of speaker positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelLayout(u64);

// Speaker position bits.
const FL: u64 = 0x1;
const FR: u64 = 0x2;
const FC: u64 = 0x4;
const LFE: u64 = 0x8;
const BL: u64 = 0x10;
const BR: u64 = 0x20;
const FLC: u64 = 0x40;
const FRC: u64 = 0x80;
const BC: u64 = 0x100;
const SL: u64 = 0x200;
const SR: u64 = 0x400;
const TC: u64 = 0x800;
const TFL: u64 = 0x1000;
const TFC: u64 = 0x2000;
const TFR: u64 = 0x4000;
const TBL: u64 = 0x8000;
const TBC: u64 = 0x10000;
const TBR: u64 = 0x20000;
const DL: u64 = 0x2000_0000;
const DR: u64 = 0x4000_0000;

const CHANNEL_NAMES: [(&str, u64); 20] = [
    ("FL", FL),
    ("FR", FR),
    ("FC", FC),
    ("LFE", LFE),
    ("BL", BL),
    ("BR", BR),
    ("FLC", FLC),
    ("FRC", FRC),
    ("BC", BC),
    ("SL", SL),
    ("SR", SR),
    ("TC", TC),
    ("TFL", TFL),
    ("TFC", TFC),
    ("TFR", TFR),
    ("TBL", TBL),
    ("TBC", TBC),
    ("TBR", TBR),
    ("DL", DL),
    ("DR", DR),
];

impl ChannelLayout {
    /// Front center
    pub const MONO: Self = Self(FC);
    /// Front left + front right
    pub const STEREO: Self = Self(FL | FR);
    /// Stereo + LFE
    pub const SURROUND_2_1: Self = Self(FL | FR | LFE);
    /// Stereo + front center
    pub const SURROUND_3_0: Self = Self(FL | FR | FC);
    /// Stereo + back center
    pub const SURROUND_3_0_BACK: Self = Self(FL | FR | BC);
    /// 3.0 + LFE
    pub const SURROUND_3_1: Self = Self(FL | FR | FC | LFE);
    /// 3.0 + back center
    pub const SURROUND_4_0: Self = Self(FL | FR | FC | BC);
    /// 4.0 + LFE
    pub const SURROUND_4_1: Self = Self(FL | FR | FC | BC | LFE);
    /// Stereo + back left/right
    pub const QUAD: Self = Self(FL | FR | BL | BR);
    /// Stereo + side left/right
    pub const QUAD_SIDE: Self = Self(FL | FR | SL | SR);
    /// 3.0 + back left/right
    pub const SURROUND_5_0_BACK: Self = Self(FL | FR | FC | BL | BR);
    /// 3.0 + side left/right
    pub const SURROUND_5_0: Self = Self(FL | FR | FC | SL | SR);
    /// 5.0 (back) + LFE
    pub const SURROUND_5_1_BACK: Self = Self(FL | FR | FC | BL | BR | LFE);
    /// 5.0 (side) + LFE
    pub const SURROUND_5_1: Self = Self(FL | FR | FC | SL | SR | LFE);
    /// 5.0 (side) + back center
    pub const SURROUND_6_0: Self = Self(FL | FR | FC | SL | SR | BC);
    /// 5.1 (side) + back center
    pub const SURROUND_6_1: Self = Self(FL | FR | FC | SL | SR | BC | LFE);
    /// 5.0 (back) + side left/right
    pub const SURROUND_7_0: Self = Self(FL | FR | FC | BL | BR | SL | SR);
    /// 5.1 (back) + side left/right
    pub const SURROUND_7_1: Self = Self(FL | FR | FC | BL | BR | SL | SR | LFE);
    /// 5.1 (back) + front left/right of center
    pub const SURROUND_7_1_WIDE: Self = Self(FL | FR | FC | BL | BR | FLC | FRC | LFE);
    /// Stereo downmix
    pub const DOWNMIX: Self = Self(DL | DR);

    const NAMED: [(&'static str, ChannelLayout); 20] = [
        ("mono", Self::MONO),
        ("stereo", Self::STEREO),
        ("2.1", Self::SURROUND_2_1),
        ("3.0", Self::SURROUND_3_0),
        ("3.0(back)", Self::SURROUND_3_0_BACK),
        ("3.1", Self::SURROUND_3_1),
        ("4.0", Self::SURROUND_4_0),
        ("4.1", Self::SURROUND_4_1),
        ("quad", Self::QUAD),
        ("quad(side)", Self::QUAD_SIDE),
        ("5.0", Self::SURROUND_5_0_BACK),
        ("5.0(side)", Self::SURROUND_5_0),
        ("5.1", Self::SURROUND_5_1_BACK),
        ("5.1(side)", Self::SURROUND_5_1),
        ("6.0", Self::SURROUND_6_0),
        ("6.1", Self::SURROUND_6_1),
        ("7.0", Self::SURROUND_7_0),
        ("7.1", Self::SURROUND_7_1),
        ("7.1(wide)", Self::SURROUND_7_1_WIDE),
        ("downmix", Self::DOWNMIX),
    ];

    /// Wraps a raw mask. Returns `None` for an empty mask.
    pub const fn from_mask(mask: u64) -> Option<Self> {
        if mask == 0 {
            None
        } else {
            Some(Self(mask))
        }
    }

    /// The raw speaker bitmask.
    pub const fn mask(self) -> u64 {
        self.0
    }

    /// Number of channels in the layout.
    pub const fn channels(self) -> u32 {
        self.0.count_ones()
    }

    /// The conventional layout for a channel count, if there is one.
    ///
    /// Only used when a layout string explicitly asks for it (`"6c"`);
    /// a bare channel count never turns into a named layout.
    pub const fn default_for_channels(count: u32) -> Option<Self> {
        match count {
            1 => Some(Self::MONO),
            2 => Some(Self::STEREO),
            3 => Some(Self::SURROUND_2_1),
            4 => Some(Self::SURROUND_4_0),
            5 => Some(Self::SURROUND_5_0_BACK),
            6 => Some(Self::SURROUND_5_1_BACK),
            7 => Some(Self::SURROUND_6_1),
            8 => Some(Self::SURROUND_7_1),
            _ => None,
        }
    }

    /// The standard name of this layout, if it has one.
    pub fn name(self) -> Option<&'static str> {
        Self::NAMED.iter().find(|(_, l)| *l == self).map(|(n, _)| *n)
    }

    fn parse_single(s: &str) -> Option<Self> {
        if let Some((_, layout)) = Self::NAMED.iter().find(|(n, _)| *n == s) {
            return Some(*layout);
        }
        if let Some((_, bit)) = CHANNEL_NAMES.iter().find(|(n, _)| *n == s) {
            return Some(Self(*bit));
        }
        if let Some(count) = s.strip_suffix('c') {
            if let Ok(count) = count.parse::<u32>() {
                return Self::default_for_channels(count);
            }
        }
        let mask = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).ok()?,
            None => s.parse::<u64>().ok()?,
        };
        Self::from_mask(mask)
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            return f.write_str(name);
        }
        let mut first = true;
        for (name, bit) in CHANNEL_NAMES {
            if self.0 & bit != 0 {
                if !first {
                    f.write_str("+")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        let unnamed = self.0 & !CHANNEL_NAMES.iter().fold(0, |acc, (_, b)| acc | b);
        if unnamed != 0 {
            if !first {
                f.write_str("+")?;
            }
            write!(f, "{:#x}", unnamed)?;
        }
        Ok(())
    }
}

/// Error returned when a channel layout string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid channel layout '{0}'")]
pub struct ParseLayoutError(pub String);

impl FromStr for ChannelLayout {
    type Err = ParseLayoutError;

    /// Accepts a layout name (`stereo`, `5.1`), channel names joined by `+`
    /// or `|` (`FL+FR+LFE`), `<n>c` for the default layout of n channels,
    /// or a decimal/hex mask.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseLayoutError(s.to_string());
        if s.is_empty() {
            return Err(err());
        }
        let mut mask = 0u64;
        for part in s.split(['+', '|']) {
            let layout = Self::parse_single(part.trim()).ok_or_else(err)?;
            mask |= layout.mask();
        }
        Self::from_mask(mask).ok_or_else(err)
    }
}

/// Channel arrangement an audio stream offers during negotiation.
///
/// `Count` is the placeholder for streams that only know how many channels
/// they carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelSpec {
    /// A known speaker layout.
    Layout(ChannelLayout),
    /// N channels with no named layout.
    Count(u32),
}

impl ChannelSpec {
    /// Number of channels described.
    pub fn channels(&self) -> u32 {
        match self {
            ChannelSpec::Layout(layout) => layout.channels(),
            ChannelSpec::Count(n) => *n,
        }
    }

    /// The layout, if one is known.
    pub fn layout(&self) -> Option<ChannelLayout> {
        match self {
            ChannelSpec::Layout(layout) => Some(*layout),
            ChannelSpec::Count(_) => None,
        }
    }
}

impl fmt::Display for ChannelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelSpec::Layout(layout) => write!(f, "{}", layout),
            ChannelSpec::Count(n) => write!(f, "{} channels", n),
        }
    }
}
