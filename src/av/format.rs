//! Pixel and sample format types.

use std::fmt;
use std::str::FromStr;

/// Video pixel formats accepted by the video buffer source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp
    Yuv420p,
    /// Packed YUV 4:2:2, Y0 Cb Y1 Cr
    Yuyv422,
    /// Packed RGB 8:8:8
    Rgb24,
    /// Packed BGR 8:8:8
    Bgr24,
    /// Planar YUV 4:2:2
    Yuv422p,
    /// Planar YUV 4:4:4
    Yuv444p,
    /// Planar YUV 4:1:0
    Yuv410p,
    /// Planar YUV 4:1:1
    Yuv411p,
    /// 8-bit grayscale
    Gray,
    /// Full-range planar YUV 4:2:0
    Yuvj420p,
    /// Full-range planar YUV 4:2:2
    Yuvj422p,
    /// Full-range planar YUV 4:4:4
    Yuvj444p,
    /// Packed YUV 4:2:2, Cb Y0 Cr Y1
    Uyvy422,
    /// Semi-planar YUV 4:2:0, interleaved UV
    Nv12,
    /// Semi-planar YUV 4:2:0, interleaved VU
    Nv21,
    /// Packed ARGB 8:8:8:8
    Argb,
    /// Packed RGBA 8:8:8:8
    Rgba,
    /// Packed ABGR 8:8:8:8
    Abgr,
    /// Packed BGRA 8:8:8:8
    Bgra,
    /// Planar YUV 4:2:0, 10 bits per sample, little-endian
    Yuv420p10le,
    /// Semi-planar YUV 4:2:0, 10 bits per sample in 16-bit words, little-endian
    P010le,
}

impl PixelFormat {
    /// Every known format, in index order.
    pub const ALL: [PixelFormat; 21] = [
        PixelFormat::Yuv420p,
        PixelFormat::Yuyv422,
        PixelFormat::Rgb24,
        PixelFormat::Bgr24,
        PixelFormat::Yuv422p,
        PixelFormat::Yuv444p,
        PixelFormat::Yuv410p,
        PixelFormat::Yuv411p,
        PixelFormat::Gray,
        PixelFormat::Yuvj420p,
        PixelFormat::Yuvj422p,
        PixelFormat::Yuvj444p,
        PixelFormat::Uyvy422,
        PixelFormat::Nv12,
        PixelFormat::Nv21,
        PixelFormat::Argb,
        PixelFormat::Rgba,
        PixelFormat::Abgr,
        PixelFormat::Bgra,
        PixelFormat::Yuv420p10le,
        PixelFormat::P010le,
    ];

    /// Short name, e.g. `yuv420p`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Yuv420p => "yuv420p",
            Self::Yuyv422 => "yuyv422",
            Self::Rgb24 => "rgb24",
            Self::Bgr24 => "bgr24",
            Self::Yuv422p => "yuv422p",
            Self::Yuv444p => "yuv444p",
            Self::Yuv410p => "yuv410p",
            Self::Yuv411p => "yuv411p",
            Self::Gray => "gray",
            Self::Yuvj420p => "yuvj420p",
            Self::Yuvj422p => "yuvj422p",
            Self::Yuvj444p => "yuvj444p",
            Self::Uyvy422 => "uyvy422",
            Self::Nv12 => "nv12",
            Self::Nv21 => "nv21",
            Self::Argb => "argb",
            Self::Rgba => "rgba",
            Self::Abgr => "abgr",
            Self::Bgra => "bgra",
            Self::Yuv420p10le => "yuv420p10le",
            Self::P010le => "p010le",
        }
    }

    /// Position of this format in [`PixelFormat::ALL`].
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or_default()
    }

    /// Looks a format up by its numeric index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Looks a format up by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Number of data planes.
    pub const fn planes(self) -> usize {
        match self {
            Self::Yuv420p
            | Self::Yuv422p
            | Self::Yuv444p
            | Self::Yuv410p
            | Self::Yuv411p
            | Self::Yuvj420p
            | Self::Yuvj422p
            | Self::Yuvj444p
            | Self::Yuv420p10le => 3,
            Self::Nv12 | Self::Nv21 | Self::P010le => 2,
            Self::Yuyv422
            | Self::Uyvy422
            | Self::Rgb24
            | Self::Bgr24
            | Self::Gray
            | Self::Argb
            | Self::Rgba
            | Self::Abgr
            | Self::Bgra => 1,
        }
    }

    /// log2 of the horizontal and vertical chroma subsampling factors.
    pub const fn chroma_shift(self) -> (u32, u32) {
        match self {
            Self::Yuv420p | Self::Yuvj420p | Self::Nv12 | Self::Nv21 | Self::Yuv420p10le | Self::P010le => (1, 1),
            Self::Yuv422p | Self::Yuvj422p | Self::Yuyv422 | Self::Uyvy422 => (1, 0),
            Self::Yuv410p => (2, 2),
            Self::Yuv411p => (2, 0),
            _ => (0, 0),
        }
    }

    /// Bytes per pixel of the first plane.
    const fn luma_step(self) -> usize {
        match self {
            Self::Yuyv422 | Self::Uyvy422 | Self::Yuv420p10le | Self::P010le => 2,
            Self::Rgb24 | Self::Bgr24 => 3,
            Self::Argb | Self::Rgba | Self::Abgr | Self::Bgra => 4,
            _ => 1,
        }
    }

    /// Computes `(linesize, height)` of each plane for a picture of the
    /// given size, without padding.
    pub fn plane_layout(self, width: u32, height: u32) -> Vec<(usize, usize)> {
        let (w, h) = (width as usize, height as usize);
        let (sx, sy) = self.chroma_shift();
        let chroma_w = (w + (1 << sx) - 1) >> sx;
        let chroma_h = (h + (1 << sy) - 1) >> sy;
        let step = self.luma_step();

        match self.planes() {
            1 => vec![(w * step, h)],
            // Semi-planar: interleaved chroma, two samples per chroma position.
            2 => vec![(w * step, h), (chroma_w * 2 * step, chroma_h)],
            _ => vec![(w * step, h), (chroma_w * step, chroma_h), (chroma_w * step, chroma_h)],
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned for an unknown format name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown format '{0}'")]
pub struct UnknownFormat(pub String);

impl FromStr for PixelFormat {
    type Err = UnknownFormat;

    /// Accepts a format name or, failing that, a numeric index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(fmt) = Self::from_name(s) {
            return Ok(fmt);
        }
        s.parse::<usize>()
            .ok()
            .and_then(Self::from_index)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// Audio sample formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    /// Unsigned 8 bits
    U8,
    /// Signed 16 bits
    S16,
    /// Signed 32 bits
    S32,
    /// 32-bit float
    Flt,
    /// 64-bit float
    Dbl,
    /// Unsigned 8 bits, planar
    U8p,
    /// Signed 16 bits, planar
    S16p,
    /// Signed 32 bits, planar
    S32p,
    /// 32-bit float, planar
    Fltp,
    /// 64-bit float, planar
    Dblp,
}

impl SampleFormat {
    /// Every known format.
    pub const ALL: [SampleFormat; 10] = [
        SampleFormat::U8,
        SampleFormat::S16,
        SampleFormat::S32,
        SampleFormat::Flt,
        SampleFormat::Dbl,
        SampleFormat::U8p,
        SampleFormat::S16p,
        SampleFormat::S32p,
        SampleFormat::Fltp,
        SampleFormat::Dblp,
    ];

    /// Short name, e.g. `s16` or `fltp`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::S16 => "s16",
            Self::S32 => "s32",
            Self::Flt => "flt",
            Self::Dbl => "dbl",
            Self::U8p => "u8p",
            Self::S16p => "s16p",
            Self::S32p => "s32p",
            Self::Fltp => "fltp",
            Self::Dblp => "dblp",
        }
    }

    /// Size of one sample of one channel, in bytes.
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::U8 | Self::U8p => 1,
            Self::S16 | Self::S16p => 2,
            Self::S32 | Self::S32p | Self::Flt | Self::Fltp => 4,
            Self::Dbl | Self::Dblp => 8,
        }
    }

    /// True when each channel lives in its own plane.
    pub const fn is_planar(self) -> bool {
        matches!(self, Self::U8p | Self::S16p | Self::S32p | Self::Fltp | Self::Dblp)
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}
