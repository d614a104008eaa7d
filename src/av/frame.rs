use bytes::Bytes;

use super::{ChannelLayout, MediaType, PixelFormat, Rational, SampleFormat};

/// A decoded picture.
///
/// Planes are reference counted, so cloning a frame hands out a new,
/// independently owned handle to the same pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// Plane data, one entry per plane of `format`.
    pub planes: Vec<Bytes>,
    /// Bytes per row of each plane.
    pub linesize: Vec<usize>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format of the planes.
    pub format: PixelFormat,
    /// Sample aspect ratio; `0/1` when unknown.
    pub sample_aspect_ratio: Rational,
    /// Presentation timestamp in stream time base units.
    pub pts: Option<i64>,
    /// Set for key frames.
    pub key_frame: bool,
}

impl VideoFrame {
    /// Allocates a zero-filled picture with tightly packed planes.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let layout = format.plane_layout(width, height);
        let planes = layout
            .iter()
            .map(|(linesize, rows)| Bytes::from(vec![0u8; linesize * rows]))
            .collect();
        let linesize = layout.iter().map(|(linesize, _)| *linesize).collect();

        Self {
            planes,
            linesize,
            width,
            height,
            format,
            sample_aspect_ratio: Rational::new(0, 1),
            pts: None,
            key_frame: false,
        }
    }

    /// Sets the presentation timestamp.
    pub fn with_pts(mut self, pts: i64) -> Self {
        self.pts = Some(pts);
        self
    }

    /// Marks the frame as a key frame or not.
    pub fn with_key_flag(mut self, key_frame: bool) -> Self {
        self.key_frame = key_frame;
        self
    }

    /// Sets the sample aspect ratio.
    pub fn with_sample_aspect_ratio(mut self, sar: Rational) -> Self {
        self.sample_aspect_ratio = sar;
        self
    }
}

/// A block of audio samples.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    /// One plane per channel for planar formats, a single interleaved plane
    /// otherwise.
    pub planes: Vec<Bytes>,
    /// Samples per channel.
    pub nb_samples: usize,
    /// Samples per second.
    pub sample_rate: u32,
    /// Sample format of the planes.
    pub format: SampleFormat,
    /// Speaker layout, if the producer knows it.
    pub channel_layout: Option<ChannelLayout>,
    /// Number of channels actually present in the data.
    pub channels: u32,
    /// Presentation timestamp in stream time base units.
    pub pts: Option<i64>,
}

impl AudioFrame {
    /// Allocates a silent frame for a known layout.
    pub fn new(nb_samples: usize, format: SampleFormat, sample_rate: u32, layout: ChannelLayout) -> Self {
        let mut frame = Self::with_channels(nb_samples, format, sample_rate, layout.channels());
        frame.channel_layout = Some(layout);
        frame
    }

    /// Allocates a silent frame that only knows its channel count.
    pub fn with_channels(nb_samples: usize, format: SampleFormat, sample_rate: u32, channels: u32) -> Self {
        let bps = format.bytes_per_sample();
        let planes = if format.is_planar() {
            (0..channels)
                .map(|_| Bytes::from(vec![0u8; nb_samples * bps]))
                .collect()
        } else {
            vec![Bytes::from(vec![0u8; nb_samples * bps * channels as usize])]
        };

        Self {
            planes,
            nb_samples,
            sample_rate,
            format,
            channel_layout: None,
            channels,
            pts: None,
        }
    }

    /// Sets the presentation timestamp.
    pub fn with_pts(mut self, pts: i64) -> Self {
        self.pts = Some(pts);
        self
    }

    /// Overrides the declared layout without touching the channel count.
    pub fn with_channel_layout(mut self, layout: Option<ChannelLayout>) -> Self {
        self.channel_layout = layout;
        self
    }
}

/// A frame travelling through a buffer source.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A picture.
    Video(VideoFrame),
    /// A block of samples.
    Audio(AudioFrame),
}

impl Frame {
    /// Video or audio.
    pub fn media_type(&self) -> MediaType {
        match self {
            Frame::Video(_) => MediaType::Video,
            Frame::Audio(_) => MediaType::Audio,
        }
    }

    /// Presentation timestamp, if any.
    pub fn pts(&self) -> Option<i64> {
        match self {
            Frame::Video(v) => v.pts,
            Frame::Audio(a) => a.pts,
        }
    }

    /// The picture, for video frames.
    pub fn as_video(&self) -> Option<&VideoFrame> {
        match self {
            Frame::Video(v) => Some(v),
            Frame::Audio(_) => None,
        }
    }

    /// The samples, for audio frames.
    pub fn as_audio(&self) -> Option<&AudioFrame> {
        match self {
            Frame::Audio(a) => Some(a),
            Frame::Video(_) => None,
        }
    }

    /// Plane buffers, regardless of media type.
    pub fn planes(&self) -> &[Bytes] {
        match self {
            Frame::Video(v) => &v.planes,
            Frame::Audio(a) => &a.planes,
        }
    }
}

impl From<VideoFrame> for Frame {
    fn from(frame: VideoFrame) -> Self {
        Frame::Video(frame)
    }
}

impl From<AudioFrame> for Frame {
    fn from(frame: AudioFrame) -> Self {
        Frame::Audio(frame)
    }
}
