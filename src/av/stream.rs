use std::fmt;

use super::{ChannelLayout, ChannelSpec, MediaType, PixelFormat, Rational, SampleFormat};

/// Validated format contract of a video stream.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoDescriptor {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Declared pixel format.
    pub pixel_format: PixelFormat,
    /// Sample aspect ratio; `0/1` when unknown.
    pub sample_aspect_ratio: Rational,
    /// Unit of frame timestamps.
    pub time_base: Rational,
    /// Advisory only; `0/1` when unknown.
    pub frame_rate: Rational,
    /// Parameters for a scaler the graph may insert after this source.
    pub sws_param: Option<String>,
}

/// Validated format contract of an audio stream.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioDescriptor {
    /// Samples per second.
    pub sample_rate: u32,
    /// Declared sample format.
    pub sample_format: SampleFormat,
    /// `None` when only the channel count is known.
    pub channel_layout: Option<ChannelLayout>,
    /// Number of channels.
    pub channels: u32,
    /// Unit of frame timestamps.
    pub time_base: Rational,
}

impl AudioDescriptor {
    /// What this stream offers during negotiation.
    pub fn channel_spec(&self) -> ChannelSpec {
        match self.channel_layout {
            Some(layout) => ChannelSpec::Layout(layout),
            None => ChannelSpec::Count(self.channels),
        }
    }
}

/// The format contract for one buffer source output.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamDescriptor {
    /// A video stream.
    Video(VideoDescriptor),
    /// An audio stream.
    Audio(AudioDescriptor),
}

impl StreamDescriptor {
    /// Video or audio.
    pub fn media_type(&self) -> MediaType {
        match self {
            StreamDescriptor::Video(_) => MediaType::Video,
            StreamDescriptor::Audio(_) => MediaType::Audio,
        }
    }

    /// Unit of frame timestamps.
    pub fn time_base(&self) -> Rational {
        match self {
            StreamDescriptor::Video(v) => v.time_base,
            StreamDescriptor::Audio(a) => a.time_base,
        }
    }
}

impl fmt::Display for StreamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamDescriptor::Video(v) => write!(
                f,
                "w:{} h:{} pixfmt:{} tb:{} fr:{} sar:{} sws_param:{}",
                v.width,
                v.height,
                v.pixel_format,
                v.time_base,
                v.frame_rate,
                v.sample_aspect_ratio,
                v.sws_param.as_deref().unwrap_or("")
            ),
            StreamDescriptor::Audio(a) => write!(
                f,
                "tb:{} samplefmt:{} samplerate:{} chlayout:{}",
                a.time_base,
                a.sample_format,
                a.sample_rate,
                a.channel_spec()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_spec_never_invents_layout() {
        let desc = AudioDescriptor {
            sample_rate: 48000,
            sample_format: SampleFormat::S16,
            channel_layout: None,
            channels: 2,
            time_base: Rational::new(1, 48000),
        };
        assert_eq!(desc.channel_spec(), ChannelSpec::Count(2));
    }

    #[test]
    fn test_display_summary() {
        let desc = StreamDescriptor::Video(VideoDescriptor {
            width: 320,
            height: 240,
            pixel_format: PixelFormat::Yuv420p,
            sample_aspect_ratio: Rational::new(1, 1),
            time_base: Rational::new(1, 25),
            frame_rate: Rational::new(25, 1),
            sws_param: None,
        });
        assert_eq!(desc.to_string(), "w:320 h:240 pixfmt:yuv420p tb:1/25 fr:25/1 sar:1/1 sws_param:");
        assert_eq!(desc.media_type(), MediaType::Video);
    }
}
