//! Stream parameters and option-string parsing.
//!
//! A buffer source is configured once, from either an explicit
//! [`VideoParams`] / [`AudioParams`] value or an option string:
//!
//! ```text
//! video_size=320x240:pix_fmt=yuv420p:time_base=1/25:pixel_aspect=1/1
//! 320:240:yuv420p:1:25:1:1                      (positional video form)
//! sample_rate=48000:sample_fmt=s16:channel_layout=stereo
//! ```
//!
//! Validation turns the parameters into a [`StreamDescriptor`].

use crate::av::{
    AudioDescriptor, ChannelLayout, MediaType, PixelFormat, Rational, SampleFormat, StreamDescriptor,
    VideoDescriptor,
};
use thiserror::Error;

/// Number of fields in the positional video argument form.
const POSITIONAL_VIDEO_ARGS: usize = 7;

/// Errors raised while parsing or validating stream parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The option string was empty.
    #[error("arguments required")]
    MissingArguments,

    /// The positional video form had the wrong number of fields.
    #[error("expected {expected} arguments, but {found} found in '{args}'")]
    PositionalArity {
        /// Fields required.
        expected: usize,
        /// Fields given.
        found: usize,
        /// The offending string.
        args: String,
    },

    /// An option without `=`.
    #[error("option '{0}' is not of the form key=value")]
    MalformedOption(String),

    /// A key the source does not know.
    #[error("unknown option '{key}' for {media_type} source")]
    UnknownOption {
        /// The unknown key.
        key: String,
        /// Kind of source being configured.
        media_type: MediaType,
    },

    /// A value that does not parse for its key.
    #[error("invalid value '{value}' for option '{key}'")]
    InvalidValue {
        /// Option key.
        key: String,
        /// Rejected value.
        value: String,
    },

    /// Unknown pixel format name or index.
    #[error("invalid pixel format string '{0}'")]
    InvalidPixelFormat(String),

    /// Video parameters without a pixel format.
    #[error("pixel format not specified")]
    MissingPixelFormat,

    /// Unknown sample format name.
    #[error("invalid sample format '{0}'")]
    InvalidSampleFormat(String),

    /// Audio parameters without a sample format.
    #[error("sample format not specified")]
    MissingSampleFormat,

    /// Unparseable channel layout.
    #[error("invalid channel layout '{0}'")]
    InvalidChannelLayout(String),

    /// Channel count and layout disagree.
    #[error("mismatching channel count {channels} and layout '{layout}' ({layout_channels} channels)")]
    ChannelMismatch {
        /// Count given with `channels`.
        channels: u32,
        /// Layout given with `channel_layout`.
        layout: String,
        /// Channels the layout carries.
        layout_channels: u32,
    },

    /// Neither `channels` nor `channel_layout` was given.
    #[error("neither number of channels nor channel layout specified")]
    MissingChannels,

    /// Sample rate of zero.
    #[error("sample rate must be positive")]
    InvalidSampleRate,

    /// Zero width or height.
    #[error("invalid video size {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Time base that is zero or negative.
    #[error("invalid time base {0}")]
    InvalidTimeBase(Rational),

    /// Video parameters for an audio source, or the other way round.
    #[error("{expected} source cannot take {found} parameters")]
    MediaTypeMismatch {
        /// Media type of the source.
        expected: MediaType,
        /// Media type of the parameters.
        found: MediaType,
    },

    /// The source already has a stream descriptor.
    #[error("stream is already configured")]
    AlreadyConfigured,
}

/// Result alias for configuration.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Parameters of a video buffer source.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoParams {
    /// Unit of frame timestamps.
    pub time_base: Rational,
    /// Nominal frame rate; `0/1` when unknown.
    pub frame_rate: Rational,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format, required.
    pub pixel_format: Option<PixelFormat>,
    /// Sample aspect ratio.
    pub pixel_aspect: Rational,
    /// Scaler options passed through to the graph.
    pub sws_param: Option<String>,
}

impl Default for VideoParams {
    fn default() -> Self {
        Self {
            time_base: Rational::new(0, 1),
            frame_rate: Rational::new(0, 1),
            width: 0,
            height: 0,
            pixel_format: None,
            pixel_aspect: Rational::new(0, 1),
            sws_param: None,
        }
    }
}

impl VideoParams {
    /// Starts from the mandatory geometry and pixel format.
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat, time_base: Rational) -> Self {
        Self {
            width,
            height,
            pixel_format: Some(pixel_format),
            time_base,
            ..Self::default()
        }
    }

    /// Sets the nominal frame rate.
    pub fn with_frame_rate(mut self, frame_rate: Rational) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Sets the sample aspect ratio.
    pub fn with_pixel_aspect(mut self, pixel_aspect: Rational) -> Self {
        self.pixel_aspect = pixel_aspect;
        self
    }

    /// Sets the scaler options.
    pub fn with_sws_param(mut self, sws_param: impl Into<String>) -> Self {
        self.sws_param = Some(sws_param.into());
        self
    }

    /// Parses either the `key=value:...` form or the seven-field positional
    /// form `w:h:pix_fmt:tb_num:tb_den:sar_num:sar_den`.
    pub fn parse(args: &str) -> Result<Self> {
        let args = args.trim();
        if args.is_empty() {
            return Err(ConfigError::MissingArguments);
        }

        // Key/value form when an '=' shows up before the first ':'.
        let keyed = match (args.find('='), args.find(':')) {
            (Some(eq), Some(colon)) => eq < colon,
            (Some(_), None) => true,
            _ => false,
        };
        if keyed {
            Self::parse_options(args)
        } else {
            Self::parse_positional(args)
        }
    }

    fn parse_options(args: &str) -> Result<Self> {
        let mut params = Self::default();
        for (key, value) in split_options(args)? {
            match key {
                "time_base" => params.time_base = parse_rational(key, value)?,
                "frame_rate" => params.frame_rate = parse_rational(key, value)?,
                "pixel_aspect" => params.pixel_aspect = parse_rational(key, value)?,
                "video_size" => {
                    let (width, height) = parse_video_size(value).ok_or_else(|| invalid(key, value))?;
                    params.width = width;
                    params.height = height;
                }
                "width" => params.width = parse_number(key, value)?,
                "height" => params.height = parse_number(key, value)?,
                "pix_fmt" => params.pixel_format = Some(parse_pixel_format(value)?),
                "sws_param" => params.sws_param = Some(value.to_string()),
                _ => {
                    return Err(ConfigError::UnknownOption {
                        key: key.to_string(),
                        media_type: MediaType::Video,
                    })
                }
            }
        }
        Ok(params)
    }

    fn parse_positional(args: &str) -> Result<Self> {
        let fields: Vec<&str> = args.split(':').collect();
        if fields.len() != POSITIONAL_VIDEO_ARGS {
            return Err(ConfigError::PositionalArity {
                expected: POSITIONAL_VIDEO_ARGS,
                found: fields.len(),
                args: args.to_string(),
            });
        }

        Ok(Self {
            width: parse_number("width", fields[0])?,
            height: parse_number("height", fields[1])?,
            pixel_format: Some(parse_pixel_format(fields[2])?),
            time_base: Rational::new(parse_number("time_base", fields[3])?, parse_number("time_base", fields[4])?),
            pixel_aspect: Rational::new(
                parse_number("pixel_aspect", fields[5])?,
                parse_number("pixel_aspect", fields[6])?,
            ),
            ..Self::default()
        })
    }

    /// Checks the parameters and produces the stream descriptor.
    pub fn validate(self) -> Result<VideoDescriptor> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let pixel_format = self.pixel_format.ok_or(ConfigError::MissingPixelFormat)?;
        if !self.time_base.is_positive() {
            return Err(ConfigError::InvalidTimeBase(self.time_base));
        }

        Ok(VideoDescriptor {
            width: self.width,
            height: self.height,
            pixel_format,
            sample_aspect_ratio: self.pixel_aspect,
            time_base: self.time_base,
            frame_rate: self.frame_rate,
            sws_param: self.sws_param,
        })
    }
}

/// Parameters of an audio buffer source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioParams {
    /// Defaults to `1/sample_rate` when unset or zero.
    pub time_base: Option<Rational>,
    /// Samples per second, required.
    pub sample_rate: u32,
    /// Sample format, required.
    pub sample_format: Option<SampleFormat>,
    /// Zero when only the layout is given.
    pub channels: u32,
    /// Speaker layout, if known.
    pub channel_layout: Option<ChannelLayout>,
}

impl AudioParams {
    /// Parameters for a stream with a known speaker layout.
    pub fn new(sample_rate: u32, sample_format: SampleFormat, channel_layout: ChannelLayout) -> Self {
        Self {
            sample_rate,
            sample_format: Some(sample_format),
            channel_layout: Some(channel_layout),
            ..Self::default()
        }
    }

    /// Parameters for a stream that only knows its channel count.
    pub fn with_channel_count(sample_rate: u32, sample_format: SampleFormat, channels: u32) -> Self {
        Self {
            sample_rate,
            sample_format: Some(sample_format),
            channels,
            ..Self::default()
        }
    }

    /// Overrides the default `1/sample_rate` time base.
    pub fn with_time_base(mut self, time_base: Rational) -> Self {
        self.time_base = Some(time_base);
        self
    }

    /// Parses a `key=value:...` option string.
    pub fn parse(args: &str) -> Result<Self> {
        let args = args.trim();
        if args.is_empty() {
            return Err(ConfigError::MissingArguments);
        }

        let mut params = Self::default();
        for (key, value) in split_options(args)? {
            match key {
                "time_base" => params.time_base = Some(parse_rational(key, value)?),
                "sample_rate" => params.sample_rate = parse_number(key, value)?,
                "sample_fmt" => {
                    let fmt = value
                        .parse::<SampleFormat>()
                        .map_err(|_| ConfigError::InvalidSampleFormat(value.to_string()))?;
                    params.sample_format = Some(fmt);
                }
                "channels" => params.channels = parse_number(key, value)?,
                "channel_layout" => {
                    let layout = value
                        .parse::<ChannelLayout>()
                        .map_err(|_| ConfigError::InvalidChannelLayout(value.to_string()))?;
                    params.channel_layout = Some(layout);
                }
                _ => {
                    return Err(ConfigError::UnknownOption {
                        key: key.to_string(),
                        media_type: MediaType::Audio,
                    })
                }
            }
        }
        Ok(params)
    }

    /// Checks the parameters and produces the stream descriptor.
    ///
    /// A layout fixes the channel count; a bare channel count is kept as
    /// is and never turned into a named layout.
    pub fn validate(self) -> Result<AudioDescriptor> {
        let sample_format = self.sample_format.ok_or(ConfigError::MissingSampleFormat)?;
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate);
        }

        let channels = match self.channel_layout {
            Some(layout) => {
                let n = layout.channels();
                if self.channels != 0 && self.channels != n {
                    return Err(ConfigError::ChannelMismatch {
                        channels: self.channels,
                        layout: layout.to_string(),
                        layout_channels: n,
                    });
                }
                n
            }
            None if self.channels == 0 => return Err(ConfigError::MissingChannels),
            None => self.channels,
        };

        let time_base = match self.time_base {
            Some(tb) if !tb.is_zero() => {
                if !tb.is_positive() {
                    return Err(ConfigError::InvalidTimeBase(tb));
                }
                tb
            }
            _ => Rational::new(1, self.sample_rate.min(i32::MAX as u32) as i32),
        };

        Ok(AudioDescriptor {
            sample_rate: self.sample_rate,
            sample_format,
            channel_layout: self.channel_layout,
            channels,
            time_base,
        })
    }
}

/// Parameters for either kind of buffer source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    /// Parameters of a video source.
    Video(VideoParams),
    /// Parameters of an audio source.
    Audio(AudioParams),
}

impl SourceConfig {
    /// Parses an option string for a source of the given media type.
    pub fn parse(media_type: MediaType, args: &str) -> Result<Self> {
        match media_type {
            MediaType::Video => VideoParams::parse(args).map(SourceConfig::Video),
            MediaType::Audio => AudioParams::parse(args).map(SourceConfig::Audio),
        }
    }

    /// Video or audio.
    pub fn media_type(&self) -> MediaType {
        match self {
            SourceConfig::Video(_) => MediaType::Video,
            SourceConfig::Audio(_) => MediaType::Audio,
        }
    }

    /// Validates the parameters into a descriptor.
    pub fn validate(self) -> Result<StreamDescriptor> {
        match self {
            SourceConfig::Video(params) => params.validate().map(StreamDescriptor::Video),
            SourceConfig::Audio(params) => params.validate().map(StreamDescriptor::Audio),
        }
    }
}

impl From<VideoParams> for SourceConfig {
    fn from(params: VideoParams) -> Self {
        SourceConfig::Video(params)
    }
}

impl From<AudioParams> for SourceConfig {
    fn from(params: AudioParams) -> Self {
        SourceConfig::Audio(params)
    }
}

fn split_options(args: &str) -> Result<Vec<(&str, &str)>> {
    args.split(':')
        .filter(|opt| !opt.trim().is_empty())
        .map(|opt| {
            opt.split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .ok_or_else(|| ConfigError::MalformedOption(opt.to_string()))
        })
        .collect()
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| invalid(key, value))
}

fn parse_rational(key: &str, value: &str) -> Result<Rational> {
    value.parse::<Rational>().map_err(|_| invalid(key, value))
}

fn parse_pixel_format(value: &str) -> Result<PixelFormat> {
    value
        .parse::<PixelFormat>()
        .map_err(|_| ConfigError::InvalidPixelFormat(value.to_string()))
}

const VIDEO_SIZE_ABBREVIATIONS: [(&str, u32, u32); 24] = [
    ("ntsc", 720, 480),
    ("pal", 720, 576),
    ("qntsc", 352, 240),
    ("qpal", 352, 288),
    ("sntsc", 640, 480),
    ("spal", 768, 576),
    ("film", 352, 240),
    ("ntsc-film", 352, 240),
    ("sqcif", 128, 96),
    ("qcif", 176, 144),
    ("cif", 352, 288),
    ("4cif", 704, 576),
    ("16cif", 1408, 1152),
    ("qqvga", 160, 120),
    ("qvga", 320, 240),
    ("vga", 640, 480),
    ("svga", 800, 600),
    ("xga", 1024, 768),
    ("sxga", 1280, 1024),
    ("uxga", 1600, 1200),
    ("hd480", 852, 480),
    ("hd720", 1280, 720),
    ("hd1080", 1920, 1080),
    ("uhd2160", 3840, 2160),
];

/// Parses `WIDTHxHEIGHT` or a size abbreviation such as `hd720`.
pub fn parse_video_size(value: &str) -> Option<(u32, u32)> {
    let value = value.trim();
    if let Some((_, w, h)) = VIDEO_SIZE_ABBREVIATIONS.iter().find(|(name, _, _)| *name == value) {
        return Some((*w, *h));
    }
    let (w, h) = value.split_once(['x', 'X'])?;
    let (w, h) = (w.parse::<u32>().ok()?, h.parse::<u32>().ok()?);
    if w == 0 || h == 0 {
        return None;
    }
    Some((w, h))
}
