//! The graph side of a buffer source: the output link it configures and
//! the sink it emits frames into.

use crate::av::{ChannelLayout, ChannelSpec, Frame, MediaType, PixelFormat, Rational, SampleFormat};
use crate::error::Result;

/// Formats a filter can produce on a link, as offered during negotiation.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatCandidates {
    /// Video formats.
    Video {
        /// Acceptable pixel formats.
        pixel_formats: Vec<PixelFormat>,
    },
    /// Audio formats.
    Audio {
        /// Acceptable sample formats.
        sample_formats: Vec<SampleFormat>,
        /// Acceptable sample rates.
        sample_rates: Vec<u32>,
        /// Acceptable layouts or bare channel counts.
        channel_layouts: Vec<ChannelSpec>,
    },
}

impl FormatCandidates {
    /// Video or audio.
    pub fn media_type(&self) -> MediaType {
        match self {
            FormatCandidates::Video { .. } => MediaType::Video,
            FormatCandidates::Audio { .. } => MediaType::Audio,
        }
    }
}

/// An output link of the filter graph.
///
/// The graph owns the link. A buffer source fills in `formats` during
/// negotiation and the stream properties during link configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// Kind of frames the link carries.
    pub media_type: MediaType,
    /// Candidate formats offered by the source.
    pub formats: Option<FormatCandidates>,
    /// Picture width.
    pub width: u32,
    /// Picture height.
    pub height: u32,
    /// Picture sample aspect ratio.
    pub sample_aspect_ratio: Rational,
    /// Unit of frame timestamps.
    pub time_base: Rational,
    /// Nominal frame rate.
    pub frame_rate: Rational,
    /// Audio samples per second.
    pub sample_rate: u32,
    /// Layout settled on by negotiation, if any.
    pub channel_layout: Option<ChannelLayout>,
    /// Audio channel count.
    pub channels: u32,
}

impl Link {
    /// An unconfigured link.
    pub fn new(media_type: MediaType) -> Self {
        Self {
            media_type,
            formats: None,
            width: 0,
            height: 0,
            sample_aspect_ratio: Rational::new(0, 1),
            time_base: Rational::new(0, 1),
            frame_rate: Rational::new(0, 1),
            sample_rate: 0,
            channel_layout: None,
            channels: 0,
        }
    }

    /// Pre-sets the layout the graph negotiated for this link.
    pub fn with_channel_layout(mut self, layout: ChannelLayout) -> Self {
        self.channel_layout = Some(layout);
        self.channels = layout.channels();
        self
    }
}

/// Downstream consumer of frames emitted by a buffer source.
pub trait FrameSink: Send {
    /// Takes ownership of the next frame.
    fn filter_frame(&mut self, frame: Frame) -> Result<()>;

    /// Called once when the source has delivered its last frame.
    fn end_of_stream(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<F> FrameSink for F
where
    F: FnMut(Frame) -> Result<()> + Send,
{
    fn filter_frame(&mut self, frame: Frame) -> Result<()> {
        self(frame)
    }
}
