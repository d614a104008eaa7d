//! Per-frame format checks against the stream descriptor.
//!
//! Video and audio are treated differently: a video frame that
//! drifts from the declared geometry is only reported and still admitted,
//! while an audio frame that drifts is rejected.

use crate::av::{AudioDescriptor, AudioFrame, Frame, StreamDescriptor, VideoDescriptor, VideoFrame};
use crate::error::{BufferSrcError, Result};

/// Outcome of a successful check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The frame matches the stream.
    Matches,
    /// The frame differs from the stream but is admitted anyway.
    Drifted,
}

/// Rejects audio frames whose declared layout disagrees with their channel
/// count. Runs before, and independently of, the stream format check.
pub fn check_channel_consistency(frame: &Frame) -> Result<()> {
    if let Frame::Audio(audio) = frame {
        if let Some(layout) = audio.channel_layout {
            if layout.channels() != audio.channels {
                log::error!(
                    "layout {} indicates {} channels but the frame carries {}",
                    layout,
                    layout.channels(),
                    audio.channels
                );
                return Err(BufferSrcError::invalid(format!(
                    "layout {} indicates a different number of channels than actually present ({})",
                    layout, audio.channels
                )));
            }
        }
    }
    Ok(())
}

/// Checks that `frame` is of the stream's media type.
pub fn check_media_type(descriptor: &StreamDescriptor, frame: &Frame) -> Result<()> {
    if descriptor.media_type() != frame.media_type() {
        return Err(BufferSrcError::invalid(format!(
            "{} frame pushed into {} source",
            frame.media_type(),
            descriptor.media_type()
        )));
    }
    Ok(())
}

/// Compares `frame` against the stream descriptor.
///
/// The caller is expected to have run [`check_media_type`] first; a frame
/// of the other media type is rejected here as well.
pub fn check_format(name: &str, descriptor: &StreamDescriptor, frame: &Frame) -> Result<Admission> {
    match (descriptor, frame) {
        (StreamDescriptor::Video(desc), Frame::Video(video)) => Ok(check_video(name, desc, video)),
        (StreamDescriptor::Audio(desc), Frame::Audio(audio)) => check_audio(name, desc, audio),
        _ => check_media_type(descriptor, frame).map(|_| Admission::Matches),
    }
}

fn check_video(name: &str, desc: &VideoDescriptor, frame: &VideoFrame) -> Admission {
    if desc.width != frame.width || desc.height != frame.height || desc.pixel_format != frame.format {
        log::info!(
            "{}: changing frame properties on the fly is not supported by all filters \
             (stream {}x{} {}, frame {}x{} {})",
            name,
            desc.width,
            desc.height,
            desc.pixel_format,
            frame.width,
            frame.height,
            frame.format
        );
        return Admission::Drifted;
    }
    Admission::Matches
}

fn check_audio(name: &str, desc: &AudioDescriptor, frame: &AudioFrame) -> Result<Admission> {
    // Without a layout on either side only the channel count can be compared.
    let channels_differ = match (desc.channel_layout, frame.channel_layout) {
        (None, None) => desc.channels != frame.channels,
        (a, b) => a != b,
    };

    if desc.sample_format != frame.format || desc.sample_rate != frame.sample_rate || channels_differ {
        log::error!(
            "{}: changing frame properties on the fly is not supported \
             (stream {} {}Hz {}, frame {} {}Hz {} channels)",
            name,
            desc.sample_format,
            desc.sample_rate,
            desc.channel_spec(),
            frame.format,
            frame.sample_rate,
            frame.channels
        );
        return Err(BufferSrcError::invalid("audio frame properties differ from the stream"));
    }
    Ok(Admission::Matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::av::{ChannelLayout, PixelFormat, Rational, SampleFormat};

    fn video_stream() -> StreamDescriptor {
        StreamDescriptor::Video(VideoDescriptor {
            width: 64,
            height: 48,
            pixel_format: PixelFormat::Yuv420p,
            sample_aspect_ratio: Rational::new(1, 1),
            time_base: Rational::new(1, 25),
            frame_rate: Rational::new(25, 1),
            sws_param: None,
        })
    }

    fn audio_stream(layout: Option<ChannelLayout>, channels: u32) -> StreamDescriptor {
        StreamDescriptor::Audio(AudioDescriptor {
            sample_rate: 48000,
            sample_format: SampleFormat::S16,
            channel_layout: layout,
            channels,
            time_base: Rational::new(1, 48000),
        })
    }

    #[test]
    fn test_video_drift_is_admitted() {
        let desc = video_stream();
        let same = Frame::from(VideoFrame::new(64, 48, PixelFormat::Yuv420p));
        let other = Frame::from(VideoFrame::new(64, 48, PixelFormat::Rgba));
        assert_eq!(check_format("in", &desc, &same).unwrap(), Admission::Matches);
        assert_eq!(check_format("in", &desc, &other).unwrap(), Admission::Drifted);
    }

    #[test]
    fn test_audio_drift_is_rejected() {
        let desc = audio_stream(Some(ChannelLayout::STEREO), 2);
        let ok = Frame::from(AudioFrame::new(1024, SampleFormat::S16, 48000, ChannelLayout::STEREO));
        assert_eq!(check_format("in", &desc, &ok).unwrap(), Admission::Matches);

        let rate = Frame::from(AudioFrame::new(1024, SampleFormat::S16, 44100, ChannelLayout::STEREO));
        let fmt = Frame::from(AudioFrame::new(1024, SampleFormat::Flt, 48000, ChannelLayout::STEREO));
        let layout = Frame::from(AudioFrame::new(1024, SampleFormat::S16, 48000, ChannelLayout::DOWNMIX));
        for frame in [rate, fmt, layout] {
            assert!(matches!(
                check_format("in", &desc, &frame),
                Err(BufferSrcError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_audio_count_only_stream() {
        let desc = audio_stream(None, 2);
        let two = Frame::from(AudioFrame::with_channels(16, SampleFormat::S16, 48000, 2));
        let three = Frame::from(AudioFrame::with_channels(16, SampleFormat::S16, 48000, 3));
        assert!(check_format("in", &desc, &two).is_ok());
        assert!(check_format("in", &desc, &three).is_err());
    }

    #[test]
    fn test_channel_consistency() {
        let good = Frame::from(AudioFrame::new(16, SampleFormat::S16, 48000, ChannelLayout::STEREO));
        assert!(check_channel_consistency(&good).is_ok());

        let bad = Frame::from(
            AudioFrame::with_channels(16, SampleFormat::S16, 48000, 3).with_channel_layout(Some(ChannelLayout::STEREO)),
        );
        assert!(matches!(
            check_channel_consistency(&bad),
            Err(BufferSrcError::InvalidArgument(_))
        ));

        let video = Frame::from(VideoFrame::new(2, 2, PixelFormat::Gray));
        assert!(check_channel_consistency(&video).is_ok());
    }

    #[test]
    fn test_media_type_mismatch() {
        let desc = video_stream();
        let audio = Frame::from(AudioFrame::new(16, SampleFormat::S16, 48000, ChannelLayout::MONO));
        assert!(check_media_type(&desc, &audio).is_err());
        assert!(check_format("in", &desc, &audio).is_err());
    }
}
