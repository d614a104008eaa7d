//! Format negotiation and output link configuration.

use crate::av::StreamDescriptor;
use crate::error::{BufferSrcError, Result};
use crate::link::{FormatCandidates, Link};

/// The single format this stream produces, as a one-element candidate set.
pub fn candidates(descriptor: &StreamDescriptor) -> FormatCandidates {
    match descriptor {
        StreamDescriptor::Video(video) => FormatCandidates::Video {
            pixel_formats: vec![video.pixel_format],
        },
        StreamDescriptor::Audio(audio) => FormatCandidates::Audio {
            sample_formats: vec![audio.sample_format],
            sample_rates: vec![audio.sample_rate],
            channel_layouts: vec![audio.channel_spec()],
        },
    }
}

fn check_link_type(descriptor: &StreamDescriptor, link: &Link) -> Result<()> {
    if link.media_type != descriptor.media_type() {
        return Err(BufferSrcError::invalid(format!(
            "{} source cannot feed a {} link",
            descriptor.media_type(),
            link.media_type
        )));
    }
    Ok(())
}

/// Offers the stream's format on `link`.
pub fn negotiate(descriptor: &StreamDescriptor, link: &mut Link) -> Result<()> {
    check_link_type(descriptor, link)?;
    link.formats = Some(candidates(descriptor));
    Ok(())
}

/// Writes the stream properties onto `link`.
///
/// An audio stream that was configured with a bare channel count adopts
/// the layout the link settled on, provided the channel counts agree.
pub fn configure(descriptor: &mut StreamDescriptor, link: &mut Link) -> Result<()> {
    check_link_type(descriptor, link)?;

    match descriptor {
        StreamDescriptor::Video(video) => {
            link.width = video.width;
            link.height = video.height;
            link.sample_aspect_ratio = video.sample_aspect_ratio;
            link.frame_rate = video.frame_rate;
        }
        StreamDescriptor::Audio(audio) => {
            if audio.channel_layout.is_none() {
                if let Some(layout) = link.channel_layout {
                    if layout.channels() != audio.channels {
                        return Err(BufferSrcError::invalid(format!(
                            "link layout {} does not carry {} channels",
                            layout, audio.channels
                        )));
                    }
                    log::debug!("adopting link channel layout {}", layout);
                    audio.channel_layout = Some(layout);
                }
            }
            link.channel_layout = audio.channel_layout;
            link.channels = audio.channels;
            link.sample_rate = audio.sample_rate;
        }
    }
    link.time_base = descriptor.time_base();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::av::{
        AudioDescriptor, ChannelLayout, ChannelSpec, MediaType, PixelFormat, Rational, SampleFormat,
        VideoDescriptor,
    };
    use pretty_assertions::assert_eq;

    fn audio(layout: Option<ChannelLayout>, channels: u32) -> StreamDescriptor {
        StreamDescriptor::Audio(AudioDescriptor {
            sample_rate: 44100,
            sample_format: SampleFormat::Fltp,
            channel_layout: layout,
            channels,
            time_base: Rational::new(1, 44100),
        })
    }

    #[test]
    fn test_single_candidate() {
        let desc = audio(None, 2);
        assert_eq!(
            candidates(&desc),
            FormatCandidates::Audio {
                sample_formats: vec![SampleFormat::Fltp],
                sample_rates: vec![44100],
                channel_layouts: vec![ChannelSpec::Count(2)],
            }
        );

        let desc = audio(Some(ChannelLayout::SURROUND_5_1), 6);
        match candidates(&desc) {
            FormatCandidates::Audio { channel_layouts, .. } => {
                assert_eq!(channel_layouts, vec![ChannelSpec::Layout(ChannelLayout::SURROUND_5_1)])
            }
            other => panic!("unexpected candidates {:?}", other),
        }
    }

    #[test]
    fn test_configure_video_link() {
        let mut desc = StreamDescriptor::Video(VideoDescriptor {
            width: 1280,
            height: 720,
            pixel_format: PixelFormat::Nv12,
            sample_aspect_ratio: Rational::new(1, 1),
            time_base: Rational::new(1, 90000),
            frame_rate: Rational::new(30, 1),
            sws_param: None,
        });
        let mut link = Link::new(MediaType::Video);
        negotiate(&desc, &mut link).unwrap();
        configure(&mut desc, &mut link).unwrap();

        assert_eq!((link.width, link.height), (1280, 720));
        assert_eq!(link.sample_aspect_ratio, Rational::new(1, 1));
        assert_eq!(link.time_base, Rational::new(1, 90000));
        assert_eq!(link.frame_rate, Rational::new(30, 1));
        assert_eq!(
            link.formats,
            Some(FormatCandidates::Video {
                pixel_formats: vec![PixelFormat::Nv12]
            })
        );
    }

    #[test]
    fn test_audio_adopts_link_layout() {
        let mut desc = audio(None, 2);
        let mut link = Link::new(MediaType::Audio).with_channel_layout(ChannelLayout::STEREO);
        configure(&mut desc, &mut link).unwrap();
        match &desc {
            StreamDescriptor::Audio(a) => assert_eq!(a.channel_layout, Some(ChannelLayout::STEREO)),
            other => panic!("unexpected descriptor {:?}", other),
        }
        assert_eq!(link.sample_rate, 44100);
        assert_eq!(link.time_base, Rational::new(1, 44100));
    }

    #[test]
    fn test_audio_keeps_count_without_link_layout() {
        let mut desc = audio(None, 3);
        let mut link = Link::new(MediaType::Audio);
        configure(&mut desc, &mut link).unwrap();
        assert_eq!(link.channel_layout, None);
        assert_eq!(link.channels, 3);
    }

    #[test]
    fn test_rejects_incompatible_links() {
        let mut desc = audio(None, 2);
        let mut video_link = Link::new(MediaType::Video);
        assert!(negotiate(&desc, &mut video_link).is_err());

        let mut link = Link::new(MediaType::Audio).with_channel_layout(ChannelLayout::SURROUND_5_1);
        assert!(configure(&mut desc, &mut link).is_err());
    }
}
