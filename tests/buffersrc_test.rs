#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tokio::time::{timeout, Duration};
    use tokio_test::{assert_err, assert_ok};
    use vdk_buffersrc::av::{AudioFrame, ChannelLayout, Frame, MediaType, PixelFormat, SampleFormat, VideoFrame};
    use vdk_buffersrc::config::AudioParams;
    use vdk_buffersrc::{BufferSource, BufferSrcError, Link, Pending, PushFlags, Result, SourceState};

    const FRAME_COUNT: i64 = 200;
    const TEST_DRAIN_TIMEOUT: u64 = 10;

    fn stereo_source() -> Arc<BufferSource> {
        Arc::new(
            BufferSource::with_config("abuffer", AudioParams::new(48000, SampleFormat::S16, ChannelLayout::STEREO))
                .unwrap(),
        )
    }

    fn stereo_frame(pts: i64) -> Frame {
        AudioFrame::new(1024, SampleFormat::S16, 48000, ChannelLayout::STEREO)
            .with_pts(pts)
            .into()
    }

    /// Pops until end of stream, yielding to the producer on starvation.
    async fn drain(src: Arc<BufferSource>) -> Result<Vec<i64>> {
        let mut seen = Vec::new();
        loop {
            match src.pop() {
                Ok(frame) => seen.push(frame.pts().unwrap_or(-1)),
                Err(BufferSrcError::WouldBlock) => tokio::task::yield_now().await,
                Err(BufferSrcError::EndOfStream) => return Ok(seen),
                Err(e) => return Err(e),
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_producer_preserves_order() {
        let src = stereo_source();

        let producer = {
            let src = src.clone();
            tokio::spawn(async move {
                for pts in 0..FRAME_COUNT {
                    src.push_frame(stereo_frame(pts * 1024), PushFlags::empty())?;
                    if pts % 16 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
                src.push_eof()
            })
        };

        let seen = timeout(Duration::from_secs(TEST_DRAIN_TIMEOUT), drain(src.clone()))
            .await
            .expect("consumer timed out")
            .unwrap();
        assert_ok!(producer.await.unwrap());

        let expected: Vec<i64> = (0..FRAME_COUNT).map(|pts| pts * 1024).collect();
        assert_eq!(seen, expected);
        assert_eq!(src.state(), SourceState::Closed);
        assert_eq!(src.poll_frame(), Pending::Ended);
    }

    #[tokio::test]
    async fn test_push_immediate_into_channel_sink() {
        let src = stereo_source();
        let (tx, mut rx) = mpsc::unbounded_channel();
        src.connect(move |frame: Frame| -> Result<()> {
            tx.send(frame)
                .map_err(|_| BufferSrcError::InvalidArgument("receiver dropped".into()))
        });

        for pts in 0..3 {
            assert_ok!(src.push_frame(stereo_frame(pts), PushFlags::PUSH_IMMEDIATE));
        }
        for pts in 0..3 {
            assert_eq!(rx.recv().await.unwrap().pts(), Some(pts));
        }
        assert_eq!(src.poll_frame(), Pending::Frames(0));

        drop(rx);
        assert_err!(src.push_frame(stereo_frame(3), PushFlags::PUSH_IMMEDIATE));
    }

    #[test]
    fn test_audio_stream_end_to_end() {
        let src = BufferSource::from_args(
            "abuffer",
            MediaType::Audio,
            "sample_rate=48000:sample_fmt=s16:channel_layout=stereo",
        )
        .unwrap();

        let mut link = Link::new(MediaType::Audio);
        assert_ok!(src.negotiate_formats(&mut link));
        assert_ok!(src.configure_link(&mut link));
        assert_eq!(link.sample_rate, 48000);
        assert_eq!(link.channels, 2);

        for pts in 0..3 {
            assert_ok!(src.push_frame(stereo_frame(pts * 1024), PushFlags::empty()));
        }
        for _ in 0..3 {
            let frame = src.pop().unwrap();
            assert_eq!(frame.as_audio().unwrap().nb_samples, 1024);
        }
        assert!(src.pop().unwrap_err().is_would_block());
        assert_eq!(src.failed_request_count(), 1);

        assert_ok!(src.push_eof());
        assert!(src.pop().unwrap_err().is_eof());
        assert!(src.pop().unwrap_err().is_eof());
        assert_eq!(src.failed_request_count(), 1);
    }

    #[test]
    fn test_video_stream_tolerates_resize() {
        let src = BufferSource::from_args(
            "buffer",
            MediaType::Video,
            "video_size=vga:pix_fmt=yuv420p:time_base=1/30:pixel_aspect=1/1",
        )
        .unwrap();

        assert_ok!(src.push_frame(VideoFrame::new(640, 480, PixelFormat::Yuv420p).into(), PushFlags::empty()));
        assert_ok!(src.push_frame(VideoFrame::new(320, 240, PixelFormat::Yuv420p).into(), PushFlags::empty()));
        assert_eq!(src.poll_frame(), Pending::Frames(2));

        let second = {
            src.pop().unwrap();
            src.pop().unwrap()
        };
        assert_eq!(second.as_video().unwrap().width, 320);
    }

    #[test]
    fn test_rejected_audio_leaves_queue_untouched() {
        let src = stereo_source();
        assert_ok!(src.push_frame(stereo_frame(0), PushFlags::empty()));

        let mono = AudioFrame::new(1024, SampleFormat::S16, 48000, ChannelLayout::MONO);
        assert_err!(src.push_frame(mono.into(), PushFlags::empty()));
        assert_eq!(src.poll_frame(), Pending::Frames(1));
        assert_eq!(src.pop().unwrap().pts(), Some(0));
    }
}
