use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use vdk_buffersrc::av::{AudioFrame, Frame, MediaType, StreamDescriptor};
use vdk_buffersrc::{BufferSource, BufferSrcError, Link, PushFlags};

const NB_SAMPLES: usize = 1024;
const FRAMES: i64 = 50;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_rate=48000:sample_fmt=s16:channel_layout=stereo".to_string());

    println!("Configuring source with {}", args);
    let src = Arc::new(BufferSource::from_args("abuffer", MediaType::Audio, &args)?);
    let audio = match src.descriptor() {
        Some(StreamDescriptor::Audio(audio)) => audio,
        _ => return Err("not an audio stream".into()),
    };
    println!("Stream: {}", StreamDescriptor::Audio(audio.clone()));

    let mut link = Link::new(MediaType::Audio);
    src.negotiate_formats(&mut link)?;
    src.configure_link(&mut link)?;
    println!("Link: {} Hz, {} channels, tb {}", link.sample_rate, link.channels, link.time_base);

    // Producer: pushes at roughly real time.
    let producer = {
        let src = src.clone();
        tokio::spawn(async move {
            let period = Duration::from_secs_f64(NB_SAMPLES as f64 / audio.sample_rate as f64);
            for i in 0..FRAMES {
                let frame = AudioFrame::with_channels(NB_SAMPLES, audio.sample_format, audio.sample_rate, audio.channels)
                    .with_channel_layout(audio.channel_layout)
                    .with_pts(i * NB_SAMPLES as i64);
                src.push_frame(frame.into(), PushFlags::empty())?;
                sleep(period).await;
            }
            src.push_eof()
        })
    };

    // Consumer: polls the source the way a graph executor would.
    let mut received = 0usize;
    loop {
        match src.pop() {
            Ok(Frame::Audio(frame)) => {
                received += 1;
                if received % 10 == 0 {
                    println!("Received {} frames, last pts {:?}", received, frame.pts);
                }
            }
            Ok(Frame::Video(_)) => unreachable!("audio source emitted video"),
            Err(BufferSrcError::WouldBlock) => sleep(Duration::from_millis(5)).await,
            Err(BufferSrcError::EndOfStream) => break,
            Err(e) => return Err(e.into()),
        }
    }

    producer.await??;
    println!(
        "Done: {} frames received, {} empty polls",
        received,
        src.failed_request_count()
    );
    Ok(())
}
