//! # Buffer source
//!
//! A [`BufferSource`] is the entry point of a filter graph for frames that
//! come from outside it. A producer pushes frames in; the graph pulls them
//! out one at a time through [`BufferSource::request_frame`].
//!
//! ```text
//!  producer                    BufferSource                       graph
//!  ────────                    ────────────                       ─────
//!  push_frame ──► format gate ──► FrameQueue ──► request_frame ──► FrameSink
//!  push_eof   ──────────────────► EOF latch       poll_frame
//!                                                 negotiate_formats / configure_link
//! ```
//!
//! Neither side ever blocks. An empty queue answers
//! [`BufferSrcError::WouldBlock`] and counts the miss; an empty queue after
//! [`BufferSource::push_eof`] answers [`BufferSrcError::EndOfStream`].
//!
//! ## Example
//!
//! ```rust
//! use vdk_buffersrc::av::{AudioFrame, ChannelLayout, SampleFormat};
//! use vdk_buffersrc::config::AudioParams;
//! use vdk_buffersrc::source::{BufferSource, PushFlags};
//!
//! # fn main() -> vdk_buffersrc::Result<()> {
//! let src = BufferSource::with_config(
//!     "in",
//!     AudioParams::new(48000, SampleFormat::S16, ChannelLayout::STEREO),
//! )?;
//!
//! let frame = AudioFrame::new(1024, SampleFormat::S16, 48000, ChannelLayout::STEREO);
//! src.push_frame(frame.into(), PushFlags::empty())?;
//! src.push_eof()?;
//!
//! assert_eq!(src.pop()?.as_audio().map(|a| a.nb_samples), Some(1024));
//! assert!(src.pop().unwrap_err().is_eof());
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::av::{Frame, MediaType, StreamDescriptor};
use crate::config::{ConfigError, SourceConfig};
use crate::error::{BufferSrcError, Result};
use crate::link::{FrameSink, Link};

pub mod gate;
pub mod negotiate;
mod queue;

pub use gate::Admission;
pub use queue::{FrameQueue, Pending, QueueState, DEFAULT_WARNING_LIMIT};

bitflags::bitflags! {
    /// Options for a single push.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PushFlags: u32 {
        /// Skip the stream format check for this frame.
        const NO_FORMAT_CHECK = 1;
        /// Run one request/emit cycle right after the frame is queued.
        const PUSH_IMMEDIATE = 4;
        /// The caller keeps its own reference to the frame. Ownership
        /// expresses this directly: [`BufferSource::write_frame`] borrows and
        /// [`BufferSource::push_frame`] consumes, so the bit is accepted
        /// but has no further effect.
        const KEEP_REF = 8;
    }
}

/// Lifecycle of a buffer source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Waiting for [`BufferSource::configure`].
    Configuring,
    /// Accepting frames.
    Ready,
    /// End of stream pushed, frames may still be queued.
    Draining,
    /// End of stream delivered to the graph.
    Closed,
}

/// Push-to-pull bridge feeding one output link.
///
/// Shareable between one producer thread and the graph executor through an
/// `Arc`. The connected [`FrameSink`] runs with the output slot locked, so
/// it must not push into the same source.
pub struct BufferSource {
    name: String,
    media_type: MediaType,
    descriptor: RwLock<Option<StreamDescriptor>>,
    queue: FrameQueue,
    output: Mutex<Option<Box<dyn FrameSink>>>,
    link_configured: AtomicBool,
    frames_emitted: AtomicBool,
    eof_forwarded: AtomicBool,
}

impl fmt::Debug for BufferSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferSource")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("state", &self.state())
            .field("queue", &self.queue)
            .finish()
    }
}

impl BufferSource {
    /// Creates an unconfigured source.
    pub fn new(name: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            name: name.into(),
            media_type,
            descriptor: RwLock::new(None),
            queue: FrameQueue::new(),
            output: Mutex::new(None),
            link_configured: AtomicBool::new(false),
            frames_emitted: AtomicBool::new(false),
            eof_forwarded: AtomicBool::new(false),
        }
    }

    /// Creates and configures a source in one step.
    pub fn with_config(name: impl Into<String>, config: impl Into<SourceConfig>) -> Result<Self> {
        let config = config.into();
        let src = Self::new(name, config.media_type());
        src.configure(config)?;
        Ok(src)
    }

    /// Creates a source from an option string such as
    /// `sample_rate=48000:sample_fmt=s16:channel_layout=stereo`.
    pub fn from_args(name: impl Into<String>, media_type: MediaType, args: &str) -> Result<Self> {
        let src = Self::new(name, media_type);
        src.configure_str(args)?;
        Ok(src)
    }

    /// Sets the queue depth of the next backlog warning. Queued frames and
    /// counters are left alone.
    pub fn with_warning_limit(self, limit: usize) -> Self {
        self.queue.set_warning_limit(limit);
        self
    }

    /// Name used in log messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Media type fixed at construction.
    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Sets the stream parameters. Must be called exactly once, before any
    /// push.
    pub fn configure(&self, config: SourceConfig) -> Result<()> {
        if config.media_type() != self.media_type {
            return Err(ConfigError::MediaTypeMismatch {
                expected: self.media_type,
                found: config.media_type(),
            }
            .into());
        }

        let mut slot = self.descriptor.write();
        if slot.is_some() {
            return Err(ConfigError::AlreadyConfigured.into());
        }
        let descriptor = config.validate()?;
        log::debug!("{}: {}", self.name, descriptor);
        *slot = Some(descriptor);
        Ok(())
    }

    /// Parses an option string and configures the source with it.
    pub fn configure_str(&self, args: &str) -> Result<()> {
        let config = SourceConfig::parse(self.media_type, args)?;
        self.configure(config)
    }

    /// The stream descriptor, once configured.
    pub fn descriptor(&self) -> Option<StreamDescriptor> {
        self.descriptor.read().clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SourceState {
        if self.descriptor.read().is_none() {
            return SourceState::Configuring;
        }
        match self.queue.state() {
            QueueState::Ready => SourceState::Ready,
            QueueState::Draining => SourceState::Draining,
            QueueState::Closed => SourceState::Closed,
        }
    }

    /// Attaches the downstream consumer used by [`BufferSource::request_frame`]
    /// and by pushes with [`PushFlags::PUSH_IMMEDIATE`].
    pub fn connect(&self, sink: impl FrameSink + 'static) {
        *self.output.lock() = Some(Box::new(sink));
    }

    /// Detaches and returns the downstream consumer.
    pub fn disconnect(&self) -> Option<Box<dyn FrameSink>> {
        self.output.lock().take()
    }

    /// Hands `frame` over to the source.
    pub fn push_frame(&self, frame: Frame, flags: PushFlags) -> Result<()> {
        self.add_frame(Some(frame), flags)
    }

    /// Queues a new reference to `frame`; the caller's handle stays valid.
    /// The reference is only taken once the frame has been admitted.
    pub fn write_frame(&self, frame: &Frame, flags: PushFlags) -> Result<()> {
        self.admit(Cow::Borrowed(frame), flags)
    }

    /// Signals that no more frames will be pushed. Repeating it is harmless.
    pub fn push_eof(&self) -> Result<()> {
        self.add_frame(None, PushFlags::empty())
    }

    /// Pushes a frame, or end of stream for `None`.
    ///
    /// # Errors
    ///
    /// - [`BufferSrcError::InvalidArgument`] when the source is not
    ///   configured, the frame's layout disagrees with its channel count,
    ///   the frame is of the wrong media type, an audio frame does not
    ///   match the stream, or [`PushFlags::PUSH_IMMEDIATE`] is set with no
    ///   output connected; the frame is not queued in any of these cases
    /// - [`BufferSrcError::StreamClosed`] after end of stream
    /// - [`BufferSrcError::OutOfMemory`] if the queue cannot grow
    /// - whatever the sink returns, with [`PushFlags::PUSH_IMMEDIATE`]
    pub fn add_frame(&self, frame: Option<Frame>, flags: PushFlags) -> Result<()> {
        match frame {
            Some(frame) => self.admit(Cow::Owned(frame), flags),
            None => {
                self.require_configured()?;
                let pending = self.queue.push(None)?;
                log::debug!("{}: end of stream, {} frames left", self.name, pending);
                Ok(())
            }
        }
    }

    fn admit(&self, frame: Cow<'_, Frame>, flags: PushFlags) -> Result<()> {
        gate::check_channel_consistency(&frame)?;

        if self.queue.is_eof() {
            return Err(BufferSrcError::StreamClosed);
        }

        {
            let descriptor = self.descriptor.read();
            let descriptor = descriptor.as_ref().ok_or_else(|| self.not_configured())?;
            gate::check_media_type(descriptor, &frame)?;
            if !flags.contains(PushFlags::NO_FORMAT_CHECK) {
                gate::check_format(&self.name, descriptor, &frame)?;
            }
        }

        if !flags.contains(PushFlags::PUSH_IMMEDIATE) {
            self.queue.push(Some(frame.into_owned()))?;
            return Ok(());
        }

        // Held across the push so the sink cannot go away in between.
        let mut output = self.output.lock();
        let sink = output.as_mut().ok_or_else(|| self.no_output())?;
        self.queue.push(Some(frame.into_owned()))?;
        self.emit(&mut **sink)
    }

    /// Takes the oldest queued frame.
    pub fn pop(&self) -> Result<Frame> {
        // Read side of the descriptor lock orders this against configure_link.
        let _descriptor = self.descriptor.read();
        let frame = self.queue.pop()?;
        self.frames_emitted.store(true, Ordering::Release);
        Ok(frame)
    }

    /// Pops one frame and forwards it to the connected sink.
    ///
    /// [`BufferSrcError::WouldBlock`] is returned as is. On
    /// [`BufferSrcError::EndOfStream`] the sink's `end_of_stream` hook runs
    /// the first time.
    pub fn request_frame(&self) -> Result<()> {
        let mut output = self.output.lock();
        let sink = output.as_mut().ok_or_else(|| self.no_output())?;
        self.emit(&mut **sink)
    }

    fn emit(&self, sink: &mut dyn FrameSink) -> Result<()> {
        match self.pop() {
            Ok(frame) => sink.filter_frame(frame),
            Err(BufferSrcError::EndOfStream) => {
                if !self.eof_forwarded.swap(true, Ordering::AcqRel) {
                    sink.end_of_stream()?;
                }
                Err(BufferSrcError::EndOfStream)
            }
            Err(e) => Err(e),
        }
    }

    /// How many frames can be requested right now, or [`Pending::Ended`].
    pub fn poll_frame(&self) -> Pending {
        self.pending_count()
    }

    /// Same as [`BufferSource::poll_frame`].
    pub fn pending_count(&self) -> Pending {
        self.queue.pending()
    }

    /// Number of requests that found the queue empty before end of stream.
    pub fn failed_request_count(&self) -> u64 {
        self.queue.failed_request_count()
    }

    /// Offers this stream's single format on `link`.
    pub fn negotiate_formats(&self, link: &mut Link) -> Result<()> {
        let descriptor = self.descriptor.read();
        let descriptor = descriptor.as_ref().ok_or_else(|| self.not_configured())?;
        negotiate::negotiate(descriptor, link)
    }

    /// Writes the negotiated stream properties onto `link`. Runs once,
    /// before the first frame is emitted.
    pub fn configure_link(&self, link: &mut Link) -> Result<()> {
        let mut descriptor = self.descriptor.write();
        if self.frames_emitted.load(Ordering::Acquire) {
            return Err(BufferSrcError::invalid(format!(
                "{}: link configured after frames were emitted",
                self.name
            )));
        }
        let descriptor = descriptor.as_mut().ok_or_else(|| self.not_configured())?;
        if self.link_configured.load(Ordering::Acquire) {
            return Err(BufferSrcError::invalid(format!("{}: link already configured", self.name)));
        }
        negotiate::configure(descriptor, link)?;
        self.link_configured.store(true, Ordering::Release);
        Ok(())
    }

    fn require_configured(&self) -> Result<()> {
        if self.descriptor.read().is_none() {
            return Err(self.not_configured());
        }
        Ok(())
    }

    fn no_output(&self) -> BufferSrcError {
        BufferSrcError::invalid(format!("{}: no output connected", self.name))
    }

    fn not_configured(&self) -> BufferSrcError {
        BufferSrcError::invalid(format!("{}: stream is not configured", self.name))
    }
}

impl Drop for BufferSource {
    fn drop(&mut self) {
        let left = self.queue.len();
        if left > 0 {
            log::debug!("{}: releasing {} unconsumed frames", self.name, left);
        }
    }
}
