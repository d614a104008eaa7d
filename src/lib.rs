#![doc(html_root_url = "https://docs.rs/vdk-buffersrc/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

//! # vdk-buffersrc - frame ingestion for filter graphs
//!
//! `vdk-buffersrc` turns frames that an application pushes at its own pace
//! into a stream a filter graph can pull from. Each [`BufferSource`] is
//! configured once with a fixed stream format, checks incoming frames
//! against it, and queues them in order until the graph asks for one.
//!
//! ## Features
//!
//! - Video and audio sources with `key=value` option strings
//!   (plus the seven-field positional form for video)
//! - Per-frame format checks: video drift is tolerated, audio drift is refused
//! - Non-blocking pull side with end-of-stream and starvation accounting
//! - Single-format negotiation and link configuration for the graph
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! vdk-buffersrc = "0.1.0"
//! ```
//!
//! ### Feeding a video stream
//!
//! ```rust
//! use vdk_buffersrc::av::{MediaType, PixelFormat, VideoFrame};
//! use vdk_buffersrc::{BufferSource, BufferSrcError, PushFlags};
//!
//! # fn main() -> vdk_buffersrc::Result<()> {
//! let src = BufferSource::from_args("in", MediaType::Video, "320:240:yuv420p:1:25:1:1")?;
//!
//! for pts in 0..3 {
//!     let frame = VideoFrame::new(320, 240, PixelFormat::Yuv420p).with_pts(pts);
//!     src.push_frame(frame.into(), PushFlags::empty())?;
//! }
//! src.push_eof()?;
//!
//! loop {
//!     match src.pop() {
//!         Ok(frame) => println!("frame pts={:?}", frame.pts()),
//!         Err(BufferSrcError::EndOfStream) => break,
//!         Err(e) => return Err(e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - `av`: media types, formats, channel layouts, frames and stream descriptors
//! - `config`: option parsing and validation into stream descriptors
//! - `link`: the output link seen by the graph, and the [`FrameSink`] seam
//! - `source`: the buffer source itself, its queue and format gate
//! - `error`: error type and result alias

/// Audio/video base types
pub mod av;

/// Source configuration
pub mod config;

/// Error types and utilities
pub mod error;

/// Output link and downstream consumer
pub mod link;

/// Buffer source, frame queue and format gate
pub mod source;

pub use error::{BufferSrcError, Result};
pub use link::{FrameSink, Link};
pub use source::{BufferSource, Pending, PushFlags, SourceState};
