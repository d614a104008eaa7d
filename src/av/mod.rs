use std::fmt;

/// Kind of media carried by a stream or frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// Pictures.
    Video,
    /// Sound samples.
    Audio,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Video => f.write_str("video"),
            MediaType::Audio => f.write_str("audio"),
        }
    }
}

mod channel_layout;
mod format;
mod frame;
mod rational;
mod stream;

pub use channel_layout::*;
pub use format::*;
pub use frame::*;
pub use rational::*;
pub use stream::*;
