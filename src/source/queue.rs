//! Ordered frame storage shared by the producer and the graph.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;

use crate::av::Frame;
use crate::error::{BufferSrcError, Result};

/// Queue depth at which the first "frames piling up" warning is logged.
pub const DEFAULT_WARNING_LIMIT: usize = 100;

/// Where a stream is in its lifetime, as seen from the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Accepting frames.
    Ready,
    /// End of stream signaled; frames may still be waiting.
    Draining,
    /// End of stream delivered to the consumer.
    Closed,
}

/// Non-consuming view of the queue, as reported to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    /// This many frames can be popped right now.
    Frames(usize),
    /// Nothing queued and nothing more will come.
    Ended,
}

struct QueueInner {
    frames: VecDeque<Frame>,
    eof: bool,
    eof_delivered: bool,
    failed_requests: u64,
    warning_limit: usize,
}

/// FIFO of owned frames with an end-of-stream latch and a starvation
/// counter.
///
/// One mutex guards everything, so a frame is either fully queued or not
/// visible at all. Neither side ever waits for the other.
pub struct FrameQueue {
    inner: Mutex<QueueInner>,
}

impl fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("FrameQueue")
            .field("len", &inner.frames.len())
            .field("eof", &inner.eof)
            .field("failed_requests", &inner.failed_requests)
            .finish()
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameQueue {
    /// Creates an empty queue with the default warning limit.
    pub fn new() -> Self {
        Self::with_warning_limit(DEFAULT_WARNING_LIMIT)
    }

    /// Creates a queue that starts warning once `limit` frames are waiting.
    pub fn with_warning_limit(limit: usize) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                frames: VecDeque::new(),
                eof: false,
                eof_delivered: false,
                failed_requests: 0,
                warning_limit: limit.max(1),
            }),
        }
    }

    /// Appends a frame, or latches end of stream for `None`.
    ///
    /// Returns the queue length after the push.
    ///
    /// # Errors
    ///
    /// - [`BufferSrcError::StreamClosed`] for a frame pushed after end of stream
    /// - [`BufferSrcError::OutOfMemory`] if the queue cannot grow
    pub fn push(&self, frame: Option<Frame>) -> Result<usize> {
        let mut inner = self.inner.lock();

        let frame = match frame {
            Some(frame) => frame,
            None => {
                inner.eof = true;
                return Ok(inner.frames.len());
            }
        };
        if inner.eof {
            return Err(BufferSrcError::StreamClosed);
        }

        inner.frames.try_reserve(1)?;
        inner.frames.push_back(frame);

        let len = inner.frames.len();
        if len > inner.warning_limit {
            log::warn!("{} frames queued, something may be wrong", len);
            inner.warning_limit = inner.warning_limit.saturating_mul(2);
        }
        Ok(len)
    }

    /// Removes the oldest frame.
    ///
    /// # Errors
    ///
    /// - [`BufferSrcError::EndOfStream`] when empty and end of stream was signaled
    /// - [`BufferSrcError::WouldBlock`] when empty otherwise; this also bumps
    ///   the failed request counter
    pub fn pop(&self) -> Result<Frame> {
        let mut inner = self.inner.lock();
        match inner.frames.pop_front() {
            Some(frame) => Ok(frame),
            None if inner.eof => {
                inner.eof_delivered = true;
                Err(BufferSrcError::EndOfStream)
            }
            None => {
                inner.failed_requests += 1;
                Err(BufferSrcError::WouldBlock)
            }
        }
    }

    /// Number of pops that found the queue empty before end of stream.
    pub fn failed_request_count(&self) -> u64 {
        self.inner.lock().failed_requests
    }

    /// Frames ready to pop, or [`Pending::Ended`] once drained after end of stream.
    pub fn pending(&self) -> Pending {
        let inner = self.inner.lock();
        if inner.frames.is_empty() && inner.eof {
            Pending::Ended
        } else {
            Pending::Frames(inner.frames.len())
        }
    }

    /// Number of queued frames.
    pub fn len(&self) -> usize {
        self.inner.lock().frames.len()
    }

    /// Returns true when no frame is queued.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().frames.is_empty()
    }

    /// Returns true once end of stream was pushed.
    pub fn is_eof(&self) -> bool {
        self.inner.lock().eof
    }

    /// Where the stream is in its lifetime.
    pub fn state(&self) -> QueueState {
        let inner = self.inner.lock();
        if inner.eof_delivered {
            QueueState::Closed
        } else if inner.eof {
            QueueState::Draining
        } else {
            QueueState::Ready
        }
    }

    /// Moves the depth at which the next warning fires. Queued frames, the
    /// end-of-stream latch and the failed request counter are untouched.
    pub fn set_warning_limit(&self, limit: usize) {
        self.inner.lock().warning_limit = limit.max(1);
    }

    /// Current depth at which the next warning fires.
    pub fn warning_limit(&self) -> usize {
        self.inner.lock().warning_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::av::{PixelFormat, VideoFrame};
    use pretty_assertions::assert_eq;
    use quickcheck_macros::quickcheck;

    fn frame(pts: i64) -> Frame {
        VideoFrame::new(2, 2, PixelFormat::Gray).with_pts(pts).into()
    }

    #[test]
    fn test_fifo_order() {
        let queue = FrameQueue::new();
        for pts in 0..5 {
            queue.push(Some(frame(pts))).unwrap();
        }
        assert_eq!(queue.len(), 5);
        for pts in 0..5 {
            assert_eq!(queue.pop().unwrap().pts(), Some(pts));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_starvation_counting() {
        let queue = FrameQueue::new();
        for _ in 0..3 {
            assert!(queue.pop().unwrap_err().is_would_block());
        }
        assert_eq!(queue.failed_request_count(), 3);

        queue.push(Some(frame(1))).unwrap();
        queue.pop().unwrap();
        assert_eq!(queue.failed_request_count(), 3);
    }

    #[test]
    fn test_eof_latch() {
        let queue = FrameQueue::new();
        queue.push(Some(frame(0))).unwrap();
        queue.push(None).unwrap();
        assert_eq!(queue.state(), QueueState::Draining);
        assert_eq!(queue.pending(), Pending::Frames(1));

        assert!(matches!(queue.push(Some(frame(1))), Err(BufferSrcError::StreamClosed)));
        assert_eq!(queue.pop().unwrap().pts(), Some(0));
        assert_eq!(queue.pending(), Pending::Ended);

        for _ in 0..3 {
            assert!(queue.pop().unwrap_err().is_eof());
        }
        assert_eq!(queue.state(), QueueState::Closed);
        assert_eq!(queue.failed_request_count(), 0);
        assert!(matches!(queue.push(Some(frame(2))), Err(BufferSrcError::StreamClosed)));
    }

    #[test]
    fn test_warning_limit_doubles() {
        let queue = FrameQueue::with_warning_limit(2);
        for pts in 0..3 {
            queue.push(Some(frame(pts))).unwrap();
        }
        assert_eq!(queue.warning_limit(), 4);
        queue.push(Some(frame(3))).unwrap();
        assert_eq!(queue.warning_limit(), 4);
        queue.push(Some(frame(4))).unwrap();
        assert_eq!(queue.warning_limit(), 8);
    }

    #[test]
    fn test_set_warning_limit_keeps_state() {
        let queue = FrameQueue::new();
        queue.push(Some(frame(0))).unwrap();
        queue.pop().unwrap();
        assert!(queue.pop().is_err());
        queue.push(Some(frame(1))).unwrap();
        queue.push(None).unwrap();

        queue.set_warning_limit(5);
        assert_eq!(queue.warning_limit(), 5);
        assert_eq!(queue.pending(), Pending::Frames(1));
        assert_eq!(queue.failed_request_count(), 1);
        assert_eq!(queue.state(), QueueState::Draining);

        queue.set_warning_limit(0);
        assert_eq!(queue.warning_limit(), 1);
    }

    #[quickcheck]
    fn prop_pop_order_matches_push_order(pts: Vec<i64>) -> bool {
        let queue = FrameQueue::new();
        for p in &pts {
            queue.push(Some(frame(*p))).unwrap();
        }
        queue.push(None).unwrap();

        let mut out = Vec::new();
        while let Ok(f) = queue.pop() {
            out.push(f.pts().unwrap());
        }
        out == pts && queue.state() == QueueState::Closed
    }

    #[quickcheck]
    fn prop_failed_requests_count_empty_pops(k: u8) -> bool {
        let queue = FrameQueue::new();
        for _ in 0..k {
            let _ = queue.pop();
        }
        queue.failed_request_count() == k as u64
    }
}
