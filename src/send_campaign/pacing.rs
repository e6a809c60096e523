//! Send pacing: a long pause after every full batch plus a random pause
//! after every attempted send.

use std::num::NonZeroUsize;
use std::ops::Range;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::errors::Error;

/// Default per-send jitter, `[2s, 5s)`.
pub const DEFAULT_JITTER: Range<Duration> = Duration::from_secs(2)..Duration::from_secs(5);

/// A suspension requested by the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    Batch(Duration),
    Jitter(Duration),
}

impl Pause {
    pub fn duration(&self) -> Duration {
        match self {
            Pause::Batch(duration) | Pause::Jitter(duration) => *duration,
        }
    }
}

/// Decides how long the dispatch loop waits between sends.
#[derive(Debug, Clone)]
pub struct PacingPolicy {
    batch_size: NonZeroUsize,
    batch_delay: Duration,
    jitter: Range<Duration>,
}

impl PacingPolicy {
    /// Creates a policy with the default jitter; `batch_size` must be positive.
    pub fn new(batch_size: usize, batch_delay: Duration) -> Result<Self, Error> {
        let batch_size = NonZeroUsize::new(batch_size)
            .ok_or_else(|| Error::Config("Batch size must be greater than zero".to_owned()))?;
        Ok(Self {
            batch_size,
            batch_delay,
            jitter: DEFAULT_JITTER,
        })
    }

    /// Replaces the per-send jitter range. An empty range pauses for its start.
    #[must_use]
    pub fn with_jitter(mut self, jitter: Range<Duration>) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.get()
    }

    /// Batch pause owed after `attempted` sends, if any.
    pub fn batch_pause(&self, attempted: usize) -> Option<Duration> {
        (attempted > 0 && attempted % self.batch_size.get() == 0).then_some(self.batch_delay)
    }

    /// Random pause taken after every attempted send.
    pub fn jitter(&self) -> Duration {
        if self.jitter.is_empty() {
            return self.jitter.start;
        }
        rand::rng().random_range(self.jitter.clone())
    }
}

/// Performs the suspensions requested by the dispatch loop.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, pause: Pause);
}

/// Pacer that suspends the task on the tokio timer.
pub struct SleepPacer;

#[async_trait]
impl Pacer for SleepPacer {
    async fn pause(&self, pause: Pause) {
        let duration = pause.duration();
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
