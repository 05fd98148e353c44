//! Animated uniform random pick.
//!
//! A pick is a small state machine:
//!
//! ```text
//! Idle ──begin──▶ Selecting { frame: 0, total: k } ──advance × k──▶ Selecting { frame: k }
//!                                                   ──advance──▶ Settled(item)
//! ```
//!
//! `k` is drawn uniformly from `20..=29`. Each intermediate frame shows an
//! item drawn uniformly with replacement; the settled item is one more
//! independent uniform draw, so every item settles with probability `1/len`
//! whatever the frames showed. The machine is driven by a [`Ticker`], which
//! is a tokio interval in the binary and an immediate ticker in tests.
//!
//! A selector accepts one pick at a time. Calling [`RandomSelector::begin`]
//! while a pick is in flight fails with [`SelectError::Busy`]. There is no
//! explicit cancel. Dropping a running [`RandomSelector::run`] future (for
//! example under `tokio::time::timeout`) returns the selector to `Idle`.

use std::future::Future;
use std::ops::RangeInclusive;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::models::Item;

/// Number of intermediate frames, drawn uniformly per pick.
pub const FRAME_RANGE: RangeInclusive<usize> = 20..=29;

/// Delay between frames.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("No items to choose from")]
    EmptyCollection,

    #[error("A selection is already in progress")]
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SpinState {
    #[default]
    Idle,
    Selecting {
        /// Frames shown so far.
        frame: usize,
        /// Frames to show before settling.
        total: usize,
        /// Item shown by the latest frame, `None` before the first one.
        current: Option<Item>,
    },
    Settled(Item),
}

impl SpinState {
    pub fn is_selecting(&self) -> bool {
        matches!(self, SpinState::Selecting { .. })
    }

    /// The item a front end should display right now.
    pub fn displayed(&self) -> Option<&Item> {
        match self {
            SpinState::Idle => None,
            SpinState::Selecting { current, .. } => current.as_ref(),
            SpinState::Settled(item) => Some(item),
        }
    }
}

/// Source of frame timing.
pub trait Ticker {
    /// Resolve when the next frame is due.
    fn tick(&mut self) -> impl Future<Output = ()> + Send;
}

/// Wall-clock ticker over a tokio interval.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        // The first frame is due one period after start, not immediately.
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

impl Default for IntervalTicker {
    fn default() -> Self {
        Self::new(FRAME_INTERVAL)
    }
}

impl Ticker for IntervalTicker {
    fn tick(&mut self) -> impl Future<Output = ()> + Send {
        async move {
            self.interval.tick().await;
        }
    }
}

/// Ticker that never waits. Counts how often it was polled for a frame.
#[derive(Debug, Default)]
pub struct ImmediateTicker {
    pub ticks: usize,
}

impl Ticker for ImmediateTicker {
    fn tick(&mut self) -> impl Future<Output = ()> + Send {
        self.ticks += 1;
        std::future::ready(())
    }
}

pub struct RandomSelector<R = StdRng> {
    rng: R,
    pool: Vec<Item>,
    state: watch::Sender<SpinState>,
}

impl RandomSelector<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible selector for tests and `--seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for RandomSelector<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomSelector<R> {
    pub fn with_rng(rng: R) -> Self {
        let (state, _) = watch::channel(SpinState::Idle);
        Self {
            rng,
            pool: Vec::new(),
            state,
        }
    }

    pub fn state(&self) -> SpinState {
        self.state.borrow().clone()
    }

    pub fn is_selecting(&self) -> bool {
        self.state.borrow().is_selecting()
    }

    /// Receive every state change, frames included.
    pub fn subscribe(&self) -> watch::Receiver<SpinState> {
        self.state.subscribe()
    }

    /// Start a pick over a snapshot of `items`. Returns the frame count.
    pub fn begin(&mut self, items: &[Item]) -> Result<usize, SelectError> {
        if items.is_empty() {
            return Err(SelectError::EmptyCollection);
        }
        if self.is_selecting() {
            return Err(SelectError::Busy);
        }

        let total = self.rng.gen_range(FRAME_RANGE);
        self.pool = items.to_vec();
        self.state.send_replace(SpinState::Selecting {
            frame: 0,
            total,
            current: None,
        });
        tracing::debug!("Starting pick over {} items, {} frames", items.len(), total);
        Ok(total)
    }

    /// Show the next frame, or settle once all frames were shown.
    ///
    /// Returns the new state, or `None` when no pick is in flight.
    pub fn advance(&mut self) -> Option<SpinState> {
        let (frame, total) = match &*self.state.borrow() {
            SpinState::Selecting { frame, total, .. } => (*frame, *total),
            _ => return None,
        };

        if frame >= total {
            self.settle();
        } else {
            let current = self.draw();
            tracing::debug!("Frame {}/{}: {}", frame + 1, total, current.name);
            self.state.send_replace(SpinState::Selecting {
                frame: frame + 1,
                total,
                current: Some(current),
            });
        }
        Some(self.state())
    }

    /// Run a whole pick, waiting on `ticker` before every step.
    pub async fn run<T: Ticker>(
        &mut self,
        items: &[Item],
        ticker: &mut T,
    ) -> Result<Item, SelectError> {
        self.run_observed(items, ticker, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `observe` with every frame and the
    /// settled state.
    pub async fn run_observed<T, F>(
        &mut self,
        items: &[Item],
        ticker: &mut T,
        mut observe: F,
    ) -> Result<Item, SelectError>
    where
        T: Ticker,
        F: FnMut(&SpinState),
    {
        let total = self.begin(items)?;
        let mut guard = ResetOnDrop {
            selector: self,
            settled: false,
        };
        for _ in 0..total {
            ticker.tick().await;
            if let Some(state) = guard.selector.advance() {
                observe(&state);
            }
        }
        ticker.tick().await;
        let item = guard.selector.settle();
        guard.settled = true;
        observe(&SpinState::Settled(item.clone()));
        Ok(item)
    }

    fn reset(&mut self) {
        self.pool.clear();
        self.state.send_replace(SpinState::Idle);
    }

    fn settle(&mut self) -> Item {
        let item = self.draw();
        self.pool.clear();
        tracing::debug!("Settled on {} ({})", item.name, item.id);
        self.state.send_replace(SpinState::Settled(item.clone()));
        item
    }

    // Only called while selecting, when the pool is non-empty.
    fn draw(&mut self) -> Item {
        let index = self.rng.gen_range(0..self.pool.len());
        self.pool[index].clone()
    }
}

/// Puts the selector back to `Idle` when a run is dropped before settling.
struct ResetOnDrop<'a, R: Rng> {
    selector: &'a mut RandomSelector<R>,
    settled: bool,
}

impl<R: Rng> Drop for ResetOnDrop<'_, R> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!("Pick dropped before settling");
            self.selector.reset();
        }
    }
}
