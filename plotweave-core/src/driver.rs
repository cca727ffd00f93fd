//! Frame Driver
//!
//! Connects a [`Stage`]'s virtual clock to wall time. The stage itself never
//! reads a clock; tests advance it by hand, and applications hand it to
//! [`drive`] on a tokio runtime.
//!
//! The stage holds boxed callbacks that are not `Send`, so the future
//! returned by `drive` must be polled on a current-thread runtime or inside
//! a `tokio::task::LocalSet`.

use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

use crate::animation::Stage;
use crate::config::ChartConfig;
use crate::Result;

/// Shortest frame period accepted by the driver.
pub const MIN_FRAME: Duration = Duration::from_millis(1);

/// Advance `stage` by real elapsed time once per `frame` until it is idle.
///
/// A slow frame is not made up for with a burst of ticks; the next advance
/// simply covers the longer gap. Returns the number of frames rendered.
pub async fn drive(stage: &mut Stage, frame: Duration) -> usize {
    let mut interval = time::interval(frame.max(MIN_FRAME));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut last = Instant::now();
    let mut frames = 0;
    while !stage.is_idle() {
        interval.tick().await;
        let now = Instant::now();
        stage.advance(now - last);
        last = now;
        frames += 1;
    }

    tracing::trace!(frames, now = ?stage.now(), "stage settled");
    frames
}

/// [`drive`] at the frame rate set by `config.frame_ms`.
///
/// Fails with [`Error::InvalidDuration`](crate::Error::InvalidDuration)
/// before any frame runs if the configured period is negative or not finite.
pub async fn drive_with_config(stage: &mut Stage, config: &ChartConfig) -> Result<usize> {
    let frame = config.frame_period()?;
    Ok(drive(stage, frame).await)
}
