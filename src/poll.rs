//! Fixed-cadence driver.
//!
//! Runs a cycle, then sleeps until the next tick or the end of the run,
//! whichever comes first. Cycles never overlap: a slow cycle only delays
//! the next one.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Stand-in end for run times past what `Instant` can represent (~30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// What to do after a cycle finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// Sleep this long before the next cycle.
    Sleep(Duration),
    /// The cycle ran past its tick by this much; start the next one now.
    Overrun(Duration),
    /// The run is over.
    Done,
}

/// Decide how to wait after a cycle that was due to finish by `next_tick`.
pub fn next_wait(now: Instant, next_tick: Instant, end: Instant) -> Wait {
    if now >= end {
        Wait::Done
    } else if now >= next_tick {
        Wait::Overrun(now - next_tick)
    } else {
        Wait::Sleep(next_tick.min(end) - now)
    }
}

/// Run `cycle` every `interval` until `run_for` has elapsed.
///
/// Returns the number of completed cycles. The first error from a cycle
/// ends the loop.
pub async fn run_poll_loop<F, Fut, E>(
    run_for: Duration,
    interval: Duration,
    mut cycle: F,
) -> Result<u32, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let start = Instant::now();
    let end = start
        .checked_add(run_for)
        .unwrap_or_else(|| start + FAR_FUTURE);
    let mut cycles = 0;

    loop {
        let now = Instant::now();
        if now >= end {
            break;
        }
        let next_tick = now.checked_add(interval).unwrap_or(end);

        cycle().await?;
        cycles += 1;

        match next_wait(Instant::now(), next_tick, end) {
            Wait::Done => break,
            Wait::Overrun(by) => {
                tracing::warn!("Wait time too low. ({}s behind schedule)", by.as_secs());
            }
            Wait::Sleep(duration) => {
                tracing::info!("Waiting {} seconds...", duration.as_secs());
                tokio::time::sleep(duration).await;
            }
        }
    }

    tracing::info!("Run time elapsed after {} report(s).", cycles);
    Ok(cycles)
}
