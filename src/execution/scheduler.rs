use async_trait::async_trait;
use tokio::time::{sleep, Duration};

/// Pause between the end of one scan and the start of the next
pub const CYCLE_INTERVAL: Duration = Duration::from_secs(60);

/// Source of cycle ticks for the trading loop
#[async_trait]
pub trait Scheduler: Send {
    /// Wait until the next cycle is due; `false` means stop scheduling
    async fn wait(&mut self) -> bool;
}

/// Sleeps a fixed period after every cycle, forever
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    period: Duration,
}

impl FixedDelay {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(CYCLE_INTERVAL)
    }
}

#[async_trait]
impl Scheduler for FixedDelay {
    async fn wait(&mut self) -> bool {
        tracing::debug!("⏳ Sleeping {:?} until next cycle", self.period);
        sleep(self.period).await;
        true
    }
}

/// Caps another scheduler at `max_cycles` cycles (at least one always runs)
#[derive(Debug, Clone)]
pub struct Limited<S> {
    inner: S,
    waits_left: usize,
}

impl<S: Scheduler> Limited<S> {
    pub fn new(inner: S, max_cycles: usize) -> Self {
        Self {
            inner,
            waits_left: max_cycles.saturating_sub(1),
        }
    }
}

#[async_trait]
impl<S: Scheduler> Scheduler for Limited<S> {
    async fn wait(&mut self) -> bool {
        if self.waits_left == 0 {
            return false;
        }
        self.waits_left -= 1;
        self.inner.wait().await
    }
}
