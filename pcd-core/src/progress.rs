use std::time::{Duration, Instant};

pub const STATUS_PRINT_INTERVAL: Duration = Duration::from_secs(1);

/// Receives progress of long-running loops.
pub trait ProgressObserver {
    fn report(&mut self, stage: &str, done: usize, total: usize);
}

pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn report(&mut self, _stage: &str, _done: usize, _total: usize) {}
}

pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn report(&mut self, stage: &str, done: usize, total: usize) {
        log::info!("{}% {}", percent(done, total), stage);
    }
}

pub fn percent(done: usize, total: usize) -> usize {
    if total == 0 {
        100
    } else {
        (done.min(total) * 100) / total
    }
}

/// Forwards at most one report per interval to the wrapped observer.
pub struct ThrottledProgress<O> {
    inner: O,
    interval: Duration,
    last: Instant,
}

impl<O: ProgressObserver> ThrottledProgress<O> {
    pub fn new(inner: O) -> Self {
        Self::with_interval(inner, STATUS_PRINT_INTERVAL)
    }

    pub fn with_interval(inner: O, interval: Duration) -> Self {
        Self {
            inner,
            interval,
            last: Instant::now(),
        }
    }

    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: ProgressObserver> ProgressObserver for ThrottledProgress<O> {
    fn report(&mut self, stage: &str, done: usize, total: usize) {
        let now = Instant::now();
        if now.duration_since(self.last) >= self.interval {
            self.last = now;
            self.inner.report(stage, done, total);
        }
    }
}

impl<T: ProgressObserver + ?Sized> ProgressObserver for &mut T {
    fn report(&mut self, stage: &str, done: usize, total: usize) {
        (**self).report(stage, done, total);
    }
}
