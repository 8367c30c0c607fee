use std::time::Duration;

/// Wall-clock and throughput counters for one run.
#[derive(Debug, Default, Clone)]
pub struct TrainMetrics {
    pub load_time: Duration,
    pub train_time: Duration,
    pub eval_time: Duration,

    pub steps: u64,
    pub samples: u64,
}

impl TrainMetrics {
    #[inline]
    pub fn bump_step(&mut self) {
        self.steps += 1;
    }

    #[inline]
    pub fn add_samples(&mut self, n: usize) {
        self.samples += n as u64;
    }
}
