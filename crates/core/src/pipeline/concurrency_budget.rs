/// Peak recognizer concurrency of the two nested pools, checked against
/// the host's available parallelism.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConcurrencyBudget {
    pub file_workers: usize,
    pub chunk_workers: usize,
    pub available: usize,
}

impl ConcurrencyBudget {
    pub fn new(file_workers: usize, chunk_workers: usize, available: usize) -> Self {
        Self {
            file_workers: file_workers.max(1),
            chunk_workers: chunk_workers.max(1),
            available: available.max(1),
        }
    }

    /// Budget for this machine, using `std::thread::available_parallelism`.
    pub fn for_host(file_workers: usize, chunk_workers: usize) -> Self {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(file_workers, chunk_workers, available)
    }

    /// Maximum number of recognizer calls in flight at once.
    pub fn peak_inference_calls(&self) -> usize {
        self.file_workers.saturating_mul(self.chunk_workers)
    }

    pub fn is_oversubscribed(&self) -> bool {
        self.peak_inference_calls() > self.available
    }

    /// Threads each inference call may use without exceeding the host
    /// when every slot is busy. At least 1.
    pub fn threads_per_call(&self) -> usize {
        (self.available / self.peak_inference_calls()).max(1)
    }

    pub fn log(&self) {
        log::info!(
            "Concurrency: {} file workers x {} chunk workers = {} concurrent recognizer calls ({} CPUs, {} thread(s) per call)",
            self.file_workers,
            self.chunk_workers,
            self.peak_inference_calls(),
            self.available,
            self.threads_per_call()
        );
        if self.is_oversubscribed() {
            log::warn!(
                "{} concurrent recognizer calls exceed the {} available CPUs; consider lowering --workers or --chunk-workers",
                self.peak_inference_calls(),
                self.available
            );
        }
    }
}
