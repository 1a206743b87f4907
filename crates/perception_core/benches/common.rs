use std::time::Duration;

use criterion::{Criterion, Throughput};

/// Poisson runs take milliseconds; fewer, longer samples keep the total short.
pub const SAMPLING_SAMPLE_SIZE: usize = 30;
pub const SAMPLING_MEASUREMENT_TIME: Duration = Duration::from_secs(3);

/// Selection and tag queries take nanoseconds to microseconds.
pub const SELECTION_SAMPLE_SIZE: usize = 60;
pub const SELECTION_MEASUREMENT_TIME: Duration = Duration::from_millis(1500);

pub const WARM_UP: Duration = Duration::from_millis(750);

#[allow(dead_code)]
pub fn sampling_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLING_SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(SAMPLING_MEASUREMENT_TIME)
}

#[allow(dead_code)]
pub fn selection_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SELECTION_SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(SELECTION_MEASUREMENT_TIME)
        .noise_threshold(0.03)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}
