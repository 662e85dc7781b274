use crate::sampling::StartSampler;

/// Uniform starts over `0..=periods - block`.
pub(super) fn start_sampler(periods: usize, block: usize) -> StartSampler {
    StartSampler::uniform(periods.saturating_sub(block) + 1)
}
