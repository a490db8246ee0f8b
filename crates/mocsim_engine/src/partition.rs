//! Pure job-to-seed-range partitioning.
//!
//! A job is identified only by a monotonically increasing index; its seed
//! range is fully reconstructible from `(index, job_size, trial_count)`.
//! The server persists nothing about issued jobs.

use crate::error::{Error, Result};
use std::ops::RangeInclusive;

/// How many trials one job assigns to a client.
///
/// Compile-time constant on both ends. It is not covered by the
/// definition checksum, so it must never become runtime-configurable:
/// ends disagreeing on the job size would partition the seed space
/// differently without any handshake failure.
pub const CLIENT_JOB_SIZE: u32 = 1024;

/// Maps a job index to its inclusive seed range.
///
/// `min` is `job_size * index`; `max` is one before the next job's start,
/// clamped to the last trial. Returns `None` for an index past the end of
/// the seed space — such a job is invalid and must not be issued.
pub fn seed_range(
    job_index: u32,
    job_size: u32,
    trial_count: u32,
) -> Option<RangeInclusive<u64>> {
    let min = u64::from(job_size) * u64::from(job_index);
    let last_seed = u64::from(trial_count).checked_sub(1)?;
    let max = (u64::from(job_size) * (u64::from(job_index) + 1) - 1).min(last_seed);
    (min <= max).then_some(min..=max)
}

/// Like [`seed_range`], but treats an invalid index as an error.
///
/// # Errors
///
/// Returns [`Error::EmptyJob`] for an index past the end of the seed
/// space — a server handing one out is misbehaving.
pub fn assigned_seeds(
    job_index: u32,
    job_size: u32,
    trial_count: u32,
) -> Result<RangeInclusive<u64>> {
    seed_range(job_index, job_size, trial_count).ok_or(Error::EmptyJob {
        index: job_index,
        trial_count,
    })
}

/// How many jobs cover the whole seed space.
pub fn job_count(job_size: u32, trial_count: u32) -> u32 {
    trial_count.div_ceil(job_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn job_ranges_split_ten_trials_by_four() {
        assert_eq!(seed_range(0, 4, 10), Some(0..=3));
        assert_eq!(seed_range(1, 4, 10), Some(4..=7));
        assert_eq!(seed_range(2, 4, 10), Some(8..=9));
        assert_eq!(seed_range(3, 4, 10), None);
    }

    #[test]
    fn single_short_job_when_trials_fit() {
        assert_eq!(seed_range(0, 1024, 10), Some(0..=9));
        assert_eq!(seed_range(1, 1024, 10), None);
    }

    #[test]
    fn evenly_divisible_trials_produce_no_empty_job() {
        assert_eq!(job_count(4, 8), 2);
        assert_eq!(seed_range(2, 4, 8), None);
    }

    #[test]
    fn zero_trials_have_no_jobs() {
        assert_eq!(job_count(4, 0), 0);
        assert_eq!(seed_range(0, 4, 0), None);
    }

    #[test]
    fn assigned_seeds_reject_an_out_of_space_index() {
        assert_eq!(assigned_seeds(0, 4, 10), Ok(0..=3));
        assert_eq!(
            assigned_seeds(3, 4, 10),
            Err(Error::EmptyJob {
                index: 3,
                trial_count: 10,
            })
        );
    }

    proptest! {
        #[test]
        fn ranges_cover_the_seed_space_exactly(
            trial_count in 0u32..5_000,
            job_size in 1u32..600,
        ) {
            let jobs = job_count(job_size, trial_count);

            let mut next_expected = 0u64;
            for index in 0..jobs {
                let range = seed_range(index, job_size, trial_count)
                    .expect("every index below job_count is valid");
                prop_assert_eq!(*range.start(), next_expected);
                prop_assert!(range.start() <= range.end());
                next_expected = *range.end() + 1;
            }

            prop_assert_eq!(next_expected, u64::from(trial_count));
            prop_assert!(seed_range(jobs, job_size, trial_count).is_none());
        }
    }
}
