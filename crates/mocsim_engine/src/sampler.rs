//! Random draws for the distribution-backed variable kinds.

use rand::Rng;

/// Draws one integer uniformly from the inclusive range `[lower, upper]`.
///
/// The parser guarantees `lower <= upper`.
pub fn sample_uniform<R: Rng>(lower: i32, upper: i32, rng: &mut R) -> f64 {
    f64::from(rng.gen_range(lower..=upper))
}

/// Draws from a binomial distribution by inverse-CDF walk.
///
/// Draws one uniform real `r` in `[0, 1)` and accumulates the probability
/// mass `P(X=k)` for `k = 0, 1, 2, …` until the running sum reaches `r`,
/// returning that `k`. If no `k < trials` satisfies this (the numerical
/// tail), returns `trials`.
///
/// The mass is accumulated by incremental ratios,
/// `pmf(k+1) = pmf(k) * (n-k)/(k+1) * p/(1-p)`,
/// which stays in floating point and holds up for trial counts where
/// integer factorials would overflow.
pub fn sample_binomial<R: Rng>(trials: u32, success_probability: f64, rng: &mut R) -> f64 {
    let draw: f64 = rng.gen();

    // p == 1 would make the incremental ratio divide by zero; every draw
    // succeeds regardless.
    if success_probability >= 1.0 {
        return f64::from(trials);
    }

    let failure_probability = 1.0 - success_probability;
    #[allow(clippy::cast_possible_wrap)]
    let mut pmf = failure_probability.powi(trials as i32);
    let mut cumulative = pmf;
    let mut successes = 0u32;

    while cumulative < draw && successes < trials {
        pmf *= (f64::from(trials - successes) / f64::from(successes + 1))
            * (success_probability / failure_probability);
        successes += 1;
        cumulative += pmf;
    }

    f64::from(successes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn uniform_draws_stay_in_bounds_and_hit_endpoints() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut seen_lower = false;
        let mut seen_upper = false;

        for _ in 0..1_000 {
            let value = sample_uniform(1, 6, &mut rng);
            assert!((1.0..=6.0).contains(&value));
            assert!((value.fract()).abs() < f64::EPSILON);
            seen_lower |= (value - 1.0).abs() < f64::EPSILON;
            seen_upper |= (value - 6.0).abs() < f64::EPSILON;
        }

        assert!(seen_lower && seen_upper);
    }

    #[test]
    fn uniform_handles_negative_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let value = sample_uniform(-3, 3, &mut rng);
            assert!((-3.0..=3.0).contains(&value));
        }
    }

    #[test]
    fn binomial_with_zero_probability_is_always_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(sample_binomial(10, 0.0, &mut rng).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn binomial_with_certain_success_is_always_trials() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            assert!((sample_binomial(10, 1.0, &mut rng) - 10.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn binomial_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1_000 {
            let value = sample_binomial(20, 0.3, &mut rng);
            assert!((0.0..=20.0).contains(&value));
        }
    }

    #[test]
    fn binomial_mean_tracks_expected_value() {
        // Deterministic seed, so the observed mean is stable; n*p = 30.
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let draws = 5_000;
        let total: f64 = (0..draws)
            .map(|_| sample_binomial(100, 0.3, &mut rng))
            .sum();
        let mean = total / f64::from(draws);
        assert!((mean - 30.0).abs() < 1.0, "mean was {mean}");
    }

    #[test]
    fn binomial_survives_large_trial_counts() {
        // Integer factorials overflow long before n = 1000; the ratio
        // accumulation must not.
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let value = sample_binomial(1_000, 0.5, &mut rng);
        assert!((0.0..=1_000.0).contains(&value));
        assert!(value > 0.0);
    }

    #[test]
    fn zero_trials_always_yield_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(sample_binomial(0, 0.5, &mut rng).abs() < f64::EPSILON);
    }
}
