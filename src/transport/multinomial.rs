//! Multinomial sampling by sequential conditional binomials

use rand::Rng;
use rand_distr::{Binomial, Distribution};

/// Draw `n` trials over `probabilities` plus an implicit remainder bucket
///
/// Returns one count per listed outcome; whatever is left over fell into the
/// remainder. Callers guarantee each probability is non-negative and the sum
/// is at most 1 (up to rounding).
pub fn sample<R: Rng + ?Sized>(n: u64, probabilities: &[f64], rng: &mut R) -> Vec<u64> {
    let mut counts = Vec::with_capacity(probabilities.len());
    let mut remaining_trials = n;
    let mut remaining_mass = 1.0_f64;

    for &p in probabilities {
        if remaining_trials == 0 || p <= 0.0 {
            counts.push(0);
            continue;
        }

        let conditional = if remaining_mass > 0.0 {
            (p / remaining_mass).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let drawn = match Binomial::new(remaining_trials, conditional) {
            Ok(binomial) => binomial.sample(rng),
            // only reachable for a NaN conditional, which the clamp rules out
            Err(_) => 0,
        };

        counts.push(drawn);
        remaining_trials -= drawn;
        remaining_mass -= p;
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_counts_never_exceed_trials() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let counts = sample(50, &[0.2, 0.3, 0.1], &mut rng);
            assert_eq!(counts.len(), 3);
            assert!(counts.iter().sum::<u64>() <= 50);
        }
    }

    #[test]
    fn test_full_mass_uses_every_trial() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let counts = sample(40, &[0.5, 0.5], &mut rng);
        assert_eq!(counts.iter().sum::<u64>(), 40);
    }

    #[test]
    fn test_zero_probability_never_drawn() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let counts = sample(1000, &[0.0, 0.4], &mut rng);
        assert_eq!(counts[0], 0);
    }

    #[test]
    fn test_mean_roughly_matches() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let trials = 2000;
        let total: u64 = (0..trials).map(|_| sample(100, &[0.25], &mut rng)[0]).sum();
        let mean = total as f64 / trials as f64;
        // expected 25, generous tolerance
        assert!((23.0..=27.0).contains(&mean), "expected ~25, got {mean}");
    }

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        assert_eq!(sample(500, &[0.1, 0.2], &mut a), sample(500, &[0.1, 0.2], &mut b));
    }
}
