//! Integration tests for Assist Privacy
//!
//! End-to-end releases through the public API: dispatcher, configuration,
//! multi-dimensional tensors and the leakage audit.

use assist_privacy::{
    differential_privacy, interval_privacy, leakage, perturb, seeded_rng, truncate, Interval,
    PrivacyConfig, PrivacyError, PrivacyMode, RunningStats, Scores,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn one_to_hundred() -> Scores {
    Scores::from_vec((1..=100).map(f64::from).collect())
}

// =============================================================================
// Uniform grid scenario
// =============================================================================

mod uniform_grid {
    use super::*;

    #[test]
    fn test_bounds_pinned_to_linear_interpolation() {
        let t = truncate(&one_to_hundred()).unwrap();
        assert!((t.bounds.lower - 3.475).abs() < 1e-9);
        assert!((t.bounds.upper - 97.525).abs() < 1e-9);
    }

    #[test]
    fn test_dp_differs_from_truncated_on_every_run() {
        let scores = one_to_hundred();
        let truncated = truncate(&scores).unwrap();

        for seed in 0..20 {
            let noisy = differential_privacy(&scores, 1.0, &mut seeded_rng(Some(seed))).unwrap();
            assert_ne!(noisy.as_slice(), truncated.scores.as_slice());
        }
    }

    #[test]
    fn test_ip_leakage_is_informative() {
        let scores = one_to_hundred();
        for seed in 0..20 {
            let release = interval_privacy(&scores, 1.0, &mut seeded_rng(Some(seed))).unwrap();
            assert!(
                release.leakage > 0.0 && release.leakage < 1.0,
                "seed {} gave leakage {}",
                seed,
                release.leakage
            );
        }
    }
}

// =============================================================================
// Multi-dimensional tensors (flatten, compute, reshape)
// =============================================================================

mod tensors {
    use super::*;

    fn normal_like_tensor() -> Scores {
        // Deterministic spread of values over [-3, 3]
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let data: Vec<f64> = (0..480)
            .map(|_| assist_privacy::uniform(&mut rng, -3.0, 3.0))
            .collect();
        Scores::from_shape(vec![10, 3, 4, 4], data).unwrap()
    }

    #[test]
    fn test_dp_and_ip_keep_tensor_shape() {
        let scores = normal_like_tensor();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let dp = differential_privacy(&scores, 1.0, &mut rng).unwrap();
        let ip = interval_privacy(&scores, 1.0, &mut rng).unwrap();

        assert_eq!(dp.shape(), &[10, 3, 4, 4]);
        assert_eq!(ip.scores.shape(), &[10, 3, 4, 4]);
        assert_eq!(ip.intervals.shape(), &[10, 3, 4, 4, 2]);
    }

    #[test]
    fn test_percentiles_are_taken_over_the_whole_tensor() {
        let scores = normal_like_tensor();
        let flat = Scores::from_vec(scores.as_slice().to_vec());
        assert_eq!(truncate(&scores).unwrap().bounds, truncate(&flat).unwrap().bounds);
    }

    #[test]
    fn test_tensor_release_equals_flat_release() {
        let scores = normal_like_tensor();
        let flat = Scores::from_vec(scores.as_slice().to_vec());

        let a = interval_privacy(&scores, 2.0, &mut seeded_rng(Some(5))).unwrap();
        let b = interval_privacy(&flat, 2.0, &mut seeded_rng(Some(5))).unwrap();

        assert_eq!(a.scores.as_slice(), b.scores.as_slice());
        assert_eq!(a.intervals.as_slice(), b.intervals.as_slice());
        assert_eq!(a.leakage, b.leakage);
    }
}

// =============================================================================
// Dispatcher and configuration
// =============================================================================

mod dispatch {
    use super::*;

    #[test]
    fn test_unknown_mode() {
        let err = perturb(&one_to_hundred(), "xyz", 1.0, &mut seeded_rng(Some(1))).unwrap_err();
        assert!(matches!(err, PrivacyError::UnsupportedMode(_)));
    }

    #[test]
    fn test_zero_alpha() {
        let err = perturb(&one_to_hundred(), "dp", 0.0, &mut seeded_rng(Some(1))).unwrap_err();
        assert!(matches!(err, PrivacyError::InvalidParameter { name: "alpha", .. }));
    }

    #[test]
    fn test_config_driven_release_is_reproducible() {
        let config = PrivacyConfig::from_json_str(r#"{"mode": "ip", "param": 0.5, "seed": 11}"#).unwrap();
        assert_eq!(config.mode, PrivacyMode::Ip);

        let scores = one_to_hundred();
        let a = config.apply(&scores, &mut seeded_rng(config.seed)).unwrap();
        let b = config.apply(&scores, &mut seeded_rng(config.seed)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_input_untouched_by_release() {
        let scores = one_to_hundred();
        let before = scores.clone();
        let mut rng = seeded_rng(Some(2));
        let _ = perturb(&scores, "dp", 1.0, &mut rng).unwrap();
        let _ = perturb(&scores, "ip", 1.0, &mut rng).unwrap();
        assert_eq!(scores, before);
    }
}

// =============================================================================
// Leakage audit
// =============================================================================

mod audit {
    use super::*;

    #[test]
    fn test_widest_intervals_give_full_leakage() {
        let scores = one_to_hundred();
        let bounds = truncate(&scores).unwrap().bounds;
        // Values strictly inside [a, b)
        let inside: Vec<f64> = scores
            .as_slice()
            .iter()
            .copied()
            .filter(|&v| bounds.lower <= v && v < bounds.upper)
            .collect();
        let intervals = vec![Interval::new(bounds.lower, bounds.upper); inside.len()];
        assert_eq!(leakage(&inside, &intervals).unwrap(), 1.0);
    }

    #[test]
    fn test_larger_batches_keep_leakage_in_range() {
        let scores = Scores::from_vec((0..2000).map(|i| (i as f64).sin() * 10.0).collect());
        let release = interval_privacy(&scores, 1.0, &mut seeded_rng(Some(21))).unwrap();
        assert!((0.0..=1.0).contains(&release.leakage));
    }
}

// =============================================================================
// Running statistics over perturbed rounds
// =============================================================================

mod statistics {
    use super::*;

    #[test]
    fn test_stats_over_perturbed_batches() {
        let mut stats = RunningStats::new(1);
        let mut rng = seeded_rng(Some(4));
        for _ in 0..5 {
            let noisy = differential_privacy(&one_to_hundred(), 4.0, &mut rng).unwrap();
            stats.update(&noisy).unwrap();
        }
        assert_eq!(stats.count(), 500);
        // Truncated grid mean is 50.5; noise is zero-mean
        assert!((stats.mean()[0] - 50.5).abs() < 8.0, "mean {}", stats.mean()[0]);
        assert!(stats.std()[0] > 0.0);
    }
}
