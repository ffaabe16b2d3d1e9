/// Floating point type used throughout the pipeline
pub type Real = f64;

/// Keep only real events: a recorded sample of exactly zero means nothing happened.
pub fn event_samples(values: &[Real]) -> Vec<Real> {
    values.iter().copied().filter(|v| *v != 0.0).collect()
}

/// Sum of the non-zero samples, in record order.
pub fn event_sum(values: &[Real]) -> Real {
    values.iter().filter(|v| **v != 0.0).sum()
}

/// `total / count`, or 0.0 when there is nothing to divide by.
pub fn mean_over(total: Real, count: usize) -> Real {
    if count == 0 {
        0.0
    } else {
        total / count as Real
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn filtered_samples_never_contain_zero(
            values in prop::collection::vec(prop_oneof![Just(0.0_f64), 0.1_f64..1.0e6], 0..64)
        ) {
            let kept = event_samples(&values);
            prop_assert!(kept.iter().all(|v| *v != 0.0));
            let nonzero = values.iter().filter(|v| **v != 0.0).count();
            prop_assert_eq!(kept.len(), nonzero);

            let sum: f64 = kept.iter().sum();
            prop_assert!((sum - event_sum(&values)).abs() <= 1e-9 * sum.abs().max(1.0));
        }
    }
}
