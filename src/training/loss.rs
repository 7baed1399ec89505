//! Loss terms of the clipped-surrogate objective.
//!
//! All functions work element-wise on `[N]` tensors and leave reduction to
//! the caller.

use tch::{Kind, Tensor};

/// `exp(new_log_prob − old_log_prob)`: how much more likely an action has
/// become since it was sampled.
pub fn importance_ratio(log_probs: &Tensor, old_log_probs: &Tensor) -> Tensor {
    (log_probs - old_log_probs).exp()
}

/// `return − value` with the value detached, so the policy term never
/// pushes gradient into the value tower.
pub fn advantages(returns: &Tensor, values: &Tensor) -> Tensor {
    returns - values.detach()
}

/// Per-transition PPO policy loss `−min(r·A, clip(r, 1−ε, 1+ε)·A)`.
pub fn clipped_surrogate(ratio: &Tensor, advantages: &Tensor, eps_clip: f64) -> Tensor {
    let surr1 = ratio * advantages;
    let surr2 = ratio.clamp(1.0 - eps_clip, 1.0 + eps_clip) * advantages;
    -surr1.min_other(&surr2)
}

/// Per-transition squared value error.
pub fn value_loss(values: &Tensor, returns: &Tensor) -> Tensor {
    (values - returns).pow_tensor_scalar(2)
}

/// Fraction of ratios that fall outside `[1−ε, 1+ε]`.
pub fn clip_fraction(ratio: &Tensor, eps_clip: f64) -> f64 {
    (ratio - 1.0)
        .abs()
        .gt(eps_clip)
        .to_kind(Kind::Float)
        .mean(Kind::Float)
        .f_double_value(&[])
        .unwrap_or(0.0)
}

/// Sample estimate of KL(old ‖ new).
pub fn approx_kl(log_probs: &Tensor, old_log_probs: &Tensor) -> f64 {
    (old_log_probs - log_probs)
        .mean(Kind::Float)
        .f_double_value(&[])
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(t: &Tensor) -> f64 {
        t.double_value(&[0])
    }

    fn ratio_of(r: f32) -> Tensor {
        importance_ratio(&Tensor::from_slice(&[r.ln()]), &Tensor::from_slice(&[0.0f32]))
    }

    #[test]
    fn ratio_inside_range_is_unclipped() {
        let ratio = ratio_of(1.1);
        let adv = Tensor::from_slice(&[2.0f32]);
        let loss = clipped_surrogate(&ratio, &adv, 0.2);
        assert!((scalar(&loss) + 2.2).abs() < 1e-5);
        assert_eq!(clip_fraction(&ratio, 0.2), 0.0);
    }

    #[test]
    fn positive_advantage_above_range_is_clipped() {
        // r = 1.5, A = 2: unclipped 3.0, clipped 2.4 -> loss −2.4.
        let ratio = ratio_of(1.5);
        let adv = Tensor::from_slice(&[2.0f32]);
        let loss = clipped_surrogate(&ratio, &adv, 0.2);
        assert!((scalar(&loss) + 2.4).abs() < 1e-5);
        assert_eq!(clip_fraction(&ratio, 0.2), 1.0);
    }

    #[test]
    fn negative_advantage_below_range_is_clipped() {
        // r = 0.5, A = −4: unclipped −2.0, clipped −3.2 -> loss 3.2.
        let ratio = ratio_of(0.5);
        let adv = Tensor::from_slice(&[-4.0f32]);
        let loss = clipped_surrogate(&ratio, &adv, 0.2);
        assert!((scalar(&loss) - 3.2).abs() < 1e-5);
    }

    #[test]
    fn negative_advantage_above_range_keeps_pessimistic_term() {
        // r = 1.5, A = −4: unclipped −6.0 is lower than clipped −4.8, so the
        // minimum keeps the unclipped term and the loss is 6.0.
        let ratio = ratio_of(1.5);
        let adv = Tensor::from_slice(&[-4.0f32]);
        let loss = clipped_surrogate(&ratio, &adv, 0.2);
        assert!((scalar(&loss) - 6.0).abs() < 1e-4);
    }

    #[test]
    fn value_loss_is_squared_error() {
        let values = Tensor::from_slice(&[1.0f32, -1.0]);
        let returns = Tensor::from_slice(&[0.5f32, 1.0]);
        let loss = value_loss(&values, &returns);
        assert!((loss.double_value(&[0]) - 0.25).abs() < 1e-6);
        assert!((loss.double_value(&[1]) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn approx_kl_zero_for_identical_policies() {
        let lp = Tensor::from_slice(&[-0.3f32, -1.2, -0.7]);
        assert_eq!(approx_kl(&lp, &lp), 0.0);
    }
}
