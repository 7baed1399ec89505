//! Monte Carlo discounted returns and batch normalization.

/// Computes discounted returns, never bootstrapping across an episode end.
///
/// # Arguments
///
/// * `rewards` - Per-step rewards in chronological order
/// * `terminals` - Per-step episode termination flags
/// * `gamma` - Discount factor
///
/// # Returns
///
/// One return per step, in chronological order.
pub fn discounted_returns(rewards: &[f64], terminals: &[bool], gamma: f64) -> Vec<f64> {
    assert_eq!(rewards.len(), terminals.len());

    let mut returns = vec![0.0; rewards.len()];
    let mut running = 0.0;

    for t in (0..rewards.len()).rev() {
        if terminals[t] {
            running = 0.0;
        }
        running = rewards[t] + gamma * running;
        returns[t] = running;
    }

    returns
}

/// Rescales `values` to zero mean and unit standard deviation.
///
/// Uses the sample (n − 1) standard deviation; `eps` keeps constant or
/// single-element batches finite.
pub fn normalize(values: &[f64], eps: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = if values.len() > 1 {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
    } else {
        0.0
    };
    let std = var.sqrt() + eps;
    values.iter().map(|v| (v - mean) / std).collect()
}
