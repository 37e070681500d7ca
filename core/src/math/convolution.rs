/// Discrete convolution kernels.
pub struct ConvolutionHelper;

impl ConvolutionHelper {
    /// Causal convolution clipped to the input length:
    /// `y[n] = sum(h[k] * x[n - k])` for `k` in `0..=min(n, h.len() - 1)`.
    pub fn causal(samples: &[f64], coefficients: &[f64]) -> Vec<f64> {
        (0..samples.len())
            .map(|n| {
                coefficients
                    .iter()
                    .take(n + 1)
                    .enumerate()
                    .fold(0.0, |acc, (k, &h)| acc + h * samples[n - k])
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_returns_coefficients_exactly() {
        let coefficients = [5.5, 4.4, 3.3, 2.2, 1.1, -6.6];
        let impulse = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(ConvolutionHelper::causal(&impulse, &coefficients), coefficients);
    }

    #[test]
    fn output_length_matches_input() {
        let output = ConvolutionHelper::causal(&[1.0, 1.0, 1.0, 1.0], &[0.5, 0.5]);
        assert_eq!(output, vec![0.5, 1.0, 1.0, 1.0]);

        let short = ConvolutionHelper::causal(&[2.0], &[1.0, 3.0, 5.0]);
        assert_eq!(short, vec![2.0]);
        assert!(ConvolutionHelper::causal(&[], &[1.0]).is_empty());
    }
}
