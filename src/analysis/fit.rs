use std::fmt;

/// Why a straight line could not be fitted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    #[error("need at least 2 points for a linear fit, got {0}")]
    TooFewPoints(usize),

    #[error("x and y have different lengths ({x} vs {y})")]
    LengthMismatch { x: usize, y: usize },

    #[error("all concentrations are identical, slope is undefined")]
    ZeroVariance,
}

/// First-degree least-squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Squared Pearson correlation of the fitted points.
    pub r_squared: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Concentration that would produce peak current `y`.
    pub fn invert(&self, y: f64) -> Option<f64> {
        if self.slope == 0.0 || !self.slope.is_finite() {
            return None;
        }
        Some((y - self.intercept) / self.slope)
    }

    /// `I = m C + b` with three decimals.
    pub fn equation(&self) -> String {
        format!("I = {:.3} C + {:.3}", self.slope, self.intercept)
    }
}

impl fmt::Display for LinearFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, R2={:.3}", self.equation(), self.r_squared)
    }
}

/// Ordinary least squares over `(x, y)`.
///
/// NaN values are not filtered; they propagate into every coefficient.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LinearFit, FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch { x: x.len(), y: y.len() });
    }
    let n = x.len();
    if n < 2 {
        return Err(FitError::TooFewPoints(n));
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if sxx == 0.0 {
        return Err(FitError::ZeroVariance);
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r = sxy / (sxx * syy).sqrt();

    Ok(LinearFit {
        slope,
        intercept,
        r_squared: r * r,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn exact_line_fits_perfectly() {
        let fit = fit_line(&[1.0, 2.0, 3.0], &[3.0, 5.0, 7.0]).unwrap();
        assert!(close(fit.slope, 2.0));
        assert!(close(fit.intercept, 1.0));
        assert!(close(fit.r_squared, 1.0));
    }

    #[test]
    fn noisy_line() {
        // y = x with one perturbed point
        let fit = fit_line(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 2.0, 4.0]).unwrap();
        assert!(close(fit.slope, 1.3));
        assert!(close(fit.intercept, -0.2));
        assert!(fit.r_squared > 0.9 && fit.r_squared < 1.0);
    }

    #[test]
    fn rejects_degenerate_input() {
        assert_eq!(fit_line(&[1.0], &[2.0]), Err(FitError::TooFewPoints(1)));
        assert_eq!(fit_line(&[2.0, 2.0], &[1.0, 3.0]), Err(FitError::ZeroVariance));
        assert_eq!(
            fit_line(&[1.0, 2.0], &[1.0]),
            Err(FitError::LengthMismatch { x: 2, y: 1 })
        );
    }

    #[test]
    fn nan_peaks_propagate() {
        let fit = fit_line(&[1.0, 2.0, 3.0], &[1.0, f64::NAN, 3.0]).unwrap();
        assert!(fit.slope.is_nan());
        assert!(fit.r_squared.is_nan());
    }

    #[test]
    fn flat_peaks_have_undefined_r_squared() {
        let fit = fit_line(&[1.0, 2.0], &[4.0, 4.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert!(fit.r_squared.is_nan());
        assert_eq!(fit.invert(4.0), None);
    }

    #[test]
    fn invert_and_predict_agree() {
        let fit = LinearFit { slope: 2.0, intercept: 1.0, r_squared: 1.0 };
        assert_eq!(fit.predict(3.0), 7.0);
        assert_eq!(fit.invert(7.0), Some(3.0));
        assert_eq!(fit.to_string(), "I = 2.000 C + 1.000, R2=1.000");
    }
}
