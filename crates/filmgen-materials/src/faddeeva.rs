//! Faddeeva (scaled complex complementary error) function.
//!
//! $w(z) = e^{-z^2}\,\mathrm{erfc}(-iz)$, evaluated with Weideman's rational
//! approximation:
//!
//! J. A. C. Weideman, "Computation of the complex error function",
//! *SIAM J. Numer. Anal.* **31**, 1497 (1994).
//!
//! With $N = 32$ terms the relative error is around $10^{-13}$ in the upper
//! half plane. The lower half plane uses $w(z) = 2e^{-z^2} - w(-z)$.

use std::f64::consts::PI;
use std::sync::OnceLock;

use num_complex::Complex64;

const TERMS: usize = 32;

/// Polynomial coefficients `a[n-1]` multiplying `Z^(n-1)`, n = 1..=TERMS.
fn coefficients() -> &'static [f64; TERMS] {
    static COEFFS: OnceLock<[f64; TERMS]> = OnceLock::new();
    COEFFS.get_or_init(|| {
        let m = 2 * TERMS as i64;
        let l = scale();
        let sample = |k: i64| {
            let t = l * (k as f64 * PI / (2 * m) as f64).tan();
            (-t * t).exp() * (l * l + t * t)
        };

        let mut a = [0.0; TERMS];
        for (idx, slot) in a.iter_mut().enumerate() {
            let n = (idx + 1) as f64;
            let sum: f64 = (-m + 1..m)
                .map(|k| sample(k) * (PI * k as f64 * n / m as f64).cos())
                .sum();
            *slot = sum / (2 * m) as f64;
        }
        a
    })
}

fn scale() -> f64 {
    (TERMS as f64 / std::f64::consts::SQRT_2).sqrt()
}

/// Evaluate the Faddeeva function $w(z)$.
pub fn w(z: Complex64) -> Complex64 {
    if z.im < 0.0 {
        return 2.0 * (-z * z).exp() - w(-z);
    }

    let l = scale();
    let i = Complex64::i();
    let denom = l - i * z;
    let zeta = (l + i * z) / denom;

    // Horner evaluation, highest order first
    let p = coefficients()
        .iter()
        .rev()
        .fold(Complex64::new(0.0, 0.0), |acc, &a| acc * zeta + a);

    2.0 * p / (denom * denom) + (1.0 / PI.sqrt()) / denom
}
