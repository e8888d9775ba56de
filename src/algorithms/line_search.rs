//! Golden-section line search for boosting step multipliers

const GOLDEN_RATIO: f64 = 1.618033988749895;

/// Iteration cap; far more than a `1e-10` tolerance needs on `[0, 10]`
const MAX_ITERS: usize = 200;

/// Lower end of the multiplier search interval
pub const STEP_LOWER: f64 = 0.0;
/// Upper end of the multiplier search interval
pub const STEP_UPPER: f64 = 10.0;
/// Interval width at which the search stops
pub const STEP_TOLERANCE: f64 = 1e-10;

/// Minimise a unimodal function on `[lower, upper]`
///
/// Non-finite objective values are treated as `+inf`. Returns the midpoint
/// of the final bracket.
pub fn golden_section<F>(f: F, lower: f64, upper: f64, tol: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    let score = |x: f64| {
        let v = f(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    let inv_phi = 1.0 / GOLDEN_RATIO;
    let (mut a, mut b) = if lower <= upper {
        (lower, upper)
    } else {
        (upper, lower)
    };

    let mut c = b - (b - a) * inv_phi;
    let mut d = a + (b - a) * inv_phi;
    let mut fc = score(c);
    let mut fd = score(d);

    for _ in 0..MAX_ITERS {
        if (b - a).abs() < tol {
            break;
        }
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - (b - a) * inv_phi;
            fc = score(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + (b - a) * inv_phi;
            fd = score(d);
        }
    }

    (a + b) / 2.0
}

/// Search the default multiplier interval
pub fn step_multiplier<F>(f: F) -> f64
where
    F: Fn(f64) -> f64,
{
    golden_section(f, STEP_LOWER, STEP_UPPER, STEP_TOLERANCE)
}
