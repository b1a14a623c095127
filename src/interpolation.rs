use metfor::Quantity;

/// Denominators smaller than this are treated as zero.
pub(crate) const DEGENERATE_EPS: f64 = 1.0e-6;

/// The outcome of dividing two numbers that might not divide cleanly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Ratio {
    /// A finite ratio.
    Value(f64),
    /// The denominator was (nearly) zero.
    Degenerate,
    /// The division produced infinity or NaN.
    NotFinite,
}

impl Ratio {
    /// Divide, refusing to divide by a near zero denominator.
    #[inline]
    pub(crate) fn new(numerator: f64, denominator: f64) -> Self {
        if denominator.abs() < DEGENERATE_EPS {
            return Ratio::Degenerate;
        }

        let val = numerator / denominator;
        if val.is_finite() {
            Ratio::Value(val)
        } else {
            Ratio::NotFinite
        }
    }

    /// The fraction of the way from `v0` to `v1` where a linear function crosses zero.
    #[inline]
    pub(crate) fn zero_crossing(v0: f64, v1: f64) -> Self {
        Ratio::new(v0, v0 - v1)
    }
}

/// Move `fraction` of the way from `start` to `end`.
#[inline]
pub(crate) fn lerp<Q: Quantity>(start: Q, end: Q, fraction: f64) -> Q {
    let (start, end) = (start.unpack(), end.unpack());
    Q::pack(start + fraction * (end - start))
}
