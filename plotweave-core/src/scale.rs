//! Scales
//!
//! A scale maps a continuous domain onto a continuous range. Charts own a
//! scale pair and reconfigure it on every render; the reconciler and the
//! glyphs only ever read it through the object-safe [`Scale`] trait.
//!
//! # Nice domains
//!
//! [`LinearScale::nice`] rounds the domain outward to multiples of a
//! human-friendly tick step (1, 2 or 5 times a power of ten), refining the
//! step until it stabilises. The result depends only on the raw extent and
//! the requested tick count.

/// A domain-to-range numeric mapping.
pub trait Scale {
    /// The configured domain, `[start, stop]`.
    fn domain(&self) -> [f64; 2];

    fn set_domain(&mut self, domain: [f64; 2]);

    /// The configured range, `[start, stop]`.
    fn range(&self) -> [f64; 2];

    fn set_range(&mut self, range: [f64; 2]);

    /// Map a domain value to the range.
    fn apply(&self, value: f64) -> f64;

    /// Map a range value back to the domain.
    fn invert(&self, value: f64) -> f64;

    /// Round the domain outward to friendly boundaries. No-op by default.
    fn nice(&mut self, _count: usize) {}
}

/// Affine scale between two intervals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: [f64; 2],
    range: [f64; 2],
}

impl LinearScale {
    /// Identity scale on `[0, 1]`.
    pub fn new() -> Self {
        Self {
            domain: [0.0, 1.0],
            range: [0.0, 1.0],
        }
    }

    pub fn with_domain(mut self, domain: [f64; 2]) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_range(mut self, range: [f64; 2]) -> Self {
        self.range = range;
        self
    }

    /// Tick values covering the domain, roughly `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let [mut start, mut stop] = self.domain;
        if !(start.is_finite() && stop.is_finite()) || count == 0 {
            return Vec::new();
        }
        if start == stop {
            return vec![start];
        }
        let reverse = stop < start;
        if reverse {
            std::mem::swap(&mut start, &mut stop);
        }
        let step = tick_increment(start, stop, count);
        if step == 0.0 || !step.is_finite() {
            return Vec::new();
        }

        let mut ticks: Vec<f64> = if step > 0.0 {
            let i0 = (start / step).ceil() as i64;
            let i1 = (stop / step).floor() as i64;
            (i0..=i1).map(|i| i as f64 * step).collect()
        } else {
            let inv = -step;
            let i0 = (start * inv).ceil() as i64;
            let i1 = (stop * inv).floor() as i64;
            (i0..=i1).map(|i| i as f64 / inv).collect()
        };
        if reverse {
            ticks.reverse();
        }
        ticks
    }
}

impl Default for LinearScale {
    fn default() -> Self {
        Self::new()
    }
}

impl Scale for LinearScale {
    fn domain(&self) -> [f64; 2] {
        self.domain
    }

    fn set_domain(&mut self, domain: [f64; 2]) {
        self.domain = domain;
    }

    fn range(&self) -> [f64; 2] {
        self.range
    }

    fn set_range(&mut self, range: [f64; 2]) {
        self.range = range;
    }

    fn apply(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = d1 - d0;
        // A collapsed domain maps everything onto the middle of the range.
        let t = if span == 0.0 { 0.5 } else { (value - d0) / span };
        r0 + t * (r1 - r0)
    }

    fn invert(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = r1 - r0;
        let t = if span == 0.0 { 0.5 } else { (value - r0) / span };
        d0 + t * (d1 - d0)
    }

    fn nice(&mut self, count: usize) {
        let [d0, d1] = self.domain;
        if !(d0.is_finite() && d1.is_finite()) || d0 == d1 || count == 0 {
            return;
        }
        let reverse = d1 < d0;
        let (mut start, mut stop) = if reverse { (d1, d0) } else { (d0, d1) };

        let mut previous = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count);
            if previous == Some(step) {
                break;
            }
            let (next_start, next_stop) = if step > 0.0 {
                ((start / step).floor() * step, (stop / step).ceil() * step)
            } else if step < 0.0 {
                ((start * step).ceil() / step, (stop * step).floor() / step)
            } else {
                break;
            };
            // Spans near f64::MAX overflow; keep the last finite bounds.
            if !(step.is_finite() && next_start.is_finite() && next_stop.is_finite()) {
                break;
            }
            start = next_start;
            stop = next_stop;
            previous = Some(step);
        }

        self.domain = if reverse { [stop, start] } else { [start, stop] };
    }
}

/// Tick step for roughly `count` ticks over `[start, stop]`.
///
/// Positive results are the step itself; negative results encode a
/// fractional step as `-1 / step`, which keeps the arithmetic exact for
/// steps such as 0.1.
fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();

    let step = (stop - start) / count as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };

    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -10f64.powf(-power) / factor
    }
}

/// Minimum and maximum of `values`, ignoring NaN. `None` when nothing is left.
pub fn extent<I>(values: I) -> Option<[f64; 2]>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some([v, v]),
            Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
        })
}

/// Widen a domain by a fixed margin on both sides.
pub fn extend_domain_by(domain: [f64; 2], margin: f64) -> [f64; 2] {
    [domain[0] - margin, domain[1] + margin]
}

/// Widen a domain so its span grows by `factor`, keeping its centre.
pub fn extend_domain_by_factor(domain: [f64; 2], factor: f64) -> [f64; 2] {
    let half_growth = (domain[1] - domain[0]) / 2.0 * (factor - 1.0);
    [domain[0] - half_growth, domain[1] + half_growth]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_and_inverts() {
        let scale = LinearScale::new().with_domain([0.0, 10.0]).with_range([0.0, 200.0]);
        assert_eq!(scale.apply(5.0), 100.0);
        assert_eq!(scale.invert(50.0), 2.5);
    }

    #[test]
    fn flipped_range_for_screen_y() {
        let scale = LinearScale::new().with_domain([0.0, 1.0]).with_range([100.0, 0.0]);
        assert_eq!(scale.apply(0.0), 100.0);
        assert_eq!(scale.apply(1.0), 0.0);
    }

    #[test]
    fn collapsed_domain_maps_to_range_midpoint() {
        let scale = LinearScale::new().with_domain([3.0, 3.0]).with_range([0.0, 80.0]);
        assert_eq!(scale.apply(3.0), 40.0);
        assert_eq!(scale.apply(100.0), 40.0);
    }

    #[test]
    fn nice_rounds_outward() {
        let mut scale = LinearScale::new().with_domain([0.201479, 0.996679]);
        scale.nice(10);
        assert_eq!(scale.domain(), [0.2, 1.0]);

        let mut scale = LinearScale::new().with_domain([1.1, 10.9]);
        scale.nice(10);
        assert_eq!(scale.domain(), [1.0, 11.0]);

        let mut scale = LinearScale::new().with_domain([-3.7, 12.3]);
        scale.nice(5);
        assert_eq!(scale.domain(), [-5.0, 15.0]);
    }

    #[test]
    fn nice_keeps_reversed_orientation() {
        let mut scale = LinearScale::new().with_domain([10.9, 1.1]);
        scale.nice(10);
        assert_eq!(scale.domain(), [11.0, 1.0]);
    }

    #[test]
    fn nice_is_deterministic_and_ignores_degenerate_domains() {
        let mut a = LinearScale::new().with_domain([0.13, 7.77]);
        let mut b = a;
        a.nice(10);
        b.nice(10);
        assert_eq!(a.domain(), b.domain());

        let mut flat = LinearScale::new().with_domain([2.0, 2.0]);
        flat.nice(10);
        assert_eq!(flat.domain(), [2.0, 2.0]);
    }

    #[test]
    fn nice_leaves_overflowing_domains_finite() {
        let mut huge = LinearScale::new().with_domain([-1e308, 1e308]);
        huge.nice(10);
        assert_eq!(huge.domain(), [-1e308, 1e308]);

        let mut edge = LinearScale::new().with_domain([0.0, 1.79e308]);
        edge.nice(10);
        let [d0, d1] = edge.domain();
        assert!(d0.is_finite() && d1.is_finite());
        assert!(d0 <= 0.0 && d1 >= 1.79e308);
    }

    #[test]
    fn ticks_cover_the_domain() {
        let scale = LinearScale::new().with_domain([0.0, 1.0]);
        let ticks = scale.ticks(5);
        assert_eq!(ticks, vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);

        let scale = LinearScale::new().with_domain([0.0, 12.0]);
        assert_eq!(scale.ticks(3), vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn extent_skips_nan() {
        assert_eq!(extent([3.0, f64::NAN, -1.0, 2.0]), Some([-1.0, 3.0]));
        assert_eq!(extent(std::iter::empty()), None);
    }

    #[test]
    fn domain_extension() {
        assert_eq!(extend_domain_by([0.0, 10.0], 1.0), [-1.0, 11.0]);
        assert_eq!(extend_domain_by_factor([0.0, 10.0], 2.0), [-5.0, 15.0]);
        assert_eq!(extend_domain_by_factor([0.0, 10.0], 1.0), [0.0, 10.0]);
    }
}
