// Scales map data values into pixel positions inside a chart's plot area

/// Categorical scale: each category gets an equal-width band
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    pub categories: Vec<String>,
    pub range: (f64, f64),
    pub padding: f64,
}

impl BandScale {
    pub fn new(categories: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        Self { categories, range, padding }
    }

    /// Distance between the starts of adjacent bands
    pub fn step(&self) -> f64 {
        let n = self.categories.len() as f64;
        if n == 0.0 {
            return 0.0;
        }
        // inner and outer padding are the same fraction of a step
        (self.range.1 - self.range.0) / (n - self.padding + 2.0 * self.padding)
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Left edge of the band for `category`
    pub fn position(&self, category: &str) -> Option<f64> {
        let idx = self.categories.iter().position(|c| c == category)?;
        Some(self.position_at(idx))
    }

    pub fn position_at(&self, idx: usize) -> f64 {
        let step = self.step();
        self.range.0 + step * self.padding + step * idx as f64
    }
}

/// Continuous scale with a linear mapping from domain to range
#[derive(Debug, Clone, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Roughly `count` round-numbered ticks inside the domain
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        nice_ticks(self.domain.0, self.domain.1, count)
    }
}

/// Domain `[0, max]` for value axes. Empty or all-zero data gets `[0, 1]`.
pub fn zero_based_domain(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let max = values.into_iter().fold(f64::NEG_INFINITY, f64::max);
    if max.is_finite() && max > 0.0 {
        (0.0, max)
    } else {
        (0.0, 1.0)
    }
}

/// Min/max of the values, padded when degenerate. Empty input gets `[0, 1]`.
pub fn extent(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }

    if min == f64::INFINITY {
        return (0.0, 1.0);
    }
    if min == max {
        return pad_range(min, max);
    }
    (min, max)
}

fn pad_range(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        (min - 1.0, max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding, max + padding)
    }
}

/// Tick values at multiples of 1, 2 or 5 × 10^k covering `[start, stop]`
pub fn nice_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (lo, hi) = if start < stop { (start, stop) } else { (stop, start) };

    let (step, power) = tick_step(lo, hi, count);
    if step <= 0.0 || !step.is_finite() {
        return Vec::new();
    }

    // round to the step's decimal places so 3 * 0.2 prints as 0.6
    let scale = 10f64.powi((-power).max(0));
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last)
        .map(|i| (i as f64 * step * scale).round() / scale)
        .collect()
}

fn tick_step(lo: f64, hi: f64, count: usize) -> (f64, i32) {
    let raw = (hi - lo) / count as f64;
    let power = raw.log10().floor() as i32;
    let base = 10f64.powi(power);
    let error = raw / base;

    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    (factor * base, power)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_scale_layout() {
        let scale = BandScale::new(vec!["A".into(), "B".into(), "C".into(), "D".into()], (0.0, 410.0), 0.1);
        // step = 410 / 4.1
        assert!((scale.step() - 100.0).abs() < 1e-9);
        assert!((scale.bandwidth() - 90.0).abs() < 1e-9);
        assert!((scale.position("A").unwrap() - 10.0).abs() < 1e-9);
        assert!((scale.position("D").unwrap() - 310.0).abs() < 1e-9);
        assert!(scale.position("E").is_none());
    }

    #[test]
    fn test_band_scale_empty() {
        let scale = BandScale::new(vec![], (0.0, 100.0), 0.1);
        assert_eq!(scale.step(), 0.0);
        assert_eq!(scale.bandwidth(), 0.0);
    }

    #[test]
    fn test_linear_scale_inverted_range() {
        let scale = LinearScale::new((0.0, 50.0), (400.0, 0.0));
        assert_eq!(scale.map(0.0), 400.0);
        assert_eq!(scale.map(50.0), 0.0);
        assert_eq!(scale.map(25.0), 200.0);
    }

    #[test]
    fn test_zero_based_domain() {
        assert_eq!(zero_based_domain(vec![3.0, 8.5, 1.0]), (0.0, 8.5));
        assert_eq!(zero_based_domain(Vec::<f64>::new()), (0.0, 1.0));
        assert_eq!(zero_based_domain(vec![0.0, 0.0]), (0.0, 1.0));
    }

    #[test]
    fn test_extent() {
        assert_eq!(extent(vec![1990.0, 1980.0, 2016.0]), (1980.0, 2016.0));
        assert_eq!(extent(vec![2006.0]), (2005.0, 2007.0));
        assert_eq!(extent(Vec::<f64>::new()), (0.0, 1.0));
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(nice_ticks(0.0, 1.0, 4), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(nice_ticks(1980.0, 2016.0, 6), vec![1980.0, 1985.0, 1990.0, 1995.0, 2000.0, 2005.0, 2010.0, 2015.0]);
        assert!(nice_ticks(0.0, 1.0, 0).is_empty());
    }
}
