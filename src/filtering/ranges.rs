//! Parsing of range filters such as `headCountRanges=500-1000,2000+`.

use std::str::FromStr;

/// Closed intervals plus an optional open-ended lower bound.
///
/// `"500-1000,2000+"` parses to `[500, 1000]` and `> 2000`. Segments that do
/// not parse are skipped; a set with no usable segment matches everything.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSet<T> {
    pub intervals: Vec<(T, T)>,
    pub above: Option<T>,
}

impl<T> Default for RangeSet<T> {
    fn default() -> Self {
        Self {
            intervals: Vec::new(),
            above: None,
        }
    }
}

impl<T> RangeSet<T> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty() && self.above.is_none()
    }
}

impl<T> RangeSet<T>
where
    T: FromStr + PartialOrd + Copy,
{
    /// Parse each raw value, itself possibly comma-separated.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Self {
        let mut set = Self::default();
        for segment in super::params::split_values(raw) {
            if !set.push_segment(&segment) {
                tracing::debug!(segment = %segment, "skipping malformed range segment");
            }
        }
        set
    }

    fn push_segment(&mut self, segment: &str) -> bool {
        if let Some(bound) = segment.strip_suffix('+') {
            let Ok(bound) = bound.trim().parse::<T>() else {
                return false;
            };
            // the smallest open bound subsumes any larger one
            self.above = match self.above {
                Some(current) if current <= bound => Some(current),
                _ => Some(bound),
            };
            return true;
        }

        let parts: Vec<&str> = segment.split('-').map(str::trim).collect();
        let [min, max] = parts.as_slice() else {
            return false;
        };
        match (min.parse::<T>(), max.parse::<T>()) {
            (Ok(min), Ok(max)) => {
                self.intervals.push((min, max));
                true
            }
            _ => false,
        }
    }

    /// Whether `value` falls in any interval or above the open bound.
    pub fn contains(&self, value: T) -> bool {
        self.intervals
            .iter()
            .any(|(min, max)| *min <= value && value <= *max)
            || self.above.is_some_and(|bound| value > bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_and_open_bound() {
        let set = RangeSet::<i64>::parse(&["500-1000,2000+"]);
        assert_eq!(set.intervals, vec![(500, 1000)]);
        assert_eq!(set.above, Some(2000));
        assert!(set.contains(500));
        assert!(set.contains(1000));
        assert!(!set.contains(1500));
        assert!(!set.contains(2000));
        assert!(set.contains(2001));
    }

    #[test]
    fn test_malformed_segment_skipped() {
        let set = RangeSet::<i64>::parse(&["abc-500,100-200"]);
        assert_eq!(set.intervals, vec![(100, 200)]);
        assert_eq!(set.above, None);
    }

    #[test]
    fn test_all_malformed_is_noop() {
        let set = RangeSet::<i64>::parse(&["abc-500", "1-2-3", "x+", "700"]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_smallest_open_bound_kept() {
        let set = RangeSet::<i64>::parse(&["5000+", "500+", "1000+"]);
        assert_eq!(set.above, Some(500));
    }

    #[test]
    fn test_float_ranges_for_cgpa() {
        let set = RangeSet::<f64>::parse(&["7.5-8.5", "9+"]);
        assert_eq!(set.intervals, vec![(7.5, 8.5)]);
        assert_eq!(set.above, Some(9.0));
        assert!(set.contains(8.0));
        assert!(!set.contains(9.0));
    }

    #[test]
    fn test_is_empty_without_parse_bounds() {
        struct Opaque;
        let set = RangeSet::<Opaque>::default();
        assert!(set.is_empty());
        assert!(!RangeSet::<f64>::parse(&["9+"]).is_empty());
    }

    #[test]
    fn test_repeated_values_combine() {
        let set = RangeSet::<i64>::parse(&["1-10", "20-30"]);
        assert_eq!(set.intervals, vec![(1, 10), (20, 30)]);
    }
}
