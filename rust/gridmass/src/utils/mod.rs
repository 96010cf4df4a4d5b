use std::ops::Range;

/// Finds the index range of elements in a sorted slice whose keys fall within
/// the closed interval `[low, high]`.
///
/// The slice must be sorted by the result of applying `key_fn` to each
/// element. Works with partially ordered keys (f64 masses); NaN keys are
/// never inside the interval.
///
/// O(log n) where n is the length of the slice.
///
/// # Examples
///
/// ```
/// use gridmass::utils::range_by_key;
///
/// let masses = [100.0, 200.0, 200.004, 200.01, 300.0];
/// let range = range_by_key(&masses, 199.99, 200.01, |x| *x);
/// assert_eq!(range, 1..4);
///
/// // Empty range when no matches
/// let empty = range_by_key(&masses, 250.0, 260.0, |x| *x);
/// assert!(masses[empty].is_empty());
/// ```
pub fn range_by_key<T, K, F>(slice: &[T], low: K, high: K, key_fn: F) -> Range<usize>
where
    F: Fn(&T) -> K,
    K: PartialOrd,
{
    let start_idx = slice.partition_point(|x| key_fn(x) < low);
    let end_idx = start_idx + slice[start_idx..].partition_point(|x| key_fn(x) <= high);

    start_idx..end_idx
}

/// Trapezoidal integral of `y` over `x`, pairs must be ordered by `x`.
pub fn trapezoid_area(points: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let mut iter = points.into_iter();
    let Some(mut prev) = iter.next() else {
        return 0.0;
    };
    let mut area = 0.0;
    for curr in iter {
        area += (curr.0 - prev.0) * (curr.1 + prev.1) / 2.0;
        prev = curr;
    }
    area
}
