use std::cmp::Ordering;

/// Positions of `scores` ordered by descending score.
///
/// - Stable: equal scores keep their original relative order
/// - NaN scores sort last
#[inline]
pub fn argsort_desc(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| cmp_desc(scores[a], scores[b]));
    order
}

/// Descending comparison that pushes NaN to the end.
#[inline]
pub fn cmp_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

/// Position of the smallest value; the first one wins ties.
#[inline]
pub fn argmin(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v >= b => {}
            _ if v.is_nan() => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argsort_is_stable_and_descending() {
        let scores = [8.1, 9.3, 8.1, f64::NAN, 9.3];
        assert_eq!(argsort_desc(&scores), vec![1, 4, 0, 2, 3]);
    }

    #[test]
    fn argmin_prefers_first_on_ties() {
        assert_eq!(argmin(&[0.5, 0.2, 0.2]), Some(1));
        assert_eq!(argmin(&[]), None);
        assert_eq!(argmin(&[f64::NAN, 1.0]), Some(1));
    }
}
