//! Integer distribution helpers used by table layout.

/// `numerator / denominator`, rounded half up.
fn div_round(numerator: usize, denominator: usize) -> usize {
    (numerator + denominator / 2) / denominator
}

/// Split `total` across slots in proportion to `ratios`, giving each slot at
/// least its minimum. Slots with a zero ratio get nothing.
pub fn ratio_distribute(total: usize, ratios: &[usize], minimums: Option<&[usize]>) -> Vec<usize> {
    let ratios: Vec<usize> = match minimums {
        Some(minimums) => ratios
            .iter()
            .zip(minimums)
            .map(|(ratio, min)| if *min > 0 { *ratio } else { 0 })
            .collect(),
        None => ratios.to_vec(),
    };
    let mut total_ratio: usize = ratios.iter().sum();
    if total_ratio == 0 {
        return vec![0; ratios.len()];
    }

    let mut remaining = total;
    let mut out = Vec::with_capacity(ratios.len());
    for (i, ratio) in ratios.iter().enumerate() {
        let minimum = minimums.and_then(|m| m.get(i).copied()).unwrap_or(0);
        let share = if total_ratio > 0 {
            (ratio * remaining).div_ceil(total_ratio).max(minimum)
        } else {
            remaining
        };
        let share = share.min(remaining.max(minimum));
        out.push(share);
        total_ratio -= ratio;
        remaining = remaining.saturating_sub(share);
    }
    out
}

/// Take `total` away from `values` in proportion to `ratios`, never more
/// than `maximums[i]` from slot `i`.
pub fn ratio_reduce(
    total: usize,
    ratios: &[usize],
    maximums: &[usize],
    values: &[usize],
) -> Vec<usize> {
    let ratios: Vec<usize> = ratios
        .iter()
        .zip(maximums)
        .map(|(ratio, max)| if *max > 0 { *ratio } else { 0 })
        .collect();
    let mut total_ratio: usize = ratios.iter().sum();
    if total_ratio == 0 {
        return values.to_vec();
    }

    let mut remaining = total;
    let mut out = Vec::with_capacity(values.len());
    for ((ratio, maximum), value) in ratios.iter().zip(maximums).zip(values) {
        if *ratio > 0 && total_ratio > 0 {
            let reduced = div_round(ratio * remaining, total_ratio)
                .min(*maximum)
                .min(*value);
            out.push(value - reduced);
            remaining = remaining.saturating_sub(reduced);
            total_ratio -= ratio;
        } else {
            out.push(*value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribute_proportionally() {
        assert_eq!(ratio_distribute(10, &[1, 1], None), vec![5, 5]);
        assert_eq!(ratio_distribute(10, &[1, 2, 2], None), vec![2, 4, 4]);
        assert_eq!(ratio_distribute(7, &[1, 1], None), vec![4, 3]);
    }

    #[test]
    fn test_distribute_respects_minimums() {
        assert_eq!(ratio_distribute(10, &[1, 1], Some(&[8, 1])), vec![8, 2]);
        assert_eq!(ratio_distribute(10, &[1, 1], Some(&[0, 1])), vec![0, 10]);
    }

    #[test]
    fn test_reduce() {
        assert_eq!(ratio_reduce(4, &[1, 1], &[10, 10], &[10, 10]), vec![8, 8]);
        assert_eq!(ratio_reduce(4, &[1, 0], &[10, 10], &[10, 10]), vec![6, 10]);
        assert_eq!(ratio_reduce(4, &[1, 1], &[1, 10], &[10, 10]), vec![9, 7]);
    }
}
