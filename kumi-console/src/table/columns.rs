//! Column width negotiation.

use crate::measure::Measurement;
use crate::ratio::{ratio_distribute, ratio_reduce};

/// Width constraints of one column, padding included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ColumnSpec {
    pub measurement: Measurement,
    pub wrappable: bool,
    pub ratio: Option<usize>,
}

/// Final widths of columns sharing `available` cells.
pub(crate) fn calculate_widths(columns: &[ColumnSpec], available: usize, expand: bool) -> Vec<usize> {
    let mut widths: Vec<usize> = columns
        .iter()
        .map(|c| c.measurement.clamp_max(available).max)
        .collect();

    if expand {
        if columns.iter().any(|c| c.ratio.is_some()) {
            let fixed: usize = columns
                .iter()
                .zip(&widths)
                .filter(|(c, _)| c.ratio.is_none())
                .map(|(_, w)| *w)
                .sum();
            let flexible: Vec<usize> = (0..columns.len())
                .filter(|&i| columns[i].ratio.is_some())
                .collect();
            let ratios: Vec<usize> = flexible
                .iter()
                .map(|&i| columns[i].ratio.unwrap_or(0))
                .collect();
            let minimums: Vec<usize> = flexible
                .iter()
                .map(|&i| columns[i].measurement.min.max(1))
                .collect();
            let shares = ratio_distribute(available.saturating_sub(fixed), &ratios, Some(&minimums));
            for (index, share) in flexible.into_iter().zip(shares) {
                widths[index] = share;
            }
        } else {
            let total: usize = widths.iter().sum();
            if total < available {
                let extra = ratio_distribute(available - total, &widths, None);
                for (width, extra) in widths.iter_mut().zip(extra) {
                    *width += extra;
                }
            }
        }
    }

    let minimums: Vec<usize> = columns.iter().map(|c| c.measurement.min).collect();
    let wrappable: Vec<bool> = columns.iter().map(|c| c.wrappable).collect();
    collapse_widths(&widths, &minimums, &wrappable, available)
}

/// Shrink `widths` until they fit `max_width`.
///
/// The widest wrappable columns give up cells first, down to the next
/// widest wrappable column and never below their minimum. If that is not
/// enough, every column gives up cells evenly regardless of minimums.
pub(crate) fn collapse_widths(
    widths: &[usize],
    minimums: &[usize],
    wrappable: &[bool],
    max_width: usize,
) -> Vec<usize> {
    let mut widths = widths.to_vec();
    loop {
        let total: usize = widths.iter().sum();
        if total <= max_width {
            return widths;
        }
        let excess = total - max_width;

        let shrinkable: Vec<usize> = (0..widths.len())
            .filter(|&i| wrappable[i] && widths[i] > minimums[i])
            .collect();
        let Some(widest) = shrinkable.iter().map(|&i| widths[i]).max() else {
            break;
        };
        let next = shrinkable
            .iter()
            .map(|&i| widths[i])
            .filter(|&w| w < widest)
            .max()
            .unwrap_or(0);

        let mut ratios = vec![0; widths.len()];
        let mut maximums = vec![0; widths.len()];
        for &i in &shrinkable {
            if widths[i] == widest {
                ratios[i] = 1;
                maximums[i] = (widest - next).min(widths[i] - minimums[i]);
            }
        }
        widths = ratio_reduce(excess, &ratios, &maximums, &widths);
    }

    let total: usize = widths.iter().sum();
    if total > max_width {
        let even = vec![1; widths.len()];
        widths = ratio_reduce(total - max_width, &even, &widths.clone(), &widths);
    }
    widths
}
