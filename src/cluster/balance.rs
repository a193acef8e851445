use serde::{Deserialize, Serialize};

use crate::utils::math::vector::SparseVec;

/// One relabelled point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub position: usize,
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub moves: Vec<Move>,
    /// clusters still below the minimum when no donor could give
    pub unresolved: Vec<usize>,
}

/// Relabel points until every cluster has at least `min_size` members.
///
/// While some cluster is short (lowest id first), the member of the largest
/// cluster (ties: lowest id) farthest from that cluster's centroid (ties:
/// lowest position) is moved into it. A donor never drops below `min_size`;
/// when no cluster can give, the remaining deficits are reported and logged.
/// Centroids are left untouched.
pub fn balance(
    points: &[SparseVec<f64>],
    centroids: &[Vec<f64>],
    labels: &mut [usize],
    min_size: usize,
) -> BalanceReport {
    let k = centroids.len();
    let mut report = BalanceReport::default();
    if k == 0 {
        return report;
    }
    let mut sizes = vec![0usize; k];
    for &l in labels.iter() {
        sizes[l] += 1;
    }

    loop {
        let Some(short) = (0..k).find(|&c| sizes[c] < min_size) else {
            break;
        };
        let donor = (0..k)
            .max_by(|&a, &b| sizes[a].cmp(&sizes[b]).then(b.cmp(&a)))
            .unwrap_or(0);
        if donor == short || sizes[donor] <= min_size {
            report.unresolved = (0..k).filter(|&c| sizes[c] < min_size).collect();
            tracing::warn!(
                clusters = ?report.unresolved,
                min_size,
                "cannot rebalance: no cluster has members to spare"
            );
            break;
        }

        let mut pick: Option<(usize, f64)> = None;
        for (pos, _) in labels.iter().enumerate().filter(|(_, &l)| l == donor) {
            let d = points[pos].squared_distance_dense(&centroids[donor]);
            match pick {
                Some((_, best)) if d <= best => {}
                _ => pick = Some((pos, d)),
            }
        }
        let Some((position, _)) = pick else {
            break;
        };
        labels[position] = short;
        sizes[donor] -= 1;
        sizes[short] += 1;
        report.moves.push(Move {
            position,
            from: donor,
            to: short,
        });
    }

    if !report.moves.is_empty() {
        tracing::info!(moves = report.moves.len(), "rebalanced undersized clusters");
    }
    report
}
