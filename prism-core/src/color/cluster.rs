//! Greedy color clustering over a sampled frequency table.
//!
//! Each frequency entry folds into the first existing cluster whose
//! founding color is within the distance threshold; the representative
//! never moves after creation. Order-dependent by construction, which
//! keeps ranked output stable for a given sampling pass and matches the
//! palette output of earlier releases.

use crate::domain::ColorResult;

/// A representative color plus the sample mass folded into it.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    pub color: [u8; 3],
    pub count: u64,
}

fn distance(a: [u8; 3], b: [u8; 3]) -> f64 {
    let dr = f64::from(a[0]) - f64::from(b[0]);
    let dg = f64::from(a[1]) - f64::from(b[1]);
    let db = f64::from(a[2]) - f64::from(b[2]);
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Fold frequency entries, in encounter order, into clusters.
pub fn cluster_colors(frequency: &[([u8; 3], u64)], threshold: f64) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();
    for &(color, count) in frequency {
        match clusters
            .iter_mut()
            .find(|c| distance(color, c.color) < threshold)
        {
            Some(c) => c.count += count,
            None => clusters.push(Cluster { color, count }),
        }
    }
    clusters
}

/// Rank clusters by sample mass and render the top five as hex strings
/// with their share of the top-five total, rounded to two decimals.
///
/// The sort is stable, so count ties keep encounter order.
pub fn rank_clusters(mut clusters: Vec<Cluster>) -> Vec<ColorResult> {
    clusters.sort_by(|a, b| b.count.cmp(&a.count));
    clusters.truncate(5);
    let total: u64 = clusters.iter().map(|c| c.count).sum();
    if total == 0 {
        return Vec::new();
    }
    clusters
        .iter()
        .map(|c| ColorResult {
            color: format!("#{:02x}{:02x}{:02x}", c.color[0], c.color[1], c.color[2]),
            percentage: round2(c.count as f64 / total as f64 * 100.0),
        })
        .collect()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_colors_fold_into_founding_cluster() {
        let freq = [([10, 10, 10], 4), ([0, 0, 0], 3)];
        let clusters = cluster_colors(&freq, 20.0);
        // representative stays at the founding color, mass accumulates
        assert_eq!(
            clusters,
            vec![Cluster {
                color: [10, 10, 10],
                count: 7
            }]
        );
    }

    #[test]
    fn far_colors_stay_separate() {
        let freq = [([0, 0, 0], 1), ([255, 255, 255], 1)];
        let clusters = cluster_colors(&freq, 20.0);
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn first_match_wins_over_closer_later_cluster() {
        // 30 is within threshold of both 0 and 50; the earlier cluster
        // takes it even though 50 is closer.
        let freq = [([0, 0, 0], 1), ([50, 50, 50], 1), ([30, 30, 30], 5)];
        let clusters = cluster_colors(&freq, 60.0);
        assert_eq!(clusters[0].count, 6);
        assert_eq!(clusters[1].count, 1);
    }

    #[test]
    fn exactly_threshold_distance_starts_a_new_cluster() {
        // distance([0,0,0], [3,4,0]) == 5.0; the comparison is strict
        let freq = [([0, 0, 0], 1), ([3, 4, 0], 1)];
        assert_eq!(cluster_colors(&freq, 5.0).len(), 2);
    }

    #[test]
    fn ranking_takes_top_five_and_shares_their_sum() {
        let clusters = vec![
            Cluster { color: [1, 0, 0], count: 60 },
            Cluster { color: [2, 0, 0], count: 10 },
            Cluster { color: [3, 0, 0], count: 50 },
            Cluster { color: [4, 0, 0], count: 40 },
            Cluster { color: [5, 0, 0], count: 30 },
            Cluster { color: [6, 0, 0], count: 20 },
        ];
        let ranked = rank_clusters(clusters);
        assert_eq!(ranked.len(), 5);
        // the 6th cluster (count 10) is cut; percentages share 200, not 210
        assert_eq!(ranked[0].color, "#010000");
        assert_eq!(ranked[0].percentage, 30.0);
        assert_eq!(ranked[4].color, "#060000");
        assert_eq!(ranked[4].percentage, 10.0);
    }

    #[test]
    fn count_ties_keep_encounter_order() {
        let clusters = vec![
            Cluster { color: [9, 9, 9], count: 5 },
            Cluster { color: [200, 0, 0], count: 5 },
        ];
        let ranked = rank_clusters(clusters);
        assert_eq!(ranked[0].color, "#090909");
        assert_eq!(ranked[1].color, "#c80000");
    }

    #[test]
    fn percentages_round_to_two_decimals() {
        let clusters = vec![
            Cluster { color: [0, 0, 0], count: 1 },
            Cluster { color: [255, 0, 0], count: 1 },
            Cluster { color: [0, 255, 0], count: 1 },
        ];
        let ranked = rank_clusters(clusters);
        for r in &ranked {
            assert_eq!(r.percentage, 33.33);
        }
    }

    #[test]
    fn empty_input_ranks_empty() {
        assert!(rank_clusters(Vec::new()).is_empty());
    }
}
