//! Sibling re-order detection.
//!
//! Raw sibling positions shift whenever an unrelated sibling is added or
//! deleted, so order is compared only over the keys present on both sides of
//! each parent group. For example, if group `A` holds:
//! - left:  `1, 2, 3, 4`
//! - right: `0, 1, 3, 2`  (`0` added, `4` deleted, `2`/`3` swapped)
//!
//! the common sequences are `1, 2, 3` and `1, 3, 2`. In [`MoveDetection::Rank`]
//! mode `2` and `3` moved (their rank among common keys changed) and `1` did
//! not, even though its raw position went from 0 to 1. In
//! [`MoveDetection::Minimal`] mode the longest increasing subsequence of left
//! ranks is kept stable and only one of `2`/`3` is reported. Ties between
//! equally long subsequences go to the one keeping the most keys whose rank
//! did not change.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::MoveDetection;
use crate::index::RowIndex;
use crate::key::CompositeKey;

pub fn moved_keys(
    left: &RowIndex<'_>,
    right: &RowIndex<'_>,
    mode: MoveDetection,
) -> FxHashSet<CompositeKey> {
    let mut moved = FxHashSet::default();

    for parent in left.parents() {
        let right_siblings = right.siblings(parent);
        if right_siblings.is_empty() {
            continue;
        }

        let left_rank: FxHashMap<&CompositeKey, usize> = left
            .siblings(parent)
            .iter()
            .filter(|key| right.contains(key))
            .enumerate()
            .map(|(rank, key)| (key, rank))
            .collect();

        // Left ranks of the common keys, in right order.
        let common: Vec<(&CompositeKey, usize)> = right_siblings
            .iter()
            .filter_map(|key| left_rank.get(key).map(|&rank| (key, rank)))
            .collect();

        match mode {
            MoveDetection::Rank => {
                for (new_rank, &(key, old_rank)) in common.iter().enumerate() {
                    if new_rank != old_rank {
                        moved.insert(key.clone());
                    }
                }
            }
            MoveDetection::Minimal => {
                let ranks: Vec<usize> = common.iter().map(|&(_, rank)| rank).collect();
                let stable: FxHashSet<usize> = stable_chain(&ranks).into_iter().collect();
                for (idx, &(key, _)) in common.iter().enumerate() {
                    if !stable.contains(&idx) {
                        moved.insert(key.clone());
                    }
                }
            }
        }
    }

    moved
}

/// Chain tail: (length, keys whose rank is unchanged, index of the last item).
type Tail = (usize, usize, usize);

fn beats(candidate: Tail, current: Option<Tail>) -> bool {
    current.map_or(true, |(len, fixed, _)| (candidate.0, candidate.1) > (len, fixed))
}

/// Indices of a longest increasing subsequence of `ranks`, a permutation of
/// `0..ranks.len()`. Among chains of equal length the one holding the most
/// fixed points (`ranks[i] == i`) wins, so siblings that kept their place are
/// never reported in place of the ones that were displaced.
fn stable_chain(ranks: &[usize]) -> Vec<usize> {
    // Fenwick tree over ranks holding the best chain ending below each rank.
    let mut tree: Vec<Option<Tail>> = vec![None; ranks.len() + 1];
    let mut predecessors: Vec<Option<usize>> = vec![None; ranks.len()];
    let mut best: Option<Tail> = None;

    for (idx, &rank) in ranks.iter().enumerate() {
        let mut prev: Option<Tail> = None;
        let mut i = rank;
        while i > 0 {
            if let Some(tail) = tree[i] {
                if beats(tail, prev) {
                    prev = Some(tail);
                }
            }
            i -= i & i.wrapping_neg();
        }

        predecessors[idx] = prev.map(|(_, _, p)| p);
        let (len, fixed) = prev.map_or((0, 0), |(len, fixed, _)| (len, fixed));
        let tail = (len + 1, fixed + usize::from(rank == idx), idx);

        let mut i = rank + 1;
        while i < tree.len() {
            if beats(tail, tree[i]) {
                tree[i] = Some(tail);
            }
            i += i & i.wrapping_neg();
        }
        if beats(tail, best) {
            best = Some(tail);
        }
    }

    let mut result = Vec::new();
    let mut current = best.map(|(_, _, idx)| idx);
    while let Some(idx) = current {
        result.push(idx);
        current = predecessors[idx];
    }
    result.reverse();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::RowFilter;
    use crate::key::{KeySchema, KeySpec, Normalization};
    use crate::source::{Side, Source};

    fn source(rows: &[(&str, &str)]) -> Source {
        Source::from_rows(
            "test",
            &["parent", "child"],
            rows.iter().map(|(p, c)| vec![*p, *c]),
            KeySchema::new(["parent", "child"]),
        )
    }

    fn index(src: &Source) -> RowIndex<'_> {
        let spec = KeySpec::resolve(&src.key_schema, &src.schema, Side::Left).unwrap();
        RowIndex::build(src, Side::Left, &spec, &RowFilter::default(), &Normalization::default())
    }

    fn moved(left: &[(&str, &str)], right: &[(&str, &str)], mode: MoveDetection) -> Vec<String> {
        let (l, r) = (source(left), source(right));
        let (li, ri) = (index(&l), index(&r));
        let mut keys: Vec<String> = moved_keys(&li, &ri, mode)
            .into_iter()
            .map(|k| k.to_string())
            .collect();
        keys.sort();
        keys
    }

    #[test]
    fn swap_reports_both_keys_in_rank_mode() {
        let left = [("A", "1"), ("A", "2"), ("A", "3")];
        let right = [("A", "2"), ("A", "1"), ("A", "3")];
        assert_eq!(moved(&left, &right, MoveDetection::Rank), vec!["A~1", "A~2"]);
    }

    #[test]
    fn unrelated_add_and_delete_do_not_move_siblings() {
        let left = [("A", "1"), ("A", "2"), ("A", "3")];
        let right = [("A", "0"), ("A", "1"), ("A", "3"), ("A", "4")];
        assert!(moved(&left, &right, MoveDetection::Rank).is_empty());
        assert!(moved(&left, &right, MoveDetection::Minimal).is_empty());
    }

    #[test]
    fn reordered_parent_groups_do_not_move_children() {
        let left = [("A", "1"), ("A", "2"), ("B", "1"), ("B", "2")];
        let right = [("B", "1"), ("B", "2"), ("A", "1"), ("A", "2")];
        assert!(moved(&left, &right, MoveDetection::Rank).is_empty());
    }

    #[test]
    fn minimal_mode_reports_only_the_displaced_key() {
        let left = [("A", "1"), ("A", "2"), ("A", "3"), ("A", "4")];
        let right = [("A", "4"), ("A", "1"), ("A", "2"), ("A", "3")];
        assert_eq!(
            moved(&left, &right, MoveDetection::Rank),
            vec!["A~1", "A~2", "A~3", "A~4"]
        );
        assert_eq!(moved(&left, &right, MoveDetection::Minimal), vec!["A~4"]);
    }

    #[test]
    fn stable_chain_is_increasing_and_keeps_fixed_points() {
        let ranks = [0usize, 2, 1, 3];
        let chain = stable_chain(&ranks);
        assert_eq!(chain.len(), 3);
        let values: Vec<usize> = chain.iter().map(|&i| ranks[i]).collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));

        // 0,2,4 and 0,1,4 and 0,3,4 are all longest; only the first keeps
        // every unmoved item.
        assert_eq!(stable_chain(&[0, 3, 2, 1, 4]), vec![0, 2, 4]);
        assert!(stable_chain(&[]).is_empty());
    }

    #[test]
    fn non_adjacent_swap_reports_exactly_the_swapped_keys() {
        let left = [("A", "1"), ("A", "2"), ("A", "3"), ("A", "4"), ("A", "5")];
        let right = [("A", "1"), ("A", "4"), ("A", "3"), ("A", "2"), ("A", "5")];
        assert_eq!(moved(&left, &right, MoveDetection::Rank), vec!["A~2", "A~4"]);
        assert_eq!(moved(&left, &right, MoveDetection::Minimal), vec!["A~2", "A~4"]);
    }
}
