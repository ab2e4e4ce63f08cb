use std::collections::BTreeMap;

use crate::instance::{AttributeValue, Instance, Label};
use crate::node::{AttributeIndex, Entropy};

/// Metric used to rank candidate attributes at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum SplitCriterion {
    /// ID3: information gain `H(D) - H(D|A)`.
    InformationGain,
    /// C4.5: gain ratio `(H(D) - H(D|A)) / H_A(D)`.
    GainRatio,
}

/// Set of attributes still available on one root-to-node path.
///
/// Each recursive call receives its own copy via [`AttributeSet::without`],
/// so consuming an attribute on one branch never affects its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttributeSet {
    available: Vec<bool>,
}

impl AttributeSet {
    /// All `n_attributes` attributes available.
    pub(crate) fn all(n_attributes: usize) -> Self {
        Self {
            available: vec![true; n_attributes],
        }
    }

    /// Return a copy with `attribute` marked as consumed.
    #[must_use]
    pub(crate) fn without(&self, attribute: AttributeIndex) -> Self {
        let mut available = self.available.clone();
        available[attribute.index()] = false;
        Self { available }
    }

    /// Available attributes in ascending index order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = AttributeIndex> + '_ {
        self.available
            .iter()
            .enumerate()
            .filter(|&(_, &ok)| ok)
            .map(|(idx, _)| AttributeIndex::new(idx))
    }
}

/// Count instances per label over `indices`, ordered by label.
pub(crate) fn label_counts(instances: &[Instance], indices: &[usize]) -> BTreeMap<Label, usize> {
    let mut counts = BTreeMap::new();
    for &i in indices {
        *counts.entry(instances[i].decision()).or_insert(0) += 1;
    }
    counts
}

/// Label with the highest count. Ties go to the lowest label.
///
/// Returns `None` for an empty map.
pub(crate) fn majority(counts: &BTreeMap<Label, usize>) -> Option<Label> {
    let mut best: Option<(Label, usize)> = None;
    for (&label, &count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label)
}

/// Shannon entropy `-Σ p·ln(p)` of a distribution given by its counts.
///
/// Zero counts contribute nothing; `n` of zero yields zero entropy.
pub(crate) fn entropy(counts: impl IntoIterator<Item = usize>, n: usize) -> Entropy {
    if n == 0 {
        return Entropy::new(0.0);
    }
    let n = n as f64;
    let value = -counts
        .into_iter()
        .filter(|&c| c > 0)
        .map(|c| {
            let p = c as f64 / n;
            p * p.ln()
        })
        .sum::<f64>();
    Entropy::new(value)
}

/// Quality measures for splitting one node on one attribute.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AttributeScore {
    /// Information gain `H(D) - H(D|A)`.
    pub(crate) gain: f64,
    /// Split information `H_A(D)`.
    pub(crate) split_info: f64,
}

impl AttributeScore {
    /// Gain ratio, or negative infinity when the split information is zero.
    pub(crate) fn gain_ratio(&self) -> f64 {
        if self.split_info > 0.0 {
            self.gain / self.split_info
        } else {
            f64::NEG_INFINITY
        }
    }

    /// Score under `criterion`; larger is better.
    pub(crate) fn metric(&self, criterion: SplitCriterion) -> f64 {
        match criterion {
            SplitCriterion::InformationGain => self.gain,
            SplitCriterion::GainRatio => self.gain_ratio(),
        }
    }
}

/// Partition `indices` by the value each instance takes on `attribute`.
pub(crate) fn partition(
    instances: &[Instance],
    indices: &[usize],
    attribute: AttributeIndex,
) -> BTreeMap<AttributeValue, Vec<usize>> {
    let mut parts: BTreeMap<AttributeValue, Vec<usize>> = BTreeMap::new();
    for &i in indices {
        let value = instances[i].attributes()[attribute.index()];
        parts.entry(value).or_default().push(i);
    }
    parts
}

/// Score a candidate partition against the parent entropy `base`.
pub(crate) fn score_partition(
    instances: &[Instance],
    parts: &BTreeMap<AttributeValue, Vec<usize>>,
    n_samples: usize,
    base: Entropy,
) -> AttributeScore {
    let n = n_samples as f64;
    let mut conditional = 0.0;
    for part in parts.values() {
        let weight = part.len() as f64 / n;
        let counts = label_counts(instances, part);
        conditional += weight * entropy(counts.into_values(), part.len()).value();
    }
    let split_info = entropy(parts.values().map(Vec::len), n_samples).value();
    AttributeScore {
        gain: base.value() - conditional,
        split_info,
    }
}

/// The attribute chosen to split a node, with the resulting partition.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    pub(crate) attribute: AttributeIndex,
    pub(crate) score: AttributeScore,
    pub(crate) partitions: BTreeMap<AttributeValue, Vec<usize>>,
}

/// Pick the best available attribute for splitting `indices`.
///
/// Attributes are visited in ascending index order and replace the current
/// best only on a strictly greater metric, so ties go to the lowest index.
/// An attribute whose gain ratio is undefined scores negative infinity and
/// loses to any defined score; when every candidate is undefined the
/// lowest available index is returned.
///
/// Returns `None` only when no attribute is available.
pub(crate) fn find_best_split(
    instances: &[Instance],
    indices: &[usize],
    available: &AttributeSet,
    criterion: SplitCriterion,
    base: Entropy,
) -> Option<SplitResult> {
    let mut best: Option<(f64, SplitResult)> = None;
    for attribute in available.iter() {
        let partitions = partition(instances, indices, attribute);
        let score = score_partition(instances, &partitions, indices.len(), base);
        let metric = score.metric(criterion);
        if best.as_ref().is_none_or(|(best_metric, _)| metric > *best_metric) {
            best = Some((
                metric,
                SplitResult {
                    attribute,
                    score,
                    partitions,
                },
            ));
        }
    }
    best.map(|(_, split)| split)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criterion_serializes_as_variant_name() {
        assert_eq!(
            serde_json::to_string(&SplitCriterion::InformationGain).unwrap(),
            "\"InformationGain\""
        );
        assert_eq!(
            serde_json::to_string(&SplitCriterion::GainRatio).unwrap(),
            "\"GainRatio\""
        );
    }

    fn inst(decision: Label, attributes: &[AttributeValue]) -> Instance {
        Instance::new(decision, attributes.to_vec())
    }

    #[test]
    fn entropy_of_pure_distribution_is_zero() {
        assert_eq!(entropy([5usize], 5).value(), 0.0);
    }

    #[test]
    fn entropy_of_even_split_is_ln2() {
        let h = entropy([3usize, 3], 6).value();
        assert!((h - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn entropy_ignores_zero_counts_and_empty_input() {
        assert!((entropy([2usize, 0, 2], 4).value() - std::f64::consts::LN_2).abs() < 1e-12);
        assert_eq!(entropy(Vec::<usize>::new(), 0).value(), 0.0);
    }

    #[test]
    fn majority_prefers_lowest_label_on_tie() {
        let counts = BTreeMap::from([(7, 2), (3, 2), (5, 1)]);
        assert_eq!(majority(&counts), Some(3));
        let counts = BTreeMap::from([(7, 3), (3, 2)]);
        assert_eq!(majority(&counts), Some(7));
        assert_eq!(majority(&BTreeMap::new()), None);
    }

    #[test]
    fn attribute_set_copies_are_independent() {
        let all = AttributeSet::all(3);
        let left = all.without(AttributeIndex::new(0));
        let right = all.without(AttributeIndex::new(2));
        assert_eq!(all.iter().count(), 3);
        assert_eq!(
            left.iter().map(AttributeIndex::index).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(
            right.iter().map(AttributeIndex::index).collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert_eq!(AttributeSet::all(0).iter().count(), 0);
        let exhausted = left.without(AttributeIndex::new(1)).without(AttributeIndex::new(2));
        assert_eq!(exhausted.iter().count(), 0);
    }

    #[test]
    fn gain_and_split_info_on_known_partition() {
        // Attribute 0 separates labels perfectly; attribute 1 is noise.
        let data = vec![
            inst(0, &[1, 1]),
            inst(0, &[1, 2]),
            inst(1, &[2, 1]),
            inst(1, &[2, 2]),
        ];
        let idx: Vec<usize> = (0..4).collect();
        let base = entropy(label_counts(&data, &idx).into_values(), 4);

        let parts = partition(&data, &idx, AttributeIndex::new(0));
        let score = score_partition(&data, &parts, 4, base);
        assert!((score.gain - std::f64::consts::LN_2).abs() < 1e-12);
        assert!((score.split_info - std::f64::consts::LN_2).abs() < 1e-12);
        assert!((score.gain_ratio() - 1.0).abs() < 1e-12);

        let parts = partition(&data, &idx, AttributeIndex::new(1));
        let score = score_partition(&data, &parts, 4, base);
        assert!(score.gain.abs() < 1e-12);
    }

    #[test]
    fn zero_split_info_scores_negative_infinity() {
        let score = AttributeScore {
            gain: 0.0,
            split_info: 0.0,
        };
        assert_eq!(score.gain_ratio(), f64::NEG_INFINITY);
        assert_eq!(score.metric(SplitCriterion::InformationGain), 0.0);
    }

    #[test]
    fn best_split_picks_informative_attribute() {
        let data = vec![
            inst(0, &[1, 1, 5]),
            inst(0, &[2, 1, 5]),
            inst(1, &[1, 2, 5]),
            inst(1, &[2, 2, 5]),
        ];
        let idx: Vec<usize> = (0..4).collect();
        let base = entropy(label_counts(&data, &idx).into_values(), 4);
        for criterion in [SplitCriterion::InformationGain, SplitCriterion::GainRatio] {
            let split =
                find_best_split(&data, &idx, &AttributeSet::all(3), criterion, base).unwrap();
            assert_eq!(split.attribute.index(), 1);
            assert_eq!(split.partitions.len(), 2);
            assert!(split.score.gain > 0.0);
        }
    }

    #[test]
    fn ties_go_to_lowest_index() {
        // Attributes 0 and 2 are identical copies.
        let data = vec![inst(0, &[1, 7, 1]), inst(1, &[2, 7, 2])];
        let idx = vec![0, 1];
        let base = entropy(label_counts(&data, &idx).into_values(), 2);
        let split = find_best_split(
            &data,
            &idx,
            &AttributeSet::all(3),
            SplitCriterion::GainRatio,
            base,
        )
        .unwrap();
        assert_eq!(split.attribute.index(), 0);
    }

    #[test]
    fn gain_ratio_skips_constant_attribute() {
        // Attribute 0 is constant; attribute 1 has a defined, small gain ratio.
        let data = vec![
            inst(0, &[4, 1]),
            inst(1, &[4, 1]),
            inst(0, &[4, 2]),
        ];
        let idx = vec![0, 1, 2];
        let base = entropy(label_counts(&data, &idx).into_values(), 3);
        let split = find_best_split(
            &data,
            &idx,
            &AttributeSet::all(2),
            SplitCriterion::GainRatio,
            base,
        )
        .unwrap();
        assert_eq!(split.attribute.index(), 1);
    }

    #[test]
    fn all_undefined_falls_back_to_lowest_available() {
        let data = vec![inst(0, &[4, 1, 9]), inst(1, &[4, 1, 9])];
        let idx = vec![0, 1];
        let base = entropy(label_counts(&data, &idx).into_values(), 2);
        let available = AttributeSet::all(3).without(AttributeIndex::new(0));
        let split =
            find_best_split(&data, &idx, &available, SplitCriterion::GainRatio, base).unwrap();
        assert_eq!(split.attribute.index(), 1);
        assert_eq!(split.partitions.len(), 1);
    }

    #[test]
    fn no_available_attribute_yields_none() {
        let data = vec![inst(0, &[1]), inst(1, &[2])];
        let base = entropy([1usize, 1], 2);
        let available = AttributeSet::all(1).without(AttributeIndex::new(0));
        assert!(
            find_best_split(&data, &[0, 1], &available, SplitCriterion::InformationGain, base)
                .is_none()
        );
    }
}
