//! Attractor Signatures and Tolerance-Based Merging
//!
//! A trajectory's post-transient (max, min) of X is its signature. Small
//! spread means it settled on an equilibrium, large spread means it is
//! cycling. Signatures of the same kind collapse into one attractor when
//! one box contains the other or both bounds lie within the proximity
//! tolerance; the tighter box survives.

use serde::{Deserialize, Serialize};

use super::classifier::{ClassifierConfig, Regime};
use crate::kernel::TrajectorySummary;

/// One distinguishable long-run behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Attractor {
    Equilibrium { max: f64, min: f64 },
    PeriodicOrbit { max: f64, min: f64 },
    /// Trajectory ran into the lattice edge
    Diverged,
}

impl Attractor {
    /// Equilibrium iff `max − min` is within the spread threshold
    pub fn classify(max: f64, min: f64, config: &ClassifierConfig) -> Self {
        if max - min <= config.spread_threshold {
            Attractor::Equilibrium { max, min }
        } else {
            Attractor::PeriodicOrbit { max, min }
        }
    }

    pub fn from_summary(summary: &TrajectorySummary, config: &ClassifierConfig) -> Self {
        if summary.diverged() {
            return Attractor::Diverged;
        }
        Self::classify(summary.x.max as f64, summary.x.min as f64, config)
    }

    /// (max, min), or `None` for a diverged run
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match *self {
            Attractor::Equilibrium { max, min } | Attractor::PeriodicOrbit { max, min } => {
                Some((max, min))
            }
            Attractor::Diverged => None,
        }
    }

    pub fn spread(&self) -> f64 {
        self.bounds().map_or(f64::INFINITY, |(max, min)| max - min)
    }

    pub fn is_equilibrium(&self) -> bool {
        matches!(self, Attractor::Equilibrium { .. })
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self, Attractor::PeriodicOrbit { .. })
    }

    /// Same kind, and nested boxes or both bounds within `proximity`
    pub fn merges_with(&self, other: &Attractor, proximity: f64) -> bool {
        use Attractor::*;
        match (*self, *other) {
            (Diverged, Diverged) => true,
            (Equilibrium { max: a_max, min: a_min }, Equilibrium { max: b_max, min: b_min })
            | (
                PeriodicOrbit { max: a_max, min: a_min },
                PeriodicOrbit { max: b_max, min: b_min },
            ) => {
                let a_in_b = a_max <= b_max && a_min >= b_min;
                let b_in_a = b_max <= a_max && b_min >= a_min;
                let close =
                    (a_max - b_max).abs() <= proximity && (a_min - b_min).abs() <= proximity;
                a_in_b || b_in_a || close
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Member {
    attractor: Attractor,
    /// Indices of the input signatures folded into this member
    sources: Vec<usize>,
}

/// Canonical attractors of one analysis run
///
/// Members keep first-appearance order, so the first equilibrium is the
/// one reached by the lowest-indexed input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttractorSet {
    members: Vec<Member>,
    proximity: f64,
}

impl AttractorSet {
    /// Merge `attractors` until no two members merge
    pub fn from_attractors<I>(attractors: I, proximity: f64) -> Self
    where
        I: IntoIterator<Item = Attractor>,
    {
        let members = attractors
            .into_iter()
            .enumerate()
            .map(|(i, attractor)| Member {
                attractor,
                sources: vec![i],
            })
            .collect();
        let mut set = Self { members, proximity };
        set.settle();
        set
    }

    /// Re-run the merge on an existing set; a settled set is unchanged
    pub fn merged(&self) -> Self {
        let mut set = self.clone();
        set.settle();
        set
    }

    /// Sweep members front to back, folding each into the first earlier
    /// survivor it merges with, until a sweep merges nothing
    fn settle(&mut self) {
        loop {
            let mut merged_any = false;
            let mut survivors: Vec<Member> = Vec::with_capacity(self.members.len());

            for member in self.members.drain(..) {
                let target = survivors
                    .iter()
                    .position(|s| s.attractor.merges_with(&member.attractor, self.proximity));
                match target {
                    Some(k) => {
                        let keep = &mut survivors[k];
                        // strictly tighter replaces; ties keep the earlier one
                        if member.attractor.spread() < keep.attractor.spread() {
                            keep.attractor = member.attractor;
                        }
                        keep.sources.extend(member.sources);
                        merged_any = true;
                    }
                    None => survivors.push(member),
                }
            }

            self.members = survivors;
            if !merged_any {
                break;
            }
        }
        for m in &mut self.members {
            m.sources.sort_unstable();
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attractor> {
        self.members.iter().map(|m| &m.attractor)
    }

    pub fn attractors(&self) -> Vec<Attractor> {
        self.iter().copied().collect()
    }

    pub fn equilibria(&self) -> impl Iterator<Item = &Attractor> {
        self.iter().filter(|a| a.is_equilibrium())
    }

    pub fn periodic_orbits(&self) -> impl Iterator<Item = &Attractor> {
        self.iter().filter(|a| a.is_periodic())
    }

    pub fn has_diverged(&self) -> bool {
        self.iter().any(|a| *a == Attractor::Diverged)
    }

    /// Member index that absorbed input `source`
    pub fn member_of(&self, source: usize) -> Option<usize> {
        self.members
            .iter()
            .position(|m| m.sources.binary_search(&source).is_ok())
    }

    /// Member at `index`
    pub fn get(&self, index: usize) -> Option<&Attractor> {
        self.members.get(index).map(|m| &m.attractor)
    }

    /// Rank of member `index` among members of its own kind
    pub fn rank_within_kind(&self, index: usize) -> Option<usize> {
        let target = self.get(index)?;
        let rank = self.members[..index]
            .iter()
            .filter(|m| std::mem::discriminant(&m.attractor) == std::mem::discriminant(target))
            .count();
        Some(rank)
    }

    /// Label from the equilibrium and orbit counts
    pub fn regime(&self) -> Regime {
        if self.has_diverged() {
            return Regime::Other;
        }
        Regime::from_counts(self.equilibria().count(), self.periodic_orbits().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(max: f64, min: f64) -> Attractor {
        Attractor::Equilibrium { max, min }
    }

    fn po(max: f64, min: f64) -> Attractor {
        Attractor::PeriodicOrbit { max, min }
    }

    #[test]
    fn test_classify_by_spread() {
        let config = ClassifierConfig::default();
        assert!(Attractor::classify(12.0, 8.0, &config).is_equilibrium());
        assert!(Attractor::classify(13.0, 8.0, &config).is_periodic());

        let continuous = ClassifierConfig::continuous();
        assert!(Attractor::classify(0.204, 0.2, &continuous).is_equilibrium());
        assert!(Attractor::classify(0.3, 0.2, &continuous).is_periodic());
    }

    #[test]
    fn test_merge_rules() {
        // containment
        assert!(eq(10.0, 7.0).merges_with(&eq(9.0, 8.0), 1.0));
        assert!(eq(9.0, 8.0).merges_with(&eq(10.0, 7.0), 1.0));
        // proximity on both bounds
        assert!(eq(10.0, 9.0).merges_with(&eq(11.0, 10.0), 1.0));
        assert!(!eq(10.0, 9.0).merges_with(&eq(12.0, 10.0), 1.0));
        // kinds never mix
        assert!(!eq(10.0, 9.0).merges_with(&po(10.0, 9.0), 1.0));
        assert!(!Attractor::Diverged.merges_with(&eq(63.0, 63.0), 1.0));
        assert!(Attractor::Diverged.merges_with(&Attractor::Diverged, 1.0));
    }

    #[test]
    fn test_tighter_pair_survives() {
        let set = AttractorSet::from_attractors([eq(12.0, 9.0), eq(11.0, 10.0)], 1.0);
        assert_eq!(set.attractors(), vec![eq(11.0, 10.0)]);
        assert_eq!(set.member_of(0), Some(0));
        assert_eq!(set.member_of(1), Some(0));
    }

    #[test]
    fn test_separated_equilibria_stay_apart() {
        let set = AttractorSet::from_attractors(
            [eq(4.0, 3.0), eq(45.0, 44.0), eq(4.0, 4.0), po(50.0, 10.0)],
            1.0,
        );
        assert_eq!(set.equilibria().count(), 2);
        assert_eq!(set.periodic_orbits().count(), 1);
        assert_eq!(set.member_of(2), Some(0));
        assert_eq!(set.rank_within_kind(1), Some(1));
        assert_eq!(set.rank_within_kind(2), Some(0));
    }

    #[test]
    fn test_merge_is_idempotent() {
        // a chain that only collapses after the first replacement
        let input = [
            eq(20.0, 16.0),
            eq(30.0, 27.0),
            eq(18.0, 17.0),
            eq(29.0, 28.0),
            eq(17.5, 17.0),
            po(60.0, 5.0),
            po(59.0, 6.0),
            po(40.0, 20.0),
        ];
        let once = AttractorSet::from_attractors(input, 1.0);
        let twice = once.merged();
        assert_eq!(once, twice);
        assert_eq!(
            AttractorSet::from_attractors(once.attractors(), 1.0).attractors(),
            once.attractors()
        );
    }

    #[test]
    fn test_regime_counts() {
        let set = AttractorSet::from_attractors([eq(5.0, 4.0)], 1.0);
        assert_eq!(set.regime(), Regime::Monostable);

        let set = AttractorSet::from_attractors([eq(5.0, 4.0), eq(40.0, 39.0)], 1.0);
        assert_eq!(set.regime(), Regime::Bistable);

        let set = AttractorSet::from_attractors([po(50.0, 10.0)], 1.0);
        assert_eq!(set.regime(), Regime::Periodic);

        let set = AttractorSet::from_attractors([eq(5.0, 4.0), po(50.0, 10.0)], 1.0);
        assert_eq!(set.regime(), Regime::Coexistence);

        let set = AttractorSet::from_attractors([eq(5.0, 4.0), Attractor::Diverged], 1.0);
        assert_eq!(set.regime(), Regime::Other);

        let set = AttractorSet::from_attractors(std::iter::empty(), 1.0);
        assert_eq!(set.regime(), Regime::Other);
    }
}
