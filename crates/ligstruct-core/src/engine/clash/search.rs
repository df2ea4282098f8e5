use super::ClashPair;
use super::rotor::Rotor;
use crate::core::models::ids::AtomId;
use crate::core::models::system::{CoordinateSnapshot, MolecularSystem};
use itertools::Itertools;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Chosen angle step per rotor; step `k` means `k * 360 / angle_steps` degrees.
    pub steps: Vec<usize>,
    pub clashes: usize,
    /// Configurations evaluated.
    pub nodes: usize,
    /// The node budget ran out before the search space was covered.
    pub exhausted: bool,
}

struct Frame {
    next: usize,
    pairs_at_zero: Vec<ClashPair>,
}

/// Discretized dihedral search over an ordered rotor list.
///
/// Configurations are always rebuilt from the coordinates captured at construction, so
/// every search leaves the system either unchanged or in the best configuration found.
pub struct RotorSearch<'r> {
    rotors: &'r [Rotor],
    angle_steps: usize,
    base: CoordinateSnapshot,
}

impl<'r> RotorSearch<'r> {
    pub fn new(system: &MolecularSystem, rotors: &'r [Rotor], angle_steps: usize) -> Self {
        let atoms: Vec<AtomId> = rotors
            .iter()
            .flat_map(|rotor| rotor.moving_atoms().iter().copied())
            .unique()
            .collect();
        Self {
            rotors,
            angle_steps: angle_steps.max(1),
            base: system.snapshot(&atoms),
        }
    }

    fn step_degrees(&self) -> f64 {
        360.0 / self.angle_steps as f64
    }

    /// Restores the captured coordinates, then turns rotor `i` by `steps[i]` in order.
    pub fn apply(&self, system: &mut MolecularSystem, steps: &[usize]) {
        system.restore(&self.base);
        for (rotor, &step) in self.rotors.iter().zip(steps) {
            if step != 0 {
                rotor.apply(system, step as f64 * self.step_degrees());
            }
        }
    }

    /// Scans every angle of the first rotor.
    ///
    /// The fewest clashes win; among equals the smallest rotation, then the first found.
    pub fn scan_first<F>(&self, system: &mut MolecularSystem, clash_pairs: F) -> SearchOutcome
    where
        F: Fn(&MolecularSystem) -> Vec<ClashPair>,
    {
        let mut steps = vec![0; self.rotors.len()];
        self.apply(system, &[]);
        let start = clash_pairs(system).len();
        if self.rotors.is_empty() || start == 0 {
            return SearchOutcome {
                steps,
                clashes: start,
                nodes: 0,
                exhausted: false,
            };
        }

        let mut best = (start, 0, 0);
        for step in 1..self.angle_steps {
            self.apply(system, &[step]);
            let clashes = clash_pairs(system).len();
            let magnitude = step.min(self.angle_steps - step);
            trace!(step, clashes, "Single rotor scan.");
            if (clashes, magnitude) < (best.0, best.1) {
                best = (clashes, magnitude, step);
            }
        }

        steps[0] = best.2;
        self.apply(system, &steps);
        SearchOutcome {
            steps,
            clashes: best.0,
            nodes: self.angle_steps - 1,
            exhausted: false,
        }
    }

    /// Depth-first search over all rotors with an explicit stack.
    ///
    /// A branch is cut when the clashes that no remaining rotor can change already reach
    /// the best count: both atoms of such a pair move together under every remaining
    /// rotor, so their distance is fixed. The search stops at zero clashes or after
    /// `max_nodes` evaluations.
    pub fn backtrack<F>(&self, system: &mut MolecularSystem, max_nodes: usize, clash_pairs: F) -> SearchOutcome
    where
        F: Fn(&MolecularSystem) -> Vec<ClashPair>,
    {
        let m = self.rotors.len();
        self.apply(system, &[]);
        let start_pairs = clash_pairs(system);
        let mut best = start_pairs.len();
        let mut best_steps = vec![0; m];
        let mut nodes = 0;
        let mut exhausted = false;

        if m == 0 || best == 0 || self.fixed_clashes(&start_pairs, 0) >= best {
            return SearchOutcome {
                steps: best_steps,
                clashes: best,
                nodes,
                exhausted,
            };
        }

        let mut assignment = vec![0; m];
        let mut stack = vec![Frame {
            next: 0,
            pairs_at_zero: start_pairs,
        }];

        while !stack.is_empty() {
            let depth = stack.len() - 1;
            let frame = &mut stack[depth];
            if frame.next == self.angle_steps {
                assignment[depth] = 0;
                stack.pop();
                continue;
            }
            let step = frame.next;
            frame.next += 1;
            assignment[depth] = step;

            // Step zero leaves this rotor alone, so the parent's pairs still hold.
            let pairs = if step == 0 {
                frame.pairs_at_zero.clone()
            } else {
                if nodes == max_nodes {
                    exhausted = true;
                    break;
                }
                nodes += 1;
                self.apply(system, &assignment[..=depth]);
                let pairs = clash_pairs(system);
                trace!(depth, step, clashes = pairs.len(), "Search node.");
                if pairs.len() < best {
                    best = pairs.len();
                    best_steps.clone_from(&assignment);
                    if best == 0 {
                        break;
                    }
                }
                pairs
            };

            if depth + 1 < m && self.fixed_clashes(&pairs, depth + 1) < best {
                stack.push(Frame {
                    next: 0,
                    pairs_at_zero: pairs,
                });
            }
        }

        self.apply(system, &best_steps);
        SearchOutcome {
            steps: best_steps,
            clashes: best,
            nodes,
            exhausted,
        }
    }

    fn fixed_clashes(&self, pairs: &[ClashPair], from: usize) -> usize {
        let remaining = &self.rotors[from..];
        pairs
            .iter()
            .filter(|&&(a, b)| remaining.iter().all(|rotor| rotor.moves(a) == rotor.moves(b)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clash::detector::ClashDetector;
    use crate::test_utils::{branched_cis_chain, cis_chain, test_radii};

    #[test]
    fn scan_prefers_the_smallest_resolving_rotation() {
        let mut system = MolecularSystem::new();
        let chain = cis_chain(&mut system);
        let detector = ClashDetector::new(&system, &test_radii(), 1.2).unwrap();
        let rotors = [Rotor::new(&system, chain[1], chain[2]).unwrap()];
        let search = RotorSearch::new(&system, &rotors, 24);

        let outcome = search.scan_first(&mut system, |s| detector.clash_pairs_within(s, &chain));

        assert_eq!(outcome.clashes, 0);
        assert_eq!(outcome.steps, vec![7]);
        assert_eq!(detector.count_within(&system, &chain), 0);
    }

    #[test]
    fn backtracking_reaches_a_rotor_beyond_the_first() {
        let mut system = MolecularSystem::new();
        let (chain, branch) = branched_cis_chain(&mut system);
        let atoms: Vec<_> = chain.iter().chain(&branch).copied().collect();
        let detector = ClashDetector::new(&system, &test_radii(), 1.2).unwrap();
        let rotors = [
            Rotor::smaller_side(&system, branch[0], branch[1]).unwrap(),
            Rotor::new(&system, chain[1], chain[2]).unwrap(),
        ];
        let search = RotorSearch::new(&system, &rotors, 24);

        let outcome = search.backtrack(&mut system, 1000, |s| detector.clash_pairs_within(s, &atoms));

        assert_eq!(outcome.clashes, 0);
        assert_eq!(outcome.steps, vec![0, 7]);
        assert_eq!(outcome.nodes, 7);
        assert!(!outcome.exhausted);
        assert_eq!(detector.count_within(&system, &atoms), 0);
    }

    #[test]
    fn exhausted_budget_keeps_the_best_configuration() {
        let mut system = MolecularSystem::new();
        let (chain, branch) = branched_cis_chain(&mut system);
        let atoms: Vec<_> = chain.iter().chain(&branch).copied().collect();
        let before = system.snapshot(&atoms);
        let detector = ClashDetector::new(&system, &test_radii(), 1.2).unwrap();
        let rotors = [
            Rotor::smaller_side(&system, branch[0], branch[1]).unwrap(),
            Rotor::new(&system, chain[1], chain[2]).unwrap(),
        ];
        let search = RotorSearch::new(&system, &rotors, 24);

        let outcome = search.backtrack(&mut system, 3, |s| detector.clash_pairs_within(s, &atoms));

        assert!(outcome.exhausted);
        assert_eq!(outcome.nodes, 3);
        assert_eq!(outcome.clashes, 1);
        assert_eq!(system.snapshot(&atoms), before);
    }

    #[test]
    fn clashes_no_rotor_can_touch_are_pruned_at_the_root() {
        let mut system = MolecularSystem::new();
        let (chain, branch) = branched_cis_chain(&mut system);
        let atoms: Vec<_> = chain.iter().chain(&branch).copied().collect();
        let detector = ClashDetector::new(&system, &test_radii(), 1.2).unwrap();
        let rotors = [Rotor::smaller_side(&system, branch[0], branch[1]).unwrap()];
        let search = RotorSearch::new(&system, &rotors, 24);

        let outcome = search.backtrack(&mut system, 1000, |s| detector.clash_pairs_within(s, &atoms));

        assert_eq!(outcome.clashes, 1);
        assert_eq!(outcome.nodes, 0);
    }
}
