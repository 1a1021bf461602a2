// Flat storage for every bolt in the storm. Parents refer to their branches
// by handle, so trees are walked with explicit stacks and dropped without
// recursive destructors.

use ::rand as external_rand;
use external_rand::Rng;

use crate::bolt::Bolt;
use crate::config::SimulationConfig;
use crate::particle::Particle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoltId(usize);

impl BoltId {
    #[cfg(test)]
    pub(crate) fn from_raw(index: usize) -> Self {
        BoltId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug, Default)]
pub struct BoltArena {
    slots: Vec<Option<Bolt>>,
    free: Vec<usize>,
    live: usize,
}

impl BoltArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, bolt: Bolt) -> BoltId {
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(bolt);
                BoltId(index)
            }
            None => {
                self.slots.push(Some(bolt));
                BoltId(self.slots.len() - 1)
            }
        }
    }

    pub fn get(&self, id: BoltId) -> Option<&Bolt> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: BoltId) -> Option<&mut Bolt> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Drop `id` and everything below it. Returns the number of bolts freed.
    pub fn remove_subtree(&mut self, id: BoltId) -> usize {
        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(bolt) = self.slots.get_mut(current.0).and_then(Option::take) else {
                continue;
            };
            stack.extend(bolt.branches);
            self.free.push(current.0);
            self.live -= 1;
            removed += 1;
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoltId, &Bolt)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|bolt| (BoltId(i), bolt)))
    }

    /// Step the tree rooted at `root` once.
    ///
    /// Every branch is stepped before its parent, and expired branches are
    /// pruned before the parent decides whether it has drained. Branches born
    /// during this step are not stepped until the next one.
    pub fn update_tree<R: Rng + ?Sized>(
        &mut self,
        root: BoltId,
        rng: &mut R,
        config: &SimulationConfig,
        particles: &mut Vec<Particle>,
    ) {
        let mut stack = vec![(root, false)];
        let mut spawned = Vec::new();

        while let Some((id, children_done)) = stack.pop() {
            if !children_done {
                let Some(bolt) = self.get(id) else {
                    continue;
                };
                stack.push((id, true));
                stack.extend(bolt.branches.iter().rev().map(|&child| (child, false)));
                continue;
            }

            self.prune_expired_branches(id);

            let Some(bolt) = self.get_mut(id) else {
                continue;
            };
            bolt.advance(rng, config, &mut spawned, particles);

            for child in spawned.drain(..) {
                let child_id = self.insert(child);
                if let Some(parent) = self.get_mut(id) {
                    parent.branches.push(child_id);
                }
            }
        }
    }

    fn prune_expired_branches(&mut self, id: BoltId) {
        let Some(bolt) = self.get(id) else {
            return;
        };
        let expired: Vec<BoltId> = bolt
            .branches
            .iter()
            .copied()
            .filter(|&child| self.get(child).map_or(true, Bolt::is_expired))
            .collect();
        if expired.is_empty() {
            return;
        }
        if let Some(bolt) = self.get_mut(id) {
            bolt.branches.retain(|child| !expired.contains(child));
        }
        for child in expired {
            self.remove_subtree(child);
        }
    }

    /// Number of bolts in the tree rooted at `root`, root included.
    pub fn subtree_size(&self, root: BoltId) -> usize {
        let mut count = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(bolt) = self.get(id) {
                count += 1;
                stack.extend(bolt.branches.iter().copied());
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use external_rand::rngs::StdRng;
    use external_rand::SeedableRng;

    #[test]
    fn test_insert_reuses_freed_slots() {
        let mut arena = BoltArena::new();
        let a = arena.insert(Bolt::toward(Point::new(0.0, 0.0), Point::new(10.0, 0.0)));
        let b = arena.insert(Bolt::toward(Point::new(0.0, 0.0), Point::new(20.0, 0.0)));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.remove_subtree(a), 1);
        assert!(arena.get(a).is_none());
        let c = arena.insert(Bolt::toward(Point::new(0.0, 0.0), Point::new(30.0, 0.0)));
        assert_eq!(c.index(), a.index());
        assert_eq!(arena.len(), 2);
        assert!(arena.get(b).is_some());
    }

    #[test]
    fn test_remove_subtree_frees_descendants() {
        let mut arena = BoltArena::new();
        let root = arena.insert(Bolt::toward(Point::new(0.0, 0.0), Point::new(10.0, 0.0)));
        let child = arena.insert(Bolt::toward(Point::new(0.0, 0.0), Point::new(5.0, 5.0)));
        let grandchild = arena.insert(Bolt::toward(Point::new(0.0, 0.0), Point::new(1.0, 1.0)));
        arena.get_mut(child).unwrap().branches.push(grandchild);
        arena.get_mut(root).unwrap().branches.push(child);
        let other = arena.insert(Bolt::toward(Point::new(0.0, 0.0), Point::new(2.0, 2.0)));

        assert_eq!(arena.subtree_size(root), 3);
        assert_eq!(arena.remove_subtree(root), 3);
        assert_eq!(arena.len(), 1);
        assert!(arena.get(other).is_some());
    }

    fn fan_out_config(max_depth: u32) -> SimulationConfig {
        SimulationConfig {
            branching_chance: 1.0,
            branching_length_modifier: 0.5,
            segments_per_step: 1.0,
            segment_lifetime_ms: Some(1.0e9),
            max_depth: Some(max_depth),
            particles_enabled: false,
            ..Default::default()
        }
    }

    fn count_by_depth(arena: &BoltArena) -> Vec<usize> {
        let mut counts = vec![0; 8];
        for (_, bolt) in arena.iter() {
            counts[bolt.depth as usize] += 1;
        }
        counts
    }

    #[test]
    fn test_single_generation_doubles_per_segment() {
        let config = fan_out_config(1);
        let mut rng = StdRng::seed_from_u64(21);
        let mut arena = BoltArena::new();
        let mut particles = Vec::new();
        let root = arena.insert(Bolt::toward(Point::new(0.0, 0.0), Point::new(1_000.0, 0.0)));
        for step in 1..=5 {
            arena.update_tree(root, &mut rng, &config, &mut particles);
            assert_eq!(arena.get(root).unwrap().branches.len(), 2 * step);
        }
        assert!(arena.iter().all(|(_, bolt)| bolt.depth <= 1));
    }

    #[test]
    fn test_fan_out_stops_at_depth_cap() {
        let config = fan_out_config(3);
        let mut rng = StdRng::seed_from_u64(22);
        let mut arena = BoltArena::new();
        let mut particles = Vec::new();
        let root = arena.insert(Bolt::toward(Point::new(0.0, 0.0), Point::new(1_000.0, 0.0)));

        // n[d](t) = n[d](t-1) + 2 * n[d-1](t-1), capped at depth 3
        let expected: [[usize; 4]; 4] = [
            [1, 2, 0, 0],
            [1, 4, 4, 0],
            [1, 6, 12, 8],
            [1, 8, 24, 32],
        ];
        for row in expected {
            arena.update_tree(root, &mut rng, &config, &mut particles);
            let counts = count_by_depth(&arena);
            assert_eq!(&counts[..4], &row[..]);
            assert_eq!(counts[4], 0);
        }
        assert_eq!(arena.subtree_size(root), arena.len());
    }

    #[test]
    fn test_parent_lifetime_leaves_longer_lived_branch_running() {
        let config = SimulationConfig {
            mode: crate::config::GrowthMode::Directional,
            survival_probability: 1.0,
            branching_chance: 0.0,
            segment_lifetime_ms: None,
            particles_enabled: false,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(24);
        let mut arena = BoltArena::new();
        let mut particles = Vec::new();
        let mut parent = Bolt::directional(Point::new(0.0, 0.0), 0.0, 1.0);
        parent.remaining_ms = Some(50.0);
        let mut child = Bolt::directional(Point::new(0.0, 0.0), 1.0, 1.0);
        child.remaining_ms = Some(500.0);
        let root = arena.insert(parent);
        let branch = arena.insert(child);
        arena.get_mut(root).unwrap().branches.push(branch);

        for _ in 0..5 {
            arena.update_tree(root, &mut rng, &config, &mut particles);
        }
        let parent = arena.get(root).unwrap();
        assert!(!parent.is_growing());
        assert!(!parent.is_expired());
        assert!(parent.segments.is_empty());
        assert_eq!(parent.branches, vec![branch]);
        assert!(arena.get(branch).unwrap().is_growing());

        let mut steps = 5;
        while !arena.get(root).unwrap().is_expired() {
            arena.update_tree(root, &mut rng, &config, &mut particles);
            steps += 1;
            assert!(steps < 100, "parent never expired");
        }
        // the branch ran its full 500ms before the parent let go
        assert!(steps >= 30);
        assert!(arena.get(branch).is_none());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_expired_branches_are_pruned_after_draining() {
        let config = SimulationConfig {
            branching_chance: 0.0,
            particles_enabled: false,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(23);
        let mut arena = BoltArena::new();
        let mut particles = Vec::new();
        let root = arena.insert(Bolt::toward(Point::new(0.0, 0.0), Point::new(400.0, 0.0)));
        let branch = arena.insert(Bolt::toward(Point::new(0.0, 0.0), Point::new(0.0, 4.0)));
        arena.get_mut(root).unwrap().branches.push(branch);

        let mut steps = 0;
        while arena.get(root).unwrap().branches.contains(&branch) {
            arena.update_tree(root, &mut rng, &config, &mut particles);
            steps += 1;
            assert!(steps < 50, "branch never drained");
        }
        assert!(arena.get(branch).is_none());
        assert_eq!(arena.len(), 1);
    }
}
