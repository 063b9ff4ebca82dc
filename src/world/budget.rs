//! Capacity-capped instance lists for decoration consumers.
//!
//! Instanced renderers have a fixed capacity. When the active chunks offer
//! more candidates than fit, the nearest to the observer are kept and the
//! rest are dropped; overflow degrades detail in the distance, never up close.

use glam::Vec2;
use tracing::warn;

use crate::world::placement::{
    CollectiblePlacement, CottagePlacement, FlowerPlacement, LogPlacement, RockPlacement,
    TreePlacement, VegetationPlacement,
};

/// Anything with a ground position.
pub trait Positioned {
    fn position_xz(&self) -> Vec2;
}

macro_rules! impl_positioned {
    ($($ty:ty),* $(,)?) => {
        $(impl Positioned for $ty {
            fn position_xz(&self) -> Vec2 {
                Vec2::new(self.x, self.z)
            }
        })*
    };
}

impl_positioned!(
    TreePlacement,
    VegetationPlacement,
    FlowerPlacement,
    RockPlacement,
    CollectiblePlacement,
    LogPlacement,
    CottagePlacement,
);

#[derive(Clone, Debug)]
pub struct InstanceBudget<T> {
    name: &'static str,
    capacity: usize,
    instances: Vec<T>,
    dropped: usize,
}

impl<T: Positioned + Copy> InstanceBudget<T> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity,
            instances: Vec::with_capacity(capacity),
            dropped: 0,
        }
    }

    /// Replaces the instance list with the `capacity` candidates nearest to
    /// `observer`. Returns how many were dropped.
    pub fn rebuild<'a, I>(&mut self, candidates: I, observer: Vec2) -> usize
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        self.instances.clear();
        self.instances.extend(candidates.into_iter().copied());

        self.dropped = self.instances.len().saturating_sub(self.capacity);
        if self.dropped > 0 {
            self.instances.sort_by(|a, b| {
                let da = a.position_xz().distance_squared(observer);
                let db = b.position_xz().distance_squared(observer);
                da.total_cmp(&db)
            });
            self.instances.truncate(self.capacity);
            warn!(
                "{} budget full: kept {}, dropped {} furthest",
                self.name, self.capacity, self.dropped
            );
        }
        self.dropped
    }

    pub fn instances(&self) -> &[T] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rock(x: f32, z: f32) -> RockPlacement {
        RockPlacement {
            x,
            y: 0.0,
            z,
            size: crate::world::placement::RockSize::Small,
            rotation_seed: 0.0,
        }
    }

    #[test]
    fn test_under_capacity_keeps_everything() {
        let rocks = [rock(1.0, 0.0), rock(50.0, 0.0)];
        let mut budget = InstanceBudget::new("rocks", 4);
        assert_eq!(budget.rebuild(rocks.iter(), Vec2::ZERO), 0);
        assert_eq!(budget.len(), 2);
    }

    #[test]
    fn test_overflow_drops_furthest() {
        let rocks = [
            rock(30.0, 0.0),
            rock(-2.0, 1.0),
            rock(0.0, 90.0),
            rock(5.0, 5.0),
        ];
        let mut budget = InstanceBudget::new("rocks", 2);
        assert_eq!(budget.rebuild(rocks.iter(), Vec2::ZERO), 2);
        let kept: Vec<Vec2> = budget.instances().iter().map(|r| r.position_xz()).collect();
        assert_eq!(kept, vec![Vec2::new(-2.0, 1.0), Vec2::new(5.0, 5.0)]);
        assert_eq!(budget.dropped(), 2);
    }

    #[test]
    fn test_observer_moves_the_cut() {
        let rocks = [rock(0.0, 0.0), rock(100.0, 0.0)];
        let mut budget = InstanceBudget::new("rocks", 1);
        budget.rebuild(rocks.iter(), Vec2::new(90.0, 0.0));
        assert_eq!(budget.instances()[0].x, 100.0);
    }
}
