//! Chunk streaming around a moving observer
//!
//! The needed set and pending queue are only recomputed when the observer
//! crosses into a different chunk; every other frame just drains the queue
//! under the per-frame budget. Deactivated chunks go back to a pool and are
//! rebuilt in place when a new coordinate needs them.

use std::collections::VecDeque;
use std::collections::hash_map::Values;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::world::chunk::{Chunk, ChunkKey, chunk_coord};
use crate::world::terrain::Terrain;

/// Observer chunk coordinates are clamped to this magnitude. Beyond it the
/// world coordinates of a chunk no longer fit the noise lattice.
pub const MAX_CHUNK_COORD: i32 = 1 << 20;

/// Read-only view handed to change listeners.
pub type ActiveChunks<'a> = Values<'a, ChunkKey, Chunk>;

type ChangeListener = Box<dyn FnMut(ActiveChunks<'_>)>;

/// What a single `update` call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub loaded: usize,
    /// Loaded chunks attached to the scene for the first time; chunks
    /// rebuilt from the pool keep their earlier attachment
    pub attached: usize,
    pub unloaded: usize,
    /// Whether the observer entered a new chunk this call
    pub crossed: bool,
    pub pending: usize,
}

pub struct ChunkManager {
    terrain: Arc<Terrain>,
    active: FxHashMap<ChunkKey, Chunk>,
    pool: Vec<Chunk>,
    pending: VecDeque<ChunkKey>,
    last_observer_chunk: Option<ChunkKey>,
    budget: usize,
    listener: Option<ChangeListener>,
}

impl ChunkManager {
    pub fn new(terrain: Arc<Terrain>) -> Self {
        let budget = terrain.settings().stream.max_chunks_per_frame;
        Self {
            terrain,
            active: FxHashMap::default(),
            pool: Vec::new(),
            pending: VecDeque::new(),
            last_observer_chunk: None,
            budget,
            listener: None,
        }
    }

    pub fn terrain(&self) -> &Arc<Terrain> {
        &self.terrain
    }

    /// Registers the callback fired once after any update that loaded chunks.
    pub fn set_listener(&mut self, listener: impl FnMut(ActiveChunks<'_>) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn observer_chunk(&self, x: f32, z: f32) -> ChunkKey {
        let size = self.terrain.settings().stream.chunk_size;
        let clamp = |c: i32| c.clamp(-MAX_CHUNK_COORD, MAX_CHUNK_COORD);
        (clamp(chunk_coord(x, size)), clamp(chunk_coord(z, size)))
    }

    pub fn update(&mut self, x: f32, z: f32) -> UpdateReport {
        let observer = self.observer_chunk(x, z);
        let mut report = UpdateReport::default();

        if self.last_observer_chunk != Some(observer) {
            self.last_observer_chunk = Some(observer);
            report.crossed = true;
            report.unloaded = self.unload_distant(observer);
            self.queue_missing(observer);
            debug!(
                "Observer entered chunk ({}, {}): {} unloaded, {} queued",
                observer.0,
                observer.1,
                report.unloaded,
                self.pending.len()
            );
        }

        (report.loaded, report.attached) = self.drain_pending();
        report.pending = self.pending.len();

        if report.loaded > 0 {
            if let Some(listener) = self.listener.as_mut() {
                listener(self.active.values());
            }
        }
        report
    }

    /// Loads everything in range right now, ignoring the frame budget.
    pub fn force_load_all(&mut self, x: f32, z: f32) -> UpdateReport {
        let budget = self.budget;
        self.last_observer_chunk = None;
        self.budget = usize::MAX;
        let report = self.update(x, z);
        self.budget = budget;
        info!("Force loaded {} chunks", report.loaded);
        report
    }

    fn unload_distant(&mut self, observer: ChunkKey) -> usize {
        let radius = self.terrain.settings().stream.unload_radius;
        let to_remove: Vec<ChunkKey> = self
            .active
            .keys()
            .filter(|&&key| chebyshev(key, observer) > radius.max(0) as u32)
            .copied()
            .collect();

        for key in &to_remove {
            if let Some(mut chunk) = self.active.remove(key) {
                chunk.deactivate();
                self.pool.push(chunk);
            }
        }
        to_remove.len()
    }

    /// Replaces the queue with every in-range chunk not yet active,
    /// nearest first.
    fn queue_missing(&mut self, observer: ChunkKey) {
        let radius = self.terrain.settings().stream.load_radius;
        let (ox, oz) = observer;

        let mut needed: Vec<ChunkKey> = Vec::new();
        for cz in oz.saturating_sub(radius)..=oz.saturating_add(radius) {
            for cx in ox.saturating_sub(radius)..=ox.saturating_add(radius) {
                if !self.active.contains_key(&(cx, cz)) {
                    needed.push((cx, cz));
                }
            }
        }
        // Stable sort keeps row-major order among equal distances
        needed.sort_by_key(|&key| manhattan(key, observer));
        self.pending = needed.into();
    }

    /// Returns how many chunks were loaded and how many of those were
    /// attached for the first time.
    fn drain_pending(&mut self) -> (usize, usize) {
        let mut loaded = 0;
        let mut attached = 0;
        while loaded < self.budget {
            let Some(key) = self.pending.pop_front() else {
                break;
            };
            if self.active.contains_key(&key) {
                continue;
            }

            let mut chunk = self.pool.pop().unwrap_or_default();
            chunk.build(&self.terrain, key.0, key.1);
            if !chunk.is_attached() {
                chunk.mark_attached();
                attached += 1;
            }
            self.active.insert(key, chunk);
            loaded += 1;
        }
        (loaded, attached)
    }

    pub fn active_chunks(&self) -> ActiveChunks<'_> {
        self.active.values()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn chunk(&self, cx: i32, cz: i32) -> Option<&Chunk> {
        self.active.get(&(cx, cz))
    }

    pub fn is_active(&self, cx: i32, cz: i32) -> bool {
        self.active.contains_key(&(cx, cz))
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_keys(&self) -> impl Iterator<Item = &ChunkKey> {
        self.pending.iter()
    }

    pub fn pooled_count(&self) -> usize {
        self.pool.len()
    }

    /// Frees every chunk, active or pooled, and forgets the observer.
    pub fn dispose(&mut self) {
        for (_, mut chunk) in self.active.drain() {
            chunk.dispose();
        }
        for chunk in self.pool.iter_mut() {
            chunk.dispose();
        }
        self.pool.clear();
        self.pending.clear();
        self.last_observer_chunk = None;
    }
}

pub fn chebyshev(a: ChunkKey, b: ChunkKey) -> u32 {
    a.0.abs_diff(b.0).max(a.1.abs_diff(b.1))
}

pub fn manhattan(a: ChunkKey, b: ChunkKey) -> u32 {
    a.0.abs_diff(b.0).saturating_add(a.1.abs_diff(b.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::utils::settings::WorldSettings;

    fn small_manager() -> ChunkManager {
        let mut settings = WorldSettings::with_seed(42);
        settings.stream.segments = 4;
        settings.stream.load_radius = 1;
        settings.stream.unload_radius = 2;
        settings.stream.max_chunks_per_frame = 2;
        ChunkManager::new(Arc::new(Terrain::new(settings)))
    }

    fn assert_invariants(manager: &ChunkManager, x: f32, z: f32) {
        let observer = manager.observer_chunk(x, z);
        let unload = manager.terrain().settings().stream.unload_radius;
        for chunk in manager.active_chunks() {
            assert!(chebyshev(chunk.key(), observer) <= unload as u32);
            assert!(chunk.is_active());
        }
        for key in manager.pending_keys() {
            assert!(!manager.is_active(key.0, key.1));
        }
    }

    #[test]
    fn test_budget_limits_loads_per_update() {
        let mut manager = small_manager();
        let report = manager.update(16.0, 16.0);
        assert!(report.crossed);
        assert_eq!(report.loaded, 2);
        assert_eq!(report.pending, 7);
        assert_invariants(&manager, 16.0, 16.0);

        // Nearest chunk goes first
        assert!(manager.is_active(0, 0));

        let mut frames = 1;
        while manager.pending_count() > 0 {
            let report = manager.update(16.0, 16.0);
            assert!(!report.crossed);
            assert!(report.loaded <= 2);
            assert_invariants(&manager, 16.0, 16.0);
            frames += 1;
        }
        assert_eq!(frames, 5);
        assert_eq!(manager.active_count(), 9);
    }

    #[test]
    fn test_force_load_restores_budget() {
        let mut manager = small_manager();
        let report = manager.force_load_all(0.0, 0.0);
        assert_eq!(report.loaded, 9);
        assert_eq!(report.attached, 9);
        assert_eq!(manager.pending_count(), 0);

        let report = manager.update(3.0 * 32.0 + 1.0, 0.0);
        assert!(report.loaded <= 2);
    }

    #[test]
    fn test_crossing_one_chunk_east() {
        let mut manager = small_manager();
        manager.force_load_all(16.0, 16.0);

        let report = manager.update(48.0, 16.0);
        assert!(report.crossed);
        // Hysteresis keeps cx = -1 alive
        assert_eq!(report.unloaded, 0);
        assert!(manager.is_active(-1, 0));

        manager.force_load_all(48.0, 16.0);
        for cz in -1..=1 {
            for cx in 0..=2 {
                assert!(manager.is_active(cx, cz));
            }
        }
        assert_invariants(&manager, 48.0, 16.0);
    }

    #[test]
    fn test_long_move_recycles_chunks() {
        let mut manager = small_manager();
        manager.force_load_all(16.0, 16.0);

        let x = 3.0 * 32.0 + 16.0;
        let report = manager.force_load_all(x, 16.0);
        // Columns -1 and 0 fall outside the unload radius, column 1 survives
        assert_eq!(report.unloaded, 6);
        assert_eq!(report.loaded, 9);
        // Six come back from the pool already attached
        assert_eq!(report.attached, 3);
        assert!(manager.active_chunks().all(|c| c.cx >= 1));
        assert_invariants(&manager, x, 16.0);
        assert_eq!(manager.pooled_count(), 0);
        assert_eq!(manager.active_count(), 12);
    }

    #[test]
    fn test_listener_fires_once_per_loading_update() {
        let mut manager = small_manager();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::new(Cell::new(0));
        let (c, s) = (calls.clone(), seen.clone());
        manager.set_listener(move |chunks| {
            c.set(c.get() + 1);
            s.set(chunks.count());
        });

        manager.update(16.0, 16.0);
        assert_eq!(calls.get(), 1);
        assert_eq!(seen.get(), 2);

        manager.force_load_all(16.0, 16.0);
        assert_eq!(calls.get(), 2);
        assert_eq!(seen.get(), 9);

        // Nothing left to load
        manager.update(16.0, 16.0);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_rebuilt_chunk_matches_first_build() {
        let mut manager = small_manager();
        manager.force_load_all(16.0, 16.0);
        let before = manager.chunk(1, 1).map(|c| c.decorations.clone());

        manager.force_load_all(10.0 * 32.0, 16.0);
        assert!(!manager.is_active(1, 1));
        manager.force_load_all(16.0, 16.0);

        let after = manager.chunk(1, 1).map(|c| c.decorations.clone());
        assert!(before.is_some());
        assert_eq!(before, after);
    }

    #[test]
    fn test_dispose_releases_everything() {
        let mut manager = small_manager();
        manager.force_load_all(0.0, 0.0);
        manager.force_load_all(10.0 * 32.0, 0.0);
        manager.dispose();
        assert_eq!(manager.active_count(), 0);
        assert_eq!(manager.pooled_count(), 0);
        assert_eq!(manager.pending_count(), 0);
    }

    #[test]
    fn test_distance_metrics() {
        assert_eq!(chebyshev((0, 0), (3, -2)), 3);
        assert_eq!(manhattan((0, 0), (3, -2)), 5);
        assert_eq!(chebyshev((i32::MIN, 0), (i32::MAX, 0)), u32::MAX);
        assert_eq!(manhattan((i32::MIN, i32::MIN), (i32::MAX, i32::MAX)), u32::MAX);
    }

    #[test]
    fn test_far_observer_is_clamped() {
        let mut manager = small_manager();
        assert_eq!(manager.observer_chunk(-1.0e11, 0.0), (-MAX_CHUNK_COORD, 0));
        assert_eq!(
            manager.observer_chunk(f32::MAX, f32::MIN),
            (MAX_CHUNK_COORD, -MAX_CHUNK_COORD)
        );

        let report = manager.update(-1.0e11, 0.0);
        assert!(report.crossed);
        assert!(report.loaded <= 2);
        assert_eq!(report.loaded + report.pending, 9);
        assert_invariants(&manager, -1.0e11, 0.0);

        let report = manager.update(1.0e11, 1.0e11);
        assert!(report.crossed);
        assert_eq!(report.unloaded, 2);
        assert_invariants(&manager, 1.0e11, 1.0e11);
        assert!(
            manager
                .pending_keys()
                .all(|&(cx, cz)| cx >= MAX_CHUNK_COORD - 1 && cz >= MAX_CHUNK_COORD - 1)
        );
    }
}
