use super::Removal;

/// Factory for the per-particle payloads managed by an [`AgentManager`].
///
/// `make_agent` is called exactly once when a particle is added, and
/// `release_agent` exactly once when it is removed. Sources that do not need
/// to observe teardown can rely on the default `release_agent`, which simply
/// drops the agent.
pub trait AgentSource<A> {
    /// Create the agent for the particle at `index`
    fn make_agent(&mut self, index: usize) -> A;

    /// Tear down the agent of a removed particle
    fn release_agent(&mut self, index: usize, agent: A) {
        let _ = (index, agent);
    }
}

/// An `AgentManager` attaches an arbitrary payload (force register, neighbor
/// list slot, ...) 1:1 to every particle of a system, and keeps the table
/// consistent through structural changes.
///
/// The table is indexed by particle index, and follows the same swap-remove
/// compaction as [`ParticleSystem`](super::ParticleSystem): applying the
/// [`Removal`] events in the order they are produced keeps agent `i`
/// attached to particle `i` at all times. A lookup for a live particle can
/// therefore never observe a missing or stale agent; an out-of-range lookup
/// means the lifecycle hooks were bypassed and is a programming error.
pub struct AgentManager<A> {
    source: Box<dyn AgentSource<A> + Send + Sync>,
    agents: Vec<A>,
}

impl<A> AgentManager<A> {
    /// Create a new manager using `source` as the agent factory, with agents
    /// created upfront for `size` already-existing particles.
    pub fn new(source: impl AgentSource<A> + Send + Sync + 'static, size: usize) -> AgentManager<A> {
        let mut source = Box::new(source);
        let agents = (0..size).map(|i| source.make_agent(i)).collect();
        AgentManager {
            source: source,
            agents: agents,
        }
    }

    /// Get the number of agents in the table
    pub fn size(&self) -> usize {
        self.agents.len()
    }

    /// Create the agent for a particle that was just added at `index`.
    ///
    /// Particles are always appended, so `index` must be the current size of
    /// the table.
    pub fn on_added(&mut self, index: usize) {
        assert_eq!(
            index, self.agents.len(),
            "agent table out of sync with the particle system"
        );
        let agent = self.source.make_agent(index);
        self.agents.push(agent);
    }

    /// Release the agent of a removed particle, mirroring the swap-remove
    /// compaction of the particle arrays.
    pub fn on_removed(&mut self, removal: Removal) {
        assert!(
            removal.removed < self.agents.len(),
            "agent table out of sync with the particle system"
        );
        let agent = self.agents.swap_remove(removal.removed);
        self.source.release_agent(removal.removed, agent);
    }

    /// Get the agent attached to the particle at `index`
    pub fn get(&self, index: usize) -> &A {
        &self.agents[index]
    }

    /// Get the agent attached to the particle at `index`, mutably
    pub fn get_mut(&mut self, index: usize) -> &mut A {
        &mut self.agents[index]
    }

    /// Get the full agent table
    pub fn agents(&self) -> &[A] {
        &self.agents
    }

    /// Get the full agent table, mutably
    pub fn agents_mut(&mut self) -> &mut [A] {
        &mut self.agents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        created: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
    }

    impl AgentSource<usize> for CountingSource {
        fn make_agent(&mut self, index: usize) -> usize {
            self.created.fetch_add(1, Ordering::Relaxed);
            return index * 100;
        }

        fn release_agent(&mut self, _index: usize, _agent: usize) {
            self.released.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn lifecycle_is_exactly_once() {
        let created = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(AtomicUsize::new(0));
        let source = CountingSource {
            created: created.clone(),
            released: released.clone(),
        };

        let mut manager = AgentManager::new(source, 2);
        assert_eq!(created.load(Ordering::Relaxed), 2);
        assert_eq!(manager.agents(), &[0, 100]);

        manager.on_added(2);
        assert_eq!(created.load(Ordering::Relaxed), 3);
        assert_eq!(*manager.get(2), 200);

        // removal swaps the last agent into the freed slot
        manager.on_removed(Removal { removed: 0, moved: Some(2) });
        assert_eq!(released.load(Ordering::Relaxed), 1);
        assert_eq!(manager.agents(), &[200, 100]);

        manager.on_removed(Removal { removed: 1, moved: None });
        assert_eq!(released.load(Ordering::Relaxed), 2);
        assert_eq!(manager.size(), 1);
    }

    #[test]
    #[should_panic(expected = "agent table out of sync")]
    fn out_of_sync_add() {
        let created = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(AtomicUsize::new(0));
        let mut manager = AgentManager::new(CountingSource {
            created: created,
            released: released,
        }, 1);
        manager.on_added(5);
    }
}
