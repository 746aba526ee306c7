//! Configuration generations of the server registry
//!
//! Each configuration load builds a fresh [`ServerRegistry`] and publishes it
//! here. Readers take an `Arc` to the current generation for the duration of
//! one request; a replaced generation is dropped once its last reader lets
//! go of it.

use crate::ServerRegistry;
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::info;

/// A published registry together with its generation number
#[derive(Debug)]
pub struct Generation {
    pub number: u64,
    pub registry: Arc<ServerRegistry>,
}

pub struct Generations {
    current: ArcSwap<Generation>,
}

impl Generations {
    /// Start at generation 0 with no servers
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Generation {
                number: 0,
                registry: Arc::new(ServerRegistry::new()),
            }),
        }
    }

    /// Registry of the live generation
    pub fn current(&self) -> Arc<ServerRegistry> {
        self.current.load().registry.clone()
    }

    /// Number of the live generation
    pub fn generation(&self) -> u64 {
        self.current.load().number
    }

    /// Live generation, number and registry read together
    pub fn snapshot(&self) -> Arc<Generation> {
        self.current.load_full()
    }

    /// Replace the live registry and return the new generation number.
    pub fn publish(&self, registry: ServerRegistry) -> u64 {
        let servers = registry.len();
        let registry = registry.freeze();
        let previous = self.current.rcu(|current| Generation {
            number: current.number + 1,
            registry: registry.clone(),
        });
        let generation = previous.number + 1;
        info!(generation, servers, "Published server registry generation");
        generation
    }
}

impl Default for Generations {
    fn default() -> Self {
        Self::new()
    }
}
