use std::sync::Arc;

use crate::{
    config::Config,
    error::ConfigError,
    events::Bus,
    subscribers::Subscribe,
    tasks::SystemSpec,
};

use super::{simulation::Simulation, state::Session};

/// Builder for constructing a [`Simulation`].
pub struct SimulationBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SimulationBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers, replacing any added before.
    ///
    /// Subscribers receive simulation events through dedicated workers with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one event subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Validates `spec` and builds the simulation.
    ///
    /// Nothing is spawned until [`Simulation::run`].
    pub fn build(self, spec: &SystemSpec) -> Result<Simulation, ConfigError> {
        let session = Arc::new(Session::new(spec, &self.cfg)?);
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        Ok(Simulation::new_internal(
            self.cfg,
            bus,
            session,
            self.subscribers,
        ))
    }
}
