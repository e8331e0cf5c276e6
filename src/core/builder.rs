use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::{
    config::{ConnectConfig, SupervisorConfig},
    connector::Connector,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

use super::supervisor::ConnectionSupervisor;

/// Builder for a [`ConnectionSupervisor`] with optional subscribers.
pub struct SupervisorBuilder<C: Connector> {
    connector: C,
    connect_cfg: ConnectConfig,
    cfg: SupervisorConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl<C: Connector> SupervisorBuilder<C> {
    /// Creates a builder with default [`SupervisorConfig`].
    pub fn new(connector: C, connect_cfg: ConnectConfig) -> Self {
        Self {
            connector,
            connect_cfg,
            cfg: SupervisorConfig::default(),
            subscribers: Vec::new(),
        }
    }

    /// Overrides the runtime settings.
    pub fn with_config(mut self, cfg: SupervisorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets event subscribers (logging, metrics, alerts).
    ///
    /// Each one gets a dedicated worker with a bounded queue.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds the supervisor.
    ///
    /// With subscribers attached this must run inside a tokio runtime: the fan-out
    /// listener and subscriber workers are spawned here.
    pub fn build(self) -> ConnectionSupervisor<C> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let has_subscribers = !self.subscribers.is_empty();
        let subscribers = self.subscribers;

        let sup = ConnectionSupervisor::from_parts(self.connector, self.connect_cfg, self.cfg, bus);
        if has_subscribers {
            let inner = sup.inner();
            let set = SubscriberSet::new(subscribers, inner.bus.clone());
            spawn_listener(inner.bus.clone(), inner.dropped.clone(), set);
        }
        sup
    }
}

/// Forwards bus events to the subscriber set until the supervisor is dropped,
/// then drains what is left and lets the workers finish.
fn spawn_listener(
    bus: Bus,
    dropped: tokio_util::sync::CancellationToken,
    set: SubscriberSet,
) {
    let mut rx = bus.subscribe();
    drop(bus);
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                res = rx.recv() => match res {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = dropped.cancelled() => {
                    while let Ok(ev) = rx.try_recv() {
                        set.emit(&ev);
                    }
                    break;
                }
            }
        }
        set.shutdown().await;
    });
}
