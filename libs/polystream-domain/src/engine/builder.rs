use std::sync::Arc;

use super::batch::FlushBatch;
use super::config::ReceiverConfig;
use super::debounced::DebouncedBatchEngine;
use super::dispatch::{ErrorFn, FlushDispatcher, FlushFn};
use super::immediate::ImmediateBatchEngine;
use crate::error::{ReceiverError, Result};
use crate::ports::{Scheduler, WindowProjection};
use crate::projection::WindowProjector;

/// Assembles an engine from configuration, projector and callbacks
///
/// The projector defaults to a [`WindowProjector`] over the configured
/// grouping dimensions. Layer keys use the complement of whatever grouping
/// the projector reports.
pub struct EngineBuilder {
    config: ReceiverConfig,
    projector: Option<Arc<dyn WindowProjection>>,
    on_error: Option<ErrorFn>,
}

impl EngineBuilder {
    pub fn new(config: ReceiverConfig) -> Self {
        Self {
            config,
            projector: None,
            on_error: None,
        }
    }

    /// Replace the default projector
    pub fn projector(mut self, projector: impl WindowProjection + 'static) -> Self {
        self.projector = Some(Arc::new(projector));
        self
    }

    /// Receive flush faults; without a hook they are only logged
    pub fn on_error(mut self, on_error: impl Fn(&ReceiverError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(on_error));
        self
    }

    /// # Errors
    ///
    /// Returns `ReceiverError::Config` if the configuration is invalid
    pub fn build_debounced<S, F>(self, scheduler: S, on_flush: F) -> Result<DebouncedBatchEngine<S>>
    where
        S: Scheduler + 'static,
        F: Fn(&FlushBatch) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let (config, dispatcher) = self.into_parts(Arc::new(on_flush))?;
        Ok(DebouncedBatchEngine::new(config, scheduler, dispatcher))
    }

    /// # Errors
    ///
    /// Returns `ReceiverError::Config` if the configuration is invalid
    pub fn build_immediate<F>(self, on_flush: F) -> Result<ImmediateBatchEngine>
    where
        F: Fn(&FlushBatch) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let (_, dispatcher) = self.into_parts(Arc::new(on_flush))?;
        Ok(ImmediateBatchEngine::new(dispatcher))
    }

    fn into_parts(self, on_flush: FlushFn) -> Result<(ReceiverConfig, FlushDispatcher)> {
        self.config.validate()?;

        let projector = self.projector.unwrap_or_else(|| {
            Arc::new(WindowProjector::new(self.config.grouping_dimensions.clone()))
        });
        let dispatcher = FlushDispatcher::new(projector, on_flush, self.on_error);

        Ok((self.config, dispatcher))
    }
}
