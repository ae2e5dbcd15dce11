use std::sync::Arc;

use crate::aggregator::SourceAggregator;
use crate::cache::RecordStore;
use crate::model::ModelManager;
use crate::pipeline::Enricher;
use crate::vision::ImageVerifier;

/// Shared state handed to every handler.
///
/// Generic over the aggregator and store so tests can wire mocks without
/// touching the routing layer.
pub struct HandlerState<A, R> {
    pub enricher: Arc<Enricher<A, R>>,
    pub store: Arc<R>,
    pub models: Arc<ModelManager>,
    pub verifier: ImageVerifier,
}

impl<A, R> Clone for HandlerState<A, R> {
    fn clone(&self) -> Self {
        Self {
            enricher: self.enricher.clone(),
            store: self.store.clone(),
            models: self.models.clone(),
            verifier: self.verifier.clone(),
        }
    }
}

impl<A, R> HandlerState<A, R>
where
    A: SourceAggregator,
    R: RecordStore,
{
    pub fn new(
        enricher: Arc<Enricher<A, R>>,
        store: Arc<R>,
        models: Arc<ModelManager>,
        verifier: ImageVerifier,
    ) -> Self {
        Self {
            enricher,
            store,
            models,
            verifier,
        }
    }
}
