// src/services/build_worker.rs
//
// Build Worker - background consumer of build requests
//
// CRITICAL RULES:
// - At most one build runs at a time per playout; requests for the same
//   playout serialize on a per-playout lock
// - A build mutates nothing until its diff is applied in one call
// - Outcomes surface as domain events, success and failure alike

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::playout::BuildResult;
use crate::error::{AppError, AppResult};
use crate::events::types::{PlayoutBuildFailed, PlayoutBuilt};
use crate::events::EventBus;
use crate::repositories::playout_repository::PlayoutRepository;
use crate::services::filler_builder::FillerBuilder;
use crate::services::playout_builder::PlayoutBuilder;

/// One unit of work for the worker queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildRequest {
    pub playout_id: Uuid,
}

pub struct BuildWorker {
    playout_repo: Arc<dyn PlayoutRepository>,
    builder: PlayoutBuilder,
    filler: FillerBuilder,
    event_bus: Arc<EventBus>,
    locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl BuildWorker {
    pub fn new(
        playout_repo: Arc<dyn PlayoutRepository>,
        builder: PlayoutBuilder,
        filler: FillerBuilder,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            playout_repo,
            builder,
            filler,
            event_bus,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Consume requests until the channel closes or the token fires.
    pub fn spawn(
        self: Arc<Self>,
        mut requests: mpsc::Receiver<BuildRequest>,
        cancellation: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancellation.cancelled() => break,
                    request = requests.recv() => match request {
                        Some(request) => self.process(request, &cancellation).await,
                        None => break,
                    },
                }
            }
            log::debug!("build worker stopped");
        })
    }

    /// Run one request under the playout's lock and report the outcome.
    pub async fn process(&self, request: BuildRequest, cancellation: &CancellationToken) {
        let lock = self.lock_for(request.playout_id);
        let _guard = lock.lock().await;

        match self.build_playout(request.playout_id, Utc::now(), cancellation) {
            Ok(result) => {
                self.event_bus.emit(PlayoutBuilt::new(
                    request.playout_id,
                    result.added_items.len(),
                    result.item_ids_to_remove.len(),
                ));
            }
            Err(e) => {
                log::error!("build failed for playout {}: {}", request.playout_id, e);
                if matches!(e, AppError::PlayoutNotFound) {
                    // a playout that no longer exists gets no more requests;
                    // reclaim its lock entry
                    self.locks.lock().unwrap().remove(&request.playout_id);
                }
                self.event_bus
                    .emit(PlayoutBuildFailed::new(request.playout_id, e.to_string()));
            }
        }
    }

    /// Load, build, fill, apply. Nothing persists unless every step worked.
    pub fn build_playout(
        &self,
        playout_id: Uuid,
        now: DateTime<Utc>,
        cancellation: &CancellationToken,
    ) -> AppResult<BuildResult> {
        let reference = self
            .playout_repo
            .load(playout_id)?
            .ok_or(AppError::PlayoutNotFound)?;

        let result = self.builder.build(now, &reference, cancellation)?;
        let result = self.filler.build(&reference, result)?;

        self.playout_repo.apply(playout_id, &result)?;
        Ok(result)
    }

    fn lock_for(&self, playout_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        Arc::clone(locks.entry(playout_id).or_default())
    }

    #[cfg(test)]
    pub(crate) fn lock_count(&self) -> usize {
        self.locks.lock().unwrap().len()
    }
}
