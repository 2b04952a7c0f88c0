//! Bounded background queue for CRM sync events

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::crm::{CrmNotifier, CrmSync, CrmSyncEvent};

/// Hands CRM sync events to a single worker task.
///
/// `notify` never waits: when the queue is full or the worker is gone the
/// event is dropped and counted. Delivery failures are logged by the worker
/// and not retried.
#[derive(Debug)]
pub struct CrmSyncDispatcher {
    sender: mpsc::Sender<CrmSyncEvent>,
    dropped: AtomicU64,
}

impl CrmSyncDispatcher {
    /// Start the worker and return the dispatcher feeding it.
    ///
    /// The worker exits once every dispatcher handle has been dropped and the
    /// queue is drained.
    pub fn spawn(sync: Arc<dyn CrmSync>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(sync, receiver));

        info!(capacity = capacity.max(1), "CRM sync worker started");

        (Self::from_sender(sender), worker)
    }

    fn from_sender(sender: mpsc::Sender<CrmSyncEvent>) -> Self {
        Self {
            sender,
            dropped: AtomicU64::new(0),
        }
    }

    /// Number of events discarded because the queue was full or closed
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl CrmNotifier for CrmSyncDispatcher {
    fn notify(&self, event: CrmSyncEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    team_id = %event.team.id,
                    user_id = %event.user.id,
                    "CRM sync queue full, dropping event"
                );
            }
            Err(TrySendError::Closed(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    team_id = %event.team.id,
                    user_id = %event.user.id,
                    "CRM sync worker stopped, dropping event"
                );
            }
        }
    }
}

async fn run_worker(sync: Arc<dyn CrmSync>, mut receiver: mpsc::Receiver<CrmSyncEvent>) {
    while let Some(event) = receiver.recv().await {
        match sync.upsert_team_user(&event).await {
            Ok(()) => debug!(
                team_id = %event.team.id,
                user_id = %event.user.id,
                "CRM team user upserted"
            ),
            Err(e) => warn!(
                team_id = %event.team.id,
                user_id = %event.user.id,
                error = %e,
                "CRM team user upsert failed"
            ),
        }
    }

    info!("CRM sync worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::crm::MockCrmSync;
    use crate::domain::team::{MembershipRole, Team, TeamId, TeamMetadata};
    use crate::domain::user::AuthenticatedUser;
    use crate::domain::DomainError;

    fn event(team_id: i64) -> CrmSyncEvent {
        let team = Team {
            id: TeamId::new(team_id),
            name: "Acme".to_string(),
            slug: None,
            logo: None,
            parent_id: None,
            metadata: TeamMetadata::with_requested_slug("acme"),
            members: vec![],
            created_at: Utc::now(),
        };

        CrmSyncEvent::new(team, AuthenticatedUser::new(7), MembershipRole::Owner)
    }

    #[tokio::test]
    async fn test_events_reach_sync() {
        let mut sync = MockCrmSync::new();
        sync.expect_upsert_team_user()
            .withf(|e| e.team.id == TeamId::new(1) && e.role == MembershipRole::Owner)
            .times(1)
            .returning(|_| Ok(()));

        let (dispatcher, worker) = CrmSyncDispatcher::spawn(Arc::new(sync), 8);
        dispatcher.notify(event(1));

        drop(dispatcher);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_worker() {
        let mut sync = MockCrmSync::new();
        sync.expect_upsert_team_user()
            .times(3)
            .returning(|_| Err(DomainError::internal("CRM unavailable")));

        let (dispatcher, worker) = CrmSyncDispatcher::spawn(Arc::new(sync), 8);
        dispatcher.notify(event(1));
        dispatcher.notify(event(2));
        dispatcher.notify(event(3));

        drop(dispatcher);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_full_queue_drops_event() {
        let (sender, mut receiver) = mpsc::channel(1);
        let dispatcher = CrmSyncDispatcher::from_sender(sender);

        dispatcher.notify(event(1));
        dispatcher.notify(event(2));

        assert_eq!(dispatcher.dropped(), 1);
        assert_eq!(receiver.try_recv().unwrap().team.id, TeamId::new(1));
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_queue_drops_event() {
        let (sender, receiver) = mpsc::channel(4);
        let dispatcher = CrmSyncDispatcher::from_sender(sender);
        drop(receiver);

        dispatcher.notify(event(1));

        assert_eq!(dispatcher.dropped(), 1);
    }

    #[tokio::test]
    async fn test_zero_capacity_is_clamped() {
        let mut sync = MockCrmSync::new();
        sync.expect_upsert_team_user().times(1).returning(|_| Ok(()));

        let (dispatcher, worker) = CrmSyncDispatcher::spawn(Arc::new(sync), 0);
        dispatcher.notify(event(1));

        drop(dispatcher);
        worker.await.unwrap();
    }
}
