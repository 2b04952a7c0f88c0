//! Team creation

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::crm::{CrmNotifier, CrmSyncEvent};
use crate::domain::team::{
    validate_team_name, validate_team_slug, MembershipRole, NewTeam, SlugScope, Team, TeamId,
    TeamMetadata, TeamRepository,
};
use crate::domain::user::AuthenticatedUser;
use crate::domain::DomainError;

/// Message carried by the slug collision error
pub const TEAM_URL_TAKEN: &str = "team_url_taken";

/// Request for creating a new team
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTeamRequest {
    pub slug: String,
    pub name: String,
    pub logo: Option<String>,
}

/// Creates teams on behalf of an authenticated caller.
///
/// Callers inside an organization create child teams of that organization
/// and need an owner or admin membership there. Everyone else creates
/// top-level teams. With billing enabled the slug stays in
/// `metadata.requestedSlug` until a separate billing flow activates it.
pub struct TeamCreationHandler<R: TeamRepository> {
    repository: Arc<R>,
    notifier: Arc<dyn CrmNotifier>,
    billing_enabled: bool,
}

impl<R: TeamRepository> std::fmt::Debug for TeamCreationHandler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamCreationHandler")
            .field("repository", &self.repository)
            .field("billing_enabled", &self.billing_enabled)
            .finish()
    }
}

impl<R: TeamRepository> TeamCreationHandler<R> {
    pub fn new(repository: Arc<R>, notifier: Arc<dyn CrmNotifier>, billing_enabled: bool) -> Self {
        Self {
            repository,
            notifier,
            billing_enabled,
        }
    }

    /// Create a team, or return the caller's pending team for the same slug
    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        request: CreateTeamRequest,
    ) -> Result<Team, DomainError> {
        info!(user_id = %caller.id, slug = %request.slug, "Creating team");

        validate_team_slug(&request.slug).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_team_name(&request.name).map_err(|e| DomainError::validation(e.to_string()))?;

        let parent_id = match caller.organization_id {
            Some(organization_id) => {
                self.authorize_child_team(caller, organization_id).await?;
                Some(organization_id)
            }
            None => None,
        };

        let scope = parent_id.map_or(SlugScope::Global, SlugScope::Children);

        if let Some(existing) = self.repository.find_by_slug(&request.slug, scope).await? {
            debug!(slug = %request.slug, team_id = %existing.id, "Team slug already taken");
            return Err(DomainError::validation(TEAM_URL_TAKEN));
        }

        // Idempotency key is (caller, requested slug). The lookup and the
        // insert below are not atomic: two identical requests racing each
        // other can both get past this point and create two pending teams.
        if let Some(pending) = self
            .repository
            .find_requested_by_member(caller.id, &request.slug)
            .await?
        {
            info!(team_id = %pending.id, slug = %request.slug, "Returning existing team request");
            return Ok(pending);
        }

        let new_team = NewTeam {
            name: request.name,
            slug: (!self.billing_enabled).then(|| request.slug.clone()),
            logo: request.logo,
            parent_id,
            metadata: TeamMetadata::with_requested_slug(request.slug),
            owner_id: caller.id,
        };

        let team = self.repository.create(new_team).await?;
        info!(team_id = %team.id, parent_id = ?team.parent_id, "Team created");

        self.notifier.notify(CrmSyncEvent::new(
            team.clone(),
            caller.clone(),
            MembershipRole::Owner,
        ));

        Ok(team)
    }

    /// Check that the backing store is reachable
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }

    async fn authorize_child_team(
        &self,
        caller: &AuthenticatedUser,
        organization_id: TeamId,
    ) -> Result<(), DomainError> {
        let organization = self
            .repository
            .find_by_id(organization_id)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("Organization '{}' not found", organization_id))
            })?;

        if !organization.permits_child_teams_for(caller.id) {
            warn!(
                user_id = %caller.id,
                organization_id = %organization_id,
                "Caller may not create teams in organization"
            );
            return Err(DomainError::forbidden(format!(
                "User '{}' cannot create teams in organization '{}'",
                caller.id, organization_id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use crate::domain::team::Membership;
    use crate::domain::user::UserId;
    use crate::infrastructure::team::InMemoryTeamRepository;

    const ORG_ID: i64 = 100;

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<CrmSyncEvent>>,
    }

    impl RecordingNotifier {
        fn events(&self) -> Vec<CrmSyncEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl CrmNotifier for RecordingNotifier {
        fn notify(&self, event: CrmSyncEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[derive(Debug)]
    struct FailingRepository;

    #[async_trait]
    impl TeamRepository for FailingRepository {
        async fn find_by_id(&self, _id: TeamId) -> Result<Option<Team>, DomainError> {
            Err(DomainError::storage("connection refused"))
        }

        async fn find_by_slug(
            &self,
            _slug: &str,
            _scope: SlugScope,
        ) -> Result<Option<Team>, DomainError> {
            Ok(None)
        }

        async fn find_requested_by_member(
            &self,
            _user_id: UserId,
            _slug: &str,
        ) -> Result<Option<Team>, DomainError> {
            Ok(None)
        }

        async fn create(&self, team: NewTeam) -> Result<Team, DomainError> {
            Err(DomainError::conflict(format!(
                "Team slug '{}' already exists",
                team.slug.unwrap_or_default()
            )))
        }

        async fn ping(&self) -> Result<(), DomainError> {
            Err(DomainError::storage("connection refused"))
        }
    }

    struct Fixture {
        repository: Arc<InMemoryTeamRepository>,
        notifier: Arc<RecordingNotifier>,
        handler: TeamCreationHandler<InMemoryTeamRepository>,
    }

    fn fixture(teams: Vec<Team>, billing_enabled: bool) -> Fixture {
        let repository = Arc::new(InMemoryTeamRepository::with_teams(teams));
        let notifier = Arc::new(RecordingNotifier::default());
        let handler =
            TeamCreationHandler::new(repository.clone(), notifier.clone(), billing_enabled);

        Fixture {
            repository,
            notifier,
            handler,
        }
    }

    fn team(id: i64, slug: Option<&str>, parent: Option<i64>, members: Vec<Membership>) -> Team {
        Team {
            id: TeamId::new(id),
            name: format!("Team {}", id),
            slug: slug.map(String::from),
            logo: None,
            parent_id: parent.map(TeamId::new),
            metadata: TeamMetadata::default(),
            members,
            created_at: Utc::now(),
        }
    }

    fn organization(members: &[(i64, MembershipRole)]) -> Team {
        let members = members
            .iter()
            .map(|(user, role)| Membership::new(UserId::new(*user), TeamId::new(ORG_ID), *role, true))
            .collect();

        team(ORG_ID, Some("org"), None, members)
    }

    fn request(slug: &str, name: &str) -> CreateTeamRequest {
        CreateTeamRequest {
            slug: slug.to_string(),
            name: name.to_string(),
            logo: None,
        }
    }

    #[tokio::test]
    async fn test_create_top_level_team() {
        let fx = fixture(vec![], true);
        let caller = AuthenticatedUser::new(7);

        let team = fx.handler.create(&caller, request("acme", "Acme")).await.unwrap();

        assert_eq!(team.name, "Acme");
        assert_eq!(team.requested_slug(), Some("acme"));
        assert!(team.parent_id.is_none());
        assert_eq!(
            team.members,
            vec![Membership::new(UserId::new(7), team.id, MembershipRole::Owner, true)]
        );
        assert_eq!(fx.repository.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_billing_enabled_withholds_slug() {
        let fx = fixture(vec![], true);

        let team = fx
            .handler
            .create(&AuthenticatedUser::new(7), request("acme", "Acme"))
            .await
            .unwrap();

        assert!(team.slug.is_none());
        assert_eq!(team.metadata.requested_slug.as_deref(), Some("acme"));
    }

    #[tokio::test]
    async fn test_billing_disabled_sets_slug() {
        let fx = fixture(vec![], false);

        let team = fx
            .handler
            .create(&AuthenticatedUser::new(7), request("acme", "Acme"))
            .await
            .unwrap();

        assert_eq!(team.slug.as_deref(), Some("acme"));
        assert_eq!(team.metadata.requested_slug.as_deref(), Some("acme"));
    }

    #[tokio::test]
    async fn test_logo_is_stored() {
        let fx = fixture(vec![], true);
        let mut req = request("acme", "Acme");
        req.logo = Some("https://cdn.example.com/acme.png".to_string());

        let team = fx.handler.create(&AuthenticatedUser::new(7), req).await.unwrap();

        assert_eq!(team.logo.as_deref(), Some("https://cdn.example.com/acme.png"));
    }

    #[tokio::test]
    async fn test_top_level_slug_collision() {
        let fx = fixture(vec![team(1, Some("acme"), None, vec![])], true);

        let result = fx
            .handler
            .create(&AuthenticatedUser::new(7), request("acme", "Acme"))
            .await;

        match result {
            Err(DomainError::Validation { message }) => assert_eq!(message, TEAM_URL_TAKEN),
            other => panic!("expected slug collision, got {:?}", other),
        }
        assert_eq!(fx.repository.len().unwrap(), 1);
        assert!(fx.notifier.events().is_empty());
    }

    #[tokio::test]
    async fn test_top_level_collision_includes_nested_teams() {
        let fx = fixture(vec![team(1, Some("sales"), Some(ORG_ID), vec![])], true);

        let result = fx
            .handler
            .create(&AuthenticatedUser::new(7), request("sales", "Sales"))
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_organization_not_found() {
        let fx = fixture(vec![], true);
        let caller = AuthenticatedUser::new(7).with_organization(ORG_ID);

        let result = fx.handler.create(&caller, request("sales", "Sales")).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
        assert!(fx.repository.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_plain_member_is_forbidden() {
        let org = organization(&[(7, MembershipRole::Member), (8, MembershipRole::Owner)]);
        let fx = fixture(vec![org], true);
        let caller = AuthenticatedUser::new(7).with_organization(ORG_ID);

        let result = fx.handler.create(&caller, request("sales", "Sales")).await;

        assert!(matches!(result, Err(DomainError::Forbidden { .. })));
        assert_eq!(fx.repository.len().unwrap(), 1);
        assert!(fx.notifier.events().is_empty());
    }

    #[tokio::test]
    async fn test_non_member_of_organization_is_forbidden() {
        let org = organization(&[(8, MembershipRole::Owner)]);
        let fx = fixture(vec![org], true);
        let caller = AuthenticatedUser::new(7).with_organization(ORG_ID);

        let result = fx.handler.create(&caller, request("sales", "Sales")).await;

        assert!(matches!(result, Err(DomainError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_organization_owner_creates_child_team() {
        let org = organization(&[(7, MembershipRole::Owner)]);
        let fx = fixture(vec![org], false);
        let caller = AuthenticatedUser::new(7).with_organization(ORG_ID);

        let team = fx.handler.create(&caller, request("sales", "Sales")).await.unwrap();

        assert_eq!(team.parent_id, Some(TeamId::new(ORG_ID)));
        assert_eq!(team.slug.as_deref(), Some("sales"));
        assert_eq!(fx.repository.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_any_admin_membership_authorizes() {
        let org = organization(&[(7, MembershipRole::Member), (9, MembershipRole::Admin)]);
        let fx = fixture(vec![org], true);
        let caller = AuthenticatedUser::new(7).with_organization(ORG_ID);

        let team = fx.handler.create(&caller, request("sales", "Sales")).await.unwrap();

        assert_eq!(team.parent_id, Some(TeamId::new(ORG_ID)));
    }

    #[tokio::test]
    async fn test_child_collision_only_checks_siblings() {
        let org = organization(&[(7, MembershipRole::Owner)]);
        let unrelated = team(1, Some("sales"), None, vec![]);
        let fx = fixture(vec![org, unrelated], false);
        let caller = AuthenticatedUser::new(7).with_organization(ORG_ID);

        let team = fx.handler.create(&caller, request("sales", "Sales")).await.unwrap();

        assert_eq!(team.slug.as_deref(), Some("sales"));
        assert_eq!(fx.repository.len().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_child_collision_with_sibling() {
        let org = organization(&[(7, MembershipRole::Owner)]);
        let sibling = team(1, Some("sales"), Some(ORG_ID), vec![]);
        let fx = fixture(vec![org, sibling], false);
        let caller = AuthenticatedUser::new(7).with_organization(ORG_ID);

        let result = fx.handler.create(&caller, request("sales", "Sales")).await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert_eq!(fx.repository.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_repeated_request_returns_pending_team() {
        let fx = fixture(vec![], true);
        let caller = AuthenticatedUser::new(7);

        let first = fx.handler.create(&caller, request("acme", "Acme")).await.unwrap();
        let second = fx
            .handler
            .create(&caller, request("acme", "Acme Renamed"))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(second.name, "Acme");
        assert_eq!(fx.repository.len().unwrap(), 1);
        assert_eq!(fx.notifier.events().len(), 1);
    }

    #[tokio::test]
    async fn test_other_user_same_requested_slug_creates_new_team() {
        let fx = fixture(vec![], true);

        let first = fx
            .handler
            .create(&AuthenticatedUser::new(7), request("acme", "Acme"))
            .await
            .unwrap();
        let second = fx
            .handler
            .create(&AuthenticatedUser::new(8), request("acme", "Acme"))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(fx.repository.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_notifies_crm_with_owner() {
        let fx = fixture(vec![], true);
        let caller = AuthenticatedUser::new(7).with_email("jane@example.com");

        let team = fx.handler.create(&caller, request("acme", "Acme")).await.unwrap();

        let events = fx.notifier.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].team, team);
        assert_eq!(events[0].user, caller);
        assert_eq!(events[0].role, MembershipRole::Owner);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_storage() {
        let fx = fixture(vec![], true);
        let caller = AuthenticatedUser::new(7);

        let bad_slug = fx.handler.create(&caller, request("Not A Slug", "Acme")).await;
        assert!(matches!(bad_slug, Err(DomainError::Validation { .. })));

        let bad_name = fx.handler.create(&caller, request("acme", "")).await;
        assert!(matches!(bad_name, Err(DomainError::Validation { .. })));

        assert!(fx.repository.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_long_name_and_slug_accepted() {
        let fx = fixture(vec![], false);
        let caller = AuthenticatedUser::new(7);

        let long_name = fx
            .handler
            .create(&caller, request("acme", &"A".repeat(101)))
            .await
            .unwrap();
        assert_eq!(long_name.name.chars().count(), 101);

        let long_slug = fx
            .handler
            .create(&caller, request(&"a".repeat(101), "Acme"))
            .await
            .unwrap();
        assert_eq!(long_slug.slug, Some("a".repeat(101)));
        assert_eq!(fx.repository.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_storage_errors_propagate() {
        let notifier = Arc::new(RecordingNotifier::default());
        let handler = TeamCreationHandler::new(Arc::new(FailingRepository), notifier.clone(), false);

        let org_caller = AuthenticatedUser::new(7).with_organization(ORG_ID);
        let lookup = handler.create(&org_caller, request("acme", "Acme")).await;
        assert!(matches!(lookup, Err(DomainError::Storage { .. })));

        let write = handler
            .create(&AuthenticatedUser::new(7), request("acme", "Acme"))
            .await;
        assert!(matches!(write, Err(DomainError::Conflict { .. })));

        assert!(notifier.events().is_empty());
        assert!(handler.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_scenario_user_seven_creates_acme() {
        let fx = fixture(vec![], true);
        let caller = AuthenticatedUser::new(7);

        let team = fx
            .handler
            .create(
                &caller,
                CreateTeamRequest {
                    slug: "acme".to_string(),
                    name: "Acme".to_string(),
                    logo: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(team.members.len(), 1);
        assert_eq!(team.members[0].user_id, UserId::new(7));
        assert_eq!(team.members[0].role, MembershipRole::Owner);
        assert!(team.members[0].accepted);
        assert_eq!(team.metadata.requested_slug.as_deref(), Some("acme"));
    }
}
