use serde::Serialize;
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::OwnedEntity;
use crate::database::{OwnerRepository, Repository};
use crate::services::error::{StaffingError, StaffingResult};

/// The tenant on whose behalf an operation runs. Every core operation takes
/// one explicitly; nothing reads ambient request state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caller {
    pub owner_id: Uuid,
    pub email: String,
}

/// Turn the authentication collaborator's answer into a tenant identity
pub async fn resolve_caller(
    owners: &dyn OwnerRepository,
    principal: Option<&Principal>,
) -> StaffingResult<Caller> {
    let principal = principal.ok_or(StaffingError::Unauthenticated)?;
    let owner = owners
        .find_by_email(&principal.email)
        .await?
        .ok_or_else(|| StaffingError::AccountNotFound(principal.email.clone()))?;

    Ok(Caller {
        owner_id: owner.id,
        email: owner.email,
    })
}

/// Pure tenancy check. Cross-tenant access is `Forbidden`, never `NotFound`.
pub fn authorize<T: OwnedEntity>(caller: &Caller, entity: &T) -> StaffingResult<()> {
    if entity.owner_id() == caller.owner_id {
        Ok(())
    } else {
        tracing::warn!(
            "Owner {} denied access to {} {}",
            caller.owner_id,
            T::KIND,
            entity.id()
        );
        Err(StaffingError::Forbidden {
            kind: T::KIND,
            id: entity.id(),
        })
    }
}

/// Fetch by id, then authorize
pub async fn load_owned<T: OwnedEntity>(
    repo: &dyn Repository<T>,
    caller: &Caller,
    id: Uuid,
) -> StaffingResult<T> {
    let entity = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| StaffingError::not_found::<T>(id))?;
    authorize(caller, &entity)?;
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Owner, Subject};
    use crate::database::MemoryStore;

    fn caller(owner_id: Uuid) -> Caller {
        Caller {
            owner_id,
            email: "owner@example.com".to_string(),
        }
    }

    #[test]
    fn authorize_accepts_own_and_rejects_foreign_entities() {
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let subject = Subject::new(alice, "History", 4);

        assert!(authorize(&caller(alice), &subject).is_ok());
        let err = authorize(&caller(bob), &subject).unwrap_err();
        assert!(matches!(err, StaffingError::Forbidden { kind: "subject", id } if id == subject.id));
    }

    #[tokio::test]
    async fn resolve_caller_distinguishes_missing_principal_from_missing_account() {
        let store = MemoryStore::new();
        let owner = Owner::new("Ana", "ana@example.com", "digest".to_string());
        OwnerRepository::save(&store, owner.clone()).await.unwrap();

        let err = resolve_caller(&store, None).await.unwrap_err();
        assert!(matches!(err, StaffingError::Unauthenticated));

        let stranger = Principal { email: "nobody@example.com".to_string() };
        let err = resolve_caller(&store, Some(&stranger)).await.unwrap_err();
        assert!(matches!(err, StaffingError::AccountNotFound(email) if email == "nobody@example.com"));

        let known = Principal { email: "ana@example.com".to_string() };
        let resolved = resolve_caller(&store, Some(&known)).await.unwrap();
        assert_eq!(resolved.owner_id, owner.id);
    }

    #[tokio::test]
    async fn load_owned_reports_absent_as_not_found() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        let err = load_owned::<Subject>(&store, &caller(Uuid::new_v4()), id)
            .await
            .unwrap_err();
        assert!(matches!(err, StaffingError::NotFound { kind: "subject", .. }));
    }
}
