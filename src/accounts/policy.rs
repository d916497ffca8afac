use crate::accounts::repo_types::Account;
use crate::error::ApiError;

/// The five controller operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

/// Access level required for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any caller, authenticated or not.
    Open,
    /// Authenticated caller whose identity matches the target account.
    OwnerOnly,
}

/// Per-action policy table. Reads and registration are open; mutation is
/// restricted to the account owner.
pub fn required_access(action: Action) -> Access {
    match action {
        Action::List | Action::Retrieve | Action::Create => Access::Open,
        Action::Update | Action::Delete => Access::OwnerOnly,
    }
}

/// Evaluate the policy for `action` before touching the store.
///
/// `caller` is the authenticated account, if any; `target` is the account
/// the request addresses, when the action has one.
pub fn authorize(
    action: Action,
    caller: Option<&Account>,
    target: Option<&Account>,
) -> Result<(), ApiError> {
    match required_access(action) {
        Access::Open => Ok(()),
        Access::OwnerOnly => {
            let caller = caller.ok_or(ApiError::Unauthenticated("authentication required"))?;
            match target {
                Some(target) if target.id == caller.id => Ok(()),
                _ => Err(ApiError::Forbidden),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn account(username: &str) -> Account {
        Account {
            id: Uuid::new_v4(),
            email: format!("{username}@x.com"),
            username: username.into(),
            password_hash: "hash".into(),
            first_name: None,
            last_name: None,
            tagline: None,
            is_admin: false,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn reads_and_create_are_open_to_anonymous() {
        for action in [Action::List, Action::Retrieve, Action::Create] {
            assert!(authorize(action, None, None).is_ok());
        }
    }

    #[test]
    fn mutation_requires_authentication() {
        let target = account("alice");
        for action in [Action::Update, Action::Delete] {
            let err = authorize(action, None, Some(&target)).unwrap_err();
            assert!(matches!(err, ApiError::Unauthenticated(_)));
        }
    }

    #[test]
    fn mutation_by_non_owner_is_forbidden_even_when_authenticated() {
        let caller = account("bob");
        let target = account("alice");
        for action in [Action::Update, Action::Delete] {
            let err = authorize(action, Some(&caller), Some(&target)).unwrap_err();
            assert!(matches!(err, ApiError::Forbidden));
        }
    }

    #[test]
    fn owner_may_mutate_their_own_account() {
        let owner = account("alice");
        assert!(authorize(Action::Update, Some(&owner), Some(&owner)).is_ok());
        assert!(authorize(Action::Delete, Some(&owner), Some(&owner)).is_ok());
    }

    #[test]
    fn admin_flag_does_not_bypass_ownership() {
        let mut admin = account("root");
        admin.is_admin = true;
        let target = account("alice");
        assert!(matches!(
            authorize(Action::Delete, Some(&admin), Some(&target)),
            Err(ApiError::Forbidden)
        ));
    }
}
