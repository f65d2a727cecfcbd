//! Session-related types.
//!
//! Types stored in the session for authentication state. The session itself is
//! issued by the login service that shares the session store.

use serde::{Deserialize, Serialize};

use mercato_core::{StoreId, UserId, UserRole};

/// Session-stored user identity.
///
/// This is the explicit caller context handed to every service operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Account role.
    pub role: UserRole,
    /// Store managed by this user (store admins only).
    pub store_id: Option<StoreId>,
}

impl CurrentUser {
    /// Build the identity of a shopper.
    #[must_use]
    pub const fn customer(id: UserId) -> Self {
        Self {
            id,
            role: UserRole::Customer,
            store_id: None,
        }
    }

    /// Build the identity of a store admin.
    #[must_use]
    pub const fn store_admin(id: UserId, store_id: StoreId) -> Self {
        Self {
            id,
            role: UserRole::Admin,
            store_id: Some(store_id),
        }
    }

    /// The store this user may administer, if any.
    #[must_use]
    pub const fn managed_store(&self) -> Option<StoreId> {
        match self.role {
            UserRole::Admin => self.store_id,
            UserRole::Customer => None,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customers_manage_no_store() {
        let mut user = CurrentUser::customer(UserId::new(1));
        assert_eq!(user.managed_store(), None);

        // A stale store reference on a customer account grants nothing.
        user.store_id = Some(StoreId::new(9));
        assert_eq!(user.managed_store(), None);
    }

    #[test]
    fn test_admins_manage_their_store() {
        let user = CurrentUser::store_admin(UserId::new(2), StoreId::new(4));
        assert_eq!(user.managed_store(), Some(StoreId::new(4)));
    }
}
