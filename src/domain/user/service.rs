use std::sync::Arc;

use uuid::Uuid;

use crate::store::Store;

use super::errors::UserError;
use super::model::User;
use super::value_objects::{Address, AddressUpdate, NewAddress, UserUpdate};

// ============================================================================
// User Service
// ============================================================================
//
// Account administration plus the address book. Address mutations run
// inside the store's guarded update so the single-default bookkeeping and
// the commit happen together.
//
// ============================================================================

#[derive(Clone)]
pub struct UserService {
    store: Arc<Store>,
}

impl UserService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<User, UserError> {
        self.store
            .users
            .get(user_id)
            .await
            .ok_or(UserError::NotFound)
    }

    /// Every account, newest first (administrative).
    pub async fn list(&self) -> Vec<User> {
        let mut users = self.store.users.find(|_| true).await;
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        users
    }

    pub async fn update(&self, user_id: Uuid, changes: UserUpdate) -> Result<User, UserError> {
        self.store
            .users
            .update(user_id, |user| user.apply_update(changes))
            .await
            .ok_or(UserError::NotFound)
    }

    /// Delete an account and revoke any tokens issued to it.
    pub async fn delete(&self, user_id: Uuid) -> Result<(), UserError> {
        self.store
            .users
            .remove(user_id)
            .await
            .ok_or(UserError::NotFound)?;

        let stale = self.store.tokens.find(|t| t.user_id == user_id).await;
        for token in stale {
            self.store.tokens.remove(token.id).await;
        }

        tracing::info!(user_id = %user_id, "User removed");
        Ok(())
    }

    pub async fn addresses(&self, user_id: Uuid) -> Result<Vec<Address>, UserError> {
        Ok(self.get(user_id).await?.addresses)
    }

    pub async fn add_address(
        &self,
        user_id: Uuid,
        input: NewAddress,
    ) -> Result<Address, UserError> {
        let mut address_id = Uuid::nil();
        let user = self
            .store
            .users
            .update(user_id, |user| address_id = user.add_address(input))
            .await
            .ok_or(UserError::NotFound)?;

        user.addresses
            .into_iter()
            .find(|a| a.id == address_id)
            .ok_or(UserError::AddressNotFound)
    }

    pub async fn update_address(
        &self,
        user_id: Uuid,
        address_id: Uuid,
        changes: AddressUpdate,
    ) -> Result<Address, UserError> {
        let user = self
            .store
            .users
            .try_update(user_id, |user| user.update_address(address_id, changes))
            .await
            .ok_or(UserError::NotFound)??;

        user.addresses
            .into_iter()
            .find(|a| a.id == address_id)
            .ok_or(UserError::AddressNotFound)
    }

    pub async fn remove_address(&self, user_id: Uuid, address_id: Uuid) -> Result<(), UserError> {
        self.store
            .users
            .try_update(user_id, |user| user.remove_address(address_id))
            .await
            .ok_or(UserError::NotFound)??;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
