use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Document;

use super::errors::UserError;
use super::value_objects::{Address, AddressUpdate, NewAddress, Role, UserUpdate};

// ============================================================================
// User Model
// ============================================================================
//
// Accounts, their saved addresses, and issued access tokens. The address
// collection carries a single-default rule: at most one address is flagged
// default at a time. Every mutation of the list funnels through
// enforce_single_default so the rule holds no matter which path touched it.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub addresses: Vec<Address>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            role,
            is_active: true,
            addresses: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Apply a partial account update. Absent fields keep their value.
    pub fn apply_update(&mut self, changes: UserUpdate) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
        if let Some(is_active) = changes.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }

    /// Add an address and return its id. The first address, or one that
    /// asks for it, becomes the default.
    pub fn add_address(&mut self, input: NewAddress) -> Uuid {
        let address_id = Uuid::new_v4();
        let make_default = input.is_default || self.addresses.is_empty();

        self.addresses.push(Address {
            id: address_id,
            kind: input.kind,
            street: input.street,
            city: input.city,
            state: input.state,
            zip_code: input.zip_code,
            country: input.country,
            is_default: false,
        });

        self.enforce_single_default(make_default.then_some(address_id));
        self.updated_at = Utc::now();
        address_id
    }

    /// Apply a partial update to one address. Promoting an address to
    /// default demotes whichever address held the flag before.
    pub fn update_address(
        &mut self,
        address_id: Uuid,
        changes: AddressUpdate,
    ) -> Result<(), UserError> {
        let address = self
            .addresses
            .iter_mut()
            .find(|a| a.id == address_id)
            .ok_or(UserError::AddressNotFound)?;

        if let Some(kind) = changes.kind {
            address.kind = kind;
        }
        if let Some(street) = changes.street {
            address.street = street;
        }
        if let Some(city) = changes.city {
            address.city = city;
        }
        if let Some(state) = changes.state {
            address.state = state;
        }
        if let Some(zip_code) = changes.zip_code {
            address.zip_code = zip_code;
        }
        if let Some(country) = changes.country {
            address.country = country;
        }
        if let Some(is_default) = changes.is_default {
            address.is_default = is_default;
        }

        let promoted = (changes.is_default == Some(true)).then_some(address_id);
        self.enforce_single_default(promoted);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove an address. When the default goes away and others remain,
    /// the first remaining address is promoted.
    pub fn remove_address(&mut self, address_id: Uuid) -> Result<(), UserError> {
        let position = self
            .addresses
            .iter()
            .position(|a| a.id == address_id)
            .ok_or(UserError::AddressNotFound)?;

        let removed = self.addresses.remove(position);
        let promoted = if removed.is_default {
            self.addresses.first().map(|a| a.id)
        } else {
            None
        };

        self.enforce_single_default(promoted);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Restore the single-default rule. `preferred` names the address that
    /// should hold the flag; with no preference the first currently flagged
    /// address keeps it and any extras are cleared.
    fn enforce_single_default(&mut self, preferred: Option<Uuid>) {
        let holder = preferred.or_else(|| {
            self.addresses
                .iter()
                .find(|a| a.is_default)
                .map(|a| a.id)
        });

        if let Some(holder) = holder {
            for address in &mut self.addresses {
                address.is_default = address.id == holder;
            }
        }
    }
}

impl Document for User {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// A bearer token tied to one account. Presented in the Authorization
/// header; issuance itself happens outside this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn issue(user_id: Uuid, token: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            token,
            user_id,
            created_at: Utc::now(),
        }
    }
}

impl Document for AccessToken {
    fn id(&self) -> Uuid {
        self.id
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::value_objects::AddressKind;

    fn create_test_user() -> User {
        User::new(
            "Jane Doe".to_string(),
            "jane@example.com".to_string(),
            Role::Customer,
        )
    }

    fn new_address(street: &str, is_default: bool) -> NewAddress {
        NewAddress {
            kind: AddressKind::Home,
            street: street.to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_code: "62701".to_string(),
            country: "United States".to_string(),
            is_default,
        }
    }

    fn default_count(user: &User) -> usize {
        user.addresses.iter().filter(|a| a.is_default).count()
    }

    #[test]
    fn test_first_address_becomes_default_even_when_not_requested() {
        let mut user = create_test_user();
        let id = user.add_address(new_address("1 Main St", false));

        assert_eq!(default_count(&user), 1);
        assert!(user.addresses[0].is_default);
        assert_eq!(user.addresses[0].id, id);
    }

    #[test]
    fn test_second_address_without_flag_leaves_first_default() {
        let mut user = create_test_user();
        let first = user.add_address(new_address("1 Main St", false));
        user.add_address(new_address("2 Oak Ave", false));

        assert_eq!(default_count(&user), 1);
        let holder = user.addresses.iter().find(|a| a.is_default).unwrap();
        assert_eq!(holder.id, first);
    }

    #[test]
    fn test_second_address_with_flag_takes_over_default() {
        let mut user = create_test_user();
        user.add_address(new_address("1 Main St", false));
        let second = user.add_address(new_address("2 Oak Ave", true));

        assert_eq!(default_count(&user), 1);
        let holder = user.addresses.iter().find(|a| a.is_default).unwrap();
        assert_eq!(holder.id, second);
    }

    #[test]
    fn test_promoting_via_update_demotes_previous_default() {
        let mut user = create_test_user();
        let first = user.add_address(new_address("1 Main St", false));
        let second = user.add_address(new_address("2 Oak Ave", false));

        user.update_address(
            second,
            AddressUpdate {
                is_default: Some(true),
                ..AddressUpdate::default()
            },
        )
        .unwrap();

        assert_eq!(default_count(&user), 1);
        assert!(!user.addresses.iter().find(|a| a.id == first).unwrap().is_default);
        assert!(user.addresses.iter().find(|a| a.id == second).unwrap().is_default);
    }

    #[test]
    fn test_update_address_fields_partially() {
        let mut user = create_test_user();
        let id = user.add_address(new_address("1 Main St", false));

        user.update_address(
            id,
            AddressUpdate {
                kind: Some(AddressKind::Work),
                zip_code: Some("10001".to_string()),
                ..AddressUpdate::default()
            },
        )
        .unwrap();

        let address = &user.addresses[0];
        assert_eq!(address.kind, AddressKind::Work);
        assert_eq!(address.zip_code, "10001");
        assert_eq!(address.street, "1 Main St");
        assert!(address.is_default);
    }

    #[test]
    fn test_update_missing_address_fails() {
        let mut user = create_test_user();
        let result = user.update_address(Uuid::new_v4(), AddressUpdate::default());
        assert!(matches!(result.unwrap_err(), UserError::AddressNotFound));
    }

    #[test]
    fn test_removing_default_promotes_first_remaining() {
        let mut user = create_test_user();
        let first = user.add_address(new_address("1 Main St", false));
        let second = user.add_address(new_address("2 Oak Ave", false));
        user.add_address(new_address("3 Elm Rd", false));

        user.remove_address(first).unwrap();

        assert_eq!(default_count(&user), 1);
        let holder = user.addresses.iter().find(|a| a.is_default).unwrap();
        assert_eq!(holder.id, second);
    }

    #[test]
    fn test_removing_non_default_keeps_default() {
        let mut user = create_test_user();
        let first = user.add_address(new_address("1 Main St", false));
        let second = user.add_address(new_address("2 Oak Ave", false));

        user.remove_address(second).unwrap();

        assert_eq!(user.addresses.len(), 1);
        assert!(user.addresses[0].is_default);
        assert_eq!(user.addresses[0].id, first);
    }

    #[test]
    fn test_removing_last_address_leaves_empty_list() {
        let mut user = create_test_user();
        let id = user.add_address(new_address("1 Main St", false));
        user.remove_address(id).unwrap();
        assert!(user.addresses.is_empty());
    }

    #[test]
    fn test_remove_missing_address_fails() {
        let mut user = create_test_user();
        let result = user.remove_address(Uuid::new_v4());
        assert!(matches!(result.unwrap_err(), UserError::AddressNotFound));
    }

    #[test]
    fn test_never_more_than_one_default_after_mixed_mutations() {
        let mut user = create_test_user();
        let a = user.add_address(new_address("1 Main St", false));
        let b = user.add_address(new_address("2 Oak Ave", true));
        let c = user.add_address(new_address("3 Elm Rd", true));

        user.update_address(
            a,
            AddressUpdate {
                is_default: Some(true),
                ..AddressUpdate::default()
            },
        )
        .unwrap();
        user.remove_address(a).unwrap();
        user.update_address(
            b,
            AddressUpdate {
                is_default: Some(true),
                ..AddressUpdate::default()
            },
        )
        .unwrap();
        user.remove_address(c).unwrap();

        assert_eq!(default_count(&user), 1);
    }

    #[test]
    fn test_demoting_only_default_leaves_none() {
        let mut user = create_test_user();
        let a = user.add_address(new_address("1 Main St", false));
        user.add_address(new_address("2 Oak Ave", false));

        user.update_address(
            a,
            AddressUpdate {
                is_default: Some(false),
                ..AddressUpdate::default()
            },
        )
        .unwrap();

        // Explicit demotion is honored; nothing is silently re-promoted.
        assert_eq!(default_count(&user), 0);
    }

    #[test]
    fn test_apply_update_changes_only_given_fields() {
        let mut user = create_test_user();
        user.apply_update(UserUpdate {
            is_active: Some(false),
            role: Some(Role::Admin),
            ..UserUpdate::default()
        });

        assert!(!user.is_active);
        assert!(user.is_admin());
        assert_eq!(user.name, "Jane Doe");
        assert_eq!(user.email, "jane@example.com");
    }

    #[test]
    fn test_user_wire_format() {
        let mut user = create_test_user();
        user.add_address(new_address("1 Main St", false));

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "customer");
        assert_eq!(json["isActive"], true);
        assert_eq!(json["addresses"][0]["isDefault"], true);
        assert!(json["createdAt"].is_string());
    }
}
