//! Role and role-join entities.

use serde::{Deserialize, Serialize};

/// Normalize a role name for storage and comparison.
///
/// Role names are matched case-insensitively everywhere in the system. This
/// is the single normalization point: it is applied when a role is created
/// and at every comparison site, so no caller re-normalizes ad hoc.
pub fn normalize_role_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// A named permission bucket.
///
/// `name` is always stored normalized; `display_name` preserves the casing
/// the role was created with. `delegates_to` names the role whose holders
/// may assign this role to other principals (single hop, no transitivity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegates_to: Option<String>,
}

impl Role {
    /// Create a role with a normalized name and no delegation relation.
    pub fn new(display_name: impl Into<String>, description: Option<String>) -> Self {
        let display_name = display_name.into();
        Self {
            name: normalize_role_name(&display_name),
            display_name,
            description,
            delegates_to: None,
        }
    }

    /// Declare the role whose holders may delegate this role.
    pub fn delegated_by(mut self, grantor: &str) -> Self {
        self.delegates_to = Some(normalize_role_name(grantor));
        self
    }

    /// Case-insensitive name match against another role name.
    pub fn is_named(&self, name: &str) -> bool {
        self.name == normalize_role_name(name)
    }
}

/// The association entity linking a principal to a role it holds.
///
/// The join owns its `Role`; the role name is exposed as a derived accessor
/// rather than a second independently-settable field, so the two can never
/// go out of sync. The join id is stable across role-set reconciliation for
/// roles that remain assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleJoin {
    id: String,
    role: Role,
}

impl RoleJoin {
    pub fn new(role: Role) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            role,
        }
    }

    /// Stable identity of this join row.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Normalized name of the joined role, derived from the owned role.
    pub fn role_name(&self) -> &str {
        &self.role.name
    }
}
