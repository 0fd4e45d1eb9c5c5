//! Participant roles and per-role data storage.
//!
//! ## Role
//!
//! A game always has exactly two roles: `A` (the initializer, who hosts the
//! channel and deals) and `B` (the joiner). Roles are fixed once assigned.
//!
//! ## RoleMap
//!
//! Two-slot storage indexed by `Role`. Serializes as `{"a": .., "b": ..}`,
//! which is the shape every per-role field of the game state uses on the wire.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two fixed participant slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Initializer / host.
    A,
    /// Joiner / guest.
    B,
}

impl Role {
    /// Role for a participant given whether they host the channel.
    #[must_use]
    pub const fn from_host(is_host: bool) -> Self {
        if is_host {
            Role::A
        } else {
            Role::B
        }
    }

    /// The other role.
    #[must_use]
    pub const fn partner(self) -> Self {
        match self {
            Role::A => Role::B,
            Role::B => Role::A,
        }
    }

    /// Whether this role is the initializer.
    #[must_use]
    pub const fn is_initializer(self) -> bool {
        matches!(self, Role::A)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::A => write!(f, "a"),
            Role::B => write!(f, "b"),
        }
    }
}

/// Per-role data storage.
///
/// ## Example
///
/// ```
/// use card_duel::core::{Role, RoleMap};
///
/// let mut picks: RoleMap<Option<u32>> = RoleMap::default();
/// picks[Role::A] = Some(7);
///
/// assert_eq!(picks[Role::A], Some(7));
/// assert_eq!(picks[Role::B], None);
/// assert!(picks.pair().is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleMap<T> {
    pub a: T,
    pub b: T,
}

impl<T> RoleMap<T> {
    /// Create a map from explicit values.
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    /// Get a reference to a role's data.
    #[must_use]
    pub fn get(&self, role: Role) -> &T {
        match role {
            Role::A => &self.a,
            Role::B => &self.b,
        }
    }

    /// Get a mutable reference to a role's data.
    pub fn get_mut(&mut self, role: Role) -> &mut T {
        match role {
            Role::A => &mut self.a,
            Role::B => &mut self.b,
        }
    }
}

impl<T> RoleMap<Option<T>> {
    /// Both values, if both are present.
    #[must_use]
    pub fn pair(&self) -> Option<(&T, &T)> {
        Some((self.a.as_ref()?, self.b.as_ref()?))
    }

    /// Reset both slots to `None`.
    pub fn clear(&mut self) {
        self.a = None;
        self.b = None;
    }
}

impl<T> Index<Role> for RoleMap<T> {
    type Output = T;

    fn index(&self, role: Role) -> &Self::Output {
        self.get(role)
    }
}

impl<T> IndexMut<Role> for RoleMap<T> {
    fn index_mut(&mut self, role: Role) -> &mut Self::Output {
        self.get_mut(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_basics() {
        assert_eq!(Role::from_host(true), Role::A);
        assert_eq!(Role::from_host(false), Role::B);
        assert_eq!(Role::A.partner(), Role::B);
        assert_eq!(Role::B.partner(), Role::A);
        assert!(Role::A.is_initializer());
        assert!(!Role::B.is_initializer());
        assert_eq!(format!("{}", Role::B), "b");
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::A).unwrap(), "\"a\"");
        let role: Role = serde_json::from_str("\"b\"").unwrap();
        assert_eq!(role, Role::B);
    }

    #[test]
    fn test_role_map_index() {
        let mut map = RoleMap::new(1, 2);
        assert_eq!(map[Role::A], 1);
        assert_eq!(map[Role::B], 2);

        map[Role::B] = 20;
        assert_eq!(map.b, 20);
    }

    #[test]
    fn test_option_map_helpers() {
        let mut map: RoleMap<Option<u32>> = RoleMap::default();
        assert!(map.pair().is_none());

        map[Role::A] = Some(3);
        map[Role::B] = Some(4);
        assert_eq!(map.pair(), Some((&3, &4)));

        map.clear();
        assert_eq!(map, RoleMap::default());
    }

    #[test]
    fn test_role_map_serialization_shape() {
        let map: RoleMap<Option<u32>> = RoleMap::new(Some(7), None);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"a":7,"b":null}"#);

        let back: RoleMap<Option<u32>> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
