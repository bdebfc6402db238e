//! Dispatch roles as issued by the upstream authentication layer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Developer,
    Admin,
    Executive,
    Officer,
    RadioCenter,
    Driver,
    Community,
}

impl Role {
    /// Case-insensitive parse of the role strings the dispatch backend uses
    /// (`DEVELOPER`, `admin`, `radio_center`, ...).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEVELOPER" => Some(Role::Developer),
            "ADMIN" => Some(Role::Admin),
            "EXECUTIVE" => Some(Role::Executive),
            "OFFICER" => Some(Role::Officer),
            "RADIO_CENTER" => Some(Role::RadioCenter),
            "DRIVER" => Some(Role::Driver),
            "COMMUNITY" => Some(Role::Community),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Developer => "DEVELOPER",
            Role::Admin => "admin",
            Role::Executive => "EXECUTIVE",
            Role::Officer => "OFFICER",
            Role::RadioCenter => "radio_center",
            Role::Driver => "driver",
            Role::Community => "community",
        }
    }

    /// May read the audit log and run verification.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Developer | Role::Admin | Role::Executive)
    }

    /// May rebuild the chain.
    pub fn is_most_privileged(&self) -> bool {
        matches!(self, Role::Developer)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Role::parse("developer"), Some(Role::Developer));
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("Radio_Center"), Some(Role::RadioCenter));
        assert_eq!(Role::parse(" driver "), Some(Role::Driver));
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn test_privilege_levels() {
        assert!(Role::Developer.is_elevated());
        assert!(Role::Developer.is_most_privileged());
        assert!(Role::Admin.is_elevated());
        assert!(!Role::Admin.is_most_privileged());
        assert!(Role::Executive.is_elevated());
        assert!(!Role::Executive.is_most_privileged());
        assert!(!Role::Officer.is_elevated());
    }

    #[test]
    fn test_round_trip_names() {
        for role in [
            Role::Developer,
            Role::Admin,
            Role::Executive,
            Role::Officer,
            Role::RadioCenter,
            Role::Driver,
            Role::Community,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}
