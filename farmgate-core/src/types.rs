//! Core data type definitions

use serde::{Deserialize, Serialize};

/// The three kinds of account that can hold a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Marketplace operator, approves farmers and manages accounts
    Admin,
    /// Seller, must be approved before logging in
    Farmer,
    /// Shopper with a cart
    Buyer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Farmer, Role::Buyer];

    /// Stable lowercase name, as stored in the sessions table
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Farmer => "farmer",
            Role::Buyer => "buyer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "farmer" => Ok(Role::Farmer),
            "buyer" => Ok(Role::Buyer),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// `SameSite` attribute applied to the session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    #[default]
    Strict,
    Lax,
    /// Cross-site; browsers only accept it together with `Secure`
    None,
}

impl std::fmt::Display for SameSitePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SameSitePolicy::Strict => write!(f, "strict"),
            SameSitePolicy::Lax => write!(f, "lax"),
            SameSitePolicy::None => write!(f, "none"),
        }
    }
}
