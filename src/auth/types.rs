use serde::{Deserialize, Serialize};

/// JWT claims minted by the chat front end for each command it relays
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallerClaims {
    pub sub: String, // Platform user id
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

impl CallerClaims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
