use crate::shared::entity::ID;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminRole {
    SuperAdmin,
    Manager,
    Instructor,
}

/// Claims of an admin session token.
///
/// Admin sessions are HS256 json web tokens signed with the servers
/// session secret. A `tenant_id` of `None` marks a platform admin, which is
/// only valid together with `AdminRole::SuperAdmin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminClaims {
    /// The admin user id
    pub sub: ID,
    pub tenant_id: Option<ID>,
    pub role: AdminRole,
    /// Expiration as seconds since the unix epoch
    pub exp: i64,
}

impl AdminClaims {
    pub fn is_platform_admin(&self) -> bool {
        self.tenant_id.is_none() && self.role == AdminRole::SuperAdmin
    }

    pub fn encode(&self, secret: &str) -> anyhow::Result<String> {
        let token = encode(
            &Header::new(Algorithm::HS256),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;
        Ok(token)
    }

    pub fn decode(token: &str, secret: &str) -> anyhow::Result<Self> {
        let data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;
        let claims = data.claims;
        if claims.tenant_id.is_none() && claims.role != AdminRole::SuperAdmin {
            return Err(anyhow::Error::msg(
                "Only super admins can act outside of a tenant",
            ));
        }
        Ok(claims)
    }
}
