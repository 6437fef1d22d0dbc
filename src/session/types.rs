use serde::{Deserialize, Serialize};

/// JWT claims carrying the authenticated teacher's identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub teacher_id: i64,
    pub username: String,
    pub role: String,
    pub fullname: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// Identity resolved from a verified token, attached to protected requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeacherIdentity {
    pub id: i64,
    pub username: String,
    pub fullname: String,
    pub role: String,
}

impl From<SessionClaims> for TeacherIdentity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.teacher_id,
            username: claims.username,
            fullname: claims.fullname,
            role: claims.role,
        }
    }
}

/// Request payload for teacher login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response for a successful login
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    pub user: TeacherIdentity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_claims() {
        let claims = SessionClaims {
            teacher_id: 1,
            username: "t1".to_string(),
            role: "teacher".to_string(),
            fullname: "Teacher One".to_string(),
            exp: 1234567890,
            iat: 1234567800,
        };

        let identity = TeacherIdentity::from(claims);
        assert_eq!(identity.id, 1);
        assert_eq!(identity.username, "t1");
        assert_eq!(identity.fullname, "Teacher One");
        assert_eq!(identity.role, "teacher");
    }

    #[test]
    fn test_login_response_serialization() {
        let response = LoginResponse {
            token: "jwt-token-here".to_string(),
            user: TeacherIdentity {
                id: 3,
                username: "t3".to_string(),
                fullname: "Teacher Three".to_string(),
                role: "teacher".to_string(),
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["token"], "jwt-token-here");
        assert_eq!(json["user"]["id"], 3);
        assert_eq!(json["user"]["role"], "teacher");
        assert!(json["user"].get("password_hash").is_none());
    }
}
