use db::{ConnectionTrait, DatabaseError};
use thiserror::Error;
use utils_jwt::TokenSigner;

use db::models::{team_member::TeamMember, user::User};

use super::password;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error("invalid credentials")]
    Unauthorized,
    #[error("insufficient permissions")]
    Forbidden,
}

/// Resolves bearer tokens to users and answers membership questions.
///
/// Identity is always passed explicitly to the check you want; nothing here
/// reads ambient state.
#[derive(Clone)]
pub struct AuthService {
    signer: TokenSigner,
}

impl AuthService {
    pub fn new(signer: TokenSigner) -> Self {
        Self { signer }
    }

    /// Verifies the credentials and issues a token whose subject is the
    /// user's email. Unknown emails and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn login<C: ConnectionTrait>(
        &self,
        db: &C,
        email: &str,
        password_input: &str,
    ) -> Result<String, AuthError> {
        let credentials = User::find_credentials_by_email(db, email)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        if !password::verify_password(password_input, &credentials.password_hash) {
            return Err(AuthError::Unauthorized);
        }
        self.signer.sign(email).map_err(|_| AuthError::Unauthorized)
    }

    /// Token -> active user. Deactivated accounts keep their old tokens but
    /// those tokens stop resolving.
    pub async fn resolve_identity<C: ConnectionTrait>(
        &self,
        db: &C,
        token: &str,
    ) -> Result<User, AuthError> {
        let email = self
            .signer
            .verify(token)
            .map_err(|_| AuthError::Unauthorized)?;
        let user = User::find_by_email(db, &email)
            .await?
            .ok_or(AuthError::Unauthorized)?;
        if !user.is_active {
            return Err(AuthError::Unauthorized);
        }
        Ok(user)
    }

    /// The user's active membership, scoped to `project_id` when given.
    /// Forbidden when no such membership exists.
    pub async fn require_member<C: ConnectionTrait>(
        &self,
        db: &C,
        user: &User,
        project_id: Option<i64>,
    ) -> Result<TeamMember, AuthError> {
        let member = TeamMember::find_first_by_user_id(db, user.id, project_id)
            .await?
            .ok_or(AuthError::Forbidden)?;
        if !member.is_active {
            return Err(AuthError::Forbidden);
        }
        Ok(member)
    }

    /// Like [`require_member`](Self::require_member), additionally requiring
    /// the manager flag on the membership.
    pub async fn require_manager<C: ConnectionTrait>(
        &self,
        db: &C,
        user: &User,
        project_id: Option<i64>,
    ) -> Result<TeamMember, AuthError> {
        let member = self.require_member(db, user, project_id).await?;
        if !member.is_manager {
            return Err(AuthError::Forbidden);
        }
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use db::models::{
        team_member::CreateTeamMember,
        user::{CreateUser, User},
    };
    use test_support::test_db;

    use super::*;
    use crate::services::password::hash_password;

    fn service() -> AuthService {
        AuthService::new(TokenSigner::new(b"test-secret", Duration::minutes(5)))
    }

    async fn seed_user(db: &db::DBService, name: &str, email: &str, active: bool) -> User {
        User::create(
            &db.pool,
            &CreateUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: hash_password("pw").unwrap(),
                is_active: active,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn login_then_resolve_round_trips() {
        let db = test_db().await;
        let auth = service();
        let user = seed_user(&db, "alice", "alice@example.com", true).await;

        let token = auth.login(&db.pool, "alice@example.com", "pw").await.unwrap();
        let resolved = auth.resolve_identity(&db.pool, &token).await.unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_email() {
        let db = test_db().await;
        let auth = service();
        seed_user(&db, "alice", "alice@example.com", true).await;

        let err = auth
            .login(&db.pool, "alice@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));

        let err = auth.login(&db.pool, "ghost@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn deactivated_user_token_stops_resolving() {
        let db = test_db().await;
        let auth = service();
        let user = seed_user(&db, "bob", "bob@example.com", true).await;
        let token = auth.login(&db.pool, "bob@example.com", "pw").await.unwrap();

        User::update(
            &db.pool,
            user.id,
            &db::models::user::UpdateUser {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let err = auth.resolve_identity(&db.pool, &token).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn manager_check_requires_the_flag() {
        let db = test_db().await;
        let auth = service();
        let user = seed_user(&db, "carol", "carol@example.com", true).await;

        TeamMember::create(
            &db.pool,
            &CreateTeamMember {
                user_id: user.id,
                project_id: 1,
                role_id: 1,
                is_manager: false,
                is_active: true,
            },
        )
        .await
        .unwrap();

        assert!(auth.require_member(&db.pool, &user, Some(1)).await.is_ok());
        let err = auth
            .require_manager(&db.pool, &user, Some(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden));

        // No membership at all in project 2.
        let err = auth
            .require_member(&db.pool, &user, Some(2))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden));
    }
}
