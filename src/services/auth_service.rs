use crate::config::AdminConfig;
use crate::entities::staff_user_entity as staff;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

const BAD_CREDENTIALS: &str = "Unknown user or wrong password";

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    /// Seed the first staff account from configuration.
    ///
    /// Does nothing once any account exists.
    pub async fn ensure_admin(&self, admin: &AdminConfig) -> AppResult<Option<StaffResponse>> {
        let existing = staff::Entity::find().count(&self.pool).await?;
        if existing > 0 {
            return Ok(None);
        }

        let username = admin.username.trim();
        if username.is_empty() {
            return Err(AppError::ConfigError("admin username is empty".to_string()));
        }
        validate_password(&admin.password)?;
        let password_hash = hash_password(&admin.password)?;

        let model = staff::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Seeded staff account '{}'", model.username);
        Ok(Some(model.into()))
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let user = staff::Entity::find()
            .filter(staff::Column::Username.eq(request.username.trim()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError(BAD_CREDENTIALS.to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            log::warn!("Failed login for staff '{}'", user.username);
            return Err(AppError::AuthError(BAD_CREDENTIALS.to_string()));
        }

        self.issue(user)
    }

    /// Exchange a refresh token for a new token pair
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user = staff::Entity::find_by_id(claims.staff_id()?)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Staff account no longer exists".to_string()))?;

        self.issue(user)
    }

    fn issue(&self, user: staff::Model) -> AppResult<AuthResponse> {
        let access_token = self
            .jwt_service
            .generate_access_token(user.id, &user.username)?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(user.id, &user.username)?;

        Ok(AuthResponse {
            staff: user.into(),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;

    fn service(pool: DatabaseConnection) -> AuthService {
        AuthService::new(pool, JwtService::new("test-secret", 3600, 86400))
    }

    #[tokio::test]
    async fn test_seed_then_login() {
        let auth = service(test_pool().await);
        let admin = AdminConfig::default();

        let seeded = auth.ensure_admin(&admin).await.unwrap();
        assert_eq!(seeded.map(|s| s.username), Some("admin".to_string()));
        // Second start is a no-op.
        assert!(auth.ensure_admin(&admin).await.unwrap().is_none());

        let res = auth
            .login(LoginRequest {
                username: "admin".into(),
                password: admin.password.clone(),
            })
            .await
            .unwrap();
        assert_eq!(res.staff.username, "admin");
        assert_eq!(res.expires_in, 3600);

        let refreshed = auth.refresh_token(&res.refresh_token).await.unwrap();
        assert_eq!(refreshed.staff.id, res.staff.id);

        assert!(auth.refresh_token(&res.access_token).await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let auth = service(test_pool().await);
        auth.ensure_admin(&AdminConfig::default()).await.unwrap();

        let err = auth
            .login(LoginRequest {
                username: "admin".into(),
                password: "Wrong1234".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));
    }
}
