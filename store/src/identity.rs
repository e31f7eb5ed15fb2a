//! User directory with custom claims, and a sign-in session over it.

use std::sync::RwLock;

use async_trait::async_trait;
use riziq_console::{IdToken, IdentityProvider, User};
use riziq_types::Fields;
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use crate::db::DbPool;
use crate::Error;

const CHANGE_CAPACITY: usize = 16;

/// Registered users and the claims attached to them.
#[derive(Clone)]
pub struct SqliteDirectory {
    pool: DbPool,
}

impl SqliteDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, email: &str) -> Result<User, Error> {
        let uid = Uuid::new_v4().simple().to_string();
        sqlx::query("INSERT INTO users (uid, email) VALUES (?, ?)")
            .bind(&uid)
            .bind(email)
            .execute(&self.pool)
            .await?;

        info!(%email, %uid, "user created");
        Ok(User {
            uid,
            email: email.to_string(),
        })
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<User, Error> {
        let row = sqlx::query_as::<_, (String, String)>("SELECT uid, email FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(uid, email)| User { uid, email })
            .ok_or_else(|| Error::UserNotFound(email.to_string()))
    }

    /// Replaces every custom claim of `uid`.
    pub async fn set_custom_claims(&self, uid: &str, claims: &Fields) -> Result<(), Error> {
        let result = sqlx::query("UPDATE users SET claims = ? WHERE uid = ?")
            .bind(serde_json::to_string(claims)?)
            .bind(uid)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(uid.to_string()));
        }

        info!(%uid, "custom claims set");
        Ok(())
    }

    pub async fn claims(&self, uid: &str) -> Result<Fields, Error> {
        let row = sqlx::query_as::<_, (String,)>("SELECT claims FROM users WHERE uid = ?")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some((claims,)) => Ok(serde_json::from_str(&claims)?),
            None => Err(Error::NotFound(uid.to_string())),
        }
    }
}

/// The signed-in user of one console process.
pub struct DirectoryIdentity {
    directory: SqliteDirectory,
    current: RwLock<Option<User>>,
    changes: broadcast::Sender<Option<User>>,
}

impl DirectoryIdentity {
    pub fn new(directory: SqliteDirectory) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            directory,
            current: RwLock::new(None),
            changes,
        }
    }

    pub async fn sign_in(&self, email: &str) -> Result<User, Error> {
        let user = self.directory.get_user_by_email(email).await?;
        if let Ok(mut current) = self.current.write() {
            *current = Some(user.clone());
        }
        let _ = self.changes.send(Some(user.clone()));

        info!(%email, "signed in");
        Ok(user)
    }
}

#[async_trait]
impl IdentityProvider for DirectoryIdentity {
    fn current_user(&self) -> Option<User> {
        self.current.read().ok()?.clone()
    }

    async fn id_token(&self, user: &User) -> Result<IdToken, riziq_console::Error> {
        let claims = self.directory.claims(&user.uid).await?;
        Ok(IdToken { claims })
    }

    async fn sign_out(&self) -> Result<(), riziq_console::Error> {
        if let Ok(mut current) = self.current.write() {
            *current = None;
        }
        let _ = self.changes.send(None);
        Ok(())
    }

    fn auth_changes(&self) -> broadcast::Receiver<Option<User>> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_pool;
    use serde_json::{json, Value};

    async fn directory() -> SqliteDirectory {
        SqliteDirectory::new(init_pool("sqlite::memory:").await.unwrap())
    }

    #[tokio::test]
    async fn new_users_have_no_claims() {
        let directory = directory().await;
        let user = directory.create_user("staff@riziq.in").await.unwrap();

        assert!(directory.claims(&user.uid).await.unwrap().is_empty());
        assert_eq!(directory.get_user_by_email("staff@riziq.in").await.unwrap(), user);
    }

    #[tokio::test]
    async fn unknown_email_cannot_sign_in() {
        let identity = DirectoryIdentity::new(directory().await);
        assert!(matches!(
            identity.sign_in("ghost@riziq.in").await,
            Err(Error::UserNotFound(_))
        ));
        assert!(identity.current_user().is_none());
    }

    #[tokio::test]
    async fn token_carries_the_admin_claim() {
        let directory = directory().await;
        let user = directory.create_user("admin@riziq.in").await.unwrap();
        let Value::Object(claims) = json!({ "admin": true }) else {
            unreachable!()
        };
        directory.set_custom_claims(&user.uid, &claims).await.unwrap();

        let identity = DirectoryIdentity::new(directory);
        let signed_in = identity.sign_in("admin@riziq.in").await.unwrap();
        assert!(identity.id_token(&signed_in).await.unwrap().is_admin());

        identity.sign_out().await.unwrap();
        assert!(identity.current_user().is_none());
    }
}
