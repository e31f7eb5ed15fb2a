//! Admin gate in front of every view.
//!
//! An [`AdminSession`] can only be obtained from [`guard`] or [`authorize`],
//! and a view controller cannot be built without one. A signed-in user
//! without the `admin` claim is signed out again before anything is fetched.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use riziq_types::Fields;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::view::{Route, ViewKind};
use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uid: String,
    pub email: String,
}

/// Decoded identity token of the signed-in user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdToken {
    pub claims: Fields,
}

impl IdToken {
    pub fn is_admin(&self) -> bool {
        self.claims.get("admin") == Some(&Value::Bool(true))
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<User>;

    async fn id_token(&self, user: &User) -> Result<IdToken, Error>;

    async fn sign_out(&self) -> Result<(), Error>;

    /// Every sign-in and sign-out, as the user now signed in.
    fn auth_changes(&self) -> broadcast::Receiver<Option<User>>;
}

/// Proof that the current user passed the admin check.
pub struct AdminSession {
    user: User,
    identity: Arc<dyn IdentityProvider>,
}

impl AdminSession {
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }

    pub async fn sign_out(&self) -> Result<(), Error> {
        info!(email = %self.user.email, "signing out");
        self.identity.sign_out().await
    }
}

impl fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSession").field("user", &self.user).finish()
    }
}

/// Outcome of the page guard.
#[derive(Debug)]
pub enum Gate {
    /// Nobody is signed in: show the login screen.
    Login,
    /// The user lacks the admin claim and has been signed out.
    Denied,
    Enter { session: AdminSession, view: ViewKind },
}

/// Checks the current user before `requested` is shown.
///
/// An admin asking for the login screen is sent to the landing view.
pub async fn guard(identity: Arc<dyn IdentityProvider>, requested: Route) -> Gate {
    match authorize(identity).await {
        Ok(session) => {
            let view = match requested {
                Route::Login => ViewKind::LANDING,
                Route::View(view) => view,
            };
            Gate::Enter { session, view }
        }
        Err(Error::Unauthenticated) => Gate::Login,
        Err(e) => {
            warn!(error = %e, "admin check failed");
            Gate::Denied
        }
    }
}

/// Produces a session for the current user if they hold the admin claim.
///
/// A user without the claim, or whose token cannot be read, is signed out
/// and [`Error::AuthorizationDenied`] is returned.
pub async fn authorize(identity: Arc<dyn IdentityProvider>) -> Result<AdminSession, Error> {
    let user = identity.current_user().ok_or(Error::Unauthenticated)?;

    let is_admin = match identity.id_token(&user).await {
        Ok(token) => token.is_admin(),
        Err(e) => {
            warn!(email = %user.email, error = %e, "could not read identity token");
            false
        }
    };

    if !is_admin {
        warn!(email = %user.email, "access denied: not an admin");
        identity.sign_out().await?;
        return Err(Error::AuthorizationDenied);
    }

    info!(email = %user.email, "admin verified");
    Ok(AdminSession { user, identity })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryIdentity;
    use serde_json::json;

    fn claims(value: Value) -> Fields {
        match value {
            Value::Object(fields) => fields,
            _ => Fields::new(),
        }
    }

    #[test]
    fn only_a_true_admin_claim_counts() {
        assert!(IdToken { claims: claims(json!({ "admin": true })) }.is_admin());
        assert!(!IdToken { claims: claims(json!({ "admin": "true" })) }.is_admin());
        assert!(!IdToken::default().is_admin());
    }

    #[tokio::test]
    async fn nobody_signed_in_goes_to_login() {
        let identity = Arc::new(MemoryIdentity::new());
        let gate = guard(identity, Route::View(ViewKind::Jobs)).await;
        assert!(matches!(gate, Gate::Login));
    }

    #[tokio::test]
    async fn non_admins_are_signed_out() {
        let identity = Arc::new(MemoryIdentity::new());
        identity.sign_in("u1", "staff@riziq.in", Fields::new());

        let gate = guard(identity.clone(), Route::View(ViewKind::Jobs)).await;
        assert!(matches!(gate, Gate::Denied));
        assert_eq!(identity.current_user(), None);
    }

    #[tokio::test]
    async fn admins_on_login_land_on_applications() {
        let identity = Arc::new(MemoryIdentity::new());
        identity.sign_in("u1", "admin@riziq.in", claims(json!({ "admin": true })));

        match guard(identity, Route::Login).await {
            Gate::Enter { session, view } => {
                assert_eq!(view, ViewKind::Applications);
                assert_eq!(session.user().email, "admin@riziq.in");
            }
            other => panic!("expected to enter, got {other:?}"),
        }
    }
}
