//! Signed-in seller identity.
//!
//! A [`SessionContext`] only exists for a profile that belongs to the authenticated
//! user and is complete enough to sell from. The [`SessionProvider`] publishes the
//! current context (or `None` when signed out) on a watch channel; the application
//! follows it to start and stop the order feed.

use crate::model::{SellerId, SellerProfile};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Profile {profile} does not belong to user {user}")]
    ProfileMismatch { user: SellerId, profile: SellerId },

    #[error("Profile {0} has no shop name")]
    IncompleteProfile(SellerId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    seller_id: SellerId,
    profile: SellerProfile,
}

impl SessionContext {
    pub fn new(user_id: impl Into<SellerId>, profile: SellerProfile) -> Result<Self, SessionError> {
        let user_id = user_id.into();
        if profile.id != user_id {
            return Err(SessionError::ProfileMismatch {
                user: user_id,
                profile: profile.id,
            });
        }
        if !profile.is_complete() {
            return Err(SessionError::IncompleteProfile(user_id));
        }
        Ok(Self {
            seller_id: user_id,
            profile,
        })
    }

    pub fn seller_id(&self) -> &SellerId {
        &self.seller_id
    }

    pub fn profile(&self) -> &SellerProfile {
        &self.profile
    }
}

pub type SessionWatch = watch::Receiver<Option<Arc<SessionContext>>>;

pub struct SessionProvider {
    sender: watch::Sender<Option<Arc<SessionContext>>>,
}

impl Default for SessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    pub fn login(&self, context: SessionContext) -> Arc<SessionContext> {
        let context = Arc::new(context);
        info!(seller_id = %context.seller_id(), "Seller signed in");
        self.sender.send_replace(Some(context.clone()));
        context
    }

    pub fn logout(&self) {
        if self.sender.send_replace(None).is_some() {
            info!("Seller signed out");
        }
    }

    pub fn current(&self) -> Option<Arc<SessionContext>> {
        self.sender.borrow().clone()
    }

    pub fn current_seller_id(&self) -> Option<SellerId> {
        self.sender.borrow().as_ref().map(|ctx| ctx.seller_id().clone())
    }

    pub fn watch(&self) -> SessionWatch {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_must_match_user() {
        let err = SessionContext::new("user_1", SellerProfile::new("user_2", "Chaat Corner")).unwrap_err();
        assert!(matches!(err, SessionError::ProfileMismatch { .. }));
    }

    #[test]
    fn test_profile_must_be_complete() {
        let err = SessionContext::new("user_1", SellerProfile::new("user_1", "  ")).unwrap_err();
        assert_eq!(err, SessionError::IncompleteProfile(SellerId::from("user_1")));
    }

    #[tokio::test]
    async fn test_provider_publishes_changes() {
        let provider = SessionProvider::new();
        let mut watch = provider.watch();
        assert!(watch.borrow_and_update().is_none());

        let ctx = SessionContext::new("user_1", SellerProfile::new("user_1", "Chaat Corner")).unwrap();
        provider.login(ctx);
        watch.changed().await.unwrap();
        assert_eq!(provider.current_seller_id(), Some(SellerId::from("user_1")));

        provider.logout();
        watch.changed().await.unwrap();
        assert!(watch.borrow().is_none());
    }
}
