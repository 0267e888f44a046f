use crate::clients::ReconcilerClient;
use crate::lifecycle::AppConfig;
use crate::notify::Notifier;
use crate::reconciler::ReconcilerContext;
use crate::render::Renderer;
use crate::session::{SessionProvider, SessionWatch};
use crate::settings::{DeviceSettings, SettingsError, AUTO_CONFIRM_KEY};
use crate::store::{ChangeFeed, OrderStore};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// External collaborators the app is wired to.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn OrderStore>,
    pub feed: Arc<dyn ChangeFeed>,
    pub renderer: Arc<dyn Renderer>,
    pub notifier: Arc<dyn Notifier>,
    pub settings: Arc<dyn DeviceSettings>,
}

/// Runtime orchestrator for the seller's order screen.
///
/// `SellerApp` spawns the [`OrderReconciler`](crate::reconciler::OrderReconciler) and a
/// watcher that follows the session: a sign-in starts (or restarts) the order feed for
/// that seller, a sign-out stops it and clears the auto-confirm preference.
///
/// # Example
///
/// ```ignore
/// let sessions = SessionProvider::new();
/// let app = SellerApp::new(&AppConfig::from_env(), collaborators, &sessions);
///
/// sessions.login(SessionContext::new(user_id, profile)?);
/// app.reconciler.update_order_status(order_id, OrderStatus::Confirmed).await?;
///
/// app.shutdown().await?;
/// ```
pub struct SellerApp {
    /// Client for the order reconciler.
    pub reconciler: ReconcilerClient,
    settings: Arc<dyn DeviceSettings>,
    watcher: JoinHandle<()>,
    handle: JoinHandle<()>,
}

impl SellerApp {
    pub fn new(config: &AppConfig, collaborators: Collaborators, sessions: &SessionProvider) -> Self {
        let (actor, reconciler) = crate::reconciler::new(config.reconciler_buffer);

        let handle = tokio::spawn(actor.run(ReconcilerContext {
            store: collaborators.store,
            feed: collaborators.feed,
            renderer: collaborators.renderer,
            notifier: collaborators.notifier.clone(),
            settings: collaborators.settings.clone(),
            fetch_limit: config.fetch_limit,
            notification_title: config.notification_title.clone(),
        }));

        let watcher = tokio::spawn(follow_session(
            sessions.watch(),
            reconciler.clone(),
            collaborators.notifier,
            collaborators.settings.clone(),
        ));

        Self {
            reconciler,
            settings: collaborators.settings,
            watcher,
            handle,
        }
    }

    pub fn auto_confirm(&self) -> bool {
        self.settings.auto_confirm()
    }

    /// Persists the auto-confirm preference. Applies from the next insert event.
    pub fn set_auto_confirm(&self, enabled: bool) -> Result<(), SettingsError> {
        self.settings.set_bool(AUTO_CONFIRM_KEY, enabled)?;
        info!("Auto-confirm orders: {}", if enabled { "ON" } else { "OFF" });
        Ok(())
    }

    /// Stops following the session, then closes the reconciler and waits for it to
    /// unsubscribe and exit.
    ///
    /// Returns an error if the reconciler task panicked.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down seller app...");

        self.watcher.abort();
        let _ = self.watcher.await;

        drop(self.reconciler);
        if let Err(e) = self.handle.await {
            error!("Reconciler task failed: {:?}", e);
            return Err(format!("Reconciler task failed: {:?}", e));
        }

        info!("Seller app shutdown complete.");
        Ok(())
    }
}

/// Drives the reconciler from session changes until the provider goes away.
pub(crate) async fn follow_session(
    mut sessions: SessionWatch,
    reconciler: ReconcilerClient,
    notifier: Arc<dyn Notifier>,
    settings: Arc<dyn DeviceSettings>,
) {
    let mut signed_in = false;
    loop {
        let session = sessions.borrow_and_update().clone();
        match session {
            Some(session) => {
                signed_in = true;
                if let Err(e) = reconciler.start(Some(session)).await {
                    warn!(error = %e, "Could not start order feed");
                }
                // The prompt may stay unanswered indefinitely; orders keep flowing meanwhile.
                let notifier = notifier.clone();
                tokio::spawn(async move {
                    let permission = notifier.request_permission().await;
                    debug!(?permission, "Notification permission");
                });
            }
            None => {
                if let Err(e) = reconciler.stop().await {
                    warn!(error = %e, "Could not stop order feed");
                }
                if std::mem::take(&mut signed_in) {
                    match settings.remove(AUTO_CONFIRM_KEY) {
                        Ok(()) => info!("Signed out, auto-confirm preference cleared"),
                        Err(e) => warn!(error = %e, "Could not clear auto-confirm preference"),
                    }
                }
            }
        }

        if sessions.changed().await.is_err() {
            debug!("Session provider dropped");
            break;
        }
    }
}
