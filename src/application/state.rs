use std::sync::Arc;

use crate::config::auth::AuthConfig;
use crate::config::invitations::InvitationConfig;
use crate::db::DbConn;
use crate::services::{InvitationService, MembershipService};
use crate::store::{DatabaseStore, InvitationStore, MemberStore, SettingStore};

/// Application state shared by all handlers.
///
/// Stores are trait objects so tests can swap in fakes or failing stores.
#[derive(Clone)]
pub struct AppState {
    pub invitations: Arc<dyn InvitationStore>,
    pub members: Arc<dyn MemberStore>,
    pub settings: Arc<dyn SettingStore>,
    pub auth: AuthConfig,
    pub invitation_defaults: InvitationConfig,
}

impl AppState {
    pub fn new(
        invitations: Arc<dyn InvitationStore>,
        members: Arc<dyn MemberStore>,
        settings: Arc<dyn SettingStore>,
        auth: AuthConfig,
        invitation_defaults: InvitationConfig,
    ) -> Self {
        Self {
            invitations,
            members,
            settings,
            auth,
            invitation_defaults,
        }
    }

    /// State backed by one database connection for every store
    pub fn from_database(
        db: DbConn,
        auth: AuthConfig,
        invitation_defaults: InvitationConfig,
    ) -> Self {
        let store = Arc::new(DatabaseStore::new(db));
        Self::new(
            store.clone(),
            store.clone(),
            store,
            auth,
            invitation_defaults,
        )
    }

    pub fn invitation_service(&self) -> InvitationService {
        InvitationService::new(self.invitations.clone())
    }

    pub fn membership_service(&self) -> MembershipService {
        MembershipService::new(
            self.invitation_service(),
            self.members.clone(),
            self.settings.clone(),
        )
    }
}
