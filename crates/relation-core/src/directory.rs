//! Profile directory: CRUD plus best-effort mirroring.
//!
//! Store writes are synchronous and their errors reach the caller. The
//! spreadsheet row and the facet re-sync that follow a write go through the
//! [`SideEffectQueue`] and never affect the response.

use crate::effects::SideEffectQueue;
use crate::error::{Error, Result};
use crate::sheets::{SheetRow, SheetSink};
use crate::sync::FacetSync;
use relation_store::{NewProfile, Profile, ProfilePatch, RelationStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Signed-in user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Provider user id
    pub id: String,
    /// Display nickname
    #[serde(default)]
    pub nickname: Option<String>,
    /// Avatar URL
    #[serde(default)]
    pub profile_image: Option<String>,
    /// Email
    #[serde(default)]
    pub email: Option<String>,
}

/// Profile directory service.
pub struct Directory {
    store: RelationStore,
    effects: SideEffectQueue,
    sheets: Option<Arc<dyn SheetSink>>,
    sync: Option<Arc<FacetSync>>,
}

impl Directory {
    /// Directory without mirroring.
    pub fn new(store: RelationStore, effects: SideEffectQueue) -> Self {
        Self {
            store,
            effects,
            sheets: None,
            sync: None,
        }
    }

    /// Mirror writes to a spreadsheet.
    #[must_use]
    pub fn with_sheets(mut self, sink: Arc<dyn SheetSink>) -> Self {
        self.sheets = Some(sink);
        self
    }

    /// Re-embed facets after writes.
    #[must_use]
    pub fn with_facet_sync(mut self, sync: Arc<FacetSync>) -> Self {
        self.sync = Some(sync);
        self
    }

    /// All profiles, most recently updated first.
    pub async fn list(&self) -> Result<Vec<Profile>> {
        Ok(self.store.list_profiles().await?)
    }

    /// One profile.
    pub async fn get(&self, id: &str) -> Result<Profile> {
        self.store
            .get_profile(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("profile {id}")))
    }

    /// Create a profile and schedule mirroring.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create(&self, new: NewProfile) -> Result<Profile> {
        let profile = self.store.create_profile(&new).await?;
        self.mirror(&profile);
        Ok(profile)
    }

    /// Patch a profile and schedule mirroring.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: ProfilePatch) -> Result<Profile> {
        if id.trim().is_empty() {
            return Err(Error::Validation("missing id".to_string()));
        }
        let profile = self
            .store
            .update_profile(id, &patch)
            .await?
            .ok_or_else(|| Error::NotFound(format!("profile {id}")))?;
        self.mirror(&profile);
        Ok(profile)
    }

    /// The signed-in user's profile: by external id, else by exact nickname.
    pub async fn me(&self, user: &SessionUser) -> Result<Option<Profile>> {
        if let Some(profile) = self.store.find_profile_by_external_id(&user.id).await? {
            return Ok(Some(profile));
        }
        match user.nickname.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(self.store.find_profile_by_name(name).await?),
            _ => Ok(None),
        }
    }

    fn mirror(&self, profile: &Profile) {
        if let Some(sink) = &self.sheets {
            let sink = Arc::clone(sink);
            let row = SheetRow::from(profile);
            self.effects.submit("sheets.upsert_profile_row", async move {
                sink.upsert_profile_row(&row).await
            });
        }
        if let Some(sync) = &self.sync {
            let sync = Arc::clone(sync);
            let id = profile.id.clone();
            self.effects.submit("facets.sync_profile", async move {
                let report = sync.sync_profile(&id).await?;
                debug!(profile_id = %report.profile_id, errors = report.index_errors.len(), "Mirrored facets");
                Ok(())
            });
        }
    }
}
