//! The cached store shared by every entity kind.
//!
//! ## Cache rules
//! - A listing replaces `items` wholesale, deduplicated by id (first wins).
//! - A create inserts the returned entity, replacing one with the same id.
//! - An update replaces the entity with the returned id; `selected` follows
//!   when it holds that id.
//! - A delete removes the id and clears `selected` when it matched.
//! - Listings and single fetches carry generation tickets: a reply for a
//!   superseded request is returned to its caller but not cached.
//! - A successful create, update or delete supersedes every listing still
//!   in flight, so an older snapshot cannot undo the mutation.
//! - A failed action leaves the cache untouched.

use std::collections::HashSet;
use std::sync::Mutex;

use serde_json::Value;
use tracing::debug;

use super::context::{Action, StoreContext, Verb};
use super::{EntityId, Resource};
use crate::domain::error::DomainError;
use crate::domain::ports::ApiRequest;
use crate::domain::tracking::{Bookkeeping, Generation, InFlight, Tracked, lock_state};

/// Point-in-time copy of a store's observable state.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceCache<R> {
    /// Cached collection.
    pub items: Vec<R>,
    /// Currently selected entity.
    pub selected: Option<R>,
    /// Whether any action is running.
    pub loading: bool,
    /// Message of the most recent failure since the last action started.
    pub last_error: Option<String>,
}

struct CacheState<R> {
    items: Vec<R>,
    selected: Option<R>,
    listing: Generation,
    selection: Generation,
    book: Bookkeeping,
}

impl<R> Default for CacheState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            listing: Generation::default(),
            selection: Generation::default(),
            book: Bookkeeping::default(),
        }
    }
}

impl<R> Tracked for CacheState<R> {
    fn bookkeeping(&mut self) -> &mut Bookkeeping {
        &mut self.book
    }
}

/// Cached CRUD store for one entity kind.
pub struct ResourceStore<R: Resource> {
    context: StoreContext,
    state: Mutex<CacheState<R>>,
}

impl<R: Resource> ResourceStore<R> {
    /// Empty store.
    pub fn new(context: StoreContext) -> Self {
        Self {
            context,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ResourceCache<R> {
        let state = lock_state(&self.state);
        ResourceCache {
            items: state.items.clone(),
            selected: state.selected.clone(),
            loading: state.book.is_loading(),
            last_error: state.book.last_error().map(str::to_owned),
        }
    }

    /// Cached collection.
    pub fn items(&self) -> Vec<R> {
        lock_state(&self.state).items.clone()
    }

    /// Selected entity.
    pub fn selected(&self) -> Option<R> {
        lock_state(&self.state).selected.clone()
    }

    /// Whether any action is running.
    pub fn is_loading(&self) -> bool {
        lock_state(&self.state).book.is_loading()
    }

    /// Message of the most recent failure.
    pub fn last_error(&self) -> Option<String> {
        lock_state(&self.state).book.last_error().map(str::to_owned)
    }

    /// Forget the last failure.
    pub fn reset_error(&self) {
        lock_state(&self.state).book.clear_error();
    }

    /// Load the whole collection.
    ///
    /// # Errors
    ///
    /// Returns the normalised failure; the cache is left untouched.
    pub async fn list(&self) -> Result<Vec<R>, DomainError> {
        self.replace_items(Ok(R::list_request())).await
    }

    /// Fetch one entity and select it.
    ///
    /// # Errors
    ///
    /// Returns the normalised failure; the selection is left untouched.
    pub async fn get_by_id(&self, id: &EntityId) -> Result<Option<R>, DomainError> {
        let _flight = InFlight::begin(&self.state);
        let ticket = lock_state(&self.state).selection.advance();
        match self
            .context
            .exchange::<R>(Self::action(Verb::Loaded), R::get_request(id))
            .await
        {
            Ok(found) => {
                let mut state = lock_state(&self.state);
                if state.selection.is_current(ticket) {
                    state.selected.clone_from(&found);
                } else {
                    debug!(kind = R::KIND, %id, "discarding superseded fetch");
                }
                Ok(found)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Create an entity. The payload is validated before any request.
    ///
    /// # Errors
    ///
    /// Returns an [`crate::domain::ErrorCode::InvalidRequest`] error for an
    /// invalid payload, or the normalised remote failure.
    pub async fn create(&self, payload: &R::Create) -> Result<Option<R>, DomainError> {
        let _flight = InFlight::begin(&self.state);
        let outcome = match prepare(payload, R::create_request) {
            Ok(request) => {
                self.context
                    .exchange::<R>(Self::action(Verb::Created), request)
                    .await
            }
            Err(error) => Err(error),
        };
        match outcome {
            Ok(created) => {
                if let Some(entity) = &created {
                    self.insert(entity);
                }
                Ok(created)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Update an entity. The payload is validated before any request.
    ///
    /// # Errors
    ///
    /// Returns an [`crate::domain::ErrorCode::InvalidRequest`] error for an
    /// invalid payload, or the normalised remote failure.
    pub async fn update(
        &self,
        id: &EntityId,
        payload: &R::Update,
    ) -> Result<Option<R>, DomainError> {
        let _flight = InFlight::begin(&self.state);
        let outcome = match prepare(payload, |body| R::update_request(id, body)) {
            Ok(request) => {
                self.context
                    .exchange::<R>(Self::action(Verb::Updated), request)
                    .await
            }
            Err(error) => Err(error),
        };
        match outcome {
            Ok(updated) => {
                if let Some(entity) = &updated {
                    self.apply_update(entity);
                }
                Ok(updated)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    fn insert(&self, entity: &R) {
        let mut state = lock_state(&self.state);
        state.listing.advance();
        upsert(&mut state.items, entity.clone());
    }

    fn apply_update(&self, entity: &R) {
        let mut state = lock_state(&self.state);
        state.listing.advance();
        if let Some(slot) = state.items.iter_mut().find(|item| item.id() == entity.id()) {
            slot.clone_from(entity);
        }
        if state
            .selected
            .as_ref()
            .is_some_and(|selected| selected.id() == entity.id())
        {
            state.selected = Some(entity.clone());
        }
    }

    /// Delete an entity.
    ///
    /// # Errors
    ///
    /// Returns the normalised failure; the cache is left untouched.
    pub async fn delete(&self, id: &EntityId) -> Result<(), DomainError> {
        let _flight = InFlight::begin(&self.state);
        match self
            .context
            .exchange::<Value>(Self::action(Verb::Deleted), R::delete_request(id))
            .await
        {
            Ok(_) => {
                let mut state = lock_state(&self.state);
                state.listing.advance();
                state.items.retain(|item| item.id() != id);
                if state
                    .selected
                    .as_ref()
                    .is_some_and(|selected| selected.id() == id)
                {
                    state.selected = None;
                }
                Ok(())
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Run a listing-style request and replace `items` with its result.
    pub(crate) async fn replace_items(
        &self,
        request: Result<ApiRequest, DomainError>,
    ) -> Result<Vec<R>, DomainError> {
        let _flight = InFlight::begin(&self.state);
        let ticket = lock_state(&self.state).listing.advance();
        let outcome = match request {
            Ok(request) => {
                self.context
                    .exchange::<Vec<R>>(Self::action(Verb::Listed), request)
                    .await
            }
            Err(error) => Err(error),
        };
        match outcome {
            Ok(data) => {
                let items = dedupe_by_id(data.unwrap_or_default());
                let mut state = lock_state(&self.state);
                if state.listing.is_current(ticket) {
                    state.items.clone_from(&items);
                } else {
                    debug!(kind = R::KIND, "discarding superseded listing");
                }
                Ok(items)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Run an action that does not touch the cache.
    pub(crate) async fn run_detached<T: serde::de::DeserializeOwned>(
        &self,
        verb: Verb,
        request: Result<ApiRequest, DomainError>,
    ) -> Result<Option<T>, DomainError> {
        let _flight = InFlight::begin(&self.state);
        let outcome = match request {
            Ok(request) => self.context.exchange::<T>(Self::action(verb), request).await,
            Err(error) => Err(error),
        };
        outcome.map_err(|error| self.fail(error))
    }

    /// Run a create-style request and insert its result into `items`.
    pub(crate) async fn insert_from(
        &self,
        verb: Verb,
        request: Result<ApiRequest, DomainError>,
    ) -> Result<Option<R>, DomainError> {
        let created = self.run_detached::<R>(verb, request).await?;
        if let Some(entity) = &created {
            self.insert(entity);
        }
        Ok(created)
    }

    const fn action(verb: Verb) -> Action {
        Action::new(R::LABEL, verb)
    }

    fn fail(&self, error: DomainError) -> DomainError {
        lock_state(&self.state).book.record_error(error.message());
        self.context.report_failure(&error);
        error
    }
}

/// Validate a payload and build its request.
pub(crate) fn prepare<P, F>(payload: &P, build: F) -> Result<ApiRequest, DomainError>
where
    P: super::Validate,
    F: FnOnce(&P) -> Result<ApiRequest, serde_json::Error>,
{
    payload
        .validate()
        .map_err(|error| DomainError::invalid_request(error.to_string()))?;
    build(payload)
        .map_err(|error| DomainError::internal(format!("failed to encode payload: {error}")))
}

fn upsert<R: Resource>(items: &mut Vec<R>, entity: R) {
    match items.iter_mut().find(|item| item.id() == entity.id()) {
        Some(slot) => *slot = entity,
        None => items.push(entity),
    }
}

fn dedupe_by_id<R: Resource>(items: Vec<R>) -> Vec<R> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id().clone()))
        .collect()
}
