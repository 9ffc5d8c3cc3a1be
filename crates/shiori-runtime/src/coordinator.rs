//! The screen state coordinator.
//!
//! Sits between the presentation layer and the two data sources (remote
//! catalog, local library) and republishes their results as normalized
//! list/details state through observable slots. Each public entry point
//! spawns its own task; list and details state are written only by their
//! own requests.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use shiori_api::traits::CatalogService;
use shiori_core::models::{LibraryEntry, MediaSummary, MediaType, TrackingStatus};

use crate::slot::Slot;

/// Which logical screen is asking for list data. Selects the data
/// source: the first four read the local library, `Top` hits the
/// remote catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenCategory {
    Ongoing,
    Backlog,
    Finished,
    Starred,
    Top,
}

impl ScreenCategory {
    /// The tracking status a library-backed category filters by.
    fn status(&self) -> Option<TrackingStatus> {
        match self {
            Self::Ongoing => Some(TrackingStatus::Ongoing),
            Self::Backlog => Some(TrackingStatus::Backlog),
            Self::Finished => Some(TrackingStatus::Finished),
            Self::Starred | Self::Top => None,
        }
    }
}

/// State of the list screen. Transitions are total replacements.
#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Loading,
    Empty,
    Success(Vec<MediaSummary>),
    Error(String),
}

/// State of the details screen. `entry` is `None` while the item is not
/// in the local library.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailsState {
    Loading,
    Success {
        media: MediaSummary,
        entry: Option<LibraryEntry>,
    },
    Error(String),
}

/// Async access to the local library. The coordinator is written against
/// this trait; [`crate::DbHandle`] implements it for SQLite.
pub trait LibraryStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn by_status(
        &self,
        status: TrackingStatus,
        media: MediaType,
    ) -> impl Future<Output = Result<Vec<LibraryEntry>, Self::Error>> + Send;

    fn starred(
        &self,
        media: MediaType,
    ) -> impl Future<Output = Result<Vec<LibraryEntry>, Self::Error>> + Send;

    fn get(
        &self,
        mal_id: i64,
        media: MediaType,
    ) -> impl Future<Output = Result<Option<LibraryEntry>, Self::Error>> + Send;

    fn insert(
        &self,
        media: MediaSummary,
        status: TrackingStatus,
        starred: bool,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn update_tracking(
        &self,
        mal_id: i64,
        media: MediaType,
        status: TrackingStatus,
        starred: bool,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn delete(
        &self,
        mal_id: i64,
        media: MediaType,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn clear(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Coordinates list and details screens over the two injected
/// collaborators and republishes their results as UI state.
pub struct ScreenCoordinator<C, S> {
    catalog: Arc<C>,
    store: Arc<S>,
    list: Slot<Option<ListState>>,
    details: Slot<Option<DetailsState>>,
    // Memo of the last dispatched request. No-op calls must not touch it.
    category: Option<ScreenCategory>,
    media_type: MediaType,
    tasks: Vec<JoinHandle<()>>,
}

impl<C, S> ScreenCoordinator<C, S>
where
    C: CatalogService + 'static,
    S: LibraryStore + 'static,
{
    pub fn new(catalog: Arc<C>, store: Arc<S>) -> Self {
        Self {
            catalog,
            store,
            list: Slot::new(None),
            details: Slot::new(None),
            category: None,
            media_type: MediaType::Manga,
            tasks: Vec::new(),
        }
    }

    /// Observe the list screen state. `None` until the first request.
    pub fn list_state(&self) -> watch::Receiver<Option<ListState>> {
        self.list.subscribe()
    }

    /// Observe the details screen state. `None` until the first request.
    pub fn details_state(&self) -> watch::Receiver<Option<DetailsState>> {
        self.details.subscribe()
    }

    pub fn current_list(&self) -> Option<ListState> {
        self.list.current()
    }

    pub fn current_details(&self) -> Option<DetailsState> {
        self.details.current()
    }

    /// The media type of the last dispatched list request.
    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// The category of the last dispatched list request.
    pub fn category(&self) -> Option<ScreenCategory> {
        self.category
    }

    /// Request content for the list screen.
    ///
    /// A changed category always reloads. With the category unchanged, a
    /// missing `tab` reloads only when the current state is a success
    /// with an empty payload, and a `tab` equal to the memoized media
    /// type is a no-op.
    pub fn request_list(&mut self, tab: Option<MediaType>, category: ScreenCategory) {
        if self.category != Some(category) {
            self.category = Some(category);
            if let Some(tab) = tab {
                self.media_type = tab;
            }
            self.dispatch_list(category, self.media_type);
            return;
        }

        match tab {
            None => {
                // Stale-empty recovery: a populated list is left alone.
                if matches!(self.list.current(), Some(ListState::Success(ref p)) if p.is_empty()) {
                    self.dispatch_list(category, self.media_type);
                }
            }
            Some(tab) if tab != self.media_type => {
                self.media_type = tab;
                self.dispatch_list(category, tab);
            }
            Some(_) => {}
        }
    }

    fn dispatch_list(&mut self, category: ScreenCategory, media: MediaType) {
        let ticket = self.list.begin();
        ticket.publish(Some(ListState::Loading));

        let catalog = Arc::clone(&self.catalog);
        let store = Arc::clone(&self.store);
        let handle = tokio::spawn(async move {
            let state = match category.status() {
                Some(status) => local_list_state(store.by_status(status, media).await),
                None if category == ScreenCategory::Starred => {
                    local_list_state(store.starred(media).await)
                }
                _ => match catalog.top(media).await {
                    Ok(list) => ListState::Success(list),
                    Err(e) => {
                        tracing::warn!(error = %e, %media, "top list fetch failed");
                        ListState::Error(e.to_string())
                    }
                },
            };
            ticket.publish(Some(state));
        });
        self.track(handle);
    }

    /// Request content for the details screen. The remote summary and the
    /// local entry are looked up jointly; success requires both.
    pub fn request_details(&mut self, media: MediaType, mal_id: i64) {
        let ticket = self.details.begin();
        ticket.publish(Some(DetailsState::Loading));

        let catalog = Arc::clone(&self.catalog);
        let store = Arc::clone(&self.store);
        let handle = tokio::spawn(async move {
            let (remote, local) =
                tokio::join!(catalog.details(media, mal_id), store.get(mal_id, media));
            let state = match (remote, local) {
                (Ok(media), Ok(entry)) => DetailsState::Success { media, entry },
                (Err(e), _) => DetailsState::Error(e.to_string()),
                (_, Err(e)) => DetailsState::Error(e.to_string()),
            };
            ticket.publish(Some(state));
        });
        self.track(handle);
    }

    /// Save the currently shown item with the given tracking fields, or
    /// update its existing entry in place. Ignored unless the details
    /// screen shows a success.
    pub fn save_or_update(&mut self, status: TrackingStatus, starred: bool) {
        let Some(DetailsState::Success { media, entry }) = self.details.current() else {
            return;
        };

        let ticket = self.details.begin();
        let store = Arc::clone(&self.store);
        let handle = tokio::spawn(async move {
            let state = match entry {
                Some(mut entry) => {
                    // Write through, then mutate the held entry to match
                    // instead of re-reading.
                    match store
                        .update_tracking(entry.mal_id, entry.media_type, status, starred)
                        .await
                    {
                        Ok(()) => {
                            entry.status = status;
                            entry.starred = starred;
                            DetailsState::Success {
                                media,
                                entry: Some(entry),
                            }
                        }
                        Err(e) => DetailsState::Error(e.to_string()),
                    }
                }
                None => {
                    let mal_id = media.mal_id;
                    let media_type = media.media_type;
                    match store.insert(media.clone(), status, starred).await {
                        Ok(()) => match store.get(mal_id, media_type).await {
                            Ok(entry) => DetailsState::Success { media, entry },
                            Err(e) => DetailsState::Error(e.to_string()),
                        },
                        Err(e) => DetailsState::Error(e.to_string()),
                    }
                }
            };
            ticket.publish(Some(state));
        });
        self.track(handle);
    }

    /// Remove the given item from the library. Ignored unless the details
    /// screen shows a success. The media namespace comes from the last
    /// dispatched list request.
    pub fn delete_entry(&mut self, mal_id: i64) {
        let Some(DetailsState::Success { media, .. }) = self.details.current() else {
            return;
        };

        let media_type = self.media_type;
        let ticket = self.details.begin();
        let store = Arc::clone(&self.store);
        let handle = tokio::spawn(async move {
            // Await the delete so a follow-up read cannot observe the
            // removed entry, but don't surface its failure as state.
            if let Err(e) = store.delete(mal_id, media_type).await {
                tracing::warn!(error = %e, mal_id, "failed to delete library entry");
            }
            ticket.publish(Some(DetailsState::Success { media, entry: None }));
        });
        self.track(handle);
    }

    /// Wipe the whole library. Touches neither state slot.
    pub fn clear_library(&mut self) {
        let store = Arc::clone(&self.store);
        let handle = tokio::spawn(async move {
            if let Err(e) = store.clear().await {
                tracing::warn!(error = %e, "failed to clear library");
            }
        });
        self.track(handle);
    }

    /// Abort all in-flight work. Both slots keep whatever state they
    /// held; cancelled requests publish nothing further.
    pub fn cancel_all(&mut self) {
        for handle in self.tasks.drain(..) {
            handle.abort();
        }
    }

    /// Wait until all currently tracked tasks have settled.
    pub async fn idle(&mut self) {
        for handle in self.tasks.drain(..) {
            let _ = handle.await;
        }
    }

    fn track(&mut self, handle: JoinHandle<()>) {
        self.tasks.retain(|h| !h.is_finished());
        self.tasks.push(handle);
    }
}

impl<C, S> Drop for ScreenCoordinator<C, S> {
    fn drop(&mut self) {
        for handle in &self.tasks {
            handle.abort();
        }
    }
}

fn local_list_state<E: std::fmt::Display>(result: Result<Vec<LibraryEntry>, E>) -> ListState {
    match result {
        Ok(entries) if entries.is_empty() => ListState::Empty,
        Ok(entries) => {
            ListState::Success(entries.iter().map(LibraryEntry::to_summary).collect())
        }
        Err(e) => ListState::Error(e.to_string()),
    }
}
