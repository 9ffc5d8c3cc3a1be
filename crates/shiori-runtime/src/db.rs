//! Async access to the SQLite library.
//!
//! `rusqlite` is synchronous, so the storage lives on a dedicated
//! `db-actor` thread and [`DbHandle`] talks to it over a command
//! channel with oneshot replies.

use std::path::Path;

use tokio::sync::{mpsc, oneshot};

use shiori_core::error::ShioriError;
use shiori_core::models::{LibraryEntry, MediaSummary, MediaType, TrackingStatus};
use shiori_core::storage::Storage;

use crate::coordinator::LibraryStore;

#[derive(Clone)]
pub struct DbHandle {
    tx: mpsc::UnboundedSender<DbCommand>,
}

enum DbCommand {
    ByStatus {
        status: TrackingStatus,
        media: MediaType,
        reply: oneshot::Sender<Result<Vec<LibraryEntry>, ShioriError>>,
    },
    Starred {
        media: MediaType,
        reply: oneshot::Sender<Result<Vec<LibraryEntry>, ShioriError>>,
    },
    Get {
        mal_id: i64,
        media: MediaType,
        reply: oneshot::Sender<Result<Option<LibraryEntry>, ShioriError>>,
    },
    Insert {
        media: Box<MediaSummary>,
        status: TrackingStatus,
        starred: bool,
        reply: oneshot::Sender<Result<(), ShioriError>>,
    },
    UpdateTracking {
        mal_id: i64,
        media: MediaType,
        status: TrackingStatus,
        starred: bool,
        reply: oneshot::Sender<Result<(), ShioriError>>,
    },
    Delete {
        mal_id: i64,
        media: MediaType,
        reply: oneshot::Sender<Result<(), ShioriError>>,
    },
    Clear {
        reply: oneshot::Sender<Result<(), ShioriError>>,
    },
}

impl DbHandle {
    /// Open the database at the given path and spawn the actor thread.
    pub fn open(path: &Path) -> Option<Self> {
        let storage = Storage::open(path)
            .map_err(|e| tracing::error!("Failed to open database: {e}"))
            .ok()?;
        Self::spawn(storage)
    }

    /// In-memory database (for tests).
    pub fn open_memory() -> Option<Self> {
        let storage = Storage::open_memory()
            .map_err(|e| tracing::error!("Failed to open in-memory database: {e}"))
            .ok()?;
        Self::spawn(storage)
    }

    fn spawn(storage: Storage) -> Option<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("db-actor".into())
            .spawn(move || actor_loop(storage, rx))
            .map_err(|e| tracing::error!("Failed to spawn DB thread: {e}"))
            .ok()?;

        Some(Self { tx })
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T, ShioriError>>) -> DbCommand,
    ) -> Result<T, ShioriError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(make(reply));
        rx.await
            .unwrap_or_else(|_| Err(ShioriError::Config("DB actor closed".into())))
    }
}

impl LibraryStore for DbHandle {
    type Error = ShioriError;

    async fn by_status(
        &self,
        status: TrackingStatus,
        media: MediaType,
    ) -> Result<Vec<LibraryEntry>, ShioriError> {
        self.request(|reply| DbCommand::ByStatus {
            status,
            media,
            reply,
        })
        .await
    }

    async fn starred(&self, media: MediaType) -> Result<Vec<LibraryEntry>, ShioriError> {
        self.request(|reply| DbCommand::Starred { media, reply }).await
    }

    async fn get(
        &self,
        mal_id: i64,
        media: MediaType,
    ) -> Result<Option<LibraryEntry>, ShioriError> {
        self.request(|reply| DbCommand::Get {
            mal_id,
            media,
            reply,
        })
        .await
    }

    async fn insert(
        &self,
        media: MediaSummary,
        status: TrackingStatus,
        starred: bool,
    ) -> Result<(), ShioriError> {
        self.request(|reply| DbCommand::Insert {
            media: Box::new(media),
            status,
            starred,
            reply,
        })
        .await
    }

    async fn update_tracking(
        &self,
        mal_id: i64,
        media: MediaType,
        status: TrackingStatus,
        starred: bool,
    ) -> Result<(), ShioriError> {
        self.request(|reply| DbCommand::UpdateTracking {
            mal_id,
            media,
            status,
            starred,
            reply,
        })
        .await
    }

    async fn delete(&self, mal_id: i64, media: MediaType) -> Result<(), ShioriError> {
        self.request(|reply| DbCommand::Delete {
            mal_id,
            media,
            reply,
        })
        .await
    }

    async fn clear(&self) -> Result<(), ShioriError> {
        self.request(|reply| DbCommand::Clear { reply }).await
    }
}

fn actor_loop(storage: Storage, mut rx: mpsc::UnboundedReceiver<DbCommand>) {
    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            DbCommand::ByStatus {
                status,
                media,
                reply,
            } => {
                let _ = reply.send(storage.entries_by_status(status, media));
            }
            DbCommand::Starred { media, reply } => {
                let _ = reply.send(storage.starred_entries(media));
            }
            DbCommand::Get {
                mal_id,
                media,
                reply,
            } => {
                let _ = reply.send(storage.get_entry(mal_id, media));
            }
            DbCommand::Insert {
                media,
                status,
                starred,
                reply,
            } => {
                let _ = reply.send(storage.insert_entry(&media, status, starred));
            }
            DbCommand::UpdateTracking {
                mal_id,
                media,
                status,
                starred,
                reply,
            } => {
                let _ = reply.send(storage.update_tracking(mal_id, media, status, starred));
            }
            DbCommand::Delete {
                mal_id,
                media,
                reply,
            } => {
                let _ = reply.send(storage.delete_entry(mal_id, media));
            }
            DbCommand::Clear { reply } => {
                let _ = reply.send(storage.clear());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_summary(mal_id: i64, media: MediaType) -> MediaSummary {
        MediaSummary {
            mal_id,
            media_type: media,
            title: format!("Series {mal_id}"),
            synopsis: None,
            cover_url: None,
            score: None,
            url: None,
        }
    }

    #[tokio::test]
    async fn test_roundtrip_through_actor() {
        let db = DbHandle::open_memory().unwrap();

        db.insert(test_summary(42, MediaType::Anime), TrackingStatus::Backlog, true)
            .await
            .unwrap();

        let entry = db.get(42, MediaType::Anime).await.unwrap().unwrap();
        assert_eq!(entry.status, TrackingStatus::Backlog);
        assert!(entry.starred);

        let starred = db.starred(MediaType::Anime).await.unwrap();
        assert_eq!(starred.len(), 1);

        db.delete(42, MediaType::Anime).await.unwrap();
        assert!(db.get(42, MediaType::Anime).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_handle_is_cloneable() {
        let db = DbHandle::open_memory().unwrap();
        let db2 = db.clone();

        db.insert(test_summary(1, MediaType::Manga), TrackingStatus::Ongoing, false)
            .await
            .unwrap();
        let listed = db2
            .by_status(TrackingStatus::Ongoing, MediaType::Manga)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        db2.clear().await.unwrap();
        assert!(db
            .by_status(TrackingStatus::Ongoing, MediaType::Manga)
            .await
            .unwrap()
            .is_empty());
    }
}
