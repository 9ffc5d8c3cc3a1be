mod library;
mod media;

pub use library::{LibraryEntry, TrackingStatus};
pub use media::{MediaSummary, MediaType};
