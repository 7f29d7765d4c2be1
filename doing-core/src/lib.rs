pub mod codec;
pub mod config;
pub mod doing;
pub mod entry;
pub mod error;
pub mod journal;
pub mod ops;
pub mod query;
pub mod store;
pub mod tags;
pub mod timestamp;

pub use config::Config;
pub use doing::Doing;
pub use entry::{Entry, EntryId};
pub use error::{DoingError, DoingResult};
pub use journal::{Journal, Section};
pub use ops::{OpContext, Outcome};
pub use query::{Query, Search, TagBool, TagFilter};
pub use tags::Tag;
