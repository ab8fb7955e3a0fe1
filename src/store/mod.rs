//! Response cache and model store used by the forecast service.

mod cache;
mod clock;
mod error;
mod file;
mod model_store;

pub use cache::{CacheEntry, CacheKey, FileResponseCache, MemoryResponseCache, ResponseCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::StoreError;
pub use model_store::{FileModelStore, MemoryModelStore, ModelStore};
