//! Local JSON cache for fetched attendance data.
//!
//! Record lists are cached to disk so the dashboard has something to show
//! before the first refresh completes, and so archived days are not
//! re-fetched every time they are viewed.

pub mod manager;

pub use manager::{CacheAges, CacheManager, CachedData};
