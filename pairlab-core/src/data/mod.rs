//! Price data: providers, the Parquet cache and date alignment.

pub mod align;
pub mod cache;
pub mod provider;
pub mod yahoo;

pub use align::{align_intersection, AlignedTimeline};
pub use cache::{hash_bars, CacheMeta, CacheStatus, CoverageResult, ParquetCache};
pub use provider::{DataError, DataProvider, DataSource, FetchResult, MemoryProvider};
pub use yahoo::YahooProvider;
