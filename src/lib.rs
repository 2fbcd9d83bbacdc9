pub mod config;
pub mod decode;
pub mod error;
pub mod fetch;
pub mod index;
pub mod registry;
pub mod store;

pub use decode::{parse_feed, DecodeOptions, DecodeReport, DeviceRecord, RawFeed, SourceEncoding};
pub use error::{FeedError, FeedResult};
pub use index::{DeviceField, DeviceIndex};
