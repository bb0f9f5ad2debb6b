//! `YouTube` Data API v3 client and the metadata adapter built on it.

pub mod adapter;
pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use adapter::{ChannelLookup, MetadataAdapter, DETAIL_BATCH_SIZE, PAGE_SIZE};
pub use client::{YoutubeApi, YoutubeClient};
pub use error::YoutubeError;
