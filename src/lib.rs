//! Frame extraction and export pipeline for ophthalmology scan containers.
//!
//! The crate models one imported scan as an immutable [`store::FrameStore`],
//! applies deterministic rotate/crop transforms per frame, and runs batch
//! exports through an explicit plan/execute split with per-item failure
//! isolation. Vendor container decoding is delegated to an external reader
//! collaborator; see [`scan::reader`].

pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod preset;
pub mod scan;
pub mod selection;
pub mod store;
pub mod transform;
