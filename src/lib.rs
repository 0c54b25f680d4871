//! `las2poly` extracts land or water-body polygons from airborne lidar tiles.
//!
//! # Pipeline
//!
//! - **[`point`]**: the point store and its stable-index vertex identity.
//! - **[`thinning`]**: grid-based thinning and merge-thinning.
//! - **[`predicates`]**: robust orientation and in-circle predicates.
//! - **[`mesh`]**: parallel divide-and-conquer Delaunay construction, elevation
//!   interpolation, and mesh deconstruction.
//! - **[`triangle`]**: triangle sets and connected-component explosion.
//! - **[`edges`]**: directed edge sets, cancellation, and region classification.
//! - **[`ring`]**: ring stitching from an unordered directed-edge set.
//! - **[`polygon`]**: hole nesting into finished polygons.
//! - **[`simplify`]** / **[`smooth`]**: topology-preserving generalisation.
//! - **[`densify`]**: optional maximum-vertex-spacing pass.
//! - **[`io`]**: LAS/PLY ingestion and GeoJSON/shapefile emission.
//! - **[`pipeline`]**: the orchestrator tying the above together.

pub mod config;
pub mod densify;
pub mod edges;
pub mod error;
pub mod io;
pub mod logging;
pub mod mesh;
pub mod pipeline;
pub mod point;
pub mod polygon;
pub mod predicates;
pub mod ring;
pub mod rtree;
pub mod simplify;
pub mod smooth;
pub mod srs;
pub mod thinning;
pub mod triangle;
pub mod vector;

pub use config::Config;
pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;
