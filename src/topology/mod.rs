//! Top-level module for mesh topology.
//!
//! This module provides the element store and the view tree built on it:
//! - Element, view and region ids, and the element tags with their
//!   reference-cell tables
//! - The append-only [`ElementStore`](store::ElementStore) with deduplicated
//!   element creation
//! - [`MeshHierarchy`](hierarchy::MeshHierarchy): the store plus its views and
//!   their cached relations
//! - Regions, refinement and validation
//!
//! Most users will interact with `MeshHierarchy` only.

pub mod cache;
pub mod element_tag;
pub mod hierarchy;
pub mod ids;
pub mod refine;
pub mod region;
pub mod store;
pub mod validation;
pub mod view;

pub use cache::InvalidateCache;
pub use element_tag::ElementTag;
pub use hierarchy::{MeshHierarchy, SharedHierarchy};
pub use ids::{ElementId, RegionId, ViewId};
