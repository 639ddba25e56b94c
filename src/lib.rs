//! Grid-accelerated 2-D flocking.
//!
//! A [`World`] owns a flat array of [`Entity`] values and advances them one
//! tick per [`World::update`] call. Neighbor lookups go through a uniform
//! [`SpatialGrid`] rebuilt only when the world shape or interaction radius
//! changes.

pub mod config;
pub mod debug;
pub mod entity;
pub mod spatial;
pub mod spawn;
pub mod util;
pub mod world;

pub use config::{BoundaryKind, Params, ParamsError};
pub use entity::Entity;
pub use spatial::{Addressing, SpatialGrid};
pub use world::{Boundary, UpdateOrder, World};
