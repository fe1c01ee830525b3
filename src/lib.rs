//! Voronoi diagrams with Fortune's sweep line.
//!
//! ```rust
//! use fortune_rs::{Builder, Point};
//!
//! let diagram = Builder::new(vec![
//!     Point::new(0., 0.),
//!     Point::new(1., 0.),
//!     Point::new(0., 1.),
//!     Point::new(1., 1.),
//! ])
//! .build()
//! .unwrap()
//! .compute()
//! .unwrap();
//! assert_eq!(diagram.vertex_len(), 1);
//! ```

pub mod avl;
pub mod beach_line;
mod context;
pub mod dcel;
mod diagram;
mod error;
pub mod events;
pub mod order;
mod points;
pub mod queue;
mod shape;
mod sweeper;
mod utils;

pub use sweeper::{Builder, Observer, Voronoi};

/// exported to enable observer
pub use context::{Context, Stats};
pub use dcel::{FaceId, HalfEdgeId, VertexId};
pub use diagram::{Cell, Diagram};
pub use error::Error;
pub use points::{SiteId, Sites, MAX_SITES};
pub use shape::{BoundingBox, Edge, Point};

#[cfg(not(feature = "f32"))]
pub type Float = f64;
#[cfg(feature = "f32")]
pub type Float = f32;

/// Default relative tolerance for merging coincident Voronoi vertices
#[cfg(not(feature = "f32"))]
pub const DEFAULT_EPSILON: Float = 1e-9;
#[cfg(feature = "f32")]
pub const DEFAULT_EPSILON: Float = 1e-5;
