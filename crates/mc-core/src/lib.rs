pub mod carpet;
pub mod error;
pub mod geometry;
pub mod index;
pub mod job;
pub mod sheet;
pub mod units;

pub use carpet::{Carpet, CarpetId, PlacedCarpet, Priority};
pub use error::Error;
pub use geometry::Rotation;
pub use index::ObstacleIndex;
pub use job::JobFile;
pub use sheet::{Layout, SheetSpec};
pub use units::Unit;
