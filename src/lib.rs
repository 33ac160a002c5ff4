//! A local-first engine for turning GTFS transit schedules into weighted
//! stop-to-stop connectivity graphs. Loads feeds from directories or zip
//! archives, indexes stops in an adaptive quad-tree and scores plausible
//! connections with a penalty model, without relying on external APIs.

pub mod graph;
pub mod gtfs;
pub mod quadtree;
pub mod shared;
pub mod timetable;

pub mod prelude {
    pub use crate::graph::{Config, Graph, Penalty};
    pub use crate::gtfs::GtfsReader;
    pub use crate::quadtree::{Bounds, Item, QuadTree};
    pub use crate::shared::{Coordinate, Distance, Duration, Time};
    pub use crate::timetable::{Timetable, TimetableBuilder};
}
