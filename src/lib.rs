pub mod gtfs;
pub mod optimizer;
pub mod planner;
pub mod repository;
pub mod shared;

pub mod prelude {
    pub use crate::gtfs::Gtfs;
    pub use crate::optimizer::{DriveEstimate, DriveTimes, Ranking, rank};
    pub use crate::planner::{ArriveBy, StationTimes, TrainTime};
    pub use crate::repository::Repository;
    pub use crate::shared::time::{Duration, Time};
}
