use std::{collections::HashMap, sync::Arc};

use crate::shared::{geo::Distance, time::Duration};

/// One station's road estimate from the traveler's origin, as supplied
/// by the drive-time collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriveEstimate {
    pub duration: Duration,
    pub distance: Distance,
}

/// Stop id to road estimate. Coverage may be partial: stations the
/// collaborator could not resolve are simply absent.
pub type DriveTimes = HashMap<Arc<str>, DriveEstimate>;
