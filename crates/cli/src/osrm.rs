use railhead::{
    optimizer::{DriveEstimate, DriveTimes},
    repository::Stop,
    shared::{geo::Coordinate, geo::Distance, time::Duration},
};
use serde::Deserialize;
use tracing::debug;

const OSRM_URL: &str = "https://router.project-osrm.org/route/v1/driving";
// Pause between calls, to stay polite on the public router
const PACING: std::time::Duration = std::time::Duration::from_millis(200);

#[derive(Deserialize)]
struct RouteResponse {
    routes: Vec<Route>,
}

#[derive(Deserialize)]
struct Route {
    // Seconds and meters
    duration: f64,
    distance: f64,
}

/// Queries the router once per station. Stations it cannot resolve are
/// left out of the result; the optimizer counts those as skipped rather
/// than treating the lookup as fatal.
pub async fn drive_times(origin: Coordinate, stations: &[&Stop]) -> DriveTimes {
    let client = reqwest::Client::new();
    let mut drives = DriveTimes::new();
    for stop in stations {
        match route(&client, origin, stop.coordinate).await {
            Ok(Some(estimate)) => {
                drives.insert(stop.id.clone(), estimate);
            }
            Ok(None) => debug!("no road route to {}", stop.name),
            Err(err) => debug!("drive lookup for {} failed: {err}", stop.name),
        }
        tokio::time::sleep(PACING).await;
    }
    drives
}

async fn route(
    client: &reqwest::Client,
    from: Coordinate,
    to: Coordinate,
) -> Result<Option<DriveEstimate>, reqwest::Error> {
    let url = format!(
        "{OSRM_URL}/{},{};{},{}?overview=false",
        from.longitude, from.latitude, to.longitude, to.latitude
    );
    let response: RouteResponse = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let Some(route) = response.routes.first() else {
        return Ok(None);
    };
    Ok(Some(DriveEstimate {
        duration: Duration::from_seconds(route.duration.round() as u32),
        distance: Distance::from_meters(route.distance),
    }))
}
