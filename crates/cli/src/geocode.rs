use railhead::shared::geo::Coordinate;
use serde::Deserialize;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = "railhead-cli/0.1";

#[derive(Deserialize)]
struct Place {
    // Nominatim ships coordinates as strings
    lat: String,
    lon: String,
}

/// Resolves a free-text address to a coordinate. A clean miss comes
/// back as Ok(None); transport failures surface as the error.
pub async fn locate(address: &str) -> Result<Option<Coordinate>, reqwest::Error> {
    let client = reqwest::Client::new();
    let places: Vec<Place> = client
        .get(NOMINATIM_URL)
        .query(&[("q", address), ("format", "json"), ("limit", "1")])
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let Some(place) = places.first() else {
        return Ok(None);
    };
    match (place.lat.parse(), place.lon.parse()) {
        (Ok(latitude), Ok(longitude)) => Ok(Some(Coordinate {
            latitude,
            longitude,
        })),
        _ => Ok(None),
    }
}
