use reqwest::StatusCode;
use thiserror::Error;

/// Transport-level failures shared by both HTTP clients.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to parse response JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("the service returned no match for the requested location")]
    NoMatch,

    #[error("forecast series lengths are misaligned")]
    MisalignedSeries,
}

/// Errors surfaced by the forecast view. The display strings are shown to
/// the user verbatim in place of the grid.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// The startup forecast for the reference location failed.
    #[error("Couldn't fetch default weather data.")]
    DefaultFetch(#[source] ClientError),

    /// Geocoding failed or returned no match.
    #[error("Couldn't find city.")]
    Lookup(#[source] ClientError),

    /// The forecast fetch for resolved coordinates failed.
    #[error("Couldn't fetch weather data with given input values.")]
    CoordFetch(#[source] ClientError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_errors_display_the_user_facing_messages() {
        let lookup = WidgetError::Lookup(ClientError::NoMatch);
        assert_eq!(lookup.to_string(), "Couldn't find city.");

        let default_fetch = WidgetError::DefaultFetch(ClientError::MisalignedSeries);
        assert_eq!(default_fetch.to_string(), "Couldn't fetch default weather data.");

        let coord_fetch = WidgetError::CoordFetch(ClientError::NoMatch);
        assert_eq!(
            coord_fetch.to_string(),
            "Couldn't fetch weather data with given input values."
        );
    }

    #[test]
    fn status_errors_carry_code_and_body() {
        let err = ClientError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: "bad key".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("bad key"));
    }
}
