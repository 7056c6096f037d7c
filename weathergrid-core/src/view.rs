//! The forecast view: UI state, the debounced input pipeline and the
//! geocode → forecast fetch chain.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::client::geocoding::GeocodingClient;
use crate::client::openmeteo::ForecastClient;
use crate::debounce::Debouncer;
use crate::error::WidgetError;
use crate::model::{DailySeries, ForecastPayload, Location};

/// Quiet period applied to each input field.
pub const INPUT_DEBOUNCE: Duration = Duration::from_millis(500);
/// Quiet period applied to the geocode → forecast chain.
pub const FETCH_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Data state owned by the forecast view. Mutated only through `update`.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub forecast: Option<ForecastPayload>,
    pub location: Location,
    pub error_message: String,
    /// Set once the startup fetch has been applied; edits settling before
    /// that do not dispatch fetches.
    pub initialized: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            forecast: None,
            location: Location::default(),
            error_message: "No weather data found.".to_string(),
            initialized: false,
        }
    }
}

impl ViewState {
    /// The grid to render, if any. A non-empty forecast always wins over
    /// the error message.
    pub fn grid(&self) -> Option<&DailySeries> {
        self.forecast.as_ref().map(|p| &p.daily).filter(|d| !d.is_empty())
    }

    /// The error message to render, only while no grid is held.
    pub fn visible_error(&self) -> Option<&str> {
        if self.grid().is_some() {
            None
        } else {
            Some(self.error_message.as_str())
        }
    }
}

/// Settled messages consumed by the view.
#[derive(Debug)]
pub enum ViewMsg {
    /// A city edit settled after the input quiet period.
    CitySettled(String),
    /// A country edit settled after the input quiet period.
    CountrySettled(String),
    /// The chain debouncer settled for this location.
    FetchDispatched(Location),
    /// The startup fetch or a fetch chain finished.
    ChainResolved(Result<ForecastPayload, WidgetError>),
}

/// Side effects requested by `update`, executed by the view's owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEffect {
    /// Feed the debounced fetch dispatcher.
    ScheduleFetch(Location),
    /// Execute the geocode → forecast chain.
    RunFetchChain(Location),
}

/// Pure state transition.
pub fn update(state: &mut ViewState, msg: ViewMsg) -> Option<ViewEffect> {
    match msg {
        ViewMsg::CitySettled(city) => {
            state.location.city = city;
            state
                .initialized
                .then(|| ViewEffect::ScheduleFetch(state.location.clone()))
        }
        ViewMsg::CountrySettled(country) => {
            state.location.country = country;
            state
                .initialized
                .then(|| ViewEffect::ScheduleFetch(state.location.clone()))
        }
        ViewMsg::FetchDispatched(location) => Some(ViewEffect::RunFetchChain(location)),
        ViewMsg::ChainResolved(Ok(payload)) => {
            state.forecast = Some(payload);
            state.error_message.clear();
            None
        }
        ViewMsg::ChainResolved(Err(err)) => {
            tracing::debug!(error = %err, "fetch chain failed");
            // Prior forecast stays untouched (stale-while-error).
            state.error_message = err.to_string();
            None
        }
    }
}

/// The two-stage chain: resolve the location, then fetch its forecast.
/// Geocoding failures map to `Lookup`, forecast failures to `CoordFetch`.
pub async fn resolve_and_fetch(
    geocoder: &GeocodingClient,
    forecast: &ForecastClient,
    location: &Location,
) -> Result<ForecastPayload, WidgetError> {
    let coords = geocoder.resolve(location).await.map_err(WidgetError::Lookup)?;

    forecast
        .fetch_for_coordinates(coords.latitude, coords.longitude)
        .await
        .map_err(WidgetError::CoordFetch)
}

/// Owns the view state, the debounced input pipeline and the clients.
///
/// The chain debouncer is a single instance created here, so the 1000ms
/// window has real suppression state across edits. Fetch chains run on
/// spawned tasks and post back as messages; chains are not cancelled, so
/// an older chain resolving late may overwrite a newer result.
pub struct ForecastView {
    state: ViewState,
    msgs_tx: mpsc::UnboundedSender<ViewMsg>,
    msgs_rx: mpsc::UnboundedReceiver<ViewMsg>,
    city_input: Debouncer<String>,
    country_input: Debouncer<String>,
    fetch_dispatch: Debouncer<Location>,
    geocoder: GeocodingClient,
    forecast: ForecastClient,
}

impl ForecastView {
    pub fn new(geocoder: GeocodingClient, forecast: ForecastClient) -> Self {
        let (msgs_tx, msgs_rx) = mpsc::unbounded_channel();

        let tx = msgs_tx.clone();
        let city_input = Debouncer::new(INPUT_DEBOUNCE, move |city| {
            let _ = tx.send(ViewMsg::CitySettled(city));
        });

        let tx = msgs_tx.clone();
        let country_input = Debouncer::new(INPUT_DEBOUNCE, move |country| {
            let _ = tx.send(ViewMsg::CountrySettled(country));
        });

        let tx = msgs_tx.clone();
        let fetch_dispatch = Debouncer::new(FETCH_DEBOUNCE, move |location| {
            let _ = tx.send(ViewMsg::FetchDispatched(location));
        });

        Self {
            state: ViewState::default(),
            msgs_tx,
            msgs_rx,
            city_input,
            country_input,
            fetch_dispatch,
            geocoder,
            forecast,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    #[cfg(test)]
    fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    /// Raw city keystroke; carries the full current field value.
    pub fn on_city_input(&self, value: String) {
        self.city_input.call(value);
    }

    /// Raw country keystroke; carries the full current field value.
    pub fn on_country_input(&self, value: String) {
        self.country_input.call(value);
    }

    /// Run the startup fetch for the reference location, then arm the
    /// reactive pipeline.
    pub async fn start(&mut self) {
        let result = self
            .forecast
            .fetch_default()
            .await
            .map_err(WidgetError::DefaultFetch);
        update(&mut self.state, ViewMsg::ChainResolved(result));
        self.state.initialized = true;
    }

    /// Apply one settled message and execute whatever effect it produced.
    pub fn handle(&mut self, msg: ViewMsg) {
        match update(&mut self.state, msg) {
            Some(ViewEffect::ScheduleFetch(location)) => self.fetch_dispatch.call(location),
            Some(ViewEffect::RunFetchChain(location)) => self.spawn_chain(location),
            None => {}
        }
    }

    /// Next settled message, if one is ready.
    pub fn try_next(&mut self) -> Option<ViewMsg> {
        self.msgs_rx.try_recv().ok()
    }

    fn spawn_chain(&self, location: Location) {
        let geocoder = self.geocoder.clone();
        let forecast = self.forecast.clone();
        let tx = self.msgs_tx.clone();

        tokio::spawn(async move {
            let result = resolve_and_fetch(&geocoder, &forecast, &location).await;
            let _ = tx.send(ViewMsg::ChainResolved(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::model::day_label;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload(days: usize) -> ForecastPayload {
        ForecastPayload {
            daily: DailySeries {
                time: (0..days).map(|i| format!("2024-01-{:02}", i + 1)).collect(),
                temperature_2m_max: vec![8.0; days],
                temperature_2m_min: vec![-1.0; days],
                rain_sum: vec![0.3; days],
            },
        }
    }

    fn daily_body(days: usize) -> serde_json::Value {
        serde_json::to_value(payload(days)).expect("payload serializes")
    }

    fn unreachable_clients() -> (GeocodingClient, ForecastClient) {
        (
            GeocodingClient::with_base_url(
                "key".to_string(),
                "http://127.0.0.1:9/v1/geocoding".to_string(),
            ),
            ForecastClient::with_base_url("http://127.0.0.1:9/v1/forecast".to_string()),
        )
    }

    #[test]
    fn initial_state_has_no_forecast_and_a_placeholder_error() {
        let state = ViewState::default();
        assert!(state.grid().is_none());
        assert_eq!(state.visible_error(), Some("No weather data found."));
        assert!(!state.initialized);
    }

    #[test]
    fn edits_before_initialization_do_not_dispatch() {
        let mut state = ViewState::default();
        let effect = update(&mut state, ViewMsg::CitySettled("Paris".to_string()));
        assert_eq!(effect, None);
        assert_eq!(state.location.city, "Paris");
    }

    #[test]
    fn settled_city_edit_schedules_a_fetch_with_untouched_country() {
        let mut state = ViewState {
            initialized: true,
            ..ViewState::default()
        };

        let effect = update(&mut state, ViewMsg::CitySettled("Paris".to_string()));

        let expected = Location {
            city: "Paris".to_string(),
            country: "Germany".to_string(),
        };
        assert_eq!(effect, Some(ViewEffect::ScheduleFetch(expected)));
    }

    #[test]
    fn dispatched_fetch_runs_the_chain() {
        let mut state = ViewState::default();
        let location = Location::default();

        let effect = update(&mut state, ViewMsg::FetchDispatched(location.clone()));

        assert_eq!(effect, Some(ViewEffect::RunFetchChain(location)));
    }

    #[test]
    fn resolved_chain_sets_forecast_and_clears_error() {
        let mut state = ViewState::default();

        update(&mut state, ViewMsg::ChainResolved(Ok(payload(7))));

        assert_eq!(state.grid().map(DailySeries::len), Some(7));
        assert!(state.error_message.is_empty());
        assert_eq!(state.visible_error(), None);
    }

    #[test]
    fn failed_chain_keeps_the_stale_grid() {
        let mut state = ViewState::default();
        update(&mut state, ViewMsg::ChainResolved(Ok(payload(7))));

        let err = WidgetError::Lookup(ClientError::NoMatch);
        update(&mut state, ViewMsg::ChainResolved(Err(err)));

        // The message is stored but the grid still wins the render.
        assert_eq!(state.error_message, "Couldn't find city.");
        assert_eq!(state.grid().map(DailySeries::len), Some(7));
        assert_eq!(state.visible_error(), None);
    }

    #[test]
    fn failure_without_a_prior_grid_shows_the_error() {
        let mut state = ViewState::default();

        let err = WidgetError::CoordFetch(ClientError::NoMatch);
        update(&mut state, ViewMsg::ChainResolved(Err(err)));

        assert_eq!(
            state.visible_error(),
            Some("Couldn't fetch weather data with given input values.")
        );
    }

    #[tokio::test]
    async fn startup_fetches_the_default_forecast_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "52.52"))
            .and(query_param("longitude", "13.41"))
            .respond_with(ResponseTemplate::new(200).set_body_json(daily_body(7)))
            .expect(1)
            .mount(&server)
            .await;

        let geocoder =
            GeocodingClient::with_base_url("key".to_string(), format!("{}/x", server.uri()));
        let forecast = ForecastClient::with_base_url(format!("{}/v1/forecast", server.uri()));
        let mut view = ForecastView::new(geocoder, forecast);

        view.start().await;

        let grid = view.state().grid().expect("grid present");
        assert_eq!(grid.len(), 7);
        let first = grid.day(0).expect("day 0");
        assert_eq!(day_label(0, first.date), "Today");
        assert!(view.state().initialized);
    }

    #[tokio::test]
    async fn failed_startup_shows_the_default_fetch_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let geocoder =
            GeocodingClient::with_base_url("key".to_string(), format!("{}/x", server.uri()));
        let forecast = ForecastClient::with_base_url(format!("{}/v1/forecast", server.uri()));
        let mut view = ForecastView::new(geocoder, forecast);

        view.start().await;

        assert_eq!(
            view.state().visible_error(),
            Some("Couldn't fetch default weather data.")
        );
        assert!(view.state().initialized);
    }

    #[tokio::test]
    async fn chain_resolves_city_coordinates_then_fetches_them() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/geocoding"))
            .and(query_param("city", "Paris"))
            .and(query_param("country", "Germany"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "latitude": 48.8589, "longitude": 2.32 }
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "48.8589"))
            .and(query_param("longitude", "2.32"))
            .respond_with(ResponseTemplate::new(200).set_body_json(daily_body(7)))
            .expect(1)
            .mount(&server)
            .await;

        let geocoder = GeocodingClient::with_base_url(
            "key".to_string(),
            format!("{}/v1/geocoding", server.uri()),
        );
        let forecast = ForecastClient::with_base_url(format!("{}/v1/forecast", server.uri()));

        let location = Location {
            city: "Paris".to_string(),
            country: "Germany".to_string(),
        };
        let result = resolve_and_fetch(&geocoder, &forecast, &location).await;

        assert_eq!(result.expect("chain succeeds").daily.len(), 7);
    }

    #[tokio::test]
    async fn lookup_failure_maps_to_the_city_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/geocoding"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let geocoder = GeocodingClient::with_base_url(
            "key".to_string(),
            format!("{}/v1/geocoding", server.uri()),
        );
        let forecast = ForecastClient::with_base_url(format!("{}/v1/forecast", server.uri()));

        let err = resolve_and_fetch(&geocoder, &forecast, &Location::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Couldn't find city.");
    }

    #[tokio::test]
    async fn dispatched_chain_posts_its_result_back_to_the_view() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/geocoding"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "latitude": 48.8589, "longitude": 2.32 }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(daily_body(5)))
            .mount(&server)
            .await;

        let geocoder = GeocodingClient::with_base_url(
            "key".to_string(),
            format!("{}/v1/geocoding", server.uri()),
        );
        let forecast = ForecastClient::with_base_url(format!("{}/v1/forecast", server.uri()));
        let mut view = ForecastView::new(geocoder, forecast);
        view.state_mut().initialized = true;

        view.handle(ViewMsg::FetchDispatched(Location {
            city: "Paris".to_string(),
            country: "Germany".to_string(),
        }));

        let msg = loop {
            if let Some(msg) = view.try_next() {
                break msg;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        };
        view.handle(msg);

        assert_eq!(view.state().grid().map(DailySeries::len), Some(5));
        assert!(view.state().error_message.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn input_pipeline_debounces_then_dispatches_once() {
        let (geocoder, forecast) = unreachable_clients();
        let mut view = ForecastView::new(geocoder, forecast);
        view.state_mut().initialized = true;

        for prefix in ["P", "Pa", "Par", "Pari", "Paris"] {
            view.on_city_input(prefix.to_string());
        }
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }

        tokio::time::advance(Duration::from_millis(510)).await;
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }

        let msg = view.try_next().expect("city edit settled");
        assert!(matches!(&msg, ViewMsg::CitySettled(city) if city == "Paris"));
        view.handle(msg);
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }

        // Nothing dispatched until the chain quiet period elapses.
        assert!(view.try_next().is_none());

        tokio::time::advance(Duration::from_millis(1010)).await;
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }

        let msg = view.try_next().expect("fetch dispatched");
        match msg {
            ViewMsg::FetchDispatched(location) => {
                assert_eq!(location.city, "Paris");
                assert_eq!(location.country, "Germany");
            }
            other => panic!("expected dispatch, got {other:?}"),
        }
        assert!(view.try_next().is_none(), "dispatched exactly once");
    }
}
