//! Home and saved-cities flows against mocked weather and geolocation APIs.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use vejr_app::{home, saved, AppServices, HomeState, NoticeKind, SavedState};
use vejr_services::{MemoryKvStore, SqliteKvStore};
use vejr_weather::{BatchMode, IpLocator, NormalizeOptions, WeatherProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forecast_body(city: &str, country: &str) -> serde_json::Value {
    let mut list = Vec::new();
    for day in 1..=5 {
        for hour in (0..24).step_by(3) {
            let temp = if day == 1 && hour == 3 { 5.7 } else { 10.0 };
            list.push(serde_json::json!({
                "dt_txt": format!("2024-07-{:02} {:02}:00:00", day, hour),
                "main": {
                    "temp": temp, "feels_like": temp, "temp_min": temp - 1.0,
                    "temp_max": temp + 1.0, "pressure": 1012, "humidity": 70
                },
                "weather": [{ "main": "Clouds", "description": "scattered clouds" }],
                "wind": { "speed": 3.0 },
                "visibility": 10000
            }));
        }
    }
    serde_json::json!({ "list": list, "city": { "name": city, "country": country } })
}

fn current_body(name: &str, country: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "sys": { "country": country },
        "main": {
            "temp": 8.4, "feels_like": 6.0, "temp_min": 7.0,
            "temp_max": 9.0, "pressure": 1005, "humidity": 88
        },
        "weather": [{ "main": "Rain", "description": "light rain" }],
        "wind": { "speed": 6.2, "gust": 11.0 },
        "visibility": 9000
    })
}

fn services(server: &MockServer, mode: BatchMode) -> AppServices {
    let timeout = Duration::from_secs(5);
    let weather = WeatherProvider::new(&server.uri(), "key", timeout)
        .unwrap()
        .with_normalize_options(NormalizeOptions::default());
    let locator = IpLocator::new(&server.uri(), "token", timeout).unwrap();
    AppServices::new(weather, locator, Box::new(MemoryKvStore::new()), mode)
}

async fn mock_city(server: &MockServer, city: &str, country: &str) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", city))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(city, country)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_home_activation_resolves_and_fetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "city": "Aarhus" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "Aarhus"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("Aarhus", "DK")))
        .mount(&server)
        .await;

    let state = home::activate(&services(&server, BatchMode::Isolated), HomeState::default()).await;

    assert_eq!(state.city, "Aarhus");
    assert!(!state.loading);
    assert!(state.notice.is_none());
    let weather = state.weather.as_ref().unwrap();
    assert_eq!(weather.current.temperature_c, 5.7);
    assert_eq!(weather.forecast.len(), 5);
    assert_eq!(state.current_summary().unwrap().headline[0], "Temperatur: 6°C");
}

#[tokio::test]
async fn test_home_activation_without_location_does_not_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = home::activate(&services(&server, BatchMode::Isolated), HomeState::default()).await;

    assert!(state.city.is_empty());
    assert!(state.weather.is_none());
    let notice = state.notice.unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.message, "Could not fetch location information.");
}

#[tokio::test]
async fn test_search_unknown_city_clears_loading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404", "message": "city not found"
        })))
        .mount(&server)
        .await;

    let state = home::search(&services(&server, BatchMode::Isolated), HomeState::default(), "Atlantis").await;

    assert!(!state.loading);
    assert!(state.weather.is_none());
    assert_eq!(
        state.notice.unwrap().message,
        "Could not fetch weather information. Check the city name and try again."
    );
}

#[tokio::test]
async fn test_loading_is_visible_while_request_is_in_flight() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body("Oslo", "NO"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let services = services(&server, BatchMode::Isolated);
    let mut loading = services.watch_home_loading();
    assert!(!*loading.borrow());

    let search = tokio::spawn({
        let services = services.clone();
        async move { home::search(&services, HomeState::default(), "Oslo").await }
    });

    loading.changed().await.unwrap();
    assert!(*loading.borrow_and_update());

    let state = search.await.unwrap();
    assert!(state.weather.is_some());
    assert!(!state.loading);
    assert!(!*loading.borrow());
}

#[tokio::test]
async fn test_saved_loading_settles_after_batch() {
    let server = MockServer::start().await;
    mock_city(&server, "Oslo", "NO").await;

    let services = services(&server, BatchMode::Isolated);
    services.save_city("Oslo").await.unwrap();
    let loading = services.watch_saved_loading();

    let state = saved::activate(&services, SavedState::default()).await;
    assert_eq!(state.cards.len(), 1);
    assert!(!*loading.borrow());
    assert!(loading.has_changed().unwrap());
}

#[tokio::test]
async fn test_search_blank_city_does_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = home::search(&services(&server, BatchMode::Isolated), HomeState::default(), "   ").await;
    assert!(state.city.is_empty());
    assert!(state.notice.is_none());
}

#[tokio::test]
async fn test_save_current_city_notices() {
    let server = MockServer::start().await;
    let services = services(&server, BatchMode::Isolated);
    let state = HomeState {
        city: "Oslo".into(),
        ..HomeState::default()
    };

    let state = home::save_current_city(&services, state).await;
    let notice = state.notice.clone().unwrap();
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.message, "Oslo er blevet gemt.");

    let state = home::save_current_city(&services, state).await;
    let notice = state.notice.clone().unwrap();
    assert_eq!(notice.kind, NoticeKind::Info);
    assert_eq!(notice.message, "Oslo er allerede gemt.");

    assert_eq!(services.saved_cities().await.unwrap(), vec!["Oslo"]);
}

#[tokio::test]
async fn test_save_empty_city_is_rejected() {
    let server = MockServer::start().await;
    let services = services(&server, BatchMode::Isolated);

    let state = home::save_current_city(&services, HomeState::default()).await;
    assert_eq!(state.notice.unwrap().kind, NoticeKind::Error);
    assert!(services.saved_cities().await.unwrap().is_empty());
}

#[test]
fn test_toggle_details() {
    let state = home::toggle_details(HomeState::default());
    assert!(state.show_details);
    assert!(!home::toggle_details(state).show_details);
}

#[tokio::test]
async fn test_saved_activation_isolates_failures() {
    let server = MockServer::start().await;
    mock_city(&server, "Oslo", "NO").await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Bergen"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let services = services(&server, BatchMode::Isolated);
    services.save_city("Oslo").await.unwrap();
    services.save_city("Bergen").await.unwrap();

    let state = saved::activate(&services, SavedState::default()).await;

    assert!(!state.loading);
    assert_eq!(state.cities, vec!["Oslo", "Bergen"]);
    assert_eq!(state.cards.len(), 1);
    assert_eq!(state.cards[0].city, "Oslo");
    assert_eq!(state.cards[0].flag_url, "https://flagsapi.com/NO/shiny/64.png");
    assert_eq!(state.cards[0].summary.icon, "rain");
    assert_eq!(state.failed, vec!["Bergen"]);
    assert!(state.notice.is_none());
}

#[tokio::test]
async fn test_saved_activation_all_or_nothing() {
    let server = MockServer::start().await;
    mock_city(&server, "Oslo", "NO").await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Bergen"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let services = services(&server, BatchMode::AllOrNothing);
    services.save_city("Oslo").await.unwrap();
    services.save_city("Bergen").await.unwrap();

    let state = saved::activate(&services, SavedState::default()).await;

    assert!(!state.loading);
    assert!(state.cards.is_empty());
    assert_eq!(state.notice.unwrap().message, "Could not fetch weather data.");
}

#[tokio::test]
async fn test_saved_cards_follow_saved_order_and_names() {
    let server = MockServer::start().await;
    mock_city(&server, "Tromsø", "NO").await;
    mock_city(&server, "Aarhus", "DK").await;
    // provider capitalizes the name, so the saved key has no match
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "copenhagen"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Copenhagen", "DK")))
        .mount(&server)
        .await;

    let services = services(&server, BatchMode::Isolated);
    for city in ["Tromsø", "copenhagen", "Aarhus"] {
        services.save_city(city).await.unwrap();
    }

    let state = saved::activate(&services, SavedState::default()).await;

    let shown: Vec<&str> = state.cards.iter().map(|c| c.city.as_str()).collect();
    assert_eq!(shown, vec!["Tromsø", "Aarhus"]);
    assert!(state.failed.is_empty());
}

#[tokio::test]
async fn test_unsave_removes_card() {
    let server = MockServer::start().await;
    mock_city(&server, "Oslo", "NO").await;
    mock_city(&server, "Bergen", "NO").await;

    let services = services(&server, BatchMode::Isolated);
    services.save_city("Oslo").await.unwrap();
    services.save_city("Bergen").await.unwrap();

    let state = saved::activate(&services, SavedState::default()).await;
    assert_eq!(state.cards.len(), 2);

    let state = saved::unsave(&services, state, "Oslo").await;
    assert_eq!(state.cities, vec!["Bergen"]);
    assert_eq!(state.cards.len(), 1);
    assert_eq!(state.notice.unwrap().message, "Oslo has been removed.");
    assert_eq!(services.saved_cities().await.unwrap(), vec!["Bergen"]);
}

#[tokio::test]
async fn test_services_from_config() {
    let server = MockServer::start().await;
    mock_city(&server, "Oslo", "NO").await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = vejr_core::Config::default();
    config.weather.base_url = server.uri();
    config.weather.api_key = "key".into();
    config.geolocation.base_url = server.uri();
    config.storage.database_path = dir.path().join("vejr.db");

    let services = AppServices::from_config(&config).unwrap();
    services.save_city("Oslo").await.unwrap();

    let state = saved::activate(&services, SavedState::default()).await;
    assert_eq!(state.cards.len(), 1);

    // the list is on disk
    let reopened = vejr_services::SavedCityStore::new(
        SqliteKvStore::new(dir.path().join("vejr.db")).unwrap(),
    );
    assert_eq!(reopened.list().unwrap(), vec!["Oslo"]);
}
