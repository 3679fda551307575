use std::{io::Read, net::TcpListener, thread, time::Duration};

use chrono::FixedOffset;
use weather_core::{
    Coordinates, FetchError, IconCategory, OpenWeatherClient, UnitSystem, map_for_display,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE: &str = r#"{
    "coord": {"lon": 139.69, "lat": 35.69},
    "weather": [
        {"id": 600, "main": "Snow", "description": "light snow", "icon": "13n"},
        {"id": 701, "main": "Mist", "description": "mist", "icon": "50n"}
    ],
    "base": "stations",
    "main": {"temp": -1.0, "feels_like": -4.2, "temp_min": -2.5, "temp_max": 0.5, "pressure": 1020, "humidity": 93},
    "visibility": 4000,
    "wind": {"speed": 2.57, "deg": 320, "gust": 4.1},
    "clouds": {"all": 100},
    "dt": 1700050000,
    "sys": {"type": 2, "id": 268395, "country": "JP", "sunrise": 1700000000, "sunset": 1700037000},
    "timezone": 32400,
    "id": 1850144,
    "name": "Tokyo",
    "cod": 200
}"#;

#[tokio::test]
async fn fetch_then_map_is_deterministic() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FIXTURE, "application/json"))
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new(server.uri(), Duration::from_secs(5)).expect("client");
    let coords = Coordinates::new(35.69, 139.69).expect("valid");
    let tokyo = FixedOffset::east_opt(9 * 3600).expect("valid offset");

    let response = client.fetch(coords, UnitSystem::Metric, "KEY").await.expect("fetch");
    let first = map_for_display(&response, "JP", &tokyo, None);
    let second = map_for_display(&response, "JP", &tokyo, None);

    assert_eq!(first, second);
    assert_eq!(first.sunrise, "07:13");
    assert_eq!(first.sunset, "17:30");
    assert_eq!(first.temperature, "-1.0°C");
    assert_eq!(first.temp_min, "-2.5 min");
    assert_eq!(first.humidity, "93 per cent");
    assert_eq!(first.condition, "Snow");
    assert_eq!(first.icon, Some(IconCategory::Snow));
    assert_eq!(first.place, "Tokyo");
    assert_eq!(first.country, "JP");
}

#[tokio::test]
async fn connection_reset_is_a_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");

    // Accept one connection, read a little of the request, then drop it.
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 64];
            let _ = stream.read(&mut buf);
        }
    });

    let client =
        OpenWeatherClient::new(format!("http://{addr}"), Duration::from_secs(5)).expect("client");
    let coords = Coordinates::new(0.0, 0.0).expect("valid");

    let result = client.fetch(coords, UnitSystem::Metric, "KEY").await;

    assert!(matches!(result, Err(FetchError::NetworkFailure(_))));
}
