//! HTTP source against a canned local backend.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use fitdash::app::pipeline::load_dashboard;
use fitdash::config::{DataConfig, SourceMode};
use fitdash::data::{DataFetcher, DataSource, HttpSource, StalePolicy};
use fitdash::domain::{DatasetKind, UserId};
use fitdash::error::{AppError, FetchError};
use url::Url;

type Route = (&'static str, u16, &'static str);

/// Serves `routes` (path, status, body) until the test process exits.
/// Unknown paths get a 404. Returns the base URL and the requested paths,
/// each recorded before its response is written.
fn serve(routes: Vec<Route>) -> (Url, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            respond(stream, &routes, &log);
        }
    });

    let base = Url::parse(&format!("http://{addr}/user")).unwrap();
    (base, seen)
}

fn respond(mut stream: TcpStream, routes: &[Route], log: &Mutex<Vec<String>>) -> Option<()> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).ok()? == 0 || header == "\r\n" {
            break;
        }
    }

    let path = request_line.split_whitespace().nth(1)?.to_string();
    log.lock().ok()?.push(path.clone());
    let (status, body) = routes
        .iter()
        .find(|(p, _, _)| *p == path)
        .map(|&(_, status, body)| (status, body))
        .unwrap_or((404, "Not Found"));
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).ok()
}

fn fetcher(base: Url) -> DataFetcher {
    DataFetcher::new(DataSource::Http(HttpSource::new(base).unwrap()))
}

const PROFILE_12: &str = r#"{"data":{"id":12,"userInfos":{"firstName":"Karl","lastName":"Dovineau","age":31},"todayScore":0.12,"keyData":{"calorieCount":1930,"proteinCount":155,"carbohydrateCount":290,"lipidCount":50}}}"#;
const ACTIVITY_12: &str = r#"{"data":{"userId":12,"sessions":[{"day":"2020-07-01","kilogram":80,"calories":240},{"day":"2020-07-02","kilogram":80,"calories":220},{"day":"2020-07-01","calories":10}]}}"#;
const SESSIONS_12: &str = r#"{"data":{"userId":12,"sessions":[{"day":1,"sessionLength":"30 min"},{"day":2,"sessionLength":23}]}}"#;
const PERFORMANCE_12: &str = r#"{"data":{"userId":12,"kind":{"1":"cardio","2":"energy"},"data":[{"value":80,"kind":1},{"value":120,"kind":2}]}}"#;

#[test]
fn profile_envelope_is_unwrapped() {
    let (base, seen) = serve(vec![("/user/12", 200, PROFILE_12)]);
    let profile = fetcher(base).profile(UserId(12)).unwrap();
    assert_eq!(profile.id, 12);
    assert_eq!(profile.user_infos.first_name, "Karl");
    assert_eq!(profile.key_data.calorie_count, 1930);
    assert_eq!(*seen.lock().unwrap(), vec!["/user/12".to_string()]);
}

#[test]
fn bare_profile_body_is_accepted() {
    let bare = r#"{"id":18,"userInfos":{"firstName":"Cecilia","lastName":"Ratorez","age":34},"score":0.3,"keyData":{"calorieCount":2500,"proteinCount":90,"carbohydrateCount":150,"lipidCount":120}}"#;
    let (base, _) = serve(vec![("/user/18", 200, bare)]);
    let profile = fetcher(base).profile(UserId(18)).unwrap();
    assert_eq!(profile.today_score, 0.3);
}

#[test]
fn sub_resources_use_their_paths() {
    let (base, seen) = serve(vec![
        ("/user/12/activity", 200, ACTIVITY_12),
        ("/user/12/average-sessions", 200, SESSIONS_12),
        ("/user/12/performance", 200, PERFORMANCE_12),
    ]);
    let f = fetcher(base);

    let days = f.activity(UserId(12)).unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].day, "2020-07-01");
    assert_eq!(days[0].calories, 250.0);
    assert_eq!(days[0].kilograms, 80.0);

    let sessions = f.average_sessions(UserId(12)).unwrap();
    assert_eq!(sessions.iter().map(|s| s.session_length).collect::<Vec<_>>(), vec![30, 23]);

    let perf = f.performance(UserId(12)).unwrap();
    assert_eq!(perf.data.len(), 2);
    assert_eq!(perf.kind_name(&perf.data[1]), Some("energy"));

    let mut paths = seen.lock().unwrap().clone();
    paths.sort();
    assert_eq!(
        paths,
        vec!["/user/12/activity", "/user/12/average-sessions", "/user/12/performance"]
    );
}

#[test]
fn missing_user_is_not_found() {
    let (base, _) = serve(vec![]);
    let err = fetcher(base).profile(UserId(99)).unwrap_err();
    assert_eq!(
        err,
        FetchError::NotFound {
            kind: DatasetKind::Profile,
            user: UserId(99)
        }
    );
    assert_eq!(AppError::from(err).exit_code(), 3);
}

#[test]
fn null_payload_is_not_found() {
    let (base, _) = serve(vec![("/user/12", 200, r#"{"data":null}"#)]);
    let err = fetcher(base).profile(UserId(12)).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn server_error_is_a_network_error() {
    let (base, _) = serve(vec![("/user/12", 500, r#"{"error":"boom"}"#)]);
    let err = fetcher(base).profile(UserId(12)).unwrap_err();
    assert!(matches!(err, FetchError::Network(ref msg) if msg.contains("500")), "{err}");
}

#[test]
fn non_json_body_is_a_network_error() {
    let (base, _) = serve(vec![("/user/12", 200, "<html>maintenance</html>")]);
    let err = fetcher(base).profile(UserId(12)).unwrap_err();
    assert!(matches!(err, FetchError::Network(_)), "{err}");
}

#[test]
fn wrong_shape_is_a_decode_error() {
    let (base, _) = serve(vec![("/user/12/activity", 200, r#"{"data":{"userId":12}}"#)]);
    let err = fetcher(base).activity(UserId(12)).unwrap_err();
    assert!(matches!(err, FetchError::Decode { kind: DatasetKind::Activity, .. }), "{err}");
}

#[test]
fn unreachable_backend_is_a_network_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let base = Url::parse(&format!("http://{addr}/user")).unwrap();
    let err = fetcher(base).profile(UserId(12)).unwrap_err();
    assert!(matches!(err, FetchError::Network(_)), "{err}");
    assert_eq!(AppError::from(err).exit_code(), 4);
}

#[test]
fn dashboard_loads_over_http_with_partial_failure() {
    // No performance route: that view fails on its own.
    let (base, _) = serve(vec![
        ("/user/12", 200, PROFILE_12),
        ("/user/12/activity", 200, ACTIVITY_12),
        ("/user/12/average-sessions", 200, SESSIONS_12),
    ]);
    let config = DataConfig {
        source: SourceMode::Http { base: base.clone() },
        user: UserId(12),
        stale_policy: StalePolicy::LatestRequestWins,
    };
    let state = load_dashboard(Arc::new(fetcher(base)), &config).unwrap();

    assert_eq!(state.profile.value().map(|p| p.id), Some(12));
    assert_eq!(state.activity.value().map(Vec::len), Some(2));
    assert_eq!(state.sessions.value().map(Vec::len), Some(2));
    assert!(state.performance.error().is_some_and(FetchError::is_not_found));
    assert!(!state.all_failed());
}
