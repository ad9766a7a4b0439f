//! Backend over HTTP, with a blocking client.

use std::time::Duration;

use aqi::{AirQualityReading, HistoryEntry, HistoryRecord};
use reqwest::blocking::{Client, Response};
use serde_json::Value;

use super::{Backend, BackendError, HISTORY_PATH, READING_PATH};

/// Settings for connecting to the backend.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Scheme, host and port of the backend, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,
    /// Timeout for each request.
    pub timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Handle to the backend's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(settings: HttpSettings) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| BackendError::Transport {
                endpoint: READING_PATH,
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn a sent request into a successful response, or the error it amounts to.
fn checked(
    endpoint: &'static str,
    sent: reqwest::Result<Response>,
) -> Result<Response, BackendError> {
    let response = sent.map_err(|e| BackendError::Transport {
        endpoint,
        message: e.to_string(),
    })?;
    let status = response.status();
    if !status.is_success() {
        return Err(BackendError::Status {
            endpoint,
            status: status.as_u16(),
        });
    }
    Ok(response)
}

fn decode_error(endpoint: &'static str) -> impl Fn(reqwest::Error) -> BackendError {
    move |e| BackendError::Decode {
        endpoint,
        message: e.to_string(),
    }
}

impl Backend for HttpBackend {
    fn fetch_reading(&self, lat: f64, lon: f64) -> Result<AirQualityReading, BackendError> {
        let url = self.url(READING_PATH);
        tracing::debug!("GET {url} lat={lat} lon={lon}");
        let sent = self
            .client
            .get(&url)
            .query(&[("lat", lat), ("lon", lon)])
            .send();
        checked(READING_PATH, sent)?
            .json()
            .map_err(decode_error(READING_PATH))
    }

    fn append_history(&self, record: &HistoryRecord) -> Result<(), BackendError> {
        let url = self.url(HISTORY_PATH);
        tracing::debug!("POST {url}");
        let response = checked(HISTORY_PATH, self.client.post(&url).json(record).send())?;
        // The body is informational only.
        match response.text() {
            Ok(body) => tracing::debug!("history saved: {body}"),
            Err(e) => tracing::debug!("history saved, body unreadable: {e}"),
        }
        Ok(())
    }

    fn list_history(&self) -> Result<Vec<HistoryEntry>, BackendError> {
        let url = self.url(HISTORY_PATH);
        tracing::debug!("GET {url}");
        let body: Value = checked(HISTORY_PATH, self.client.get(&url).send())?
            .json()
            .map_err(decode_error(HISTORY_PATH))?;
        // Anything but an array is an empty history.
        let Value::Array(items) = body else {
            tracing::warn!("history listing is not an array; treating as empty");
            return Ok(Vec::new());
        };
        items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()
            .map_err(|e| BackendError::Decode {
                endpoint: HISTORY_PATH,
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    use super::*;

    /// Serve a single HTTP response on a local port.
    /// The join handle yields the request line and body that were received.
    fn serve_once(status: &str, body: &str) -> (String, JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut content_length = 0;
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                let header = header.trim_end();
                if header.is_empty() {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).unwrap();
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            (
                request_line.trim_end().to_owned(),
                String::from_utf8(request_body).unwrap(),
            )
        });
        (format!("http://{addr}/"), handle)
    }

    fn backend(base_url: String) -> HttpBackend {
        HttpBackend::new(HttpSettings {
            base_url,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn fetches_reading() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"aqi": 75, "estado": "Regular", "contaminantes": {"CO": 400}, "ultima_actualizacion": null}"#,
        );
        let reading = backend(url).fetch_reading(19.5, -99.25).unwrap();
        let (request, _) = server.join().unwrap();
        assert_eq!(request, "GET /api/waqi?lat=19.5&lon=-99.25 HTTP/1.1");
        assert_eq!(reading.aqi, Some(75.0));
        assert_eq!(reading.pollutants.len(), 1);
    }

    #[test]
    fn non_success_status_is_an_error() {
        let (url, server) = serve_once("404 Not Found", r#"{"estado": "Datos no disponibles"}"#);
        let err = backend(url).fetch_reading(0.0, 0.0).unwrap_err();
        server.join().unwrap();
        assert_eq!(
            err,
            BackendError::Status {
                endpoint: READING_PATH,
                status: 404
            }
        );
    }

    #[test]
    fn malformed_reading_is_a_decode_error() {
        let (url, server) = serve_once("200 OK", "not json");
        let err = backend(url).fetch_reading(0.0, 0.0).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, BackendError::Decode { endpoint: READING_PATH, .. }));
    }

    #[test]
    fn posts_history_record() {
        let (url, server) = serve_once("201 Created", r#"{"ok": true}"#);
        let record = HistoryRecord::new(1.5, 2.5, Some("Here"), &AirQualityReading::default());
        backend(url).append_history(&record).unwrap();
        let (request, body) = server.join().unwrap();
        assert_eq!(request, "POST /api/historial HTTP/1.1");
        let sent: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(sent["ciudad"], "Here");
        assert_eq!(sent["estado"], "N/A");
        assert_eq!(sent["lat"], 1.5);
    }

    #[test]
    fn lists_history() {
        let (url, server) = serve_once(
            "200 OK",
            r#"[{"fecha_consulta": "2024-01-01", "ciudad": "A", "aqi": 10, "estado": "Buena", "lat": 1, "lon": 2}]"#,
        );
        let history = backend(url).list_history().unwrap();
        server.join().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].city.as_deref(), Some("A"));
    }

    #[test]
    fn non_array_history_is_empty() {
        let (url, server) = serve_once("200 OK", r#"{"error": "nope"}"#);
        let history = backend(url).list_history().unwrap();
        server.join().unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn unreachable_backend_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = backend(format!("http://{addr}"))
            .list_history()
            .unwrap_err();
        assert!(matches!(err, BackendError::Transport { endpoint: HISTORY_PATH, .. }));
    }
}
