use std::time::Duration;

use osis_snr::client::{HttpPredictor, Predictor, PredictorConfig};
use osis_snr::domain::{PhysicalInputs, PredictionRequest};
use osis_snr::error::PredictError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve exactly one canned HTTP response and hand back the request body.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let content_length = headers
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .map(|v| v.trim().parse::<usize>().unwrap())
            .unwrap_or(0);
        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        String::from_utf8_lossy(&buf[header_end..]).into_owned()
    });

    (base_url, handle)
}

fn predictor(base_url: String) -> HttpPredictor {
    HttpPredictor::new(&PredictorConfig {
        base_url,
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn request() -> PredictionRequest {
    PredictionRequest::from_inputs(PhysicalInputs::default()).unwrap()
}

#[tokio::test]
async fn posts_wire_body_and_decodes_response() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"predicted_snr_db": 41.25, "physics_snr_db": 37.0, "ml_residual_db": 4.25}"#,
    )
    .await;

    let response = predictor(url).predict(&request()).await.unwrap();
    assert_eq!(response.predicted_snr_db, 41.25);
    assert_eq!(response.physics_snr_db, 37.0);
    assert_eq!(response.ml_residual_db, 4.25);

    let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
    let body = sent.as_object().unwrap();
    assert_eq!(body.len(), 15);
    assert_eq!(body["laser_wavelength_nm"].as_u64(), Some(405));
    assert_eq!(body["layer_count"].as_u64(), Some(1));
    assert_eq!(body["recording_material"], "GST_HTL");
    assert_eq!(body["prml_enabled"].as_u64(), Some(1));
    assert_eq!(body["ctc_enabled"].as_u64(), Some(1));
    let spot = body["spot_size_nm"].as_f64().unwrap();
    assert!((spot - 0.61 * 405.0 / 0.85).abs() < 1e-9);
}

#[tokio::test]
async fn server_error_is_transport_failure() {
    let (url, server) = serve_once("500 Internal Server Error", r#"{"detail": "boom"}"#).await;

    let err = predictor(url).predict(&request()).await.unwrap_err();
    assert!(matches!(err, PredictError::Transport(ref msg) if msg.contains("500")), "{err:?}");
    server.await.unwrap();
}

#[tokio::test]
async fn malformed_body_is_decode_failure() {
    let (url, server) = serve_once("200 OK", r#"{"predicted_snr_db": "high"}"#).await;

    let err = predictor(url).predict(&request()).await.unwrap_err();
    assert!(matches!(err, PredictError::Decode(_)), "{err:?}");
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_service_is_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = predictor(url).predict(&request()).await.unwrap_err();
    assert!(err.is_remote());
    assert!(matches!(err, PredictError::Transport(_)), "{err:?}");
}
