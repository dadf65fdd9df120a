use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use study_planner::config::ServiceConfig;
use study_planner::models::{Subject, SubjectId, SubjectPayload, TimetableRequest};
use study_planner::{ClientError, HttpTimetableClient, ServiceReply, TimetableService};

/// One-shot HTTP server: answers a single request with `status` and `body`,
/// and hands back the raw request it received
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        request
    });

    (base_url, handle)
}

/// Read headers, then exactly Content-Length bytes of body
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(header_end) = find_header_end(&buf) {
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8(buf).unwrap()
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn client_for(base_url: String) -> HttpTimetableClient {
    HttpTimetableClient::from_config(&ServiceConfig {
        base_url,
        ..ServiceConfig::default()
    })
    .unwrap()
}

fn sample_request() -> TimetableRequest {
    let mut subject = Subject::new(SubjectId::new(1));
    subject.name = "Math".to_string();
    subject.exam_date = "2024-06-01".to_string();
    subject.set_chapters_text("Ch1\nCh2");
    TimetableRequest {
        subjects: vec![SubjectPayload::from(&subject)],
        study_hours_per_day: 5.0,
    }
}

#[tokio::test]
async fn test_posts_json_and_parses_timetable() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"timetable":[{"date":"2024-05-01","subject":"Math","chapter":"Ch1","hours":2}]}"#,
    )
    .await;

    let reply = client_for(base_url).generate(&sample_request()).await.unwrap();
    let request = server.await.unwrap();

    match reply {
        ServiceReply::Timetable(entries) => {
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].chapter, "Ch1");
            assert_eq!(entries[0].hours, 2.0);
        }
        other => panic!("expected timetable, got {:?}", other),
    }

    assert!(request.starts_with("POST /generate-timetable HTTP/1.1"));
    assert!(request.to_lowercase().contains("content-type: application/json"));
    let body = request.split("\r\n\r\n").nth(1).unwrap();
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "subjects": [{"name": "Math", "chapters": ["Ch1", "Ch2"], "examDate": "2024-06-01"}],
            "studyHoursPerDay": 5
        })
    );
}

#[tokio::test]
async fn test_error_body_is_a_rejection_even_on_400() {
    let (base_url, server) = serve_once("400 Bad Request", r#"{"error":"No subjects provided"}"#).await;
    let reply = client_for(base_url).generate(&sample_request()).await.unwrap();
    server.await.unwrap();
    assert_eq!(reply, ServiceReply::Rejected("No subjects provided".to_string()));
}

#[tokio::test]
async fn test_server_error_without_error_field() {
    let (base_url, server) = serve_once("500 Internal Server Error", r#"{"detail":"boom"}"#).await;
    let err = client_for(base_url).generate(&sample_request()).await.unwrap_err();
    server.await.unwrap();
    assert!(matches!(err, ClientError::Status { status: 500, ref message } if message == "boom"));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(format!("http://{}", addr))
        .generate(&sample_request())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert!(err.is_transport());
}
