use redharvest::{
    backoff_delay, is_retryable_status, HttpError, HttpSession, Transport, DEFAULT_TIMEOUT_SECS,
    MAX_ATTEMPTS, RETRYABLE_STATUSES, USER_AGENTS,
};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

#[test]
fn retryable_statuses_are_rate_limit_and_transient_server_errors() {
    for status in RETRYABLE_STATUSES {
        assert!(is_retryable_status(status));
    }
    for status in [200, 301, 400, 401, 403, 404, 501] {
        assert!(!is_retryable_status(status), "{status} must not be retried");
    }
}

/// Base-2 geometric growth: each delay doubles the previous one.
#[test]
fn backoff_grows_geometrically() {
    assert_eq!(backoff_delay(1), Duration::from_secs(2));
    for attempt in 1..MAX_ATTEMPTS {
        assert_eq!(backoff_delay(attempt + 1), backoff_delay(attempt) * 2);
    }
}

#[test]
fn five_total_attempts() {
    assert_eq!(MAX_ATTEMPTS, 5);
    assert_eq!(DEFAULT_TIMEOUT_SECS, 10);
}

/// The session identity is drawn from the fixed pool and stays stable for
/// the session's lifetime.
#[test]
fn session_identity_comes_from_the_pool_and_is_stable() {
    let session = HttpSession::new(Duration::from_secs(1));
    let ua = session.user_agent().to_string();
    assert!(USER_AGENTS.contains(&ua.as_str()));
    assert_eq!(session.user_agent(), ua);
}

/// Answer `conns` connections with the given status line, counting each one.
/// `connection: close` forces a fresh connection per attempt.
fn serve_status(status_line: &'static str, conns: usize) -> (String, Arc<AtomicUsize>, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let handle = thread::spawn(move || {
        for _ in 0..conns {
            let Ok((mut stream, _)) = listener.accept() else { break };
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let response =
                format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
            let _ = stream.write_all(response.as_bytes());
        }
    });
    (format!("http://{addr}/listing.json"), hits, handle)
}

/// A persistently failing endpoint consumes exactly five attempts (the first
/// plus four retries) and surfaces the typed exhaustion error.
#[test]
fn transient_server_errors_consume_all_five_attempts() {
    let (url, hits, server) = serve_status("500 Internal Server Error", MAX_ATTEMPTS as usize);

    let session = HttpSession::new(Duration::from_secs(5)).without_retry_sleep();
    let err = session.get_json(&url, &[]).unwrap_err();

    assert!(matches!(err, HttpError::RetriesExhausted { attempts: MAX_ATTEMPTS, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), MAX_ATTEMPTS as usize);
    server.join().unwrap();
}

/// A non-retryable status fails on the first attempt, and the request carries
/// the User-Agent the session claims to use.
#[test]
fn non_retryable_status_fails_fast_with_the_session_identity() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 4096];
        let n = stream.read(&mut buf).unwrap_or(0);
        let _ = tx.send(String::from_utf8_lossy(&buf[..n]).into_owned());
        let _ = stream
            .write_all(b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
    });

    let session = HttpSession::new(Duration::from_secs(5)).without_retry_sleep();
    let err = session
        .get_json(&format!("http://{addr}/gone.json"), &[])
        .unwrap_err();

    assert!(matches!(err, HttpError::Status { status: 404, .. }));
    let request = rx.recv().unwrap().to_lowercase();
    assert!(request.contains(&format!("user-agent: {}", session.user_agent().to_lowercase())));
    server.join().unwrap();
}
