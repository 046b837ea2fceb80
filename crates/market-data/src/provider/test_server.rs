//! Minimal local HTTP server that answers with canned responses.

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A canned reply, chosen by the first route whose needle appears in the
/// request target. Unmatched requests get a 404.
#[derive(Clone, Copy)]
pub(crate) struct Route {
    pub needle: &'static str,
    pub status: u16,
    pub body: &'static str,
}

pub(crate) struct CannedServer {
    pub base_url: String,
    targets: Arc<Mutex<Vec<String>>>,
}

impl CannedServer {
    pub(crate) async fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let targets = Arc::new(Mutex::new(Vec::new()));
        let seen = targets.clone();

        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let routes = routes.clone();
                let seen = seen.clone();
                tokio::spawn(async move {
                    serve(socket, &routes, &seen).await;
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            targets,
        }
    }

    /// Request targets (path and query) in arrival order.
    pub(crate) fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

async fn serve(mut socket: TcpStream, routes: &[Route], seen: &Mutex<Vec<String>>) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }

    let head = String::from_utf8_lossy(&head);
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();
    seen.lock().unwrap().push(target.clone());

    let (status, body) = routes
        .iter()
        .find(|route| target.contains(route.needle))
        .map(|route| (route.status, route.body))
        .unwrap_or((404, r#"{"error":"not found"}"#));

    let response = format!(
        "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}
