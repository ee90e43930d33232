use std::net::{SocketAddr, TcpListener};

use roster::{Error, Router, Server};

#[tokio::test]
async fn returns_once_shutdown_resolves() {
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let res = Server::bind(addr).serve_until(Router::new(), async {}).await;
    assert!(res.is_ok());
}

#[tokio::test]
async fn reports_the_address_it_could_not_bind() {
    let taken = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap();

    let err = Server::bind(addr)
        .serve_until(Router::new(), async {})
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Bind { addr: a, .. } if a == addr));
    assert!(err.to_string().starts_with(&format!("failed to bind {addr}")));
}

async fn raw_exchange(addr: SocketAddr, request: &str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut stream = loop {
        match tokio::net::TcpStream::connect(addr).await {
            Ok(stream) => break stream,
            Err(_) => tokio::time::sleep(std::time::Duration::from_millis(10)).await,
        }
    };
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await.unwrap();
    String::from_utf8_lossy(&reply).into_owned()
}

#[tokio::test]
async fn oversized_body_is_refused_with_413() {
    let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(
        Server::bind(addr)
            .body_limit(16)
            .serve_until(Router::new(), async move { stopped.await.ok(); }),
    );

    let body = "x".repeat(64);
    let request = format!(
        "POST /users HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\ncontent-length: {}\r\n\r\n{body}",
        body.len(),
    );
    let reply = tokio::time::timeout(std::time::Duration::from_secs(5), raw_exchange(addr, &request))
        .await
        .unwrap();
    assert!(reply.starts_with("HTTP/1.1 413"), "{reply}");

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}
