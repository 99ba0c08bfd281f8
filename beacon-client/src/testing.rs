//! Test helpers shared by the client tests

use axum::Router;

/// Serves `router` on an ephemeral local port and returns its base URL
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("test listener address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });

    format!("http://{}", addr)
}
