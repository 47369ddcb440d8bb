use axum::Router;
use reqwest::Url;
use tokio::net::TcpListener;

/// A URL on the test host with the given path and query.
#[track_caller]
pub(crate) fn page_url(path_and_query: &str) -> Url {
    Url::parse("http://localhost")
        .and_then(|base| base.join(path_and_query))
        .expect("Could not build test URL")
}

/// Serve `router` on an ephemeral port and return the server's base URL.
pub(crate) async fn spawn_server(router: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Could not bind test server");
    let address = listener
        .local_addr()
        .expect("Could not get test server address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    Url::parse(&format!("http://{address}/")).expect("Could not parse test server URL")
}
