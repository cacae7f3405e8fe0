use std::sync::Arc;

use serde_json::json;
use swapi_router::Configuration;
use swapi_router::Schema;
use swapi_router::axum_factory::main_router;
use swapi_router::axum_factory::serve;
use swapi_router::configuration::Server;
use swapi_router::test_harness::MockSearchEngine;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

#[tokio::test]
async fn serves_queries_until_shutdown() {
    let engine = MockSearchEngine::default();
    engine.insert(
        "swapi",
        [json!({ "name": "Luke Skywalker", "eyeColor": "blue" })],
    );
    let configuration = Configuration::builder()
        .server(Server::builder().path("/api").build())
        .build();
    let router = main_router(
        Arc::new(configuration),
        Schema::swapi().unwrap(),
        Arc::new(engine),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (shutdown, signal) = oneshot::channel::<()>();
    let server = tokio::spawn(serve(listener, router, async move {
        let _ = signal.await;
    }));

    let response = reqwest::Client::new()
        .post(format!("http://{address}/api"))
        .json(&json!({ "query": "{ allPeople { eyeColor } }" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.json::<serde_json::Value>().await.unwrap(),
        json!({ "data": { "allPeople": [{ "eyeColor": "blue" }] } })
    );

    shutdown.send(()).unwrap();
    server.await.unwrap().unwrap();
}
