use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use swapi_router::error::EngineError;
use swapi_router::import::ImportPipeline;
use swapi_router::import::bulk_entries;
use swapi_router::model::Person;
use swapi_router::projection::FieldPath;
use swapi_router::search::ElasticsearchClient;
use swapi_router::search::SearchClient;
use swapi_router::search::SearchRequest;
use swapi_router::search::fetch_documents;
use url::Url;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_json;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;

fn client(server: &MockServer) -> ElasticsearchClient {
    ElasticsearchClient::new(Url::parse(&server.uri()).unwrap(), None).unwrap()
}

fn search_request(source: &[&str]) -> SearchRequest {
    SearchRequest {
        index: "swapi".to_string(),
        document_type: "person".to_string(),
        source: source.iter().copied().map(FieldPath::from).collect(),
        size: Some(10_000),
    }
}

#[tokio::test]
async fn search_sends_the_source_filter() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/swapi/person/_search"))
        .and(body_json(json!({
            "_source": ["name", "homeworld.name"],
            "size": 10000
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 2,
            "timed_out": false,
            "hits": {
                "total": { "value": 2, "relation": "eq" },
                "max_score": 1.0,
                "hits": [
                    {
                        "_index": "swapi",
                        "_type": "person",
                        "_id": "1",
                        "_score": 1.0,
                        "_source": { "name": "C-3PO", "homeworld": { "name": "Tatooine" } }
                    },
                    {
                        "_index": "swapi",
                        "_type": "person",
                        "_id": "0",
                        "_score": 1.0,
                        "_source": { "name": "Luke Skywalker", "homeworld": { "name": "Tatooine" } }
                    }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let people: Vec<Person> = fetch_documents(
        &client(&server),
        search_request(&["name", "homeworld.name"]),
    )
    .await
    .unwrap();

    assert_eq!(
        serde_json::to_value(&people).unwrap(),
        json!([
            { "name": "C-3PO", "homeworld": { "name": "Tatooine" } },
            { "name": "Luke Skywalker", "homeworld": { "name": "Tatooine" } }
        ])
    );
}

#[tokio::test]
async fn search_without_hits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/swapi/person/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 1,
            "hits": { "total": { "value": 0, "relation": "eq" }, "hits": [] }
        })))
        .mount(&server)
        .await;

    let people: Vec<Person> = fetch_documents(&client(&server), search_request(&["name"]))
        .await
        .unwrap();
    assert!(people.is_empty());
}

#[tokio::test]
async fn engine_errors_carry_the_status_and_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/swapi/person/_search"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "root_cause": [],
                "type": "index_not_found_exception",
                "reason": "no such index [swapi]"
            },
            "status": 404
        })))
        .mount(&server)
        .await;

    let error = client(&server)
        .search(search_request(&["name"]))
        .await
        .unwrap_err();
    assert_eq!(
        error,
        EngineError::EngineRequestFailed {
            operation: "search".to_string(),
            status_code: Some(404),
            reason: "no such index [swapi]".to_string(),
        }
    );
}

#[tokio::test]
async fn undecodable_responses_are_request_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/swapi/person/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let error = client(&server)
        .search(search_request(&["name"]))
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        EngineError::EngineRequestFailed {
            status_code: Some(200),
            ..
        }
    ));
}

#[tokio::test]
async fn deleting_a_missing_index_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/swapi"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "type": "index_not_found_exception", "reason": "no such index [swapi]" },
            "status": 404
        })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).delete_index("swapi").await.unwrap();
}

#[tokio::test]
async fn index_creation_failures() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/swapi"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "type": "resource_already_exists_exception",
                "reason": "index [swapi/abc] already exists"
            },
            "status": 400
        })))
        .mount(&server)
        .await;

    let error = client(&server).create_index("swapi").await.unwrap_err();
    assert_eq!(
        error.to_string(),
        "search engine request 'create_index' failed: index [swapi/abc] already exists"
    );
}

#[tokio::test]
async fn bulk_sends_ndjson() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .and(query_param("refresh", "true"))
        .and(header("content-type", "application/x-ndjson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 30,
            "errors": false,
            "items": [
                { "index": { "_index": "swapi", "_id": "0", "status": 201 } },
                { "index": { "_index": "swapi", "_id": "1", "status": 201 } },
                { "index": { "_index": "swapi", "_id": "2", "status": 201 } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entries = bulk_entries("swapi", "person", super::dataset().into_people()).unwrap();
    let written = client(&server)
        .bulk(&entries)
        .await
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(written, 3);

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.ends_with('\n'));
    let lines: Vec<serde_json::Value> = body
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(
        lines[2],
        json!({ "index": { "_index": "swapi", "_type": "person", "_id": 1 } })
    );
    assert_eq!(lines[3]["name"], json!("C-3PO"));
    assert!(lines[3].get("filmConnection").is_none());
    assert_eq!(lines[3]["films"][0]["title"], json!("A New Hope"));
}

#[tokio::test]
async fn bulk_item_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 30,
            "errors": true,
            "items": [
                { "index": { "_id": "0", "status": 201 } },
                { "index": { "_id": "1", "status": 400, "error": {
                    "type": "mapper_parsing_exception",
                    "reason": "failed to parse field [height]"
                } } },
                { "index": { "_id": "2", "status": 201 } }
            ]
        })))
        .mount(&server)
        .await;

    let entries = bulk_entries("swapi", "person", super::dataset().into_people()).unwrap();
    let error = client(&server)
        .bulk(&entries)
        .await
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "search engine request 'bulk' failed: 1 of 3 items failed, first: failed to parse field [height]"
    );
}

#[tokio::test]
async fn import_resets_the_index_then_writes() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/swapi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/swapi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "acknowledged": true,
            "shards_acknowledged": true,
            "index": "swapi"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 30,
            "errors": false,
            "items": [
                { "index": { "_id": "0", "status": 201 } },
                { "index": { "_id": "1", "status": 201 } },
                { "index": { "_id": "2", "status": 201 } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let summary = ImportPipeline::new(Arc::new(client(&server)), "swapi", "person")
        .run(super::dataset().into_people())
        .await
        .unwrap();
    assert_eq!(summary.documents, 3);

    let methods: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| request.method.to_string())
        .collect();
    assert_eq!(methods, vec!["DELETE", "PUT", "POST"]);
}

#[tokio::test]
async fn empty_imports_send_no_bulk_request() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/swapi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/swapi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "type": "action_request_validation_exception",
                "reason": "Validation Failed: 1: no requests added;"
            },
            "status": 400
        })))
        .expect(0)
        .mount(&server)
        .await;

    let summary = ImportPipeline::new(Arc::new(client(&server)), "swapi", "person")
        .run(Vec::new())
        .await
        .unwrap();
    assert_eq!(summary.documents, 0);
}

#[tokio::test]
async fn unreachable_engine() {
    // bind then release a port so nothing listens on it
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let client =
        ElasticsearchClient::new(Url::parse(&format!("http://{address}")).unwrap(), None).unwrap();
    let error = client.delete_index("swapi").await.unwrap_err();
    assert!(matches!(error, EngineError::EngineUnavailable { .. }));
}

#[tokio::test]
async fn timeouts_make_the_engine_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/swapi"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = ElasticsearchClient::new(
        Url::parse(&server.uri()).unwrap(),
        Some(Duration::from_millis(100)),
    )
    .unwrap();
    let error = client.create_index("swapi").await.unwrap_err();
    assert!(matches!(error, EngineError::EngineUnavailable { .. }));
}
