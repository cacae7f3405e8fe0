use std::sync::Arc;

use insta::assert_json_snapshot;
use pretty_assertions::assert_eq;
use serde_json::json;
use swapi_router::Schema;
use swapi_router::configuration::Search;
use swapi_router::execute;
use swapi_router::graphql::Request;
use swapi_router::graphql::Response;
use swapi_router::import::ImportPipeline;
use swapi_router::test_harness::MockSearchEngine;

async fn import(engine: &Arc<MockSearchEngine>, people: usize) {
    let people = super::dataset().into_people().into_iter().take(people).collect();
    ImportPipeline::new(engine.clone(), "swapi", "person")
        .run(people)
        .await
        .unwrap();
}

async fn query(engine: &MockSearchEngine, query: &str) -> Response {
    execute(
        &Request::builder().query(query).build(),
        &Schema::swapi().unwrap(),
        engine,
        &Search::default(),
    )
    .await
}

#[tokio::test]
async fn imported_people_can_be_queried() {
    let engine = Arc::new(MockSearchEngine::default());
    import(&engine, 1).await;

    let response = query(&engine, "{ allPeople { name homeworld { name } } }").await;
    assert_eq!(
        serde_json::to_value(response).unwrap(),
        json!({
            "data": {
                "allPeople": [{ "name": "Luke Skywalker", "homeworld": { "name": "Tatooine" } }]
            }
        })
    );
}

#[tokio::test]
async fn nested_connections_are_queried_as_lists() {
    let engine = Arc::new(MockSearchEngine::default());
    import(&engine, 3).await;

    let response = query(
        &engine,
        r#"{
          allPeople {
            name
            mass
            species { name homeworld { name } }
            films { title }
            vehicles { name manufacturers }
          }
        }"#,
    )
    .await;

    assert_json_snapshot!(response, @r###"
    {
      "data": {
        "allPeople": [
          {
            "name": "Luke Skywalker",
            "mass": 77,
            "species": null,
            "films": [
              {
                "title": "A New Hope"
              },
              {
                "title": "The Empire Strikes Back"
              }
            ],
            "vehicles": [
              {
                "name": "Snowspeeder",
                "manufacturers": [
                  "Incom corporation"
                ]
              }
            ]
          },
          {
            "name": "C-3PO",
            "mass": 75,
            "species": {
              "name": "Droid",
              "homeworld": null
            },
            "films": [
              {
                "title": "A New Hope"
              }
            ],
            "vehicles": []
          },
          {
            "name": "Jabba Desilijic Tiure",
            "mass": 1358,
            "species": {
              "name": "Hutt",
              "homeworld": {
                "name": "Nal Hutta"
              }
            },
            "films": [
              {
                "title": "Return of the Jedi"
              }
            ],
            "vehicles": []
          }
        ]
      }
    }
    "###);
}

#[tokio::test]
async fn reimporting_replaces_the_index() {
    let engine = Arc::new(MockSearchEngine::default());
    import(&engine, 3).await;
    import(&engine, 2).await;

    assert_eq!(engine.documents("swapi").len(), 2);
}

#[tokio::test]
async fn empty_index() {
    let engine = Arc::new(MockSearchEngine::default());
    import(&engine, 0).await;

    let response = query(&engine, "{ allPeople { name } }").await;
    assert_eq!(
        serde_json::to_value(response).unwrap(),
        json!({ "data": { "allPeople": [] } })
    );
}
