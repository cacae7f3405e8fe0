//! The HTTP surface: `POST {server.path}` with a GraphQL request body.

use std::future::Future;
use std::sync::Arc;

use axum::Extension;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::post;
use http::StatusCode;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::configuration::Configuration;
use crate::execution::execute;
use crate::graphql;
use crate::search::SearchClient;
use crate::spec::Schema;

#[derive(Clone)]
struct RouterState {
    schema: Schema,
    client: Arc<dyn SearchClient>,
    configuration: Arc<Configuration>,
}

/// Builds the router serving GraphQL requests on `configuration.server.path`.
pub fn main_router(
    configuration: Arc<Configuration>,
    schema: Schema,
    client: Arc<dyn SearchClient>,
) -> axum::Router {
    let path = configuration.server.path.clone();
    axum::Router::new()
        .route(&path, post(handle_graphql))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(RouterState {
            schema,
            client,
            configuration,
        }))
}

/// Serves `router` on `listener` until `shutdown` completes.
pub async fn serve<F>(
    listener: TcpListener,
    router: axum::Router,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!("GraphQL endpoint exposed at http://{}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn handle_graphql(
    Extension(state): Extension<RouterState>,
    request: Result<Json<graphql::Request>, JsonRejection>,
) -> impl IntoResponse {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "invalid GraphQL request body");
            let error = graphql::Error::builder()
                .message(format!("invalid GraphQL request: {}", rejection.body_text()))
                .extension_code("INVALID_GRAPHQL_REQUEST")
                .build();
            return (
                StatusCode::BAD_REQUEST,
                Json(graphql::Response::from_errors(vec![error])),
            );
        }
    };

    let response = execute(
        &request,
        &state.schema,
        state.client.as_ref(),
        &state.configuration.search,
    )
    .await;
    let status = if response.is_request_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (status, Json(response))
}
