use crate::{
    application::app::Application,
    domain::{errors::ReadMessageError, models::MessageResponse},
};
use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use url::form_urlencoded;

pub fn router<A>(app: Arc<A>) -> Router
where
    A: Application + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/api/messages/read",
            get(read_message_query::<A>).post(read_message_form::<A>),
        )
        .route("/health", get(|| async { "ok" }))
        .with_state(app)
        .layer(CorsLayer::permissive())
}

pub async fn start_server(
    shutdown: broadcast::Sender<()>,
    app: Arc<impl Application + Send + Sync + 'static>,
    address: SocketAddr,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;

    let server = axum::serve(listener, router(app));

    tracing::info!("API server started on {}", address);

    let mut shutdown_rx = shutdown.subscribe();

    tokio::select! {
        _ = shutdown_rx.recv() => {
            tracing::warn!("API server received shutdown signal");
        }
        result = server => {
            if let Err(e) = result {
                tracing::error!("API server error: {:?}", e);
            }
            tracing::warn!("API server stopped unexpectedly");
        }
    }

    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ReadMessageParams {
    transaction: Option<String>,
    secret_phrase: Option<String>,
}

impl ReadMessageParams {
    /// Collects the parameters from url-encoded sources, in order. The first value of a
    /// repeated parameter wins and unknown parameters are ignored.
    fn parse(sources: &[&[u8]]) -> Self {
        let mut params = Self::default();
        for (key, value) in sources
            .iter()
            .flat_map(|source| form_urlencoded::parse(source))
        {
            let slot = match key.as_ref() {
                "transaction" => &mut params.transaction,
                "secretPhrase" => &mut params.secret_phrase,
                _ => continue,
            };
            slot.get_or_insert_with(|| value.into_owned());
        }
        params
    }
}

/// Error body in the node API convention.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_code: u8,
    pub error_description: String,
}

impl IntoResponse for ReadMessageError {
    fn into_response(self) -> Response {
        let (status, error_code, description) = match self {
            ReadMessageError::MissingParameter => {
                (StatusCode::BAD_REQUEST, 3, "\"transaction\" not specified")
            }
            ReadMessageError::MalformedParameter(_) => {
                (StatusCode::BAD_REQUEST, 4, "Incorrect \"transaction\"")
            }
            ReadMessageError::TransactionNotFound(_) => {
                (StatusCode::NOT_FOUND, 5, "Unknown transaction")
            }
            ReadMessageError::NoMessagePresent(_) => {
                (StatusCode::NOT_FOUND, 8, "No attached message found")
            }
        };
        let body = ErrorResponse {
            error_code,
            error_description: description.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn read_message_query<A: Application>(
    State(app_state): State<Arc<A>>,
    RawQuery(query): RawQuery,
) -> Result<Json<MessageResponse>, ReadMessageError> {
    let params = ReadMessageParams::parse(&[query.unwrap_or_default().as_bytes()]);
    read_message(app_state.as_ref(), params).await
}

/// Query string parameters take precedence over the form body, whatever its content type.
async fn read_message_form<A: Application>(
    State(app_state): State<Arc<A>>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Result<Json<MessageResponse>, ReadMessageError> {
    let query = query.unwrap_or_default();
    let params = ReadMessageParams::parse(&[query.as_bytes(), &body[..]]);
    read_message(app_state.as_ref(), params).await
}

async fn read_message<A: Application>(
    app_state: &A,
    params: ReadMessageParams,
) -> Result<Json<MessageResponse>, ReadMessageError> {
    app_state
        .read_message(params.transaction.as_deref(), params.secret_phrase.as_deref())
        .await
        .map(Json)
        .map_err(|e| {
            tracing::info!("Read message rejected: {}", e);
            e
        })
}
