use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Request, State, multipart::MultipartRejection},
    http::{HeaderValue, Method, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use kubecheck_k8s_backend::{ConnectionResult, ProbeOptions, parse_kubeconfig, probe_all};

use crate::constants::{CONNECT_PATH, KUBEFILE_FIELD, MAX_UPLOAD_BYTES};
use crate::error::RequestError;

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub probe_options: ProbeOptions,
    /// Origin allowed by CORS on the upload route. `None` leaves CORS headers off entirely.
    pub allowed_origin: Option<HeaderValue>,
}

pub fn app(state: AppState) -> Router {
    let mut connect = post(connect_clusters).fallback(method_not_allowed);

    if let Some(origin) = state.allowed_origin.clone() {
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::POST])
            .allow_headers([header::CONTENT_TYPE]);
        connect = connect
            .layer(cors)
            .layer(middleware::from_fn(reject_plain_options));
    }

    Router::new()
        .route("/", get(index))
        .route(CONNECT_PATH, connect)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

// `CorsLayer` answers every OPTIONS request itself. Only a real preflight may reach it; any
// other OPTIONS is an ordinary non-POST request.
async fn reject_plain_options(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS
        && !request
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
    {
        return RequestError::MethodNotAllowed.into_response();
    }

    next.run(request).await
}

async fn index() -> &'static str {
    "kubecheck is running"
}

async fn method_not_allowed() -> RequestError {
    RequestError::MethodNotAllowed
}

/// Probe every context of the uploaded kubeconfig.
///
/// Request-level problems (form, file, kubeconfig) are returned as errors. Per-context failures
/// are not: they become entries with `connected: false` and the response is still a 200.
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
async fn connect_clusters(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<ConnectionResult>>, RequestError> {
    let multipart = multipart.map_err(RequestError::form_rejection)?;
    let data = read_kubefile(multipart).await?;
    tracing::info!("Received kubeconfig upload of {} bytes.", data.len());

    let kubeconfig = parse_kubeconfig(&data)?;
    let results = probe_all(&kubeconfig, &state.probe_options).await;

    Ok(Json(results))
}

// Skip over any other fields until `kubefile` turns up. The rest of the form must still parse.
async fn read_kubefile(mut multipart: Multipart) -> Result<Bytes, RequestError> {
    let mut kubefile = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(RequestError::form_error)?
    {
        if kubefile.is_none() && field.name() == Some(KUBEFILE_FIELD) {
            kubefile = Some(field.bytes().await.map_err(RequestError::read_error)?);
            continue;
        }
        tracing::debug!("Ignoring form field {:?}.", field.name());
    }

    kubefile.ok_or_else(|| {
        RequestError::MissingFile(format!("no `{}` field in form", KUBEFILE_FIELD))
    })
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received.");
}
