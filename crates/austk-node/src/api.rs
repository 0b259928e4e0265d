use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::Router;
use sha2::{Digest, Sha256};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use austk_art::constants::{
    PAYMENT_HASH_HEADER, PAYMENT_PREIMAGE_HEADER, PAYMENT_REQUIRED_BODY,
};
use austk_art::{Artist, Bolt11AmountMultiplier, PaymentHash};
use austk_lightning::{collect_resources, Publisher};
use austk_store::CatalogStore;

use crate::error::ApiError;

const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub publisher: Arc<dyn Publisher>,
    /// Price of one track in bits (1 bit = 100 satoshis).
    pub price_bits: u32,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_catalog))
        .route("/invoice/{artist}/{*track}", get(get_invoice))
        .route("/art/{artist}/{*track}", get(get_track))
        .route("/artist/{id}", put(put_artist))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /` — sign and return the current catalog as a serialized
/// `ArtistPublication`, so even a first-contact client can verify it offline.
async fn get_catalog(State(state): State<AppState>) -> Result<Response, ApiError> {
    let resources = collect_resources(state.store.as_ref()).await?;
    let publication = state.publisher.sign(&resources).await?;
    let body = publication.to_bytes()?;
    debug!(bytes = body.len(), "Served signed catalog");
    Ok(([(header::CONTENT_TYPE, OCTET_STREAM)], body).into_response())
}

/// `GET /invoice/{artist}/{track}` — mint a fresh invoice bound to the track
/// and persist it by payment hash so the `/art` handshake can find it.
async fn get_invoice(
    State(state): State<AppState>,
    Path((artist_id, artist_track_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let track = state.store.track(&artist_id, &artist_track_id).await?;
    let invoice = state
        .publisher
        .new_invoice(
            std::slice::from_ref(&track),
            state.price_bits,
            Bolt11AmountMultiplier::BitcoinBit,
        )
        .await?;
    state.store.store_invoice(&invoice).await?;
    info!(
        track = %track.full_id(),
        hash = %invoice.payment_hash,
        "Issued invoice"
    );
    Ok(([(header::CONTENT_TYPE, OCTET_STREAM)], invoice.to_bytes()?).into_response())
}

/// `GET /art/{artist}/{track}` — the payment-proof handshake. Possession of
/// the preimage is the whole proof of settlement; the node never asks the
/// payment network whether the invoice settled.
async fn get_track(
    State(state): State<AppState>,
    Path((artist_id, artist_track_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let Some(preimage_hex) = headers
        .get(PAYMENT_PREIMAGE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        return (StatusCode::PAYMENT_REQUIRED, PAYMENT_REQUIRED_BODY).into_response();
    };
    let Ok(preimage) = hex::decode(preimage_hex) else {
        return (StatusCode::BAD_REQUEST, "preimage is not hex").into_response();
    };

    let hash: [u8; 32] = Sha256::digest(&preimage).into();
    let payment_hash = PaymentHash(hash);
    // echoed on every reply from here on, success or failure
    let hash_header = [(PAYMENT_HASH_HEADER, payment_hash.to_hex())];

    let invoice = match state.store.invoice(&payment_hash).await {
        Ok(invoice) => invoice,
        Err(_) => {
            debug!(hash = %payment_hash, "No invoice for presented preimage");
            return (StatusCode::NOT_FOUND, hash_header, "unknown invoice").into_response();
        }
    };

    let track = match state.store.track(&artist_id, &artist_track_id).await {
        Ok(track) => track,
        Err(_) => {
            return (StatusCode::NOT_FOUND, hash_header, "unknown track").into_response();
        }
    };

    if !invoice.covers(&track.artist_id, &track.artist_track_id) {
        warn!(
            track = %track.full_id(),
            hash = %payment_hash,
            "Preimage presented for a track its invoice does not cover"
        );
        return (StatusCode::FORBIDDEN, hash_header, "invoice not for this track").into_response();
    }

    let path = match state.store.track_file_path(&track) {
        Ok(path) => path,
        Err(e) => {
            return (StatusCode::INTERNAL_SERVER_ERROR, hash_header, e.to_string())
                .into_response();
        }
    };
    match tokio::fs::read(&path).await {
        Ok(payload) => {
            info!(track = %track.full_id(), bytes = payload.len(), "Served paid track");
            (
                StatusCode::OK,
                hash_header,
                [(header::CONTENT_TYPE, "audio/mpeg")],
                payload,
            )
                .into_response()
        }
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Failed to read track payload");
            (StatusCode::INTERNAL_SERVER_ERROR, hash_header, "payload unavailable")
                .into_response()
        }
    }
}

/// `PUT /artist/{id}` — reserved; the body must at least parse.
async fn put_artist(Path(artist_id): Path<String>, body: Bytes) -> Response {
    let Ok(artist) = Artist::from_bytes(&body) else {
        return (StatusCode::BAD_REQUEST, "body is not an artist").into_response();
    };
    if artist.artist_id != artist_id {
        return (StatusCode::BAD_REQUEST, "artist id does not match path").into_response();
    }
    StatusCode::NOT_IMPLEMENTED.into_response()
}
