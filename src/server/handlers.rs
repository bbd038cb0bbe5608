//! Request handlers for the art, minting, contract and notification
//! endpoints.

use super::{ApiError, AppState};
use crate::contract::{self, ContractKind};
use crate::generators::ProceduralGenerator;
use crate::metadata::{self, NftMetadata};
use crate::request::GenerationRequest;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// Complexity as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseInt {
    Number(i64),
    Text(String),
}

impl LooseInt {
    fn value(&self) -> Result<i64, ApiError> {
        match self {
            LooseInt::Number(n) => Ok(*n),
            LooseInt::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| ApiError::Validation(format!("complexity {s:?} is not a number"))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct GenerateBody {
    #[serde(default)]
    style: String,
    /// Missing, null or unknown names all resolve to the default palette.
    #[serde(default)]
    colors: Option<String>,
    complexity: Option<LooseInt>,
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MintBody {
    #[serde(default)]
    nft_id: String,
    #[serde(default)]
    wallet_address: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ContractBody {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    symbol: String,
}

pub(super) async fn health() -> &'static str {
    "ok"
}

pub(super) async fn generate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let complexity = body
        .complexity
        .as_ref()
        .ok_or_else(|| ApiError::Validation("complexity is required".to_string()))?
        .value()?;
    let colors = body.colors.as_deref().unwrap_or_default();
    let request = GenerationRequest::parse(&body.style, colors, complexity)?;

    let seed = body.seed.unwrap_or_else(rand::random);
    let id = metadata::generate_id(&mut rand::thread_rng());

    let artwork = tokio::task::spawn_blocking(move || ProceduralGenerator::new(request).artwork(seed))
        .await
        .map_err(|e| ApiError::Internal(format!("render task failed: {e}")))??;

    info!(%id, style = %request.style, palette = %request.palette, seed, "generated");
    state.gallery.insert(id.clone(), artwork.png).await;
    state
        .notifications
        .publish("🎨", format!("Generated {} NFT", request.style));

    Ok(Json(json!({
        "success": true,
        "data": {
            "id": id,
            "style": request.style.name(),
            "colors": request.palette.name(),
            "complexity": request.complexity.get(),
            "seed": seed,
            "imageUrl": format!("/api/nft/image/{id}"),
            "metadata": NftMetadata::for_request(&id, &request),
        }
    })))
}

pub(super) async fn image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let png = state
        .gallery
        .get(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("no image with id {id:?}")))?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png.as_ref().clone()))
}

pub(super) async fn mint(
    State(state): State<Arc<AppState>>,
    body: Result<Json<MintBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    match state.minter.mint(&body.nft_id, &body.wallet_address).await {
        Ok(receipt) => {
            state
                .notifications
                .publish("✅", format!("NFT minted! Token ID: #{}", receipt.token_id));
            Ok(Json(json!({
                "success": true,
                "transactionHash": receipt.transaction_hash,
                "tokenId": receipt.token_id,
            })))
        }
        Err(err) => {
            state
                .notifications
                .publish("❌", format!("Minting failed: {err}"));
            Err(err.into())
        }
    }
}

pub(super) async fn contract(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ContractBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let kind: ContractKind = body.kind.parse()?;
    let source = contract::template(kind, &body.name, &body.symbol);
    state
        .notifications
        .publish("📄", format!("Generated {} contract", kind.label()));

    Ok(Json(json!({
        "success": true,
        "data": {
            "kind": kind.label(),
            "source": source,
        }
    })))
}

pub(super) async fn notifications(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": state.notifications.recent(),
    }))
}
