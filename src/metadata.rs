//! NFT metadata attached to a generated piece.

use crate::request::GenerationRequest;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

const COLLECTION_NAME: &str = "ZIG ZAG NFT";
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_RANDOM_CHARS: usize = 11;

/// One `trait_type`/`value` pair in marketplace metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: serde_json::Value,
}

impl Attribute {
    pub fn new(trait_type: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            trait_type: trait_type.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftMetadata {
    pub name: String,
    pub description: String,
    pub attributes: Vec<Attribute>,
}

impl NftMetadata {
    /// Metadata for piece `id` drawn from `request`: one attribute each for
    /// style, colors and complexity.
    pub fn for_request(id: &str, request: &GenerationRequest) -> Self {
        Self {
            name: format!("{COLLECTION_NAME} #{id}"),
            description: format!("A unique {} artwork", request.style),
            attributes: vec![
                Attribute::new("Style", request.style.name()),
                Attribute::new("Colors", request.palette.name()),
                Attribute::new("Complexity", request.complexity.get()),
            ],
        }
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// A fresh piece id: the current time in milliseconds followed by random
/// characters, all base 36.
pub fn generate_id(rng: &mut impl Rng) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    let mut id = to_base36(millis);
    id.extend((0..ID_RANDOM_CHARS).map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char));
    id
}
