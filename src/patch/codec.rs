//! Patch serialization.
//!
//! Two formats:
//!
//! - `Binary`: compact blob for host session state. Layout is a 4-byte magic,
//!   a little-endian `u32` format version, then the bincode-encoded patch.
//! - `Json`: human-editable preset files.
//!
//! Decoding is all-or-nothing. Curves are checked against their invariant as
//! they are decoded and the finished patch is validated before it is handed
//! back, so a caller never sees a partially decoded patch.

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::{
    error::{KickError, Result},
    patch::KickPatch,
};

pub const MAGIC: [u8; 4] = *b"SKCK";
pub const FORMAT_VERSION: u32 = 1;

/// Upper bound on a decoded blob. A full patch is a few kilobytes; anything
/// near this is corrupt.
pub const MAX_BLOB_BYTES: u64 = 1 << 20;

const HEADER_LEN: usize = MAGIC.len() + std::mem::size_of::<u32>();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateFormat {
    #[default]
    Binary,
    Json,
}

#[derive(Serialize, Deserialize)]
struct JsonPreset {
    version: u32,
    patch: KickPatch,
}

#[derive(Serialize)]
struct JsonPresetRef<'a> {
    version: u32,
    patch: &'a KickPatch,
}

pub struct StateCodec;

impl StateCodec {
    fn options() -> impl Options {
        bincode::DefaultOptions::new()
            .with_limit(MAX_BLOB_BYTES)
            .reject_trailing_bytes()
    }

    /// Encode `patch`. Equal patches always produce identical bytes.
    pub fn serialize(patch: &KickPatch, format: StateFormat) -> Result<Vec<u8>> {
        match format {
            StateFormat::Binary => {
                let body = Self::options()
                    .serialize(patch)
                    .map_err(|e| KickError::EncodeFailure { reason: e.to_string() })?;

                let mut blob = Vec::new();
                blob.try_reserve_exact(HEADER_LEN + body.len())
                    .map_err(|_| KickError::AllocationFailure { context: "encoding patch" })?;
                blob.extend_from_slice(&MAGIC);
                blob.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
                blob.extend_from_slice(&body);
                Ok(blob)
            }
            StateFormat::Json => {
                let preset = JsonPresetRef {
                    version: FORMAT_VERSION,
                    patch,
                };
                serde_json::to_vec_pretty(&preset)
                    .map_err(|e| KickError::EncodeFailure { reason: e.to_string() })
            }
        }
    }

    /// Decode a patch. Any structural or range problem is `MalformedState`.
    pub fn deserialize(blob: &[u8], format: StateFormat) -> Result<KickPatch> {
        let patch = match format {
            StateFormat::Binary => Self::decode_binary(blob)?,
            StateFormat::Json => Self::decode_json(blob)?,
        };
        patch.validate()?;
        Ok(patch)
    }

    /// Guess the format from the leading bytes.
    pub fn detect(blob: &[u8]) -> StateFormat {
        if blob.starts_with(&MAGIC) {
            StateFormat::Binary
        } else {
            StateFormat::Json
        }
    }

    fn decode_binary(blob: &[u8]) -> Result<KickPatch> {
        if blob.len() < HEADER_LEN {
            return Err(KickError::malformed(format!(
                "blob is {} bytes, shorter than the {HEADER_LEN} byte header",
                blob.len()
            )));
        }
        let (header, body) = blob.split_at(HEADER_LEN);
        if header[..MAGIC.len()] != MAGIC {
            return Err(KickError::malformed("missing kick state magic"));
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&header[MAGIC.len()..]);
        let version = u32::from_le_bytes(version);
        if version != FORMAT_VERSION {
            return Err(KickError::malformed(format!(
                "unsupported state version {version} (expected {FORMAT_VERSION})"
            )));
        }

        Self::options()
            .deserialize(body)
            .map_err(|e| KickError::malformed(e.to_string()))
    }

    fn decode_json(blob: &[u8]) -> Result<KickPatch> {
        let preset: JsonPreset =
            serde_json::from_slice(blob).map_err(|e| KickError::malformed(e.to_string()))?;
        if preset.version != FORMAT_VERSION {
            return Err(KickError::malformed(format!(
                "unsupported preset version {} (expected {FORMAT_VERSION})",
                preset.version
            )));
        }
        Ok(preset.patch)
    }
}
