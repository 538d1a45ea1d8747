// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Random identifiers for documents and share links.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::AppError;

const DOCUMENT_ID_BYTES: usize = 15;
const SHARE_TOKEN_BYTES: usize = 32;

fn random_url_safe(len: usize) -> Result<String, AppError> {
    let mut bytes = vec![0u8; len];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// New 20-character document ID.
pub fn new_document_id() -> Result<String, AppError> {
    random_url_safe(DOCUMENT_ID_BYTES)
}

/// New unguessable token for a shared day.
pub fn new_share_token() -> Result<String, AppError> {
    random_url_safe(SHARE_TOKEN_BYTES)
}
