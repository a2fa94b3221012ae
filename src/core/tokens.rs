//! Tokens de cuenta (activación / recuperación)
//!
//! El token en claro es aleatorio (32 bytes, base64 url-safe) y solo viaja
//! por correo; en base de datos se guarda su SHA-256.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

pub const HORAS_ACTIVACION: i64 = 48;
pub const HORAS_RECUPERACION: i64 = 1;

pub fn generar_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
