//! Cifrado de campos en reposo (AES-256-GCM)
//!
//! Los cuerpos de mensajes y notas clínicas se cifran justo antes de escribirse
//! y se descifran justo después de leerse. El formato guardado es
//! `base64(nonce[12] || ciphertext || tag)`, con nonce aleatorio por campo.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid encryption key: {0}")]
    InvalidKey(String),

    #[error("Encryption failed")]
    Encryption,

    #[error("Decryption failed: authentication tag mismatch")]
    Decryption,

    #[error("Invalid ciphertext format")]
    InvalidFormat,
}

/// Cifrador simétrico compartido en `AppState`
#[derive(Clone)]
pub struct Cifrador {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for Cifrador {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Cifrador(***)")
    }
}

impl Cifrador {
    /// Construye el cifrador desde una clave de 32 bytes codificada en base64
    pub fn from_base64(clave: &str) -> Result<Self, CryptoError> {
        let bytes = STANDARD
            .decode(clave.trim())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let cipher =
            Aes256Gcm::new_from_slice(&bytes).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { cipher })
    }

    pub fn cifrar(&self, texto: &str) -> Result<String, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, texto.as_bytes())
            .map_err(|_| CryptoError::Encryption)?;

        let mut salida = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        salida.extend_from_slice(&nonce_bytes);
        salida.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(salida))
    }

    pub fn descifrar(&self, guardado: &str) -> Result<String, CryptoError> {
        let bytes = STANDARD
            .decode(guardado)
            .map_err(|_| CryptoError::InvalidFormat)?;
        // 16 bytes de tag como mínimo tras el nonce
        if bytes.len() < NONCE_LEN + 16 {
            return Err(CryptoError::InvalidFormat);
        }
        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LEN);
        let plano = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CryptoError::Decryption)?;
        String::from_utf8(plano).map_err(|_| CryptoError::InvalidFormat)
    }
}
