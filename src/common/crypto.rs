// src/common/crypto.rs
//
// Criptografia dos tokens do Tiny em repouso: AES-256-GCM com chave mestra
// de 32 bytes vinda do ambiente.
//
// Formato: base64(nonce_12bytes || ciphertext || tag_16bytes)

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, OsRng};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use zeroize::Zeroize;

use crate::common::error::AppError;

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// Chave mestra + operações de cifra. Clonável para viver no AppState;
/// a chave é zerada da memória no drop.
pub struct CryptoService {
    key: [u8; KEY_LEN],
}

impl Clone for CryptoService {
    fn clone(&self) -> Self {
        Self { key: self.key }
    }
}

impl Drop for CryptoService {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl CryptoService {
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Carrega a chave mestra de `APP_MASTER_KEY` (base64 de 32 bytes).
    pub fn from_env() -> anyhow::Result<Self> {
        let b64 = std::env::var("APP_MASTER_KEY")
            .map_err(|_| anyhow::anyhow!("APP_MASTER_KEY deve ser definida"))?;
        let bytes = BASE64.decode(b64.trim())?;
        if bytes.len() != KEY_LEN {
            anyhow::bail!(
                "APP_MASTER_KEY com tamanho errado: {} (esperado {KEY_LEN})",
                bytes.len()
            );
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&bytes);
        Ok(Self::new(key))
    }

    /// Cifra um token em claro. Nonce aleatório por operação.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, AppError> {
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|_| AppError::FalhaCriptografia)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| AppError::FalhaCriptografia)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(blob))
    }

    /// Decifra um blob produzido por `encrypt`. Qualquer blob malformado ou
    /// adulterado falha com `FalhaCriptografia`.
    pub fn decrypt(&self, encoded: &str) -> Result<String, AppError> {
        let blob = BASE64
            .decode(encoded.trim())
            .map_err(|_| AppError::FalhaCriptografia)?;
        if blob.len() <= NONCE_LEN {
            return Err(AppError::FalhaCriptografia);
        }

        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|_| AppError::FalhaCriptografia)?;

        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| AppError::FalhaCriptografia)?;

        String::from_utf8(plaintext).map_err(|_| AppError::FalhaCriptografia)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CryptoService {
        CryptoService::new([7u8; KEY_LEN])
    }

    #[test]
    fn roundtrip() {
        let crypto = service();
        let cifrado = crypto.encrypt("token-super-secreto").unwrap();
        assert_ne!(cifrado, "token-super-secreto");
        assert_eq!(crypto.decrypt(&cifrado).unwrap(), "token-super-secreto");
    }

    #[test]
    fn nonce_aleatorio_gera_blobs_diferentes() {
        let crypto = service();
        let a = crypto.encrypt("abc").unwrap();
        let b = crypto.encrypt("abc").unwrap();
        assert_ne!(a, b);
        assert_eq!(crypto.decrypt(&a).unwrap(), crypto.decrypt(&b).unwrap());
    }

    #[test]
    fn blob_adulterado_falha() {
        let crypto = service();
        let cifrado = crypto.encrypt("abc").unwrap();
        let mut bytes = BASE64.decode(&cifrado).unwrap();
        let ultimo = bytes.len() - 1;
        bytes[ultimo] ^= 0xFF;
        let adulterado = BASE64.encode(bytes);
        assert!(matches!(
            crypto.decrypt(&adulterado),
            Err(AppError::FalhaCriptografia)
        ));
    }

    #[test]
    fn blob_malformado_falha() {
        let crypto = service();
        assert!(crypto.decrypt("não é base64!").is_err());
        assert!(crypto.decrypt("YWJj").is_err()); // curto demais para ter nonce
    }

    #[test]
    fn chave_errada_nao_decifra() {
        let cifrado = service().encrypt("abc").unwrap();
        let outra = CryptoService::new([9u8; KEY_LEN]);
        assert!(outra.decrypt(&cifrado).is_err());
    }
}
