use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::RngCore;

/// File holding the per-installation random secret
const DEVICE_KEY_FILE: &str = "device.key";

/// Leading bytes identifying a sealed record
const MAGIC: &[u8; 4] = b"PKV1";

const KEY_LEN: usize = 32;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// Seals and opens small records under a key derived from a
/// per-installation device secret.
///
/// Record layout: magic, salt, nonce, ciphertext. A fresh salt and nonce
/// are drawn for every seal, so sealing the same plaintext twice never
/// produces the same bytes.
pub struct SessionSealer {
    device_secret: [u8; KEY_LEN],
}

impl SessionSealer {
    /// Loads the device secret from `dir`, generating it on first run.
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(DEVICE_KEY_FILE);
        let device_secret = if path.exists() {
            let bytes = fs::read(&path)
                .with_context(|| format!("Failed to read device key: {}", path.display()))?;
            if bytes.len() != KEY_LEN {
                bail!("Device key has unexpected length: {} bytes", bytes.len());
            }
            let mut secret = [0u8; KEY_LEN];
            secret.copy_from_slice(&bytes);
            secret
        } else {
            let mut secret = [0u8; KEY_LEN];
            rand::thread_rng().fill_bytes(&mut secret);
            fs::write(&path, secret)
                .with_context(|| format!("Failed to write device key: {}", path.display()))?;
            restrict_permissions(&path)?;
            secret
        };

        Ok(Self { device_secret })
    }

    /// Seals `plaintext` into a self-contained record.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        rand::thread_rng().fill_bytes(&mut nonce);

        let key = self.derive_key(&salt)?;
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| anyhow!("Encryption failed: {e}"))?;

        let mut record = Vec::with_capacity(MAGIC.len() + SALT_LEN + NONCE_LEN + ciphertext.len());
        record.extend_from_slice(MAGIC);
        record.extend_from_slice(&salt);
        record.extend_from_slice(&nonce);
        record.extend_from_slice(&ciphertext);
        Ok(record)
    }

    /// Opens a record produced by `seal`. Fails on any tampering.
    pub fn unseal(&self, record: &[u8]) -> Result<Vec<u8>> {
        let header_len = MAGIC.len() + SALT_LEN + NONCE_LEN;
        if record.len() < header_len || &record[..MAGIC.len()] != MAGIC {
            bail!("Not a sealed record");
        }
        let salt = &record[MAGIC.len()..MAGIC.len() + SALT_LEN];
        let nonce = &record[MAGIC.len() + SALT_LEN..header_len];
        let ciphertext = &record[header_len..];

        let key = self.derive_key(salt)?;
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| anyhow!("Record failed authentication"))
    }

    fn derive_key(&self, salt: &[u8]) -> Result<[u8; KEY_LEN]> {
        let mut key = [0u8; KEY_LEN];
        argon2::Argon2::default()
            .hash_password_into(&self.device_secret, salt, &mut key)
            .map_err(|e| anyhow!("Key derivation failed: {e}"))?;
        Ok(key)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to restrict permissions: {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
