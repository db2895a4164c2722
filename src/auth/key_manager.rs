use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, SystemTime};

use anyhow::Result;
use rand::distr::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";
const SECONDS_PER_DAY: u64 = 86400;

/// Age thresholds for the stored key.
#[derive(Debug, Clone, Copy)]
pub struct KeyPolicy {
    pub warn_after_days: u64,
    pub rotate_after_days: u64,
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self {
            warn_after_days: 90,
            rotate_after_days: 365,
        }
    }
}

/// Owns the hashed API key of the local backend. Only the SHA-256 hash
/// is kept on disk; the plaintext is shown once when generated.
pub struct KeyManager {
    key_path: PathBuf,
    hash: RwLock<String>,
    policy: KeyPolicy,
}

impl KeyManager {
    pub fn open(key_path: impl AsRef<Path>, policy: KeyPolicy) -> Result<Self> {
        let km = KeyManager {
            key_path: key_path.as_ref().to_path_buf(),
            hash: RwLock::new(String::new()),
            policy,
        };

        info!(
            "Key TTL settings: warning after {} days, auto-rotate after {} days",
            policy.warn_after_days, policy.rotate_after_days
        );

        if km.key_path.exists() {
            km.load_and_check_key()?;
        } else {
            let key = km.generate_new_key()?;
            println!("Generated new API key: {}", key);
        }

        Ok(km)
    }

    fn generate_key() -> String {
        let mut rng = rand::rng();
        let length = rng.random_range(24..=64);
        let mut key: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(length)
            .map(char::from)
            .collect();

        for _ in 0..5 {
            let idx = rng.random_range(0..key.len());
            let spec_idx = rng.random_range(0..SPECIAL_CHARS.len());
            key.replace_range(idx..idx + 1, &SPECIAL_CHARS[spec_idx..spec_idx + 1]);
        }
        key
    }

    fn generate_new_key(&self) -> Result<String> {
        if let Some(parent) = self.key_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let key = Self::generate_key();
        let hash = Self::hash_key(&key);

        if self.key_path.exists() {
            let mut perms = fs::metadata(&self.key_path)?.permissions();
            perms.set_readonly(false);
            fs::set_permissions(&self.key_path, perms)?;
        }

        fs::write(&self.key_path, &hash)?;

        let mut perms = fs::metadata(&self.key_path)?.permissions();
        perms.set_readonly(true);
        fs::set_permissions(&self.key_path, perms)?;

        *self.hash.write().unwrap_or_else(PoisonError::into_inner) = hash;
        info!("API key generated and stored at {}", self.key_path.display());
        Ok(key)
    }

    fn file_age(metadata: &fs::Metadata) -> Result<Duration> {
        let file_time = metadata.created().or_else(|_| {
            warn!("Creation time not available, falling back to modification time");
            metadata.modified()
        })?;
        Ok(SystemTime::now().duration_since(file_time)?)
    }

    fn load_and_check_key(&self) -> Result<()> {
        let days = self.age_in_days()?;
        info!("API key age: {} days", days);

        if days > self.policy.rotate_after_days {
            warn!("Key is older than {} days, auto-rotating...", self.policy.rotate_after_days);
            let key = self.generate_new_key()?;
            println!("Rotated API key: {}", key);
        } else {
            if days > self.policy.warn_after_days {
                warn!("Key is older than {} days.", self.policy.warn_after_days);
            }
            let stored = fs::read_to_string(&self.key_path)?.trim().to_string();
            *self.hash.write().unwrap_or_else(PoisonError::into_inner) = stored;
        }

        Ok(())
    }

    fn hash_key(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn validate_token(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        Self::hash_key(token) == *self.hash.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn age_in_days(&self) -> Result<u64> {
        let metadata = fs::metadata(&self.key_path)?;
        Ok(Self::file_age(&metadata)?.as_secs() / SECONDS_PER_DAY)
    }

    /// Replaces the key and returns the new plaintext; the old key stops validating.
    pub fn refresh_key(&self) -> Result<String> {
        info!("Refreshing API key...");
        self.generate_new_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_key_generation() {
        let dir = tempdir().unwrap();
        let key_path = dir.path().join("secret").join("key.pub");

        let km = KeyManager::open(&key_path, KeyPolicy::default()).unwrap();
        assert!(key_path.exists());
        assert!(fs::metadata(&key_path).unwrap().permissions().readonly());

        let stored = fs::read_to_string(&key_path).unwrap();
        assert_eq!(stored.len(), 64);
        assert!(!km.validate_token("wrong-token"));
        assert!(!km.validate_token(""));
    }

    #[test]
    fn test_reopen_keeps_the_key() {
        let dir = tempdir().unwrap();
        let key_path = dir.path().join("key.pub");

        let key = KeyManager::open(&key_path, KeyPolicy::default())
            .unwrap()
            .refresh_key()
            .unwrap();

        let reopened = KeyManager::open(&key_path, KeyPolicy::default()).unwrap();
        assert!(reopened.validate_token(&key));
        assert_eq!(reopened.age_in_days().unwrap(), 0);
    }

    #[test]
    fn test_refresh_key_invalidates_old_token() {
        let dir = tempdir().unwrap();
        let km = KeyManager::open(dir.path().join("key.pub"), KeyPolicy::default()).unwrap();

        let first_key = km.refresh_key().unwrap();
        assert!(km.validate_token(&first_key));
        assert!(first_key.len() >= 24 && first_key.len() <= 64);

        let second_key = km.refresh_key().unwrap();
        assert!(!km.validate_token(&first_key));
        assert!(km.validate_token(&second_key));
    }

    #[test]
    fn test_key_contains_special_characters() {
        let dir = tempdir().unwrap();
        let km = KeyManager::open(dir.path().join("key.pub"), KeyPolicy::default()).unwrap();
        let key = km.refresh_key().unwrap();

        assert!(key.chars().any(|c| SPECIAL_CHARS.contains(c)));
    }
}
