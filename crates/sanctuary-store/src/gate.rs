//! Access gate in front of the sanctuary.
//!
//! The key is local configuration, so this keeps casual visitors out and
//! nothing more.  The unlocked state persists in the flat store.

use sanctuary_shared::constants::UNLOCKED_KEY;
use subtle::ConstantTimeEq;

use crate::error::Result;
use crate::flat::FlatBackend;

pub struct AccessGate {
    key: String,
}

impl AccessGate {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn is_unlocked(&self, flat: &impl FlatBackend) -> Result<bool> {
        Ok(flat.get(UNLOCKED_KEY)?.as_deref() == Some("true"))
    }

    /// Persist the unlocked state if `attempt` matches.  A wrong attempt
    /// leaves the current state as it is.
    pub fn unlock(&self, flat: &impl FlatBackend, attempt: &str) -> Result<bool> {
        let matches: bool = attempt.as_bytes().ct_eq(self.key.as_bytes()).into();
        if !matches {
            tracing::warn!("wrong access key");
            return Ok(false);
        }

        flat.set(UNLOCKED_KEY, "true")?;
        tracing::info!("sanctuary unlocked");
        Ok(true)
    }

    pub fn lock(&self, flat: &impl FlatBackend) -> Result<()> {
        flat.remove(UNLOCKED_KEY)?;
        tracing::info!("sanctuary locked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat::MemoryKv;
    use sanctuary_shared::constants::DEFAULT_FLAT_QUOTA;

    #[test]
    fn test_unlock_lock_round_trip() {
        let kv = MemoryKv::new(DEFAULT_FLAT_QUOTA);
        let gate = AccessGate::new("1234");
        assert!(!gate.is_unlocked(&kv).unwrap());

        assert!(gate.unlock(&kv, "1234").unwrap());
        assert!(gate.is_unlocked(&kv).unwrap());

        gate.lock(&kv).unwrap();
        assert!(!gate.is_unlocked(&kv).unwrap());
    }

    #[test]
    fn test_wrong_key_stays_locked() {
        let kv = MemoryKv::new(DEFAULT_FLAT_QUOTA);
        let gate = AccessGate::new("1234");

        assert!(!gate.unlock(&kv, "12345").unwrap());
        assert!(!gate.unlock(&kv, "").unwrap());
        assert!(!gate.is_unlocked(&kv).unwrap());
    }
}
