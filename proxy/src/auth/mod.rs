//! Session Token Cache
//!
//! Holds the single bearer token used against the FAIRsharing registry.
//! The registry does not advertise an expiry, so a token is trusted until a
//! submission reports it invalid, or until the optional TTL elapses.
//!
//! Acquisition happens while the slot lock is held: a caller arriving during
//! a sign-in waits for that sign-in and reuses its token.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::common::ProxyResult;

/// Anything that can exchange static credentials for a bearer token
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn sign_in(&self) -> ProxyResult<String>;
}

/// A cached registry bearer token
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionToken {
    value: String,
    #[zeroize(skip)]
    acquired_at: DateTime<Utc>,
    #[zeroize(skip)]
    generation: u64,
}

impl SessionToken {
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Monotonic counter, bumped on every acquisition
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn age(&self) -> Duration {
        (Utc::now() - self.acquired_at).to_std().unwrap_or_default()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("value", &"[REDACTED]")
            .field("acquired_at", &self.acquired_at)
            .field("generation", &self.generation)
            .finish()
    }
}

#[derive(Default)]
struct Slot {
    current: Option<SessionToken>,
    generation: u64,
}

pub struct SessionTokenCache {
    slot: Mutex<Slot>,
    ttl: Option<Duration>,
}

impl SessionTokenCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            slot: Mutex::new(Slot::default()),
            ttl,
        }
    }

    /// Return the cached token, signing in through `source` if there is none
    pub async fn get_token<S>(&self, source: &S) -> ProxyResult<SessionToken>
    where
        S: TokenSource + ?Sized,
    {
        let mut slot = self.slot.lock().await;

        let expired = match (slot.current.as_ref(), self.ttl) {
            (Some(token), Some(ttl)) if token.age() >= ttl => true,
            (Some(token), _) => return Ok(token.clone()),
            (None, _) => false,
        };
        if expired {
            debug!("Cached registry token exceeded TTL, discarding");
            slot.current = None;
        }

        info!("Signing in to FAIRsharing registry");
        let value = source.sign_in().await?;

        slot.generation += 1;
        let token = SessionToken {
            value,
            acquired_at: Utc::now(),
            generation: slot.generation,
        };
        slot.current = Some(token.clone());
        debug!("Cached registry token generation {}", token.generation);

        Ok(token)
    }

    /// Discard `stale` if it is still the cached token.
    ///
    /// Returns `false` when another request already replaced it, in which case
    /// the newer token is kept.
    pub async fn invalidate(&self, stale: &SessionToken) -> bool {
        let mut slot = self.slot.lock().await;
        match slot.current.as_ref() {
            Some(current) if current.generation == stale.generation => {
                slot.current = None;
                info!("Invalidated registry token generation {}", stale.generation);
                true
            }
            _ => false,
        }
    }
}
