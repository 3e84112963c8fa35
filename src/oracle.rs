//! Randomness requests and the VRF word source.
//!
//! Placement registers a request with [`OracleAdapter`]; the fulfiller
//! (in production a chain oracle, in tests the test itself) later delivers
//! random words against the request id. A request can be consumed exactly
//! once, which is what makes settlement idempotent.
//!
//! [`VrfSource`] is the built-in fulfiller: a schnorrkel keypair signs the
//! request, and the signature hash is expanded into as many 64-bit words as
//! the game asked for. The proof can be verified by anyone holding the
//! public key.

use crate::errors::{EngineResult, OracleError};
use dashmap::DashMap;
use schnorrkel::context::SigningContext;
use schnorrkel::{Keypair, PublicKey, Signature};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const VRF_SIGNING_CONTEXT: &[u8] = b"betforge-vrf";

/// A randomness request waiting for fulfillment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDraw {
    pub bet_id: u64,
    pub num_words: u32,
}

/// Tracks outstanding randomness requests.
///
/// Request ids are unique and monotonically increasing. Taking a request
/// removes it, so a second delivery for the same id fails.
pub struct OracleAdapter {
    pending: DashMap<u64, PendingDraw>,
    next_id: AtomicU64,
}

impl OracleAdapter {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a request for `num_words` random words on behalf of a bet.
    pub fn request(&self, bet_id: u64, num_words: u32) -> u64 {
        let request_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.pending
            .insert(request_id, PendingDraw { bet_id, num_words });
        request_id
    }

    /// Consume a pending request, validating the delivered word count.
    ///
    /// The request stays pending when the word count is wrong, so a correct
    /// redelivery can still settle the bet.
    pub fn take(&self, request_id: u64, words: &[u64]) -> EngineResult<PendingDraw> {
        let expected = self
            .pending
            .get(&request_id)
            .map(|p| p.num_words)
            .ok_or(OracleError::UnknownRequest(request_id))?;

        if words.len() != expected as usize {
            return Err(OracleError::WordCount {
                expected,
                got: words.len(),
            }
            .into());
        }

        self.pending
            .remove(&request_id)
            .map(|(_, p)| p)
            .ok_or_else(|| OracleError::UnknownRequest(request_id).into())
    }

    /// Number of requests still awaiting fulfillment.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Default for OracleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof bundle published alongside every fulfilled request.
#[derive(Debug, Clone)]
pub struct VrfProof {
    pub request_id: u64,
    pub words: Vec<u64>,
    pub proof: String,
    pub public_key: String,
}

/// VRF-backed word generator.
pub struct VrfSource {
    keypair: Arc<Keypair>,
}

impl VrfSource {
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    /// Fresh keypair from the OS RNG.
    pub fn new_random() -> Self {
        use rand_core::OsRng;
        Self::new(Keypair::generate_with(OsRng))
    }

    /// Sign the request and expand the signature hash into `num_words`
    /// 64-bit words. The words are bound to the published signature, so
    /// anyone can recompute them from the proof.
    pub fn fulfill(&self, request_id: u64, num_words: u32) -> VrfProof {
        let message = format!("request:{}", request_id);
        let ctx = SigningContext::new(VRF_SIGNING_CONTEXT);
        let signature = self.keypair.sign(ctx.bytes(message.as_bytes()));
        let sig_bytes = signature.to_bytes();

        let words = expand_words(&sig_bytes, num_words);

        VrfProof {
            request_id,
            words,
            proof: hex::encode(sig_bytes),
            public_key: hex::encode(self.keypair.public.to_bytes()),
        }
    }

    /// Verify a published proof against its request id and recompute the
    /// words. Returns false on any mismatch.
    pub fn verify(proof: &VrfProof) -> bool {
        let sig_bytes = match hex::decode(&proof.proof) {
            Ok(b) => b,
            Err(_) => return false,
        };
        let key_bytes = match hex::decode(&proof.public_key) {
            Ok(b) => b,
            Err(_) => return false,
        };

        let sig_array: [u8; 64] = match sig_bytes.as_slice().try_into() {
            Ok(a) => a,
            Err(_) => return false,
        };
        let signature = match Signature::from_bytes(&sig_array) {
            Ok(s) => s,
            Err(_) => return false,
        };
        let public_key = match PublicKey::from_bytes(&key_bytes) {
            Ok(k) => k,
            Err(_) => return false,
        };

        let message = format!("request:{}", proof.request_id);
        let ctx = SigningContext::new(VRF_SIGNING_CONTEXT);
        if public_key
            .verify(ctx.bytes(message.as_bytes()), &signature)
            .is_err()
        {
            return false;
        }

        expand_words(&sig_array, proof.words.len() as u32) == proof.words
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.keypair.public.to_bytes())
    }
}

/// Expand a seed into `num_words` words by hashing seed || counter.
fn expand_words(seed: &[u8], num_words: u32) -> Vec<u64> {
    (0..num_words)
        .map(|i| {
            let mut hasher = Sha256::new();
            hasher.update(seed);
            hasher.update(i.to_le_bytes());
            let digest = hasher.finalize();
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&digest[..8]);
            u64::from_le_bytes(bytes)
        })
        .collect()
}
