//! Ed25519 signing and verification over 32-byte hashes.
//!
//! Spend signatures always sign a signature hash produced by
//! `Transaction::sig_hash`, never raw transaction bytes.

use cairn_types::{Hash, PrivateKey, PublicKey, Signature};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

/// Sign a hash with a private key, returning the signature.
pub fn sign_hash(hash: &Hash, private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    let sig = signing_key.sign(hash.as_bytes());
    Signature(sig.to_bytes())
}

/// Verify a signature against a hash and public key.
///
/// Returns `true` if the signature is valid, `false` otherwise. Malformed
/// public keys verify as false rather than erroring.
pub fn verify_hash(hash: &Hash, signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify(hash.as_bytes(), &dalek_sig).is_ok()
}

/// Verify a signature carried as raw bytes, as transaction signatures are.
///
/// Anything that is not exactly 64 bytes fails verification.
pub fn verify_hash_bytes(hash: &Hash, signature: &[u8], public_key: &[u8]) -> bool {
    let Ok(sig_arr) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    let Ok(key_arr) = <[u8; 32]>::try_from(public_key) else {
        return false;
    };
    verify_hash(hash, &Signature(sig_arr), &PublicKey(key_arr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{generate_keypair, keypair_from_seed};

    #[test]
    fn sign_and_verify() {
        let kp = generate_keypair();
        let hash = Hash::of(b"sig hash under test");
        let sig = sign_hash(&hash, &kp.private);
        assert!(verify_hash(&hash, &sig, &kp.public));
    }

    #[test]
    fn wrong_hash_fails() {
        let kp = generate_keypair();
        let sig = sign_hash(&Hash::of(b"one"), &kp.private);
        assert!(!verify_hash(&Hash::of(b"two"), &sig, &kp.public));
    }

    #[test]
    fn wrong_key_fails() {
        let kp1 = generate_keypair();
        let kp2 = generate_keypair();
        let hash = Hash::of(b"payload");
        let sig = sign_hash(&hash, &kp1.private);
        assert!(!verify_hash(&hash, &sig, &kp2.public));
    }

    #[test]
    fn signature_deterministic() {
        let kp = keypair_from_seed(&[99u8; 32]);
        let hash = Hash::of(b"deterministic");
        let sig1 = sign_hash(&hash, &kp.private);
        let sig2 = sign_hash(&hash, &kp.private);
        assert_eq!(sig1.0, sig2.0);
    }

    #[test]
    fn invalid_public_key() {
        let kp = generate_keypair();
        let hash = Hash::of(b"test");
        let sig = sign_hash(&hash, &kp.private);
        let bad_key = PublicKey([0xFF; 32]);
        assert!(!verify_hash(&hash, &sig, &bad_key));
    }

    #[test]
    fn byte_slice_verification() {
        let kp = generate_keypair();
        let hash = Hash::of(b"raw bytes");
        let sig = sign_hash(&hash, &kp.private);
        assert!(verify_hash_bytes(&hash, &sig.0, kp.public.as_bytes()));
        assert!(!verify_hash_bytes(&hash, &sig.0[..63], kp.public.as_bytes()));
        assert!(!verify_hash_bytes(&hash, &sig.0, &kp.public.as_bytes()[..31]));
    }
}
