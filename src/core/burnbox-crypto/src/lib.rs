//! # Burnbox Crypto
//!
//! Cryptographic primitives for Burnbox.
//!
//! This crate provides the two operations the secret lifecycle engine needs:
//! - Symmetric envelope encryption (AES-256-GCM) with a detached nonce
//! - One-way salted digests (SHA-512) for password gating
//!
//! plus secure random generation and a zeroizing key type.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aead;
pub mod error;
pub mod hash;
pub mod keys;
pub mod random;

pub use error::CryptoError;
pub use keys::SymmetricKey;
