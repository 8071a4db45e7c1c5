//! End-to-end RSA-PSS properties through the scheme façade, at the full
//! 4096-bit size. Key generation runs once per test binary.

use std::io::Cursor;
use std::sync::OnceLock;

use rand::rngs::OsRng;
use rand::Rng;

use godot::pkcs1;
use godot::rsa;
use godot::scheme::{Rsa, SignatureScheme};

/// PEM pair (private, public), generated once; the prime search for two
/// 2048-bit primes can take a while.
fn key_pems() -> &'static (Vec<u8>, Vec<u8>) {
    static KEYS: OnceLock<(Vec<u8>, Vec<u8>)> = OnceLock::new();
    KEYS.get_or_init(|| {
        let mut scheme = Rsa::new();
        let mut priv_pem = Vec::new();
        scheme
            .new_key(rsa::KEY_BITS, &mut OsRng, &mut priv_pem)
            .unwrap();
        let mut pub_pem = Vec::new();
        scheme.write_public(&mut pub_pem).unwrap();
        (priv_pem, pub_pem)
    })
}

fn signer() -> Rsa {
    let mut s = Rsa::new();
    s.load_private(&mut Cursor::new(key_pems().0.clone()))
        .unwrap();
    s
}

fn verifier() -> Rsa {
    let mut v = Rsa::new();
    v.load_public(&mut Cursor::new(key_pems().1.clone()))
        .unwrap();
    v
}

fn message_of(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 253) as u8).collect()
}

#[test]
fn generated_key_is_full_size() {
    let key = pkcs1::read_private(&mut Cursor::new(key_pems().0.clone())).unwrap();
    assert_eq!(key.n.bits(), rsa::KEY_BITS);
    assert_eq!(key.n.to_bytes_be().len(), rsa::KEY_BITS / 8);
    assert_eq!(key.e, 65537u32.into());
}

#[test]
fn sign_verify_round_trips() {
    let s = signer();
    let v = verifier();

    // fifty trials spanning the interesting message sizes
    let mut lens: Vec<usize> = vec![0, 1, 8192, 1 << 20];
    lens.extend((2..48).map(|i| i * 41));

    for len in lens {
        let msg = message_of(len);
        let mut sig = Vec::new();
        s.sign(&mut OsRng, &mut Cursor::new(msg.clone()), &mut sig)
            .unwrap();
        assert_eq!(sig.len(), rsa::KEY_BITS / 8, "len {len}");
        assert!(
            v.verify(&mut Cursor::new(sig), &mut Cursor::new(msg)).unwrap(),
            "len {len}"
        );
    }
}

#[test]
fn tampered_signature_fails() {
    let s = signer();
    let v = verifier();

    let msg = message_of(2048);
    let mut sig = Vec::new();
    s.sign(&mut OsRng, &mut Cursor::new(msg.clone()), &mut sig)
        .unwrap();

    for _ in 0..32 {
        let mut bad = sig.clone();
        let byte = OsRng.gen_range(0..bad.len());
        let bit = OsRng.gen_range(0..8u8);
        bad[byte] ^= 1 << bit;

        assert!(!v
            .verify(&mut Cursor::new(bad), &mut Cursor::new(msg.clone()))
            .unwrap());
    }
}

#[test]
fn tampered_message_fails() {
    let s = signer();
    let v = verifier();

    let msg = message_of(2048);
    let mut sig = Vec::new();
    s.sign(&mut OsRng, &mut Cursor::new(msg.clone()), &mut sig)
        .unwrap();

    for _ in 0..32 {
        let mut bad = msg.clone();
        let byte = OsRng.gen_range(0..bad.len());
        let bit = OsRng.gen_range(0..8u8);
        bad[byte] ^= 1 << bit;

        assert!(!v
            .verify(&mut Cursor::new(sig.clone()), &mut Cursor::new(bad))
            .unwrap());
    }
}

#[test]
fn truncated_signature_is_an_error() {
    let s = signer();
    let v = verifier();

    let msg = message_of(17);
    let mut sig = Vec::new();
    s.sign(&mut OsRng, &mut Cursor::new(msg.clone()), &mut sig)
        .unwrap();
    sig.truncate(sig.len() - 1);

    let err = v
        .verify(&mut Cursor::new(sig), &mut Cursor::new(msg))
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid signature size");
}

#[test]
fn signatures_are_salted() {
    let s = signer();
    let v = verifier();

    let msg = b"same message twice".to_vec();
    let mut sig1 = Vec::new();
    let mut sig2 = Vec::new();
    s.sign(&mut OsRng, &mut Cursor::new(msg.clone()), &mut sig1)
        .unwrap();
    s.sign(&mut OsRng, &mut Cursor::new(msg.clone()), &mut sig2)
        .unwrap();

    // PSS salts every signature, so two signatures differ yet both verify
    assert_ne!(sig1, sig2);
    for sig in [sig1, sig2] {
        assert!(v
            .verify(&mut Cursor::new(sig), &mut Cursor::new(msg.clone()))
            .unwrap());
    }
}
