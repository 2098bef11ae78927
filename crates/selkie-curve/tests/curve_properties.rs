//! Property-based tests for the Wei25519 layer
//!
//! These tests verify the arithmetic for ALL inputs in the generated
//! space, not just fixed vectors: serialization round-trips, field
//! identities, scalar reduction invariants, and Diffie-Hellman symmetry.

use proptest::prelude::*;
use selkie_curve::wei25519::constants::GENERATOR;
use selkie_curve::{FieldElement, ProjectivePoint, Scalar};

/// Strategy for arbitrary 32-byte arrays.
fn arbitrary_bytes32() -> impl Strategy<Value = [u8; 32]> {
    any::<[u8; 32]>()
}

/// Strategy for scalars drawn from the full 256-bit space.
fn arbitrary_scalar() -> impl Strategy<Value = Scalar> {
    arbitrary_bytes32().prop_map(Scalar::from_bytes)
}

#[test]
fn prop_field_round_trips_canonical_bytes() {
    proptest!(|(bytes in arbitrary_bytes32())| {
        let x = FieldElement::from_bytes(&bytes);
        let canonical = x.to_bytes();
        // PROPERTY: decoding canonical bytes must be the identity.
        prop_assert_eq!(FieldElement::from_bytes(&canonical).to_bytes(), canonical);
        // PROPERTY: the top bit never survives serialization.
        prop_assert_eq!(canonical[0] & 0x80, 0);
    });
}

#[test]
fn prop_field_inverse_multiplies_to_one() {
    proptest!(|(bytes in arbitrary_bytes32())| {
        let x = FieldElement::from_bytes(&bytes);
        prop_assume!(!x.is_zero());
        let product = &x * &x.invert();
        prop_assert_eq!(product.to_bytes(), FieldElement::ONE.to_bytes());
    });
}

#[test]
fn prop_field_addition_commutes() {
    proptest!(|(a in arbitrary_bytes32(), b in arbitrary_bytes32())| {
        let x = FieldElement::from_bytes(&a);
        let y = FieldElement::from_bytes(&b);
        prop_assert_eq!((&x + &y).to_bytes(), (&y + &x).to_bytes());
    });
}

#[test]
fn prop_scalar_reduce_is_canonical_and_stable() {
    proptest!(|(s in arbitrary_scalar())| {
        let reduced = s.reduce();
        prop_assert!(reduced.is_reduced());
        let rereduced = reduced.reduce();
        prop_assert_eq!(rereduced.as_bytes(), reduced.as_bytes());
    });
}

#[test]
fn prop_scalar_mul_add_commutes_in_the_product() {
    proptest!(|(a in arbitrary_scalar(), b in arbitrary_scalar(), c in arbitrary_scalar())| {
        let ab = Scalar::mul_add(&a, &b, &c).reduce();
        let ba = Scalar::mul_add(&b, &a, &c).reduce();
        prop_assert_eq!(ab.as_bytes(), ba.as_bytes());
    });
}

#[test]
fn prop_point_serialization_round_trips() {
    proptest!(|(k in 1u64..u64::MAX)| {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&k.to_be_bytes());
        let point = &*GENERATOR * &Scalar::from_bytes(bytes);
        let encoded = point.serialize();
        let decoded = ProjectivePoint::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded.serialize(), encoded);
    });
}

#[test]
fn prop_scalar_mult_distributes_over_doubling() {
    proptest!(|(k in 1u64..(u64::MAX / 2))| {
        // PROPERTY: [2k]G = double([k]G).
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&k.to_be_bytes());
        let k_point = &*GENERATOR * &Scalar::from_bytes(bytes);

        let mut doubled_bytes = [0u8; 32];
        doubled_bytes[24..].copy_from_slice(&(2 * k).to_be_bytes());
        let two_k_point = &*GENERATOR * &Scalar::from_bytes(doubled_bytes);

        prop_assert_eq!(two_k_point.serialize(), k_point.double().serialize());
    });
}

#[test]
fn prop_diffie_hellman_is_symmetric() {
    proptest!(ProptestConfig::with_cases(16), |(a in 1u64..u64::MAX, b in 1u64..u64::MAX)| {
        let mut a_bytes = [0u8; 32];
        a_bytes[24..].copy_from_slice(&a.to_be_bytes());
        let mut b_bytes = [0u8; 32];
        b_bytes[24..].copy_from_slice(&b.to_be_bytes());
        let sk_a = Scalar::from_bytes(a_bytes);
        let sk_b = Scalar::from_bytes(b_bytes);

        let pk_a = &*GENERATOR * &sk_a;
        let pk_b = &*GENERATOR * &sk_b;

        let shared_a = (&pk_b * &sk_a).serialize();
        let shared_b = (&pk_a * &sk_b).serialize();
        prop_assert_eq!(shared_a, shared_b);
    });
}
