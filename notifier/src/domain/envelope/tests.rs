//! Builder coverage for order and user envelopes.

use super::*;
use rstest::{fixture, rstest};

#[fixture]
fn amount() -> Amount {
    "499.00".parse().expect("valid amount")
}

#[rstest]
fn order_envelope_matches_scenario(amount: Amount) {
    let envelope = build_order_envelope(1024_u64, amount, "Asha").expect("valid order");

    assert_eq!(envelope.kind(), NotificationKind::NewOrder);
    assert_eq!(envelope.topic(), "admin_orders");
    assert_eq!(envelope.title(), "🎉 New Order Received!");
    assert_eq!(
        envelope.data().get("orderId").map(String::as_str),
        Some("1024")
    );
    assert_eq!(envelope.data().get("type").map(String::as_str), Some("order"));
    for fragment in ["1024", "Asha", "499"] {
        assert!(
            envelope.body().contains(fragment),
            "body {:?} should mention {fragment}",
            envelope.body()
        );
    }
}

#[rstest]
fn user_envelope_matches_scenario() {
    let envelope = build_user_envelope("Rohan", "rohan@example.com").expect("valid user");

    assert_eq!(envelope.kind(), NotificationKind::NewUser);
    assert_eq!(envelope.topic(), "admin_new_users");
    assert_eq!(envelope.title(), "👤 New User Registered");
    assert_eq!(envelope.body(), "Rohan just joined.");
    assert_eq!(
        envelope.data().get("email").map(String::as_str),
        Some("rohan@example.com")
    );
    assert_eq!(envelope.data().get("type").map(String::as_str), Some("user"));
}

#[rstest]
#[case::numeric_id("77")]
#[case::uuid_like("ord-3fa85f64")]
#[case::padded("  A-9  ")]
fn order_envelopes_have_non_empty_fields(amount: Amount, #[case] order_id: &str) {
    let envelope = build_order_envelope(order_id, amount, "Meera").expect("valid order");

    assert!(!envelope.title().is_empty());
    assert!(!envelope.body().is_empty());
    assert!(!envelope.topic().is_empty());
    assert!(envelope.data().values().all(|value| !value.is_empty()));
    assert_eq!(
        envelope.data().get(DATA_ORDER_ID).map(String::as_str),
        Some(order_id.trim())
    );
}

#[rstest]
#[case::empty("")]
#[case::blank("   ")]
fn blank_order_id_is_rejected(amount: Amount, #[case] order_id: &str) {
    let error = build_order_envelope(order_id, amount, "Asha").expect_err("must fail");
    assert_eq!(error, EnvelopeValidationError::EmptyOrderId);
}

#[rstest]
#[case::empty("")]
#[case::blank(" \t")]
fn blank_customer_name_is_rejected(amount: Amount, #[case] customer: &str) {
    let error = build_order_envelope(1_u64, amount, customer).expect_err("must fail");
    assert_eq!(
        error,
        EnvelopeValidationError::EmptyName {
            field: "customer name"
        }
    );
}

#[rstest]
#[case::empty_name("", "rohan@example.com", EnvelopeValidationError::EmptyName { field: "user name" })]
#[case::empty_email("Rohan", "", EnvelopeValidationError::EmptyEmail)]
#[case::blank_email("Rohan", "   ", EnvelopeValidationError::EmptyEmail)]
fn blank_user_fields_are_rejected(
    #[case] name: &str,
    #[case] email: &str,
    #[case] expected: EnvelopeValidationError,
) {
    let error = build_user_envelope(name, email).expect_err("must fail");
    assert_eq!(error, expected);
}

#[rstest]
#[case::missing_at("rohan.example.com")]
#[case::missing_domain("rohan@")]
#[case::missing_tld("rohan@example")]
#[case::inner_space("ro han@example.com")]
#[case::double_at("rohan@@example.com")]
fn malformed_email_is_rejected(#[case] email: &str) {
    let error = build_user_envelope("Rohan", email).expect_err("must fail");
    assert!(
        matches!(error, EnvelopeValidationError::MalformedEmail { .. }),
        "expected MalformedEmail for {email:?}, got {error:?}"
    );
}

#[test]
fn kinds_own_fixed_topics() {
    assert_eq!(NotificationKind::NewOrder.topic(), ORDER_TOPIC);
    assert_eq!(NotificationKind::NewUser.topic(), NEW_USER_TOPIC);
    assert_eq!(NotificationKind::NewOrder.to_string(), "new_order");
    assert_eq!(NotificationKind::NewUser.to_string(), "new_user");
}

#[test]
fn builders_are_deterministic() {
    let first = build_user_envelope("Rohan", "rohan@example.com").expect("valid user");
    let second = build_user_envelope("Rohan", "rohan@example.com").expect("valid user");
    assert_eq!(first, second);
}
