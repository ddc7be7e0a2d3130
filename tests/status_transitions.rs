use contributions_gateway::domain::contribution::TransactionStatus::*;
use contributions_gateway::domain::status::{
    apply_reported, can_transition, is_terminal, StatusDecision,
};

#[test]
fn pending_is_the_only_open_state() {
    assert!(!is_terminal(Pending));
    assert!(!is_terminal(Approved));
    assert!(is_terminal(Refused));
    assert!(is_terminal(Refunded));
}

#[test]
fn transition_table_is_exactly_the_allowed_set() {
    let all = [Pending, Approved, Refused, Refunded];
    let allowed = [
        (Pending, Approved),
        (Pending, Refused),
        (Pending, Refunded),
        (Approved, Refunded),
    ];

    for from in all {
        for to in all {
            let expected = allowed.contains(&(from, to));
            assert_eq!(
                can_transition(from, to),
                expected,
                "{} -> {}",
                from.as_str(),
                to.as_str()
            );
        }
    }
}

#[test]
fn an_approved_transaction_never_goes_back_to_pending() {
    assert_eq!(apply_reported(Approved, Pending), StatusDecision::Ignore);
}

#[test]
fn a_refund_after_approval_is_applied() {
    assert_eq!(apply_reported(Approved, Refunded), StatusDecision::Apply(Refunded));
}

#[test]
fn provider_redelivery_is_idempotent() {
    for status in [Pending, Approved, Refused, Refunded] {
        assert_eq!(apply_reported(status, status), StatusDecision::Ignore);
    }
}
