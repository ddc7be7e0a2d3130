use crate::domain::contribution::TransactionStatus;

/// Outcome of feeding a provider-reported status into the ledger. Regressions
/// and redeliveries are dropped, never applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusDecision {
    Apply(TransactionStatus),
    Ignore,
}

pub fn can_transition(from: TransactionStatus, to: TransactionStatus) -> bool {
    use TransactionStatus::*;
    matches!(
        (from, to),
        (Pending, Approved) | (Pending, Refused) | (Pending, Refunded) | (Approved, Refunded)
    )
}

pub fn is_terminal(status: TransactionStatus) -> bool {
    matches!(status, TransactionStatus::Refused | TransactionStatus::Refunded)
}

pub fn apply_reported(current: TransactionStatus, reported: TransactionStatus) -> StatusDecision {
    if current == reported {
        return StatusDecision::Ignore;
    }
    if can_transition(current, reported) {
        StatusDecision::Apply(reported)
    } else {
        StatusDecision::Ignore
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contribution::TransactionStatus::*;

    #[test]
    fn pending_moves_to_any_verdict() {
        assert_eq!(apply_reported(Pending, Approved), StatusDecision::Apply(Approved));
        assert_eq!(apply_reported(Pending, Refused), StatusDecision::Apply(Refused));
        assert_eq!(apply_reported(Pending, Refunded), StatusDecision::Apply(Refunded));
    }

    #[test]
    fn approved_only_moves_to_refunded() {
        assert_eq!(apply_reported(Approved, Refunded), StatusDecision::Apply(Refunded));
        assert_eq!(apply_reported(Approved, Pending), StatusDecision::Ignore);
        assert_eq!(apply_reported(Approved, Refused), StatusDecision::Ignore);
    }

    #[test]
    fn terminal_statuses_never_regress() {
        assert_eq!(apply_reported(Refused, Approved), StatusDecision::Ignore);
        assert_eq!(apply_reported(Refused, Pending), StatusDecision::Ignore);
        assert_eq!(apply_reported(Refunded, Approved), StatusDecision::Ignore);
        assert_eq!(apply_reported(Refunded, Pending), StatusDecision::Ignore);
    }

    #[test]
    fn redelivered_status_is_a_no_op() {
        assert_eq!(apply_reported(Approved, Approved), StatusDecision::Ignore);
        assert_eq!(apply_reported(Pending, Pending), StatusDecision::Ignore);
    }
}
