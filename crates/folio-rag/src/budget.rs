//! Per-conversation token budget.
//!
//! The budget is advisory and caller-enforced: the server stores nothing,
//! the running total travels in the request/response envelope, and the
//! guard is a stateless function of that total. A turn that crosses the
//! limit still gets its answer; only the next turn is blocked.

/// Stateless token ceiling.
#[derive(Debug, Clone, Copy)]
pub struct TokenBudget {
    limit: u32,
}

impl TokenBudget {
    pub fn new(limit: u32) -> Self {
        Self { limit }
    }

    /// Preflight: true when the conversation must not spend any more tokens.
    pub fn is_exhausted(&self, used_so_far: u32) -> bool {
        used_so_far >= self.limit
    }

    /// Postflight: fold this turn's spend into the running total and report
    /// whether the ceiling has now been reached.
    pub fn settle(&self, used_so_far: u32, tokens_this_turn: u32) -> (u32, bool) {
        let new_total = used_so_far.saturating_add(tokens_this_turn);
        (new_total, new_total >= self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preflight_blocks_at_limit() {
        let budget = TokenBudget::new(3000);
        assert!(!budget.is_exhausted(0));
        assert!(!budget.is_exhausted(2999));
        assert!(budget.is_exhausted(3000));
        assert!(budget.is_exhausted(4500));
    }

    #[test]
    fn test_settle_accumulates() {
        let budget = TokenBudget::new(3000);
        let (total, reached) = budget.settle(100, 250);
        assert_eq!(total, 350);
        assert!(!reached);
    }

    #[test]
    fn test_settle_reports_crossing() {
        let budget = TokenBudget::new(3000);
        let (total, reached) = budget.settle(2900, 200);
        assert_eq!(total, 3100);
        assert!(reached);

        // Landing exactly on the limit counts as reached
        let (total, reached) = budget.settle(2800, 200);
        assert_eq!(total, 3000);
        assert!(reached);
    }

    #[test]
    fn test_settle_saturates() {
        let budget = TokenBudget::new(3000);
        let (total, reached) = budget.settle(u32::MAX, 10);
        assert_eq!(total, u32::MAX);
        assert!(reached);
    }
}
