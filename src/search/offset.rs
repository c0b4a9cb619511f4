//! Match-offset policy: where the cursor lands relative to an accepted
//! match.

use std::str::FromStr;

/// Cursor placement rule applied at accept/next/previous time (never while
/// incrementally typing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchOffset {
    /// No positional adjustment; the cursor sits on the match boundary
    /// nearest the travel direction.
    #[default]
    Inclusive,
    /// Land just outside the match, on the approach side.
    Exclusive,
    /// Always land at the match start.
    Start,
    /// Always land at the match end.
    End,
}

impl MatchOffset {
    /// The cursor delta for a match of `len` bytes travelled towards in
    /// direction `forward`, and whether the cursor ends up at the match
    /// start afterwards. The at-start flag is what makes
    /// [`unposition_delta`] an exact inverse.
    pub fn position_delta(self, len: usize, forward: bool) -> (isize, bool) {
        let len = len as isize;
        match self {
            MatchOffset::Inclusive => (0, !forward),
            MatchOffset::Exclusive => (if forward { -len } else { len }, forward),
            MatchOffset::Start => (if forward { -len } else { 0 }, true),
            MatchOffset::End => (if forward { 0 } else { len }, false),
        }
    }
}

/// Reverses the last-applied offset before a recompute, exactly when the
/// previous positioning moved the cursor in the direction of the upcoming
/// search: returns the delta restoring the raw match-boundary position.
pub fn unposition_delta(len: usize, at_start: bool, forward: bool) -> isize {
    if at_start == forward {
        if forward {
            len as isize
        } else {
            -(len as isize)
        }
    } else {
        0
    }
}

impl FromStr for MatchOffset {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inclusive" => Ok(MatchOffset::Inclusive),
            "exclusive" => Ok(MatchOffset::Exclusive),
            "start" => Ok(MatchOffset::Start),
            "end" => Ok(MatchOffset::End),
            _ => Err(()),
        }
    }
}
