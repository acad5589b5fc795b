use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A user's current vote on one report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VoteState {
    #[serde(rename = "none")]
    NoVote,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Upvote,
    Downvote,
}

/// Write needed on the `votes` table for a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChange {
    Insert(i16),
    Update(i16),
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTransition {
    pub next: VoteState,
    /// Change to `reports.upvotes`
    pub upvote_delta: i32,
    pub row_change: RowChange,
}

impl VoteState {
    /// Interpret a stored `votes.value`; no row means no vote
    pub fn from_value(value: Option<i16>) -> Result<Self, String> {
        match value {
            None => Ok(VoteState::NoVote),
            Some(1) => Ok(VoteState::Up),
            Some(-1) => Ok(VoteState::Down),
            Some(other) => Err(format!("Invalid stored vote value {}", other)),
        }
    }

    pub fn value(self) -> Option<i16> {
        match self {
            VoteState::NoVote => None,
            VoteState::Up => Some(1),
            VoteState::Down => Some(-1),
        }
    }

    /// Repeating the current vote withdraws it; the opposite vote replaces it.
    /// Only up votes are counted, so downvotes move the tally only when they
    /// replace an up vote.
    pub fn apply(self, action: VoteAction) -> VoteTransition {
        use RowChange::*;
        use VoteAction::*;
        use VoteState::*;

        let (next, upvote_delta, row_change) = match (self, action) {
            (NoVote, Upvote) => (Up, 1, Insert(1)),
            (Up, Upvote) => (NoVote, -1, Delete),
            (Down, Upvote) => (Up, 1, Update(1)),
            (NoVote, Downvote) => (Down, 0, Insert(-1)),
            (Down, Downvote) => (NoVote, 0, Delete),
            (Up, Downvote) => (Down, -1, Update(-1)),
        };

        VoteTransition {
            next,
            upvote_delta,
            row_change,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use VoteAction::*;
    use VoteState::*;

    #[test]
    fn test_transition_table() {
        let cases = [
            (NoVote, Upvote, Up, 1, RowChange::Insert(1)),
            (Up, Upvote, NoVote, -1, RowChange::Delete),
            (Down, Upvote, Up, 1, RowChange::Update(1)),
            (NoVote, Downvote, Down, 0, RowChange::Insert(-1)),
            (Down, Downvote, NoVote, 0, RowChange::Delete),
            (Up, Downvote, Down, -1, RowChange::Update(-1)),
        ];

        for (from, action, next, delta, row_change) in cases {
            assert_eq!(
                from.apply(action),
                VoteTransition {
                    next,
                    upvote_delta: delta,
                    row_change
                },
                "{:?} + {:?}",
                from,
                action
            );
        }
    }

    #[test]
    fn test_upvote_twice_restores_count() {
        let first = NoVote.apply(Upvote);
        let second = first.next.apply(Upvote);
        assert_eq!(second.next, NoVote);
        assert_eq!(first.upvote_delta + second.upvote_delta, 0);
    }

    #[test]
    fn test_downvote_then_upvote() {
        let mut count: i32 = 0;
        let down = NoVote.apply(Downvote);
        count = (count + down.upvote_delta).max(0);
        let up = down.next.apply(Upvote);
        count = (count + up.upvote_delta).max(0);

        assert_eq!(up.next, Up);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_row_change_matches_stored_value() {
        for from in [NoVote, Up, Down] {
            for action in [Upvote, Downvote] {
                let transition = from.apply(action);
                match transition.row_change {
                    RowChange::Insert(v) | RowChange::Update(v) => {
                        assert_eq!(transition.next.value(), Some(v))
                    }
                    RowChange::Delete => assert_eq!(transition.next, NoVote),
                }
                assert_eq!(
                    from.value().is_none(),
                    matches!(transition.row_change, RowChange::Insert(_))
                );
            }
        }
    }

    #[test]
    fn test_from_value() {
        assert_eq!(VoteState::from_value(None), Ok(NoVote));
        assert_eq!(VoteState::from_value(Some(1)), Ok(Up));
        assert_eq!(VoteState::from_value(Some(-1)), Ok(Down));
        assert!(VoteState::from_value(Some(0)).is_err());
    }

    #[test]
    fn test_serializes_as_lowercase() {
        assert_eq!(serde_json::to_string(&NoVote).unwrap(), "\"none\"");
        assert_eq!(serde_json::to_string(&Up).unwrap(), "\"up\"");
    }
}
