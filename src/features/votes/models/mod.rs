mod vote;

pub use vote::{RowChange, VoteAction, VoteState, VoteTransition};
