mod vote_handler;

pub use vote_handler::{__path_downvote, __path_upvote, downvote, upvote};
