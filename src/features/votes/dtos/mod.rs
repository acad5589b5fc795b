mod vote_dto;

pub use vote_dto::VoteResultDto;
