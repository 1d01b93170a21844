pub mod choice_repository;
pub mod question_repository;
pub mod vote_repository;

pub use choice_repository::*;
pub use question_repository::*;
pub use vote_repository::*;
