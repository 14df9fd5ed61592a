pub mod board;
pub mod ideas;

pub use board::PriorityBoard;
pub use ideas::{Attachment, IdeaPatch, IdeaService, Submission};
