mod model;
mod repository;

pub use model::{ChatMessageDB, ConversationDB};
pub use repository::ChatRepository;
