mod db_message;
mod db_thread;

pub use db_message::{Message, MessageId, MessageRole, NewMessage};
pub use db_thread::{Thread, ThreadId};
