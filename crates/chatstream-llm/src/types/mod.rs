pub mod message;
pub mod request;

pub use message::{Message, Role};
pub use request::{ChatCompletionBody, ChatOptions, ChatRequest};
