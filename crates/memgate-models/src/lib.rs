//! Memgate Models — domain types for the conversational memory gateway
//!
//! These types are shared by every memory backend:
//!
//! - [`ContentBlock`] / [`Message`]: one conversational turn and its
//!   structured content.
//! - [`SessionContext`]: an ordered conversation for one user, always
//!   derived on demand from backend events, never persisted here.
//! - Request/response types for the four gateway operations
//!   (get session context, upsert session context, get memories,
//!   create memory).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod content;
mod message;
mod request;
mod session;

pub use content::ContentBlock;
pub use message::{Message, MessageRole};
pub use request::{
    CreateMemoryRequest, CreateMemoryResponse, GetMemoriesRequest, GetMemoriesResponse,
    GetSessionContextRequest, GetSessionContextResponse, MemoryEvent, MemoryRecord,
    UpsertSessionContextRequest, UpsertSessionContextResponse,
};
pub use session::SessionContext;
