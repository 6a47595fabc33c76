pub mod provider;
pub mod slack;
pub mod types;

pub use provider::{ChatService, ServiceError};
pub use slack::SlackService;
pub use types::{
    Attachment, AttachmentField, ChannelDescriptor, ChannelKind, Presence, RawMessage,
    StreamEvent, UserDescriptor,
};
