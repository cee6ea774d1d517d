//! API models for persisted records and request/response payloads

pub mod content;
pub mod user;

pub use content::{
    ChatEntry, ChatHistoryQuery, ChatRequest, ChatResponse, Document, DocumentResponse,
    FileSummaryResponse, ImageData, NewChatEntry, NewDocument, PredictionResponse,
    SummarizationRequest, SummarizationResponse, SummarizeFileQuery, UploadResponse,
};
pub use user::{
    CreateUserRequest, LoginForm, NewUser, TokenResponse, User, UserCountResponse, UserListQuery,
    UserResponse,
};
