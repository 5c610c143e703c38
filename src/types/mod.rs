//! 类型系统模块：定义查询分类、对话消息与 HTTP 接口的数据类型。
//!
//! # Types Module
//!
//! Core data types shared by the classifier, generator, cache and HTTP layer.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`QueryType`] | How a transcript gets answered: instant, direct or web search |
//! | [`ClassificationResult`] | Query type plus an optional canned reply |
//! | [`Message`] | Chat message with role and text content |
//! | [`ProcessQueryRequest`] / [`ProcessQueryResponse`] | ProcessQuery wire types |
//! | [`WebSearchRequest`] / [`WebSearchResponse`] | WebSearch wire types |
//!
//! ## Submodules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`query`] | Query classification types |
//! | [`message`] | Conversation messages |
//! | [`api`] | Request/response bodies of the HTTP surface |

pub mod api;
pub mod message;
pub mod query;

pub use api::{
    ClearSessionRequest, ClearSessionResponse, HealthModels, HealthResponse, InterruptCheckResponse,
    ProcessQueryRequest, ProcessQueryResponse, TranscribeResponse, WebSearchRequest,
    WebSearchResponse,
};
pub use message::{Message, MessageRole};
pub use query::{ClassificationResult, QueryType, ResponseKind};
