//! Data Models
//!
//! Call-type taxonomy and the request/response shapes exchanged with the AI
//! service.

mod call_type;
mod requests;
mod responses;

pub use call_type::CallType;
pub use requests::{ChatMessage, ChatRequest, DecomposeRequest, Role, SuggestionRequest};
pub use responses::{ChatReply, DecomposeReply, GoalPlan, Milestone, Suggestion, SuggestionsReply};
