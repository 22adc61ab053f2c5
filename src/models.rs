// Request/response payload types shared by the HTTP handlers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body text returned with every 429
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please try again later.";

/// Generic 500 body; downstream detail stays in the server log
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// In-band reply when the assistant cannot produce one. The conversational
/// surface never shows raw error text.
pub const ASSISTANT_FALLBACK_MESSAGE: &str =
    "I'm sorry, I'm having trouble responding right now. Please try again in a moment.";

/// Statuses a service request may move through
pub const SERVICE_REQUEST_STATUSES: &[&str] =
    &["pending", "reviewing", "scheduled", "completed", "cancelled"];

/// Priorities the triage step may assign
pub const TRIAGE_PRIORITIES: &[&str] = &["low", "medium", "high"];

// Error Body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

// Manager Assistant
#[derive(Debug, Clone, Deserialize)]
pub struct ManagerChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManagerChatResponse {
    pub reply: String,
}

// Speech
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptResponse {
    pub transcript: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TtsRequest {
    #[serde(default)]
    pub text: String,
}

// Service Requests
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceRequestPayload {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub service_type: Option<String>,
    pub location_address: Option<String>,
    pub location_city: Option<String>,
    pub details: Option<String>,
}

impl ServiceRequestPayload {
    /// Names of required fields that are absent or blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.customer_name) {
            missing.push("customer_name");
        }
        if is_blank(&self.customer_email) {
            missing.push("customer_email");
        }
        if is_blank(&self.service_type) {
            missing.push("service_type");
        }
        if is_blank(&self.location_address) {
            missing.push("location_address");
        }
        missing
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceRequestUpdate {
    pub id: Option<Uuid>,
    pub status: Option<String>,
}

/// Structured triage verdict parsed from the model
#[derive(Debug, Clone, Deserialize)]
pub struct RequestTriage {
    pub priority: String,
    #[serde(default)]
    pub summary: String,
}

// Contact Inquiries
#[derive(Debug, Clone, Deserialize)]
pub struct InquiryPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

impl InquiryPayload {
    /// Names of required fields that are absent or blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.name) {
            missing.push("name");
        }
        if is_blank(&self.email) {
            missing.push("email");
        }
        if is_blank(&self.message) {
            missing.push("message");
        }
        missing
    }
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, |s| s.trim().is_empty())
}
