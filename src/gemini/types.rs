use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// generateContent wire types
// POST {baseURL}/models/{model}:generateContent
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

// ---------------------------------------------------------------------------
// Error envelope returned on non-2xx responses
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    pub code: Option<u16>,
    pub message: Option<String>,
    /// Canonical status name, e.g. "RESOURCE_EXHAUSTED" | "UNAVAILABLE".
    pub status: Option<String>,
}
