//! Relay HTTP wire types, shared by the server and the client

use serde::{Deserialize, Serialize};

/// Body of `POST /move` and `POST /evaluate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRequest {
    /// Space-separated coordinate moves from the start position
    pub position: String,
}

impl PositionRequest {
    pub fn new(position: impl Into<String>) -> Self {
        Self {
            position: position.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    #[serde(rename = "move")]
    pub best_move: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub evaluation: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of `GET /`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn move_field_is_named_move() {
        let body = serde_json::to_value(MoveResponse {
            best_move: "e2e4".into(),
        })
        .unwrap();
        assert_eq!(body, json!({ "move": "e2e4" }));
    }

    #[test]
    fn position_request_reads_move_list() {
        let req: PositionRequest = serde_json::from_str(r#"{"position":"e2e4 e7e5"}"#).unwrap();
        assert_eq!(req.position, "e2e4 e7e5");
    }

    #[test]
    fn evaluation_is_a_number() {
        let resp: EvaluationResponse = serde_json::from_value(json!({ "evaluation": -0.5 })).unwrap();
        assert_eq!(resp.evaluation, -0.5);
    }
}
