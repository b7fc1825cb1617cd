use axum::http::StatusCode;
use serde_json::Value;

use super::actions::ApiResponse;

impl ApiResponse {
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "unexpected status, body: {}",
            self.body
        );
        self
    }

    pub fn assert_detail(&self, expected: &str) -> &Self {
        assert_eq!(self.body["detail"], expected, "body: {}", self.body);
        self
    }

    pub fn rows(&self) -> &Vec<Value> {
        self.body
            .as_array()
            .unwrap_or_else(|| panic!("expected a JSON array, got {}", self.body))
    }
}

/// Asserts the dashboard counters in order: total, positive, neutral, negative, unacknowledged
pub fn assert_stats(body: &Value, expected: [i64; 5]) {
    let actual = [
        body["total_feedback"].as_i64().unwrap(),
        body["positive_feedback"].as_i64().unwrap(),
        body["neutral_feedback"].as_i64().unwrap(),
        body["negative_feedback"].as_i64().unwrap(),
        body["unacknowledged_feedback"].as_i64().unwrap(),
    ];
    assert_eq!(actual, expected, "stats: {}", body);
    assert_eq!(actual[0], actual[1] + actual[2] + actual[3]);
}
