use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST .../comments`. Both fields are required; they are optional
/// here so that a missing field surfaces as a domain error instead of a
/// deserialization failure.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateCommentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Query of `GET .../comments`. Values that are not non-negative integers are
/// dropped rather than rejected, which leaves pagination off.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CommentListParams {
    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub page: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<u32>,
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse().ok()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> CommentListParams {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn list_params_parse_numbers() {
        let params = parse(r#"{"page": "2", "size": "10"}"#);
        assert_eq!(params.page, Some(2));
        assert_eq!(params.size, Some(10));
    }

    #[test]
    fn list_params_drop_unparsable_values() {
        let params = parse(r#"{"page": "abc", "size": "-1"}"#);
        assert_eq!(params.page, None);
        assert_eq!(params.size, None);

        let params = parse(r#"{"page": "", "size": "99999999999"}"#);
        assert_eq!(params.page, None);
        assert_eq!(params.size, None);
    }

    #[test]
    fn list_params_default_to_none() {
        let params = parse("{}");
        assert_eq!(params.page, None);
        assert_eq!(params.size, None);
    }
}
