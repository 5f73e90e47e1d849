use crate::error::{Result, SchwabError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Error body returned by the trader and market data APIs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Short description
    pub message: String,

    /// Detail lines
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ErrorMessage {
    /// One-line rendering of the message and its details
    pub fn summary(&self) -> String {
        if self.errors.is_empty() {
            self.message.clone()
        } else {
            format!("{} ({})", self.message, self.errors.join("; "))
        }
    }
}

/// Return the response if its status is a success, an API error otherwise
pub async fn ensure_success(
    response: reqwest::Response,
    operation: &str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(operation, status = %status, "API request failed");
    Err(SchwabError::api(operation, status.as_u16(), body))
}

/// Check the status and decode the JSON body
pub async fn parse_json<T>(response: reqwest::Response, operation: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let response = ensure_success(response, operation).await?;
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(SchwabError::from)
}

/// Order id at the end of a `Location` header such as
/// `https://api.schwabapi.com/trader/v1/accounts/HASH/orders/1000847830245`
pub fn order_id_from_location(location: &str) -> Option<i64> {
    let url = url::Url::parse(location).ok();
    let path = url.as_ref().map(|u| u.path()).unwrap_or(location);

    let mut segments = path.trim_end_matches('/').rsplit('/');
    let id = segments.next()?;
    match segments.next() {
        Some("orders") => id.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_deserialization() {
        let json = r#"{"message": "Order not found", "errors": ["orderId 1"]}"#;
        let err: ErrorMessage = serde_json::from_str(json).unwrap();
        assert_eq!(err.summary(), "Order not found (orderId 1)");

        let bare: ErrorMessage = serde_json::from_str(r#"{"message": "Unauthorized"}"#).unwrap();
        assert_eq!(bare.summary(), "Unauthorized");
    }

    #[test]
    fn test_order_id_from_location() {
        assert_eq!(
            order_id_from_location(
                "https://api.schwabapi.com/trader/v1/accounts/HASHHERE/orders/1000847830245"
            ),
            Some(1000847830245)
        );
        assert_eq!(order_id_from_location("/trader/v1/accounts/H/orders/42/"), Some(42));
        assert_eq!(order_id_from_location("https://api.schwabapi.com/trader/v1/accounts/H"), None);
        assert_eq!(order_id_from_location("orders/abc"), None);
    }
}
