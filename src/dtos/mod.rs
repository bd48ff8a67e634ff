use serde::{Deserialize, Serialize};

pub mod giftdtos;
pub mod payoutdtos;
pub mod usagedtos;
pub mod walletdtos;

/// Envelope every success response ships in.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}
