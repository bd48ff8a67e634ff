pub mod error;
pub mod gift_service;
pub mod notification_service;
pub mod payout_service;
pub mod quota_service;
