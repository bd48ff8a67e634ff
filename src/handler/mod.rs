pub mod gifts;
pub mod payouts;
pub mod usage;
pub mod wallet;
