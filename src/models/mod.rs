pub mod creditmodels;
pub mod giftmodels;
pub mod payoutmodels;
pub mod tiermodels;
pub mod usagemodels;
pub mod usermodel;
