pub mod creditdb;
pub mod db;
pub mod payoutdb;
pub mod usagedb;
pub mod userdb;
