pub mod gateway;
pub mod money;
pub mod ports;
pub mod transaction;
