//! Adapters behind the domain ports: storage backends and gateway clients.

pub mod in_memory;
pub mod mock;
pub mod razorpay;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod signature;
