pub mod cart;
pub mod errors;
pub mod ids;
pub mod order;
pub mod policy;
pub mod ports;
