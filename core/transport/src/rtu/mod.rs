pub mod link;
pub mod port;
