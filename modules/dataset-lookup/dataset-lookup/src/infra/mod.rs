pub mod connectivity;
pub mod http;
pub mod storage;
