pub mod groups;
pub mod logging;
pub mod notify;
pub mod storage;
