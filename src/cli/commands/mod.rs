pub mod password;
pub mod serve;
