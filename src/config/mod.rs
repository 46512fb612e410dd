pub mod environment;
pub mod secrets;

pub use environment::Config;
pub use secrets::{load_jwt_secret, read_secret_file};
