pub mod controller;
pub mod routes;

pub use routes::status_routes;
