pub mod health;
pub mod record;

pub use health::health;
pub use record::routes;
