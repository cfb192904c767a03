pub mod backend_impl;
pub mod repository_impl;
pub mod schema;

pub use backend_impl::PostgresBackend;
pub use repository_impl::PostgresRepository;
