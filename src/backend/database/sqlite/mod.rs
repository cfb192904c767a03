pub mod backend_impl;
pub mod repository_impl;
pub mod schema;

pub use backend_impl::SqliteBackend;
pub use repository_impl::SqliteRepository;
