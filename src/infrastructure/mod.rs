pub mod models;
pub mod storefront_repo;

pub use storefront_repo::DieselStorefrontRepository;
