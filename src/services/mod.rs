pub mod catalog_fetcher;
pub mod catalog_store;
pub mod conversion;
pub mod excel;
pub mod scheduler;
