pub mod domo_api;

pub use domo_api::DomoApi;
