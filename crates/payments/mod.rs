pub mod mapper;
pub mod pix_gateway;
pub mod provider_models;
