mod api;

pub use api::ModelGateway;
