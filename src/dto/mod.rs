//! Response shapes returned by the services and serialized by the routes.

pub mod claims;
pub mod clients;
pub mod depreciation;
pub mod leads;
pub mod organizations;
pub mod webhooks;
