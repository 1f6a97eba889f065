pub mod projection_service;
pub mod return_service;
