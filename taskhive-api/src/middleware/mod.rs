/// Middleware modules for the API server
///
/// Session authentication lives with the router in [`crate::app`]; this
/// module holds the response-side layers.

pub mod security;
