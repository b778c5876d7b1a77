// handlers/mod.rs - HTTP handlers grouped by resource
//
// Handlers only extract and validate input, then hand over to a service.
// Every handler answers with an Envelope whose code is also the HTTP status.
pub mod articles; // /api/v1/articles/*
pub mod users;    // /api/v1/users/*
