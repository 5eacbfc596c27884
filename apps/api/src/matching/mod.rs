// Matching: the Match record, its store, the engine that guards pair
// uniqueness, and the HTTP handlers on top.

pub mod engine;
pub mod handlers;
pub mod models;
pub mod store;
