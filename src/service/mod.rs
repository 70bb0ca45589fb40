// src/service/mod.rs

// I/O around the audit engine: the HTTP front door, the topic bus, the report
// store and the event-triggered entry point.
pub mod bus;
pub mod events;
pub mod server;
pub mod storage;
