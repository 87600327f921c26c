mod client;
mod transactions;

pub use client::DocumentClient;
