pub mod account;
pub mod book;
pub mod metrics;
pub mod order;
pub mod trader;
pub mod webhook;
