//! Bid and ask book sides

mod ask_book;
mod bid_book;

pub use ask_book::AskBook;
pub use bid_book::BidBook;
