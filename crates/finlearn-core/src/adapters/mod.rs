//! Provider adapters implementing [`MarketDataSource`](crate::MarketDataSource).

pub mod alphavantage;
pub mod yahoo;

pub use alphavantage::AlphaVantageAdapter;
pub use yahoo::YahooAdapter;
