//! # finlearn Web
//!
//! JSON API serving the SPY market overview, per-ticker candlestick charts and
//! news headlines.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /api/market-overview` | One month of SPY closes with `YYYY-MM-DD` dates |
//! | `GET /api/stocks/{ticker}/chart` | Plotly candlestick figure (`period`, `interval` query) |
//! | `GET /api/news` | Up to five recent headlines (`q` query) |
//! | `GET /health` | Liveness probe |

pub mod api;

pub use api::{router, ApiError, AppState};

/// Environment variable holding the listen address.
pub const BIND_ADDR_ENV: &str = "FINLEARN_BIND_ADDR";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Listen address from [`BIND_ADDR_ENV`], else [`DEFAULT_BIND_ADDR`].
pub fn bind_addr() -> String {
    std::env::var(BIND_ADDR_ENV)
        .ok()
        .filter(|addr| !addr.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned())
}
