//! Alpaca Market Data v2 historical stock bars.
//!
//! Credentials come from `APCA_API_KEY_ID` / `APCA_API_SECRET_KEY`.

pub mod params;
pub mod provider;
pub mod response;
