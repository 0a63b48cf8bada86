//! Price-series indicators: SMA, EMA, RSI, MACD and Bollinger Bands.

pub mod indicators;

pub use indicators::{bollinger_bands, ema, macd, rsi, sma, BollingerBands, MacdResult};
