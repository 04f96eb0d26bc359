pub mod binance;
pub mod coingecko;

pub use binance::BinanceClient;
pub use coingecko::CoinGeckoClient;
