pub mod candle;
pub mod interval;
pub mod series;
pub mod window;
