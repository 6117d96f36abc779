pub mod data_point;
pub mod frame;
pub mod response;
pub mod types;

pub use data_point::{FieldSeries, Point};
pub use frame::OhlcvFrameExt;
pub use response::{field, ChartBatch, ChartSource, HistoricalDataResponse, StockChart};
pub use types::{ColumnName, DataFormat, OhlcvFormat, PriceField};
