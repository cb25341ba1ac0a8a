pub mod charts;
pub mod header;
pub mod metric_card;
