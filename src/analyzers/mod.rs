pub mod activity;
pub mod authors;
pub mod heatmap;
pub mod rankings;
pub mod time_of_day;
pub mod trends;
