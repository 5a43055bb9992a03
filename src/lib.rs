pub mod app;
pub mod edit;
pub mod logging;
pub mod models;
pub mod render;
pub mod scrollbar;
pub mod storage;
pub mod store;
pub mod ui;
