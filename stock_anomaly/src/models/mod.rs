pub mod bar;
pub mod price;
pub mod report;
pub mod request_params;
