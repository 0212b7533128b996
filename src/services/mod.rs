pub mod category_service;
pub mod product_service;
pub mod report_service;
pub mod transaction_service;
