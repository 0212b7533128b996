pub mod categories;
pub mod products;
pub mod transaction_details;
pub mod transactions;

pub use categories::Entity as Categories;
pub use products::Entity as Products;
pub use transaction_details::Entity as TransactionDetails;
pub use transactions::Entity as Transactions;
