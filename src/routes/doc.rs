use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        transactions::{CheckoutRequest, TransactionList},
    },
    models::{
        Category, CheckoutItem, Product, ReportSummary, TopProduct, Transaction,
        TransactionDetail,
    },
    response::{ApiResponse, Meta},
    routes::{categories, health, params, products, report, transactions},
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Kasir API", description = "Point-of-sale backend: catalog, checkout and daily report"),
    paths(
        health::health_check,
        health::readiness,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        categories::list_categories,
        categories::create_category,
        categories::get_category,
        categories::update_category,
        categories::delete_category,
        transactions::checkout,
        transactions::list_transactions,
        transactions::get_transaction,
        report::today
    ),
    components(
        schemas(
            Product,
            Category,
            CheckoutItem,
            Transaction,
            TransactionDetail,
            ReportSummary,
            TopProduct,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryList,
            CheckoutRequest,
            TransactionList,
            health::HealthData,
            health::ReadinessData,
            params::Pagination,
            params::ProductQuery,
            params::TransactionListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Category>,
            ApiResponse<CategoryList>,
            ApiResponse<Transaction>,
            ApiResponse<TransactionList>,
            ApiResponse<ReportSummary>
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Products", description = "Product catalog"),
        (name = "Categories", description = "Product categories"),
        (name = "Transactions", description = "Checkout and sales history"),
        (name = "Report", description = "Daily sales summary"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
