//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use crate::adapters::ExportFormat;
use crate::models::{
    // Customer models
    CreateCustomerRequest,
    // Invoice models
    CreateInvoiceRequest,
    CustomerResponse,
    DateConstraintsResponse,
    HealthCheck,
    InvoiceItemRequest,
    InvoiceItemResponse,
    InvoiceListResponse,
    InvoiceRefResponse,
    InvoiceResponse,
    UpdateCustomerRequest,
    UpdateInvoiceRequest,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::health::health_check,
        // Customer endpoints
        super::customers::list_customers,
        super::customers::create_customer,
        super::customers::get_customer_by_code,
        super::customers::get_customer,
        super::customers::update_customer,
        super::customers::delete_customer,
        // Invoice endpoints
        super::invoices::list_invoices,
        super::invoices::create_invoice,
        super::invoices::get_invoice,
        super::invoices::update_invoice,
        super::invoices::delete_invoice,
        super::invoices::get_date_constraints,
        super::invoices::export_invoices,
    ),
    info(
        title = "Tally API",
        version = "0.1.0",
        description = "Bookkeeping API for customers and sales invoices.\n\nInvoice totals are computed server-side under a 5% business tax; neighbouring invoice numbers bound the dates an invoice may carry.",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Customer", description = "Customer management"),
        (name = "Invoice", description = "Invoices, date constraints and exports"),
    ),
    components(
        schemas(
            HealthCheck,
            // Customer
            CreateCustomerRequest,
            UpdateCustomerRequest,
            CustomerResponse,
            // Invoice
            CreateInvoiceRequest,
            UpdateInvoiceRequest,
            InvoiceItemRequest,
            InvoiceItemResponse,
            InvoiceResponse,
            InvoiceListResponse,
            InvoiceRefResponse,
            DateConstraintsResponse,
            ExportFormat,
        )
    ),
)]
pub struct ApiDoc;
