//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::AppServices;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::{ApiResponse, EmptyData, PaginatedResponse};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::{
    batteries, customers, dashboard, health, metrics, payments, rentals, request_id,
};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("HS256 JWT with `sub` and `role` (admin or staff)"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Batteries
        batteries::list_batteries,
        batteries::create_battery,
        batteries::get_battery,
        batteries::update_battery,
        batteries::delete_battery,
        // Customers
        customers::list_customers,
        customers::create_customer,
        customers::get_customer,
        customers::update_customer,
        customers::delete_customer,
        customers::list_customer_rentals,
        customers::list_customer_payments,
        customers::recompute_credit_rating,
        // Rentals
        rentals::list_rentals,
        rentals::create_rental,
        rentals::get_rental,
        rentals::return_battery,
        // Payments
        payments::list_payments,
        payments::record_payment,
        payments::get_payment,
        // Dashboard
        dashboard::get_summary,
        dashboard::get_earnings,
        dashboard::get_top_customers,
        dashboard::get_low_credit_customers,
    ),
    components(
        schemas(
            // Common
            ApiResponse<EmptyData>,
            EmptyData,
            PaginatedResponse<batteries::BatteryDto>,
            PaginatedResponse<customers::CustomerDto>,
            PaginatedResponse<rentals::RentalDto>,
            PaginatedResponse<payments::PaymentDto>,
            health::HealthResponse,
            health::ComponentHealth,
            // Batteries
            batteries::BatteryDto,
            batteries::CreateBatteryRequest,
            batteries::UpdateBatteryRequest,
            // Customers
            customers::CustomerDto,
            customers::CustomerDetailDto,
            customers::CreateCustomerRequest,
            customers::UpdateCustomerRequest,
            // Rentals
            rentals::RentalDto,
            rentals::RentalDetailDto,
            rentals::CreateRentalRequest,
            rentals::ReturnBatteryRequest,
            // Payments
            payments::PaymentDto,
            payments::PaymentReceiptDto,
            payments::RecordPaymentRequest,
            // Dashboard
            dashboard::DashboardSummaryDto,
            dashboard::InventoryCountsDto,
            dashboard::EarningsDto,
            dashboard::TopCustomerDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database reachability"),
        (name = "Batteries", description = "Battery inventory"),
        (name = "Customers", description = "Customer registry and credit rating"),
        (name = "Rentals", description = "Handing out and taking back batteries"),
        (name = "Payments", description = "Append-only payment ledger"),
        (name = "Dashboard", description = "Business overview and reports"),
    ),
    info(
        title = "Battery Rental API",
        version = "1.0.0",
        description = "Back office for a battery rental shop: inventory, customers, rentals, payments and credit ratings",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes.
///
/// `/api/v1/*` requires a bearer token; `/health`, `/metrics`, `/docs` and
/// `/api-doc/openapi.json` are public. `/metrics` is only mounted when a
/// Prometheus recorder is installed.
pub fn create_api_router(
    services: AppServices,
    db: DatabaseConnection,
    jwt_config: JwtConfig,
    metrics_handle: Option<PrometheusHandle>,
    started_at: Instant,
) -> Router {
    let auth_state = AuthState { jwt_config };

    let battery_routes = Router::new()
        .route(
            "/",
            get(batteries::list_batteries).post(batteries::create_battery),
        )
        .route(
            "/{id}",
            get(batteries::get_battery)
                .put(batteries::update_battery)
                .delete(batteries::delete_battery),
        )
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(batteries::BatteryHandlerState {
            inventory: Arc::clone(&services.inventory),
        });

    let customer_routes = Router::new()
        .route(
            "/",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/{id}",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route("/{id}/rentals", get(customers::list_customer_rentals))
        .route("/{id}/payments", get(customers::list_customer_payments))
        .route(
            "/{id}/credit-rating/recompute",
            post(customers::recompute_credit_rating),
        )
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(customers::CustomerHandlerState {
            customers: Arc::clone(&services.customers),
        });

    let rental_routes = Router::new()
        .route("/", get(rentals::list_rentals).post(rentals::create_rental))
        .route("/{id}", get(rentals::get_rental))
        .route("/{id}/return", post(rentals::return_battery))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(rentals::RentalHandlerState {
            rentals: Arc::clone(&services.rentals),
        });

    let payment_routes = Router::new()
        .route(
            "/",
            get(payments::list_payments).post(payments::record_payment),
        )
        .route("/{id}", get(payments::get_payment))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(payments::PaymentHandlerState {
            payments: Arc::clone(&services.payments),
        });

    let dashboard_routes = Router::new()
        .route("/summary", get(dashboard::get_summary))
        .route("/earnings", get(dashboard::get_earnings))
        .route("/top-customers", get(dashboard::get_top_customers))
        .route(
            "/low-credit-customers",
            get(dashboard::get_low_credit_customers),
        )
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(dashboard::DashboardHandlerState {
            dashboard: Arc::clone(&services.dashboard),
        });

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db,
            started_at: Arc::new(started_at),
        });

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .nest("/api/v1/batteries", battery_routes)
        .nest("/api/v1/customers", customer_routes)
        .nest("/api/v1/rentals", rental_routes)
        .nest("/api/v1/payments", payment_routes)
        .nest("/api/v1/dashboard", dashboard_routes);

    if let Some(handle) = metrics_handle {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics::MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::request_id_middleware))
}
