use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::ErrorResponse;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ShipOwl Back-office API",
        description = r#"
Back-office API for the ShipOwl dropshipping platform.

Three panels share the surface under `/api/v1`:

- **admin** — tenant accounts, roles, orders across tenants, reports,
  shipping refresh and email templates
- **supplier** — own catalog, warehouses and routed orders
- **dropshipper** — catalog browsing, order placement and reports

## Authentication

Identity is taken from gateway-set headers: `x-admin-id`,
`x-supplier-id` or `x-dropshipper-id`, with the matching
`x-<panel>-role` header set to `staff` for staff sub-accounts. Staff
calls are additionally gated by their role's module/action permissions.
"#
    ),
    paths(
        handlers::health::api_status,
        handlers::health::health_check,
        handlers::orders::list_admin_orders,
        handlers::reports::admin_order_report,
        handlers::shipping::refresh_tracking,
    ),
    components(schemas(ErrorResponse)),
    tags(
        (name = "health", description = "Service health"),
        (name = "orders", description = "Order management"),
        (name = "reports", description = "Order report aggregation"),
        (name = "shipping", description = "Courier tracking"),
    )
)]
pub struct ApiDoc;

/// Swagger UI router, mounted at `/docs`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
