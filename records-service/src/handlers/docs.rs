use askama::Template;
use axum::response::IntoResponse;

#[derive(Debug, Clone, Copy)]
pub struct RouteDoc {
    pub path: &'static str,
    pub method: &'static str,
    pub description: &'static str,
}

pub const ROUTES: &[RouteDoc] = &[
    RouteDoc {
        path: "/get/unisys/payroll",
        method: "GET",
        description: "Fetch all payroll records",
    },
    RouteDoc {
        path: "/get/ibm/shipping",
        method: "GET",
        description: "Fetch all shipping records",
    },
    RouteDoc {
        path: "/update/unisys/payroll",
        method: "POST",
        description: "Update one field of a crew member's payroll record",
    },
    RouteDoc {
        path: "/update/ibm/shipping",
        method: "POST",
        description: "Update one field of a shipping person record",
    },
    RouteDoc {
        path: "/logs",
        method: "GET",
        description: "Return the last 100 lines of the service log",
    },
    RouteDoc {
        path: "/health",
        method: "GET",
        description: "Report process, database and collection health",
    },
];

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub routes: Vec<RouteDoc>,
}

pub async fn index() -> impl IntoResponse {
    IndexTemplate {
        routes: ROUTES.to_vec(),
    }
}
