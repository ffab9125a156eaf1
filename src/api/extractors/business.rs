use axum::{
    extract::{FromRequestParts, Path},
    http::{request::Parts, StatusCode},
};
use std::collections::HashMap;
use crate::state::AppState;
use std::sync::Arc;
use tracing::Span;

/// The tenant every scheduling route is scoped to. Ownership of the addressed
/// staff member, slot or appointment is checked by the services.
pub struct BusinessId(pub String);

impl FromRequestParts<Arc<AppState>> for BusinessId {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let params: Path<HashMap<String, String>> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;

        let business_id = params.get("business_id").ok_or(StatusCode::BAD_REQUEST)?;
        if business_id.trim().is_empty() {
            return Err(StatusCode::BAD_REQUEST);
        }

        Span::current().record("business_id", business_id.as_str());
        Ok(BusinessId(business_id.clone()))
    }
}
