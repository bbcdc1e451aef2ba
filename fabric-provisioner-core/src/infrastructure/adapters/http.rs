// fabric-provisioner-core/src/infrastructure/adapters/http.rs

use reqwest::{Client, Response};
use std::time::Duration;

use crate::infrastructure::error::InfrastructureError;

/// Shared HTTP client for every REST adapter.
pub fn build_client(timeout: Duration) -> Result<Client, InfrastructureError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Passes 2xx responses through and turns anything else into
/// `InfrastructureError::Api` with the response body.
pub(crate) async fn ensure_success(
    response: Response,
    context: &str,
) -> Result<Response, InfrastructureError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(InfrastructureError::Api {
        context: context.to_string(),
        status: status.as_u16(),
        body: body.chars().take(500).collect(),
    })
}
