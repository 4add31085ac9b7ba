//! Axum extractors for order requests

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::core::error::{OrderError, ValidationError};

/// JSON body whose rejections render as order errors
///
/// Axum's own `Json` answers malformed bodies with a plain-text 4xx. This
/// wrapper turns every rejection (bad syntax, wrong shape, missing content
/// type) into a 400 with the usual `{success, message}` body.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = OrderError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ValidationError::InvalidJson {
                message: rejection.body_text(),
            }
            .into()),
        }
    }
}
