//! HTTP handlers for the resource routes.
//!
//! Each handler decodes its inputs from the [`Request`], calls exactly one
//! [`ResourceService`] operation and encodes the result as JSON.

use std::sync::Arc;

use serde::Serialize;

use super::error::ResourceError;
use super::query::ListQuery;
use super::service::{RecordPayload, ResourceService};
use crate::{Request, Response, Status};

type HandlerResult = Result<Response, ResourceError>;

/// `GET /{prefix}/{resources}`
pub async fn list(req: Request, service: Arc<ResourceService>) -> HandlerResult {
    let pairs = req
        .query_pairs()
        .map_err(|e| ResourceError::validation(format!("invalid query string: {e}")))?;
    let query = ListQuery::from_pairs(pairs, service.pagination())?;
    let page = service.list(&query)?;

    Ok(Response::builder()
        .header("x-total-count", &page.total.to_string())
        .json(to_json(&page.records)?))
}

/// `GET /{prefix}/{resources}/{id}`
pub async fn get(req: Request, service: Arc<ResourceService>) -> HandlerResult {
    let id = record_id(&req, &service)?;
    Ok(Response::json(to_json(&service.get(id)?)?))
}

/// `POST /{prefix}/{resources}`: 201 with a `Location` header.
pub async fn create(req: Request, service: Arc<ResourceService>) -> HandlerResult {
    let record = service.create(payload(&req)?)?;
    let location = format!("{}/{}", req.path().trim_end_matches('/'), record.id);

    Ok(Response::builder()
        .status(Status::Created)
        .header("location", &location)
        .json(to_json(&record)?))
}

/// `PUT /{prefix}/{resources}/{id}`
pub async fn replace(req: Request, service: Arc<ResourceService>) -> HandlerResult {
    let payload = payload(&req)?;
    let id = record_id(&req, &service)?;
    Ok(Response::json(to_json(&service.replace(id, payload)?)?))
}

/// `PATCH /{prefix}/{resources}/{id}`
pub async fn update(req: Request, service: Arc<ResourceService>) -> HandlerResult {
    let payload = payload(&req)?;
    let id = record_id(&req, &service)?;
    Ok(Response::json(to_json(&service.update(id, payload)?)?))
}

/// `DELETE /{prefix}/{resources}/{id}`: echoes the removed record.
pub async fn delete(req: Request, service: Arc<ResourceService>) -> HandlerResult {
    let id = record_id(&req, &service)?;
    Ok(Response::json(to_json(&service.delete(id)?)?))
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// An id that is not an unsigned integer cannot name a record.
fn record_id(req: &Request, service: &ResourceService) -> Result<u64, ResourceError> {
    req.param("id")
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| service.not_found())
}

/// An empty body is a payload with no fields; anything else must be a JSON
/// object.
fn payload(req: &Request) -> Result<RecordPayload, ResourceError> {
    if req.body().is_empty() {
        return Ok(RecordPayload::default());
    }
    if !req.is_json() {
        return Err(ResourceError::UnsupportedMediaType);
    }
    let invalid = |e: serde_json::Error| ResourceError::validation(format!("invalid JSON body: {e}"));

    let value: serde_json::Value = serde_json::from_slice(req.body()).map_err(invalid)?;
    if !value.is_object() {
        return Err(ResourceError::validation("JSON body must be an object"));
    }
    serde_json::from_value(value).map_err(invalid)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, ResourceError> {
    serde_json::to_vec(value).map_err(|e| ResourceError::internal(format!("serialize: {e}")))
}
