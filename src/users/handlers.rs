//! HTTP handlers for `/users`.
//!
//! Validation failures and unknown ids are ordinary responses. The only
//! `Err` a handler returns is a serialization failure, which the `Recover`
//! stage turns into a 500.

use std::sync::Arc;

use serde::Serialize;

use crate::{Request, Response, Status};

use super::model::UserDraft;
use super::store::UserStore;
use super::validate::validate;

type Store = Arc<dyn UserStore>;
type Reply = anyhow::Result<Response>;

const MALFORMED_BODY: &str = "Request body must be a JSON user object.";

/// `GET /users`
pub async fn list(store: Store, _req: Request) -> Reply {
    json(Status::Ok, &store.list())
}

/// `GET /users/{id}`
pub async fn get(store: Store, req: Request) -> Reply {
    let Some(id) = user_id(&req) else {
        return Ok(Response::status(Status::BadRequest));
    };
    match store.get(id) {
        Some(user) => json(Status::Ok, &user),
        None => Ok(Response::status(Status::NotFound)),
    }
}

/// `POST /users`
pub async fn create(store: Store, req: Request) -> Reply {
    let draft = match checked_draft(&req) {
        Ok(draft) => draft,
        Err(rejection) => return rejection,
    };
    let user = store.create(draft);
    let location = format!("/users/{}", user.id);
    Ok(Response::builder()
        .status(Status::Created)
        .header("location", &location)
        .json(serde_json::to_vec(&user)?))
}

/// `PUT /users/{id}`
pub async fn update(store: Store, req: Request) -> Reply {
    let Some(id) = user_id(&req) else {
        return Ok(Response::status(Status::BadRequest));
    };
    let draft = match checked_draft(&req) {
        Ok(draft) => draft,
        Err(rejection) => return rejection,
    };
    match store.update(id, draft) {
        Some(user) => json(Status::Ok, &user),
        None => Ok(Response::status(Status::NotFound)),
    }
}

/// `DELETE /users/{id}`
pub async fn delete(store: Store, req: Request) -> Response {
    let Some(id) = user_id(&req) else {
        return Response::status(Status::BadRequest);
    };
    if store.delete(id) {
        Response::status(Status::NoContent)
    } else {
        Response::status(Status::NotFound)
    }
}

fn user_id(req: &Request) -> Option<u64> {
    req.param("id")?.parse().ok()
}

/// Parses and validates the body. `Err` holds the finished 400.
fn checked_draft(req: &Request) -> Result<UserDraft, Reply> {
    let draft: UserDraft = match serde_json::from_slice(req.body()) {
        Ok(draft) => draft,
        Err(_) => return Err(bad_request(MALFORMED_BODY)),
    };
    match validate(&draft) {
        Ok(()) => Ok(draft),
        Err(e) => Err(bad_request(&e.to_string())),
    }
}

/// 400 with the message as a JSON string.
fn bad_request(message: &str) -> Reply {
    json(Status::BadRequest, message)
}

fn json<T: Serialize + ?Sized>(status: Status, value: &T) -> Reply {
    Ok(Response::builder().status(status).json(serde_json::to_vec(value)?))
}
