//! 公共页面与健康检查。

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use thesis_api_types::HealthCheckResponse;

use super::extract::{IncomingFlash, MaybeUser};
use super::response::HtmlPage;
use super::state::AppState;
use crate::views::{self, Chrome};

pub fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/about", get(about))
        .route("/health", get(health))
}

async fn index(MaybeUser(user): MaybeUser, IncomingFlash(flash): IncomingFlash) -> HtmlPage {
    HtmlPage(views::public::index(Chrome::new(user.as_ref(), flash.as_ref())))
}

async fn about(MaybeUser(user): MaybeUser, IncomingFlash(flash): IncomingFlash) -> HtmlPage {
    HtmlPage(views::public::about(Chrome::new(user.as_ref(), flash.as_ref())))
}

async fn health() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse::ok())
}
