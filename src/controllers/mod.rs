pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod documents;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(auth::routes())
        .merge(bookings::routes())
        .merge(catalog::routes())
        .merge(documents::routes())
}
