use axum::Router;

pub mod system;
pub mod transfers;
pub mod wallets;

pub fn router() -> Router {
    Router::new().merge(wallets::router()).merge(transfers::router())
}
