use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};
use tokio::task;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::aggregator::Aggregator;
use crate::config::Config;
use crate::error::ApiError;
use crate::models::Token;

#[derive(Deserialize)]
pub struct TokenQuery {
    pub q: Option<String>, // dashboard search box
}

pub fn router(aggregator: Arc<Aggregator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "402 Token Scanner API running" }))
        .route("/api/tokens", get(list_tokens))
        .layer(cors)
        .with_state(aggregator)
}

pub async fn serve(cfg: Config, aggregator: Arc<Aggregator>) -> eyre::Result<()> {
    let app = router(aggregator);

    let addr = SocketAddr::new(cfg.bind_addr, cfg.port);
    info!("API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn list_tokens(
    State(aggregator): State<Arc<Aggregator>>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<Vec<Token>>, ApiError> {
    info!("Fetching 402/x402 tokens...");

    // run on its own task so a panic inside a source becomes a 500
    let tokens = task::spawn(async move { aggregator.fetch_tokens().await }).await?;

    Ok(Json(filter_by_query(tokens, query.q.as_deref())))
}

/// Same filter as the dashboard search: name, symbol or mint contains `q`
fn filter_by_query(tokens: Vec<Token>, q: Option<&str>) -> Vec<Token> {
    let q = match q.map(str::trim) {
        Some(q) if !q.is_empty() => q.to_lowercase(),
        _ => return tokens,
    };

    tokens
        .into_iter()
        .filter(|t| {
            t.name.to_lowercase().contains(&q)
                || t.symbol.to_lowercase().contains(&q)
                || t.mint_address.to_lowercase().contains(&q)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TokenCache;
    use crate::error::SourceError;
    use crate::matcher::SearchTerms;
    use crate::sources::TokenSource;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::time::Duration;

    struct Fixed(Vec<Token>);

    #[async_trait]
    impl TokenSource for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_tokens(&self) -> Result<Vec<Token>, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    #[async_trait]
    impl TokenSource for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn fetch_tokens(&self) -> Result<Vec<Token>, SourceError> {
            panic!("source blew up");
        }
    }

    fn server_with(source: Arc<dyn TokenSource>) -> TestServer {
        let aggregator = Aggregator::new(
            vec![source],
            SearchTerms::new(["402", "x402"]),
            TokenCache::new(Duration::from_secs(300)),
        );
        TestServer::new(router(Arc::new(aggregator))).unwrap()
    }

    fn sample() -> Vec<Token> {
        vec![
            Token::new("402 Protocol", "402X", "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU"),
            Token::new("x402 Network", "x402NET", "CcKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsZ"),
        ]
    }

    #[tokio::test]
    async fn lists_tokens_as_json() {
        let server = server_with(Arc::new(Fixed(sample())));
        let response = server.get("/api/tokens").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["mintAddress"], "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU");
        assert!(body[0].get("socials").is_none());
    }

    #[tokio::test]
    async fn search_query_filters_results() {
        let server = server_with(Arc::new(Fixed(sample())));
        let response = server.get("/api/tokens").add_query_param("q", "NET").await;

        let tokens: Vec<Token> = response.json();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].symbol, "x402NET");
    }

    #[tokio::test]
    async fn unexpected_failure_is_500() {
        let server = server_with(Arc::new(Broken));
        let response = server.get("/api/tokens").expect_failure().await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Failed to fetch tokens");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn root_reports_running() {
        let server = server_with(Arc::new(Fixed(Vec::new())));
        let response = server.get("/").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        response.assert_text("402 Token Scanner API running");
    }

    #[test]
    fn blank_query_keeps_everything() {
        assert_eq!(filter_by_query(sample(), Some("  ")).len(), 2);
        assert_eq!(filter_by_query(sample(), Some("7xkx")).len(), 1);
    }
}
