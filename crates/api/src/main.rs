use nftdrop_api::app::AppConfig;

#[tokio::main]
async fn main() {
    nftdrop_observability::init();

    let api_key = std::env::var("API_KEY").unwrap_or_else(|_| {
        tracing::warn!("API_KEY not set; using insecure dev default");
        "admin".to_string()
    });

    let database_url = std::env::var("DATABASE_URL").ok();
    if database_url.is_none() {
        tracing::warn!("DATABASE_URL not set; persistent v2 routes disabled");
    }

    let port = std::env::var("PORT").unwrap_or_else(|_| "8888".to_string());

    let app = nftdrop_api::app::build_app(AppConfig {
        api_key,
        database_url,
    })
    .await
    .expect("failed to build application");

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
