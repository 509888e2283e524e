use recipe_api_rust::config;
use recipe_api_rust::database::manager::DatabaseManager;
use recipe_api_rust::routes;
use recipe_api_rust::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting recipe API in {:?} mode", config.environment);

    let pool = DatabaseManager::main_pool()
        .await
        .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));

    if let Err(e) = DatabaseManager::health_check().await {
        panic!("database health check failed: {}", e);
    }

    let app = routes::app(AppState::postgres(pool));

    // Allow tests or deployments to override port via env
    let port = std::env::var("RECIPE_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Recipe API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
