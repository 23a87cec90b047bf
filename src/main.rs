//src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new().route("/login", axum::routing::post(handlers::users::login));

    let user_routes = Router::new()
        .route(
            "/",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/{id}",
            get(handlers::users::get_user).put(handlers::users::update_user),
        );

    let client_routes = Router::new()
        .route(
            "/",
            get(handlers::hierarchy::list_clients).post(handlers::hierarchy::create_client),
        )
        .route(
            "/{id}",
            get(handlers::hierarchy::get_client).put(handlers::hierarchy::update_client),
        );

    let branch_routes = Router::new()
        .route(
            "/",
            get(handlers::hierarchy::list_branches).post(handlers::hierarchy::create_branch),
        )
        .route(
            "/{id}",
            get(handlers::hierarchy::get_branch).put(handlers::hierarchy::update_branch),
        );

    let area_routes = Router::new()
        .route(
            "/",
            get(handlers::hierarchy::list_areas).post(handlers::hierarchy::create_area),
        )
        .route(
            "/{id}",
            get(handlers::hierarchy::get_area)
                .put(handlers::hierarchy::update_area)
                .delete(handlers::hierarchy::delete_area),
        );

    let dispenser_routes = Router::new().route(
        "/",
        get(handlers::equipment::list_dispensers).post(handlers::equipment::create_dispenser),
    );

    let product_routes = Router::new().route(
        "/",
        get(handlers::equipment::list_products).post(handlers::equipment::create_product),
    );

    // O informe público (por token assinado) é anônimo; o resto do fluxo de
    // visitas resolve a identidade pelo cabeçalho.
    let visit_routes = Router::new()
        .route(
            "/",
            get(handlers::visits::list_visits).post(handlers::visits::create_visit),
        )
        .route(
            "/report/public/{token}",
            get(handlers::visits::public_report),
        )
        .route(
            "/report/public/{token}/detail",
            get(handlers::visits::public_report_detail),
        )
        .route(
            "/{id}",
            get(handlers::visits::get_visit).patch(handlers::visits::mobile_flow),
        )
        .route("/{id}/report", get(handlers::visits::download_report))
        .route("/{id}/public-link", get(handlers::visits::issue_public_link));

    let incident_routes = Router::new()
        .route(
            "/",
            get(handlers::incidents::list_incidents).post(handlers::incidents::create_incident),
        )
        .route("/{id}", get(handlers::incidents::get_incident))
        .route(
            "/{id}/schedule-visit",
            axum::routing::post(handlers::incidents::schedule_visit),
        );

    // Combina tudo no router principal
    let app = Router::new()
        .route(
            "/api/health",
            get(|| async { Json(json!({ "ok": true, "app": "trust" })) }),
        )
        .route("/api/dashboard", get(handlers::dashboard::summary))
        .route("/api/notifications", get(handlers::notifications::feed))
        .route("/api/dispenser-models", get(handlers::equipment::list_models))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/clients", client_routes)
        .nest("/api/branches", branch_routes)
        .nest("/api/areas", area_routes)
        .nest("/api/dispensers", dispenser_routes)
        .nest("/api/products", product_routes)
        .nest("/api/visits", visit_routes)
        .nest("/api/incidents", incident_routes)
        // Uploads servidos de volta (fotos, vídeos, firmas)
        .nest_service("/media", ServeDir::new(&app_state.media_root))
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        // As evidências das visitas passam do limite padrão de corpo
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:8000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
