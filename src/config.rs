// src/config.rs

use std::{env, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        DashboardRepository, EquipmentRepository, HierarchyRepository, IncidentRepository,
        UserRepository, VisitRepository,
    },
    services::{
        AuthService, DashboardService, EquipmentService, HierarchyService, IncidentService,
        MediaStorage, NotificationService, ReportService, ScopeService, UserService, VisitService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub media_root: String,
    pub public_base_url: String,

    pub auth_service: AuthService,
    pub scope_service: ScopeService,
    pub hierarchy_service: HierarchyService,
    pub equipment_service: EquipmentService,
    pub visit_service: VisitService,
    pub incident_service: IncidentService,
    pub report_service: ReportService,
    pub notification_service: NotificationService,
    pub dashboard_service: DashboardService,
    pub user_service: UserService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let media_root = env::var("MEDIA_ROOT").unwrap_or_else(|_| "./media".to_string());
        let public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let static_map_base_url = env::var("STATIC_MAP_BASE_URL")
            .unwrap_or_else(|_| "https://staticmap.openstreetmap.de".to_string());

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // Cliente HTTP do mapa estático: timeout curto, falha suave no uso
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(4))
            .build()?;

        let storage = MediaStorage::new(&media_root);

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let hierarchy_repo = HierarchyRepository::new(db_pool.clone());
        let equipment_repo = EquipmentRepository::new(db_pool.clone());
        let visit_repo = VisitRepository::new(db_pool.clone());
        let incident_repo = IncidentRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone());
        let scope_service = ScopeService::new(hierarchy_repo.clone());
        let hierarchy_service =
            HierarchyService::new(db_pool.clone(), hierarchy_repo.clone(), user_repo.clone());
        let equipment_service = EquipmentService::new(
            equipment_repo.clone(),
            hierarchy_repo.clone(),
            storage.clone(),
        );
        let visit_service = VisitService::new(
            db_pool.clone(),
            visit_repo.clone(),
            hierarchy_repo.clone(),
            user_repo.clone(),
            storage.clone(),
        );
        let incident_service = IncidentService::new(
            db_pool.clone(),
            incident_repo.clone(),
            hierarchy_repo,
            equipment_repo,
            visit_repo.clone(),
            storage.clone(),
        );
        let report_service = ReportService::new(
            visit_repo.clone(),
            storage.clone(),
            http_client,
            jwt_secret,
            public_base_url.clone(),
            static_map_base_url,
        );
        let notification_service = NotificationService::new(visit_repo.clone(), incident_repo);
        let dashboard_service = DashboardService::new(dashboard_repo, visit_repo);
        let user_service = UserService::new(user_repo, storage);

        Ok(Self {
            db_pool,
            media_root,
            public_base_url,
            auth_service,
            scope_service,
            hierarchy_service,
            equipment_service,
            visit_service,
            incident_service,
            report_service,
            notification_service,
            dashboard_service,
            user_service,
        })
    }
}
