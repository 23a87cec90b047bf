// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth / Usuarios ---
        handlers::users::login,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,

        // --- Dashboard ---
        handlers::dashboard::summary,

        // --- Hierarquia ---
        handlers::hierarchy::list_clients,
        handlers::hierarchy::create_client,
        handlers::hierarchy::get_client,
        handlers::hierarchy::update_client,
        handlers::hierarchy::list_branches,
        handlers::hierarchy::create_branch,
        handlers::hierarchy::get_branch,
        handlers::hierarchy::update_branch,
        handlers::hierarchy::list_areas,
        handlers::hierarchy::create_area,
        handlers::hierarchy::get_area,
        handlers::hierarchy::update_area,
        handlers::hierarchy::delete_area,

        // --- Equipos ---
        handlers::equipment::list_models,
        handlers::equipment::list_dispensers,
        handlers::equipment::create_dispenser,
        handlers::equipment::list_products,
        handlers::equipment::create_product,

        // --- Visitas ---
        handlers::visits::list_visits,
        handlers::visits::create_visit,
        handlers::visits::get_visit,
        handlers::visits::mobile_flow,
        handlers::visits::download_report,
        handlers::visits::issue_public_link,
        handlers::visits::public_report,
        handlers::visits::public_report_detail,

        // --- Incidencias ---
        handlers::incidents::list_incidents,
        handlers::incidents::create_incident,
        handlers::incidents::get_incident,
        handlers::incidents::schedule_visit,

        // --- Notificaciones ---
        handlers::notifications::feed,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::Role,
            models::auth::LoginPayload,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,

            // --- Hierarquia ---
            models::hierarchy::Client,
            models::hierarchy::CreateClientPayload,
            models::hierarchy::UpdateClientPayload,
            models::hierarchy::Branch,
            models::hierarchy::CreateBranchPayload,
            models::hierarchy::UpdateBranchPayload,
            models::hierarchy::Area,
            models::hierarchy::CreateAreaPayload,
            models::hierarchy::UpdateAreaPayload,

            // --- Equipos ---
            models::equipment::DispenserModel,
            models::equipment::Dispenser,
            models::equipment::DispenserWithProducts,
            models::equipment::CreateDispenserPayload,
            models::equipment::Product,
            models::equipment::CreateProductPayload,

            // --- Visitas ---
            crate::services::report_service::PublicLink,
            models::visit::VisitDetail,
            models::visit::VisitMedia,
            models::visit::VisitStatus,
            models::visit::MediaType,
            models::visit::CreateVisitPayload,
            models::visit::VisitReport,
            models::visit::ChecklistItem,
            models::visit::GeoPoint,

            // --- Incidencias ---
            models::incident::IncidentDetail,
            models::incident::IncidentMedia,
            models::incident::CreateIncidentPayload,
            models::incident::IncidentMediaPayload,
            models::incident::ScheduleVisitPayload,

            // --- Dashboard / Notificaciones ---
            models::dashboard::DashboardStats,
            models::dashboard::ActivityEntry,
            models::dashboard::DashboardResponse,
            models::notification::NotificationItem,
            models::notification::NotificationKind,
        )
    ),
    tags(
        (name = "Auth", description = "Login por correo y contraseña"),
        (name = "Usuarios", description = "Administración de usuarios y asignaciones"),
        (name = "Dashboard", description = "Resumen del alcance del usuario"),
        (name = "Clientes", description = "Raíz de la jerarquía"),
        (name = "Sucursales", description = "Sucursales por cliente"),
        (name = "Áreas", description = "Áreas por sucursal"),
        (name = "Equipos", description = "Modelos, dosificadores y productos"),
        (name = "Visitas", description = "Agenda, flujo móvil e informes PDF"),
        (name = "Incidencias", description = "Registro y conversión a visita"),
        (name = "Notificaciones", description = "Feed unificado"),
    ),
    info(
        title = "trust API",
        description = "Backend de mantenimiento de dosificadores: jerarquía de clientes, visitas de inspección, incidencias e informes.",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
