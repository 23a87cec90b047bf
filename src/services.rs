pub mod access;
pub mod auth_service;
pub use auth_service::AuthService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
pub mod equipment_service;
pub use equipment_service::EquipmentService;
pub mod hierarchy_service;
pub use hierarchy_service::HierarchyService;
pub mod incident_service;
pub use incident_service::IncidentService;
pub mod notification_service;
pub use notification_service::NotificationService;
pub mod report_service;
pub use report_service::ReportService;
pub mod scope;
pub use scope::ScopeService;
pub mod storage;
pub use storage::MediaStorage;
pub mod user_service;
pub use user_service::UserService;
pub mod visit_service;
pub use visit_service::VisitService;
