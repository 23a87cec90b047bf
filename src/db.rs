pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod equipment_repo;
pub use equipment_repo::EquipmentRepository;
pub mod hierarchy_repo;
pub use hierarchy_repo::{HierarchyEdges, HierarchyRepository};
pub mod incident_repo;
pub use incident_repo::IncidentRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod visit_repo;
pub use visit_repo::VisitRepository;
