// src/services/scope.rs

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{HierarchyEdges, HierarchyRepository},
    models::auth::{Role, User},
};

// O escopo de acesso de um usuário: os IDs de cliente/sucursal/área sobre os
// quais ele pode agir. É o fecho transitivo das atribuições explícitas, não
// as atribuições em si.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessScope {
    pub client_ids: HashSet<Uuid>,
    pub branch_ids: HashSet<Uuid>,
    pub area_ids: HashSet<Uuid>,
}

impl AccessScope {
    // Sementes por papel: cada papel só planta o nível que lhe é atribuído
    // explicitamente; o resto vem da expansão.
    pub fn seed_for(user: &User) -> Self {
        let mut scope = AccessScope::default();
        match user.role {
            // general_admin nem chega aqui (escopo None = irrestrito)
            Role::GeneralAdmin => {}
            Role::AccountAdmin => {
                scope.client_ids.extend(user.client_ids.iter().copied());
            }
            Role::BranchAdmin => {
                scope.branch_ids.extend(user.branch_ids.iter().copied());
            }
            Role::Inspector => {
                scope.client_ids.extend(user.client_ids.iter().copied());
                scope.branch_ids.extend(user.branch_ids.iter().copied());
                scope.area_ids.extend(user.area_ids.iter().copied());
            }
        }
        scope
    }

    // Primeiro expande para baixo a partir das sementes (cliente ->
    // sucursais -> áreas), depois para cima (área -> sucursal -> cliente).
    // A subida só preenche a cadeia de ancestrais para exibição e contagens;
    // ela NÃO dispara nova descida: quem tem só uma área-folha não ganha as
    // áreas irmãs.
    //
    // Cada fase itera até o ponto fixo em vez de assumir um número de
    // passadas: com 3 níveis uma passada basta, mas a profundidade da
    // hierarquia não é um pressuposto daqui.
    pub fn close_over(mut self, edges: &HierarchyEdges) -> Self {
        // Para baixo
        loop {
            let sizes = (self.branch_ids.len(), self.area_ids.len());

            for (branch_id, client_id) in &edges.branch_client {
                if self.client_ids.contains(client_id) {
                    self.branch_ids.insert(*branch_id);
                }
            }
            for (area_id, branch_id) in &edges.area_branch {
                if self.branch_ids.contains(branch_id) {
                    self.area_ids.insert(*area_id);
                }
            }

            if sizes == (self.branch_ids.len(), self.area_ids.len()) {
                break;
            }
        }

        // Para cima
        loop {
            let sizes = (self.client_ids.len(), self.branch_ids.len());

            for (area_id, branch_id) in &edges.area_branch {
                if self.area_ids.contains(area_id) {
                    self.branch_ids.insert(*branch_id);
                }
            }
            for (branch_id, client_id) in &edges.branch_client {
                if self.branch_ids.contains(branch_id) {
                    self.client_ids.insert(*client_id);
                }
            }

            if sizes == (self.client_ids.len(), self.branch_ids.len()) {
                break;
            }
        }

        self
    }
}

// Os filtros que os repositórios recebem: None = sem restrição.
// Ordenados para a saída (e o SQL gerado) ser estável.
pub fn client_filter(scope: Option<&AccessScope>) -> Option<Vec<Uuid>> {
    scope.map(|s| sorted(&s.client_ids))
}

pub fn branch_filter(scope: Option<&AccessScope>) -> Option<Vec<Uuid>> {
    scope.map(|s| sorted(&s.branch_ids))
}

pub fn area_filter(scope: Option<&AccessScope>) -> Option<Vec<Uuid>> {
    scope.map(|s| sorted(&s.area_ids))
}

fn sorted(ids: &HashSet<Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.iter().copied().collect();
    ids.sort();
    ids
}

// --- O RESOLVEDOR ---

#[derive(Clone)]
pub struct ScopeService {
    hierarchy_repo: HierarchyRepository,
}

impl ScopeService {
    pub fn new(hierarchy_repo: HierarchyRepository) -> Self {
        Self { hierarchy_repo }
    }

    // None = acesso irrestrito (general_admin). Para os demais papéis,
    // carrega o snapshot das arestas e fecha o escopo em memória.
    pub async fn resolve(&self, user: &User) -> Result<Option<AccessScope>, AppError> {
        if user.role == Role::GeneralAdmin {
            return Ok(None);
        }

        let edges = self.hierarchy_repo.load_edges().await?;
        Ok(Some(AccessScope::seed_for(user).close_over(&edges)))
    }

    // Caminhos de leitura toleram anônimo: escopo vazio, não erro.
    pub async fn resolve_identity(
        &self,
        user: Option<&User>,
    ) -> Result<Option<AccessScope>, AppError> {
        match user {
            Some(user) => self.resolve(user).await,
            None => Ok(Some(AccessScope::default())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: Role, clients: Vec<Uuid>, branches: Vec<Uuid>, areas: Vec<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            username: "test".to_string(),
            email: "test@trust.mx".to_string(),
            password_hash: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            role,
            is_active: true,
            profile_photo_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            client_ids: clients,
            branch_ids: branches,
            area_ids: areas,
        }
    }

    // Hierarquia de teste:
    //   cliente C1 -> sucursal B1 -> áreas A1, A2
    //   cliente C2 -> sucursal B2 -> área  A3
    struct Fixture {
        c1: Uuid,
        c2: Uuid,
        b1: Uuid,
        b2: Uuid,
        a1: Uuid,
        a2: Uuid,
        a3: Uuid,
        edges: HierarchyEdges,
    }

    fn fixture() -> Fixture {
        let (c1, c2) = (Uuid::new_v4(), Uuid::new_v4());
        let (b1, b2) = (Uuid::new_v4(), Uuid::new_v4());
        let (a1, a2, a3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let edges = HierarchyEdges {
            branch_client: vec![(b1, c1), (b2, c2)],
            area_branch: vec![(a1, b1), (a2, b1), (a3, b2)],
        };
        Fixture { c1, c2, b1, b2, a1, a2, a3, edges }
    }

    #[test]
    fn inspector_with_leaf_area_sees_chain_above_but_not_siblings() {
        let f = fixture();
        let inspector = user(Role::Inspector, vec![], vec![], vec![f.a1]);

        let scope = AccessScope::seed_for(&inspector).close_over(&f.edges);

        // Fecho para cima: sucursal e cliente donos da área
        assert!(scope.area_ids.contains(&f.a1));
        assert!(scope.branch_ids.contains(&f.b1));
        assert!(scope.client_ids.contains(&f.c1));
        // A área irmã fica fora: a subida não volta a descer
        assert!(!scope.area_ids.contains(&f.a2));
        // O outro cliente também
        assert!(!scope.client_ids.contains(&f.c2));
        assert!(!scope.branch_ids.contains(&f.b2));
        assert!(!scope.area_ids.contains(&f.a3));
    }

    #[test]
    fn account_admin_expands_downward_over_whole_subtree() {
        let f = fixture();
        let admin = user(Role::AccountAdmin, vec![f.c1], vec![], vec![]);

        let scope = AccessScope::seed_for(&admin).close_over(&f.edges);

        assert_eq!(scope.client_ids, HashSet::from([f.c1]));
        assert_eq!(scope.branch_ids, HashSet::from([f.b1]));
        assert_eq!(scope.area_ids, HashSet::from([f.a1, f.a2]));
    }

    #[test]
    fn branch_admin_seeds_only_branches() {
        let f = fixture();
        // As atribuições de cliente/área do registro são ignoradas para
        // este papel: só as sucursais semeiam.
        let admin = user(Role::BranchAdmin, vec![f.c2], vec![f.b1], vec![f.a3]);

        let scope = AccessScope::seed_for(&admin).close_over(&f.edges);

        assert_eq!(scope.client_ids, HashSet::from([f.c1]));
        assert_eq!(scope.branch_ids, HashSet::from([f.b1]));
        assert_eq!(scope.area_ids, HashSet::from([f.a1, f.a2]));
    }

    #[test]
    fn inspector_with_explicit_client_gets_whole_subtree() {
        let f = fixture();
        let inspector = user(Role::Inspector, vec![f.c1], vec![], vec![f.a3]);

        let scope = AccessScope::seed_for(&inspector).close_over(&f.edges);

        // A subárvore inteira de C1, mais a cadeia acima de A3
        assert_eq!(scope.area_ids, HashSet::from([f.a1, f.a2, f.a3]));
        assert_eq!(scope.branch_ids, HashSet::from([f.b1, f.b2]));
        assert_eq!(scope.client_ids, HashSet::from([f.c1, f.c2]));
    }

    #[test]
    fn empty_scope_stays_empty() {
        let f = fixture();
        let inspector = user(Role::Inspector, vec![], vec![], vec![]);

        let scope = AccessScope::seed_for(&inspector).close_over(&f.edges);

        assert!(scope.client_ids.is_empty());
        assert!(scope.branch_ids.is_empty());
        assert!(scope.area_ids.is_empty());
    }

    #[test]
    fn filters_are_sorted_for_stable_output() {
        let f = fixture();
        let inspector = user(Role::Inspector, vec![f.c1, f.c2], vec![], vec![]);
        let scope = AccessScope::seed_for(&inspector).close_over(&f.edges);

        let areas = area_filter(Some(&scope)).unwrap();
        let mut expected = areas.clone();
        expected.sort();
        assert_eq!(areas, expected);
        assert_eq!(areas.len(), 3);

        // None = irrestrito
        assert!(area_filter(None).is_none());
    }
}
