// src/db/hierarchy_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::hierarchy::{Area, Branch, Client},
};

// Arestas da hierarquia (sucursal -> cliente, área -> sucursal) para o
// cálculo de escopo fechar o fecho transitivo em memória.
#[derive(Debug, Clone, Default)]
pub struct HierarchyEdges {
    pub branch_client: Vec<(Uuid, Uuid)>,
    pub area_branch: Vec<(Uuid, Uuid)>,
}

// O repositório da hierarquia: clientes, sucursais e áreas.
// O filtro de escopo chega como Option<Vec<Uuid>>: None = sem restrição.
#[derive(Clone)]
pub struct HierarchyRepository {
    pool: PgPool,
}

impl HierarchyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn load_edges(&self) -> Result<HierarchyEdges, AppError> {
        let branch_client = sqlx::query_as::<_, (Uuid, Uuid)>("SELECT id, client_id FROM branches")
            .fetch_all(&self.pool)
            .await?;
        let area_branch = sqlx::query_as::<_, (Uuid, Uuid)>("SELECT id, branch_id FROM areas")
            .fetch_all(&self.pool)
            .await?;
        Ok(HierarchyEdges { branch_client, area_branch })
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn list_clients(&self, scope_ids: Option<Vec<Uuid>>) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, code, notes, created_at, updated_at
            FROM clients
            WHERE ($1::uuid[] IS NULL OR id = ANY($1))
            ORDER BY name
            "#,
        )
        .bind(scope_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    pub async fn get_client(
        &self,
        id: Uuid,
        scope_ids: Option<Vec<Uuid>>,
    ) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, code, notes, created_at, updated_at
            FROM clients
            WHERE id = $1 AND ($2::uuid[] IS NULL OR id = ANY($2))
            "#,
        )
        .bind(id)
        .bind(scope_ids)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    pub async fn client_code_exists(
        &self,
        code: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM clients WHERE code = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(code)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    // Recebe o executor para poder compor com a concessão de acesso do
    // criador na mesma transação.
    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        name: &str,
        code: &str,
        notes: &str,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, code, notes)
            VALUES ($1, $2, $3)
            RETURNING id, name, code, notes, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(code)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // Corrida entre a pré-checagem e o INSERT: o banco é a fonte da
            // verdade e a resposta tem que ser a mesma da pré-checagem.
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::validation(format!("El código '{code}' ya está en uso."));
                }
            }
            e.into()
        })
    }

    pub async fn update_client(
        &self,
        id: Uuid,
        name: Option<&str>,
        code: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Client, AppError> {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = COALESCE($2, name),
                code = COALESCE($3, code),
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, code, notes, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(code)
        .bind(notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    let code = code.unwrap_or("?");
                    return AppError::validation(format!("El código '{code}' ya está en uso."));
                }
            }
            e.into()
        })
    }

    // =========================================================================
    //  SUCURSAIS
    // =========================================================================

    pub async fn list_branches(&self, scope_ids: Option<Vec<Uuid>>) -> Result<Vec<Branch>, AppError> {
        let branches = sqlx::query_as::<_, Branch>(
            r#"
            SELECT b.id, b.client_id, b.name, b.address, b.city,
                   c.name AS client_name, b.created_at, b.updated_at
            FROM branches b
            JOIN clients c ON c.id = b.client_id
            WHERE ($1::uuid[] IS NULL OR b.id = ANY($1))
            ORDER BY b.name
            "#,
        )
        .bind(scope_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(branches)
    }

    pub async fn get_branch(
        &self,
        id: Uuid,
        scope_ids: Option<Vec<Uuid>>,
    ) -> Result<Option<Branch>, AppError> {
        let branch = sqlx::query_as::<_, Branch>(
            r#"
            SELECT b.id, b.client_id, b.name, b.address, b.city,
                   c.name AS client_name, b.created_at, b.updated_at
            FROM branches b
            JOIN clients c ON c.id = b.client_id
            WHERE b.id = $1 AND ($2::uuid[] IS NULL OR b.id = ANY($2))
            "#,
        )
        .bind(id)
        .bind(scope_ids)
        .fetch_optional(&self.pool)
        .await?;

        Ok(branch)
    }

    pub async fn branch_name_exists(
        &self,
        client_id: Uuid,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM branches
                WHERE client_id = $1 AND name = $2 AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(client_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn create_branch(
        &self,
        client_id: Uuid,
        name: &str,
        address: &str,
        city: &str,
    ) -> Result<Branch, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO branches (client_id, name, address, city)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(client_id)
        .bind(name)
        .bind(address)
        .bind(city)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::validation(format!(
                        "La sucursal '{name}' ya existe para este cliente."
                    ));
                }
            }
            e.into()
        })?;

        // Relê com o JOIN para devolver o nome do cliente
        self.get_branch(id, None)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn update_branch(
        &self,
        id: Uuid,
        name: Option<&str>,
        address: Option<&str>,
        city: Option<&str>,
    ) -> Result<Branch, AppError> {
        sqlx::query(
            r#"
            UPDATE branches
            SET name = COALESCE($2, name),
                address = COALESCE($3, address),
                city = COALESCE($4, city),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(address)
        .bind(city)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    let name = name.unwrap_or("?");
                    return AppError::validation(format!(
                        "La sucursal '{name}' ya existe para este cliente."
                    ));
                }
            }
            AppError::from(e)
        })?;

        self.get_branch(id, None)
            .await?
            .ok_or(AppError::NotFound)
    }

    // =========================================================================
    //  ÁREAS
    // =========================================================================

    pub async fn list_areas(&self, scope_ids: Option<Vec<Uuid>>) -> Result<Vec<Area>, AppError> {
        let areas = sqlx::query_as::<_, Area>(
            r#"
            SELECT a.id, a.branch_id, a.name, a.description,
                   b.name AS branch_name, c.name AS client_name,
                   a.created_at, a.updated_at
            FROM areas a
            JOIN branches b ON b.id = a.branch_id
            JOIN clients c ON c.id = b.client_id
            WHERE ($1::uuid[] IS NULL OR a.id = ANY($1))
            ORDER BY a.name
            "#,
        )
        .bind(scope_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(areas)
    }

    pub async fn get_area(
        &self,
        id: Uuid,
        scope_ids: Option<Vec<Uuid>>,
    ) -> Result<Option<Area>, AppError> {
        let area = sqlx::query_as::<_, Area>(
            r#"
            SELECT a.id, a.branch_id, a.name, a.description,
                   b.name AS branch_name, c.name AS client_name,
                   a.created_at, a.updated_at
            FROM areas a
            JOIN branches b ON b.id = a.branch_id
            JOIN clients c ON c.id = b.client_id
            WHERE a.id = $1 AND ($2::uuid[] IS NULL OR a.id = ANY($2))
            "#,
        )
        .bind(id)
        .bind(scope_ids)
        .fetch_optional(&self.pool)
        .await?;

        Ok(area)
    }

    pub async fn area_name_exists(
        &self,
        branch_id: Uuid,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM areas
                WHERE branch_id = $1 AND name = $2 AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(branch_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn create_area(
        &self,
        branch_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Area, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO areas (branch_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(branch_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::validation(format!(
                        "El área '{name}' ya existe en esta sucursal."
                    ));
                }
            }
            e.into()
        })?;

        self.get_area(id, None).await?.ok_or(AppError::NotFound)
    }

    pub async fn update_area(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Area, AppError> {
        sqlx::query(
            r#"
            UPDATE areas
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    let name = name.unwrap_or("?");
                    return AppError::validation(format!(
                        "El área '{name}' ya existe en esta sucursal."
                    ));
                }
            }
            AppError::from(e)
        })?;

        self.get_area(id, None).await?.ok_or(AppError::NotFound)
    }

    // A exclusão cascateia para as visitas da área (FK ON DELETE CASCADE)
    pub async fn delete_area(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM areas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
