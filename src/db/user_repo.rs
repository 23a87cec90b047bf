// src/db/user_repo.rs

use std::collections::HashMap;

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::{Role, User}};

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, \
                            role, is_active, profile_photo_url, created_at, updated_at";

// O repositório de usuários, responsável por todas as interações com a
// tabela 'users' e as tabelas de atribuição explícita.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca pelo e-mail (identidade de login), sem distinção de maiúsculas
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match user {
            Some(user) => Ok(Some(self.with_assignments(user).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match user {
            Some(user) => Ok(Some(self.with_assignments(user).await?)),
            None => Ok(None),
        }
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY username"
        ))
        .fetch_all(&self.pool)
        .await?;

        self.with_assignments_batch(users).await
    }

    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
        role: Role,
        is_active: bool,
        profile_photo_url: Option<&str>,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name,
                               role, is_active, profile_photo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .bind(role)
        .bind(is_active)
        .bind(profile_photo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::validation(
                        "Ya existe un usuario con ese correo o nombre de usuario.",
                    );
                }
            }
            AppError::from(e)
        })?;

        Ok(user)
    }

    pub async fn update(
        &self,
        id: Uuid,
        username: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
        role: Option<Role>,
        is_active: Option<bool>,
        profile_photo_url: Option<&str>,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                first_name = COALESCE($5, first_name),
                last_name = COALESCE($6, last_name),
                role = COALESCE($7, role),
                is_active = COALESCE($8, is_active),
                profile_photo_url = COALESCE($9, profile_photo_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .bind(role)
        .bind(is_active)
        .bind(profile_photo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::validation(
                        "Ya existe un usuario con ese correo o nombre de usuario.",
                    );
                }
            }
            AppError::from(e)
        })?;

        self.with_assignments(user).await
    }

    // Substitui as listas de atribuições explícitas do usuário.
    // None = não mexe naquela lista.
    pub async fn replace_assignments(
        &self,
        user_id: Uuid,
        client_ids: Option<&[Uuid]>,
        branch_ids: Option<&[Uuid]>,
        area_ids: Option<&[Uuid]>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if let Some(ids) = client_ids {
            sqlx::query("DELETE FROM user_clients WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("INSERT INTO user_clients (user_id, client_id) SELECT $1, UNNEST($2::uuid[])")
                .bind(user_id)
                .bind(ids)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(ids) = branch_ids {
            sqlx::query("DELETE FROM user_branches WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("INSERT INTO user_branches (user_id, branch_id) SELECT $1, UNNEST($2::uuid[])")
                .bind(user_id)
                .bind(ids)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(ids) = area_ids {
            sqlx::query("DELETE FROM user_areas WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("INSERT INTO user_areas (user_id, area_id) SELECT $1, UNNEST($2::uuid[])")
                .bind(user_id)
                .bind(ids)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // Concede um cliente ao usuário (bootstrap de quem cria o cliente).
    // Recebe o executor para rodar na mesma transação do INSERT do cliente.
    pub async fn grant_client<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        client_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO user_clients (user_id, client_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(client_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    // --- Carregamento das atribuições (sempre ordenadas, saída estável) ---

    async fn with_assignments(&self, mut user: User) -> Result<User, AppError> {
        user.client_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT client_id FROM user_clients WHERE user_id = $1 ORDER BY client_id",
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        user.branch_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT branch_id FROM user_branches WHERE user_id = $1 ORDER BY branch_id",
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        user.area_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT area_id FROM user_areas WHERE user_id = $1 ORDER BY area_id",
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(user)
    }

    async fn with_assignments_batch(&self, mut users: Vec<User>) -> Result<Vec<User>, AppError> {
        let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
        if ids.is_empty() {
            return Ok(users);
        }

        let clients = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT user_id, client_id FROM user_clients WHERE user_id = ANY($1) ORDER BY client_id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        let branches = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT user_id, branch_id FROM user_branches WHERE user_id = ANY($1) ORDER BY branch_id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        let areas = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT user_id, area_id FROM user_areas WHERE user_id = ANY($1) ORDER BY area_id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_user: HashMap<Uuid, (Vec<Uuid>, Vec<Uuid>, Vec<Uuid>)> = HashMap::new();
        for (user_id, client_id) in clients {
            by_user.entry(user_id).or_default().0.push(client_id);
        }
        for (user_id, branch_id) in branches {
            by_user.entry(user_id).or_default().1.push(branch_id);
        }
        for (user_id, area_id) in areas {
            by_user.entry(user_id).or_default().2.push(area_id);
        }

        for user in &mut users {
            if let Some((clients, branches, areas)) = by_user.remove(&user.id) {
                user.client_ids = clients;
                user.branch_ids = branches;
                user.area_ids = areas;
            }
        }

        Ok(users)
    }
}
