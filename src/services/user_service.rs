use crate::database::Database;
use crate::models::{UpdateProfileRequest, User};
use crate::utils::error::AppError;
use crate::utils::validation;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

/// Diretório de usuários: consultas e escrita da flag de matching.
/// As funções centrais são genéricas sobre o executor para poderem rodar
/// dentro das transações do motor de matching.

pub async fn find_by_id<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(user)
}

pub async fn find_by_email<'e>(
    executor: impl SqliteExecutor<'e>,
    email: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(executor)
        .await?;

    Ok(user)
}

/// Escreve a flag `is_matched` sem validar legalidade; o motor de matching
/// é o responsável pelas invariantes.
pub async fn set_matched<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
    matched: bool,
) -> Result<(), AppError> {
    let result =
        sqlx::query("UPDATE users SET is_matched = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(matched)
            .bind(id)
            .execute(executor)
            .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User".to_string()));
    }

    Ok(())
}

/// Mentores disponíveis (não matched), filtro opcional por skills, mais recentes primeiro
pub async fn find_mentors(
    db: &Database,
    page: u32,
    limit: u32,
    skills: &[String],
) -> Result<Vec<User>, AppError> {
    let offset = (page.saturating_sub(1)) * limit;

    let mut builder =
        QueryBuilder::<Sqlite>::new("SELECT * FROM users WHERE role = 'mentor' AND is_matched = 0");

    if !skills.is_empty() {
        builder.push(" AND (");
        let mut separated = builder.separated(" OR ");
        for skill in skills {
            separated.push("skills LIKE ");
            separated.push_bind_unseparated(format!("%{}%", skill.trim()));
        }
        builder.push(")");
    }

    builder.push(" ORDER BY created_at DESC LIMIT ");
    builder.push_bind(limit);
    builder.push(" OFFSET ");
    builder.push_bind(offset);

    let mentors = builder
        .build_query_as::<User>()
        .fetch_all(db.pool())
        .await?;

    Ok(mentors)
}

/// Atualização parcial de perfil (name/bio/skills/imagem)
pub async fn update_profile(
    db: &Database,
    id: i64,
    updates: &UpdateProfileRequest,
) -> Result<User, AppError> {
    find_by_id(db.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    let profile_image = match &updates.profile_image {
        Some(data_url) => Some(validation::validate_profile_image(data_url)?),
        None => None,
    };

    let mut builder =
        QueryBuilder::<Sqlite>::new("UPDATE users SET updated_at = CURRENT_TIMESTAMP");

    if let Some(name) = &updates.name {
        validation::validate_name(name)?;
        builder.push(", name = ");
        builder.push_bind(name.trim());
    }
    if let Some(bio) = &updates.bio {
        validation::validate_bio(bio)?;
        builder.push(", bio = ");
        builder.push_bind(bio);
    }
    if let Some(skills) = &updates.skills {
        validation::validate_skills(skills)?;
        let skills_json = serde_json::to_string(skills)
            .map_err(|e| AppError::InvalidRequest(format!("Invalid skills: {}", e)))?;
        builder.push(", skills = ");
        builder.push_bind(skills_json);
    }
    if let Some(image) = profile_image {
        builder.push(", profile_image = ");
        builder.push_bind(image);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    builder.build().execute(db.pool()).await?;

    find_by_id(db.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
}

pub async fn delete_user(db: &Database, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    async fn seed_user(db: &Database, email: &str, role: Role, skills: Option<&str>) -> i64 {
        sqlx::query(
            "INSERT INTO users (email, password_hash, name, role, skills) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(email)
        .bind("hash")
        .bind("Test User")
        .bind(role)
        .bind(skills)
        .execute(db.pool())
        .await
        .unwrap()
        .last_insert_rowid()
    }

    #[tokio::test]
    async fn test_set_matched_roundtrip() {
        let db = Database::open_in_memory().await.unwrap();
        let id = seed_user(&db, "mentor@x.com", Role::Mentor, None).await;

        set_matched(db.pool(), id, true).await.unwrap();
        assert!(find_by_id(db.pool(), id).await.unwrap().unwrap().is_matched);

        set_matched(db.pool(), id, false).await.unwrap();
        assert!(!find_by_id(db.pool(), id).await.unwrap().unwrap().is_matched);
    }

    #[tokio::test]
    async fn test_set_matched_unknown_user() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(matches!(
            set_matched(db.pool(), 999, true).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_find_mentors_filters() {
        let db = Database::open_in_memory().await.unwrap();
        let rust_mentor = seed_user(&db, "a@x.com", Role::Mentor, Some("[\"rust\",\"sql\"]")).await;
        let go_mentor = seed_user(&db, "b@x.com", Role::Mentor, Some("[\"go\"]")).await;
        let matched = seed_user(&db, "c@x.com", Role::Mentor, Some("[\"rust\"]")).await;
        seed_user(&db, "d@x.com", Role::Mentee, Some("[\"rust\"]")).await;

        set_matched(db.pool(), matched, true).await.unwrap();

        let all = find_mentors(&db, 1, 10, &[]).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|u| u.id).collect();
        assert!(ids.contains(&rust_mentor));
        assert!(ids.contains(&go_mentor));
        assert!(!ids.contains(&matched)); // mentores já matched ficam de fora

        let rust_only = find_mentors(&db, 1, 10, &["rust".to_string()]).await.unwrap();
        assert_eq!(rust_only.len(), 1);
        assert_eq!(rust_only[0].id, rust_mentor);
    }

    #[tokio::test]
    async fn test_update_profile_partial() {
        let db = Database::open_in_memory().await.unwrap();
        let id = seed_user(&db, "a@x.com", Role::Mentee, None).await;

        let updated = update_profile(
            &db,
            id,
            &UpdateProfileRequest {
                name: Some("New Name".to_string()),
                bio: Some("hello".to_string()),
                skills: Some(vec!["rust".to_string()]),
                profile_image: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.bio.as_deref(), Some("hello"));
        assert_eq!(updated.skills.as_deref(), Some("[\"rust\"]"));
        // Campos não enviados permanecem
        assert_eq!(updated.email, "a@x.com");
    }
}
