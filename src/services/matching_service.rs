use crate::database::Database;
use crate::models::{MatchRequest, MatchStatus, Role};
use crate::services::user_service;
use crate::utils::error::AppError;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

/// Motor de matching: dono do ciclo de vida de match_requests.
///
/// Transições legais: pending -> accepted | rejected (mentor destinatário)
/// e pending -> cancelled (mentee dono, remoção física). Estados terminais
/// não transicionam. O aceite marca as duas partes como matched e rejeita
/// em lote todo outro pending que toque qualquer uma delas.
///
/// Toda mudança de estado é um UPDATE/DELETE guardado que reconfere a
/// precondição no WHERE; 0 linhas afetadas vira a falha tipada e, dentro
/// de transação, derruba a transação inteira. É isso que fecha a janela
/// de corrida entre aceites concorrentes sobre o mesmo mentor ou mentee.

pub const DEFAULT_MESSAGE: &str = "Please accept my mentoring request.";

async fn fetch_request<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<MatchRequest>, AppError> {
    let request = sqlx::query_as::<_, MatchRequest>("SELECT * FROM match_requests WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(request)
}

pub async fn find_by_id(db: &Database, id: i64) -> Result<MatchRequest, AppError> {
    fetch_request(db.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Match request".to_string()))
}

async fn mentee_has_pending<'e>(
    executor: impl SqliteExecutor<'e>,
    mentee_id: i64,
) -> Result<bool, AppError> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM match_requests WHERE mentee_id = ? AND status = 'pending'")
            .bind(mentee_id)
            .fetch_optional(executor)
            .await?;

    Ok(row.is_some())
}

async fn check_create_preconditions(
    db: &Database,
    mentee_id: i64,
    mentor_id: i64,
) -> Result<(), AppError> {
    if mentee_id == mentor_id {
        return Err(AppError::SelfRequest);
    }

    let mentee = user_service::find_by_id(db.pool(), mentee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Mentee".to_string()))?;

    if mentee.is_matched {
        return Err(AppError::AlreadyMatched(
            "You are already matched with a mentor".to_string(),
        ));
    }

    if mentee_has_pending(db.pool(), mentee_id).await? {
        return Err(AppError::DuplicatePending(
            "You already have a pending match request".to_string(),
        ));
    }

    let mentor = user_service::find_by_id(db.pool(), mentor_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Mentor".to_string()))?;

    if mentor.role != Role::Mentor {
        return Err(AppError::NotFound("Mentor".to_string()));
    }

    if mentor.is_matched {
        return Err(AppError::AlreadyMatched(
            "Mentor is already matched".to_string(),
        ));
    }

    Ok(())
}

/// Cria um match request pending do mentee (caller) para o mentor.
pub async fn create(
    db: &Database,
    caller_id: i64,
    caller_role: Role,
    mentor_id: i64,
    message: &str,
) -> Result<MatchRequest, AppError> {
    if caller_role != Role::Mentee {
        return Err(AppError::Forbidden(
            "Only mentees can create match requests".to_string(),
        ));
    }

    let mentee_id = caller_id;
    check_create_preconditions(db, mentee_id, mentor_id).await?;

    // INSERT guardado: as precondições sujeitas a corrida (pending único,
    // partes ainda livres) são reconferidas na própria instrução, atômica
    // no SQLite. 0 linhas = alguém passou na frente entre a checagem e o
    // insert; reclassificamos para devolver a falha precisa.
    let result = sqlx::query(
        "INSERT INTO match_requests (mentor_id, mentee_id, message)
         SELECT ?, ?, ?
         WHERE NOT EXISTS (SELECT 1 FROM match_requests WHERE mentee_id = ? AND status = 'pending')
           AND EXISTS (SELECT 1 FROM users WHERE id = ? AND role = 'mentee' AND is_matched = 0)
           AND EXISTS (SELECT 1 FROM users WHERE id = ? AND role = 'mentor' AND is_matched = 0)",
    )
    .bind(mentor_id)
    .bind(mentee_id)
    .bind(message)
    .bind(mentee_id)
    .bind(mentee_id)
    .bind(mentor_id)
    .execute(db.pool())
    .await;

    let result = match result {
        Ok(result) => result,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            // UNIQUE(mentor_id, mentee_id): o par já tem um request (histórico)
            return Err(AppError::InvalidRequest(
                "A match request with this mentor already exists".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    if result.rows_affected() == 0 {
        check_create_preconditions(db, mentee_id, mentor_id).await?;
        return Err(AppError::DatabaseError(
            "match request insert affected no rows".to_string(),
        ));
    }

    let created = fetch_request(db.pool(), result.last_insert_rowid())
        .await?
        .ok_or_else(|| AppError::DatabaseError("Failed to create match request".to_string()))?;

    log::info!(
        "📨 Match request {} created: mentee {} -> mentor {}",
        created.id,
        mentee_id,
        mentor_id
    );

    Ok(created)
}

/// Aceita um request pending endereçado ao caller (mentor).
///
/// Unidade logicamente atômica: status -> accepted, is_matched das duas
/// partes, e a varredura que rejeita os demais pendings concorrentes.
pub async fn accept(
    db: &Database,
    request_id: i64,
    caller_id: i64,
) -> Result<MatchRequest, AppError> {
    let request = fetch_request(db.pool(), request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Match request".to_string()))?;

    if request.mentor_id != caller_id {
        return Err(AppError::Forbidden(
            "You can only accept requests sent to you".to_string(),
        ));
    }

    if request.status != MatchStatus::Pending {
        return Err(AppError::InvalidState(
            "Only pending requests can be accepted".to_string(),
        ));
    }

    let mut tx = db.pool().begin().await?;

    // Primeira instrução da transação é a escrita CAS: adquire o write
    // lock já revalidando o estado. Um aceite concorrente que tenha
    // vencido já transicionou (ou varreu) este request -> 0 linhas.
    let updated = sqlx::query(
        "UPDATE match_requests SET status = 'accepted', updated_at = CURRENT_TIMESTAMP
         WHERE id = ? AND mentor_id = ? AND status = 'pending'",
    )
    .bind(request_id)
    .bind(caller_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::InvalidState(
            "Only pending requests can be accepted".to_string(),
        ));
    }

    let mentor = user_service::find_by_id(&mut *tx, request.mentor_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Mentor".to_string()))?;

    if mentor.is_matched {
        // tx é descartada sem commit: o CAS acima é desfeito
        return Err(AppError::AlreadyMatched(
            "You are already matched with another mentee".to_string(),
        ));
    }

    let mentee = user_service::find_by_id(&mut *tx, request.mentee_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Mentee".to_string()))?;

    if mentee.is_matched {
        return Err(AppError::AlreadyMatched(
            "Mentee is already matched with another mentor".to_string(),
        ));
    }

    user_service::set_matched(&mut *tx, request.mentor_id, true).await?;
    user_service::set_matched(&mut *tx, request.mentee_id, true).await?;

    // Varredura de auto-rejeição: um único UPDATE em lote fecha todo outro
    // pending que toque o mentor ou o mentee deste aceite
    let swept = sqlx::query(
        "UPDATE match_requests SET status = 'rejected', updated_at = CURRENT_TIMESTAMP
         WHERE (mentor_id = ? OR mentee_id = ?) AND status = 'pending' AND id != ?",
    )
    .bind(request.mentor_id)
    .bind(request.mentee_id)
    .bind(request_id)
    .execute(&mut *tx)
    .await?;

    let accepted = fetch_request(&mut *tx, request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Match request".to_string()))?;

    tx.commit().await?;

    log::info!(
        "🤝 Match request {} accepted: mentor {} + mentee {} ({} competing request(s) auto-rejected)",
        request_id,
        request.mentor_id,
        request.mentee_id,
        swept.rows_affected()
    );

    Ok(accepted)
}

/// Rejeita um request pending endereçado ao caller (mentor).
/// Não altera a flag de nenhum usuário.
pub async fn reject(
    db: &Database,
    request_id: i64,
    caller_id: i64,
) -> Result<MatchRequest, AppError> {
    let request = fetch_request(db.pool(), request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Match request".to_string()))?;

    if request.mentor_id != caller_id {
        return Err(AppError::Forbidden(
            "You can only reject requests sent to you".to_string(),
        ));
    }

    if request.status != MatchStatus::Pending {
        return Err(AppError::InvalidState(
            "Only pending requests can be rejected".to_string(),
        ));
    }

    let updated = sqlx::query(
        "UPDATE match_requests SET status = 'rejected', updated_at = CURRENT_TIMESTAMP
         WHERE id = ? AND mentor_id = ? AND status = 'pending'",
    )
    .bind(request_id)
    .bind(caller_id)
    .execute(db.pool())
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::InvalidState(
            "Only pending requests can be rejected".to_string(),
        ));
    }

    find_by_id(db, request_id).await
}

/// Cancela (remove fisicamente) um request pending do próprio mentee.
/// A assimetria com reject é deliberada: cancel apaga a linha.
pub async fn cancel(db: &Database, request_id: i64, caller_id: i64) -> Result<(), AppError> {
    let request = fetch_request(db.pool(), request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Match request".to_string()))?;

    if request.mentee_id != caller_id {
        return Err(AppError::Forbidden(
            "You can only delete your own requests".to_string(),
        ));
    }

    if request.status != MatchStatus::Pending {
        return Err(AppError::InvalidState(
            "Only pending requests can be deleted".to_string(),
        ));
    }

    let deleted =
        sqlx::query("DELETE FROM match_requests WHERE id = ? AND mentee_id = ? AND status = 'pending'")
            .bind(request_id)
            .bind(caller_id)
            .execute(db.pool())
            .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::InvalidState(
            "Only pending requests can be deleted".to_string(),
        ));
    }

    log::info!("🗑️ Match request {} cancelled by mentee {}", request_id, caller_id);

    Ok(())
}

/// Requests recebidos por um mentor, mais recentes primeiro
pub async fn incoming(db: &Database, mentor_id: i64) -> Result<Vec<MatchRequest>, AppError> {
    let requests = sqlx::query_as::<_, MatchRequest>(
        "SELECT * FROM match_requests WHERE mentor_id = ? ORDER BY created_at DESC",
    )
    .bind(mentor_id)
    .fetch_all(db.pool())
    .await?;

    Ok(requests)
}

/// Requests enviados por um mentee, mais recentes primeiro
pub async fn outgoing(db: &Database, mentee_id: i64) -> Result<Vec<MatchRequest>, AppError> {
    let requests = sqlx::query_as::<_, MatchRequest>(
        "SELECT * FROM match_requests WHERE mentee_id = ? ORDER BY created_at DESC",
    )
    .bind(mentee_id)
    .fetch_all(db.pool())
    .await?;

    Ok(requests)
}

/// Listagem paginada por papel do caller, com filtro opcional de status
pub async fn list_for(
    db: &Database,
    caller_id: i64,
    caller_role: Role,
    status: Option<MatchStatus>,
    page: u32,
    limit: u32,
) -> Result<Vec<MatchRequest>, AppError> {
    let offset = (page.saturating_sub(1)) * limit;

    let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM match_requests WHERE ");
    builder.push(match caller_role {
        Role::Mentor => "mentor_id = ",
        Role::Mentee => "mentee_id = ",
    });
    builder.push_bind(caller_id);

    if let Some(status) = status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY created_at DESC LIMIT ");
    builder.push_bind(limit);
    builder.push(" OFFSET ");
    builder.push_bind(offset);

    let requests = builder
        .build_query_as::<MatchRequest>()
        .fetch_all(db.pool())
        .await?;

    Ok(requests)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_user(db: &Database, email: &str, role: Role, matched: bool) -> i64 {
        sqlx::query(
            "INSERT INTO users (email, password_hash, name, role, is_matched) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(email)
        .bind("hash")
        .bind("Test User")
        .bind(role)
        .bind(matched)
        .execute(db.pool())
        .await
        .unwrap()
        .last_insert_rowid()
    }

    /// Insere um request direto no banco, contornando o motor, para montar
    /// cenários de corrida/estado arbitrário. `age` é um modificador do
    /// SQLite tipo "-10 minutes" para controlar created_at.
    async fn seed_request(
        db: &Database,
        mentor_id: i64,
        mentee_id: i64,
        status: MatchStatus,
        age: &str,
    ) -> i64 {
        sqlx::query(
            "INSERT INTO match_requests (mentor_id, mentee_id, message, status, created_at)
             VALUES (?, ?, ?, ?, datetime('now', ?))",
        )
        .bind(mentor_id)
        .bind(mentee_id)
        .bind("seeded")
        .bind(status)
        .bind(age)
        .execute(db.pool())
        .await
        .unwrap()
        .last_insert_rowid()
    }

    async fn is_matched(db: &Database, id: i64) -> bool {
        user_service::find_by_id(db.pool(), id)
            .await
            .unwrap()
            .unwrap()
            .is_matched
    }

    #[tokio::test]
    async fn test_create_pending_request() {
        let db = Database::open_in_memory().await.unwrap();
        let mentor = seed_user(&db, "mentor@x.com", Role::Mentor, false).await;
        let mentee = seed_user(&db, "mentee@x.com", Role::Mentee, false).await;

        let request = create(&db, mentee, Role::Mentee, mentor, "Hi!").await.unwrap();

        assert_eq!(request.status, MatchStatus::Pending);
        assert_eq!(request.mentor_id, mentor);
        assert_eq!(request.mentee_id, mentee);
        assert_eq!(request.message, "Hi!");
    }

    #[tokio::test]
    async fn test_create_forbidden_for_mentors() {
        let db = Database::open_in_memory().await.unwrap();
        let mentor = seed_user(&db, "mentor@x.com", Role::Mentor, false).await;
        let other = seed_user(&db, "other@x.com", Role::Mentor, false).await;

        let result = create(&db, mentor, Role::Mentor, other, "Hi!").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_second_pending() {
        let db = Database::open_in_memory().await.unwrap();
        let mentor_a = seed_user(&db, "a@x.com", Role::Mentor, false).await;
        let mentor_b = seed_user(&db, "b@x.com", Role::Mentor, false).await;
        let mentee = seed_user(&db, "mentee@x.com", Role::Mentee, false).await;

        create(&db, mentee, Role::Mentee, mentor_a, "Hi!").await.unwrap();

        let result = create(&db, mentee, Role::Mentee, mentor_b, "Hi again!").await;
        assert!(matches!(result, Err(AppError::DuplicatePending(_))));

        // Nenhuma linha extra criada
        let all = outgoing(&db, mentee).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_matched_parties() {
        let db = Database::open_in_memory().await.unwrap();
        let free_mentor = seed_user(&db, "a@x.com", Role::Mentor, false).await;
        let busy_mentor = seed_user(&db, "b@x.com", Role::Mentor, true).await;
        let busy_mentee = seed_user(&db, "c@x.com", Role::Mentee, true).await;
        let free_mentee = seed_user(&db, "d@x.com", Role::Mentee, false).await;

        let result = create(&db, busy_mentee, Role::Mentee, free_mentor, "Hi!").await;
        assert!(matches!(result, Err(AppError::AlreadyMatched(_))));

        let result = create(&db, free_mentee, Role::Mentee, busy_mentor, "Hi!").await;
        assert!(matches!(result, Err(AppError::AlreadyMatched(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_mentor_target() {
        let db = Database::open_in_memory().await.unwrap();
        let mentee = seed_user(&db, "mentee@x.com", Role::Mentee, false).await;
        let other_mentee = seed_user(&db, "other@x.com", Role::Mentee, false).await;

        // Mentor inexistente
        let result = create(&db, mentee, Role::Mentee, 999, "Hi!").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        // Alvo existe mas não é mentor
        let result = create(&db, mentee, Role::Mentee, other_mentee, "Hi!").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_self_request() {
        let db = Database::open_in_memory().await.unwrap();
        let mentee = seed_user(&db, "mentee@x.com", Role::Mentee, false).await;

        let result = create(&db, mentee, Role::Mentee, mentee, "Hi me!").await;
        assert!(matches!(result, Err(AppError::SelfRequest)));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_pair() {
        let db = Database::open_in_memory().await.unwrap();
        let mentor = seed_user(&db, "mentor@x.com", Role::Mentor, false).await;
        let mentee = seed_user(&db, "mentee@x.com", Role::Mentee, false).await;

        let first = create(&db, mentee, Role::Mentee, mentor, "Hi!").await.unwrap();
        reject(&db, first.id, mentor).await.unwrap();

        // O par (mentor, mentee) já tem um request no histórico
        let result = create(&db, mentee, Role::Mentee, mentor, "Hi again!").await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_accept_matches_both_and_sweeps_competitors() {
        let db = Database::open_in_memory().await.unwrap();
        let mentor = seed_user(&db, "t@x.com", Role::Mentor, false).await;
        let other_mentor = seed_user(&db, "t2@x.com", Role::Mentor, false).await;
        let mentee_1 = seed_user(&db, "m1@x.com", Role::Mentee, false).await;
        let mentee_2 = seed_user(&db, "m2@x.com", Role::Mentee, false).await;
        let mentee_3 = seed_user(&db, "m3@x.com", Role::Mentee, false).await;

        let r1 = seed_request(&db, mentor, mentee_1, MatchStatus::Pending, "-30 minutes").await;
        // Compete pelo mesmo mentor
        let r2 = seed_request(&db, mentor, mentee_2, MatchStatus::Pending, "-20 minutes").await;
        // Compete pelo mesmo mentee (estado legado possível, semeado direto)
        let r3 = seed_request(&db, other_mentor, mentee_1, MatchStatus::Pending, "-10 minutes").await;
        // Não compartilha nenhuma das partes: não pode ser tocado
        let r4 = seed_request(&db, other_mentor, mentee_3, MatchStatus::Pending, "-5 minutes").await;

        let accepted = accept(&db, r1, mentor).await.unwrap();
        assert_eq!(accepted.status, MatchStatus::Accepted);

        assert!(is_matched(&db, mentor).await);
        assert!(is_matched(&db, mentee_1).await);

        assert_eq!(find_by_id(&db, r2).await.unwrap().status, MatchStatus::Rejected);
        assert_eq!(find_by_id(&db, r3).await.unwrap().status, MatchStatus::Rejected);
        assert_eq!(find_by_id(&db, r4).await.unwrap().status, MatchStatus::Pending);

        // As partes dos requests varridos continuam livres
        assert!(!is_matched(&db, other_mentor).await);
        assert!(!is_matched(&db, mentee_2).await);
    }

    #[tokio::test]
    async fn test_accept_forbidden_for_other_mentor() {
        let db = Database::open_in_memory().await.unwrap();
        let mentor = seed_user(&db, "t1@x.com", Role::Mentor, false).await;
        let other_mentor = seed_user(&db, "t2@x.com", Role::Mentor, false).await;
        let mentee = seed_user(&db, "m@x.com", Role::Mentee, false).await;

        let request = create(&db, mentee, Role::Mentee, mentor, "Hi!").await.unwrap();

        let result = accept(&db, request.id, other_mentor).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(
            find_by_id(&db, request.id).await.unwrap().status,
            MatchStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_accept_twice_fails_invalid_state() {
        let db = Database::open_in_memory().await.unwrap();
        let mentor = seed_user(&db, "t@x.com", Role::Mentor, false).await;
        let mentee = seed_user(&db, "m@x.com", Role::Mentee, false).await;

        let request = create(&db, mentee, Role::Mentee, mentor, "Hi!").await.unwrap();

        accept(&db, request.id, mentor).await.unwrap();
        let second = accept(&db, request.id, mentor).await;
        assert!(matches!(second, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_accept_rolls_back_when_party_already_matched() {
        let db = Database::open_in_memory().await.unwrap();
        let mentor = seed_user(&db, "t@x.com", Role::Mentor, false).await;
        let mentee = seed_user(&db, "m@x.com", Role::Mentee, false).await;

        // Pending semeado direto com o mentor já matched: é a janela de
        // corrida que o aceite precisa detectar
        let request = seed_request(&db, mentor, mentee, MatchStatus::Pending, "-1 minutes").await;
        user_service::set_matched(db.pool(), mentor, true).await.unwrap();

        let result = accept(&db, request, mentor).await;
        assert!(matches!(result, Err(AppError::AlreadyMatched(_))));

        // Rollback: o CAS de status foi desfeito e o mentee continua livre
        assert_eq!(find_by_id(&db, request).await.unwrap().status, MatchStatus::Pending);
        assert!(!is_matched(&db, mentee).await);
    }

    #[tokio::test]
    async fn test_accept_detects_matched_mentee() {
        let db = Database::open_in_memory().await.unwrap();
        let mentor = seed_user(&db, "t@x.com", Role::Mentor, false).await;
        let mentee = seed_user(&db, "m@x.com", Role::Mentee, false).await;

        let request = seed_request(&db, mentor, mentee, MatchStatus::Pending, "-1 minutes").await;
        user_service::set_matched(db.pool(), mentee, true).await.unwrap();

        let result = accept(&db, request, mentor).await;
        assert!(matches!(result, Err(AppError::AlreadyMatched(_))));
        assert!(!is_matched(&db, mentor).await);
    }

    #[tokio::test]
    async fn test_reject_keeps_row_and_flags() {
        let db = Database::open_in_memory().await.unwrap();
        let mentor = seed_user(&db, "t@x.com", Role::Mentor, false).await;
        let mentee = seed_user(&db, "m@x.com", Role::Mentee, false).await;

        let request = create(&db, mentee, Role::Mentee, mentor, "Hi!").await.unwrap();
        let rejected = reject(&db, request.id, mentor).await.unwrap();

        assert_eq!(rejected.status, MatchStatus::Rejected);
        assert!(!is_matched(&db, mentor).await);
        assert!(!is_matched(&db, mentee).await);

        // Transição terminal: não dá para rejeitar nem aceitar de novo
        assert!(matches!(
            reject(&db, request.id, mentor).await,
            Err(AppError::InvalidState(_))
        ));
        assert!(matches!(
            accept(&db, request.id, mentor).await,
            Err(AppError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_reject_forbidden_for_other_mentor() {
        let db = Database::open_in_memory().await.unwrap();
        let mentor = seed_user(&db, "t1@x.com", Role::Mentor, false).await;
        let other_mentor = seed_user(&db, "t2@x.com", Role::Mentor, false).await;
        let mentee = seed_user(&db, "m@x.com", Role::Mentee, false).await;

        let request = create(&db, mentee, Role::Mentee, mentor, "Hi!").await.unwrap();

        assert!(matches!(
            reject(&db, request.id, other_mentor).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_deletes_row() {
        let db = Database::open_in_memory().await.unwrap();
        let mentor = seed_user(&db, "t@x.com", Role::Mentor, false).await;
        let mentee = seed_user(&db, "m@x.com", Role::Mentee, false).await;

        let request = create(&db, mentee, Role::Mentee, mentor, "Hi!").await.unwrap();
        cancel(&db, request.id, mentee).await.unwrap();

        // Remoção física: leitura posterior é not-found
        assert!(matches!(
            find_by_id(&db, request.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(!is_matched(&db, mentor).await);
        assert!(!is_matched(&db, mentee).await);

        // E o mentee pode criar um novo request para o mesmo mentor
        create(&db, mentee, Role::Mentee, mentor, "Hi again!").await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_guards() {
        let db = Database::open_in_memory().await.unwrap();
        let mentor = seed_user(&db, "t@x.com", Role::Mentor, false).await;
        let mentee = seed_user(&db, "m@x.com", Role::Mentee, false).await;
        let other_mentee = seed_user(&db, "m2@x.com", Role::Mentee, false).await;

        let request = create(&db, mentee, Role::Mentee, mentor, "Hi!").await.unwrap();

        // Só o mentee dono pode cancelar
        assert!(matches!(
            cancel(&db, request.id, other_mentee).await,
            Err(AppError::Forbidden(_))
        ));

        // Depois de aceito, não há mais cancelamento
        accept(&db, request.id, mentor).await.unwrap();
        assert!(matches!(
            cancel(&db, request.id, mentee).await,
            Err(AppError::InvalidState(_))
        ));
        assert!(matches!(
            cancel(&db, 999, mentee).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_listings_order_filter_and_pagination() {
        let db = Database::open_in_memory().await.unwrap();
        let mentor = seed_user(&db, "t@x.com", Role::Mentor, false).await;
        let mentee_1 = seed_user(&db, "m1@x.com", Role::Mentee, false).await;
        let mentee_2 = seed_user(&db, "m2@x.com", Role::Mentee, false).await;
        let mentee_3 = seed_user(&db, "m3@x.com", Role::Mentee, false).await;

        let oldest = seed_request(&db, mentor, mentee_1, MatchStatus::Rejected, "-3 hours").await;
        let middle = seed_request(&db, mentor, mentee_2, MatchStatus::Pending, "-2 hours").await;
        let newest = seed_request(&db, mentor, mentee_3, MatchStatus::Pending, "-1 hours").await;

        let all = incoming(&db, mentor).await.unwrap();
        let ids: Vec<i64> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![newest, middle, oldest]);

        let sent = outgoing(&db, mentee_2).await.unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].id, middle);

        let pending_only = list_for(&db, mentor, Role::Mentor, Some(MatchStatus::Pending), 1, 10)
            .await
            .unwrap();
        let ids: Vec<i64> = pending_only.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![newest, middle]);

        let page_2 = list_for(&db, mentor, Role::Mentor, None, 2, 2).await.unwrap();
        let ids: Vec<i64> = page_2.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![oldest]);
    }
}
