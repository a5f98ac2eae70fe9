// src/services/client_service.rs
//
// Clientes: CRUD da conta de crédito e a varredura de bloqueio automático.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClientRepository, SaleRepository},
    models::crm::{Client, ClientStatus, CreditStatus, SweepReport},
    services::business_rules::{BusinessRules, SaleAge},
};

/// Nota gravada no cliente no momento do bloqueio automático.
/// Registra a idade do título no instante da decisão.
pub fn format_block_note(oldest_unpaid_days: i64, when: DateTime<Utc>) -> String {
    format!(
        "Bloqueado automaticamente em {}: título mais antigo vencido há {} dias.",
        when.format("%d/%m/%Y"),
        oldest_unpaid_days
    )
}

/// Anexa a nota de bloqueio às anotações existentes do cliente.
/// O que o operador escreveu antes fica preservado.
pub fn append_block_note(existing: Option<&str>, note: &str) -> String {
    match existing {
        Some(text) if !text.trim().is_empty() => format!("{}\n{}", text, note),
        _ => note.to_string(),
    }
}

/// Decisão pura da varredura para um cliente: só bloqueia quem está
/// ativo, com saldo devedor positivo e além do prazo. Cliente já
/// bloqueado (ou inativo) nunca gera escrita — é isso que torna a
/// varredura idempotente: a segunda rodada não encontra nada a fazer.
pub fn should_block_in_sweep(
    status: ClientStatus,
    current_balance: Decimal,
    check: &CreditStatus,
) -> bool {
    match status {
        ClientStatus::Active => current_balance > Decimal::ZERO && check.should_block,
        ClientStatus::Blocked | ClientStatus::Inactive => false,
    }
}

#[derive(Clone)]
pub struct ClientService {
    client_repo: ClientRepository,
    sale_repo: SaleRepository,
    rules: BusinessRules,
    pool: PgPool,
}

impl ClientService {
    pub fn new(
        client_repo: ClientRepository,
        sale_repo: SaleRepository,
        rules: BusinessRules,
        pool: PgPool,
    ) -> Self {
        Self {
            client_repo,
            sale_repo,
            rules,
            pool,
        }
    }

    // --- CRUD ---

    pub async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        self.client_repo.list_clients(&self.pool).await
    }

    pub async fn get_client(&self, id: Uuid) -> Result<Client, AppError> {
        self.client_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::ClientNotFound)
    }

    pub async fn create_client(
        &self,
        name: &str,
        document_number: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
        credit_limit: Decimal,
        auto_block_days: Option<i32>,
        notes: Option<&str>,
    ) -> Result<Client, AppError> {
        self.client_repo
            .create_client(
                &self.pool,
                name,
                document_number,
                email,
                phone,
                address,
                credit_limit,
                auto_block_days,
                notes,
            )
            .await
    }

    pub async fn update_client(
        &self,
        id: Uuid,
        name: &str,
        document_number: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
        credit_limit: Decimal,
        auto_block_days: Option<i32>,
        status: ClientStatus,
        notes: Option<&str>,
    ) -> Result<Client, AppError> {
        // BLOCKED nunca entra por input de usuário: é função pura da idade
        // do título mais antigo versus o prazo. Só a varredura bloqueia.
        let current = self.get_client(id).await?;
        if status == ClientStatus::Blocked && current.status != ClientStatus::Blocked {
            return Err(AppError::ValidationError(validation_error(
                "status",
                "O status BLOCKED é controlado pelo bloqueio automático.",
            )));
        }

        self.client_repo
            .update_client(
                &self.pool,
                id,
                name,
                document_number,
                email,
                phone,
                address,
                credit_limit,
                auto_block_days,
                status,
                notes,
            )
            .await
    }

    // --- AVALIAÇÃO DE CRÉDITO ---

    /// Resultado cru do check de bloqueio de um cliente (para exibição).
    pub async fn credit_status(&self, client_id: Uuid) -> Result<CreditStatus, AppError> {
        let client = self.get_client(client_id).await?;

        let oldest = self
            .sale_repo
            .find_oldest_unpaid_by_client(&self.pool, client_id)
            .await?;

        let age = oldest.map(|sale| SaleAge {
            due_date: sale.due_date,
            created_at: sale.created_at,
        });

        Ok(self
            .rules
            .check_auto_block(client.auto_block_days, age.as_ref(), Utc::now()))
    }

    // --- VARREDURA DE BLOQUEIO ---
    // Re-avalia todo cliente ativo com saldo devedor e bloqueia os
    // inadimplentes além do prazo. Cada cliente é independente dos demais;
    // rodar duas vezes seguidas sem mudança de estado não escreve nada
    // na segunda (quem bloqueou saiu do filtro de elegíveis).
    pub async fn run_status_sweep(&self) -> Result<SweepReport, AppError> {
        let eligible = self.client_repo.list_active_with_balance(&self.pool).await?;
        let now = Utc::now();

        let mut report = SweepReport::default();

        for client in eligible {
            report.evaluated += 1;

            let oldest = self
                .sale_repo
                .find_oldest_unpaid_by_client(&self.pool, client.id)
                .await?;

            let age = oldest.map(|sale| SaleAge {
                due_date: sale.due_date,
                created_at: sale.created_at,
            });

            let check = self
                .rules
                .check_auto_block(client.auto_block_days, age.as_ref(), now);

            if !should_block_in_sweep(client.status, client.current_balance, &check) {
                continue;
            }

            let note = append_block_note(
                client.notes.as_deref(),
                &format_block_note(check.oldest_unpaid_days, now),
            );
            // O UPDATE filtra por status ACTIVE: se outra varredura passou
            // na frente, esta escrita vira no-op.
            let blocked = self
                .client_repo
                .block_client(&self.pool, client.id, &note)
                .await?;

            if blocked {
                report.blocked += 1;
                tracing::info!(
                    "Cliente {} bloqueado automaticamente ({} dias de atraso).",
                    client.name,
                    check.oldest_unpaid_days
                );
            }
        }

        Ok(report)
    }
}

// Helper para criar erro de validação avulso no padrão do `validator`.
// O nome do campo vem sempre de literal, então `&'static str` basta.
fn validation_error(field: &'static str, message: &str) -> validator::ValidationErrors {
    let mut errors = validator::ValidationErrors::new();
    let mut err = validator::ValidationError::new("invalid_value");
    err.message = Some(message.to_string().into());
    errors.add(field, err);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    // Avaliação real do motor de regras para um título com N dias de idade.
    fn check_for_days(days: i64) -> CreditStatus {
        let rules = BusinessRules::default(); // prazo: 90 dias
        let sale = SaleAge {
            due_date: Some(now() - Duration::days(days)),
            created_at: now() - Duration::days(days),
        };
        rules.check_auto_block(None, Some(&sale), now())
    }

    #[test]
    fn nota_de_bloqueio_registra_os_dias_de_atraso() {
        let note = format_block_note(100, now());
        assert!(note.contains("100"));
        assert!(note.contains("15/06/2024"));
    }

    #[test]
    fn nota_de_bloqueio_preserva_as_anotacoes_do_operador() {
        let merged = append_block_note(Some("Cliente antigo, negocia bem."), "Bloqueado.");
        assert!(merged.contains("Cliente antigo, negocia bem."));
        assert!(merged.ends_with("Bloqueado."));

        // Sem anotações prévias (ou só espaços), entra a nota sozinha.
        assert_eq!(append_block_note(None, "Bloqueado."), "Bloqueado.");
        assert_eq!(append_block_note(Some("  "), "Bloqueado."), "Bloqueado.");
    }

    #[test]
    fn varredura_bloqueia_ativo_devedor_alem_do_prazo() {
        // Cliente A: ativo, saldo 5000, título de 100 dias, prazo 90.
        let check = check_for_days(100);
        assert!(should_block_in_sweep(
            ClientStatus::Active,
            Decimal::from(5000),
            &check
        ));
        // E a nota gravada carrega a contagem do momento da decisão.
        let note = format_block_note(check.oldest_unpaid_days, now());
        assert!(note.contains("100"));
    }

    #[test]
    fn varredura_nao_toca_cliente_sem_saldo_devedor() {
        // Cliente B: ativo, saldo zero. Mesmo com título velho, fica como está.
        let check = check_for_days(100);
        assert!(!should_block_in_sweep(
            ClientStatus::Active,
            Decimal::ZERO,
            &check
        ));
    }

    #[test]
    fn varredura_nao_toca_cliente_ja_bloqueado() {
        // Cliente C: já bloqueado. Não importa a contagem de dias.
        for days in [0, 90, 100, 1000] {
            let check = check_for_days(days);
            assert!(!should_block_in_sweep(
                ClientStatus::Blocked,
                Decimal::from(5000),
                &check
            ));
        }
    }

    #[test]
    fn varredura_nao_toca_cliente_dentro_do_prazo() {
        let check = check_for_days(90);
        assert!(!should_block_in_sweep(
            ClientStatus::Active,
            Decimal::from(5000),
            &check
        ));
    }

    #[test]
    fn segunda_rodada_da_varredura_nao_escreve_nada() {
        let check = check_for_days(100);

        // Primeira rodada: o cliente está ativo e é bloqueado.
        assert!(should_block_in_sweep(
            ClientStatus::Active,
            Decimal::from(5000),
            &check
        ));

        // Segunda rodada, sem mudança de estado no meio: o mesmo cliente
        // agora aparece como BLOCKED e a decisão vira não-escrever.
        assert!(!should_block_in_sweep(
            ClientStatus::Blocked,
            Decimal::from(5000),
            &check
        ));
    }

    #[test]
    fn varredura_ignora_cliente_inativo() {
        let check = check_for_days(100);
        assert!(!should_block_in_sweep(
            ClientStatus::Inactive,
            Decimal::from(5000),
            &check
        ));
    }
}
