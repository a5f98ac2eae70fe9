// src/services/sale_service.rs
//
// Vendas: criação, workflow de aprovação (aprovar/rejeitar) e listagem de
// títulos em aberto. O conjunto de mutações de uma efetivação é calculado
// primeiro como um plano puro (testável) e só então aplicado na transação.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, ClientRepository, SaleRepository},
    models::{
        auth::User,
        crm::ClientStatus,
        sales::{RejectResponse, Sale, SaleItem, StockMovementReason, UnpaidSaleRow},
    },
    services::business_rules::BusinessRules,
};

// Item de uma venda ainda não persistida.
#[derive(Debug, Clone)]
pub struct NewSaleItem {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

// Conjunto de mutações da efetivação de uma venda: baixa de estoque por
// produto e, se for venda a prazo, o crédito no saldo devedor do cliente.
// Ou tudo entra, ou nada entra.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleEffectsPlan {
    pub stock_deltas: Vec<StockDelta>,
    pub balance_credit: Option<BalanceCredit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockDelta {
    pub product_id: Uuid,
    pub delta: Decimal, // Negativo: venda baixa estoque
}

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceCredit {
    pub client_id: Uuid,
    pub amount: Decimal,
}

/// Guardas do workflow de aprovação. Uma venda só entra (ou sai) da fila
/// enquanto exige aprovação E ainda não foi aprovada.
pub fn ensure_pending_approval(sale: &Sale) -> Result<(), AppError> {
    if sale.approved_by.is_some() {
        return Err(AppError::InvalidSaleState(
            "Esta venda já foi aprovada.".to_string(),
        ));
    }
    if !sale.requires_admin_approval {
        return Err(AppError::InvalidSaleState(
            "Esta venda não exige aprovação.".to_string(),
        ));
    }
    Ok(())
}

/// Calcula o plano de efetivação de uma venda a partir dos itens.
/// Puro: nenhum acesso a banco aqui.
pub fn plan_sale_effects(sale: &Sale, items: &[SaleItem]) -> SaleEffectsPlan {
    let stock_deltas = items
        .iter()
        .map(|item| StockDelta {
            product_id: item.product_id,
            delta: -item.quantity,
        })
        .collect();

    // O crédito só é reconhecido no saldo do cliente quando há valor em
    // aberto — venda à vista aprovada não mexe em saldo.
    let balance_credit = match sale.client_id {
        Some(client_id) if sale.remaining_amount > Decimal::ZERO => Some(BalanceCredit {
            client_id,
            amount: sale.remaining_amount,
        }),
        _ => None,
    };

    SaleEffectsPlan {
        stock_deltas,
        balance_credit,
    }
}

/// Soma dos itens (quantidade x preço unitário), calculada no servidor.
pub fn compute_total(items: &[NewSaleItem]) -> Decimal {
    items
        .iter()
        .map(|item| item.quantity * item.unit_price)
        .sum()
}

/// Enriquecimento da listagem de títulos em aberto: calcula os dias de
/// atraso (com a carência de exibição), aplica o corte opcional e ordena
/// do mais atrasado para o menos.
pub fn annotate_unpaid_rows(
    mut rows: Vec<UnpaidSaleRow>,
    rules: &BusinessRules,
    min_days_overdue: Option<i64>,
    now: DateTime<Utc>,
) -> Vec<UnpaidSaleRow> {
    for row in rows.iter_mut() {
        row.days_overdue = rules.listing_days_overdue(row.due_date, row.created_at, now);
    }

    if let Some(cutoff) = min_days_overdue {
        rows.retain(|row| row.days_overdue >= cutoff);
    }

    rows.sort_by(|a, b| b.days_overdue.cmp(&a.days_overdue));
    rows
}

#[derive(Clone)]
pub struct SaleService {
    sale_repo: SaleRepository,
    catalog_repo: CatalogRepository,
    client_repo: ClientRepository,
    rules: BusinessRules,
    pool: PgPool,
}

impl SaleService {
    pub fn new(
        sale_repo: SaleRepository,
        catalog_repo: CatalogRepository,
        client_repo: ClientRepository,
        rules: BusinessRules,
        pool: PgPool,
    ) -> Self {
        Self {
            sale_repo,
            catalog_repo,
            client_repo,
            rules,
            pool,
        }
    }

    // --- CRIAÇÃO ---
    // Venda abaixo do limiar: efeitos (estoque, razão, saldo) aplicam já.
    // Venda acima: entra intocada na fila de aprovação.
    pub async fn create_sale(
        &self,
        operator: &User,
        client_id: Option<Uuid>,
        due_date: Option<DateTime<Utc>>,
        paid_amount: Decimal,
        items: Vec<NewSaleItem>,
    ) -> Result<Sale, AppError> {
        let total = compute_total(&items);
        if paid_amount > total {
            return Err(AppError::InvalidSaleState(
                "O valor pago não pode exceder o total da venda.".to_string(),
            ));
        }
        let remaining = total - paid_amount;

        // Venda com saldo em aberto é venda a prazo: precisa de cliente.
        if remaining > Decimal::ZERO && client_id.is_none() {
            return Err(AppError::InvalidSaleState(
                "Venda a prazo exige um cliente associado.".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        if let Some(client_id) = client_id {
            let client = self
                .client_repo
                .find_by_id(&mut *tx, client_id)
                .await?
                .ok_or(AppError::ClientNotFound)?;

            if remaining > Decimal::ZERO && client.status == ClientStatus::Blocked {
                return Err(AppError::InvalidSaleState(
                    "Cliente bloqueado não pode comprar a prazo.".to_string(),
                ));
            }
        }

        // O limiar olha para a exposição de crédito (valor em aberto),
        // não para o total da venda.
        let requires_approval = self.rules.requires_admin_approval(remaining);

        let sale_number = self.sale_repo.next_sale_number(&mut *tx).await?;
        let sale = self
            .sale_repo
            .create_sale(
                &mut *tx,
                sale_number,
                client_id,
                operator.id,
                total,
                remaining,
                requires_approval,
                due_date,
            )
            .await?;

        let mut persisted_items = Vec::with_capacity(items.len());
        for item in &items {
            let subtotal = item.quantity * item.unit_price;
            let persisted = self
                .sale_repo
                .insert_item(
                    &mut *tx,
                    sale.id,
                    item.product_id,
                    item.quantity,
                    item.unit_price,
                    subtotal,
                )
                .await?;
            persisted_items.push(persisted);
        }

        if !requires_approval {
            let plan = plan_sale_effects(&sale, &persisted_items);
            self.apply_effects(&mut tx, &sale, &plan).await?;
        }

        tx.commit().await?;

        if requires_approval {
            tracing::info!(
                "Venda #{} acima do limiar: aguardando aprovação de um admin.",
                sale.sale_number
            );
        }

        Ok(sale)
    }

    // --- APROVAÇÃO ---
    pub async fn approve_sale(&self, sale_id: Uuid, admin: &User) -> Result<Sale, AppError> {
        // Checagem rápida ANTES de abrir transação: precondição violada
        // retorna sem tocar em nada.
        let sale = self
            .sale_repo
            .find_by_id(&self.pool, sale_id)
            .await?
            .ok_or(AppError::SaleNotFound)?;
        ensure_pending_approval(&sale)?;

        let mut tx = self.pool.begin().await?;

        // Re-checa sob FOR UPDATE: dois admins em corrida, um só passa.
        let sale = self
            .sale_repo
            .find_by_id_for_update(&mut *tx, sale_id)
            .await?
            .ok_or(AppError::SaleNotFound)?;
        ensure_pending_approval(&sale)?;

        let items = self.sale_repo.list_items(&mut *tx, sale.id).await?;
        let plan = plan_sale_effects(&sale, &items);

        self.apply_effects(&mut tx, &sale, &plan).await?;

        let approved = self
            .sale_repo
            .stamp_approval(&mut *tx, sale.id, admin.id, Utc::now())
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Venda #{} aprovada por {} ({}).",
            approved.sale_number,
            admin.name,
            admin.email
        );

        Ok(approved)
    }

    // --- REJEIÇÃO ---
    // Venda rejeitada é apagada por inteiro (itens e cabeçalho):
    // é como se nunca tivesse acontecido. Estoque e saldo não mudam.
    pub async fn reject_sale(&self, sale_id: Uuid) -> Result<RejectResponse, AppError> {
        let sale = self
            .sale_repo
            .find_by_id(&self.pool, sale_id)
            .await?
            .ok_or(AppError::SaleNotFound)?;
        ensure_pending_approval(&sale)?;

        let mut tx = self.pool.begin().await?;

        let sale = self
            .sale_repo
            .find_by_id_for_update(&mut *tx, sale_id)
            .await?
            .ok_or(AppError::SaleNotFound)?;
        ensure_pending_approval(&sale)?;

        self.sale_repo.delete_items(&mut *tx, sale.id).await?;
        self.sale_repo.delete_sale(&mut *tx, sale.id).await?;

        tx.commit().await?;

        tracing::info!("Venda #{} rejeitada e removida.", sale.sale_number);

        Ok(RejectResponse {
            success: true,
            message: format!("Venda #{} rejeitada.", sale.sale_number),
        })
    }

    // --- LISTAGENS ---

    pub async fn list_sales(&self) -> Result<Vec<Sale>, AppError> {
        self.sale_repo.list_sales(&self.pool).await
    }

    pub async fn list_pending_approval(&self) -> Result<Vec<Sale>, AppError> {
        self.sale_repo.list_pending_approval(&self.pool).await
    }

    pub async fn list_unpaid(
        &self,
        min_days_overdue: Option<i64>,
        client_id: Option<Uuid>,
    ) -> Result<Vec<UnpaidSaleRow>, AppError> {
        let rows = self.sale_repo.list_unpaid(&self.pool, client_id).await?;
        Ok(annotate_unpaid_rows(
            rows,
            &self.rules,
            min_days_overdue,
            Utc::now(),
        ))
    }

    // Aplica o plano dentro da transação corrente: baixa de estoque,
    // lançamento no livro-razão e crédito no saldo do cliente.
    async fn apply_effects(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        sale: &Sale,
        plan: &SaleEffectsPlan,
    ) -> Result<(), AppError> {
        for delta in &plan.stock_deltas {
            self.catalog_repo
                .adjust_stock(&mut **tx, delta.product_id, delta.delta)
                .await?;

            self.sale_repo
                .record_stock_movement(
                    &mut **tx,
                    delta.product_id,
                    // O razão aponta para o operador que registrou a venda.
                    sale.user_id,
                    delta.delta,
                    StockMovementReason::Sale,
                    Some(sale.id),
                    Some(&format!("Venda #{}", sale.sale_number)),
                )
                .await?;
        }

        if let Some(credit) = &plan.balance_credit {
            self.client_repo
                .adjust_balance(&mut **tx, credit.client_id, credit.amount)
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn sale(
        client_id: Option<Uuid>,
        remaining: Decimal,
        requires_approval: bool,
        approved_by: Option<Uuid>,
    ) -> Sale {
        Sale {
            id: Uuid::new_v4(),
            sale_number: 42,
            client_id,
            user_id: Uuid::new_v4(),
            total: Decimal::from(600_000),
            remaining_amount: remaining,
            is_paid: remaining == Decimal::ZERO,
            requires_admin_approval: requires_approval,
            approved_by,
            approved_at: approved_by.map(|_| now()),
            due_date: None,
            created_at: now(),
        }
    }

    fn item(sale_id: Uuid, quantity: i64) -> SaleItem {
        SaleItem {
            id: Uuid::new_v4(),
            sale_id,
            product_id: Uuid::new_v4(),
            quantity: Decimal::from(quantity),
            unit_price: Decimal::from(100),
            subtotal: Decimal::from(quantity * 100),
        }
    }

    #[test]
    fn guarda_aceita_venda_pendente() {
        let s = sale(None, Decimal::ZERO, true, None);
        assert!(ensure_pending_approval(&s).is_ok());
    }

    #[test]
    fn guarda_barra_venda_ja_aprovada() {
        let s = sale(None, Decimal::ZERO, false, Some(Uuid::new_v4()));
        assert!(matches!(
            ensure_pending_approval(&s),
            Err(AppError::InvalidSaleState(_))
        ));
    }

    #[test]
    fn guarda_barra_venda_que_nao_exige_aprovacao() {
        let s = sale(None, Decimal::ZERO, false, None);
        assert!(matches!(
            ensure_pending_approval(&s),
            Err(AppError::InvalidSaleState(_))
        ));
    }

    #[test]
    fn plano_baixa_estoque_de_cada_item_e_credita_o_cliente() {
        let client_id = Uuid::new_v4();
        let s = sale(Some(client_id), Decimal::from(1000), true, None);
        let items = vec![item(s.id, 3), item(s.id, 5)];

        let plan = plan_sale_effects(&s, &items);

        assert_eq!(plan.stock_deltas.len(), 2);
        assert_eq!(plan.stock_deltas[0].delta, Decimal::from(-3));
        assert_eq!(plan.stock_deltas[1].delta, Decimal::from(-5));
        assert_eq!(plan.stock_deltas[0].product_id, items[0].product_id);
        assert_eq!(plan.stock_deltas[1].product_id, items[1].product_id);

        let credit = plan.balance_credit.expect("venda a prazo credita o saldo");
        assert_eq!(credit.client_id, client_id);
        assert_eq!(credit.amount, Decimal::from(1000));
    }

    #[test]
    fn plano_sem_cliente_nao_mexe_em_saldo() {
        let s = sale(None, Decimal::ZERO, true, None);
        let items = vec![item(s.id, 2)];
        let plan = plan_sale_effects(&s, &items);
        assert!(plan.balance_credit.is_none());
    }

    #[test]
    fn plano_de_venda_quitada_nao_mexe_em_saldo() {
        // Cliente presente, mas nada em aberto: saldo fica como está.
        let s = sale(Some(Uuid::new_v4()), Decimal::ZERO, true, None);
        let plan = plan_sale_effects(&s, &[item(s.id, 1)]);
        assert!(plan.balance_credit.is_none());
    }

    #[test]
    fn total_e_a_soma_de_quantidade_por_preco() {
        let items = vec![
            NewSaleItem {
                product_id: Uuid::new_v4(),
                quantity: Decimal::from(3),
                unit_price: Decimal::from(10),
            },
            NewSaleItem {
                product_id: Uuid::new_v4(),
                quantity: Decimal::from(2),
                unit_price: Decimal::new(255, 1), // 25.5
            },
        ];
        assert_eq!(compute_total(&items), Decimal::from(81));
    }

    fn unpaid_row(days_ago: i64, due_days_ago: Option<i64>) -> UnpaidSaleRow {
        UnpaidSaleRow {
            id: Uuid::new_v4(),
            sale_number: 1,
            client_id: None,
            client_name: None,
            total: Decimal::from(100),
            remaining_amount: Decimal::from(100),
            due_date: due_days_ago.map(|d| now() - Duration::days(d)),
            created_at: now() - Duration::days(days_ago),
            days_overdue: 0,
        }
    }

    #[test]
    fn listagem_anota_filtra_e_ordena_por_atraso_decrescente() {
        let rules = BusinessRules::default(); // carência de exibição: 30
        let rows = vec![
            unpaid_row(40, None),       // 40 - 30 = 10 dias
            unpaid_row(100, Some(90)),  // 90 - 30 = 60 dias
            unpaid_row(120, Some(50)),  // 50 - 30 = 20 dias
        ];

        let annotated = annotate_unpaid_rows(rows.clone(), &rules, None, now());
        let days: Vec<i64> = annotated.iter().map(|r| r.days_overdue).collect();
        assert_eq!(days, vec![60, 20, 10]);

        // Corte em 15 dias deixa só os dois mais atrasados.
        let filtered = annotate_unpaid_rows(rows, &rules, Some(15), now());
        let days: Vec<i64> = filtered.iter().map(|r| r.days_overdue).collect();
        assert_eq!(days, vec![60, 20]);
    }
}
