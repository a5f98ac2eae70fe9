// src/services/business_rules.rs
//
// Motor de regras de crédito. Funções puras sobre snapshots em memória:
// quem carrega dados do banco são os serviços, aqui só se decide.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::env;

use crate::models::crm::CreditStatus;

// Limiares injetados (e não constantes de compilação) para que os testes
// possam variar os valores sem estado global.
#[derive(Debug, Clone)]
pub struct BusinessRules {
    // Acima deste valor em aberto, a venda exige aprovação de um admin.
    pub approval_threshold: Decimal,
    // Prazo global (dias) para bloqueio automático de cliente inadimplente.
    pub default_block_days: i64,
    // Carência usada SÓ na listagem de títulos em aberto (exibição).
    // Independente do prazo de bloqueio; não unificar.
    pub listing_grace_days: i64,
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            approval_threshold: Decimal::from(500_000_i64),
            default_block_days: 90,
            listing_grace_days: 30,
        }
    }
}

impl BusinessRules {
    // Lê os limiares do ambiente, caindo nos defaults acima.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let approval_threshold = env::var("APPROVAL_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<Decimal>().ok())
            .unwrap_or(defaults.approval_threshold);

        let default_block_days = env::var("AUTO_BLOCK_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(defaults.default_block_days);

        let listing_grace_days = env::var("LISTING_GRACE_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(defaults.listing_grace_days);

        Self {
            approval_threshold,
            default_block_days,
            listing_grace_days,
        }
    }

    /// Venda com valor em aberto acima do limiar precisa passar por um admin.
    /// Estritamente maior: exatamente no limiar não exige aprovação.
    pub fn requires_admin_approval(&self, amount: Decimal) -> bool {
        amount > self.approval_threshold
    }

    /// Avalia o bloqueio automático de um cliente a partir do título em
    /// aberto mais antigo dele (`oldest_unpaid`), se houver.
    ///
    /// O prazo efetivo é o override por cliente (`auto_block_days`), senão o
    /// default global. Bloqueia apenas quando `dias > prazo` (estrito): um
    /// título vencido há exatamente N dias com prazo N ainda não bloqueia.
    pub fn check_auto_block(
        &self,
        auto_block_days: Option<i32>,
        oldest_unpaid: Option<&SaleAge>,
        now: DateTime<Utc>,
    ) -> CreditStatus {
        let Some(oldest) = oldest_unpaid else {
            // Sem títulos em aberto, nunca bloqueia.
            return CreditStatus {
                should_block: false,
                oldest_unpaid_days: 0,
            };
        };

        let days = days_since(oldest.effective_due_date(), now);
        let block_days = auto_block_days.map(i64::from).unwrap_or(self.default_block_days);

        CreditStatus {
            should_block: days > block_days,
            // O contador é reportado mesmo sem bloquear (uso em relatórios).
            oldest_unpaid_days: days,
        }
    }

    /// Dias de atraso para a listagem de títulos em aberto: o vencimento
    /// efetivo ganha a carência de exibição antes da contagem.
    pub fn listing_days_overdue(
        &self,
        due_date: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> i64 {
        let base = due_date.unwrap_or(created_at) + chrono::Duration::days(self.listing_grace_days);
        days_since(base, now)
    }
}

// Datas relevantes de uma venda para a contagem de atraso.
#[derive(Debug, Clone, Copy)]
pub struct SaleAge {
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SaleAge {
    // Vencimento explícito se houver; senão, a data de criação.
    pub fn effective_due_date(&self) -> DateTime<Utc> {
        self.due_date.unwrap_or(self.created_at)
    }
}

// `num_days` trunca em direção ao zero, que é o arredondamento exigido:
// 90 dias e 23h contam como 90.
fn days_since(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn rules() -> BusinessRules {
        BusinessRules::default()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn aprovacao_exigida_somente_acima_do_limiar() {
        let r = rules();
        assert!(!r.requires_admin_approval(Decimal::from(499_999)));
        assert!(!r.requires_admin_approval(Decimal::from(500_000)));
        assert!(r.requires_admin_approval(Decimal::from(500_001)));
    }

    #[test]
    fn limiar_de_aprovacao_e_configuravel() {
        let r = BusinessRules {
            approval_threshold: Decimal::from(100),
            ..BusinessRules::default()
        };
        assert!(r.requires_admin_approval(Decimal::from(101)));
        assert!(!r.requires_admin_approval(Decimal::from(100)));
    }

    #[test]
    fn cliente_sem_titulos_em_aberto_nunca_bloqueia() {
        let check = rules().check_auto_block(None, None, now());
        assert!(!check.should_block);
        assert_eq!(check.oldest_unpaid_days, 0);
    }

    #[test]
    fn bloqueia_com_91_dias_no_prazo_default_de_90() {
        let sale = SaleAge {
            due_date: Some(now() - Duration::days(91)),
            created_at: now() - Duration::days(120),
        };
        let check = rules().check_auto_block(None, Some(&sale), now());
        assert!(check.should_block);
        assert_eq!(check.oldest_unpaid_days, 91);
    }

    #[test]
    fn nao_bloqueia_com_exatamente_90_dias() {
        let sale = SaleAge {
            due_date: Some(now() - Duration::days(90)),
            created_at: now() - Duration::days(120),
        };
        let check = rules().check_auto_block(None, Some(&sale), now());
        assert!(!check.should_block);
        assert_eq!(check.oldest_unpaid_days, 90);
    }

    #[test]
    fn sem_vencimento_explicito_usa_a_data_de_criacao() {
        let sale = SaleAge {
            due_date: None,
            created_at: now() - Duration::days(100),
        };
        let check = rules().check_auto_block(None, Some(&sale), now());
        assert!(check.should_block);
        assert_eq!(check.oldest_unpaid_days, 100);
    }

    #[test]
    fn override_por_cliente_tem_precedencia_sobre_o_default() {
        let sale = SaleAge {
            due_date: Some(now() - Duration::days(40)),
            created_at: now() - Duration::days(40),
        };
        // Default (90) não bloquearia; o override de 30 dias bloqueia.
        let check = rules().check_auto_block(Some(30), Some(&sale), now());
        assert!(check.should_block);
        assert_eq!(check.oldest_unpaid_days, 40);

        // E o override mais folgado que o default impede o bloqueio.
        let sale = SaleAge {
            due_date: Some(now() - Duration::days(100)),
            created_at: now() - Duration::days(100),
        };
        let check = rules().check_auto_block(Some(120), Some(&sale), now());
        assert!(!check.should_block);
    }

    #[test]
    fn contagem_trunca_em_direcao_ao_zero() {
        // 90 dias e 23 horas ainda são 90 dias.
        let sale = SaleAge {
            due_date: Some(now() - Duration::days(90) - Duration::hours(23)),
            created_at: now(),
        };
        let check = rules().check_auto_block(None, Some(&sale), now());
        assert!(!check.should_block);
        assert_eq!(check.oldest_unpaid_days, 90);
    }

    #[test]
    fn vencimento_no_futuro_nao_bloqueia() {
        let sale = SaleAge {
            due_date: Some(now() + Duration::days(10)),
            created_at: now() - Duration::days(1),
        };
        let check = rules().check_auto_block(None, Some(&sale), now());
        assert!(!check.should_block);
    }

    #[test]
    fn atraso_na_listagem_aplica_a_carencia_de_exibicao() {
        let r = rules();
        let created = now() - Duration::days(50);
        // Sem vencimento explícito: 50 dias desde a criação - 30 de carência.
        assert_eq!(r.listing_days_overdue(None, created, now()), 20);
        // Com vencimento explícito, a carência soma sobre ele.
        let due = now() - Duration::days(35);
        assert_eq!(r.listing_days_overdue(Some(due), created, now()), 5);
    }
}
