// src/services/billing_service.rs

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BillingRepository, TenantRepository},
    gateway::{Charge, PaymentGateway},
    models::billing::{
        GenerationReport, Mensalidade, PaymentStatus, RecurringContract, TenantInvoice,
    },
    models::tenancy::Tenant,
};

// Faturas da plataforma vencem sempre no dia 5 da competência.
pub const TENANT_INVOICE_DUE_DAY: u32 = 5;

// =============================================================================
//  Núcleo puro de datas e valores
// =============================================================================

/// Primeiro dia do mês de competência da data de referência.
pub fn competence_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).expect("todo mês tem dia 1")
}

pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .expect("mês seguinte sempre existe")
        .pred_opt()
        .expect("véspera do dia 1 sempre existe")
        .day()
}

/// Vencimento no mês pedido, com o dia grampeado para o último dia do mês
/// (due_day 31 num mês de 30 dias vence no dia 30, nunca em data inválida).
pub fn due_date_clamped(year: i32, month: u32, due_day: u32) -> NaiveDate {
    let day = due_day.min(last_day_of_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).expect("dia grampeado é sempre válido")
}

/// O contrato vence na data de referência? Usa o mesmo grampo do vencimento:
/// due_day 31 "vence" no último dia de um mês curto.
pub fn due_matches(due_day: i32, date: NaiveDate) -> bool {
    if due_day < 1 {
        return false;
    }
    let effective = (due_day as u32).min(last_day_of_month(date.year(), date.month()));
    effective == date.day()
}

/// Desconto em moeda (duas casas) a partir do percentual do contrato.
pub fn discount_amount(base_value: Decimal, discount_percent: Decimal) -> Decimal {
    to_currency(base_value * discount_percent / Decimal::ONE_HUNDRED)
}

/// valor_final = base - base*desconto/100 + acréscimo, em semântica de moeda
/// com duas casas decimais.
pub fn final_value(base_value: Decimal, discount_percent: Decimal, surcharge: Decimal) -> Decimal {
    to_currency(base_value - discount_amount(base_value, discount_percent) + surcharge)
}

/// Arredonda E fixa a escala em duas casas (180 vira 180.00, não "180").
fn to_currency(value: Decimal) -> Decimal {
    let mut value = value.round_dp(2);
    value.rescale(2);
    value
}

/// Traduz o evento do webhook do gateway para o nosso status de pagamento.
/// Eventos que não mudam status (estornos parciais, avisos) viram None.
pub fn payment_status_for_event(event: &str) -> Option<PaymentStatus> {
    match event {
        "PAYMENT_RECEIVED" | "PAYMENT_CONFIRMED" => Some(PaymentStatus::Paid),
        "PAYMENT_OVERDUE" => Some(PaymentStatus::Overdue),
        "PAYMENT_DELETED" | "PAYMENT_REFUNDED" => Some(PaymentStatus::Cancelled),
        _ => None,
    }
}

// =============================================================================
//  Recorte de armazenamento dos geradores
// =============================================================================

/// O que o lote de mensalidades usa do armazenamento, item a item. Trait para
/// o lote poder ser exercitado com uma implementação em memória, sem banco,
/// como o PaymentGateway.
#[async_trait]
trait MensalidadeStore: Send + Sync {
    async fn mensalidade_exists(
        &self,
        contract_id: Uuid,
        competence: NaiveDate,
    ) -> Result<bool, AppError>;

    async fn insert_mensalidade(
        &self,
        contract: &RecurringContract,
        competence: NaiveDate,
        due_date: NaiveDate,
        base_value: Decimal,
        discount: Decimal,
        surcharge: Decimal,
        final_value: Decimal,
    ) -> Result<(), AppError>;
}

/// Idem para o lote de faturas da plataforma.
#[async_trait]
trait InvoiceStore: Send + Sync {
    async fn invoice_exists(
        &self,
        tenant_id: Uuid,
        competence: NaiveDate,
    ) -> Result<bool, AppError>;

    async fn set_gateway_customer_id(
        &self,
        tenant_id: Uuid,
        customer_id: &str,
    ) -> Result<(), AppError>;

    async fn insert_invoice(
        &self,
        tenant: &Tenant,
        competence: NaiveDate,
        due_date: NaiveDate,
        charge: &Charge,
    ) -> Result<(), AppError>;
}

struct PgMensalidadeStore<'a> {
    repo: &'a BillingRepository,
    pool: &'a PgPool,
}

#[async_trait]
impl MensalidadeStore for PgMensalidadeStore<'_> {
    async fn mensalidade_exists(
        &self,
        contract_id: Uuid,
        competence: NaiveDate,
    ) -> Result<bool, AppError> {
        self.repo.mensalidade_exists(self.pool, contract_id, competence).await
    }

    async fn insert_mensalidade(
        &self,
        contract: &RecurringContract,
        competence: NaiveDate,
        due_date: NaiveDate,
        base_value: Decimal,
        discount: Decimal,
        surcharge: Decimal,
        final_value: Decimal,
    ) -> Result<(), AppError> {
        self.repo
            .insert_mensalidade(
                self.pool,
                contract.tenant_id,
                contract.id,
                competence,
                due_date,
                base_value,
                discount,
                surcharge,
                final_value,
            )
            .await?;
        Ok(())
    }
}

struct PgInvoiceStore<'a> {
    repo: &'a BillingRepository,
    tenant_repo: &'a TenantRepository,
    pool: &'a PgPool,
}

#[async_trait]
impl InvoiceStore for PgInvoiceStore<'_> {
    async fn invoice_exists(
        &self,
        tenant_id: Uuid,
        competence: NaiveDate,
    ) -> Result<bool, AppError> {
        self.repo.invoice_exists(self.pool, tenant_id, competence).await
    }

    async fn set_gateway_customer_id(
        &self,
        tenant_id: Uuid,
        customer_id: &str,
    ) -> Result<(), AppError> {
        self.tenant_repo
            .set_gateway_customer_id(self.pool, tenant_id, customer_id)
            .await
    }

    async fn insert_invoice(
        &self,
        tenant: &Tenant,
        competence: NaiveDate,
        due_date: NaiveDate,
        charge: &Charge,
    ) -> Result<(), AppError> {
        self.repo
            .insert_tenant_invoice(
                self.pool,
                tenant.id,
                competence,
                due_date,
                tenant.subscription_value,
                &charge.id,
                charge.invoice_url.as_deref(),
                charge.bank_slip_url.as_deref(),
                charge.pix_payload.as_deref(),
            )
            .await?;
        Ok(())
    }
}

// =============================================================================
//  Lotes dos geradores
// =============================================================================

/// Filtra os contratos que vencem na data de referência e gera uma mensalidade
/// por candidato, pulando as competências já geradas. Falha em um item é
/// logada e o lote segue para os demais.
async fn run_mensalidade_batch(
    store: &dyn MensalidadeStore,
    contracts: Vec<RecurringContract>,
    today: NaiveDate,
) -> GenerationReport {
    let candidates: Vec<RecurringContract> = contracts
        .into_iter()
        .filter(|c| due_matches(c.due_day, today))
        .collect();

    let mut report = GenerationReport {
        total_candidates: candidates.len() as u32,
        ..Default::default()
    };

    for contract in &candidates {
        match generate_one_mensalidade(store, contract, today).await {
            Ok(true) => report.created += 1,
            Ok(false) => report.skipped += 1,
            Err(e) => {
                tracing::error!(
                    "Falha ao gerar mensalidade do contrato {}: {}",
                    contract.id,
                    e
                );
            }
        }
    }

    report
}

/// Ok(true) = criada, Ok(false) = já existia para a competência.
async fn generate_one_mensalidade(
    store: &dyn MensalidadeStore,
    contract: &RecurringContract,
    today: NaiveDate,
) -> Result<bool, AppError> {
    let competence = competence_start(today);

    if store.mensalidade_exists(contract.id, competence).await? {
        return Ok(false);
    }

    let due_date = due_date_clamped(today.year(), today.month(), contract.due_day.max(1) as u32);
    let base_value = contract.monthly_value;
    let discount = discount_amount(base_value, contract.discount_percent);
    // Acréscimos (multa/juros) nascem zerados e acumulam depois,
    // por processos separados
    let surcharge = Decimal::ZERO;
    let value = final_value(base_value, contract.discount_percent, surcharge);

    store
        .insert_mensalidade(contract, competence, due_date, base_value, discount, surcharge, value)
        .await?;

    Ok(true)
}

/// Uma fatura de assinatura por tenant por competência. Erro de gateway em um
/// tenant não derruba o lote: ele fica sem fatura nesta rodada e a próxima
/// execução tenta de novo.
async fn run_invoice_batch(
    store: &dyn InvoiceStore,
    gateway: &dyn PaymentGateway,
    tenants: Vec<Tenant>,
    today: NaiveDate,
) -> GenerationReport {
    let mut report = GenerationReport {
        total_candidates: tenants.len() as u32,
        ..Default::default()
    };

    for tenant in &tenants {
        match generate_one_invoice(store, gateway, tenant, today).await {
            Ok(true) => report.created += 1,
            Ok(false) => report.skipped += 1,
            Err(e) => {
                tracing::error!("Falha ao faturar o tenant {}: {}", tenant.id, e);
            }
        }
    }

    report
}

async fn generate_one_invoice(
    store: &dyn InvoiceStore,
    gateway: &dyn PaymentGateway,
    tenant: &Tenant,
    today: NaiveDate,
) -> Result<bool, AppError> {
    let competence = competence_start(today);

    if store.invoice_exists(tenant.id, competence).await? {
        return Ok(false);
    }

    let due_date = due_date_clamped(competence.year(), competence.month(), TENANT_INVOICE_DUE_DAY);

    let customer_id = match &tenant.gateway_customer_id {
        Some(id) => id.clone(),
        None => {
            let id = gateway
                .ensure_customer(&tenant.name, &tenant.email, tenant.document_number.as_deref())
                .await?;
            store.set_gateway_customer_id(tenant.id, &id).await?;
            id
        }
    };

    let description = format!(
        "Assinatura Arena - competência {}/{:02}",
        competence.year(),
        competence.month()
    );
    let charge = gateway
        .create_charge(&customer_id, tenant.subscription_value, due_date, &description)
        .await?;

    store.insert_invoice(tenant, competence, due_date, &charge).await?;

    Ok(true)
}

// =============================================================================
//  Serviço
// =============================================================================

#[derive(Clone)]
pub struct BillingService {
    repo: BillingRepository,
    tenant_repo: TenantRepository,
}

impl BillingService {
    pub fn new(repo: BillingRepository, tenant_repo: TenantRepository) -> Self {
        Self { repo, tenant_repo }
    }

    // --- CONTRATOS ---

    pub async fn create_contract(
        &self,
        pool: &PgPool,
        tenant_id: Uuid,
        customer_name: &str,
        monthly_value: Decimal,
        due_day: i32,
        discount_percent: Decimal,
    ) -> Result<RecurringContract, AppError> {
        self.repo
            .create_contract(pool, tenant_id, customer_name, monthly_value, due_day, discount_percent)
            .await
    }

    pub async fn get_contract(
        &self,
        pool: &PgPool,
        tenant_id: Uuid,
        contract_id: Uuid,
    ) -> Result<RecurringContract, AppError> {
        self.repo
            .get_contract(pool, tenant_id, contract_id)
            .await?
            .ok_or(AppError::ContractNotFound)
    }

    pub async fn list_contracts(
        &self,
        pool: &PgPool,
        tenant_id: Uuid,
    ) -> Result<Vec<RecurringContract>, AppError> {
        self.repo.list_contracts(pool, tenant_id).await
    }

    pub async fn list_mensalidades(
        &self,
        pool: &PgPool,
        tenant_id: Uuid,
        competence: Option<NaiveDate>,
    ) -> Result<Vec<Mensalidade>, AppError> {
        self.repo.list_mensalidades(pool, tenant_id, competence).await
    }

    pub async fn list_tenant_invoices(
        &self,
        pool: &PgPool,
        tenant_id: Uuid,
    ) -> Result<Vec<TenantInvoice>, AppError> {
        self.repo.list_tenant_invoices(pool, tenant_id).await
    }

    // --- GERADOR DIÁRIO: MENSALIDADES DE CONTRATO ---

    /// Varre os contratos ativos e gera uma mensalidade por contrato que
    /// vence na data de referência, pulando as competências já geradas.
    /// Falha na busca de candidatos derruba a execução inteira; falha em um
    /// contrato individual não (ver run_mensalidade_batch).
    pub async fn generate_mensalidades(
        &self,
        pool: &PgPool,
        today: NaiveDate,
    ) -> Result<GenerationReport, AppError> {
        let contracts = self.repo.list_active_contracts(pool).await?;
        let store = PgMensalidadeStore { repo: &self.repo, pool };
        let report = run_mensalidade_batch(&store, contracts, today).await;

        tracing::info!(
            "Geração de mensalidades de {}: {} candidatos, {} criadas, {} já existiam",
            today,
            report.total_candidates,
            report.created,
            report.skipped
        );

        Ok(report)
    }

    // --- GERADOR MENSAL: FATURAS DA PLATAFORMA ---

    /// Uma fatura de assinatura por tenant faturável por competência. Na
    /// criação, registra o pagador e a cobrança no gateway e persiste os
    /// identificadores externos devolvidos.
    pub async fn generate_tenant_invoices(
        &self,
        pool: &PgPool,
        gateway: &dyn PaymentGateway,
        today: NaiveDate,
    ) -> Result<GenerationReport, AppError> {
        let tenants = self.tenant_repo.list_billable_tenants(pool).await?;
        let store = PgInvoiceStore {
            repo: &self.repo,
            tenant_repo: &self.tenant_repo,
            pool,
        };
        let report = run_invoice_batch(&store, gateway, tenants, today).await;

        tracing::info!(
            "Faturamento da competência {}: {} candidatos, {} criadas, {} já existiam",
            competence_start(today),
            report.total_candidates,
            report.created,
            report.skipped
        );

        Ok(report)
    }

    // --- WEBHOOK DO GATEWAY ---

    /// Aplica um evento de pagamento vindo do gateway. Devolve quantas
    /// faturas mudaram de status (zero = cobrança desconhecida ou evento
    /// irrelevante).
    pub async fn apply_gateway_event(
        &self,
        pool: &PgPool,
        event: &str,
        gateway_charge_id: &str,
    ) -> Result<u64, AppError> {
        let Some(status) = payment_status_for_event(event) else {
            tracing::info!("Evento de gateway ignorado: {}", event);
            return Ok(0);
        };

        let updated = self
            .repo
            .update_payment_status_by_charge(pool, gateway_charge_id, status)
            .await?;

        if updated == 0 {
            tracing::warn!("Evento {} para cobrança desconhecida {}", event, gateway_charge_id);
        }

        Ok(updated)
    }
}

// =============================================================================
//  Testes do núcleo puro
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::billing::ContractStatus;
    use std::collections::HashSet;
    use std::str::FromStr;
    use std::sync::Mutex;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contract(due_day: i32) -> RecurringContract {
        RecurringContract {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            customer_name: "Maria da Silva".to_string(),
            monthly_value: dec("200"),
            due_day,
            discount_percent: Decimal::ZERO,
            status: ContractStatus::Active,
            created_at: None,
        }
    }

    fn tenant(email: &str) -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            name: "Arena Beira Rio".to_string(),
            email: email.to_string(),
            document_number: None,
            subscription_value: dec("249.90"),
            billing_active: true,
            gateway_customer_id: None,
            created_at: None,
        }
    }

    // Armazenamento em memória para exercitar a semântica dos lotes.
    #[derive(Default)]
    struct MemMensalidadeStore {
        rows: Mutex<HashSet<(Uuid, NaiveDate)>>,
        fail_for: Option<Uuid>,
    }

    #[async_trait]
    impl MensalidadeStore for MemMensalidadeStore {
        async fn mensalidade_exists(
            &self,
            contract_id: Uuid,
            competence: NaiveDate,
        ) -> Result<bool, AppError> {
            Ok(self.rows.lock().unwrap().contains(&(contract_id, competence)))
        }

        async fn insert_mensalidade(
            &self,
            contract: &RecurringContract,
            competence: NaiveDate,
            _due_date: NaiveDate,
            _base_value: Decimal,
            _discount: Decimal,
            _surcharge: Decimal,
            _final_value: Decimal,
        ) -> Result<(), AppError> {
            if self.fail_for == Some(contract.id) {
                return Err(AppError::InternalServerError(anyhow::anyhow!(
                    "conexão perdida"
                )));
            }
            self.rows.lock().unwrap().insert((contract.id, competence));
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemInvoiceStore {
        rows: Mutex<HashSet<(Uuid, NaiveDate)>>,
        customers: Mutex<Vec<(Uuid, String)>>,
    }

    #[async_trait]
    impl InvoiceStore for MemInvoiceStore {
        async fn invoice_exists(
            &self,
            tenant_id: Uuid,
            competence: NaiveDate,
        ) -> Result<bool, AppError> {
            Ok(self.rows.lock().unwrap().contains(&(tenant_id, competence)))
        }

        async fn set_gateway_customer_id(
            &self,
            tenant_id: Uuid,
            customer_id: &str,
        ) -> Result<(), AppError> {
            self.customers.lock().unwrap().push((tenant_id, customer_id.to_string()));
            Ok(())
        }

        async fn insert_invoice(
            &self,
            tenant: &Tenant,
            competence: NaiveDate,
            _due_date: NaiveDate,
            _charge: &Charge,
        ) -> Result<(), AppError> {
            self.rows.lock().unwrap().insert((tenant.id, competence));
            Ok(())
        }
    }

    // Gateway de teste: falha para um e-mail específico, emite para os demais.
    struct StubGateway {
        fail_for_email: Option<String>,
    }

    #[async_trait]
    impl PaymentGateway for StubGateway {
        async fn ensure_customer(
            &self,
            _name: &str,
            email: &str,
            _document_number: Option<&str>,
        ) -> Result<String, AppError> {
            if self.fail_for_email.as_deref() == Some(email) {
                return Err(AppError::Gateway("HTTP 500: instável".to_string()));
            }
            Ok(format!("cus_{email}"))
        }

        async fn create_charge(
            &self,
            customer_id: &str,
            _value: Decimal,
            _due_date: NaiveDate,
            _description: &str,
        ) -> Result<Charge, AppError> {
            Ok(Charge {
                id: format!("pay_{customer_id}"),
                invoice_url: None,
                bank_slip_url: None,
                pix_payload: None,
            })
        }
    }

    #[test]
    fn valor_final_com_desconto_de_dez_por_cento() {
        // base 200, desconto 10% -> 180.00 em duas casas
        let value = final_value(dec("200"), dec("10"), Decimal::ZERO);
        assert_eq!(value.to_string(), "180.00");
    }

    #[test]
    fn desconto_arredonda_para_duas_casas() {
        // 99.99 * 7.5% = 7.49925 -> 7.50
        assert_eq!(discount_amount(dec("99.99"), dec("7.5")).to_string(), "7.50");
        assert_eq!(final_value(dec("99.99"), dec("7.5"), Decimal::ZERO).to_string(), "92.49");
    }

    #[test]
    fn acrescimo_soma_depois_do_desconto() {
        let value = final_value(dec("100"), dec("10"), dec("2.50"));
        assert_eq!(value.to_string(), "92.50");
    }

    #[test]
    fn competencia_e_o_primeiro_dia_do_mes() {
        assert_eq!(competence_start(date(2026, 9, 17)), date(2026, 9, 1));
        assert_eq!(competence_start(date(2026, 1, 1)), date(2026, 1, 1));
    }

    #[test]
    fn ultimo_dia_do_mes() {
        assert_eq!(last_day_of_month(2026, 9), 30);
        assert_eq!(last_day_of_month(2026, 2), 28);
        assert_eq!(last_day_of_month(2028, 2), 29); // bissexto
        assert_eq!(last_day_of_month(2026, 12), 31);
    }

    #[test]
    fn vencimento_grampeia_dia_invalido_para_o_fim_do_mes() {
        // due_day 31 num mês de 30 dias nunca gera data inválida
        assert_eq!(due_date_clamped(2026, 9, 31), date(2026, 9, 30));
        assert_eq!(due_date_clamped(2026, 2, 31), date(2026, 2, 28));
        assert_eq!(due_date_clamped(2026, 9, 10), date(2026, 9, 10));
    }

    #[test]
    fn contrato_dia_31_vence_no_ultimo_dia_de_mes_curto() {
        // Em fevereiro, um contrato "dia 31" entra como candidato no dia 28
        assert!(due_matches(31, date(2026, 2, 28)));
        assert!(!due_matches(31, date(2026, 2, 27)));

        // Num mês de 31 dias ele só vence no próprio dia 31
        assert!(due_matches(31, date(2026, 8, 31)));
        assert!(!due_matches(31, date(2026, 8, 30)));
    }

    #[test]
    fn dia_de_vencimento_comum_casa_somente_no_proprio_dia() {
        assert!(due_matches(10, date(2026, 9, 10)));
        assert!(!due_matches(10, date(2026, 9, 11)));
        assert!(!due_matches(0, date(2026, 9, 1)));
    }

    #[test]
    fn fatura_da_plataforma_vence_dia_cinco() {
        let competence = competence_start(date(2026, 9, 1));
        let due = due_date_clamped(competence.year(), competence.month(), TENANT_INVOICE_DUE_DAY);
        assert_eq!(due, date(2026, 9, 5));
    }

    #[test]
    fn eventos_do_gateway_viram_status() {
        assert_eq!(payment_status_for_event("PAYMENT_RECEIVED"), Some(PaymentStatus::Paid));
        assert_eq!(payment_status_for_event("PAYMENT_CONFIRMED"), Some(PaymentStatus::Paid));
        assert_eq!(payment_status_for_event("PAYMENT_OVERDUE"), Some(PaymentStatus::Overdue));
        assert_eq!(payment_status_for_event("PAYMENT_DELETED"), Some(PaymentStatus::Cancelled));
        assert_eq!(payment_status_for_event("PAYMENT_UPDATED"), None);
    }

    #[tokio::test]
    async fn segunda_execucao_pula_mensalidade_ja_gerada() {
        let store = MemMensalidadeStore::default();
        let c = contract(10);
        let today = date(2026, 9, 10);

        let first = run_mensalidade_batch(&store, vec![c.clone()], today).await;
        assert_eq!((first.total_candidates, first.created, first.skipped), (1, 1, 0));

        let second = run_mensalidade_batch(&store, vec![c], today).await;
        assert_eq!((second.total_candidates, second.created, second.skipped), (1, 0, 1));
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn falha_em_um_contrato_nao_derruba_o_lote() {
        let (a, b, c) = (contract(10), contract(10), contract(10));
        let store = MemMensalidadeStore {
            fail_for: Some(b.id),
            ..Default::default()
        };
        let today = date(2026, 9, 10);

        let report =
            run_mensalidade_batch(&store, vec![a.clone(), b.clone(), c.clone()], today).await;

        // O item que falhou não vira criada nem pulada; os vizinhos seguem
        assert_eq!((report.total_candidates, report.created, report.skipped), (3, 2, 0));
        let rows = store.rows.lock().unwrap();
        let competence = date(2026, 9, 1);
        assert!(rows.contains(&(a.id, competence)));
        assert!(!rows.contains(&(b.id, competence)));
        assert!(rows.contains(&(c.id, competence)));
    }

    #[tokio::test]
    async fn contrato_fora_do_vencimento_nem_entra_como_candidato() {
        let store = MemMensalidadeStore::default();
        let report =
            run_mensalidade_batch(&store, vec![contract(10), contract(15)], date(2026, 9, 10))
                .await;
        assert_eq!((report.total_candidates, report.created), (1, 1));
    }

    #[tokio::test]
    async fn erro_de_gateway_nao_derruba_o_lote_de_faturas() {
        let (a, b, c) = (tenant("a@arena.com"), tenant("b@arena.com"), tenant("c@arena.com"));
        let store = MemInvoiceStore::default();
        let gateway = StubGateway {
            fail_for_email: Some("b@arena.com".to_string()),
        };
        let today = date(2026, 9, 1);

        let report = run_invoice_batch(
            &store,
            &gateway,
            vec![a.clone(), b.clone(), c.clone()],
            today,
        )
        .await;

        assert_eq!((report.total_candidates, report.created, report.skipped), (3, 2, 0));
        let competence = date(2026, 9, 1);
        let rows = store.rows.lock().unwrap();
        assert!(rows.contains(&(a.id, competence)));
        assert!(!rows.contains(&(b.id, competence)));
        assert!(rows.contains(&(c.id, competence)));

        // O pagador criado no gateway fica persistido para os que passaram
        let customers = store.customers.lock().unwrap();
        assert!(customers.iter().any(|(id, cus)| *id == a.id && cus == "cus_a@arena.com"));
        assert!(!customers.iter().any(|(id, _)| *id == b.id));
    }

    #[tokio::test]
    async fn segunda_execucao_pula_fatura_ja_emitida() {
        let store = MemInvoiceStore::default();
        let gateway = StubGateway { fail_for_email: None };
        let t = tenant("arena@arena.com");
        let today = date(2026, 9, 1);

        let first = run_invoice_batch(&store, &gateway, vec![t.clone()], today).await;
        let second = run_invoice_batch(&store, &gateway, vec![t], today).await;

        assert_eq!((first.created, first.skipped), (1, 0));
        assert_eq!((second.created, second.skipped), (0, 1));
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }
}
