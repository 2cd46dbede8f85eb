use std::sync::Arc;

use amanah_core::{
    audit::{AuditService, AuditServiceTrait},
    chat::{ChatService, ChatServiceTrait},
    company::{CompanyService, CompanyServiceTrait},
    dashboard::{DashboardService, DashboardServiceTrait},
    invoices::{InvoiceService, InvoiceServiceTrait},
    ledger::{LedgerService, LedgerServiceTrait},
    notifications::{NotificationService, NotificationServiceTrait},
    packages::{
        PackageService, PackageServiceTrait, PackageStatusService, PackageStatusServiceTrait,
    },
    pilgrims::{PilgrimService, PilgrimServiceTrait},
    regions::{RegionService, RegionServiceTrait},
    reports::{ReportService, ReportServiceTrait},
    transactions::{TransactionService, TransactionServiceTrait},
    users::{UserService, UserServiceTrait},
    vendors::{VendorService, VendorServiceTrait},
};
use amanah_storage_sqlite::{
    audit::AuditRepository,
    chat::ChatRepository,
    company::CompanyRepository,
    db::{self, write_actor, DbPool},
    invoices::InvoiceRepository,
    ledger::LedgerRepository,
    notifications::NotificationRepository,
    packages::PackageRepository,
    pilgrims::PilgrimRepository,
    regions::RegionRepository,
    transactions::TransactionRepository,
    users::UserRepository,
    vendors::{VendorDebtRepository, VendorRepository},
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    auth::{decode_secret_key, hash_password, random_secret_key, AuthManager},
    chat_registry::ConnectionRegistry,
    config::{BootstrapOwner, Config},
    events::{EventBus, EventBusNotificationSink},
    scheduler::PackageStatusScheduler,
};

pub struct AppState {
    pub pool: Arc<DbPool>,
    pub db_path: String,
    pub auth: Arc<AuthManager>,
    pub event_bus: EventBus,
    pub chat_connections: Arc<ConnectionRegistry>,
    pub scheduler: Arc<PackageStatusScheduler>,
    pub user_service: Arc<dyn UserServiceTrait>,
    pub audit_service: Arc<dyn AuditServiceTrait>,
    pub notification_service: Arc<dyn NotificationServiceTrait>,
    pub package_service: Arc<dyn PackageServiceTrait>,
    pub package_status_service: Arc<dyn PackageStatusServiceTrait>,
    pub pilgrim_service: Arc<dyn PilgrimServiceTrait>,
    pub transaction_service: Arc<dyn TransactionServiceTrait>,
    pub invoice_service: Arc<dyn InvoiceServiceTrait>,
    pub ledger_service: Arc<dyn LedgerServiceTrait>,
    pub vendor_service: Arc<dyn VendorServiceTrait>,
    pub chat_service: Arc<dyn ChatServiceTrait>,
    pub dashboard_service: Arc<dyn DashboardServiceTrait>,
    pub report_service: Arc<dyn ReportServiceTrait>,
    pub company_service: Arc<dyn CompanyServiceTrait>,
    pub region_service: Arc<dyn RegionServiceTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var("AMANAH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

fn jwt_secret(config: &Config) -> anyhow::Result<Vec<u8>> {
    match &config.jwt_secret {
        Some(raw) => decode_secret_key(raw),
        None => {
            tracing::warn!(
                "AMANAH_JWT_SECRET is not set; using a random key, tokens will not survive a restart"
            );
            Ok(random_secret_key())
        }
    }
}

async fn bootstrap_owner(
    users: &dyn UserServiceTrait,
    owner: &BootstrapOwner,
) -> anyhow::Result<()> {
    let password_hash =
        hash_password(&owner.password).map_err(|e| anyhow::anyhow!("{:?}", e))?;
    match users
        .bootstrap_owner(&owner.email, &owner.name, password_hash)
        .await?
    {
        Some(user) => tracing::info!("Bootstrapped owner account {}", user.email),
        None => tracing::debug!("Users already exist, owner bootstrap skipped"),
    }
    Ok(())
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let user_repo = Arc::new(UserRepository::new(pool.clone(), writer.clone()));
    let audit_repo = Arc::new(AuditRepository::new(pool.clone(), writer.clone()));
    let notification_repo = Arc::new(NotificationRepository::new(pool.clone(), writer.clone()));
    let package_repo = Arc::new(PackageRepository::new(pool.clone(), writer.clone()));
    let pilgrim_repo = Arc::new(PilgrimRepository::new(pool.clone(), writer.clone()));
    let transaction_repo = Arc::new(TransactionRepository::new(pool.clone(), writer.clone()));
    let invoice_repo = Arc::new(InvoiceRepository::new(pool.clone()));
    let ledger_repo = Arc::new(LedgerRepository::new(pool.clone(), writer.clone()));
    let vendor_repo = Arc::new(VendorRepository::new(pool.clone(), writer.clone()));
    let debt_repo = Arc::new(VendorDebtRepository::new(pool.clone(), writer.clone()));
    let chat_repo = Arc::new(ChatRepository::new(pool.clone(), writer.clone()));
    let company_repo = Arc::new(CompanyRepository::new(pool.clone(), writer.clone()));
    let region_repo = Arc::new(RegionRepository::new(pool.clone()));

    let event_bus = EventBus::new(256);
    let notification_sink = Arc::new(EventBusNotificationSink::new(event_bus.clone()));

    let audit_service: Arc<dyn AuditServiceTrait> = Arc::new(AuditService::new(audit_repo));
    let user_service: Arc<dyn UserServiceTrait> =
        Arc::new(UserService::new(user_repo.clone(), audit_service.clone()));
    let notification_service: Arc<dyn NotificationServiceTrait> = Arc::new(
        NotificationService::new(notification_repo, user_repo.clone(), notification_sink),
    );
    let package_service: Arc<dyn PackageServiceTrait> = Arc::new(PackageService::new(
        package_repo.clone(),
        pilgrim_repo.clone(),
        transaction_repo.clone(),
        audit_service.clone(),
    ));
    let package_status_service: Arc<dyn PackageStatusServiceTrait> =
        Arc::new(PackageStatusService::new(package_repo.clone()));
    let pilgrim_service: Arc<dyn PilgrimServiceTrait> = Arc::new(PilgrimService::new(
        pilgrim_repo.clone(),
        package_repo.clone(),
        audit_service.clone(),
        notification_service.clone(),
    ));
    let transaction_service: Arc<dyn TransactionServiceTrait> = Arc::new(TransactionService::new(
        transaction_repo.clone(),
        audit_service.clone(),
        notification_service.clone(),
    ));
    let invoice_service: Arc<dyn InvoiceServiceTrait> =
        Arc::new(InvoiceService::new(invoice_repo));
    let ledger_service: Arc<dyn LedgerServiceTrait> = Arc::new(LedgerService::new(ledger_repo));
    let vendor_service: Arc<dyn VendorServiceTrait> = Arc::new(VendorService::new(
        vendor_repo,
        debt_repo,
        audit_service.clone(),
        notification_service.clone(),
    ));
    let chat_service: Arc<dyn ChatServiceTrait> =
        Arc::new(ChatService::new(chat_repo, user_repo.clone()));
    let dashboard_service: Arc<dyn DashboardServiceTrait> = Arc::new(DashboardService::new(
        transaction_service.clone(),
        pilgrim_service.clone(),
        package_service.clone(),
        vendor_service.clone(),
    ));
    let report_service: Arc<dyn ReportServiceTrait> = Arc::new(ReportService::new(
        package_repo,
        pilgrim_repo,
        transaction_repo,
    ));
    let company_service: Arc<dyn CompanyServiceTrait> =
        Arc::new(CompanyService::new(company_repo, audit_service.clone()));
    let region_service: Arc<dyn RegionServiceTrait> = Arc::new(RegionService::new(region_repo));

    if let Some(owner) = &config.bootstrap_owner {
        bootstrap_owner(user_service.as_ref(), owner).await?;
    }

    let auth = Arc::new(AuthManager::new(&jwt_secret(config)?, config.token_ttl));
    let scheduler = Arc::new(PackageStatusScheduler::new(
        package_status_service.clone(),
        event_bus.clone(),
        config.scheduler_interval,
    ));

    Ok(Arc::new(AppState {
        pool,
        db_path,
        auth,
        event_bus,
        chat_connections: Arc::new(ConnectionRegistry::new()),
        scheduler,
        user_service,
        audit_service,
        notification_service,
        package_service,
        package_status_service,
        pilgrim_service,
        transaction_service,
        invoice_service,
        ledger_service,
        vendor_service,
        chat_service,
        dashboard_service,
        report_service,
        company_service,
        region_service,
    }))
}
