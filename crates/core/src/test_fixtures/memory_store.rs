use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::sync::Mutex;
use uuid::Uuid;

use crate::errors::{Error, Result};
use crate::invoices::{Invoice, InvoiceDraft, InvoiceStatus};
use crate::ledger::LedgerEffect;
use crate::packages::{
    Package, PackageFilter, PackageRepositoryTrait, PackageStatus, SeatMove,
};
use crate::pilgrims::{
    BulkPilgrimUpdate, Pilgrim, PilgrimChange, PilgrimCreated, PilgrimCreation, PilgrimFilter,
    PilgrimRepositoryTrait, PilgrimUpdate,
};
use crate::transactions::{
    IncomePosting, LedgerRow, PostedIncome, Transaction, TransactionChange, TransactionDetail,
    TransactionFilter, TransactionRepositoryTrait, TransactionUpdate,
};
use crate::utils::{Page, PageRequest};

#[derive(Debug, Clone, Default)]
struct State {
    packages: Vec<Package>,
    pilgrims: Vec<Pilgrim>,
    transactions: Vec<Transaction>,
    invoices: Vec<Invoice>,
}

impl State {
    fn package_mut(&mut self, id: &str) -> Result<&mut Package> {
        self.packages
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::not_found("Package", id))
    }

    fn pilgrim_mut(&mut self, id: &str) -> Result<&mut Pilgrim> {
        self.pilgrims
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::not_found("Pilgrim", id))
    }

    fn apply_effect(&mut self, effect: &LedgerEffect) -> Result<()> {
        match effect {
            LedgerEffect::PilgrimPayment { pilgrim_id, delta } => {
                self.pilgrim_mut(pilgrim_id)?.apply_payment_delta(delta);
            }
            LedgerEffect::PackageCost { package_id, delta } => {
                if let Ok(package) = self.package_mut(package_id) {
                    package.actual_cost = (package.actual_cost + *delta).max(Decimal::ZERO);
                }
            }
        }
        Ok(())
    }

    fn move_seat(&mut self, seats: &SeatMove) -> Result<Option<Package>> {
        if let Some(id) = &seats.release {
            if let Ok(package) = self.package_mut(id) {
                package.booked_seats = (package.booked_seats - 1).max(0);
            }
        }
        match &seats.reserve {
            Some(id) => {
                let package = self.package_mut(id)?;
                package.booked_seats += 1;
                Ok(Some(package.clone()))
            }
            None => Ok(None),
        }
    }

    fn write_invoice(&mut self, draft: InvoiceDraft) -> Invoice {
        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            invoice_number: draft.invoice_number,
            pilgrim_id: draft.pilgrim_id,
            package_id: draft.package_id,
            transaction_id: Some(draft.transaction_id),
            subtotal: draft.subtotal,
            discount: draft.discount,
            total: draft.total,
            status: draft.status,
            issue_date: draft.issue_date,
            due_date: None,
            paid_date: draft.paid_date,
            notes: draft.notes,
            created_at: draft.issue_date,
            updated_at: draft.issue_date,
            created_by_id: draft.created_by_id,
        };
        self.invoices.push(invoice.clone());
        invoice
    }

    fn post_income(&mut self, posting: IncomePosting) -> Result<PostedIncome> {
        let IncomePosting {
            transaction,
            invoice,
        } = posting;
        if let Some(effect) = transaction.effect() {
            self.apply_effect(&effect)?;
        }
        let pilgrim = match &transaction.pilgrim_id {
            Some(id) => Some(self.pilgrim_mut(id)?.clone()),
            None => None,
        };
        self.transactions.push(transaction.clone());
        let invoice = invoice.map(|draft| self.write_invoice(draft));
        Ok(PostedIncome {
            transaction,
            pilgrim,
            invoice,
        })
    }

    fn update_pilgrim(
        &mut self,
        id: &str,
        update: &PilgrimUpdate,
        now: NaiveDateTime,
    ) -> Result<PilgrimChange> {
        let before = self.pilgrim_mut(id)?.clone();
        let after = update.apply_to(&before, now)?;
        let seats = SeatMove::between(before.package_id.as_deref(), after.package_id.as_deref());
        let reserved_package = self.move_seat(&seats)?;
        *self.pilgrim_mut(id)? = after.clone();
        Ok(PilgrimChange {
            before,
            after,
            reserved_package,
        })
    }
}

/// In-memory stand-in for the SQLite store. Every write runs against a copy
/// of the state that replaces the original only on success.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn with_packages(packages: Vec<Package>) -> Self {
        Self {
            state: Mutex::new(State {
                packages,
                ..Default::default()
            }),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> T {
        f(&self.state.lock().unwrap())
    }

    fn write<T>(&self, f: impl FnOnce(&mut State) -> Result<T>) -> Result<T> {
        let mut guard = self.state.lock().unwrap();
        let mut draft = guard.clone();
        let out = f(&mut draft)?;
        *guard = draft;
        Ok(out)
    }

    pub fn package(&self, id: &str) -> Package {
        self.read(|s| s.packages.iter().find(|p| p.id == id).cloned().unwrap())
    }

    pub fn pilgrim(&self, id: &str) -> Pilgrim {
        self.read(|s| s.pilgrims.iter().find(|p| p.id == id).cloned().unwrap())
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        self.read(|s| s.invoices.clone())
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.read(|s| s.transactions.clone())
    }

    pub fn insert_pilgrim(&self, pilgrim: Pilgrim) {
        self.state.lock().unwrap().pilgrims.push(pilgrim);
    }
}

fn contains(haystack: &Option<String>, needle: &str) -> bool {
    haystack
        .as_deref()
        .is_some_and(|h| h.to_lowercase().contains(needle))
}

#[async_trait]
impl PackageRepositoryTrait for MemoryStore {
    fn list(&self, filter: &PackageFilter, page: PageRequest) -> Result<Page<Package>> {
        let search = filter.search.as_deref().map(str::to_lowercase);
        let packages = self.read(|s| {
            s.packages
                .iter()
                .filter(|p| filter.status.is_none_or(|st| p.status == st))
                .filter(|p| filter.package_type.is_none_or(|t| p.package_type == t))
                .filter(|p| {
                    search.as_deref().is_none_or(|q| {
                        p.name.to_lowercase().contains(q) || p.code.to_lowercase().contains(q)
                    })
                })
                .cloned()
                .collect::<Vec<_>>()
        });
        Ok(page.slice(packages))
    }

    fn list_all(&self) -> Result<Vec<Package>> {
        Ok(self.read(|s| s.packages.clone()))
    }

    fn get_by_id(&self, package_id: &str) -> Result<Package> {
        self.read(|s| s.packages.iter().find(|p| p.id == package_id).cloned())
            .ok_or_else(|| Error::not_found("Package", package_id))
    }

    fn get_by_code(&self, code: &str) -> Result<Option<Package>> {
        Ok(self.read(|s| s.packages.iter().find(|p| p.code == code).cloned()))
    }

    fn count_by_status(&self, status: PackageStatus) -> Result<i64> {
        Ok(self.read(|s| s.packages.iter().filter(|p| p.status == status).count() as i64))
    }

    async fn create(&self, package: Package) -> Result<Package> {
        self.write(|s| {
            s.packages.push(package.clone());
            Ok(package)
        })
    }

    async fn update(&self, package: Package) -> Result<Package> {
        self.write(|s| {
            let stored = s.package_mut(&package.id)?;
            let booked_seats = stored.booked_seats;
            let actual_cost = stored.actual_cost;
            *stored = Package {
                booked_seats,
                actual_cost,
                ..package
            };
            Ok(stored.clone())
        })
    }

    async fn delete(&self, package_id: String) -> Result<usize> {
        self.write(|s| {
            if s
                .pilgrims
                .iter()
                .any(|p| p.package_id.as_deref() == Some(package_id.as_str()))
            {
                return Err(Error::ConstraintViolation(
                    "package still has pilgrims".to_string(),
                ));
            }
            let before = s.packages.len();
            s.packages.retain(|p| p.id != package_id);
            Ok(before - s.packages.len())
        })
    }

    async fn set_status(
        &self,
        package_id: String,
        status: PackageStatus,
        now: NaiveDateTime,
    ) -> Result<Package> {
        self.write(|s| {
            let package = s.package_mut(&package_id)?;
            package.status = status;
            package.updated_at = now;
            Ok(package.clone())
        })
    }
}

#[async_trait]
impl PilgrimRepositoryTrait for MemoryStore {
    fn list(&self, filter: &PilgrimFilter, page: PageRequest) -> Result<Page<Pilgrim>> {
        let search = filter.search.as_deref().map(str::to_lowercase);
        let pilgrims = self.read(|s| {
            s.pilgrims
                .iter()
                .filter(|p| {
                    filter
                        .package_id
                        .as_deref()
                        .is_none_or(|id| p.package_id.as_deref() == Some(id))
                })
                .filter(|p| filter.payment_status.is_none_or(|st| p.payment_status == st))
                .filter(|p| filter.is_cancelled.is_none_or(|c| p.is_cancelled == c))
                .filter(|p| {
                    search.as_deref().is_none_or(|q| {
                        p.name.to_lowercase().contains(q)
                            || contains(&p.nik, q)
                            || contains(&p.phone, q)
                    })
                })
                .cloned()
                .collect::<Vec<_>>()
        });
        Ok(page.slice(pilgrims))
    }

    fn list_all(&self) -> Result<Vec<Pilgrim>> {
        Ok(self.read(|s| s.pilgrims.clone()))
    }

    fn get_by_id(&self, pilgrim_id: &str) -> Result<Pilgrim> {
        self.read(|s| s.pilgrims.iter().find(|p| p.id == pilgrim_id).cloned())
            .ok_or_else(|| Error::not_found("Pilgrim", pilgrim_id))
    }

    fn find_by_nik(&self, nik: &str, exclude_id: Option<&str>) -> Result<Option<Pilgrim>> {
        Ok(self.read(|s| {
            s.pilgrims
                .iter()
                .find(|p| p.nik.as_deref() == Some(nik) && Some(p.id.as_str()) != exclude_id)
                .cloned()
        }))
    }

    fn count_by_package(&self, package_id: &str) -> Result<i64> {
        Ok(self.read(|s| {
            s.pilgrims
                .iter()
                .filter(|p| p.package_id.as_deref() == Some(package_id))
                .count() as i64
        }))
    }

    async fn create(&self, creation: PilgrimCreation) -> Result<PilgrimCreated> {
        self.write(|s| {
            let PilgrimCreation {
                pilgrim,
                initial_payment,
            } = creation;
            let package = s.move_seat(&SeatMove::between(None, pilgrim.package_id.as_deref()))?;
            let id = pilgrim.id.clone();
            s.pilgrims.push(pilgrim);
            let initial_payment = match initial_payment {
                Some(posting) => Some(s.post_income(posting)?),
                None => None,
            };
            Ok(PilgrimCreated {
                pilgrim: s.pilgrim_mut(&id)?.clone(),
                package,
                initial_payment,
            })
        })
    }

    async fn update(
        &self,
        pilgrim_id: String,
        update: PilgrimUpdate,
        now: NaiveDateTime,
    ) -> Result<PilgrimChange> {
        self.write(|s| s.update_pilgrim(&pilgrim_id, &update, now))
    }

    async fn bulk_update(
        &self,
        updates: Vec<BulkPilgrimUpdate>,
        now: NaiveDateTime,
    ) -> Result<Vec<PilgrimChange>> {
        self.write(|s| {
            updates
                .iter()
                .map(|item| s.update_pilgrim(&item.id, &item.data, now))
                .collect()
        })
    }

    async fn delete(&self, pilgrim_id: String) -> Result<Pilgrim> {
        self.write(|s| {
            let removed = s.pilgrim_mut(&pilgrim_id)?.clone();
            s.move_seat(&SeatMove::between(removed.package_id.as_deref(), None))?;
            s.pilgrims.retain(|p| p.id != pilgrim_id);
            for tx in s
                .transactions
                .iter_mut()
                .filter(|t| t.pilgrim_id.as_deref() == Some(pilgrim_id.as_str()))
            {
                tx.pilgrim_id = None;
            }
            s.invoices.retain(|i| i.pilgrim_id != pilgrim_id);
            Ok(removed)
        })
    }
}

fn detail(state: &State, transaction: &Transaction) -> TransactionDetail {
    let name_of = |id: &Option<String>, names: Vec<(String, String)>| {
        id.as_ref()
            .and_then(|id| names.into_iter().find(|(k, _)| k == id).map(|(_, v)| v))
    };
    TransactionDetail {
        pilgrim_name: name_of(
            &transaction.pilgrim_id,
            state
                .pilgrims
                .iter()
                .map(|p| (p.id.clone(), p.name.clone()))
                .collect(),
        ),
        package_name: name_of(
            &transaction.package_id,
            state
                .packages
                .iter()
                .map(|p| (p.id.clone(), p.name.clone()))
                .collect(),
        ),
        vendor_name: None,
        transaction: transaction.clone(),
    }
}

fn matches(filter: &TransactionFilter, tx: &Transaction) -> bool {
    filter
        .transaction_type
        .is_none_or(|t| tx.transaction_type == t)
        && filter
            .pilgrim_id
            .as_deref()
            .is_none_or(|id| tx.pilgrim_id.as_deref() == Some(id))
        && filter
            .package_id
            .as_deref()
            .is_none_or(|id| tx.package_id.as_deref() == Some(id))
        && filter.start_date.is_none_or(|d| tx.transaction_date >= d)
        && filter.end_date.is_none_or(|d| tx.transaction_date <= d)
}

#[async_trait]
impl TransactionRepositoryTrait for MemoryStore {
    fn list(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<Page<TransactionDetail>> {
        let rows = self.read(|s| {
            let mut rows: Vec<TransactionDetail> = s
                .transactions
                .iter()
                .filter(|t| matches(filter, t))
                .map(|t| detail(s, t))
                .collect();
            rows.sort_by(|a, b| {
                b.transaction
                    .transaction_date
                    .cmp(&a.transaction.transaction_date)
            });
            rows
        });
        Ok(page.slice(rows))
    }

    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction> {
        self.read(|s| s.transactions.iter().find(|t| t.id == transaction_id).cloned())
            .ok_or_else(|| Error::not_found("Transaction", transaction_id))
    }

    fn get_detail(&self, transaction_id: &str) -> Result<TransactionDetail> {
        let tx = TransactionRepositoryTrait::get_by_id(self, transaction_id)?;
        Ok(self.read(|s| detail(s, &tx)))
    }

    fn ledger_rows(&self, filter: &TransactionFilter) -> Result<Vec<LedgerRow>> {
        Ok(self.read(|s| {
            s.transactions
                .iter()
                .filter(|t| matches(filter, t))
                .map(|t| LedgerRow {
                    transaction_type: t.transaction_type,
                    expense_category: t.expense_category,
                    amount: t.amount,
                    package_id: t.package_id.clone(),
                    transaction_date: t.transaction_date,
                })
                .collect()
        }))
    }

    fn recent(&self, limit: i64) -> Result<Vec<TransactionDetail>> {
        let page = TransactionRepositoryTrait::list(
            self,
            &TransactionFilter::default(),
            PageRequest::new(Some(1), Some(limit as u32)),
        )?;
        Ok(page.data)
    }

    async fn insert_income(&self, posting: IncomePosting) -> Result<PostedIncome> {
        self.write(|s| s.post_income(posting))
    }

    async fn insert_expense(&self, transaction: Transaction) -> Result<Transaction> {
        self.write(|s| {
            if let Some(effect) = transaction.effect() {
                s.apply_effect(&effect)?;
            }
            s.transactions.push(transaction.clone());
            Ok(transaction)
        })
    }

    async fn update(
        &self,
        transaction_id: String,
        update: TransactionUpdate,
        now: NaiveDateTime,
    ) -> Result<TransactionChange> {
        self.write(|s| {
            let before = s
                .transactions
                .iter()
                .find(|t| t.id == transaction_id)
                .cloned()
                .ok_or_else(|| Error::not_found("Transaction", &transaction_id))?;
            let after = before.apply_update(&update, now)?;
            if let Some(effect) = before.effect() {
                s.apply_effect(&effect.inverse())?;
            }
            if let Some(effect) = after.effect() {
                s.apply_effect(&effect)?;
            }
            for invoice in s
                .invoices
                .iter_mut()
                .filter(|i| i.transaction_id.as_deref() == Some(transaction_id.as_str()))
            {
                invoice.subtotal = after.gross_amount();
                invoice.discount = after.discount;
                invoice.total = after.amount;
                invoice.updated_at = now;
            }
            if let Some(stored) = s.transactions.iter_mut().find(|t| t.id == transaction_id) {
                *stored = after.clone();
            }
            Ok(TransactionChange { before, after })
        })
    }

    async fn delete(&self, transaction_id: String) -> Result<Transaction> {
        self.write(|s| {
            let removed = s
                .transactions
                .iter()
                .find(|t| t.id == transaction_id)
                .cloned()
                .ok_or_else(|| Error::not_found("Transaction", &transaction_id))?;
            if let Some(effect) = removed.effect() {
                s.apply_effect(&effect.inverse())?;
            }
            for invoice in s
                .invoices
                .iter_mut()
                .filter(|i| i.transaction_id.as_deref() == Some(transaction_id.as_str()))
            {
                invoice.status = InvoiceStatus::Cancelled;
            }
            s.transactions.retain(|t| t.id != transaction_id);
            Ok(removed)
        })
    }
}
