//! Invoice service implementation.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_invoice / update_invoice                                        │
//! │    validate shape ─► customer exists ─► products Active + in stock      │
//! │    ─► snapshot name & price ─► totals ─► one transaction (stock moves)  │
//! │                                                                         │
//! │  export_invoice_to_pdf              one invoice   ─► lopdf              │
//! │  export_invoice_to_excel_by_filter  line items    ─► rust_xlsxwriter    │
//! │  get_invoices_revenue               day/month/year totals + buckets     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::export::{excel, pdf};
use pos_core::dto::{
    InvoiceDto, InvoiceExportCriteria, InvoiceSaveDto, InvoiceSearchCriteria, RevenueShowDto,
};
use pos_core::mapper::InvoiceMapper;
use pos_core::report::{excel_report_filename, summarize_revenue, RevenueBy};
use pos_core::validation::{
    validate_export_criteria, validate_invoice_save, validate_search_criteria,
};
use pos_core::{Invoice, InvoiceItem, Page, PageRequest};
use pos_db::{CustomerRepository, InvoiceRepository, ProductRepository};

/// A rendered Excel report and its download name.
#[derive(Debug, Clone)]
pub struct ExcelReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Invoice service implementation.
#[derive(Debug, Clone)]
pub struct InvoiceService {
    invoices: InvoiceRepository,
    customers: CustomerRepository,
    products: ProductRepository,
}

impl InvoiceService {
    /// Create a new invoice service.
    pub fn new(
        invoices: InvoiceRepository,
        customers: CustomerRepository,
        products: ProductRepository,
    ) -> Self {
        InvoiceService {
            invoices,
            customers,
            products,
        }
    }

    /// One page of matching invoices, newest invoice date first.
    pub async fn find_by_criteria(
        &self,
        criteria: InvoiceSearchCriteria,
        page: PageRequest,
    ) -> ServiceResult<Page<InvoiceDto>> {
        validate_search_criteria(&criteria)?;
        let criteria = normalize(criteria);

        let (invoices, total) = self.invoices.find_by_criteria(&criteria, page).await?;
        Ok(Page::new(invoices, page, total).map(InvoiceMapper::to_dto))
    }

    pub async fn create_invoice(&self, input: InvoiceSaveDto) -> ServiceResult<InvoiceDto> {
        validate_invoice_save(&input)?;

        let customer_name = self.customer_name(&input.customer_id).await?;
        let id = Uuid::new_v4().to_string();
        let items = self.snapshot_items(&id, &input, &HashMap::new()).await?;
        let now = Utc::now();

        let invoice = Invoice {
            id,
            customer_id: input.customer_id,
            customer_name,
            invoice_date: input.invoice_date.unwrap_or_else(|| now.date_naive()),
            total_cents: Invoice::compute_total(&items)?.cents(),
            created_at: now,
            updated_at: now,
            items,
        };
        self.invoices.create(&invoice).await?;

        info!(id = %invoice.id, total = %invoice.total(), "Invoice created");
        Ok(InvoiceMapper::to_dto(invoice))
    }

    /// Replaces customer, date and items. Old items go back to stock before
    /// the new ones are taken out.
    pub async fn update_invoice(&self, id: &str, input: InvoiceSaveDto) -> ServiceResult<InvoiceDto> {
        let existing = self
            .invoices
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice", id))?;
        validate_invoice_save(&input)?;

        let customer_name = self.customer_name(&input.customer_id).await?;

        // Stock the old items will give back inside the transaction
        let mut returned: HashMap<String, i64> = HashMap::new();
        for item in &existing.items {
            *returned.entry(item.product_id.clone()).or_default() += item.quantity;
        }
        let items = self.snapshot_items(&existing.id, &input, &returned).await?;

        let invoice = Invoice {
            id: existing.id,
            customer_id: input.customer_id,
            customer_name,
            invoice_date: input.invoice_date.unwrap_or(existing.invoice_date),
            total_cents: Invoice::compute_total(&items)?.cents(),
            created_at: existing.created_at,
            updated_at: Utc::now(),
            items,
        };
        self.invoices.update(&invoice).await?;

        info!(id = %invoice.id, total = %invoice.total(), "Invoice updated");
        Ok(InvoiceMapper::to_dto(invoice))
    }

    /// Renders one invoice as PDF.
    pub async fn export_invoice_to_pdf(&self, id: &str) -> ServiceResult<Vec<u8>> {
        let invoice = self
            .invoices
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invoice", id))?;

        let bytes = tokio::task::spawn_blocking(move || pdf::render_invoice(&invoice))
            .await
            .map_err(|e| ServiceError::Export(e.to_string()))?
            .map_err(|e| ServiceError::Export(e.to_string()))?;

        debug!(id = %id, size = bytes.len(), "Invoice PDF rendered");
        Ok(bytes)
    }

    /// Renders the line items of every matching invoice as `.xlsx`.
    ///
    /// ## Returns
    /// * `Err(ServiceError::BadRequest)` - no customer, month or year given
    /// * `Err(ServiceError::NotFound)` - `customer_id` does not exist
    pub async fn export_invoice_to_excel_by_filter(
        &self,
        criteria: InvoiceExportCriteria,
    ) -> ServiceResult<ExcelReport> {
        let criteria = criteria.normalized();
        validate_export_criteria(&criteria)?;
        if !criteria.has_any() {
            return Err(pos_core::CoreError::MissingReportCriteria.into());
        }

        let customer_name = match criteria.customer_id.as_deref() {
            Some(customer_id) => Some(
                self.customers
                    .find_by_id(customer_id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Customer", customer_id))?
                    .name,
            ),
            None => None,
        };
        let file_name =
            excel_report_filename(customer_name.as_deref(), criteria.month, criteria.year)?;

        let invoices = self
            .invoices
            .find_all_by_criteria(&criteria.to_search())
            .await?;
        let invoice_count = invoices.len();

        let bytes = tokio::task::spawn_blocking(move || excel::render_invoice_report(&invoices))
            .await
            .map_err(|e| ServiceError::Export(e.to_string()))?
            .map_err(|e| ServiceError::Export(e.to_string()))?;

        info!(file_name = %file_name, invoices = invoice_count, "Excel report rendered");
        Ok(ExcelReport { file_name, bytes })
    }

    /// Revenue of the day, month or year containing `date`.
    pub async fn get_invoices_revenue(
        &self,
        date: NaiveDate,
        revenue_by: &str,
    ) -> ServiceResult<RevenueShowDto> {
        let revenue_by = RevenueBy::from_str(revenue_by)?;
        let (start, end) = revenue_by.period_bounds(date);

        let rows = self.invoices.revenue_between(start, end).await?;
        Ok(summarize_revenue(date, revenue_by, &rows)?)
    }

    async fn customer_name(&self, customer_id: &str) -> ServiceResult<String> {
        self.customers
            .find_by_id(customer_id)
            .await?
            .map(|customer| customer.name)
            .ok_or_else(|| ServiceError::BadRequest(format!("Customer not found: {customer_id}")))
    }

    /// Checks every line against the catalog and snapshots name and price.
    ///
    /// `returned` is stock that the write will hand back before taking, so an
    /// update can reuse the quantities of its own old lines.
    async fn snapshot_items(
        &self,
        invoice_id: &str,
        input: &InvoiceSaveDto,
        returned: &HashMap<String, i64>,
    ) -> ServiceResult<Vec<InvoiceItem>> {
        let mut requested: HashMap<&str, i64> = HashMap::new();
        let mut items = Vec::with_capacity(input.items.len());

        for line in &input.items {
            let product_id = line.product_id.trim();
            let product = self
                .products
                .find_by_id(product_id)
                .await?
                .ok_or_else(|| ServiceError::BadRequest(format!("Product not found: {product_id}")))?;

            if !product.is_active() {
                return Err(ServiceError::BadRequest(format!(
                    "Product is not active: {product_id}"
                )));
            }

            let total_requested = requested.entry(product_id).or_default();
            *total_requested += line.quantity;
            let available = product.quantity + returned.get(product_id).copied().unwrap_or(0);
            if *total_requested > available {
                return Err(ServiceError::BadRequest(format!(
                    "Insufficient stock for product {product_id}: {available} available"
                )));
            }

            items.push(InvoiceItem::snapshot(invoice_id, &product, line.quantity)?);
        }

        Ok(items)
    }
}

/// Blank text filters mean "no filter".
fn normalize(mut criteria: InvoiceSearchCriteria) -> InvoiceSearchCriteria {
    criteria.customer_id = criteria
        .customer_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());
    criteria.customer_name = criteria
        .customer_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());
    criteria
}

#[cfg(test)]
mod tests {
    use super::*;
    use pos_core::dto::InvoiceItemSaveDto;
    use pos_core::{Customer, Product, Status};
    use pos_db::{Database, DbConfig};

    struct Fixture {
        db: Database,
        service: InvoiceService,
        customer: Customer,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: "Jane  Doe".into(),
            phone_number: "0901234567".into(),
            status: Status::Active,
            created_at: now,
            updated_at: now,
        };
        db.customers().insert(&customer).await.unwrap();

        let today = now.date_naive();
        for (id, price, stock) in [("latte", 350, 10), ("cake", 500, 2)] {
            db.products()
                .insert(&Product {
                    id: id.into(),
                    name: id.to_uppercase(),
                    price_cents: price,
                    quantity: stock,
                    status: Status::Active,
                    created_at: today,
                    updated_at: today,
                })
                .await
                .unwrap();
        }

        let service = InvoiceService::new(db.invoices(), db.customers(), db.products());
        Fixture {
            db,
            service,
            customer,
        }
    }

    fn save(customer_id: &str, date: &str, lines: &[(&str, i64)]) -> InvoiceSaveDto {
        InvoiceSaveDto {
            customer_id: customer_id.to_string(),
            invoice_date: Some(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()),
            items: lines
                .iter()
                .map(|(product_id, quantity)| InvoiceItemSaveDto {
                    product_id: product_id.to_string(),
                    quantity: *quantity,
                })
                .collect(),
        }
    }

    async fn stock(f: &Fixture, id: &str) -> i64 {
        f.db.products().find_by_id(id).await.unwrap().unwrap().quantity
    }

    #[tokio::test]
    async fn test_line_total_overflow_is_bad_request() {
        let f = fixture().await;
        // Written past validation, as a legacy row would be
        let today = Utc::now().date_naive();
        f.db.products()
            .insert(&Product {
                id: "gold".into(),
                name: "GOLD".into(),
                price_cents: i64::MAX / 2 + 1,
                quantity: 10,
                status: Status::Active,
                created_at: today,
                updated_at: today,
            })
            .await
            .unwrap();

        let err = f
            .service
            .create_invoice(save(&f.customer.id, "2024-05-10", &[("gold", 2)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
        assert_eq!(stock(&f, "gold").await, 10);
    }

    #[tokio::test]
    async fn test_create_computes_totals_and_takes_stock() {
        let f = fixture().await;
        let invoice = f
            .service
            .create_invoice(save(&f.customer.id, "2024-05-10", &[("latte", 2), ("cake", 1)]))
            .await
            .unwrap();

        assert_eq!(invoice.total_cents, 2 * 350 + 500);
        assert_eq!(
            invoice.total_cents,
            invoice.items.iter().map(|i| i.line_total_cents).sum::<i64>()
        );
        assert_eq!(invoice.items[0].product_name, "LATTE");
        assert_eq!(invoice.customer_name, "Jane  Doe");
        assert_eq!(stock(&f, "latte").await, 8);
        assert_eq!(stock(&f, "cake").await, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_customer_and_short_stock() {
        let f = fixture().await;

        let err = f
            .service
            .create_invoice(save(&Uuid::new_v4().to_string(), "2024-05-10", &[("latte", 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));

        let err = f
            .service
            .create_invoice(save(&f.customer.id, "2024-05-10", &[("cake", 2), ("cake", 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
        assert_eq!(stock(&f, "cake").await, 2);

        let err = f
            .service
            .create_invoice(save(&f.customer.id, "2024-05-10", &[("nope", 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_update_restores_then_reapplies_stock() {
        let f = fixture().await;
        let created = f
            .service
            .create_invoice(save(&f.customer.id, "2024-05-10", &[("cake", 2)]))
            .await
            .unwrap();
        assert_eq!(stock(&f, "cake").await, 0);

        // Same two cakes are still allowed: the old line hands them back
        let updated = f
            .service
            .update_invoice(
                &created.id,
                save(&f.customer.id, "2024-05-11", &[("cake", 1), ("latte", 3)]),
            )
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.items.len(), 2);
        assert_eq!(updated.total_cents, 500 + 3 * 350);
        assert_eq!(stock(&f, "cake").await, 1);
        assert_eq!(stock(&f, "latte").await, 7);
    }

    #[tokio::test]
    async fn test_update_missing_invoice() {
        let f = fixture().await;
        let err = f
            .service
            .update_invoice("missing", save(&f.customer.id, "2024-05-10", &[("latte", 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_by_criteria() {
        let f = fixture().await;
        for date in ["2024-04-30", "2024-05-01", "2024-05-20"] {
            f.service
                .create_invoice(save(&f.customer.id, date, &[("latte", 1)]))
                .await
                .unwrap();
        }

        let may = f
            .service
            .find_by_criteria(
                InvoiceSearchCriteria {
                    month: Some(5),
                    year: Some(2024),
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(may.total_elements, 2);
        assert_eq!(
            may.content[0].invoice_date,
            NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
        );

        let by_name = f
            .service
            .find_by_criteria(
                InvoiceSearchCriteria {
                    customer_name: Some("jane".into()),
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_name.total_elements, 3);

        let err = f
            .service
            .find_by_criteria(
                InvoiceSearchCriteria {
                    month: Some(13),
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_pdf_export() {
        let f = fixture().await;
        let created = f
            .service
            .create_invoice(save(&f.customer.id, "2024-05-10", &[("latte", 1)]))
            .await
            .unwrap();

        let bytes = f.service.export_invoice_to_pdf(&created.id).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let err = f.service.export_invoice_to_pdf("missing").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_excel_export_names_the_file() {
        let f = fixture().await;
        f.service
            .create_invoice(save(&f.customer.id, "2024-05-10", &[("latte", 1)]))
            .await
            .unwrap();

        let report = f
            .service
            .export_invoice_to_excel_by_filter(InvoiceExportCriteria {
                customer_id: Some(f.customer.id.clone()),
                month: Some(5),
                year: Some(2024),
            })
            .await
            .unwrap();
        assert_eq!(report.file_name, "invoice_report_Jane_Doe_5_2024.xlsx");
        assert!(report.bytes.starts_with(b"PK"));

        let report = f
            .service
            .export_invoice_to_excel_by_filter(InvoiceExportCriteria {
                year: Some(2024),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(report.file_name, "invoice_report_2024.xlsx");
    }

    #[tokio::test]
    async fn test_excel_export_errors() {
        let f = fixture().await;

        let err = f
            .service
            .export_invoice_to_excel_by_filter(InvoiceExportCriteria::default())
            .await
            .unwrap_err();
        match err {
            ServiceError::BadRequest(msg) => assert_eq!(
                msg,
                "Please select at least one criterion: Customer ID, Month, or Year."
            ),
            other => panic!("expected BadRequest, got {other:?}"),
        }

        let err = f
            .service
            .export_invoice_to_excel_by_filter(InvoiceExportCriteria {
                customer_id: Some("  ".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));

        let err = f
            .service
            .export_invoice_to_excel_by_filter(InvoiceExportCriteria {
                customer_id: Some("unknown".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_revenue_by_month_and_year() {
        let f = fixture().await;
        for (date, qty) in [("2024-05-01", 1), ("2024-05-01", 2), ("2024-05-20", 1), ("2024-06-02", 1)] {
            f.service
                .create_invoice(save(&f.customer.id, date, &[("latte", qty)]))
                .await
                .unwrap();
        }
        let date = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();

        let month = f.service.get_invoices_revenue(date, "MONTH").await.unwrap();
        assert_eq!(month.invoice_count, 3);
        assert_eq!(month.total_revenue_cents, 4 * 350);
        assert_eq!(month.breakdown.len(), 2);
        assert_eq!(month.breakdown[0].period, "2024-05-01");
        assert_eq!(month.breakdown[0].invoice_count, 2);

        let year = f.service.get_invoices_revenue(date, "year").await.unwrap();
        assert_eq!(year.invoice_count, 4);
        let periods: Vec<_> = year.breakdown.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(periods, vec!["2024-05", "2024-06"]);

        let err = f.service.get_invoices_revenue(date, "week").await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }
}
