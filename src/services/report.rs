//! Order report builder
//!
//! Renders the orders placed in an inclusive date range into an XLSX
//! workbook under `<public>/reports/` and returns the URL the static file
//! route serves it from.

use std::path::PathBuf;

use rust_xlsxwriter::{Format, Workbook};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

use crate::db::models::OrderReportRow;
use crate::db::repository::OrderRepository;
use crate::utils::time::{day_end_exclusive, day_start};
use crate::utils::AppError;

const HEADERS: &[&str] = &[
    "Order ID",
    "Customer Name",
    "Customer Email",
    "Total",
    "Status",
    "Created At",
];

#[derive(Clone)]
pub struct ReportService {
    db: Surreal<Db>,
    public_dir: PathBuf,
}

impl ReportService {
    pub fn new(db: Surreal<Db>, public_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            public_dir: public_dir.into(),
        }
    }

    /// Build the orders report for `[start_date, end_date]` (both
    /// `YYYY-MM-DD`, inclusive). Returns the download URL. An empty range
    /// still produces a workbook with just the header row.
    pub async fn build_orders_report(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<String, AppError> {
        let start = day_start(start_date, "start_date")?;
        let end = day_end_exclusive(end_date, "end_date")?;
        if start >= end {
            return Err(AppError::field(
                "end_date",
                "end_date must not be before start_date",
            ));
        }

        let rows = OrderRepository::new(self.db.clone())
            .find_report_rows(start, end)
            .await?;

        let filename = format!(
            "orders-{}-{}-{}.xlsx",
            start_date,
            end_date,
            Uuid::new_v4().simple()
        );
        let path = self.write_workbook(&rows, &filename)?;

        tracing::info!(
            path = %path.display(),
            orders = rows.len(),
            start_date,
            end_date,
            "Generated orders report"
        );

        Ok(format!("/files/reports/{filename}"))
    }

    fn write_workbook(
        &self,
        rows: &[OrderReportRow],
        filename: &str,
    ) -> Result<PathBuf, AppError> {
        let dir = self.public_dir.join("reports");
        std::fs::create_dir_all(&dir)
            .map_err(|e| AppError::internal(format!("Failed to create reports directory: {e}")))?;
        let path = dir.join(filename);

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let bold = Format::new().set_bold();

        let xlsx = |e: rust_xlsxwriter::XlsxError| {
            AppError::internal(format!("Failed to write report: {e}"))
        };

        for (col, header) in HEADERS.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, *header, &bold)
                .map_err(xlsx)?;
        }
        worksheet.set_column_width(0, 24).map_err(xlsx)?;
        worksheet.set_column_width(2, 28).map_err(xlsx)?;
        worksheet.set_column_width(5, 24).map_err(xlsx)?;

        for (i, row) in rows.iter().enumerate() {
            let r = (i + 1) as u32;
            worksheet.write_string(r, 0, &row.id).map_err(xlsx)?;
            worksheet
                .write_string(r, 1, row.customer_name.as_deref().unwrap_or(""))
                .map_err(xlsx)?;
            worksheet
                .write_string(r, 2, row.customer_email.as_deref().unwrap_or(""))
                .map_err(xlsx)?;
            worksheet.write_number(r, 3, row.total).map_err(xlsx)?;
            worksheet
                .write_string(r, 4, row.status.as_str())
                .map_err(xlsx)?;
            worksheet.write_string(r, 5, &row.created_at).map_err(xlsx)?;
        }

        workbook.save(&path).map_err(xlsx)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{ProductCreate, UserCreate};
    use crate::db::repository::{ProductRepository, UserRepository};
    use crate::services::order_service::{LineItemRequest, OrderService};

    async fn service_with_order() -> (ReportService, tempfile::TempDir) {
        let db = DbService::new_in_memory().await.unwrap().db;

        let user = UserRepository::new(db.clone())
            .create(UserCreate {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                password: "long-enough-secret".into(),
            })
            .await
            .unwrap();
        let product = ProductRepository::new(db.clone())
            .create(ProductCreate {
                name: "Keyboard".into(),
                description: None,
                price: 100.0,
                stock: 5,
            })
            .await
            .unwrap();

        OrderService::new(db.clone())
            .place_order(
                &user.id.unwrap().to_string(),
                &[LineItemRequest {
                    id: product.id.unwrap().to_string(),
                    quantity: 2,
                }],
            )
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        (ReportService::new(db, dir.path()), dir)
    }

    #[tokio::test]
    async fn report_covers_today() {
        let (service, dir) = service_with_order().await;
        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();

        let url = service.build_orders_report(&today, &today).await.unwrap();
        assert!(url.starts_with("/files/reports/orders-"));
        assert!(url.ends_with(".xlsx"));

        let relative = url.strip_prefix("/files/").unwrap();
        assert!(dir.path().join(relative).exists());
    }

    #[tokio::test]
    async fn empty_range_still_produces_workbook() {
        let (service, dir) = service_with_order().await;

        let url = service
            .build_orders_report("2001-01-01", "2001-01-02")
            .await
            .unwrap();
        let relative = url.strip_prefix("/files/").unwrap();
        assert!(dir.path().join(relative).exists());
    }

    #[tokio::test]
    async fn rejects_inverted_and_malformed_ranges() {
        let (service, _dir) = service_with_order().await;

        let err = service
            .build_orders_report("2026-08-27", "2026-08-26")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Fields(_)));

        let err = service
            .build_orders_report("27/08/2026", "2026-08-28")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Fields(_)));
    }
}
