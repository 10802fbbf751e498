//! Customer service implementation.
//!
//! Create, read and update customers. Customers are never deleted; they are
//! switched between Active and Deactive instead.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use pos_core::dto::{CustomerDto, CustomerSaveDto};
use pos_core::mapper::CustomerMapper;
use pos_core::validation::validate_customer_save;
use pos_core::{Customer, Page, PageRequest, Status};
use pos_db::CustomerRepository;

/// Customer service implementation.
#[derive(Debug, Clone)]
pub struct CustomerService {
    customers: CustomerRepository,
}

impl CustomerService {
    /// Create a new customer service.
    pub fn new(customers: CustomerRepository) -> Self {
        CustomerService { customers }
    }

    /// One page of customers ordered by name.
    pub async fn find_all_customers(&self, page: PageRequest) -> ServiceResult<Page<CustomerDto>> {
        let (customers, total) = self.customers.find_page(page).await?;
        Ok(Page::new(customers, page, total).map(CustomerMapper::to_dto))
    }

    pub async fn find_by_id(&self, id: &str) -> ServiceResult<CustomerDto> {
        self.load(id).await.map(CustomerMapper::to_dto)
    }

    pub async fn create_customer(&self, input: CustomerSaveDto) -> ServiceResult<CustomerDto> {
        validate_customer_save(&input)?;

        let customer = CustomerMapper::to_entity(input, Uuid::new_v4().to_string(), Utc::now());
        self.customers.insert(&customer).await?;

        info!(id = %customer.id, "Customer created");
        Ok(CustomerMapper::to_dto(customer))
    }

    /// Overwrites name and phone number.
    pub async fn update_customer(
        &self,
        id: &str,
        input: CustomerSaveDto,
    ) -> ServiceResult<CustomerDto> {
        let mut customer = self.load(id).await?;
        validate_customer_save(&input)?;

        CustomerMapper::apply_update(&mut customer, input, Utc::now());
        self.customers.update(&customer).await?;

        info!(id = %customer.id, "Customer updated");
        Ok(CustomerMapper::to_dto(customer))
    }

    /// Flips the status when `status` differs from the current one.
    ///
    /// ## Returns
    /// * `Err(ServiceError::DuplicateStatus)` - customer already has `status`
    pub async fn update_customer_status(
        &self,
        id: &str,
        status: Status,
    ) -> ServiceResult<CustomerDto> {
        let mut customer = self.load(id).await?;

        if customer.status == status {
            return Err(ServiceError::DuplicateStatus {
                entity: "Customer",
                id: customer.id,
                status,
            });
        }

        customer.status = customer.status.toggled();
        customer.updated_at = Utc::now();
        self.customers.update(&customer).await?;

        info!(id = %customer.id, status = %customer.status, "Customer status changed");
        Ok(CustomerMapper::to_dto(customer))
    }

    async fn load(&self, id: &str) -> ServiceResult<Customer> {
        debug!(id = %id, "Loading customer");
        self.customers
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pos_db::{Database, DbConfig};

    async fn service() -> CustomerService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CustomerService::new(db.customers())
    }

    fn input(name: &str) -> CustomerSaveDto {
        CustomerSaveDto {
            name: name.to_string(),
            phone_number: "0901234567".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let service = service().await;
        let created = service.create_customer(input("Jane Doe")).await.unwrap();
        assert_eq!(created.status, Status::Active);

        let found = service.find_by_id(&created.id).await.unwrap();
        assert_eq!(found.name, "Jane Doe");
        assert_eq!(found.phone_number, "0901234567");

        let again = service.find_by_id(&created.id).await.unwrap();
        assert_eq!(found, again);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let service = service().await;
        let err = service
            .create_customer(CustomerSaveDto::default())
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_missing_customer() {
        let service = service().await;
        let err = service
            .update_customer("missing", input("X"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_keeps_status() {
        let service = service().await;
        let created = service.create_customer(input("Jane")).await.unwrap();
        service
            .update_customer_status(&created.id, Status::Deactive)
            .await
            .unwrap();

        let updated = service
            .update_customer(&created.id, input("Jane Smith"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Jane Smith");
        assert_eq!(updated.status, Status::Deactive);
    }

    #[tokio::test]
    async fn test_status_toggle_rejects_same_value_twice() {
        let service = service().await;
        let created = service.create_customer(input("Jane")).await.unwrap();

        let err = service
            .update_customer_status(&created.id, Status::Active)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateStatus { .. }));

        let toggled = service
            .update_customer_status(&created.id, Status::Deactive)
            .await
            .unwrap();
        assert_eq!(toggled.status, Status::Deactive);
        assert_eq!(toggled.name, created.name);

        let err = service
            .update_customer_status(&created.id, Status::Deactive)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateStatus { .. }));
    }

    #[tokio::test]
    async fn test_paging() {
        let service = service().await;
        for name in ["Cara", "Anna", "Bao"] {
            service.create_customer(input(name)).await.unwrap();
        }

        let page = service
            .find_all_customers(PageRequest::new(0, 2))
            .await
            .unwrap();
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.content[0].name, "Anna");

        let last = service
            .find_all_customers(PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(last.content.len(), 1);
        assert_eq!(last.content[0].name, "Cara");
    }
}
