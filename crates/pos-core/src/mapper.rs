//! # Mappers
//!
//! Field-by-field translation between entities and transfer objects.
//! Timestamps and ids are passed in so the mappers stay pure.

use chrono::{DateTime, NaiveDate, Utc};

use crate::dto::{
    CustomerDto, CustomerSaveDto, InvoiceDto, InvoiceItemDto, ProductDto, ProductSaveDto,
};
use crate::types::{Customer, Invoice, InvoiceItem, Product, Status};

// =============================================================================
// Customer
// =============================================================================

pub struct CustomerMapper;

impl CustomerMapper {
    pub fn to_dto(customer: Customer) -> CustomerDto {
        CustomerDto {
            id: customer.id,
            name: customer.name,
            phone_number: customer.phone_number,
            status: customer.status,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }

    /// New customers always start Active.
    pub fn to_entity(dto: CustomerSaveDto, id: String, now: DateTime<Utc>) -> Customer {
        Customer {
            id,
            name: dto.name.trim().to_string(),
            phone_number: dto.phone_number.trim().to_string(),
            status: Status::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites name and phone, nothing else.
    pub fn apply_update(customer: &mut Customer, dto: CustomerSaveDto, now: DateTime<Utc>) {
        customer.name = dto.name.trim().to_string();
        customer.phone_number = dto.phone_number.trim().to_string();
        customer.updated_at = now;
    }
}

// =============================================================================
// Product
// =============================================================================

pub struct ProductMapper;

impl ProductMapper {
    pub fn to_dto(product: Product) -> ProductDto {
        ProductDto {
            id: product.id,
            name: product.name,
            price_cents: product.price_cents,
            quantity: product.quantity,
            status: product.status,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }

    /// Ignores `dto.status`: new products are Active.
    pub fn to_entity(dto: ProductSaveDto, fallback_id: String, today: NaiveDate) -> Product {
        let id = dto
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or(fallback_id);

        Product {
            id,
            name: dto.name.trim().to_string(),
            price_cents: dto.price_cents,
            quantity: dto.quantity,
            status: Status::Active,
            created_at: today,
            updated_at: today,
        }
    }

    /// Overwrites name, price and quantity.
    pub fn apply_update(product: &mut Product, dto: ProductSaveDto, today: NaiveDate) {
        product.name = dto.name.trim().to_string();
        product.price_cents = dto.price_cents;
        product.quantity = dto.quantity;
        product.updated_at = today;
    }
}

// =============================================================================
// Invoice
// =============================================================================

pub struct InvoiceMapper;

impl InvoiceMapper {
    pub fn to_dto(invoice: Invoice) -> InvoiceDto {
        InvoiceDto {
            id: invoice.id,
            customer_id: invoice.customer_id,
            customer_name: invoice.customer_name,
            invoice_date: invoice.invoice_date,
            total_cents: invoice.total_cents,
            items: invoice
                .items
                .into_iter()
                .map(InvoiceMapper::item_to_dto)
                .collect(),
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }

    pub fn item_to_dto(item: InvoiceItem) -> InvoiceItemDto {
        InvoiceItemDto {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            unit_price_cents: item.unit_price_cents,
            quantity: item.quantity,
            line_total_cents: item.line_total_cents,
        }
    }
}
