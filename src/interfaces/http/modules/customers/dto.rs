//! Customer DTOs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::CustomerDetail;
use crate::domain::Customer;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomerDto {
    pub id: String,
    pub name: String,
    pub phone_number: String,
    pub address: String,
    /// 0 (worst) to 5 (best)
    pub credit_rating: u8,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Customer> for CustomerDto {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            name: c.name,
            phone_number: c.phone_number,
            address: c.address,
            credit_rating: c.credit_rating,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

/// Customer with rental standing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomerDetailDto {
    pub customer: CustomerDto,
    pub rental_count: usize,
    pub open_rentals: usize,
    /// Still owed across unpaid rentals
    pub balance_due: i64,
}

impl From<CustomerDetail> for CustomerDetailDto {
    fn from(d: CustomerDetail) -> Self {
        Self {
            customer: d.customer.into(),
            rental_count: d.rental_count,
            open_rentals: d.open_rentals,
            balance_due: d.balance_due,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 3, max = 32))]
    pub phone_number: String,
    #[validate(length(min = 1, max = 255))]
    pub address: String,
    /// Starting rating, the configured default when omitted
    #[validate(range(max = 5))]
    pub credit_rating: Option<u8>,
}

/// Contact data only, the rating is derived
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 3, max = 32))]
    pub phone_number: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCustomersParams {
    /// Case-insensitive match on name or phone number
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
