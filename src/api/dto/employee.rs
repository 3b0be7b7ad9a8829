//! Employee DTOs.

use bigdecimal::BigDecimal;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::{Employee, EmployeeChanges, NewEmployee};

/// Salaries are `NUMERIC(18,2)`: at most 16 integer digits.
const SALARY_LIMIT: i64 = 10_000_000_000_000_000;

fn validate_salary(salary: &BigDecimal) -> Result<(), ValidationError> {
    if salary < &BigDecimal::from(0) {
        return Err(ValidationError::new("range").with_message("Salary cannot be negative".into()));
    }
    if salary >= &BigDecimal::from(SALARY_LIMIT) {
        return Err(ValidationError::new("range").with_message("Salary is too large".into()));
    }
    Ok(())
}

/// Request body for creating or replacing an employee.
///
/// `id` is optional; when present on a replace it must match the path.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    #[schema(example = 1)]
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 50, message = "First name must be between 1 and 50 characters"))]
    #[schema(example = "Juan", min_length = 1, max_length = 50)]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name must be between 1 and 50 characters"))]
    #[schema(example = "Zuluaga", min_length = 1, max_length = 50)]
    pub last_name: String,
    #[serde(default)]
    pub is_active: bool,
    #[schema(value_type = String, format = Date, example = "2024-01-15")]
    pub hire_date: Date,
    #[validate(custom(function = "validate_salary"))]
    #[schema(value_type = String, example = "2500000.00")]
    pub salary: BigDecimal,
}

impl EmployeeRequest {
    pub fn into_new_employee(self) -> NewEmployee {
        NewEmployee {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            is_active: self.is_active,
            hire_date: self.hire_date.into(),
            salary: self.salary.with_scale(2),
        }
    }

    pub fn into_changes(self) -> EmployeeChanges {
        self.into_new_employee().into()
    }
}

/// Employee as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Juan")]
    pub first_name: String,
    #[schema(example = "Zuluaga")]
    pub last_name: String,
    pub is_active: bool,
    #[schema(value_type = String, format = Date, example = "2024-01-15")]
    pub hire_date: Date,
    #[schema(value_type = String, example = "2500000.00")]
    pub salary: BigDecimal,
}

impl From<Employee> for EmployeeResponse {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id,
            first_name: employee.first_name,
            last_name: employee.last_name,
            is_active: employee.is_active,
            hire_date: employee.hire_date.into(),
            salary: employee.salary,
        }
    }
}
