use bigdecimal::BigDecimal;
use diesel::prelude::*;
use jiff_diesel::Date;

use crate::models::entity::impl_entity;
use crate::schema::employees;

/// Employee model for reading from database
#[derive(Debug, Queryable, Selectable, Clone, PartialEq)]
#[diesel(table_name = crate::schema::employees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Employee {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub hire_date: Date,
    pub salary: BigDecimal,
}

/// NewEmployee model for inserting new records
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::employees)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub hire_date: Date,
    pub salary: BigDecimal,
}

/// Full replacement of an employee's columns
#[derive(Debug, AsChangeset, Clone)]
#[diesel(table_name = crate::schema::employees)]
pub struct EmployeeChanges {
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub hire_date: Date,
    pub salary: BigDecimal,
}

impl From<NewEmployee> for EmployeeChanges {
    fn from(new: NewEmployee) -> Self {
        Self {
            first_name: new.first_name,
            last_name: new.last_name,
            is_active: new.is_active,
            hire_date: new.hire_date,
            salary: new.salary,
        }
    }
}

impl_entity!(Employee {
    name: "employee",
    table: employees,
    new: NewEmployee,
    changes: EmployeeChanges,
    order: (
        employees::last_name.asc(),
        employees::first_name.asc(),
        employees::id.asc(),
    ),
    filter: |pattern| employees::first_name
        .ilike(pattern.clone())
        .or(employees::last_name.ilike(pattern)),
});
