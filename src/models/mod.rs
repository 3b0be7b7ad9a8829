mod catalog;
mod employee;
pub(crate) mod entity;
mod user;

pub use catalog::{Category, City, Country, NewCategory, NewCity, NewCountry, NewState, State};
pub use employee::{Employee, EmployeeChanges, NewEmployee};
pub use entity::Entity;
pub use user::{NewUser, User, UserChanges, UserType};
