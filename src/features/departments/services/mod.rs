mod department_router;
mod department_service;

pub use department_router::{department_name_for, DepartmentDirectory, DepartmentRouter};
pub use department_service::DepartmentService;

#[cfg(test)]
pub(crate) use department_router::tests::InMemoryDirectory;
