mod department_dto;

pub use department_dto::DepartmentResponseDto;
