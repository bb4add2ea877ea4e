pub mod authorizer;
pub mod todos;
