mod exec_result;
mod result_set;
mod row;
mod rows;

pub use exec_result::ExecResult;
pub use result_set::ResultSet;
pub use row::CustomDbRow;
pub use rows::Rows;
