mod headers;
mod health_check;
mod prospects;

pub use headers::{alert_header, error_header, params_header};
pub use health_check::*;
pub use prospects::*;
