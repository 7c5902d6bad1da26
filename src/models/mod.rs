pub mod beach;
pub mod decision;
pub mod forecast;
pub mod preference;

pub use beach::*;
pub use decision::*;
pub use forecast::*;
pub use preference::*;
