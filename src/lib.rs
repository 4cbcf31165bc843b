mod configuration;
mod context;
mod error;
mod json_ext;
mod registry;
mod request;
mod resolver;
mod response;
mod schema;
mod services;
mod traits;

pub use configuration::*;
pub use context::*;
pub use error::*;
pub use json_ext::*;
pub use registry::*;
pub use request::*;
pub use resolver::*;
pub use response::*;
pub use schema::*;
pub use services::*;
pub use traits::*;

pub mod prelude {
    // NOTE: only traits can be added here! Everything else is scoped under
    //       the module lambda so a host can use, for example:
    //        -  lambda::Response to get a response envelope
    //        -  lambda::ResolveRequest to get an inbound request
    //        -  ...
    pub use crate::traits::*;
    pub mod lambda {
        pub use crate::*;
    }
}
