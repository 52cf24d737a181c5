pub mod dispatcher;
pub mod export;
pub mod model;
pub mod source;
