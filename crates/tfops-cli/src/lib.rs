pub mod cmd;
pub mod logging;
pub mod root;
