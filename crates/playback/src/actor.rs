mod commands;
mod engine;
mod handle;

pub use handle::ShowHandle;
