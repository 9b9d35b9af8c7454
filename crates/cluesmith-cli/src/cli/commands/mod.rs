mod dispatch;
pub mod generate;

pub use dispatch::dispatch;
