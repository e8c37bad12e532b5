pub mod compare;
pub mod economics;
pub mod reconcile;
pub mod sensitivity;
