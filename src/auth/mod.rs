pub mod approval;
pub mod gate;
