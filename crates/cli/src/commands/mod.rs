pub mod doctor;
pub mod knowledge;
pub mod replay;
pub mod run;
