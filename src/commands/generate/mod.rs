mod columns;
mod location;
mod pests;
mod run;
mod spam;

pub use run::run;
