#![allow(
    clippy::collapsible_if,
    clippy::derivable_impls,
    clippy::too_many_arguments,
    clippy::type_complexity
)]

pub mod app;
pub mod composition;
pub mod gallery;
pub mod pet;
pub mod recorder;
pub mod settings;
pub mod ui;
